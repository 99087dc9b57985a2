//! Error types for the dd-watcher crate.
//!
//! This module provides [`WatchError`] for engine setup and filesystem
//! failures, and [`GenerateError`] for failures reported by a
//! [`Generator`](crate::Generator).

use camino::Utf8PathBuf;

/// Errors that can occur while setting up or running a watch engine.
///
/// [`WatchError::CreateDir`] and [`WatchError::Notify`] stop the engine
/// being started. The others are logged and the file is skipped this cycle.
///
/// # Examples
///
/// ```
/// use dd_watcher::WatchError;
///
/// let err = WatchError::non_utf8_path("in/report.txt");
/// assert!(err.to_string().contains("not valid UTF-8"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// Failed to create a watch, output, or `processed/` directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read metadata for, or list, a watched path.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// The path that could not be inspected.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a processed file out of the watch root.
    #[error("failed to move {from} to {to}: {source}")]
    Relocate {
        /// The source file.
        from: Utf8PathBuf,
        /// The intended destination.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path is not valid UTF-8.
    ///
    /// This crate uses UTF-8 paths throughout. Non-UTF-8 files dropped into
    /// a watch root are logged and skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl WatchError {
    /// Creates a new [`WatchError::CreateDir`] error.
    #[inline]
    pub fn create_dir(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`WatchError::Inspect`] error.
    #[inline]
    pub fn inspect(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Inspect {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }
}

/// Errors reported by a document generator.
///
/// Generation failures are never retried by an engine. The pair is dropped
/// from tracking and its source files stay where they are.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// No generator program has been configured.
    #[error("no generator program configured")]
    NotConfigured,

    /// The generator program could not be started.
    #[error("failed to run generator '{program}': {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The generator program ran but reported failure.
    #[error("generator '{program}' exited with {status}: {stderr}")]
    Failed {
        /// The program that failed.
        program: String,
        /// Exit status description.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The generator panicked or its blocking task was cancelled.
    #[error("generator task aborted: {0}")]
    Aborted(String),

    /// Any other generator-specific failure.
    #[error("{0}")]
    Other(String),
}

impl GenerateError {
    /// Creates a new [`GenerateError::Other`] error.
    #[inline]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
