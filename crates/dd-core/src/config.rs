//! Configuration structures for docdrop.
//!
//! This module provides configuration types for every component:
//!
//! - [`WatchSettings`] - Stability window, sweep cadence, recognized extensions
//! - [`WatchTarget`] - One watched input directory and its output directory
//! - [`GeneratorConfig`] - External program used to generate documents
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`]. Missing fields in a JSON
//! configuration file fall back to those defaults.

use std::time::Duration;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Normalizes a file extension for comparison.
///
/// Strips any leading dots and lower-cases the remainder, so `".DOCX"`,
/// `"docx"` and `"Docx"` all compare equal.
///
/// # Examples
///
/// ```
/// use dd_core::normalize_extension;
///
/// assert_eq!(normalize_extension(".DOCX"), "docx");
/// assert_eq!(normalize_extension("txt"), "txt");
/// ```
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Settings shared by every watch engine.
///
/// # Examples
///
/// ```
/// use dd_core::WatchSettings;
/// use std::time::Duration;
///
/// let settings = WatchSettings::default();
/// assert_eq!(settings.stability_window(), Duration::from_millis(2000));
/// assert_eq!(settings.poll_interval(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// How long a file must remain unmodified before it is considered settled.
    ///
    /// This is a heuristic for "the writer has finished". It must exceed the
    /// flush/copy latency of the watched filesystem.
    pub stability_ms: u64,

    /// Interval between match sweeps when no filesystem events arrive.
    pub poll_interval_ms: u64,

    /// Capacity of the channel carrying event batches to an engine.
    pub channel_capacity: usize,

    /// Extension of data files, without the leading dot.
    pub data_extension: String,

    /// Extensions of template files, without the leading dot.
    pub template_extensions: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            stability_ms: 2000,
            poll_interval_ms: 1000,
            channel_capacity: 100,
            data_extension: "txt".to_owned(),
            template_extensions: vec!["docx".to_owned(), "pptx".to_owned(), "xlsx".to_owned()],
        }
    }
}

impl WatchSettings {
    /// Returns the stability window as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn stability_window(&self) -> Duration {
        Duration::from_millis(self.stability_ms)
    }

    /// Returns the sweep poll interval as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Normalizes all configured extensions in place.
    pub fn normalize(&mut self) {
        self.data_extension = normalize_extension(&self.data_extension);
        for ext in &mut self.template_extensions {
            *ext = normalize_extension(ext);
        }
        self.template_extensions.sort_unstable();
        self.template_extensions.dedup();
    }

    /// Checks the settings for values that would make an engine unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stability_ms == 0 {
            return Err(ConfigError::invalid_option("stability_ms", "must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_option("poll_interval_ms", "must be positive"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid_option("channel_capacity", "must be positive"));
        }
        if self.data_extension.is_empty() {
            return Err(ConfigError::invalid_option("data_extension", "must not be empty"));
        }
        if self.template_extensions.iter().all(String::is_empty) {
            return Err(ConfigError::invalid_option(
                "template_extensions",
                "at least one template extension is required",
            ));
        }
        if self.template_extensions.contains(&self.data_extension) {
            return Err(ConfigError::invalid_option(
                "template_extensions",
                format!("'{}' is already the data extension", self.data_extension),
            ));
        }
        Ok(())
    }
}

/// A watched input directory paired with the directory receiving its output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchTarget {
    /// Directory watched for dropped data and template files.
    pub input: Utf8PathBuf,

    /// Directory generated documents are written to.
    pub output: Utf8PathBuf,
}

impl WatchTarget {
    /// Creates a new watch target.
    #[must_use]
    pub fn new(input: impl Into<Utf8PathBuf>, output: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Returns the `processed/` directory beneath a watch root.
#[must_use]
pub fn processed_dir_for(watch_root: &Utf8Path) -> Utf8PathBuf {
    watch_root.join("processed")
}

/// Configuration for the external document generator program.
///
/// Each argument may contain placeholders that are substituted per request:
/// `{data}`, `{template}`, `{output}`, `{output_stem}`, `{terminal}` and
/// `{auto_open}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program to run. `None` means no generator has been configured.
    pub program: Option<String>,

    /// Argument templates passed to the program.
    pub args: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: vec![
                "{data}".to_owned(),
                "{template}".to_owned(),
                "{output}".to_owned(),
            ],
        }
    }
}

/// Root configuration for docdrop.
///
/// # Examples
///
/// ```
/// use dd_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.targets.len(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings shared by every watch engine.
    pub watch: WatchSettings,

    /// Directories to watch.
    pub targets: Vec<WatchTarget>,

    /// External generator settings.
    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch: WatchSettings::default(),
            targets: vec![
                WatchTarget::new("profile/input", "profile/output"),
                WatchTarget::new("mhdocuments/input", "mhdocuments/output"),
            ],
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from JSON, normalizes and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.watch.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks the configuration for values that would prevent watching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watch.validate()?;

        if self.targets.is_empty() {
            return Err(ConfigError::invalid_option(
                "targets",
                "at least one watch target is required",
            ));
        }

        for target in &self.targets {
            if target.input.as_str().is_empty() {
                return Err(ConfigError::InvalidPath {
                    path: target.input.clone(),
                    reason: "input directory must not be empty".to_owned(),
                });
            }
            if lexically_normalized(&target.input) == lexically_normalized(&target.output) {
                return Err(ConfigError::InvalidPath {
                    path: target.input.clone(),
                    reason: "input and output directories must differ".to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// Drops `.` components and folds `..` into its parent where one is known,
/// without touching the filesystem.
fn lexically_normalized(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir
                if matches!(
                    normalized.components().next_back(),
                    Some(Utf8Component::Normal(_))
                ) =>
            {
                normalized.pop();
            }
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}
