//! The document generator interface.
//!
//! Engines never produce documents themselves. When a pair settles they build
//! a [`GenerateRequest`] and hand it to a [`Generator`]. The call runs on the
//! blocking thread pool, so a slow or hung generator stalls only the engine
//! that invoked it.
//!
//! [`CommandGenerator`] delegates to an external program configured through
//! [`GeneratorConfig`].

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use dd_core::{GeneratorConfig, MatchedPair};

use crate::error::GenerateError;

/// Generators always run in terminal mode when driven by a watch engine.
pub const TERMINAL_MODE: bool = true;

/// Generated documents are never opened automatically by a watch engine.
pub const AUTO_OPEN: bool = false;

/// One request to turn a data file and a template file into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Base name shared by the pair.
    pub base_name: String,

    /// Path of the data file.
    pub data_path: Utf8PathBuf,

    /// Path of the template file.
    pub template_path: Utf8PathBuf,

    /// Output path without extension: `output_root/base_name`.
    pub output_stem: Utf8PathBuf,

    /// Extension the output keeps, taken from the template (lowercase).
    pub output_extension: String,

    /// Run without interactive prompts.
    pub terminal_mode: bool,

    /// Open the generated document when done.
    pub auto_open: bool,
}

impl GenerateRequest {
    /// Builds the request an engine issues for a matched pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use dd_watcher::GenerateRequest;
    /// use dd_core::{FileRole, MatchedPair, TrackedFile};
    /// use camino::Utf8Path;
    /// use std::time::SystemTime;
    ///
    /// let now = SystemTime::now();
    /// let pair = MatchedPair::new(
    ///     "status",
    ///     TrackedFile::new("status", "/in/status.txt", now, FileRole::Data),
    ///     TrackedFile::new("status", "/in/Status.docx", now, FileRole::Template),
    /// );
    /// let request = GenerateRequest::for_pair(&pair, Utf8Path::new("/out"));
    ///
    /// assert_eq!(request.output_stem, "/out/status");
    /// assert_eq!(request.output_path(), "/out/status.docx");
    /// assert!(request.terminal_mode);
    /// assert!(!request.auto_open);
    /// ```
    #[must_use]
    pub fn for_pair(pair: &MatchedPair, output_root: &Utf8Path) -> Self {
        Self {
            base_name: pair.base_name.clone(),
            data_path: pair.data.path.clone(),
            template_path: pair.template.path.clone(),
            output_stem: pair.output_stem(output_root),
            output_extension: pair.template_extension(),
            terminal_mode: TERMINAL_MODE,
            auto_open: AUTO_OPEN,
        }
    }

    /// Returns the full output path: the stem plus the template's extension.
    #[must_use]
    pub fn output_path(&self) -> Utf8PathBuf {
        if self.output_extension.is_empty() {
            self.output_stem.clone()
        } else {
            Utf8PathBuf::from(format!("{}.{}", self.output_stem, self.output_extension))
        }
    }
}

/// The result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// Where the document was written.
    pub path: Utf8PathBuf,
}

/// Turns a data file and a template file into an output document.
///
/// Implementations are called from the blocking thread pool and may block.
///
/// # Examples
///
/// ```
/// use dd_watcher::{GenerateError, GenerateRequest, GeneratedDocument, Generator};
///
/// struct Touch;
///
/// impl Generator for Touch {
///     fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDocument, GenerateError> {
///         let path = request.output_path();
///         std::fs::write(&path, b"").map_err(|e| GenerateError::other(e.to_string()))?;
///         Ok(GeneratedDocument { path })
///     }
/// }
/// ```
pub trait Generator: Send + Sync + 'static {
    /// Generates the document described by `request`.
    fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDocument, GenerateError>;
}

/// Runs an external program to generate each document.
///
/// Argument templates may contain the placeholders `{data}`, `{template}`,
/// `{output}`, `{output_stem}`, `{terminal}` and `{auto_open}`; each is
/// replaced with the corresponding request value.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Creates a generator running `program` with the given argument templates.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Creates a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotConfigured`] if no program is set.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        match config.program.as_deref() {
            Some(program) if !program.trim().is_empty() => {
                Ok(Self::new(program, config.args.clone()))
            }
            _ => Err(GenerateError::NotConfigured),
        }
    }

    /// Returns the program this generator runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Expands the argument templates for one request.
    #[must_use]
    pub fn expand_args(&self, request: &GenerateRequest) -> Vec<String> {
        let output = request.output_path();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{data}", request.data_path.as_str())
                    .replace("{template}", request.template_path.as_str())
                    .replace("{output_stem}", request.output_stem.as_str())
                    .replace("{output}", output.as_str())
                    .replace("{terminal}", bool_flag(request.terminal_mode))
                    .replace("{auto_open}", bool_flag(request.auto_open))
            })
            .collect()
    }
}

const fn bool_flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

impl Generator for CommandGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDocument, GenerateError> {
        let args = self.expand_args(request);
        debug!(program = %self.program, ?args, "Running generator");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| GenerateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GenerateError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(GeneratedDocument {
            path: request.output_path(),
        })
    }
}
