//! Tracked file types for pairing dropped files.
//!
//! A [`TrackedFile`] is the most recent observation of one candidate file in
//! a watched directory. Two tracked files with the same base name and
//! opposite roles form a [`MatchedPair`] once both have settled.

use std::time::{Duration, SystemTime};

use camino::{Utf8Path, Utf8PathBuf};

use super::role::FileRole;
use crate::config::normalize_extension;

/// Derives the pairing key for a file: its name without the final extension,
/// lower-cased.
///
/// Returns `None` when the path has no file name.
///
/// # Examples
///
/// ```
/// use dd_core::base_name_of;
/// use camino::Utf8Path;
///
/// assert_eq!(base_name_of(Utf8Path::new("/in/Quarterly.TXT")).as_deref(), Some("quarterly"));
/// assert_eq!(base_name_of(Utf8Path::new("in/q3.final.docx")).as_deref(), Some("q3.final"));
/// ```
#[must_use]
pub fn base_name_of(path: &Utf8Path) -> Option<String> {
    path.file_stem().map(str::to_lowercase)
}

/// One observed candidate file awaiting a partner.
///
/// # Examples
///
/// ```
/// use dd_core::{FileRole, TrackedFile};
/// use camino::Utf8PathBuf;
/// use std::time::{Duration, SystemTime};
///
/// let modified = SystemTime::UNIX_EPOCH;
/// let file = TrackedFile::from_path(Utf8PathBuf::from("/in/Report.txt"), FileRole::Data, modified)
///     .unwrap();
/// assert_eq!(file.base_name, "report");
/// assert_eq!(file.age(modified + Duration::from_secs(3)), Some(Duration::from_secs(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Lower-cased file name without its final extension.
    pub base_name: String,

    /// Absolute path the file was observed at.
    pub path: Utf8PathBuf,

    /// Modification time recorded at observation.
    pub last_modified: SystemTime,

    /// Whether this is the data or the template half of a pair.
    pub role: FileRole,
}

impl TrackedFile {
    /// Creates a tracked file with an explicit base name.
    #[must_use]
    pub fn new(
        base_name: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
        last_modified: SystemTime,
        role: FileRole,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            path: path.into(),
            last_modified,
            role,
        }
    }

    /// Creates a tracked file, deriving the base name from the path.
    ///
    /// Returns `None` when the path has no file name.
    #[must_use]
    pub fn from_path(path: Utf8PathBuf, role: FileRole, last_modified: SystemTime) -> Option<Self> {
        let base_name = base_name_of(&path)?;
        Some(Self {
            base_name,
            path,
            last_modified,
            role,
        })
    }

    /// Returns how long ago the file was last modified, relative to `now`.
    ///
    /// Returns `None` when the modification time lies after `now`.
    #[inline]
    #[must_use]
    pub fn age(&self, now: SystemTime) -> Option<Duration> {
        now.duration_since(self.last_modified).ok()
    }

    /// Returns `true` if the file has been quiet for longer than `window`,
    /// ignoring whether it still exists.
    #[inline]
    #[must_use]
    pub fn is_quiet(&self, now: SystemTime, window: Duration) -> bool {
        self.age(now).is_some_and(|age| age > window)
    }

    /// Returns `true` if the file is safe to consume: quiet for longer than
    /// `window` and still present at the recorded path.
    #[must_use]
    pub fn is_settled(&self, now: SystemTime, window: Duration) -> bool {
        self.is_quiet(now, window) && self.path.exists()
    }

    /// Returns the file's extension, normalized to lowercase.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.path.extension().map(normalize_extension)
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// A data file and a template file sharing a base name, both settled.
///
/// Pairs exist only between removal from the pending maps and dispatch to
/// the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    /// The shared base name.
    pub base_name: String,

    /// The data half of the pair.
    pub data: TrackedFile,

    /// The template half of the pair.
    pub template: TrackedFile,
}

impl MatchedPair {
    /// Creates a new matched pair.
    #[must_use]
    pub fn new(base_name: impl Into<String>, data: TrackedFile, template: TrackedFile) -> Self {
        Self {
            base_name: base_name.into(),
            data,
            template,
        }
    }

    /// Returns the template's extension, which the generated document keeps.
    #[must_use]
    pub fn template_extension(&self) -> String {
        self.template.extension().unwrap_or_default()
    }

    /// Returns the output path without extension: `output_root/base_name`.
    #[must_use]
    pub fn output_stem(&self, output_root: &Utf8Path) -> Utf8PathBuf {
        output_root.join(&self.base_name)
    }

    /// Returns the full output path: `output_root/base_name.<template ext>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dd_core::{FileRole, MatchedPair, TrackedFile};
    /// use camino::Utf8Path;
    /// use std::time::SystemTime;
    ///
    /// let now = SystemTime::now();
    /// let pair = MatchedPair::new(
    ///     "q3.final",
    ///     TrackedFile::new("q3.final", "/in/q3.final.txt", now, FileRole::Data),
    ///     TrackedFile::new("q3.final", "/in/Q3.final.PPTX", now, FileRole::Template),
    /// );
    /// assert_eq!(pair.output_path(Utf8Path::new("/out")), "/out/q3.final.pptx");
    /// ```
    #[must_use]
    pub fn output_path(&self, output_root: &Utf8Path) -> Utf8PathBuf {
        let stem = self.output_stem(output_root);
        let ext = self.template_extension();
        if ext.is_empty() {
            stem
        } else {
            // set_extension would clobber dots inside the base name
            Utf8PathBuf::from(format!("{stem}.{ext}"))
        }
    }
}
