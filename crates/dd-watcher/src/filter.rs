//! File filtering and classification for watch events.
//!
//! The [`FileFilter`] trait is applied on the notifier thread, before events
//! reach an engine, so files that can never form a pair never cross the
//! channel. [`DropFilter`] is the filter every engine uses: it recognizes
//! data and template extensions and turns an on-disk file into a
//! [`TrackedFile`].
//!
//! # Examples
//!
//! ```
//! use dd_watcher::{DropFilter, FileFilter};
//! use dd_core::{FileRole, WatchSettings};
//! use camino::Utf8Path;
//!
//! let filter = DropFilter::new(&WatchSettings::default());
//!
//! assert_eq!(filter.role_of(Utf8Path::new("in/q3.txt")), Some(FileRole::Data));
//! assert_eq!(filter.role_of(Utf8Path::new("in/Q3.DOCX")), Some(FileRole::Template));
//! assert!(!filter.should_process(Utf8Path::new("in/q3.pdf")));
//! ```

use camino::Utf8Path;
use smallvec::SmallVec;

use dd_core::{FileRole, TrackedFile, WatchSettings, normalize_extension};

use crate::error::WatchError;

/// A filter for determining which file events to forward.
///
/// Filters must be [`Send`] and [`Sync`] because they run on the notifier
/// thread, and `'static` to be moved into its callback.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the event for the given path should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Recognizes dropped data and template files by extension.
///
/// Extensions are compared case-insensitively. A leading dot is part of the
/// base name, so `.draft.txt` pairs with `.draft.docx`.
#[derive(Debug, Clone)]
pub struct DropFilter {
    /// Normalized data extension.
    data_extension: String,

    /// Normalized template extensions.
    template_extensions: SmallVec<[String; 4]>,
}

impl DropFilter {
    /// Creates a filter recognizing the extensions in `settings`.
    #[must_use]
    pub fn new(settings: &WatchSettings) -> Self {
        Self {
            data_extension: normalize_extension(&settings.data_extension),
            template_extensions: settings
                .template_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Returns the role of the file at `path`, judged by name alone.
    #[must_use]
    pub fn role_of(&self, path: &Utf8Path) -> Option<FileRole> {
        let ext = normalize_extension(path.extension()?);
        if ext == self.data_extension {
            Some(FileRole::Data)
        } else if self.template_extensions.contains(&ext) {
            Some(FileRole::Template)
        } else {
            None
        }
    }

    /// Inspects the file at `path` and returns it as a [`TrackedFile`].
    ///
    /// Returns `Ok(None)` for unrecognized extensions, directories, and files
    /// that vanished before they could be inspected.
    pub fn observe(&self, path: &Utf8Path) -> Result<Option<TrackedFile>, WatchError> {
        let Some(role) = self.role_of(path) else {
            return Ok(None);
        };

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WatchError::inspect(path, e)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }
        let modified = metadata
            .modified()
            .map_err(|e| WatchError::inspect(path, e))?;

        Ok(TrackedFile::from_path(path.to_path_buf(), role, modified))
    }
}

impl FileFilter for DropFilter {
    #[inline]
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.role_of(path).is_some()
    }
}
