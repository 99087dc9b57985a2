//! Event types for filesystem notifications.
//!
//! Raw notifications are classified on the notifier thread. Only creations
//! and content changes survive; reads, attribute changes and removals are
//! dropped before they reach an engine.
//!
//! # Event Flow
//!
//! ```text
//! File dropped / rewritten
//!        │
//!        ▼
//! notify (RecommendedWatcher, non-recursive)
//!        │
//!        ▼
//!   FileEventKind::from_notify (create / modify only)
//!        │
//!        ▼
//!   DropFilter (recognized extensions only)
//!        │
//!        ▼
//!   FileEventBatch sent via channel to the engine loop
//! ```

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::ModifyKind;
use smallvec::SmallVec;

/// The kind of change an engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    /// A file appeared in the watch root, by creation or by being moved in.
    Created,

    /// A file's contents changed.
    Modified,
}

impl FileEventKind {
    /// Classifies a raw notification.
    ///
    /// Returns `None` for accesses, metadata-only changes, removals and
    /// anything else that cannot make a file newly ready. Reads in
    /// particular must not count: a generator opening its inputs would
    /// otherwise re-track a pair it just consumed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dd_watcher::FileEventKind;
    /// use notify::EventKind;
    /// use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};
    ///
    /// assert_eq!(
    ///     FileEventKind::from_notify(&EventKind::Create(CreateKind::File)),
    ///     Some(FileEventKind::Created)
    /// );
    /// assert_eq!(
    ///     FileEventKind::from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
    ///     Some(FileEventKind::Modified)
    /// );
    /// assert_eq!(FileEventKind::from_notify(&EventKind::Access(AccessKind::Any)), None);
    /// ```
    #[must_use]
    pub const fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    /// Returns a short label for log output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

/// A notification that a file in a watch root was created or modified.
///
/// # Examples
///
/// ```
/// use dd_watcher::{FileEvent, FileEventKind};
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/in/report.txt"), FileEventKind::Created);
/// assert_eq!(event.file_name(), Some("report.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the file that changed.
    pub path: Utf8PathBuf,

    /// What happened to it.
    pub kind: FileEventKind,
}

impl FileEvent {
    /// Creates a new file event.
    #[inline]
    #[must_use]
    pub const fn new(path: Utf8PathBuf, kind: FileEventKind) -> Self {
        Self { path, kind }
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// A batch of file events delivered together.
///
/// Uses [`SmallVec`] with inline storage for up to 8 events; a typical
/// notification names a single file.
#[derive(Debug, Clone, Default)]
pub struct FileEventBatch {
    /// The events in this batch.
    pub events: SmallVec<[FileEvent; 8]>,
}

impl FileEventBatch {
    /// Returns the number of events in this batch.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the batch contains no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns one event per path, sorted by path.
    ///
    /// Duplicate notifications for one file collapse to a single event, so
    /// each file is inspected once per batch. The first event for a path is
    /// kept.
    #[must_use]
    pub fn unique(&self) -> Vec<&FileEvent> {
        let mut events: Vec<&FileEvent> = self.events.iter().collect();
        events.sort_by(|a, b| a.path.cmp(&b.path));
        events.dedup_by(|a, b| a.path == b.path);
        events
    }
}

impl FromIterator<FileEvent> for FileEventBatch {
    fn from_iter<T: IntoIterator<Item = FileEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Summary statistics for a batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBatchStats {
    /// Total number of events in the batch.
    pub total_events: usize,

    /// Number of unique files affected.
    pub unique_files: usize,
}

impl EventBatchStats {
    /// Computes statistics for a batch of events.
    #[must_use]
    pub fn from_batch(batch: &FileEventBatch) -> Self {
        Self {
            total_events: batch.len(),
            unique_files: batch.unique().len(),
        }
    }
}
