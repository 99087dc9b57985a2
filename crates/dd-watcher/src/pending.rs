//! Pending maps of files awaiting a partner.
//!
//! [`PendingSets`] holds the most recent observation of every recognized
//! file, keyed by base name, one map per [`FileRole`]. Both maps sit behind a
//! single lock so that "both present, both settled, remove both" happens as
//! one step: a pair handed out by [`PendingSets::take_settled`] can never be
//! handed out again.

use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use dd_core::{FileRole, FxHashMap, MatchedPair, TrackedFile, fx_hash_map};

#[derive(Debug, Default)]
struct PendingMaps {
    data: FxHashMap<String, TrackedFile>,
    templates: FxHashMap<String, TrackedFile>,
}

impl PendingMaps {
    fn map(&self, role: FileRole) -> &FxHashMap<String, TrackedFile> {
        match role {
            FileRole::Data => &self.data,
            FileRole::Template => &self.templates,
        }
    }

    fn map_mut(&mut self, role: FileRole) -> &mut FxHashMap<String, TrackedFile> {
        match role {
            FileRole::Data => &mut self.data,
            FileRole::Template => &mut self.templates,
        }
    }
}

/// The data and template maps owned by one engine.
///
/// # Examples
///
/// ```
/// use dd_watcher::PendingSets;
/// use dd_core::{FileRole, TrackedFile};
/// use std::time::SystemTime;
///
/// let pending = PendingSets::new();
/// let now = SystemTime::now();
/// pending.insert(TrackedFile::new("report", "/in/report.txt", now, FileRole::Data));
/// pending.insert(TrackedFile::new("report", "/in/report.txt", now, FileRole::Data));
///
/// assert_eq!(pending.len(FileRole::Data), 1);
/// assert_eq!(pending.len(FileRole::Template), 0);
/// ```
#[derive(Debug)]
pub struct PendingSets {
    inner: Mutex<PendingMaps>,
}

impl PendingSets {
    /// Creates empty pending maps.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PendingMaps {
                data: fx_hash_map(),
                templates: fx_hash_map(),
            }),
        }
    }

    /// Records an observation, replacing any earlier one with the same base
    /// name and role.
    ///
    /// Returns the replaced entry. Replacing resets the stability clock to the
    /// new file's modification time.
    pub fn insert(&self, file: TrackedFile) -> Option<TrackedFile> {
        let mut maps = self.inner.lock();
        maps.map_mut(file.role).insert(file.base_name.clone(), file)
    }

    /// Returns a copy of the tracked file for a base name and role.
    #[must_use]
    pub fn get(&self, role: FileRole, base_name: &str) -> Option<TrackedFile> {
        self.inner.lock().map(role).get(base_name).cloned()
    }

    /// Returns `true` if a file with this base name and role is tracked.
    #[must_use]
    pub fn contains(&self, role: FileRole, base_name: &str) -> bool {
        self.inner.lock().map(role).contains_key(base_name)
    }

    /// Returns the number of tracked files with the given role.
    #[must_use]
    pub fn len(&self, role: FileRole) -> usize {
        self.inner.lock().map(role).len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let maps = self.inner.lock();
        maps.data.is_empty() && maps.templates.is_empty()
    }

    /// Removes and returns every pair whose two files are settled at `now`.
    ///
    /// A base name qualifies when both maps contain it and both files have
    /// been unmodified for longer than `window` and still exist. Qualifying
    /// entries are removed from both maps under the same lock that found
    /// them. Pairs are returned sorted by base name.
    pub fn take_settled(&self, now: SystemTime, window: Duration) -> Vec<MatchedPair> {
        let mut maps = self.inner.lock();

        let mut ready: Vec<String> = maps
            .data
            .iter()
            .filter_map(|(base_name, data)| {
                let template = maps.templates.get(base_name)?;
                (data.is_settled(now, window) && template.is_settled(now, window))
                    .then(|| base_name.clone())
            })
            .collect();
        ready.sort_unstable();

        ready
            .into_iter()
            .filter_map(|base_name| {
                let data = maps.data.remove(&base_name)?;
                let template = maps.templates.remove(&base_name)?;
                Some(MatchedPair::new(base_name, data, template))
            })
            .collect()
    }
}

impl Default for PendingSets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::{Utf8Path, Utf8PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const WINDOW: Duration = Duration::from_millis(2000);

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
        t0: SystemTime,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("Invalid path");
            Self {
                _dir: dir,
                root,
                t0: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
            }
        }

        fn file(&self, name: &str, role: FileRole, offset_ms: u64) -> TrackedFile {
            let path = self.root.join(name);
            std::fs::write(&path, name).expect("Failed to write file");
            TrackedFile::from_path(path, role, self.t0 + Duration::from_millis(offset_ms))
                .expect("Path has a file name")
        }

        fn at(&self, offset_ms: u64) -> SystemTime {
            self.t0 + Duration::from_millis(offset_ms)
        }
    }

    #[test]
    fn test_settled_pair_is_taken_once() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        pending.insert(fx.file("report.txt", FileRole::Data, 0));
        pending.insert(fx.file("Report.docx", FileRole::Template, 0));

        let pairs = pending.take_settled(fx.at(2001), WINDOW);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].base_name, "report");
        assert_eq!(pairs[0].template.file_name(), Some("Report.docx"));
        assert!(pending.is_empty());

        assert!(pending.take_settled(fx.at(5000), WINDOW).is_empty());
    }

    #[test]
    fn test_unsettled_pair_stays_pending() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        pending.insert(fx.file("report.txt", FileRole::Data, 0));
        pending.insert(fx.file("report.xlsx", FileRole::Template, 500));

        // Data is settled, template is not
        assert!(pending.take_settled(fx.at(2100), WINDOW).is_empty());
        assert!(pending.contains(FileRole::Data, "report"));
        assert!(pending.contains(FileRole::Template, "report"));

        assert_eq!(pending.take_settled(fx.at(2501), WINDOW).len(), 1);
    }

    #[test]
    fn test_rewrite_resets_stability_clock() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        pending.insert(fx.file("data.txt", FileRole::Data, 0));
        pending.insert(fx.file("data.pptx", FileRole::Template, 0));

        // Rewritten at t=1000ms
        let previous = pending.insert(fx.file("data.txt", FileRole::Data, 1000));
        assert_eq!(previous.map(|f| f.last_modified), Some(fx.at(0)));

        assert!(pending.take_settled(fx.at(2500), WINDOW).is_empty());
        assert!(pending.take_settled(fx.at(3000), WINDOW).is_empty());
        assert_eq!(pending.take_settled(fx.at(3001), WINDOW).len(), 1);
    }

    #[test]
    fn test_removed_file_prevents_match() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        let data = fx.file("memo.txt", FileRole::Data, 0);
        pending.insert(data.clone());
        pending.insert(fx.file("memo.docx", FileRole::Template, 0));

        std::fs::remove_file(&data.path).expect("Failed to remove file");

        assert!(pending.take_settled(fx.at(10_000), WINDOW).is_empty());
        assert!(pending.contains(FileRole::Template, "memo"));
        assert_eq!(pending.len(FileRole::Template), 1);
    }

    #[test]
    fn test_unpaired_files_never_match() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        pending.insert(fx.file("alpha.txt", FileRole::Data, 0));
        pending.insert(fx.file("beta.docx", FileRole::Template, 0));

        assert!(pending.take_settled(fx.at(60_000), WINDOW).is_empty());
        assert_eq!(pending.len(FileRole::Data), 1);
        assert_eq!(pending.len(FileRole::Template), 1);
    }

    #[test]
    fn test_duplicate_observations_keep_one_entry() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        for offset in [0, 100, 50, 300] {
            pending.insert(fx.file("dup.txt", FileRole::Data, offset));
        }

        assert_eq!(pending.len(FileRole::Data), 1);
        assert_eq!(
            pending.get(FileRole::Data, "dup").map(|f| f.last_modified),
            Some(fx.at(300))
        );
    }

    #[test]
    fn test_pairs_sorted_by_base_name() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        for name in ["charlie", "alpha", "bravo"] {
            pending.insert(fx.file(&format!("{name}.txt"), FileRole::Data, 0));
            pending.insert(fx.file(&format!("{name}.docx"), FileRole::Template, 0));
        }

        let names: Vec<_> = pending
            .take_settled(fx.at(3000), WINDOW)
            .into_iter()
            .map(|p| p.base_name)
            .collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_concurrent_sweeps_take_each_pair_once() {
        let fx = Fixture::new();
        let pending = PendingSets::new();
        for i in 0..32 {
            pending.insert(fx.file(&format!("doc{i}.txt"), FileRole::Data, 0));
            pending.insert(fx.file(&format!("doc{i}.xlsx"), FileRole::Template, 0));
        }

        let taken = AtomicUsize::new(0);
        let now = fx.at(3000);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let pairs = pending.take_settled(now, WINDOW);
                    taken.fetch_add(pairs.len(), Ordering::SeqCst);
                });
            }
        });

        assert_eq!(taken.load(Ordering::SeqCst), 32);
        assert!(pending.is_empty());
    }
}
