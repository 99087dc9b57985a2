//! The per-directory watch engine.
//!
//! A [`WatchEngine`] owns one watched input directory. It classifies files
//! as they appear, waits for both halves of a pair to settle, hands settled
//! pairs to a [`Generator`], and moves the sources into `processed/`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Notifier Thread (notify)                     │
//! │  ┌───────────────────┐    ┌───────────────┐    ┌────────────┐   │
//! │  │ RecommendedWatcher│ -> │ FileEventKind │ -> │ DropFilter │   │
//! │  │ (non-recursive)   │    │ create/modify │    │            │   │
//! │  └───────────────────┘    └───────────────┘    └─────┬──────┘   │
//! └──────────────────────────────────────────────────────│──────────┘
//!                                                        │
//!                                    blocking_send batch │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Engine Task (tokio)                          │
//! │  wait ≤ poll interval ─► categorize ─► PendingSets ─► sweep     │
//! │                                                         │       │
//! │       spawn_blocking(Generator, then relocate) ◄────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! 1. **Spawn**: [`WatchEngine::spawn`] creates the watch and output
//!    directories and registers the notification subscription. Failures are
//!    returned to the caller.
//! 2. **Seed**: the engine task scans files already present and sweeps once.
//! 3. **Run**: each iteration waits up to one poll interval for events,
//!    categorizes them, and sweeps.
//! 4. **Stop**: cancellation, a closed notification channel, or removal of
//!    the watch root ends the loop. An in-flight generation completes first.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use dd_core::{MatchedPair, WatchSettings, WatchTarget};

use crate::error::{GenerateError, WatchError};
use crate::events::{EventBatchStats, FileEvent, FileEventBatch, FileEventKind};
use crate::filter::{DropFilter, FileFilter};
use crate::generator::{GenerateRequest, GeneratedDocument, Generator};
use crate::pending::PendingSets;
use crate::relocate::relocate_pair;

/// Why an engine's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineExit {
    /// The engine was asked to stop.
    Cancelled,

    /// The notification source went away.
    ChannelClosed,

    /// The watch root was deleted, so the subscription is no longer valid.
    RootRemoved,
}

impl EngineExit {
    /// Returns a short label for log output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::ChannelClosed => "channel closed",
            Self::RootRemoved => "watch root removed",
        }
    }
}

impl std::fmt::Display for EngineExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A running watcher for one input directory.
///
/// Dropping the engine requests cancellation but does not wait for the task;
/// use [`WatchEngine::shutdown`] or [`WatchEngine::join`] for that.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use dd_core::{WatchSettings, WatchTarget};
/// use dd_watcher::{CommandGenerator, WatchEngine};
///
/// # async fn example() -> Result<(), dd_watcher::WatchError> {
/// let generator = Arc::new(CommandGenerator::new("render", vec!["{data}".into()]));
/// let engine = WatchEngine::spawn(
///     &WatchTarget::new("profile/input", "profile/output"),
///     &WatchSettings::default(),
///     generator,
/// )?;
///
/// // ... later
/// engine.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct WatchEngine {
    /// Cancellation signal observed by the engine task.
    cancel: CancellationToken,

    /// Handle to the engine task. `None` once joined.
    task_handle: Option<JoinHandle<EngineExit>>,

    /// Files awaiting a partner, shared with the engine task.
    pending: Arc<PendingSets>,

    /// Canonical watch root.
    watch_root: Utf8PathBuf,

    /// Canonical output root.
    output_root: Utf8PathBuf,
}

impl std::fmt::Debug for WatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchEngine")
            .field("watch_root", &self.watch_root)
            .field("output_root", &self.output_root)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl WatchEngine {
    /// Creates the target's directories, subscribes to notifications on the
    /// watch root, and spawns the engine task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::CreateDir`] if either directory cannot be
    /// created, or [`WatchError::Notify`] if the subscription fails.
    pub fn spawn(
        target: &WatchTarget,
        settings: &WatchSettings,
        generator: Arc<dyn Generator>,
    ) -> Result<Self, WatchError> {
        let watch_root = ensure_dir(&target.input)?;
        let output_root = ensure_dir(&target.output)?;

        let filter = DropFilter::new(settings);
        let (event_tx, event_rx) = mpsc::channel(settings.channel_capacity.max(1));
        let watcher = start_notifier(&watch_root, filter.clone(), event_tx)?;

        let cancel = CancellationToken::new();
        let pending = Arc::new(PendingSets::new());

        let engine_loop = EngineLoop {
            watch_root: watch_root.clone(),
            output_root: output_root.clone(),
            filter,
            pending: Arc::clone(&pending),
            generator,
            stability_window: settings.stability_window(),
            poll_interval: settings.poll_interval(),
            cancel: cancel.clone(),
        };
        let task_handle = tokio::spawn(engine_loop.run(watcher, event_rx));

        info!(
            watch_root = %watch_root,
            output_root = %output_root,
            "Watch engine initialized"
        );

        Ok(Self {
            cancel,
            task_handle: Some(task_handle),
            pending,
            watch_root,
            output_root,
        })
    }

    /// Returns the canonical watch root.
    #[must_use]
    pub fn watch_root(&self) -> &Utf8Path {
        &self.watch_root
    }

    /// Returns the canonical output root.
    #[must_use]
    pub fn output_root(&self) -> &Utf8Path {
        &self.output_root
    }

    /// Returns the engine's pending maps.
    #[must_use]
    pub fn pending(&self) -> &PendingSets {
        &self.pending
    }

    /// Returns `true` while the engine task is running and not cancelled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
            && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Requests the engine to stop. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the engine task to finish.
    ///
    /// Returns `None` if the task was already joined or panicked.
    pub async fn join(&mut self) -> Option<EngineExit> {
        let handle = self.task_handle.take()?;
        match handle.await {
            Ok(exit) => Some(exit),
            Err(join_error) => {
                error!(watch_root = %self.watch_root, error = %join_error, "Watch engine task failed");
                None
            }
        }
    }

    /// Cancels the engine and waits for its task to finish.
    pub async fn shutdown(mut self) -> Option<EngineExit> {
        self.cancel();
        self.join().await
    }
}

impl Drop for WatchEngine {
    fn drop(&mut self) {
        // Drop is sync, so the task is signalled but not awaited
        self.cancel.cancel();
    }
}

/// Creates `path` if needed and returns its canonical form.
fn ensure_dir(path: &Utf8Path) -> Result<Utf8PathBuf, WatchError> {
    std::fs::create_dir_all(path).map_err(|e| WatchError::create_dir(path, e))?;
    path.canonicalize_utf8().map_err(|e| WatchError::inspect(path, e))
}

/// Turns one raw notification into the batch an engine consumes.
///
/// Only creations and content changes of recognized files survive.
fn batch_from_notify<F: FileFilter>(event: Event, filter: &F) -> FileEventBatch {
    let Some(kind) = FileEventKind::from_notify(&event.kind) else {
        trace!(kind = ?event.kind, "Ignoring notification kind");
        return FileEventBatch::default();
    };

    event
        .paths
        .into_iter()
        .filter_map(|path| match Utf8PathBuf::try_from(path) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(
                    error = %WatchError::non_utf8_path(e.into_path_buf()),
                    "Skipping file event"
                );
                None
            }
        })
        .filter(|path| filter.should_process(path))
        .map(|path| FileEvent::new(path, kind))
        .collect()
}

/// Subscribes to non-recursive notifications on `root`, forwarding filtered
/// batches into `event_tx`.
fn start_notifier<F: FileFilter>(
    root: &Utf8Path,
    filter: F,
    event_tx: mpsc::Sender<FileEventBatch>,
) -> Result<RecommendedWatcher, WatchError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let batch = batch_from_notify(event, &filter);
            if batch.is_empty() {
                return;
            }
            // The notifier runs on its own thread, outside the runtime
            if event_tx.blocking_send(batch).is_err() {
                debug!("Event channel closed, dropping batch");
            }
        }
        Err(error) => warn!(error = %error, "Notifier error"),
    })?;

    watcher.watch(root.as_std_path(), RecursiveMode::NonRecursive)?;

    Ok(watcher)
}

/// Records the file at `path` in `pending` if it is a recognized regular
/// file. Returns `true` if it was recorded.
fn categorize(filter: &DropFilter, pending: &PendingSets, path: &Utf8Path) -> bool {
    match filter.observe(path) {
        Ok(Some(file)) => {
            debug!(
                role = %file.role,
                base_name = %file.base_name,
                path = %file.path,
                "Tracking file"
            );
            pending.insert(file);
            true
        }
        Ok(None) => {
            trace!(path = %path, "Ignoring path");
            false
        }
        Err(e) => {
            warn!(error = %e, "Could not inspect file, skipping");
            false
        }
    }
}

/// Seeds `pending` from files already in `watch_root`. Blocking.
fn scan_existing(watch_root: &Utf8Path, filter: &DropFilter, pending: &PendingSets) -> usize {
    let entries = match std::fs::read_dir(watch_root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %WatchError::inspect(watch_root, e), "Initial scan failed");
            return 0;
        }
    };

    let mut tracked = 0_usize;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => {
                if categorize(filter, pending, &path) {
                    tracked += 1;
                }
            }
            Err(path) => {
                warn!(error = %WatchError::non_utf8_path(path), "Skipping file");
            }
        }
    }
    tracked
}

/// Generates one document, then moves its sources. Blocking.
fn generate_and_relocate(
    generator: &dyn Generator,
    request: &GenerateRequest,
    watch_root: &Utf8Path,
    pair: &MatchedPair,
) -> Result<GeneratedDocument, GenerateError> {
    let document = generator.generate(request)?;
    info!(base_name = %pair.base_name, output = %document.path, "Document generated");

    match relocate_pair(watch_root, pair) {
        Ok(moved) => debug!(count = moved.len(), "Moved processed files"),
        Err(e) => warn!(error = %e, "Could not move processed files"),
    }
    Ok(document)
}

/// State moved into the engine task.
struct EngineLoop {
    watch_root: Utf8PathBuf,
    output_root: Utf8PathBuf,
    filter: DropFilter,
    pending: Arc<PendingSets>,
    generator: Arc<dyn Generator>,
    stability_window: Duration,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl EngineLoop {
    async fn run(
        self,
        watcher: RecommendedWatcher,
        mut events: mpsc::Receiver<FileEventBatch>,
    ) -> EngineExit {
        info!(watch_root = %self.watch_root, "Watch engine started");

        self.seed().await;
        self.sweep().await;

        let exit = loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break EngineExit::Cancelled,

                received = tokio::time::timeout(self.poll_interval, events.recv()) => {
                    match received {
                        Err(_elapsed) => trace!(watch_root = %self.watch_root, "No events, sweeping"),
                        Ok(None) => break EngineExit::ChannelClosed,
                        Ok(Some(batch)) => {
                            self.handle_batch(&batch);
                            while let Ok(batch) = events.try_recv() {
                                self.handle_batch(&batch);
                            }
                        }
                    }
                }
            }

            if !self.watch_root.is_dir() {
                break EngineExit::RootRemoved;
            }

            self.sweep().await;
        };

        // Close the receiver first so a notifier blocked on a full channel
        // is released before the subscription is torn down.
        drop(events);
        drop(watcher);

        info!(watch_root = %self.watch_root, reason = %exit, "Watch engine stopped");
        exit
    }

    /// Runs the initial directory scan on the blocking pool.
    async fn seed(&self) {
        let watch_root = self.watch_root.clone();
        let filter = self.filter.clone();
        let pending = Arc::clone(&self.pending);

        match tokio::task::spawn_blocking(move || scan_existing(&watch_root, &filter, &pending))
            .await
        {
            Ok(tracked) => info!(watch_root = %self.watch_root, tracked, "Initial scan complete"),
            Err(join_error) => error!(error = %join_error, "Initial scan aborted"),
        }
    }

    fn handle_batch(&self, batch: &FileEventBatch) {
        let stats = EventBatchStats::from_batch(batch);
        trace!(
            total_events = stats.total_events,
            unique_files = stats.unique_files,
            "Received event batch"
        );

        for event in batch.unique() {
            trace!(path = %event.path, kind = event.kind.label(), "File event");
            categorize(&self.filter, &self.pending, &event.path);
        }
    }

    /// Dispatches every settled pair. Returns the number generated.
    async fn sweep(&self) -> usize {
        let pairs = self
            .pending
            .take_settled(SystemTime::now(), self.stability_window);

        let mut generated = 0;
        for pair in pairs {
            if self.cancel.is_cancelled() {
                debug!(base_name = %pair.base_name, "Engine cancelled, not dispatching");
                break;
            }
            if self.process(pair).await.is_ok() {
                generated += 1;
            }
        }
        generated
    }

    /// Generates the document for one pair and relocates its sources, both
    /// on the blocking pool.
    async fn process(&self, pair: MatchedPair) -> Result<GeneratedDocument, GenerateError> {
        let base_name = pair.base_name.clone();
        let request = GenerateRequest::for_pair(&pair, &self.output_root);
        info!(
            base_name = %base_name,
            data = %request.data_path,
            template = %request.template_path,
            output = %request.output_path(),
            "Processing pair"
        );

        let generator = Arc::clone(&self.generator);
        let watch_root = self.watch_root.clone();
        let result = match tokio::task::spawn_blocking(move || {
            generate_and_relocate(generator.as_ref(), &request, &watch_root, &pair)
        })
        .await
        {
            Ok(result) => result,
            Err(join_error) => Err(GenerateError::Aborted(join_error.to_string())),
        };

        if let Err(e) = &result {
            error!(base_name = %base_name, error = %e, "Document generation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingGenerator, shared, test_settings, wait_until};
    use dd_core::FileRole;
    use std::fs;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        target: WatchTarget,
    }

    impl Dirs {
        fn new() -> Self {
            let temp = TempDir::new().expect("Failed to create temp directory");
            let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("Invalid path");
            let target = WatchTarget::new(root.join("input"), root.join("output"));
            Self {
                _temp: temp,
                target,
            }
        }

        fn input(&self, name: &str) -> Utf8PathBuf {
            self.target.input.join(name)
        }

        fn drop_file(&self, name: &str) {
            fs::create_dir_all(&self.target.input).expect("Failed to create input");
            fs::write(self.input(name), name).expect("Failed to write file");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_creates_directories() {
        let dirs = Dirs::new();
        let generator = Arc::new(RecordingGenerator::new());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), generator)
            .expect("Failed to spawn engine");

        assert!(dirs.target.input.is_dir());
        assert!(dirs.target.output.is_dir());
        assert!(engine.is_running());
        assert_eq!(engine.shutdown().await, Some(EngineExit::Cancelled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_processes_existing_pair() {
        let dirs = Dirs::new();
        dirs.drop_file("Report.txt");
        dirs.drop_file("report.docx");
        let generator = Arc::new(RecordingGenerator::new());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");

        let processed = dirs.input("processed");
        assert!(
            wait_until(Duration::from_secs(5), || {
                processed.join("Report.txt").is_file() && processed.join("report.docx").is_file()
            })
            .await
        );

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].base_name, "report");
        assert_eq!(
            requests[0].output_path(),
            engine.output_root().join("report.docx")
        );
        assert!(engine.output_root().join("report.docx").is_file());
        assert!(!dirs.input("Report.txt").exists());
        assert!(!dirs.input("report.docx").exists());
        assert!(engine.pending().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(generator.count(), 1);

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_processes_dropped_pair_once() {
        let dirs = Dirs::new();
        let generator = Arc::new(RecordingGenerator::new());
        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");

        dirs.drop_file("slides.pptx");
        dirs.drop_file("slides.txt");
        dirs.drop_file("slides.txt");
        dirs.drop_file("slides.txt");

        assert!(wait_until(Duration::from_secs(5), || generator.count() >= 1).await);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(generator.count(), 1);
        assert_eq!(generator.requests()[0].output_extension, "pptx");

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_ignores_unrecognized_extensions() {
        let dirs = Dirs::new();
        dirs.drop_file("report.pdf");
        dirs.drop_file("report.docx");
        let generator = Arc::new(RecordingGenerator::new());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");

        assert!(
            wait_until(Duration::from_secs(2), || {
                engine.pending().contains(FileRole::Template, "report")
            })
            .await
        );
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(generator.count(), 0);
        assert_eq!(engine.pending().len(FileRole::Data), 0);
        assert!(dirs.input("report.pdf").is_file());

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_does_not_retry_failed_generation() {
        let dirs = Dirs::new();
        dirs.drop_file("budget.txt");
        dirs.drop_file("budget.xlsx");
        let generator = Arc::new(RecordingGenerator::failing());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");

        assert!(wait_until(Duration::from_secs(5), || generator.count() >= 1).await);
        // The generator read both inputs; several sweeps must pass without
        // those reads putting the pair back in play.
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(generator.count(), 1);
        assert!(dirs.input("budget.txt").is_file());
        assert!(dirs.input("budget.xlsx").is_file());
        assert!(!dirs.input("processed").exists());
        assert!(engine.pending().is_empty());

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_reads_and_attribute_changes_do_not_retrack() {
        let dirs = Dirs::new();
        dirs.drop_file("memo.txt");
        dirs.drop_file("memo.docx");
        let generator = Arc::new(RecordingGenerator::failing());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");
        assert!(wait_until(Duration::from_secs(5), || generator.count() >= 1).await);

        for _ in 0..5 {
            fs::read(dirs.input("memo.txt")).expect("Failed to read file");
            fs::read(dirs.input("memo.docx")).expect("Failed to read file");
            let permissions = fs::metadata(dirs.input("memo.docx"))
                .expect("Failed to stat file")
                .permissions();
            fs::set_permissions(dirs.input("memo.docx"), permissions)
                .expect("Failed to set permissions");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(generator.count(), 1);
        assert!(engine.pending().is_empty());

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_rewritten_pair_after_failure_is_dispatched_again() {
        let dirs = Dirs::new();
        dirs.drop_file("deck.txt");
        dirs.drop_file("deck.pptx");
        let generator = Arc::new(RecordingGenerator::failing());

        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");
        assert!(wait_until(Duration::from_secs(5), || generator.count() >= 1).await);

        dirs.drop_file("deck.txt");
        dirs.drop_file("deck.pptx");

        assert!(wait_until(Duration::from_secs(5), || generator.count() >= 2).await);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(generator.count(), 2);

        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_stopped_engine_dispatches_nothing() {
        let dirs = Dirs::new();
        let generator = Arc::new(RecordingGenerator::new());
        let engine = WatchEngine::spawn(&dirs.target, &test_settings(), shared(&generator))
            .expect("Failed to spawn engine");

        assert_eq!(engine.shutdown().await, Some(EngineExit::Cancelled));

        dirs.drop_file("late.txt");
        dirs.drop_file("late.docx");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(generator.count(), 0);
        assert!(dirs.input("late.txt").is_file());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_engine_stops_when_root_removed() {
        let dirs = Dirs::new();
        let generator = Arc::new(RecordingGenerator::new());
        let mut engine = WatchEngine::spawn(&dirs.target, &test_settings(), generator)
            .expect("Failed to spawn engine");

        fs::remove_dir_all(&dirs.target.input).expect("Failed to remove input");

        let exit = tokio::time::timeout(Duration::from_secs(5), engine.join())
            .await
            .expect("Engine did not stop");
        assert_eq!(exit, Some(EngineExit::RootRemoved));
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_engine_spawn_fails_when_input_is_a_file() {
        let dirs = Dirs::new();
        let parent = dirs.target.input.parent().expect("Input has a parent");
        fs::create_dir_all(parent).expect("Failed to create parent");
        fs::write(&dirs.target.input, "not a directory").expect("Failed to write file");

        let result = WatchEngine::spawn(
            &dirs.target,
            &test_settings(),
            Arc::new(RecordingGenerator::new()),
        );

        match result {
            Err(WatchError::CreateDir { path, .. }) => assert_eq!(path, dirs.target.input),
            other => panic!("Expected CreateDir, got {other:?}"),
        }
    }

    #[test]
    fn test_engine_exit_display() {
        assert_eq!(EngineExit::Cancelled.to_string(), "cancelled");
        assert_eq!(EngineExit::RootRemoved.to_string(), "watch root removed");
    }
}
