//! Lifecycle control for a set of watch engines.
//!
//! [`WatcherSupervisor`] is an ordinary value: construct one per process (or
//! per test) and pass it where it is needed.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{error, info, warn};

use dd_core::{Config, WatchSettings, WatchTarget};

use crate::engine::{EngineExit, WatchEngine};
use crate::error::WatchError;
use crate::generator::Generator;

/// Outcome of [`WatcherSupervisor::start`].
#[derive(Debug, Default)]
pub struct StartReport {
    /// Watch roots of the engines that started.
    pub started: Vec<Utf8PathBuf>,

    /// Targets whose engine could not be created, with the reason.
    pub failed: Vec<(WatchTarget, WatchError)>,
}

impl StartReport {
    /// Returns `true` if every target started.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the watch engines for a fixed list of targets.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use dd_core::Config;
/// use dd_watcher::{CommandGenerator, WatcherSupervisor};
///
/// # async fn example() {
/// let config = Config::default();
/// let generator = Arc::new(CommandGenerator::new("render", config.generator.args.clone()));
/// let mut supervisor = WatcherSupervisor::new(&config, generator);
///
/// let report = supervisor.start();
/// assert!(report.is_complete());
///
/// supervisor.stop();
/// supervisor.await_all().await;
/// # }
/// ```
pub struct WatcherSupervisor {
    settings: WatchSettings,
    targets: Vec<WatchTarget>,
    generator: Arc<dyn Generator>,

    /// Engines started by the last `start`.
    engines: Vec<WatchEngine>,

    /// Engines cancelled by `stop` but not yet joined.
    stopping: Vec<WatchEngine>,
}

impl std::fmt::Debug for WatcherSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherSupervisor")
            .field("targets", &self.targets)
            .field("engines", &self.engines)
            .field("stopping", &self.stopping.len())
            .finish_non_exhaustive()
    }
}

impl WatcherSupervisor {
    /// Creates a supervisor for the targets in `config`. Nothing is watched
    /// until [`start`](Self::start) is called.
    #[must_use]
    pub fn new(config: &Config, generator: Arc<dyn Generator>) -> Self {
        Self::with_targets(config.watch.clone(), config.targets.clone(), generator)
    }

    /// Creates a supervisor for an explicit list of targets.
    #[must_use]
    pub fn with_targets(
        settings: WatchSettings,
        targets: Vec<WatchTarget>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            settings,
            targets,
            generator,
            engines: Vec::new(),
            stopping: Vec::new(),
        }
    }

    /// Starts one engine per target.
    ///
    /// Engines from an earlier `start` are stopped first. A target that fails
    /// to start is logged and reported; the others still start.
    pub fn start(&mut self) -> StartReport {
        self.stop();

        let mut report = StartReport::default();
        for target in &self.targets {
            match WatchEngine::spawn(target, &self.settings, Arc::clone(&self.generator)) {
                Ok(engine) => {
                    report.started.push(engine.watch_root().to_path_buf());
                    self.engines.push(engine);
                }
                Err(e) => {
                    error!(input = %target.input, error = %e, "Failed to start watch engine");
                    report.failed.push((target.clone(), e));
                }
            }
        }

        info!(
            started = report.started.len(),
            failed = report.failed.len(),
            "Watch engines started"
        );
        report
    }

    /// Cancels every running engine and forgets it. Idempotent.
    ///
    /// Cancelled engines are kept until [`await_all`](Self::await_all) joins
    /// them.
    pub fn stop(&mut self) {
        if self.engines.is_empty() {
            return;
        }
        info!(count = self.engines.len(), "Stopping watch engines");
        for engine in &self.engines {
            engine.cancel();
        }
        self.stopping.append(&mut self.engines);
    }

    /// Waits for every engine, running or stopping, to finish.
    ///
    /// Running engines are not cancelled; call [`stop`](Self::stop) first to
    /// shut everything down.
    pub async fn await_all(&mut self) -> Vec<(Utf8PathBuf, Option<EngineExit>)> {
        let mut exits = Vec::with_capacity(self.stopping.len() + self.engines.len());
        for mut engine in self.stopping.drain(..).chain(self.engines.drain(..)) {
            let exit = engine.join().await;
            if exit.is_none() {
                warn!(watch_root = %engine.watch_root(), "Watch engine did not report an exit");
            }
            exits.push((engine.watch_root().to_path_buf(), exit));
        }
        exits
    }

    /// Returns the number of engines started and not yet stopped.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.engines.len()
    }

    /// Returns `true` if any started engine is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engines.iter().any(WatchEngine::is_running)
    }

    /// Returns the watch roots of the active engines.
    #[must_use]
    pub fn watch_roots(&self) -> Vec<&Utf8Path> {
        self.engines.iter().map(WatchEngine::watch_root).collect()
    }

    /// Returns the configured targets.
    #[must_use]
    pub fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }
}

impl Drop for WatcherSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}
