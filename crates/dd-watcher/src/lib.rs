//! Directory-drop watching: pair dropped files, generate, and file them away.
//!
//! Users drop a data file (`.txt`) and a template (`.docx`, `.pptx`, `.xlsx`)
//! with the same base name into a watched input directory. Once both have
//! stopped changing, the pair is handed to a [`Generator`] which writes
//! `output_root/<base name>.<template extension>`, and both sources are moved
//! into `processed/` under the input directory.
//!
//! # Overview
//!
//! - [`WatchEngine`] watches one input directory and owns its pending maps.
//! - [`WatcherSupervisor`] starts, stops, and joins one engine per target.
//! - [`Generator`] is the seam to whatever produces documents;
//!   [`CommandGenerator`] runs an external program.
//!
//! # Crate Dependencies
//!
//! ```text
//! dd-cli ──► dd-watcher ──► dd-core
//!        └──────────────────►
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use camino::Utf8Path;
//! use dd_core::Config;
//! use dd_watcher::{CommandGenerator, WatcherSupervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file(Utf8Path::new("docdrop.json"))?;
//!     let generator = Arc::new(CommandGenerator::from_config(&config.generator)?);
//!
//!     let mut supervisor = WatcherSupervisor::new(&config, generator);
//!     let report = supervisor.start();
//!     for (target, error) in &report.failed {
//!         eprintln!("{}: {error}", target.input);
//!     }
//!
//!     tokio::signal::ctrl_c().await?;
//!     supervisor.stop();
//!     supervisor.await_all().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Engine setup failures surface as [`WatchError`] from
//! [`WatchEngine::spawn`] and in [`StartReport::failed`]. Everything after
//! setup (unreadable files, failed generations, failed moves) is logged and
//! the engine keeps running.
//!
//! ```
//! use dd_watcher::WatchError;
//!
//! fn describe(err: &WatchError) -> &'static str {
//!     match err {
//!         WatchError::CreateDir { .. } | WatchError::Notify(_) => "engine not started",
//!         _ => "file skipped",
//!     }
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod events;
pub mod filter;
pub mod generator;
pub mod pending;
pub mod relocate;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use engine::{EngineExit, WatchEngine};

pub use error::{GenerateError, WatchError};

pub use events::{EventBatchStats, FileEvent, FileEventBatch, FileEventKind};

pub use filter::{DropFilter, FileFilter};

pub use generator::{
    AUTO_OPEN, CommandGenerator, GenerateRequest, GeneratedDocument, Generator, TERMINAL_MODE,
};

pub use pending::PendingSets;

pub use relocate::{move_replacing, relocate_pair};

pub use supervisor::{StartReport, WatcherSupervisor};
