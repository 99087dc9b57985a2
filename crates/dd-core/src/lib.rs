//! Core types, configuration, and errors for docdrop.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - Configuration structures ([`Config`], [`WatchSettings`], [`WatchTarget`])
//! - Error types for configuration loading ([`ConfigError`])
//! - Domain types for tracked drop files ([`TrackedFile`], [`FileRole`],
//!   [`MatchedPair`])
//! - Type aliases for `FxHashMap` (faster than std for string keys)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{
    Config, GeneratorConfig, WatchSettings, WatchTarget, normalize_extension, processed_dir_for,
};
pub use error::ConfigError;
pub use hash::{FxHashMap, fx_hash_map};
pub use types::{FileRole, MatchedPair, TrackedFile, base_name_of};
