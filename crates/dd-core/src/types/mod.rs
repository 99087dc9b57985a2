//! Domain types for tracked drop files.
//!
//! # Module Organization
//!
//! - `file` - Tracked files, base-name derivation, matched pairs
//! - `role` - The role a file plays in a pair
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use dd_core::{FileRole, TrackedFile, MatchedPair};
//! ```

mod file;
mod role;

pub use file::{MatchedPair, TrackedFile, base_name_of};
pub use role::FileRole;
