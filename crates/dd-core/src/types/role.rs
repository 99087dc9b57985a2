//! File role types.
//!
//! This module provides the [`FileRole`] enum classifying a dropped file as
//! either the data half or the template half of a pair.

use serde::{Deserialize, Serialize};

/// The role a dropped file plays in a generation pair.
///
/// # Examples
///
/// ```
/// use dd_core::FileRole;
///
/// assert_eq!(FileRole::Data.label(), "data");
/// assert_eq!(FileRole::Template.to_string(), "template");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// The data file (`.txt` by default) supplying document content.
    Data,

    /// The template file (`.docx`, `.pptx` or `.xlsx` by default) shaping
    /// the generated document.
    Template,
}

impl FileRole {
    /// Returns a short lowercase label for log output.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Template => "template",
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
