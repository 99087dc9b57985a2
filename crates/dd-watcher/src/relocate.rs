//! Moving processed sources out of the watch root.
//!
//! After a successful generation both source files are moved into
//! `processed/` beneath the watch root, replacing same-named files already
//! there. Failures here never undo a generation.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use dd_core::{MatchedPair, processed_dir_for};

use crate::error::WatchError;

/// Moves `from` to `to`, replacing any existing file at `to`.
///
/// Falls back to copy-then-remove when a plain rename is not possible, for
/// example across filesystems.
pub fn move_replacing(from: &Utf8Path, to: &Utf8Path) -> Result<(), WatchError> {
    let relocate_err = |source: io::Error| WatchError::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if to.is_file() {
        std::fs::remove_file(to).map_err(relocate_err)?;
    }

    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) if from.is_file() => {
            debug!(from = %from, to = %to, error = %rename_err, "Rename failed, copying instead");
            std::fs::copy(from, to).map_err(relocate_err)?;
            std::fs::remove_file(from).map_err(relocate_err)
        }
        Err(rename_err) => Err(relocate_err(rename_err)),
    }
}

/// Moves both files of a pair into `watch_root/processed/`.
///
/// Files that no longer exist are skipped. Each remaining file is moved
/// independently; a failure is logged as a warning and does not stop the
/// other move.
///
/// Returns the paths the files now live at.
///
/// # Errors
///
/// Returns [`WatchError::CreateDir`] if the `processed/` directory cannot be
/// created; nothing is moved in that case.
pub fn relocate_pair(
    watch_root: &Utf8Path,
    pair: &MatchedPair,
) -> Result<Vec<Utf8PathBuf>, WatchError> {
    let processed = processed_dir_for(watch_root);
    std::fs::create_dir_all(&processed).map_err(|e| WatchError::create_dir(&processed, e))?;

    let mut moved = Vec::with_capacity(2);
    for source in [&pair.data.path, &pair.template.path] {
        if !source.is_file() {
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = processed.join(name);
        match move_replacing(source, &target) {
            Ok(()) => moved.push(target),
            Err(e) => warn!(error = %e, "Could not move processed file"),
        }
    }

    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::{FileRole, TrackedFile};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("Invalid path")
    }

    fn pair(root: &Utf8Path, data: &str, template: &str) -> MatchedPair {
        let now = SystemTime::now();
        let data = TrackedFile::from_path(root.join(data), FileRole::Data, now).expect("named");
        let template =
            TrackedFile::from_path(root.join(template), FileRole::Template, now).expect("named");
        MatchedPair::new(data.base_name.clone(), data, template)
    }

    #[test]
    fn test_relocate_pair_moves_both_files() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = root(&dir);
        std::fs::write(root.join("plan.txt"), "data").expect("write");
        std::fs::write(root.join("Plan.docx"), "template").expect("write");

        let moved = relocate_pair(&root, &pair(&root, "plan.txt", "Plan.docx")).expect("relocate");

        assert_eq!(moved.len(), 2);
        assert!(!root.join("plan.txt").exists());
        assert!(!root.join("Plan.docx").exists());
        assert!(root.join("processed/plan.txt").is_file());
        assert!(root.join("processed/Plan.docx").is_file());
    }

    #[test]
    fn test_relocate_pair_overwrites_previous() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = root(&dir);
        std::fs::create_dir(root.join("processed")).expect("mkdir");
        std::fs::write(root.join("processed/plan.txt"), "old").expect("write");
        std::fs::write(root.join("plan.txt"), "new").expect("write");
        std::fs::write(root.join("plan.xlsx"), "template").expect("write");

        relocate_pair(&root, &pair(&root, "plan.txt", "plan.xlsx")).expect("relocate");

        let content = std::fs::read_to_string(root.join("processed/plan.txt")).expect("read");
        assert_eq!(content, "new");
    }

    #[test]
    fn test_relocate_pair_skips_vanished_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = root(&dir);
        std::fs::write(root.join("plan.pptx"), "template").expect("write");

        let moved = relocate_pair(&root, &pair(&root, "plan.txt", "plan.pptx")).expect("relocate");

        assert_eq!(moved, vec![root.join("processed/plan.pptx")]);
    }

    #[test]
    fn test_relocate_pair_fails_when_processed_is_a_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = root(&dir);
        std::fs::write(root.join("processed"), "not a directory").expect("write");
        std::fs::write(root.join("plan.txt"), "data").expect("write");

        let err = relocate_pair(&root, &pair(&root, "plan.txt", "plan.docx")).unwrap_err();
        assert!(matches!(err, WatchError::CreateDir { .. }));
        assert!(root.join("plan.txt").is_file());
    }
}
