//! Relocates untracked files out of the storage tree, preserving their
//! relative layout under a target directory.

use crate::error::{FsError, FsResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a relocation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSummary {
    /// Files actually moved
    pub moved: usize,
    /// Files that would have been moved in dry-run mode
    pub planned: usize,
}

/// Move each forward-slash relative path from `library_root` to the same
/// relative location under `target_root`.
///
/// With `dry_run` set nothing is touched; each move is only logged. The
/// first failure stops the run.
pub fn move_untracked<S: AsRef<str>>(
    rel_paths: &[S],
    library_root: &Path,
    target_root: &Path,
    dry_run: bool,
) -> FsResult<MoveSummary> {
    let mut summary = MoveSummary::default();

    for rel in rel_paths {
        let rel = from_slash(rel.as_ref());
        let src = library_root.join(&rel);
        let dst = target_root.join(&rel);

        if dry_run {
            info!(src = %src.display(), dst = %dst.display(), "[dry-run] would move");
            summary.planned += 1;
            continue;
        }

        move_file(&src, &dst).map_err(|e| FsError::Move {
            src: src.clone(),
            dst: dst.clone(),
            source: Box::new(e),
        })?;
        info!(src = %src.display(), dst = %dst.display(), "Moved file");
        summary.moved += 1;
    }

    Ok(summary)
}

fn from_slash(rel: &str) -> PathBuf {
    rel.split('/').filter(|part| !part.is_empty()).collect()
}

/// Rename, falling back to copy + delete when source and target are on
/// different filesystems.
fn move_file(src: &Path, dst: &Path) -> FsResult<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| FsError::io("create directory", parent, e))?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                error = %e,
                "Rename failed, falling back to copy+delete"
            );
            // fs::copy carries the permission bits over
            fs::copy(src, dst).map_err(|e| FsError::io("copy", src, e))?;
            fs::remove_file(src).map_err(|e| FsError::io("remove", src, e))
        }
    }
}
