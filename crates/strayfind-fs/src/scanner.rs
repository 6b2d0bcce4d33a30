//! Storage tree scanner.
//!
//! Produces the forward-slash relative paths the reconciler consumes. The
//! catalog reports paths with `/` separators regardless of platform, so the
//! scanner normalizes to match.

use crate::error::{FsError, FsResult};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Top-level directories skipped unless configured otherwise.
///
/// Database dumps live here and are never catalog assets.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["backups"];

/// Options controlling a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Top-level directory names (relative to the scan root) to prune
    pub exclude_dirs: Vec<String>,
    /// Prefix prepended to every returned path, e.g. `library/alice`
    pub prefix: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            prefix: None,
        }
    }
}

impl ScanOptions {
    /// Set the path prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() == 1
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude_dirs.iter().any(|d| d == name))
    }

    fn prefixed(&self, rel: String) -> String {
        match self.prefix.as_deref().map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, rel),
            _ => rel,
        }
    }
}

/// Walk `root` and return every non-directory entry as a forward-slash path
/// relative to `root`.
///
/// Unreadable entries and names that are not valid UTF-8 are logged and
/// skipped; only a failure to read `root` itself is an error. Output is
/// ordered by filename within each directory.
pub fn scan_files(
    root: &Path,
    options: &ScanOptions,
    cancel: &CancellationToken,
) -> FsResult<Vec<String>> {
    let mut files = Vec::new();
    let mut skipped = 0usize;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if options.is_excluded(entry) {
                debug!(dir = ?entry.file_name(), "Skipping excluded directory");
                false
            } else {
                true
            }
        });

    for entry in walker {
        if cancel.is_cancelled() {
            return Err(FsError::Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(FsError::ScanRoot {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "Error accessing path");
                skipped += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        match relative_slash_path(root, entry.path()) {
            Some(rel) => files.push(options.prefixed(rel)),
            None => {
                warn!(path = %entry.path().display(), "Cannot represent path as UTF-8, skipping");
                skipped += 1;
            }
        }
    }

    info!(
        library_path = %root.display(),
        files_found = files.len(),
        skipped,
        "Filesystem scan complete"
    );
    Ok(files)
}

/// `path` relative to `root`, joined with `/`.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}
