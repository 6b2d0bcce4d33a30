//! Error types for the strayfind-fs crate

use std::path::PathBuf;

/// Errors raised while scanning or relocating files.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The scan root could not be read at all
    #[error("Cannot scan {}: {source}", .path.display())]
    ScanRoot {
        /// Scan root
        path: PathBuf,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },
    /// An I/O operation failed
    #[error("{op} {}: {source}", .path.display())]
    Io {
        /// What was being attempted
        op: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Moving one file failed
    #[error("Failed to move {} -> {}: {source}", .src.display(), .dst.display())]
    Move {
        /// Source path
        src: PathBuf,
        /// Destination path
        dst: PathBuf,
        /// Underlying error
        #[source]
        source: Box<FsError>,
    },
    /// The operation was cancelled
    #[error("Filesystem operation cancelled")]
    Cancelled,
}

impl FsError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FsError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;
