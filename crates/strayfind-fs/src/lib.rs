#![warn(missing_docs)]

//! strayfind filesystem side: storage tree scanner and untracked-file relocator
//!
//! Scan: root → walk (excluded top-level dirs pruned) → forward-slash relative paths
//! Move: relative paths → rename into target tree, copy + delete across devices

pub mod error;
pub mod mover;
pub mod scanner;

pub use error::{FsError, FsResult};
pub use mover::{move_untracked, MoveSummary};
pub use scanner::{scan_files, ScanOptions, DEFAULT_EXCLUDED_DIRS};
