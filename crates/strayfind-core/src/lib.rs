#![warn(missing_docs)]

//! strayfind core: reconciles a remote asset catalog against a local storage tree
//!
//! Catalog batches → CatalogSnapshot (paths, content IDs, owner IDs) → Dispatcher → untracked entries

pub mod catalog;
pub mod error;
pub mod identifier;
pub mod reconcile;
pub mod strategy;

pub use catalog::{CatalogSnapshot, ContentRecord, MergeStats};
pub use error::PolicyError;
pub use identifier::{extract_leading_identifier, is_valid_identifier, Identifier, IDENTIFIER_LEN};
pub use reconcile::{find_untracked, MatchVerdict, ReconcileOutcome, ReconcileStats, Reconciler, UntrackedEntry};
pub use strategy::{DirectoryPolicy, Dispatcher, Strategy};
