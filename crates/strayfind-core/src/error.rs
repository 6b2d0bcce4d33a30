//! Error types for the strayfind-core crate

use crate::strategy::Strategy;

/// Errors raised while compiling a [`DirectoryPolicy`](crate::DirectoryPolicy).
///
/// Matching and aggregation never fail; only an inconsistent policy does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The same top-level segment was assigned to two strategies
    #[error("Directory '{segment}' is assigned to both {first} and {second}")]
    ConflictingSegment {
        /// The segment assigned twice
        segment: String,
        /// Strategy it was first assigned to
        first: Strategy,
        /// Strategy of the conflicting assignment
        second: Strategy,
    },
    /// A directory name was empty
    #[error("Empty directory name in {0} directory list")]
    EmptySegment(Strategy),
    /// A directory name contained a path separator
    #[error("Directory name '{0}' must be a single path segment")]
    NestedSegment(String),
    /// The marker filename was empty or contained a separator
    #[error("Invalid marker filename: '{0}'")]
    InvalidMarker(String),
}
