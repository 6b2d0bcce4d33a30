//! Catalog aggregation: folds batches of catalog records (API pages or
//! database row chunks) into the three identity sets used for matching.

use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One catalog-side record describing a managed piece of content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Content identifier
    pub id: Option<String>,
    /// Identifier of the owning user
    pub owner_id: Option<String>,
    /// Canonical storage path as reported by the catalog
    pub path: Option<String>,
}

impl ContentRecord {
    /// Build a record from raw strings; empty strings become absent fields.
    pub fn new(id: &str, owner_id: &str, path: &str) -> Self {
        Self {
            id: non_empty(id),
            owner_id: non_empty(owner_id),
            path: non_empty(path),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Counts of newly inserted values from a single [`CatalogSnapshot::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records in the batch
    pub records: usize,
    /// Paths not seen before
    pub new_paths: usize,
    /// Content IDs not seen before
    pub new_content_ids: usize,
    /// Owner IDs not seen before
    pub new_owner_ids: usize,
}

/// Accumulated identity sets for one reconciliation run.
///
/// Grows monotonically while batches arrive. Matching takes it by shared
/// reference, so no merge can happen once reconciliation has started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    paths: HashSet<String>,
    content_ids: HashSet<Identifier>,
    owner_ids: HashSet<Identifier>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of records into the snapshot.
    ///
    /// Each non-empty field lands in its set independently; a record without
    /// a path still contributes its IDs. Values seen again, even with a
    /// different owner or path, are absorbed without complaint.
    pub fn merge(&mut self, batch: &[ContentRecord]) -> MergeStats {
        let mut stats = MergeStats {
            records: batch.len(),
            ..MergeStats::default()
        };

        for record in batch {
            if let Some(path) = record.path.as_deref().filter(|p| !p.is_empty()) {
                if self.paths.insert(path.to_string()) {
                    stats.new_paths += 1;
                }
            }
            if let Some(id) = record.id.as_deref().and_then(Identifier::from_catalog) {
                if self.content_ids.insert(id) {
                    stats.new_content_ids += 1;
                }
            }
            if let Some(owner) = record.owner_id.as_deref().and_then(Identifier::from_catalog) {
                if self.owner_ids.insert(owner) {
                    stats.new_owner_ids += 1;
                }
            }
        }

        debug!(
            records = stats.records,
            new_paths = stats.new_paths,
            new_content_ids = stats.new_content_ids,
            new_owner_ids = stats.new_owner_ids,
            "Merged catalog batch"
        );
        stats
    }

    /// Add owner IDs known from outside the content records, e.g. users
    /// that own no assets yet.
    pub fn extend_owners<I>(&mut self, owners: I) -> usize
    where
        I: IntoIterator<Item = Identifier>,
    {
        let before = self.owner_ids.len();
        self.owner_ids.extend(owners);
        self.owner_ids.len() - before
    }

    /// Rewrite catalog paths relative to the storage root by removing
    /// `prefix` where present. Paths without the prefix are kept unchanged.
    pub fn strip_path_prefix(self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self;
        }
        let paths = self
            .paths
            .into_iter()
            .map(|p| match p.strip_prefix(prefix) {
                Some(rest) => rest.to_string(),
                None => p,
            })
            .collect();
        Self { paths, ..self }
    }

    /// True if `path` is a known canonical storage path (exact, case-sensitive).
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// True if `id` is a known content identifier.
    pub fn contains_content_id(&self, id: &Identifier) -> bool {
        self.content_ids.contains(id)
    }

    /// True if `id` is a known owner identifier.
    pub fn contains_owner_id(&self, id: &Identifier) -> bool {
        self.owner_ids.contains(id)
    }

    /// Known canonical storage paths.
    pub fn paths(&self) -> &HashSet<String> {
        &self.paths
    }

    /// Known content identifiers.
    pub fn content_ids(&self) -> &HashSet<Identifier> {
        &self.content_ids
    }

    /// Known owner identifiers.
    pub fn owner_ids(&self) -> &HashSet<Identifier> {
        &self.owner_ids
    }

    /// True if nothing has been merged yet.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.content_ids.is_empty() && self.owner_ids.is_empty()
    }
}
