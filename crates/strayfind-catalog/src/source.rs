//! Common interface over catalog backends.

use crate::error::CatalogResult;
use async_trait::async_trait;
use strayfind_core::CatalogSnapshot;

/// A catalog backend that can fold every known asset into a snapshot.
///
/// Implementations merge batch by batch as results arrive and check their
/// cancellation token between batches.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Fetch all assets and merge them into `snapshot`.
    async fn collect(&self, snapshot: &mut CatalogSnapshot) -> CatalogResult<()>;
}
