//! Metadata provider trait.

use std::sync::Arc;

use async_trait::async_trait;
use smp_metadata::AggregateDocument;

use crate::error::CacheResult;

/// Source of validated aggregates, keyed by federation name.
///
/// The HTTP layer depends on this trait rather than on
/// [`MetadataCache`](crate::MetadataCache) directly.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Returns the current validated aggregate for `federation`.
    async fn get_metadata(&self, federation: &str) -> CacheResult<Arc<AggregateDocument>>;
}
