//! The federation metadata cache.
//!
//! One entry per distinct source URI. An entry lives until the aggregate's
//! own `validUntil`; it is never served at or past that instant. Refreshes
//! for the same URI are serialized so concurrent misses fetch once.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use smp_federation::{FederationEntry, FederationRegistry};
use smp_metadata::{AggregateDocument, MetadataError, MetadataValidator};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::CacheResult;
use crate::fetcher::MetadataFetcher;
use crate::provider::MetadataProvider;

#[derive(Debug, Clone)]
struct CacheEntry {
    document: Arc<AggregateDocument>,
    expires_at: DateTime<Utc>,
}

/// Validated aggregates keyed by source URI.
pub struct MetadataCache {
    registry: Arc<FederationRegistry>,
    fetcher: Arc<dyn MetadataFetcher>,
    validator: MetadataValidator,
    clock: Arc<dyn Clock>,
    entries: DashMap<String, CacheEntry>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MetadataCache {
    /// Creates an empty cache using the system clock and the default
    /// signature validator.
    #[must_use]
    pub fn new(registry: Arc<FederationRegistry>, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            registry,
            fetcher,
            validator: MetadataValidator::default(),
            clock: Arc::new(SystemClock),
            entries: DashMap::new(),
            refresh_locks: DashMap::new(),
        }
    }

    /// Replaces the aggregate validator.
    #[must_use]
    pub fn with_validator(mut self, validator: MetadataValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The federation registry this cache serves.
    #[must_use]
    pub fn registry(&self) -> &FederationRegistry {
        &self.registry
    }

    /// Returns the validated aggregate for `federation`, fetching it if no
    /// live entry exists.
    ///
    /// # Errors
    ///
    /// - `UnknownFederation` if the name is not registered
    /// - any fetch, trust, signature or `validUntil` failure, unchanged
    pub async fn get_metadata(&self, federation: &str) -> CacheResult<Arc<AggregateDocument>> {
        let entry = self.registry.resolve(federation)?;
        let key = entry.source_uri().as_str();

        if let Some(document) = self.live(key) {
            debug!(federation = %entry.name(), source = %key, "metadata cache hit");
            return Ok(document);
        }

        let lock = self.refresh_lock(key);
        let _guard = lock.lock().await;

        if let Some(document) = self.live(key) {
            debug!(
                federation = %entry.name(),
                source = %key,
                "metadata refreshed by a concurrent request"
            );
            return Ok(document);
        }

        debug!(federation = %entry.name(), source = %key, "metadata cache miss");
        self.refresh(entry).await.inspect_err(|e| {
            warn!(
                federation = %entry.name(),
                source = %key,
                error = %e,
                "metadata refresh failed"
            );
        })
    }

    /// Number of stored entries, live or expired.
    #[must_use]
    pub fn cached_entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Expiry of the entry `federation` currently maps to, if any.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFederation` if the name is not registered.
    pub fn expires_at(&self, federation: &str) -> CacheResult<Option<DateTime<Utc>>> {
        let entry = self.registry.resolve(federation)?;
        Ok(self
            .entries
            .get(entry.source_uri().as_str())
            .map(|cached| cached.expires_at))
    }

    /// The stored document for `key` if it has not expired.
    fn live(&self, key: &str) -> Option<Arc<AggregateDocument>> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|cached| now < cached.expires_at)
            .map(|cached| Arc::clone(&cached.document))
    }

    fn refresh_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(key.to_string())
            .or_default()
            .value()
            .clone()
    }

    async fn refresh(&self, federation: &FederationEntry) -> CacheResult<Arc<AggregateDocument>> {
        let source = federation.source_uri();
        info!(federation = %federation.name(), source = %source, "fetching aggregate metadata");

        let xml = self.fetcher.fetch(source).await?;
        let document = self.validator.validate(
            source,
            xml,
            federation.trusted_certificate(),
            federation.skip_signature_validation(),
        )?;

        let now = self.clock.now();
        let expires_at = document.valid_until();
        if expires_at <= now {
            return Err(MetadataError::MalformedMetadata(format!(
                "aggregate from {source} expired at {expires_at}"
            ))
            .into());
        }

        let document = Arc::new(document);
        self.entries.insert(
            source.as_str().to_string(),
            CacheEntry {
                document: Arc::clone(&document),
                expires_at,
            },
        );

        info!(
            federation = %federation.name(),
            source = %source,
            entities = document.entity_count(),
            valid_until = %expires_at,
            "aggregate metadata cached"
        );
        Ok(document)
    }
}

#[async_trait]
impl MetadataProvider for MetadataCache {
    async fn get_metadata(&self, federation: &str) -> CacheResult<Arc<AggregateDocument>> {
        Self::get_metadata(self, federation).await
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("federations", &self.registry.len())
            .field("entries", &self.entries.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
