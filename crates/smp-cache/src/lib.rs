//! # smp-cache
//!
//! Aggregate fetching and the federation metadata cache.
//!
//! ## Components
//!
//! - [`MetadataFetcher`] - retrieves aggregate text ([`HttpMetadataFetcher`]
//!   handles `http`, `https` and `file` URIs)
//! - [`MetadataCache`] - validated aggregates keyed by source URI, expiring
//!   at each aggregate's `validUntil`
//! - [`MetadataProvider`] - the trait the HTTP layer consumes
//! - [`Clock`] - time source for expiry ([`SystemClock`], [`ManualClock`])
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use smp_cache::{HttpMetadataFetcher, MetadataCache};
//!
//! let cache = MetadataCache::new(registry, Arc::new(HttpMetadataFetcher::new()?));
//! let aggregate = cache.get_metadata("SwedenConnect").await?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod clock;
pub mod error;
pub mod fetcher;
pub mod metadata_cache;
pub mod provider;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, CacheResult};
pub use fetcher::{HttpMetadataFetcher, MetadataFetcher};
pub use metadata_cache::MetadataCache;
pub use provider::MetadataProvider;
