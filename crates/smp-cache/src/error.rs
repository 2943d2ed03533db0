//! Cache error types.

use smp_federation::FederationError;
use smp_metadata::MetadataError;
use thiserror::Error;

/// Errors returned by [`MetadataCache`](crate::MetadataCache).
///
/// Both sides propagate unchanged from the registry and the metadata
/// pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Fetching, validating or extracting metadata failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Resolving the federation failed.
    #[error(transparent)]
    Federation(#[from] FederationError),
}

impl CacheError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Metadata(err) => err.http_status(),
            Self::Federation(err) => err.http_status(),
        }
    }

    /// Checks if the error is caused by the request rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        let status = self.http_status();
        status >= 400 && status < 500
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
