//! Metadata error types.
//!
//! Every failure of the fetch, trust, signature and extraction pipeline maps
//! onto one of these variants. None of them is recovered from internally.

use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata pipeline errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The requested entity ID fails the syntactic rule.
    #[error("invalid entity ID: {0}")]
    InvalidEntityId(String),

    /// No entity descriptor carries the requested entity ID.
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// More than one entity descriptor carries the requested entity ID.
    #[error("entity {entity_id} is described {count} times in the aggregate")]
    AmbiguousEntity {
        /// The requested entity ID.
        entity_id: String,
        /// Number of matching descriptors.
        count: usize,
    },

    /// The aggregate could not be retrieved.
    #[error("metadata fetch failed: {0}")]
    Fetch(String),

    /// The aggregate is not usable metadata.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// The embedded signing certificate is not the pinned one.
    #[error("untrusted signing certificate: expected {expected}, got {actual}")]
    UntrustedCertificate {
        /// Fingerprint of the pinned certificate.
        expected: String,
        /// Fingerprint of the embedded certificate.
        actual: String,
    },

    /// The XML signature does not verify.
    #[error("signature validation failed: {0}")]
    SignatureMismatch(String),
}

impl MetadataError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidEntityId(_) => 400,
            Self::EntityNotFound(_) => 404,
            Self::Fetch(_) => 502,
            Self::AmbiguousEntity { .. }
            | Self::MalformedMetadata(_)
            | Self::UntrustedCertificate { .. }
            | Self::SignatureMismatch(_) => 500,
        }
    }

    /// Returns true if the caller, not the upstream document, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<roxmltree::Error> for MetadataError {
    fn from(err: roxmltree::Error) -> Self {
        Self::MalformedMetadata(err.to_string())
    }
}

impl From<quick_xml::Error> for MetadataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedMetadata(err.to_string())
    }
}
