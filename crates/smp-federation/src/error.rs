//! Federation error types.

use thiserror::Error;

/// Errors raised while building or querying the federation registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FederationError {
    /// A configuration entry is incomplete or unusable.
    #[error("federation {federation}: invalid {field}: {reason}")]
    Configuration {
        /// Federation name as configured (may be empty).
        federation: String,
        /// The offending configuration key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A federation with the same name (ignoring case) is already registered.
    #[error("duplicate federation: {0}")]
    DuplicateFederation(String),

    /// No federation is registered under the name.
    #[error("unknown federation: {0}")]
    UnknownFederation(String),
}

impl FederationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(
        federation: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            federation: federation.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Checks if this is an unknown federation error.
    #[must_use]
    pub const fn is_unknown_federation(&self) -> bool {
        matches!(self, Self::UnknownFederation(_))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::UnknownFederation(_) => 404,
            Self::Configuration { .. } | Self::DuplicateFederation(_) => 500,
        }
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
