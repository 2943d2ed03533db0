//! Federation configuration entries.
//!
//! One entry per `[[federation]]` table in the configuration file. Keys use
//! the camelCase spelling operators already know from existing deployments.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration of a single federation, as read from the config file.
///
/// Required fields are optional here so a missing key can be reported with
/// the federation's name instead of a bare deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationConfigEntry {
    /// Federation name, used in request paths (case-insensitive).
    #[serde(default)]
    pub name: String,

    /// Absolute URI of the aggregate metadata document.
    #[serde(default)]
    pub metadata_uri: Option<String>,

    /// Path to the pinned signing certificate (PEM or DER).
    #[serde(default)]
    pub trusted_signing_certificate: Option<PathBuf>,

    /// Skips XML signature verification. The certificate pin is still checked.
    #[serde(default)]
    pub skip_signature_validation: bool,
}

impl FederationConfigEntry {
    /// Creates a complete entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        metadata_uri: impl Into<String>,
        trusted_signing_certificate: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            metadata_uri: Some(metadata_uri.into()),
            trusted_signing_certificate: Some(trusted_signing_certificate.into()),
            skip_signature_validation: false,
        }
    }

    /// Sets whether signature verification is skipped.
    #[must_use]
    pub fn with_skip_signature_validation(mut self, skip: bool) -> Self {
        self.skip_signature_validation = skip;
        self
    }
}
