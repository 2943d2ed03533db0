//! The federation registry.
//!
//! Built once at startup through [`FederationRegistryBuilder`] and frozen.
//! [`FederationRegistry`] has no mutation API.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use smp_crypto::Certificate;
use tracing::{info, warn};
use url::Url;

use crate::config::FederationConfigEntry;
use crate::error::{FederationError, FederationResult};

/// Config key of the federation name.
pub const FIELD_NAME: &str = "name";
/// Config key of the metadata source URI.
pub const FIELD_METADATA_URI: &str = "metadataUri";
/// Config key of the pinned certificate path.
pub const FIELD_TRUSTED_SIGNING_CERTIFICATE: &str = "trustedSigningCertificate";

/// A registered federation.
#[derive(Debug, Clone)]
pub struct FederationEntry {
    name: String,
    source_uri: Url,
    trusted_certificate_path: PathBuf,
    trusted_certificate: Certificate,
    skip_signature_validation: bool,
}

impl FederationEntry {
    /// Federation name as registered.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the aggregate is fetched from.
    #[must_use]
    pub fn source_uri(&self) -> &Url {
        &self.source_uri
    }

    /// Path the pinned certificate was loaded from.
    #[must_use]
    pub fn trusted_certificate_path(&self) -> &Path {
        &self.trusted_certificate_path
    }

    /// The pinned signing certificate.
    #[must_use]
    pub fn trusted_certificate(&self) -> &Certificate {
        &self.trusted_certificate
    }

    /// Whether XML signature verification is bypassed.
    #[must_use]
    pub const fn skip_signature_validation(&self) -> bool {
        self.skip_signature_validation
    }
}

/// Collects federations before the registry is frozen.
#[derive(Debug, Default)]
pub struct FederationRegistryBuilder {
    entries: Vec<FederationEntry>,
    index: HashMap<String, usize>,
}

impl FederationRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a federation.
    ///
    /// The pinned certificate is read and parsed now, so a broken
    /// installation fails at startup rather than on the first request.
    ///
    /// # Errors
    ///
    /// - `DuplicateFederation` if the name is taken, ignoring case
    /// - `Configuration` if the name is empty or the certificate is unusable
    pub fn register(
        &mut self,
        name: impl Into<String>,
        source_uri: Url,
        trusted_certificate_path: impl AsRef<Path>,
        skip_signature_validation: bool,
    ) -> FederationResult<&mut Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FederationError::config(name, FIELD_NAME, "must not be empty"));
        }
        let key = fold(&name);
        if self.index.contains_key(&key) {
            return Err(FederationError::DuplicateFederation(name));
        }

        let path = trusted_certificate_path.as_ref();
        let trusted_certificate = Certificate::from_file(path).map_err(|e| {
            FederationError::config(
                name.clone(),
                FIELD_TRUSTED_SIGNING_CERTIFICATE,
                format!("{}: {e}", path.display()),
            )
        })?;

        if skip_signature_validation {
            warn!(
                federation = %name,
                source = %source_uri,
                "signature validation is DISABLED for this federation; only the certificate pin is checked"
            );
        }
        info!(
            federation = %name,
            source = %source_uri,
            pinned = %trusted_certificate.fingerprint_hex(),
            "federation registered"
        );

        self.index.insert(key, self.entries.len());
        self.entries.push(FederationEntry {
            name,
            source_uri,
            trusted_certificate_path: path.to_path_buf(),
            trusted_certificate,
            skip_signature_validation,
        });
        Ok(self)
    }

    /// Validates a configuration entry and registers it.
    ///
    /// # Errors
    ///
    /// - `Configuration` naming the missing or invalid field
    /// - anything [`register`](Self::register) returns
    pub fn register_config(&mut self, entry: &FederationConfigEntry) -> FederationResult<&mut Self> {
        let name = entry.name.as_str();
        if name.trim().is_empty() {
            return Err(FederationError::config(name, FIELD_NAME, "must not be empty"));
        }

        let raw_uri = entry
            .metadata_uri
            .as_deref()
            .ok_or_else(|| FederationError::config(name, FIELD_METADATA_URI, "is required"))?;
        let source_uri = Url::parse(raw_uri).map_err(|e| {
            FederationError::config(
                name,
                FIELD_METADATA_URI,
                format!("{raw_uri:?} is not an absolute URI: {e}"),
            )
        })?;

        let path = entry.trusted_signing_certificate.as_deref().ok_or_else(|| {
            FederationError::config(name, FIELD_TRUSTED_SIGNING_CERTIFICATE, "is required")
        })?;

        self.register(name, source_uri, path, entry.skip_signature_validation)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> FederationRegistry {
        FederationRegistry {
            entries: self.entries,
            index: self.index,
        }
    }
}

/// The immutable set of configured federations.
#[derive(Debug, Default)]
pub struct FederationRegistry {
    entries: Vec<FederationEntry>,
    index: HashMap<String, usize>,
}

impl FederationRegistry {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> FederationRegistryBuilder {
        FederationRegistryBuilder::new()
    }

    /// Builds a registry from configuration entries, in order.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn from_config(entries: &[FederationConfigEntry]) -> FederationResult<Self> {
        let mut builder = FederationRegistryBuilder::new();
        for entry in entries {
            builder.register_config(entry)?;
        }
        Ok(builder.build())
    }

    /// Looks up a federation by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFederation` if no such federation is registered.
    pub fn resolve(&self, name: &str) -> FederationResult<&FederationEntry> {
        self.index
            .get(&fold(name))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| FederationError::UnknownFederation(name.to_string()))
    }

    /// Registered federation names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(FederationEntry::name)
    }

    /// Registered federations, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FederationEntry> {
        self.entries.iter()
    }

    /// Number of registered federations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no federation is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}
