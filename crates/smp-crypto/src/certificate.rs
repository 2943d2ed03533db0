//! X.509 certificate handle.
//!
//! Certificates are kept as their DER encoding. The SHA-256 fingerprint is
//! computed once at construction so trust checks are a byte comparison.

use std::fmt;
use std::path::Path;

use base64::Engine;
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

use crate::error::{CryptoError, CryptoResult};
use crate::hash::sha256;

const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// A parsed-and-validated X.509 certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    fingerprint: Vec<u8>,
}

impl Certificate {
    /// Creates a certificate from its DER encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a single well-formed certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let der = der.into();
        let (rest, _) = X509Certificate::from_der(&der)
            .map_err(|e| CryptoError::InvalidCertificate(format!("failed to parse DER: {e}")))?;
        if !rest.is_empty() {
            return Err(CryptoError::InvalidCertificate(format!(
                "{} trailing bytes after certificate",
                rest.len()
            )));
        }
        let fingerprint = sha256(&der);
        Ok(Self { der, fingerprint })
    }

    /// Creates a certificate from a PEM document.
    ///
    /// The first `CERTIFICATE` block is used.
    ///
    /// # Errors
    ///
    /// Returns an error if no certificate block is found or it does not parse.
    pub fn from_pem(pem: &[u8]) -> CryptoResult<Self> {
        for block in Pem::iter_from_buffer(pem) {
            let block =
                block.map_err(|e| CryptoError::InvalidCertificate(format!("invalid PEM: {e}")))?;
            if block.label == PEM_CERTIFICATE_LABEL {
                return Self::from_der(block.contents);
            }
        }
        Err(CryptoError::InvalidCertificate(
            "no CERTIFICATE block in PEM input".to_string(),
        ))
    }

    /// Creates a certificate from base64 text, as found in `<X509Certificate>`.
    ///
    /// Whitespace (including line breaks) is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid base64 or not a certificate.
    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| CryptoError::InvalidCertificate(format!("invalid base64: {e}")))?;
        Self::from_der(der)
    }

    /// Loads a certificate from a PEM or DER file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a certificate.
    pub fn from_file(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let bytes = std::fs::read(path)?;
        if looks_like_pem(&bytes) {
            Self::from_pem(&bytes)
        } else {
            Self::from_der(bytes)
        }
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the SHA-256 fingerprint of the DER encoding.
    #[must_use]
    pub fn sha256_fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    /// Returns the fingerprint as colon-separated uppercase hex.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Returns the subject distinguished name.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate no longer parses (never expected).
    pub fn subject(&self) -> CryptoResult<String> {
        let (_, cert) = self.parse()?;
        Ok(cert.subject().to_string())
    }

    fn parse(&self) -> CryptoResult<(&[u8], X509Certificate<'_>)> {
        X509Certificate::from_der(&self.der)
            .map_err(|e| CryptoError::InvalidCertificate(format!("failed to parse DER: {e}")))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("sha256", &self.fingerprint_hex())
            .finish()
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}
