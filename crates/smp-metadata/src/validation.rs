//! Aggregate validation pipeline.
//!
//! Order: embedded certificate, trust check, signature (unless skipped),
//! then `validUntil`. The trust check runs even when signature validation is
//! skipped.

use std::sync::Arc;

use smp_crypto::Certificate;
use tracing::debug;
use url::Url;

use crate::document::AggregateDocument;
use crate::error::MetadataResult;
use crate::signature::{signing_certificate, SignatureVerifier, XmlSignatureValidator};
use crate::trust::verify_trust;
use crate::xml;

/// Turns fetched text into a validated [`AggregateDocument`].
#[derive(Clone)]
pub struct MetadataValidator {
    verifier: Arc<dyn SignatureVerifier>,
}

impl MetadataValidator {
    /// Creates a validator using the given signature verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self { verifier }
    }

    /// Validates a fetched aggregate.
    ///
    /// # Errors
    ///
    /// - `MalformedMetadata` if the text does not parse, the signature or its
    ///   certificate cannot be located, or `validUntil` is missing or invalid
    /// - `UntrustedCertificate` if the embedded certificate is not `pinned`
    /// - `SignatureMismatch` if the signature does not verify
    pub fn validate(
        &self,
        source: &Url,
        xml: String,
        pinned: &Certificate,
        skip_signature_validation: bool,
    ) -> MetadataResult<AggregateDocument> {
        let index = {
            let doc = xml::parse(&xml)?;
            let signing = signing_certificate(&doc)?;
            verify_trust(&signing, pinned)?;

            if skip_signature_validation {
                debug!(source = %source, "signature validation skipped");
            } else {
                self.verifier.verify(&xml, &signing)?;
            }

            AggregateDocument::index(&doc)?
        };

        debug!(
            source = %source,
            valid_until = %index.valid_until,
            "aggregate validated"
        );
        Ok(AggregateDocument::from_index(source.clone(), xml, index))
    }
}

impl Default for MetadataValidator {
    fn default() -> Self {
        Self::new(Arc::new(XmlSignatureValidator::new()))
    }
}

impl std::fmt::Debug for MetadataValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataValidator").finish_non_exhaustive()
    }
}
