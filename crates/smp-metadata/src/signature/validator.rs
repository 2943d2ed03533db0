//! XML Signature validation.
//!
//! Canonicalization, reference processing and the signature check are done
//! by `bergshamra-dsig`. The verification context trusts only the key of the
//! certificate it is given and ignores keys carried in the document. Strict
//! placement rules reject references to nodes that are neither the document
//! element nor an ancestor or sibling of the signature, and duplicate ID
//! values are always refused.
//!
//! On top of that, one reference has to cover the document element: an
//! aggregate whose signature only covers some of its children is not signed.

use bergshamra_dsig::{verify, DsigContext, VerifiedReference, VerifyResult};
use bergshamra_keys::{loader, KeysManager};
use smp_crypto::Certificate;
use tracing::debug;

use crate::constants::attributes;
use crate::error::{MetadataError, MetadataResult};
use crate::xml;

/// Checks the signature of a metadata document.
///
/// The aggregate validation pipeline depends on this seam rather than on a
/// concrete XML-DSig implementation.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies the document's signature with `signing_certificate`.
    ///
    /// # Errors
    ///
    /// Returns `SignatureMismatch` if the signature does not verify.
    fn verify(&self, xml: &str, signing_certificate: &Certificate) -> MetadataResult<()>;
}

/// XML signature validator.
///
/// Validates the enveloped signature of a document with the certificate it is
/// given. Deciding whether that certificate is trusted is the caller's job.
///
/// SHA-1 digests and signatures are not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSignatureValidator;

impl XmlSignatureValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates the document's signature.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if the document does not parse, and
    /// `SignatureMismatch` for everything else.
    pub fn validate(&self, xml: &str, signing_certificate: &Certificate) -> MetadataResult<()> {
        let document_reference = {
            let doc = xml::parse(xml)?;
            let root = doc.root_element();
            attributes::ID_ATTRIBUTES
                .iter()
                .find_map(|name| root.attribute(*name))
                .map(|id| format!("#{id}"))
        };

        let key = loader::load_x509_cert_der(signing_certificate.der())
            .map_err(|e| mismatch(format!("signing certificate key: {e}")))?;
        let mut keys = KeysManager::new();
        keys.add_key(key);
        let ctx = DsigContext::new(keys);

        let references = match verify::verify(&ctx, xml) {
            Ok(VerifyResult::Valid { references, .. }) => references,
            Ok(VerifyResult::Invalid { reason }) => return Err(mismatch(reason)),
            Err(e) => return Err(mismatch(e.to_string())),
        };

        if !references
            .iter()
            .any(|r| covers_document(r, document_reference.as_deref()))
        {
            return Err(mismatch("no Reference covers the document element"));
        }

        debug!(references = references.len(), "XML signature verified");
        Ok(())
    }
}

impl SignatureVerifier for XmlSignatureValidator {
    fn verify(&self, xml: &str, signing_certificate: &Certificate) -> MetadataResult<()> {
        self.validate(xml, signing_certificate)
    }
}

/// `URI=""` covers the whole document; otherwise the fragment must name the
/// document element's ID.
fn covers_document(reference: &VerifiedReference, document_reference: Option<&str>) -> bool {
    reference.digest_verified
        && (reference.uri.is_empty() || Some(reference.uri.as_str()) == document_reference)
}

fn mismatch(reason: impl Into<String>) -> MetadataError {
    MetadataError::SignatureMismatch(reason.into())
}
