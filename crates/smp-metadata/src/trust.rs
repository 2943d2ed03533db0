//! Certificate pinning.

use smp_crypto::Certificate;

use crate::error::{MetadataError, MetadataResult};

/// Checks that the embedded signing certificate is the pinned one.
///
/// The SHA-256 fingerprints of the two DER encodings must be equal. No chain,
/// issuer, revocation or validity-period checks are made.
///
/// # Errors
///
/// Returns `UntrustedCertificate` carrying both fingerprints.
pub fn verify_trust(signing: &Certificate, pinned: &Certificate) -> MetadataResult<()> {
    if signing.sha256_fingerprint() == pinned.sha256_fingerprint() {
        Ok(())
    } else {
        Err(MetadataError::UntrustedCertificate {
            expected: pinned.fingerprint_hex(),
            actual: signing.fingerprint_hex(),
        })
    }
}
