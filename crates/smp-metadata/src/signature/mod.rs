//! XML Signature support for SAML metadata.
//!
//! Aggregates are signed with an enveloped XML-DSig signature over the
//! document element. This module locates that signature and its embedded
//! certificate, and verifies it.
//!
//! # Signature Algorithms
//!
//! - RSA-SHA256 / RSA-SHA384 / RSA-SHA512
//! - ECDSA-SHA256 (P-256) / ECDSA-SHA384 (P-384)

mod locate;
mod validator;

pub use locate::{extract_signing_certificate, signature_element};
pub use validator::{SignatureVerifier, XmlSignatureValidator};

pub(crate) use locate::signing_certificate;
