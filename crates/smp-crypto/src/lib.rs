//! # smp-crypto
//!
//! Certificate primitives for the SAML metadata proxy using aws-lc-rs.
//!
//! Signature checking itself lives with the XML-DSig implementation; this
//! crate covers what certificate pinning needs.
//!
//! - [`hash`] - SHA-256 fingerprints
//! - [`certificate`] - X.509 certificate handle (DER, PEM, base64, file)

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod certificate;
pub mod error;
pub mod hash;

pub use certificate::Certificate;
pub use error::{CryptoError, CryptoResult};
pub use hash::sha256;
