//! SAML metadata handling for the metadata proxy.
//!
//! This crate turns a fetched federation aggregate into something that can
//! be served:
//!
//! - **Trust** - the certificate embedded in the aggregate's signature must
//!   be the federation's pinned certificate
//! - **XML signature** - enveloped XML-DSig verification through
//!   `bergshamra-dsig`, keyed only by the pinned certificate
//! - **Expiry** - the aggregate's lifetime comes from its own `validUntil`
//! - **Extraction** - a single `EntityDescriptor` is served as a standalone
//!   document
//!
//! # Architecture
//!
//! - [`validation`] - the fetch-to-document pipeline ([`MetadataValidator`])
//! - [`signature`] - signature location and verification
//! - [`trust`] - certificate pinning
//! - [`extract`] - entity ID rules and per-entity extraction
//! - [`document`] - aggregate and single-entity document types
//! - [`error`] - error types for metadata operations
//!
//! # Example
//!
//! ```rust,ignore
//! use smp_metadata::{extract_entity, MetadataValidator};
//!
//! let aggregate = MetadataValidator::default().validate(&source, xml, &pinned, false)?;
//! let entity = extract_entity("https://sp.example.org/shibboleth", &aggregate)?;
//! ```
//!
//! # Standards
//!
//! - [SAML 2.0 Metadata](https://docs.oasis-open.org/security/saml/v2.0/saml-metadata-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod document;
pub mod error;
pub mod extract;
pub mod signature;
pub mod trust;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

mod xml;

pub use document::{parse_saml_datetime, AggregateDocument, SingleEntityDocument};
pub use error::{MetadataError, MetadataResult};
pub use extract::{extract_entity, is_valid_entity_id, validate_entity_id, MAX_ENTITY_ID_LENGTH};
pub use signature::{extract_signing_certificate, SignatureVerifier, XmlSignatureValidator};
pub use trust::verify_trust;
pub use validation::MetadataValidator;
