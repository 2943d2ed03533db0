//! Locating the signature and its embedded certificate.
//!
//! Elements are matched by qualified name as written in the document, with
//! the `ds:`-prefixed spelling as a fallback when the bare name is absent.

use roxmltree::{Document, Node};
use smp_crypto::Certificate;

use crate::constants::elements;
use crate::error::{MetadataError, MetadataResult};
use crate::xml;

/// Finds the document's single signature element.
///
/// # Errors
///
/// Returns `MalformedMetadata` unless exactly one element named `Signature`
/// (or, failing that, `ds:Signature`) exists anywhere in the document.
pub fn signature_element<'a, 'input>(
    doc: &'a Document<'input>,
) -> MetadataResult<Node<'a, 'input>> {
    single_named(doc.root(), elements::SIGNATURE, elements::DS_SIGNATURE)
}

/// Extracts the signing certificate embedded in the document's signature.
///
/// # Errors
///
/// Returns `MalformedMetadata` if the signature or certificate element is
/// missing or repeated, or the certificate does not decode.
pub fn extract_signing_certificate(xml: &str) -> MetadataResult<Certificate> {
    let doc = xml::parse(xml)?;
    signing_certificate(&doc)
}

pub(crate) fn signing_certificate(doc: &Document<'_>) -> MetadataResult<Certificate> {
    let signature = signature_element(doc)?;
    let cert_node = single_named(
        signature,
        elements::X509_CERTIFICATE,
        elements::DS_X509_CERTIFICATE,
    )?;
    let text: String = cert_node
        .children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    Certificate::from_base64(&text).map_err(|e| {
        MetadataError::MalformedMetadata(format!("embedded signing certificate: {e}"))
    })
}

fn single_named<'a, 'input>(
    scope: Node<'a, 'input>,
    name: &str,
    fallback: &str,
) -> MetadataResult<Node<'a, 'input>> {
    for qname in [name, fallback] {
        let mut matches = scope
            .descendants()
            .filter(|n| n.is_element() && xml::qualified_name(*n) == qname);
        match (matches.next(), matches.next()) {
            (Some(node), None) => return Ok(node),
            (Some(_), Some(_)) => {
                return Err(MetadataError::MalformedMetadata(format!(
                    "expected exactly one {qname} element, found several"
                )))
            }
            (None, _) => {}
        }
    }
    Err(MetadataError::MalformedMetadata(format!(
        "no {name} or {fallback} element"
    )))
}
