//! Test support: throwaway signing certificates and signed aggregates.
//!
//! Enabled for this crate's tests and, for other crates, through the
//! `test-support` feature.

#![allow(clippy::missing_panics_doc)]

use base64::Engine;
use bergshamra_dsig::{sign, DsigContext};
use bergshamra_keys::{loader, KeysManager};
use chrono::{DateTime, SecondsFormat, Utc};
use smp_crypto::Certificate;

use crate::constants::{
    canonicalization_algorithms, digest_algorithms, signature_algorithms, transform_algorithms,
    MD_NS, XMLDSIG_NS,
};
use crate::xml;

/// Placeholder in an aggregate template where the signature is inserted.
pub const SIGNATURE_MARKER: &str = "<!-- signature -->";

/// An ECDSA P-256 key with a self-signed certificate.
pub struct TestSigner {
    certificate: Certificate,
    pem: String,
    key_pem: String,
}

impl TestSigner {
    /// Generates a fresh key and certificate.
    #[must_use]
    pub fn generate() -> Self {
        let certified =
            rcgen::generate_simple_self_signed(vec!["metadata-signer.example.test".to_string()])
                .expect("certificate generation");
        let certificate =
            Certificate::from_der(certified.cert.der().to_vec()).expect("generated certificate");
        Self {
            certificate,
            pem: certified.cert.pem(),
            key_pem: certified.key_pair.serialize_pem(),
        }
    }

    /// The signing certificate.
    #[must_use]
    pub fn certificate(&self) -> Certificate {
        self.certificate.clone()
    }

    /// The signing certificate as PEM, for pinned-certificate files.
    #[must_use]
    pub fn certificate_pem(&self) -> &str {
        &self.pem
    }

    /// Signs an aggregate template, replacing [`SIGNATURE_MARKER`] with an
    /// enveloped signature over the document element.
    ///
    /// The reference is `#ID` when the document element has an `ID`, and
    /// `""` otherwise.
    #[must_use]
    pub fn sign_aggregate(&self, template: &str) -> String {
        let unsigned = template.replacen(SIGNATURE_MARKER, "", 1);
        let doc = xml::parse(&unsigned).expect("template must parse");
        let reference = doc
            .root_element()
            .attribute("ID")
            .map_or_else(String::new, |id| format!("#{id}"));
        self.sign_aggregate_reference(template, &reference)
    }

    /// Like [`sign_aggregate`](Self::sign_aggregate) with an explicit
    /// reference URI.
    #[must_use]
    pub fn sign_aggregate_reference(&self, template: &str, reference: &str) -> String {
        let certificate =
            base64::engine::general_purpose::STANDARD.encode(self.certificate.der());
        let with_template =
            template.replacen(SIGNATURE_MARKER, &signature_template(reference, &certificate), 1);

        let key = loader::load_ec_p256_private_pem(self.key_pem.as_bytes()).expect("signing key");
        let mut keys = KeysManager::new();
        keys.add_key(key);
        sign::sign(&DsigContext::new(keys), &with_template).expect("signing")
    }
}

impl std::fmt::Debug for TestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSigner")
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

/// An enveloped signature skeleton with empty digest and signature values.
fn signature_template(reference: &str, certificate: &str) -> String {
    format!(
        concat!(
            r#"<ds:Signature xmlns:ds="{ds}">"#,
            r#"<ds:SignedInfo>"#,
            r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
            r#"<ds:SignatureMethod Algorithm="{sig}"/>"#,
            r#"<ds:Reference URI="{reference}">"#,
            r#"<ds:Transforms>"#,
            r#"<ds:Transform Algorithm="{enveloped}"/>"#,
            r#"<ds:Transform Algorithm="{c14n}"/>"#,
            r#"</ds:Transforms>"#,
            r#"<ds:DigestMethod Algorithm="{digest}"/>"#,
            r#"<ds:DigestValue></ds:DigestValue>"#,
            r#"</ds:Reference>"#,
            r#"</ds:SignedInfo>"#,
            r#"<ds:SignatureValue></ds:SignatureValue>"#,
            r#"<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>"#,
            r#"</ds:Signature>"#,
        ),
        ds = XMLDSIG_NS,
        c14n = canonicalization_algorithms::EXCLUSIVE_C14N,
        sig = signature_algorithms::ECDSA_SHA256,
        reference = reference,
        enveloped = transform_algorithms::ENVELOPED_SIGNATURE,
        digest = digest_algorithms::SHA256,
        certificate = certificate,
    )
}

/// Builds an unsigned aggregate template with one SP descriptor per entity
/// ID. The document element has `ID="_aggregate"` and declares an `mdui`
/// namespace that the descriptors use without re-declaring.
#[must_use]
pub fn aggregate_xml(valid_until: DateTime<Utc>, entity_ids: &[&str]) -> String {
    let mut xml = format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<md:EntitiesDescriptor xmlns:md=\"{md}\" ",
            "xmlns:mdui=\"urn:oasis:names:tc:SAML:metadata:ui\" ",
            "validUntil=\"{valid_until}\" ID=\"_aggregate\" Name=\"urn:example:federation\">\n",
            "  {marker}\n",
        ),
        md = MD_NS,
        valid_until = valid_until.to_rfc3339_opts(SecondsFormat::Secs, true),
        marker = SIGNATURE_MARKER,
    );
    for entity_id in entity_ids {
        let id = escape(entity_id);
        xml.push_str(&format!(
            concat!(
                "  <md:EntityDescriptor entityID=\"{id}\">\n",
                "    <md:SPSSODescriptor protocolSupportEnumeration=\"urn:oasis:names:tc:SAML:2.0:protocol\">\n",
                "      <md:Extensions><mdui:UIInfo><mdui:DisplayName xml:lang=\"en\">{id}</mdui:DisplayName></mdui:UIInfo></md:Extensions>\n",
                "      <md:AssertionConsumerService Binding=\"urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST\" Location=\"{id}/acs\" index=\"0\"/>\n",
                "    </md:SPSSODescriptor>\n",
                "  </md:EntityDescriptor>\n",
            ),
            id = id,
        ));
    }
    xml.push_str("</md:EntitiesDescriptor>\n");
    xml
}

/// Corrupts the signature value while keeping it valid base64.
#[must_use]
pub fn tamper_signature_value(xml: &str) -> String {
    let open = "<ds:SignatureValue>";
    let start = xml.find(open).expect("signature value") + open.len();
    let first = &xml[start..=start];
    let replacement = if first == "A" { "B" } else { "A" };
    format!("{}{}{}", &xml[..start], replacement, &xml[start + 1..])
}

/// Replaces the certificate carried in the signature's `KeyInfo`.
#[must_use]
pub fn replace_embedded_certificate(xml: &str, certificate: &Certificate) -> String {
    let open = "<ds:X509Certificate>";
    let close = "</ds:X509Certificate>";
    let start = xml.find(open).expect("embedded certificate") + open.len();
    let end = start + xml[start..].find(close).expect("embedded certificate end");
    format!(
        "{}{}{}",
        &xml[..start],
        base64::engine::general_purpose::STANDARD.encode(certificate.der()),
        &xml[end..]
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
