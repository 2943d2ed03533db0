//! SAML metadata and XML-DSig constants.

/// SAML 2.0 metadata namespace URI.
pub const MD_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Media type for SAML metadata documents.
pub const SAML_METADATA_CONTENT_TYPE: &str = "application/samlmetadata+xml";

/// Declaration written at the top of every extracted entity document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Element names used during metadata processing.
pub mod elements {
    /// Aggregate root.
    pub const ENTITIES_DESCRIPTOR: &str = "EntitiesDescriptor";
    /// Per-entity descriptor.
    pub const ENTITY_DESCRIPTOR: &str = "EntityDescriptor";
    /// Signature element (qualified names as written).
    pub const SIGNATURE: &str = "Signature";
    /// Signature element with the conventional prefix.
    pub const DS_SIGNATURE: &str = "ds:Signature";
    /// Embedded certificate.
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    /// Embedded certificate with the conventional prefix.
    pub const DS_X509_CERTIFICATE: &str = "ds:X509Certificate";
}

/// Attribute names used during metadata processing.
pub mod attributes {
    /// Aggregate expiry.
    pub const VALID_UNTIL: &str = "validUntil";
    /// Entity identifier.
    pub const ENTITY_ID: &str = "entityID";
    /// ID-typed attribute names on the document element.
    pub const ID_ATTRIBUTES: [&str; 3] = ["ID", "Id", "id"];
}

/// XML Signature algorithm URIs.
pub mod signature_algorithms {
    /// RSA with SHA-256.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// ECDSA with SHA-256.
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";

    /// RSA with SHA-1 (legacy, not supported).
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
}

/// Digest algorithm URIs.
pub mod digest_algorithms {
    /// SHA-256.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
}

/// Canonicalization algorithm URIs.
pub mod canonicalization_algorithms {
    /// Exclusive XML Canonicalization 1.0.
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
}

/// Transform algorithm URIs.
pub mod transform_algorithms {
    /// Enveloped signature transform.
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
}
