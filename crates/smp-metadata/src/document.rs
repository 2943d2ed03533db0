//! Metadata document types.

use std::collections::HashMap;
use std::ops::Range;

use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::Document;
use url::Url;

use crate::constants::{attributes, elements, MD_NS};
use crate::error::{MetadataError, MetadataResult};
use crate::xml;

/// A validated federation aggregate.
///
/// Holds the text exactly as fetched together with an index of its
/// `EntityDescriptor` children, so lookups never re-parse the document.
/// Only the validation pipeline creates these.
#[derive(Debug)]
pub struct AggregateDocument {
    source: Url,
    xml: String,
    valid_until: DateTime<Utc>,
    entities: HashMap<String, Vec<Range<usize>>>,
    root_namespaces: Vec<(String, String)>,
}

impl AggregateDocument {
    /// Indexes a parsed aggregate. Ranges refer to the text `doc` was parsed
    /// from.
    pub(crate) fn index(doc: &Document<'_>) -> MetadataResult<AggregateIndex> {
        let root = xml::require_root(doc, MD_NS, elements::ENTITIES_DESCRIPTOR)?;

        let raw = root.attribute(attributes::VALID_UNTIL).ok_or_else(|| {
            MetadataError::MalformedMetadata("EntitiesDescriptor has no validUntil".to_string())
        })?;
        let valid_until = parse_saml_datetime(raw).ok_or_else(|| {
            MetadataError::MalformedMetadata(format!("unparseable validUntil {raw:?}"))
        })?;

        let root_namespaces = xml::declared_namespaces(root)
            .into_iter()
            .filter(|(prefix, uri)| *prefix != "xml" && !uri.is_empty())
            .map(|(prefix, uri)| (prefix.to_owned(), uri.to_owned()))
            .collect();

        let mut entities: HashMap<String, Vec<Range<usize>>> = HashMap::new();
        for child in root.children().filter(|n| {
            n.is_element()
                && n.tag_name().namespace() == Some(MD_NS)
                && n.tag_name().name() == elements::ENTITY_DESCRIPTOR
        }) {
            if let Some(entity_id) = child.attribute(attributes::ENTITY_ID) {
                entities
                    .entry(entity_id.to_owned())
                    .or_default()
                    .push(child.range());
            }
        }

        Ok(AggregateIndex {
            valid_until,
            entities,
            root_namespaces,
        })
    }

    pub(crate) fn from_index(source: Url, xml: String, index: AggregateIndex) -> Self {
        Self {
            source,
            xml,
            valid_until: index.valid_until,
            entities: index.entities,
            root_namespaces: index.root_namespaces,
        }
    }

    /// The URI the document was fetched from.
    #[must_use]
    pub fn source(&self) -> &Url {
        &self.source
    }

    /// The document text exactly as fetched.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// The expiry declared by the document.
    #[must_use]
    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    /// Number of `EntityDescriptor` children carrying an `entityID`.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }

    /// Source ranges of the descriptors whose `entityID` is `entity_id`.
    pub(crate) fn locate(&self, entity_id: &str) -> &[Range<usize>] {
        self.entities.get(entity_id).map_or(&[][..], Vec::as_slice)
    }

    /// Namespace declarations of the document element, excluding undeclarations.
    pub(crate) fn root_namespaces(&self) -> &[(String, String)] {
        &self.root_namespaces
    }
}

/// Facts extracted from a parsed aggregate.
#[derive(Debug)]
pub(crate) struct AggregateIndex {
    pub(crate) valid_until: DateTime<Utc>,
    entities: HashMap<String, Vec<Range<usize>>>,
    root_namespaces: Vec<(String, String)>,
}

/// A standalone document holding a single entity descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleEntityDocument {
    entity_id: String,
    xml: String,
}

impl SingleEntityDocument {
    pub(crate) fn new(entity_id: String, xml: String) -> Self {
        Self { entity_id, xml }
    }

    /// The requested entity ID.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The serialized document.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Consumes the document, returning its text.
    #[must_use]
    pub fn into_xml(self) -> String {
        self.xml
    }
}

/// Parses an `xs:dateTime` value as used by `validUntil`.
///
/// Values without a timezone are read as UTC.
#[must_use]
pub fn parse_saml_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
