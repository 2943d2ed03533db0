//! Per-entity extraction.
//!
//! An extracted entity is the descriptor's source text, copied verbatim, with
//! its start tag rewritten to re-declare the namespaces it inherited from the
//! aggregate root.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::constants::XML_DECLARATION;
use crate::document::{AggregateDocument, SingleEntityDocument};
use crate::error::{MetadataError, MetadataResult};

/// Maximum length of an entity ID, in characters.
pub const MAX_ENTITY_ID_LENGTH: usize = 1024;

/// Returns true if `entity_id` passes the syntactic rule: non-empty, at most
/// [`MAX_ENTITY_ID_LENGTH`] characters, printable ASCII only.
#[must_use]
pub fn is_valid_entity_id(entity_id: &str) -> bool {
    !entity_id.is_empty()
        && entity_id.len() <= MAX_ENTITY_ID_LENGTH
        && entity_id.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Checks an entity ID against the syntactic rule.
///
/// # Errors
///
/// Returns `InvalidEntityId` describing the violation.
pub fn validate_entity_id(entity_id: &str) -> MetadataResult<()> {
    if entity_id.is_empty() {
        return Err(MetadataError::InvalidEntityId("entity ID is empty".to_string()));
    }
    if entity_id.len() > MAX_ENTITY_ID_LENGTH {
        return Err(MetadataError::InvalidEntityId(format!(
            "entity ID exceeds {MAX_ENTITY_ID_LENGTH} characters"
        )));
    }
    if let Some(b) = entity_id.bytes().find(|b| !(0x20..=0x7E).contains(b)) {
        return Err(MetadataError::InvalidEntityId(format!(
            "entity ID contains byte 0x{b:02X}"
        )));
    }
    Ok(())
}

/// Extracts the descriptor for `entity_id` as a standalone document.
///
/// # Errors
///
/// - `InvalidEntityId` if the ID fails [`validate_entity_id`]
/// - `EntityNotFound` if no root-level descriptor carries the ID
/// - `AmbiguousEntity` if several do
pub fn extract_entity(
    entity_id: &str,
    aggregate: &AggregateDocument,
) -> MetadataResult<SingleEntityDocument> {
    validate_entity_id(entity_id)?;

    let range = match aggregate.locate(entity_id) {
        [] => return Err(MetadataError::EntityNotFound(entity_id.to_string())),
        [range] => range.clone(),
        several => {
            return Err(MetadataError::AmbiguousEntity {
                entity_id: entity_id.to_string(),
                count: several.len(),
            })
        }
    };

    let fragment = aggregate.xml().get(range).ok_or_else(|| {
        MetadataError::MalformedMetadata("entity range outside the aggregate".to_string())
    })?;
    let xml = standalone(fragment, aggregate.root_namespaces())?;
    Ok(SingleEntityDocument::new(entity_id.to_string(), xml))
}

fn standalone(fragment: &str, inherited: &[(String, String)]) -> MetadataResult<String> {
    let mut reader = Reader::from_str(fragment);
    let (mut start, is_empty) = match reader.read_event()? {
        Event::Start(start) => (start, false),
        Event::Empty(start) => (start, true),
        other => {
            return Err(MetadataError::MalformedMetadata(format!(
                "expected an element start, found {other:?}"
            )))
        }
    };
    let tag_end = usize::try_from(reader.buffer_position())
        .map_err(|e| MetadataError::MalformedMetadata(e.to_string()))?;

    let declared: Vec<Vec<u8>> = start
        .attributes()
        .with_checks(false)
        .filter_map(Result::ok)
        .map(|attr| attr.key.as_ref().to_vec())
        .collect();
    for (prefix, uri) in inherited {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        if !declared.iter().any(|k| k.as_slice() == key.as_bytes()) {
            start.push_attribute((key.as_str(), uri.as_str()));
        }
    }

    let mut writer = Writer::new(Vec::with_capacity(fragment.len() + XML_DECLARATION.len() + 256));
    writer.get_mut().extend_from_slice(XML_DECLARATION.as_bytes());
    writer.get_mut().push(b'\n');
    let event = if is_empty {
        Event::Empty(start)
    } else {
        Event::Start(start)
    };
    writer
        .write_event(event)
        .map_err(|e| MetadataError::MalformedMetadata(e.to_string()))?;

    let mut out = String::from_utf8(writer.into_inner())
        .map_err(|e| MetadataError::MalformedMetadata(e.to_string()))?;
    out.push_str(&fragment[tag_end..]);
    Ok(out)
}
