//! Lexical helpers over parsed documents.
//!
//! roxmltree resolves element names to namespace URIs and drops the
//! prefixes. Signature location and entity extraction need names as written,
//! so the start tag of an element is re-read from the input text. The input
//! has already been parsed once, so the scanner only has to be correct for
//! well-formed markup.

use roxmltree::{Document, Node};

use crate::error::{MetadataError, MetadataResult};

/// Parses metadata text. DTDs are rejected.
pub(crate) fn parse(xml: &str) -> MetadataResult<Document<'_>> {
    Ok(Document::parse(xml)?)
}

/// Prefixes declared on `node`'s start tag (`""` for `xmlns=`), as written.
fn declared_prefixes<'input>(node: Node<'_, 'input>) -> Vec<&'input str> {
    let text = &node.document().input_text()[node.range().start + 1..];
    let bytes = text.as_bytes();
    let mut pos = name_end(text);

    let mut prefixes = Vec::new();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] == b'/' || bytes[pos] == b'>' {
            break;
        }

        let key_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
            pos += 1;
        }
        let key = &text[key_start..pos];

        while pos < bytes.len() && bytes[pos] != b'"' && bytes[pos] != b'\'' {
            pos += 1;
        }
        let Some(&quote) = bytes.get(pos) else {
            break;
        };
        pos += 1;
        while pos < bytes.len() && bytes[pos] != quote {
            pos += 1;
        }
        pos += 1;

        if key == "xmlns" {
            prefixes.push("");
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            prefixes.push(prefix);
        }
    }
    prefixes
}

/// Qualified name of an element as written, e.g. `md:EntityDescriptor`.
pub(crate) fn qualified_name<'input>(node: Node<'_, 'input>) -> &'input str {
    let text = &node.document().input_text()[node.range().start + 1..];
    &text[..name_end(text)]
}

/// Namespaces declared directly on `node`, resolved to their URIs.
pub(crate) fn declared_namespaces<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> Vec<(&'a str, &'a str)> {
    declared_prefixes(node)
        .into_iter()
        .map(|prefix| {
            let lookup = if prefix.is_empty() { None } else { Some(prefix) };
            (prefix, node.lookup_namespace_uri(lookup).unwrap_or(""))
        })
        .collect()
}

/// Finds the single root element, checking its namespace and local name.
pub(crate) fn require_root<'a, 'input>(
    doc: &'a Document<'input>,
    namespace: &str,
    local_name: &str,
) -> MetadataResult<Node<'a, 'input>> {
    let root = doc.root_element();
    let name = root.tag_name();
    if name.namespace() == Some(namespace) && name.name() == local_name {
        Ok(root)
    } else {
        Err(MetadataError::MalformedMetadata(format!(
            "document element is {{{}}}{}, expected {{{namespace}}}{local_name}",
            name.namespace().unwrap_or(""),
            name.name()
        )))
    }
}

fn name_end(text: &str) -> usize {
    text.find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(text.len())
}
