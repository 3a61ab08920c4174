//! Package relationship parsing and generation

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use urlencoding::{decode, encode};

use super::{MODEL_REL_TYPE, RELATIONSHIPS_NS, normalize_part_name};
use crate::error::{Error, Result};
use crate::parser::{get_local_name, parse_attributes};

/// A single `Relationship` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, unique within the descriptor
    pub id: String,
    /// Target exactly as written in the descriptor
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
}

impl Relationship {
    /// Archive entry name the target points at
    pub fn target_part(&self) -> Result<String> {
        normalize_target(&self.target)
    }

    /// Whether this relationship names a 3D model part
    pub fn is_model(&self) -> bool {
        self.rel_type == MODEL_REL_TYPE
    }
}

/// Turn a relationship target into an archive entry name
///
/// The leading `/` is removed and percent-encoding decoded. Raw UTF-8 targets
/// pass through unchanged.
pub fn normalize_target(target: &str) -> Result<String> {
    let decoded = decode(target).map_err(|e| {
        Error::InvalidFormat(format!(
            "Relationship target '{}' is not valid percent-encoded UTF-8: {}",
            target, e
        ))
    })?;
    Ok(normalize_part_name(&decoded))
}

/// Parse a relationships document into its `Relationship` elements
///
/// Elements missing `Target` or `Type` are skipped.
pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?;

                if get_local_name(name_str) == "Relationship" {
                    let mut attrs = parse_attributes(e)?;
                    if let (Some(target), Some(rel_type)) =
                        (attrs.remove("Target"), attrs.remove("Type"))
                    {
                        relationships.push(Relationship {
                            id: attrs.remove("Id").unwrap_or_default(),
                            target,
                            rel_type,
                        });
                    }
                }
            }
            Ok(Event::DocType(_)) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in relationships".to_string(),
                ));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

fn encode_target(part: &str) -> String {
    let encoded: Vec<_> = part.split('/').map(encode).collect();
    format!("/{}", encoded.join("/"))
}

/// Generate `_rels/.rels` with one model relationship per part, in order
pub(crate) fn write_relationships(parts: &[String]) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))?;

    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", RELATIONSHIPS_NS));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| Error::xml_write(format!("Failed to write Relationships element: {}", e)))?;

    for (n, part) in parts.iter().enumerate() {
        let mut elem = BytesStart::new("Relationship");
        elem.push_attribute(("Target", encode_target(part).as_str()));
        elem.push_attribute(("Id", format!("rel{}", n).as_str()));
        elem.push_attribute(("Type", MODEL_REL_TYPE));
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::xml_write(format!("Failed to write Relationship: {}", e)))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Relationships")))
        .map_err(|e| Error::xml_write(format!("Failed to close Relationships element: {}", e)))?;

    Ok(writer.into_inner())
}
