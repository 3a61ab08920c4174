//! `[Content_Types].xml` parsing and generation

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::{CONTENT_TYPES_NS, MODEL_CONTENT_TYPE, RELS_CONTENT_TYPE, normalize_part_name};
use crate::error::{Error, Result};
use crate::parser::{get_local_name, parse_attributes};

/// Parsed content-type descriptor
///
/// An `Override` for a specific part wins over a `Default` for its file
/// extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse a `[Content_Types].xml` document
    ///
    /// Element and attribute names are matched by local name, so any namespace
    /// prefix is accepted.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut types = Self::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| Error::InvalidXml(e.to_string()))?;
                    let attrs = parse_attributes(e)?;

                    match get_local_name(name_str) {
                        "Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attrs.get("Extension"), attrs.get("ContentType"))
                            {
                                types.defaults.push((ext.to_ascii_lowercase(), ct.clone()));
                            }
                        }
                        "Override" => {
                            if let (Some(part), Some(ct)) =
                                (attrs.get("PartName"), attrs.get("ContentType"))
                            {
                                types
                                    .overrides
                                    .push((normalize_part_name(part), ct.clone()));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::DocType(_)) => {
                    return Err(Error::InvalidXml(
                        "DTD declarations are not allowed in [Content_Types].xml".to_string(),
                    ));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type declared for `part`, if any
    pub fn content_type_for(&self, part: &str) -> Option<&str> {
        let part = normalize_part_name(part);
        if let Some((_, ct)) = self.overrides.iter().find(|(name, _)| *name == part) {
            return Some(ct);
        }

        let file_name = part.rsplit('/').next().unwrap_or(&part);
        let (_, extension) = file_name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, ct)| ct.as_str())
    }
}

/// Generate `[Content_Types].xml` with the `rels` and `model` defaults
pub(crate) fn write_content_types() -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))?;

    let mut types = BytesStart::new("Types");
    types.push_attribute(("xmlns", CONTENT_TYPES_NS));
    writer
        .write_event(Event::Start(types))
        .map_err(|e| Error::xml_write(format!("Failed to write Types element: {}", e)))?;

    for (extension, content_type) in [("rels", RELS_CONTENT_TYPE), ("model", MODEL_CONTENT_TYPE)] {
        let mut elem = BytesStart::new("Default");
        elem.push_attribute(("Extension", extension));
        elem.push_attribute(("ContentType", content_type));
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::xml_write(format!("Failed to write Default element: {}", e)))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Types")))
        .map_err(|e| Error::xml_write(format!("Failed to close Types element: {}", e)))?;

    Ok(writer.into_inner())
}
