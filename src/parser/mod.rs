//! 3MF package reading
//!
//! Reading happens in one pass over the package:
//!
//! 1. open the archive and parse both OPC descriptors;
//! 2. parse every model part the relationships name;
//! 3. check that all build-item and component references resolve;
//! 4. instantiate, read and post-process the registered extensions.
//!
//! Any failure aborts the read; no partially built document is returned.

mod core;

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::model::{Document, MetadataEntry, Mesh, ModelPart, Object, ObjectKind};
use crate::opc::{ContentTypes, MODEL_CONTENT_TYPE, Package};

use self::core::{
    parse_build_item, parse_component, parse_metadata, parse_model_unit, parse_object,
    parse_triangle, parse_vertex,
};

/// Extract local name from a potentially namespaced XML name
///
/// `p:path` becomes `path`; names without a prefix are returned unchanged.
pub(crate) fn get_local_name(name_str: &str) -> &str {
    match name_str.rfind(':') {
        Some(pos) => &name_str[pos + 1..],
        None => name_str,
    }
}

/// Collect an element's attributes keyed by local name, with values unescaped
///
/// Namespace declarations (`xmlns`, `xmlns:*`) are left out.
pub(crate) fn parse_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key =
            std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let raw =
            std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        attrs.insert(get_local_name(key).to_string(), unescape(raw)?.into_owned());
    }

    Ok(attrs)
}

/// Read a whole document from a seekable stream
pub(crate) fn read_package<R: Read + Seek>(reader: R, config: &ParserConfig) -> Result<Document> {
    let mut package = Package::open(reader)?;
    let content_types = package.content_types()?;
    let part_names = package.model_part_names()?;

    let mut document = Document::new();
    for path in &part_names {
        if !package.has_file(path) {
            return Err(Error::MissingFile(path.clone()));
        }
        check_content_type(&content_types, path, config)?;

        let xml = package.get_file_binary(path)?;
        let part = parse_model_part(path, &xml)?;
        debug!(
            part = %path,
            objects = part.objects().len(),
            build_items = part.build.items.len(),
            "read model part"
        );
        document.push_model_part(part);
    }

    document.check_references()?;

    let mut extensions: Vec<Box<dyn Extension>> = Vec::with_capacity(config.registry().len());
    for (name, factory) in config.registry().iter() {
        let mut extension = factory().map_err(|e| Error::extension(name, e))?;
        extension
            .read(&mut package)
            .map_err(|e| Error::extension(name, e))?;
        debug!(
            extension = name,
            assets = extension.assets().len(),
            "read extension"
        );
        extensions.push(extension);
    }

    for extension in &mut extensions {
        if let Err(e) = extension.process(&document) {
            return Err(Error::extension(extension.name(), e));
        }
    }

    for extension in extensions {
        document.push_extension(extension);
    }

    debug!(
        parts = document.model_parts().len(),
        extensions = document.extensions().len(),
        "read package"
    );
    Ok(document)
}

fn check_content_type(types: &ContentTypes, path: &str, config: &ParserConfig) -> Result<()> {
    let declared = types.content_type_for(path);
    if declared == Some(MODEL_CONTENT_TYPE) {
        return Ok(());
    }

    if config.strict_content_types() {
        return Err(Error::InvalidFormat(format!(
            "Model part '{}' has content type {:?}, expected '{}'",
            path, declared, MODEL_CONTENT_TYPE
        )));
    }
    warn!(
        part = path,
        content_type = ?declared,
        "model part content type does not match"
    );
    Ok(())
}

/// Object being assembled while its children are read
struct PendingObject {
    object: Object,
    mesh: Option<Mesh>,
}

/// Parse one model-part XML document
///
/// Triangle indices are checked against their mesh, and object ids must be
/// unique within the part. References are not resolved here.
pub fn parse_model_part(path: &str, xml: &[u8]) -> Result<ModelPart> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut part = ModelPart::new(path);
    let mut seen_model = false;
    let mut current: Option<PendingObject> = None;
    let mut metadata: Option<(MetadataEntry, String)> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?;

                match get_local_name(name_str) {
                    "model" => {
                        part.unit = parse_model_unit(e)?;
                        seen_model = true;
                    }
                    "object" => {
                        let object = parse_object(e)?;
                        if is_empty {
                            part.insert_object(object)?;
                        } else {
                            current = Some(PendingObject { object, mesh: None });
                        }
                    }
                    "mesh" => {
                        if let Some(pending) = current.as_mut() {
                            if is_empty {
                                pending.object.kind = ObjectKind::Mesh(Mesh::new());
                            } else {
                                pending.mesh = Some(Mesh::new());
                            }
                        }
                    }
                    "vertex" => {
                        if let Some(mesh) = current.as_mut().and_then(|p| p.mesh.as_mut()) {
                            mesh.vertices.push(parse_vertex(e)?);
                        }
                    }
                    "triangle" => {
                        if let Some(mesh) = current.as_mut().and_then(|p| p.mesh.as_mut()) {
                            mesh.triangles.push(parse_triangle(e)?);
                        }
                    }
                    "component" => {
                        if let Some(pending) = current.as_mut() {
                            pending.object.components.push(parse_component(e)?);
                        }
                    }
                    "item" => {
                        part.build.items.push(parse_build_item(e)?);
                    }
                    "metadata" => {
                        let entry = parse_metadata(e)?;
                        if is_empty {
                            store_metadata(&mut part, current.as_mut(), entry);
                        } else {
                            metadata = Some((entry, String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?;

                match get_local_name(name_str) {
                    "metadata" => {
                        if let Some((mut entry, value)) = metadata.take() {
                            entry.value = value;
                            store_metadata(&mut part, current.as_mut(), entry);
                        }
                    }
                    "mesh" => {
                        if let Some(pending) = current.as_mut() {
                            if let Some(mesh) = pending.mesh.take() {
                                mesh.validate_indices().map_err(|e| {
                                    Error::InvalidModel(format!(
                                        "Object {} in '{}': {}",
                                        pending.object.id(),
                                        path,
                                        e
                                    ))
                                })?;
                                pending.object.kind = ObjectKind::Mesh(mesh);
                            }
                        }
                    }
                    "object" => {
                        if let Some(pending) = current.take() {
                            part.insert_object(pending.object)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if let Some((_, value)) = metadata.as_mut() {
                    let raw = std::str::from_utf8(&e)
                        .map_err(|e| Error::InvalidXml(e.to_string()))?;
                    value.push_str(&unescape(raw)?);
                }
            }
            Event::CData(e) => {
                if let Some((_, value)) = metadata.as_mut() {
                    let raw = std::str::from_utf8(&e)
                        .map_err(|e| Error::InvalidXml(e.to_string()))?;
                    value.push_str(raw);
                }
            }
            Event::GeneralRef(e) => {
                if let Some((_, value)) = metadata.as_mut() {
                    let name = std::str::from_utf8(&e)
                        .map_err(|e| Error::InvalidXml(e.to_string()))?;
                    value.push_str(&unescape(&format!("&{};", name))?);
                }
            }
            Event::DocType(_) => {
                return Err(Error::InvalidXml(format!(
                    "DTD declarations are not allowed in model part '{}'",
                    path
                )));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_model {
        return Err(Error::InvalidXml(format!(
            "Model part '{}' has no <model> element",
            path
        )));
    }

    Ok(part)
}

fn store_metadata(part: &mut ModelPart, object: Option<&mut PendingObject>, entry: MetadataEntry) {
    match object {
        Some(pending) => pending.object.metadata.insert(entry),
        None => part.metadata.insert(entry),
    }
}
