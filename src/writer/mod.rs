//! 3MF package writing
//!
//! Serializes a [`Document`] into a complete package: the OPC descriptors,
//! one XML document per model part and every extension's assets. Output
//! follows insertion order everywhere, so equal documents give equal bytes.

mod core;

use std::io::Write as IoWrite;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tracing::debug;

use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::model::{Document, ModelPart};
use crate::opc::{
    CONTENT_TYPES_PATH, PackageWriter, RELS_PATH, write_content_types, write_relationships,
};

use self::core::{write_build, write_metadata, write_object};

/// Core 3MF namespace
pub const CORE_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Cura namespace, declared as `xmlns:cura`
pub const CURA_NS: &str = "http://software.ultimaker.com/xml/cura/3mf/2015/10";

/// Production extension namespace, declared as `xmlns:p` when needed
pub const PRODUCTION_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/production/2015/06";

/// Serialize a whole document into package bytes
pub(crate) fn write_package(document: &Document, config: &WriterConfig) -> Result<Vec<u8>> {
    let mut package = PackageWriter::new(config.compression);

    let parts: Vec<String> = document
        .model_parts()
        .iter()
        .map(|p| p.path().to_string())
        .collect();

    package.write_entry(CONTENT_TYPES_PATH, &write_content_types()?)?;
    package.write_entry(RELS_PATH, &write_relationships(&parts)?)?;

    for part in document.model_parts() {
        let mut xml = Vec::new();
        write_model_part_xml(part, &mut xml)?;
        package.write_entry(part.path(), &xml)?;
        debug!(
            part = part.path(),
            objects = part.objects().len(),
            build_items = part.build.items.len(),
            "wrote model part"
        );
    }

    for extension in document.extensions() {
        extension
            .write(&mut package)
            .map_err(|e| Error::extension(extension.name(), e))?;
        debug!(
            extension = extension.name(),
            assets = extension.assets().len(),
            "wrote extension"
        );
    }

    package.finish()
}

/// Write one model part as XML
///
/// Serializes the part's metadata, objects and build list into a
/// `<model>` document.
pub fn write_model_part_xml<W: IoWrite>(part: &ModelPart, writer: W) -> Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

    xml_writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))?;

    let mut model_elem = BytesStart::new("model");
    model_elem.push_attribute(("unit", part.unit.as_str()));
    model_elem.push_attribute(("xml:lang", "en-US"));
    model_elem.push_attribute(("xmlns", CORE_NS));
    model_elem.push_attribute(("xmlns:cura", CURA_NS));

    let uses_part_paths = part
        .objects()
        .iter()
        .any(|o| o.components.iter().any(|c| c.path.is_some()));
    if uses_part_paths {
        model_elem.push_attribute(("xmlns:p", PRODUCTION_NS));
    }

    xml_writer
        .write_event(Event::Start(model_elem))
        .map_err(|e| Error::xml_write(format!("Failed to write model element: {}", e)))?;

    for entry in &part.metadata {
        write_metadata(&mut xml_writer, entry)?;
    }

    xml_writer
        .write_event(Event::Start(BytesStart::new("resources")))
        .map_err(|e| Error::xml_write(format!("Failed to write resources element: {}", e)))?;

    for object in part.objects() {
        write_object(&mut xml_writer, object)?;
    }

    xml_writer
        .write_event(Event::End(BytesEnd::new("resources")))
        .map_err(|e| Error::xml_write(format!("Failed to close resources element: {}", e)))?;

    write_build(&mut xml_writer, &part.build)?;

    xml_writer
        .write_event(Event::End(BytesEnd::new("model")))
        .map_err(|e| Error::xml_write(format!("Failed to close model element: {}", e)))?;

    Ok(())
}
