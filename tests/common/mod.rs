//! Shared helpers for integration tests
//!
//! Builds packages entry by entry so tests can describe exactly what lands in
//! the archive, including broken layouts the writer would never produce.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use threemf::Mesh;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

/// Relationships XML naming each of `targets` as a model part
pub fn rels(targets: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, target) in targets.iter().enumerate() {
        xml.push_str(&format!(
            "  <Relationship Id=\"rel{}\" Target=\"{}\" Type=\"http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel\"/>\n",
            i, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Wrap resources and build XML in a `<model>` document
pub fn model(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06">
{}
</model>"#,
        body
    )
}

/// A one-triangle mesh object with the given id, as XML
pub fn triangle_object(id: usize) -> String {
    format!(
        r#"<object id="{}" type="model"><mesh><vertices>
<vertex x="0" y="0" z="0"/><vertex x="1" y="0" z="0"/><vertex x="0" y="1" z="0"/>
</vertices><triangles><triangle v1="0" v2="1" v3="2"/></triangles></mesh></object>"#,
        id
    )
}

/// Zip the given `(name, content)` entries in order
pub fn package(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A package with standard descriptors and one model part per `(path, xml)`
pub fn package_with_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let targets: Vec<String> = parts.iter().map(|(p, _)| format!("/{}", p)).collect();
    let target_refs: Vec<&str> = targets.iter().map(String::as_str).collect();
    let rels = rels(&target_refs);

    let mut entries: Vec<(&str, &[u8])> = vec![
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", rels.as_bytes()),
    ];
    for (path, xml) in parts {
        entries.push((path, xml.as_bytes()));
    }
    package(&entries)
}

/// Closed unit cube: 12 triangles as a flat point buffer
pub fn cube_points() -> Vec<f64> {
    let p = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    faces
        .iter()
        .flat_map(|f| f.iter().flat_map(|&i| p[i]))
        .collect()
}

pub fn cube() -> Mesh {
    Mesh::from_points(&cube_points()).unwrap()
}
