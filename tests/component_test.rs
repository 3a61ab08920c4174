//! Reference resolution, cross-part components and malformed packages

mod common;

use std::io::Cursor;

use common::{model, package, package_with_parts, rels, triangle_object, CONTENT_TYPES};
use threemf::{Document, Error, ParserConfig, Transform};

fn read(bytes: Vec<u8>) -> threemf::Result<Document> {
    Document::from_reader(Cursor::new(bytes))
}

#[test]
fn test_component_resolves_in_own_part_first() {
    let main = model(&format!(
        r#"<resources>{}<object id="2"><components><component objectid="1"/></components></object></resources>
<build><item objectid="2"/></build>"#,
        triangle_object(1)
    ));
    let other = model(&format!("<resources>{}</resources><build/>", triangle_object(1)));
    let doc = read(package_with_parts(&[
        ("3D/3dmodel.model", &main),
        ("3D/other.model", &other),
    ]))
    .unwrap();

    let (part, obj) = doc.resolve("3D/3dmodel.model", 1, None).unwrap();
    assert_eq!(part.path(), "3D/3dmodel.model");
    assert!(obj.mesh().is_some());

    let (part, _) = doc.resolve("3D/other.model", 1, None).unwrap();
    assert_eq!(part.path(), "3D/other.model");
}

#[test]
fn test_cross_part_component_with_path() {
    let main = model(
        r#"<resources><object id="1"><components>
<component objectid="5" p:path="/3D/parts.model" transform="1 0 0 0 1 0 0 0 1 0 0 10"/>
</components></object></resources>
<build><item objectid="1"/></build>"#,
    );
    let parts = model(&format!("<resources>{}</resources><build/>", triangle_object(5)));
    let doc = read(package_with_parts(&[
        ("3D/3dmodel.model", &main),
        ("3D/parts.model", &parts),
    ]))
    .unwrap();

    let main = doc.model_part("3D/3dmodel.model").unwrap();
    let component = &main.object(1).unwrap().components[0];
    assert_eq!(component.path.as_deref(), Some("3D/parts.model"));
    assert_eq!(component.transform, Transform::translation(0.0, 0.0, 10.0));

    let (part, obj) = doc
        .resolve(main.path(), component.objectid, component.path.as_deref())
        .unwrap();
    assert_eq!(part.path(), "3D/parts.model");
    assert_eq!(obj.id(), 5);

    let bytes = doc.to_bytes().unwrap();
    let again = read(bytes).unwrap();
    let component = &again.model_part("3D/3dmodel.model").unwrap().object(1).unwrap().components[0];
    assert_eq!(component.path.as_deref(), Some("3D/parts.model"));
}

#[test]
fn test_explicit_path_searches_only_that_part() {
    let main = model(&format!(
        r#"<resources>{}<object id="2"><components><component objectid="1" p:path="/3D/empty.model"/></components></object></resources>
<build/>"#,
        triangle_object(1)
    ));
    let empty = model("<resources/><build/>");
    let err = read(package_with_parts(&[
        ("3D/3dmodel.model", &main),
        ("3D/empty.model", &empty),
    ]))
    .unwrap_err();

    match err {
        Error::UnresolvedReference {
            path,
            objectid,
            context,
        } => {
            assert_eq!(path, "3D/3dmodel.model");
            assert_eq!(objectid, 1);
            assert_eq!(context, "component of object 2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dangling_build_item() {
    let main = model(&format!(
        r#"<resources>{}</resources><build><item objectid="9"/></build>"#,
        triangle_object(1)
    ));
    let err = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap_err();
    assert!(matches!(
        err,
        Error::UnresolvedReference { objectid: 9, .. }
    ));
    assert!(err.is_structural());
    assert!(err.to_string().contains("build item"));
}

#[test]
fn test_component_cycle_is_rejected() {
    let main = model(
        r#"<resources>
<object id="1"><components><component objectid="2"/></components></object>
<object id="2"><components><component objectid="1"/></components></object>
</resources><build><item objectid="1"/></build>"#,
    );
    let err = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap_err();
    assert!(matches!(err, Error::ComponentCycle { .. }));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let main = model(
        r#"<resources><object id="1"><components><component objectid="1"/></components></object></resources><build/>"#,
    );
    let err = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap_err();
    assert!(matches!(
        err,
        Error::ComponentCycle { objectid: 1, .. }
    ));
}

#[test]
fn test_shared_leaf_is_not_a_cycle() {
    let main = model(&format!(
        r#"<resources>{}
<object id="2"><components><component objectid="1"/><component objectid="1"/></components></object>
<object id="3"><components><component objectid="2"/><component objectid="1"/></components></object>
</resources><build><item objectid="3"/></build>"#,
        triangle_object(1)
    ));
    let doc = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap();
    assert_eq!(doc.model_parts()[0].objects().len(), 3);
}

#[test]
fn test_relationship_to_missing_part() {
    let rels = rels(&["/3D/3dmodel.model"]);
    let bytes = package(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", rels.as_bytes()),
    ]);
    let err = read(bytes).unwrap_err();
    match err {
        Error::MissingFile(name) => assert_eq!(name, "3D/3dmodel.model"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_relationships() {
    let bytes = package(&[("[Content_Types].xml", CONTENT_TYPES.as_bytes())]);
    let err = read(bytes).unwrap_err();
    assert!(matches!(err, Error::MissingFile(_)));
}

#[test]
fn test_not_a_zip() {
    let err = read(b"definitely not a zip archive".to_vec()).unwrap_err();
    assert!(matches!(err, Error::Zip(_)));
    assert!(!err.is_structural());
}

#[test]
fn test_percent_encoded_relationship_target() {
    let xml = model(&format!(
        r#"<resources>{}</resources><build><item objectid="1"/></build>"#,
        triangle_object(1)
    ));
    let rels = rels(&["/3D/my%20model.model"]);
    let bytes = package(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", rels.as_bytes()),
        ("3D/my model.model", xml.as_bytes()),
    ]);
    let doc = read(bytes).unwrap();
    assert_eq!(doc.model_parts()[0].path(), "3D/my model.model");
}

#[test]
fn test_strict_content_types() {
    let types = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
</Types>"#;
    let xml = model("<resources/><build/>");
    let rels = rels(&["/3D/3dmodel.model"]);
    let bytes = package(&[
        ("[Content_Types].xml", types.as_bytes()),
        ("_rels/.rels", rels.as_bytes()),
        ("3D/3dmodel.model", xml.as_bytes()),
    ]);

    // Lenient by default
    assert!(read(bytes.clone()).is_ok());

    let config = ParserConfig::new().with_strict_content_types(true);
    let err = Document::from_reader_with_config(Cursor::new(bytes), &config).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
}

#[test]
fn test_malformed_transform() {
    let main = model(&format!(
        r#"<resources>{}</resources><build><item objectid="1" transform="1 0 0 0 1 0 0 0 1 0 0"/></build>"#,
        triangle_object(1)
    ));
    let err = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap_err();
    assert!(matches!(err, Error::InvalidTransform(_)));
}

#[test]
fn test_writer_does_not_check_references() {
    let mut doc = Document::new();
    doc.default_model_part().build.add_item(42);
    let bytes = doc.to_bytes().unwrap();

    let err = read(bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::UnresolvedReference { objectid: 42, .. }
    ));
}

#[test]
fn test_object_id_past_resource_range() {
    let main = model(
        r#"<resources><object id="18446744073709551615"/></resources><build><item objectid="18446744073709551615"/></build>"#,
    );
    let err = read(package_with_parts(&[("3D/3dmodel.model", &main)])).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)));
}
