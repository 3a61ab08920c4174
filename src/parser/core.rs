//! Core 3MF element parsing
//!
//! Each function turns one start tag into its model type. Attribute maps are
//! keyed by local name, so `p:path` arrives as `path`.

use std::collections::HashMap;

use quick_xml::events::BytesStart;

use super::parse_attributes;
use crate::error::{Error, Result};
use crate::model::{
    BuildItem, Component, MetadataEntry, Object, ObjectKind, ObjectType, Transform, Triangle,
    Unit, Vertex,
};
use crate::opc::normalize_part_name;

fn parse_transform_attr(attrs: &HashMap<String, String>, element: &str) -> Result<Transform> {
    match attrs.get("transform") {
        Some(value) => value.parse::<Transform>().map_err(|e| match e {
            Error::InvalidTransform(msg) => {
                Error::InvalidTransform(format!("<{}>: {}", element, msg))
            }
            other => other,
        }),
        None => Ok(Transform::identity()),
    }
}

/// Largest id a 3MF resource may carry (`ST_ResourceID` is below 2^31)
const MAX_RESOURCE_ID: usize = i32::MAX as usize;

fn parse_id(attrs: &HashMap<String, String>, element: &str, attr: &str) -> Result<usize> {
    let value = attrs
        .get(attr)
        .ok_or_else(|| Error::missing_attribute(element, attr))?;
    match value.trim().parse::<usize>() {
        Ok(id) if (1..=MAX_RESOURCE_ID).contains(&id) => Ok(id),
        _ => Err(Error::parse_error_with_context(
            &format!("{}.{}", element, attr),
            value,
            "object id between 1 and 2147483647",
        )),
    }
}

/// Parse the `unit` attribute of the `model` element
pub(super) fn parse_model_unit(e: &BytesStart) -> Result<Unit> {
    let attrs = parse_attributes(e)?;
    match attrs.get("unit") {
        Some(unit) => unit.parse(),
        None => Ok(Unit::default()),
    }
}

/// Parse object element attributes
///
/// The object starts as a reference object; a following `mesh` element
/// turns it into a mesh object.
pub(super) fn parse_object(e: &BytesStart) -> Result<Object> {
    let attrs = parse_attributes(e)?;
    let id = parse_id(&attrs, "object", "id")?;

    let mut object = Object::new(id, ObjectKind::Reference);
    object.name = attrs.get("name").cloned();
    if let Some(type_str) = attrs.get("type") {
        object.object_type = type_str.parse::<ObjectType>()?;
    }

    Ok(object)
}

/// Parse vertex element attributes
pub(super) fn parse_vertex(e: &BytesStart) -> Result<Vertex> {
    let mut x_opt: Option<f64> = None;
    let mut y_opt: Option<f64> = None;
    let mut z_opt: Option<f64> = None;

    let parse_f64 = |value: &[u8]| -> Result<f64> {
        let value_str = std::str::from_utf8(value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        Ok(value_str.trim().parse::<f64>()?)
    };

    for attr_result in e.attributes() {
        let attr = attr_result?;
        match attr.key.local_name().as_ref() {
            b"x" => x_opt = Some(parse_f64(&attr.value)?),
            b"y" => y_opt = Some(parse_f64(&attr.value)?),
            b"z" => z_opt = Some(parse_f64(&attr.value)?),
            _ => {}
        }
    }

    let x = x_opt.ok_or_else(|| Error::missing_attribute("vertex", "x"))?;
    let y = y_opt.ok_or_else(|| Error::missing_attribute("vertex", "y"))?;
    let z = z_opt.ok_or_else(|| Error::missing_attribute("vertex", "z"))?;

    if let Some((axis, value)) = [("x", x), ("y", y), ("z", z)]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(Error::InvalidXml(format!(
            "Vertex {} coordinate must be finite (got {})",
            axis, value
        )));
    }

    Ok(Vertex::new(x, y, z))
}

/// Parse triangle element attributes
pub(super) fn parse_triangle(e: &BytesStart) -> Result<Triangle> {
    let mut v1_opt: Option<usize> = None;
    let mut v2_opt: Option<usize> = None;
    let mut v3_opt: Option<usize> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let slot = match attr.key.local_name().as_ref() {
            b"v1" => &mut v1_opt,
            b"v2" => &mut v2_opt,
            b"v3" => &mut v3_opt,
            _ => continue,
        };
        let value_str =
            std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        *slot = Some(value_str.trim().parse::<usize>()?);
    }

    let v1 = v1_opt.ok_or_else(|| Error::missing_attribute("triangle", "v1"))?;
    let v2 = v2_opt.ok_or_else(|| Error::missing_attribute("triangle", "v2"))?;
    let v3 = v3_opt.ok_or_else(|| Error::missing_attribute("triangle", "v3"))?;

    Ok(Triangle::new(v1, v2, v3))
}

/// Parse component element attributes
pub(super) fn parse_component(e: &BytesStart) -> Result<Component> {
    let attrs = parse_attributes(e)?;
    let objectid = parse_id(&attrs, "component", "objectid")?;

    let transform = parse_transform_attr(&attrs, "component")?;
    let mut component = Component::with_transform(objectid, transform);
    component.path = attrs.get("path").map(|p| normalize_part_name(p));
    Ok(component)
}

/// Parse build item element attributes
pub(super) fn parse_build_item(e: &BytesStart) -> Result<BuildItem> {
    let attrs = parse_attributes(e)?;
    let objectid = parse_id(&attrs, "item", "objectid")?;
    Ok(BuildItem::with_transform(
        objectid,
        parse_transform_attr(&attrs, "item")?,
    ))
}

/// Parse a metadata start tag; the value arrives later as text
pub(super) fn parse_metadata(e: &BytesStart) -> Result<MetadataEntry> {
    let attrs = parse_attributes(e)?;
    let name = attrs
        .get("name")
        .ok_or_else(|| Error::missing_attribute("metadata", "name"))?;

    let mut entry = MetadataEntry::new(name.as_str(), String::new());
    if let Some(preserve) = attrs.get("preserve") {
        entry.preserve = match preserve.as_str() {
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                return Err(Error::parse_error_with_context(
                    "metadata.preserve",
                    other,
                    "boolean",
                ));
            }
        };
    }
    if let Some(value_type) = attrs.get("type") {
        entry.value_type = value_type.clone();
    }
    Ok(entry)
}
