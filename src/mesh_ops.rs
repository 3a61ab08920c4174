//! Geometric operations on meshes and placed objects
//!
//! Bounding boxes are computed in `f64` directly from vertex data. Build
//! volumes follow build items through their component trees, placing each
//! child's box by the component transform.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::model::{Document, Mesh, ModelPart, Object, Transform, Vertex};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for no points
    pub fn from_points<I: IntoIterator<Item = Point3<f64>>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bbox.min = bbox.min.inf(&p);
            bbox.max = bbox.max.sup(&p);
        }
        Some(bbox)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// The 8 corners
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// The box of this box's corners after `transform`
    pub fn transformed(&self, transform: &Transform) -> BoundingBox {
        let corners = self.corners().map(|c| transform.transform_point(&c));
        // 8 corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }
}

/// Compute the signed volume of a mesh using the divergence theorem
///
/// Positive for a closed mesh with outward (counter-clockwise) winding.
/// Triangles with out-of-range indices are skipped.
pub fn compute_mesh_signed_volume(mesh: &Mesh) -> f64 {
    let n = mesh.vertices.len();
    let mut volume = 0.0_f64;
    for triangle in &mesh.triangles {
        if triangle.indices().iter().any(|&i| i >= n) {
            continue;
        }
        let v1 = mesh.vertices[triangle.v1].to_point().coords;
        let v2 = mesh.vertices[triangle.v2].to_point().coords;
        let v3 = mesh.vertices[triangle.v3].to_point().coords;
        volume += v1.dot(&v2.cross(&v3));
    }
    volume / 6.0
}

/// Compute the axis-aligned bounding box of a mesh's vertices
pub fn compute_mesh_aabb(mesh: &Mesh) -> Option<BoundingBox> {
    BoundingBox::from_points(mesh.vertices.iter().map(Vertex::to_point))
}

/// Bounding box of a mesh placed by `transform`
///
/// Transforms the 8 corners of the untransformed box, so the result may be
/// larger than the tight box of the transformed vertices under rotation.
pub fn compute_transformed_aabb(mesh: &Mesh, transform: &Transform) -> Option<BoundingBox> {
    let bbox = compute_mesh_aabb(mesh)?;
    if transform.is_identity() {
        return Some(bbox);
    }
    Some(bbox.transformed(transform))
}

/// Unit normal of a triangle, or zero for a degenerate one
pub fn calculate_face_normal(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> Vector3<f64> {
    let edge1 = v1.to_point() - v0.to_point();
    let edge2 = v2.to_point() - v0.to_point();
    edge1
        .cross(&edge2)
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::zeros)
}

/// Bounding box of everything the document's build lists place
///
/// Each object's box is computed once in its own coordinates, with
/// component boxes placed by their corners, and then reused for every
/// reference to it. Unresolved references and cyclic branches are skipped.
/// Returns `None` when nothing with vertices is placed.
pub fn compute_build_volume(document: &Document) -> Option<BoundingBox> {
    let mut local = HashMap::new();
    let mut result: Option<BoundingBox> = None;
    for part in document.model_parts() {
        for item in &part.build.items {
            let Some((owner, object)) = document.resolve(part.path(), item.objectid, None) else {
                continue;
            };
            if let Some(bbox) = local_bounds(document, owner, object, &mut local) {
                result = union(result, bbox.transformed(&item.transform));
            }
        }
    }
    result
}

// `None` in the cache marks an object whose box is still being computed
// (a cycle when reached again) or that places no vertices.
type BoundsCache<'a> = HashMap<(&'a str, usize), Option<BoundingBox>>;

fn local_bounds<'a>(
    document: &'a Document,
    part: &'a ModelPart,
    object: &'a Object,
    cache: &mut BoundsCache<'a>,
) -> Option<BoundingBox> {
    let key = (part.path(), object.id());
    if let Some(cached) = cache.get(&key) {
        return *cached;
    }
    cache.insert(key, None);

    let mut bounds = object.mesh().and_then(compute_mesh_aabb);
    for component in &object.components {
        let Some((child_part, child)) =
            document.resolve(part.path(), component.objectid, component.path.as_deref())
        else {
            continue;
        };
        if let Some(child_box) = local_bounds(document, child_part, child, cache) {
            bounds = union(bounds, child_box.transformed(&component.transform));
        }
    }

    cache.insert(key, bounds);
    bounds
}

fn union(current: Option<BoundingBox>, bbox: BoundingBox) -> Option<BoundingBox> {
    Some(match current {
        Some(current) => current.union(&bbox),
        None => bbox,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn unit_cube() -> Mesh {
        let p = |x: f64, y: f64, z: f64| [x, y, z];
        let (a, b, c, d) = (p(0., 0., 0.), p(1., 0., 0.), p(1., 1., 0.), p(0., 1., 0.));
        let (e, f, g, h) = (p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.));
        let faces = [
            [a, c, b], [a, d, c],
            [e, f, g], [e, g, h],
            [a, b, f], [a, f, e],
            [b, c, g], [b, g, f],
            [c, d, h], [c, h, g],
            [d, a, e], [d, e, h],
        ];
        let points: Vec<f64> = faces.iter().flatten().flatten().copied().collect();
        Mesh::from_points(&points).unwrap()
    }

    #[test]
    fn test_cube_volume_and_bounds() {
        let cube = unit_cube();
        assert_eq!(cube.triangles.len(), 12);
        assert!((compute_mesh_signed_volume(&cube) - 1.0).abs() < 1e-12);

        let bbox = compute_mesh_aabb(&cube).unwrap();
        assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(bbox.center(), Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(compute_mesh_aabb(&Mesh::new()).is_none());
        assert_eq!(compute_mesh_signed_volume(&Mesh::new()), 0.0);
    }

    #[test]
    fn test_transformed_aabb() {
        let cube = unit_cube();
        let t = Transform::translation(10.0, 0.0, 0.0) * Transform::scale(2.0, 1.0, 1.0);
        let bbox = compute_transformed_aabb(&cube, &t).unwrap();
        assert_eq!(bbox.min, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(12.0, 1.0, 1.0));
        assert_eq!(bbox.size(), Vector3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_face_normal() {
        let n = calculate_face_normal(
            &Vertex::new(0.0, 0.0, 0.0),
            &Vertex::new(1.0, 0.0, 0.0),
            &Vertex::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));

        let degenerate = calculate_face_normal(
            &Vertex::new(0.0, 0.0, 0.0),
            &Vertex::new(1.0, 0.0, 0.0),
            &Vertex::new(2.0, 0.0, 0.0),
        );
        assert_eq!(degenerate, Vector3::zeros());
    }

    #[test]
    fn test_build_volume_follows_components() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        let leaf = part.new_object_from_mesh(unit_cube()).id();
        let assembly = part.new_reference_object();
        assembly.add_component(leaf, Transform::identity());
        assembly.add_component(leaf, Transform::translation(0.0, 0.0, 5.0));
        let assembly = assembly.id();
        part.build
            .add_item_with_transform(assembly, Transform::translation(1.0, 0.0, 0.0));

        let bbox = compute_build_volume(&doc).unwrap();
        assert_eq!(bbox.min, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(2.0, 1.0, 6.0));
    }

    #[test]
    fn test_build_volume_skips_cycles() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        let cube = part.new_object_from_mesh(unit_cube()).id();
        let a = part.new_reference_object().id();
        part.object_mut(a).unwrap().add_component(a, Transform::identity());
        part.object_mut(a).unwrap().add_component(cube, Transform::identity());
        part.build.add_item(a);

        let bbox = compute_build_volume(&doc).unwrap();
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_build_volume_deep_shared_chain() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        let mut below = part.new_object_from_mesh(unit_cube()).id();
        for _ in 0..64 {
            let obj = part.new_reference_object();
            obj.add_component(below, Transform::identity());
            obj.add_component(below, Transform::translation(1.0, 0.0, 0.0));
            below = obj.id();
        }
        part.build.add_item(below);

        let bbox = compute_build_volume(&doc).unwrap();
        assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(65.0, 1.0, 1.0));
    }

    #[test]
    fn test_build_volume_empty_document() {
        assert!(compute_build_volume(&Document::new()).is_none());
    }
}
