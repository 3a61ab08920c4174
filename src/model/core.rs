//! Core entity graph: document, model parts, objects, components and build items

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::{Mesh, Transform};
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::opc::{MODEL_PATH, normalize_part_name};

/// Prefix used for Cura-specific metadata names
pub const CURA_METADATA_PREFIX: &str = "cura:";

/// Unit of measurement for a model part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Micrometers
    Micron,
    /// Millimeters (the 3MF default)
    #[default]
    Millimeter,
    /// Centimeters
    Centimeter,
    /// Inches
    Inch,
    /// Feet
    Foot,
    /// Meters
    Meter,
}

impl Unit {
    /// The attribute value used in model XML
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Micron => "micron",
            Unit::Millimeter => "millimeter",
            Unit::Centimeter => "centimeter",
            Unit::Inch => "inch",
            Unit::Foot => "foot",
            Unit::Meter => "meter",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "micron" => Ok(Unit::Micron),
            "millimeter" => Ok(Unit::Millimeter),
            "centimeter" => Ok(Unit::Centimeter),
            "inch" => Ok(Unit::Inch),
            "foot" => Ok(Unit::Foot),
            "meter" => Ok(Unit::Meter),
            _ => Err(Error::InvalidXml(format!(
                "Invalid unit '{}'. Must be one of: micron, millimeter, centimeter, inch, foot, meter",
                s
            ))),
        }
    }
}

/// Type tag of a 3D object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A standard model object
    #[default]
    Model,
    /// A support structure
    Support,
    /// A solid support structure
    SolidSupport,
    /// A surface object
    Surface,
    /// Other types
    Other,
}

impl ObjectType {
    /// The attribute value used in model XML
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Model => "model",
            ObjectType::Support => "support",
            ObjectType::SolidSupport => "solidsupport",
            ObjectType::Surface => "surface",
            ObjectType::Other => "other",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "model" => Ok(ObjectType::Model),
            "support" => Ok(ObjectType::Support),
            "solidsupport" => Ok(ObjectType::SolidSupport),
            "surface" => Ok(ObjectType::Surface),
            "other" => Ok(ObjectType::Other),
            _ => Err(Error::InvalidXml(format!(
                "Invalid object type '{}'. Must be one of: model, support, solidsupport, surface, other",
                s
            ))),
        }
    }
}

/// Metadata entry attached to an object or model part
///
/// Values are always text. A number stored with [`Metadata::set`] comes back
/// from a read as its decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    /// Name of the metadata entry
    pub name: String,
    /// Value of the metadata entry
    pub value: String,
    /// Preservation flag, written as `preserve="true"`
    pub preserve: bool,
    /// Declared value type, `xs:string` unless a reader saw something else
    pub value_type: String,
}

impl MetadataEntry {
    /// Default value type for metadata written by this crate
    pub const DEFAULT_TYPE: &'static str = "xs:string";

    /// Create a new metadata entry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            preserve: true,
            value_type: Self::DEFAULT_TYPE.to_string(),
        }
    }
}

/// Unique-key metadata mapping that keeps insertion order for output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to the text form of `value`, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.insert(MetadataEntry::new(name, value.to_string()));
    }

    /// Insert a full entry, replacing any entry with the same name in place
    pub fn insert(&mut self, entry: MetadataEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Value stored under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|e| e.value.as_str())
    }

    /// Full entry stored under `name`
    pub fn entry(&self, name: &str) -> Option<&MetadataEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether an entry named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A component that references another object with a transformation
///
/// The reference is a plain id. It is resolved through the owning
/// [`Document`], never held as a pointer, so objects can refer to each
/// other without ownership cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// ID of the referenced object
    pub objectid: usize,
    /// Placement of the referenced object inside its parent
    pub transform: Transform,
    /// Model part holding the referenced object (written as `p:path`)
    ///
    /// `None` means the part holding the component, falling back to any
    /// other part that defines the id.
    pub path: Option<String>,
}

impl Component {
    /// Create a new component with an identity transform
    pub fn new(objectid: usize) -> Self {
        Self::with_transform(objectid, Transform::identity())
    }

    /// Create a new component with a transformation matrix
    pub fn with_transform(objectid: usize, transform: Transform) -> Self {
        Self {
            objectid,
            transform,
            path: None,
        }
    }
}

/// What an object is made of
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Object with its own triangle mesh
    Mesh(Mesh),
    /// Object defined only by its components
    Reference,
}

/// A 3D object inside a model part
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    id: usize,
    /// Type of object
    pub object_type: ObjectType,
    /// Object name (optional)
    pub name: Option<String>,
    /// Geometry carried by the object
    pub kind: ObjectKind,
    /// Components that reference other objects
    pub components: Vec<Component>,
    /// Metadata written to the object's `metadatagroup`
    pub metadata: Metadata,
}

impl Object {
    pub(crate) fn new(id: usize, kind: ObjectKind) -> Self {
        Self {
            id,
            object_type: ObjectType::Model,
            name: None,
            kind,
            components: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Part-local object id
    pub fn id(&self) -> usize {
        self.id
    }

    /// The mesh, for mesh objects
    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            ObjectKind::Reference => None,
        }
    }

    /// Mutable access to the mesh, for mesh objects
    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            ObjectKind::Reference => None,
        }
    }

    /// Append a component referencing `objectid`
    ///
    /// No cycle check happens here. [`Document::check_references`] reports
    /// cycles, and the reader rejects them.
    pub fn add_component(&mut self, objectid: usize, transform: Transform) -> &mut Component {
        let idx = self.components.len();
        self.components
            .push(Component::with_transform(objectid, transform));
        &mut self.components[idx]
    }

    /// Set metadata `name` to the text form of `value`
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.metadata.set(name, value);
    }

    /// Set metadata under the `cura:` prefix, adding it if missing
    pub fn set_cura_metadata(&mut self, name: &str, value: impl fmt::Display) {
        if name.starts_with(CURA_METADATA_PREFIX) {
            self.metadata.set(name, value);
        } else {
            self.metadata
                .set(format!("{}{}", CURA_METADATA_PREFIX, name), value);
        }
    }

    /// Metadata value stored under `name`
    pub fn get_metadata(&self, name: &str) -> Option<&str> {
        self.metadata.get(name)
    }

    /// Whether metadata `name` is set
    pub fn has_metadata(&self, name: &str) -> bool {
        self.metadata.contains(name)
    }
}

/// An item to be built, referencing an object
#[derive(Debug, Clone, PartialEq)]
pub struct BuildItem {
    /// Reference to object ID
    pub objectid: usize,
    /// Placement on the build platform
    pub transform: Transform,
}

impl BuildItem {
    /// Create a new build item with an identity transform
    pub fn new(objectid: usize) -> Self {
        Self::with_transform(objectid, Transform::identity())
    }

    /// Create a new build item with a transform
    pub fn with_transform(objectid: usize, transform: Transform) -> Self {
        Self {
            objectid,
            transform,
        }
    }
}

/// Build section specifying which objects to manufacture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Build {
    /// List of items to build
    pub items: Vec<BuildItem>,
}

impl Build {
    /// Create a new empty build section
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item with an identity transform
    pub fn add_item(&mut self, objectid: usize) {
        self.items.push(BuildItem::new(objectid));
    }

    /// Append an item placed by `transform`
    pub fn add_item_with_transform(&mut self, objectid: usize, transform: Transform) {
        self.items.push(BuildItem::with_transform(objectid, transform));
    }
}

/// One model XML document inside the package
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    path: String,
    /// Unit of measurement
    pub unit: Unit,
    /// Model-level metadata
    pub metadata: Metadata,
    objects: Vec<Object>,
    // object id -> position in `objects`
    index: HashMap<usize, usize>,
    /// Build specification
    pub build: Build,
    next_object_id: usize,
}

impl ModelPart {
    /// Create an empty part stored at `path`
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_part_name(path),
            unit: Unit::default(),
            metadata: Metadata::new(),
            objects: Vec::new(),
            index: HashMap::new(),
            build: Build::new(),
            next_object_id: 1,
        }
    }

    /// Package path of this part, without a leading `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The id the next created object will get
    pub fn next_object_id(&self) -> usize {
        self.next_object_id
    }

    fn push_new(&mut self, kind: ObjectKind) -> &mut Object {
        let id = self.next_object_id;
        self.next_object_id += 1;
        let idx = self.objects.len();
        self.objects.push(Object::new(id, kind));
        self.index.insert(id, idx);
        &mut self.objects[idx]
    }

    /// Wrap `mesh` in a new object with the next free id
    pub fn new_object_from_mesh(&mut self, mesh: Mesh) -> &mut Object {
        self.push_new(ObjectKind::Mesh(mesh))
    }

    /// Create a mesh-less object to be filled with components
    pub fn new_reference_object(&mut self) -> &mut Object {
        self.push_new(ObjectKind::Reference)
    }

    /// Create a mesh object from a flat triangle-soup buffer
    ///
    /// See [`Mesh::from_points`].
    pub fn new_object_from_points(&mut self, points: &[f64]) -> Result<&mut Object> {
        let mesh = Mesh::from_points(points)?;
        Ok(self.new_object_from_mesh(mesh))
    }

    /// Create a mesh object from an STL file
    pub fn new_object_from_stl_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Object> {
        let mesh = Mesh::from_stl_file(path)?;
        Ok(self.new_object_from_mesh(mesh))
    }

    /// Add an object that already carries an id (used while reading)
    pub(crate) fn insert_object(&mut self, object: Object) -> Result<()> {
        if self.object(object.id).is_some() {
            return Err(Error::InvalidModel(format!(
                "Duplicate object id {} in '{}'",
                object.id, self.path
            )));
        }
        let next = object.id.checked_add(1).ok_or_else(|| {
            Error::InvalidModel(format!(
                "Object id {} in '{}' is out of range",
                object.id, self.path
            ))
        })?;
        self.next_object_id = self.next_object_id.max(next);
        self.index.insert(object.id, self.objects.len());
        self.objects.push(object);
        Ok(())
    }

    /// Objects in creation order
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Mutable iteration over objects; ids stay fixed
    pub fn objects_mut(&mut self) -> std::slice::IterMut<'_, Object> {
        self.objects.iter_mut()
    }

    /// Object with the given id
    pub fn object(&self, id: usize) -> Option<&Object> {
        self.index.get(&id).map(|&idx| &self.objects[idx])
    }

    /// Mutable object with the given id
    pub fn object_mut(&mut self, id: usize) -> Option<&mut Object> {
        let idx = *self.index.get(&id)?;
        Some(&mut self.objects[idx])
    }
}

/// A complete 3MF document: model parts plus extension data
#[derive(Debug, Default)]
pub struct Document {
    parts: Vec<ModelPart>,
    extensions: Vec<Box<dyn Extension>>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the part at `path`, creating it if it does not exist yet
    pub fn create_model_part(&mut self, path: &str) -> &mut ModelPart {
        let path = normalize_part_name(path);
        let idx = match self.parts.iter().position(|p| p.path == path) {
            Some(idx) => idx,
            None => {
                self.parts.push(ModelPart::new(&path));
                self.parts.len() - 1
            }
        };
        &mut self.parts[idx]
    }

    /// Get or create the part at the standard `3D/3dmodel.model` path
    pub fn default_model_part(&mut self) -> &mut ModelPart {
        self.create_model_part(MODEL_PATH)
    }

    /// Part stored at `path`, if any
    pub fn model_part(&self, path: &str) -> Option<&ModelPart> {
        let path = normalize_part_name(path);
        self.parts.iter().find(|p| p.path == path)
    }

    /// Mutable part stored at `path`, if any
    pub fn model_part_mut(&mut self, path: &str) -> Option<&mut ModelPart> {
        let path = normalize_part_name(path);
        self.parts.iter_mut().find(|p| p.path == path)
    }

    /// All parts in creation order
    pub fn model_parts(&self) -> &[ModelPart] {
        &self.parts
    }

    pub(crate) fn push_model_part(&mut self, part: ModelPart) {
        self.parts.push(part);
    }

    /// First object with `id`, searching parts in order
    pub fn find_object(&self, id: usize) -> Option<(&ModelPart, &Object)> {
        self.parts
            .iter()
            .find_map(|part| part.object(id).map(|obj| (part, obj)))
    }

    /// Resolve a reference made from the part at `from`
    ///
    /// With an explicit `path` only that part is searched. Otherwise the
    /// referencing part wins, then the remaining parts in order.
    pub fn resolve(
        &self,
        from: &str,
        objectid: usize,
        path: Option<&str>,
    ) -> Option<(&ModelPart, &Object)> {
        if let Some(path) = path {
            let part = self.model_part(path)?;
            return part.object(objectid).map(|obj| (part, obj));
        }

        self.model_part(from)
            .and_then(|part| part.object(objectid).map(|obj| (part, obj)))
            .or_else(|| self.find_object(objectid))
    }

    /// Verify every build item and component resolves and no component cycles exist
    pub fn check_references(&self) -> Result<()> {
        for part in &self.parts {
            for item in &part.build.items {
                if self.resolve(&part.path, item.objectid, None).is_none() {
                    return Err(Error::UnresolvedReference {
                        path: part.path.clone(),
                        objectid: item.objectid,
                        context: "build item".to_string(),
                    });
                }
            }

            for object in &part.objects {
                for component in &object.components {
                    if self
                        .resolve(&part.path, component.objectid, component.path.as_deref())
                        .is_none()
                    {
                        return Err(Error::UnresolvedReference {
                            path: part.path.clone(),
                            objectid: component.objectid,
                            context: format!("component of object {}", object.id),
                        });
                    }
                }
            }
        }

        let mut done = HashSet::new();
        let mut visiting = HashSet::new();
        for part in &self.parts {
            for object in &part.objects {
                self.check_cycle(part, object, &mut visiting, &mut done)?;
            }
        }

        Ok(())
    }

    fn check_cycle<'a>(
        &'a self,
        part: &'a ModelPart,
        object: &'a Object,
        visiting: &mut HashSet<(&'a str, usize)>,
        done: &mut HashSet<(&'a str, usize)>,
    ) -> Result<()> {
        let key = (part.path.as_str(), object.id);
        if done.contains(&key) {
            return Ok(());
        }
        if visiting.contains(&key) {
            return Err(Error::ComponentCycle {
                path: part.path.clone(),
                objectid: object.id,
            });
        }

        visiting.insert(key);
        for component in &object.components {
            if let Some((child_part, child)) =
                self.resolve(&part.path, component.objectid, component.path.as_deref())
            {
                self.check_cycle(child_part, child, visiting, done)?;
            }
        }
        visiting.remove(&key);
        done.insert(key);
        Ok(())
    }

    /// Attach an extension to be written with the document
    pub fn add_extension<E: Extension + 'static>(&mut self, extension: E) {
        self.extensions.push(Box::new(extension));
    }

    /// Attach an already boxed extension
    pub fn push_extension(&mut self, extension: Box<dyn Extension>) {
        self.extensions.push(extension);
    }

    /// Extensions in attachment (or registration) order
    pub fn extensions(&self) -> &[Box<dyn Extension>] {
        &self.extensions
    }

    /// Mutable access to the extension list
    pub fn extensions_mut(&mut self) -> &mut Vec<Box<dyn Extension>> {
        &mut self.extensions
    }

    /// First extension of concrete type `E`
    pub fn extension<E: Extension + 'static>(&self) -> Option<&E> {
        self.extensions
            .iter()
            .find_map(|ext| (**ext).as_any().downcast_ref::<E>())
    }

    /// First extension of concrete type `E`, mutably
    pub fn extension_mut<E: Extension + 'static>(&mut self) -> Option<&mut E> {
        self.extensions
            .iter_mut()
            .find_map(|ext| (**ext).as_any_mut().downcast_mut::<E>())
    }

    /// First extension whose name is `name`
    pub fn extension_by_name(&self, name: &str) -> Option<&dyn Extension> {
        self.extensions
            .iter()
            .find(|ext| ext.name() == name)
            .map(|ext| ext.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Triangle, Vertex};

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(0.0, 1.0, 0.0));
        mesh.triangles.push(Triangle::new(0, 1, 2));
        mesh
    }

    #[test]
    fn test_default_model_part_is_idempotent() {
        let mut doc = Document::new();
        doc.default_model_part().unit = Unit::Inch;
        doc.default_model_part();
        doc.create_model_part("/3D/3dmodel.model");

        assert_eq!(doc.model_parts().len(), 1);
        assert_eq!(doc.model_parts()[0].path(), "3D/3dmodel.model");
        assert_eq!(doc.model_parts()[0].unit, Unit::Inch);
    }

    #[test]
    fn test_read_only_accessors_do_not_create() {
        let doc = Document::new();
        assert!(doc.model_part(MODEL_PATH).is_none());
        assert!(doc.model_parts().is_empty());
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut part = ModelPart::new(MODEL_PATH);
        let ids: Vec<usize> = (0..5)
            .map(|_| part.new_object_from_mesh(triangle_mesh()).id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(part.next_object_id(), 6);
    }

    #[test]
    fn test_insert_object_bumps_counter_and_rejects_duplicates() {
        let mut part = ModelPart::new(MODEL_PATH);
        part.insert_object(Object::new(7, ObjectKind::Reference))
            .unwrap();
        assert_eq!(part.next_object_id(), 8);
        assert_eq!(part.new_reference_object().id(), 8);

        let err = part
            .insert_object(Object::new(7, ObjectKind::Reference))
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate object id 7"));
    }

    #[test]
    fn test_insert_object_with_max_id_is_an_error() {
        let mut part = ModelPart::new(MODEL_PATH);
        let err = part
            .insert_object(Object::new(usize::MAX, ObjectKind::Reference))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
        assert!(part.objects().is_empty());
        assert_eq!(part.next_object_id(), 1);
    }

    #[test]
    fn test_lookup_by_id_after_mixed_inserts() {
        let mut part = ModelPart::new(MODEL_PATH);
        part.insert_object(Object::new(40, ObjectKind::Reference))
            .unwrap();
        let created = part.new_object_from_mesh(triangle_mesh()).id();
        part.insert_object(Object::new(3, ObjectKind::Reference))
            .unwrap();

        assert_eq!(created, 41);
        assert_eq!(part.object(40).unwrap().id(), 40);
        assert!(part.object(41).unwrap().mesh().is_some());
        assert_eq!(part.object(3).unwrap().id(), 3);
        assert!(part.object(2).is_none());
        part.object_mut(3).unwrap().name = Some("three".to_string());
        assert_eq!(part.objects()[2].name.as_deref(), Some("three"));
    }

    #[test]
    fn test_metadata_set_replaces_and_coerces_to_text() {
        let mut part = ModelPart::new(MODEL_PATH);
        let obj = part.new_object_from_mesh(triangle_mesh());
        obj.set_cura_metadata("infill_pattern", "grid");
        obj.set_cura_metadata("infill_sparse_density", 50);
        obj.set_cura_metadata("cura:infill_sparse_density", 60);
        obj.set_metadata("plain", 1.5);

        assert_eq!(obj.get_metadata("cura:infill_pattern"), Some("grid"));
        assert_eq!(obj.get_metadata("cura:infill_sparse_density"), Some("60"));
        assert_eq!(obj.get_metadata("plain"), Some("1.5"));
        assert!(!obj.has_metadata("infill_pattern"));
        assert_eq!(obj.metadata.len(), 3);
    }

    #[test]
    fn test_check_references_detects_dangling_build_item() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        part.new_object_from_mesh(triangle_mesh());
        part.build.add_item(42);

        let err = doc.check_references().unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedReference { objectid: 42, .. }
        ));
    }

    #[test]
    fn test_check_references_detects_cycle() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        let a = part.new_reference_object().id();
        let b = part.new_reference_object().id();
        part.object_mut(a)
            .unwrap()
            .add_component(b, Transform::identity());
        part.object_mut(b)
            .unwrap()
            .add_component(a, Transform::identity());

        let err = doc.check_references().unwrap_err();
        assert!(matches!(err, Error::ComponentCycle { .. }));
    }

    #[test]
    fn test_shared_child_is_not_a_cycle() {
        let mut doc = Document::new();
        let part = doc.default_model_part();
        let leaf = part.new_object_from_mesh(triangle_mesh()).id();
        let mid = part.new_reference_object().id();
        let top = part.new_reference_object().id();
        part.object_mut(mid)
            .unwrap()
            .add_component(leaf, Transform::identity());
        let top_obj = part.object_mut(top).unwrap();
        top_obj.add_component(leaf, Transform::translation(1.0, 0.0, 0.0));
        top_obj.add_component(mid, Transform::identity());
        part.build.add_item(top);

        assert!(doc.check_references().is_ok());
    }

    #[test]
    fn test_resolve_prefers_local_part_then_explicit_path() {
        let mut doc = Document::new();
        doc.create_model_part("3D/other.model")
            .new_object_from_mesh(triangle_mesh());
        let main = doc.default_model_part();
        main.new_reference_object().name = Some("local".to_string());

        let (part, obj) = doc.resolve(MODEL_PATH, 1, None).unwrap();
        assert_eq!(part.path(), MODEL_PATH);
        assert_eq!(obj.name.as_deref(), Some("local"));

        let (part, _) = doc.resolve(MODEL_PATH, 1, Some("/3D/other.model")).unwrap();
        assert_eq!(part.path(), "3D/other.model");
        assert!(doc.resolve(MODEL_PATH, 2, Some("3D/other.model")).is_none());
    }

    #[test]
    fn test_cross_part_fallback() {
        let mut doc = Document::new();
        let shared = doc
            .create_model_part("3D/shared.model")
            .new_object_from_mesh(triangle_mesh())
            .id();
        doc.default_model_part().build.add_item(shared);
        assert!(doc.check_references().is_ok());
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!("inch".parse::<Unit>().unwrap(), Unit::Inch);
        assert!("furlong".parse::<Unit>().is_err());
        assert_eq!(Unit::default().to_string(), "millimeter");
    }
}
