//! Data structures representing 3MF documents

mod core;
mod mesh;
mod transform;

pub use core::{
    Build, BuildItem, CURA_METADATA_PREFIX, Component, Document, Metadata, MetadataEntry,
    ModelPart, Object, ObjectKind, ObjectType, Unit,
};
pub use mesh::{Mesh, POINTS_PER_TRIANGLE, Triangle, Vertex};
pub use transform::{TRANSFORM_MATRIX_SIZE, Transform};
