//! OPC (Open Packaging Conventions) handling for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard. Besides the model
//! parts they carry two descriptors: `[Content_Types].xml`, mapping part names
//! to MIME types, and `_rels/.rels`, listing the package's model parts.

mod content_types;
mod reader;
mod relationships;
mod writer;

pub use content_types::ContentTypes;
pub use reader::Package;
pub use relationships::{Relationship, normalize_target, parse_relationships};
pub use writer::PackageWriter;

pub(crate) use content_types::write_content_types;
pub(crate) use relationships::write_relationships;

/// Main 3D model file path within the 3MF archive
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Content type of a model part
pub const MODEL_CONTENT_TYPE: &str = "application/vnd.ms-package.3dmanufacturing-3dmodel+xml";

/// Content type of a relationships part
pub const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Namespace of `[Content_Types].xml`
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Namespace of relationships parts
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Normalize a part name to its archive entry form by removing a leading slash
pub fn normalize_part_name(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}
