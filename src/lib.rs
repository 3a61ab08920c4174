//! # threemf
//!
//! Read and write 3MF (3D Manufacturing Format) packages.
//!
//! A 3MF file is a ZIP container following the Open Packaging Conventions
//! (OPC). It holds one or more XML model parts plus arbitrary vendor
//! directories. This crate maps a package onto a [`Document`]:
//!
//! - model parts with their objects, components, build items and metadata;
//! - extensions holding vendor directories (such as Cura's `Cura/`), which
//!   are carried through unchanged unless an extension type interprets them.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Multi-part documents with cross-part component references
//! - Exact round trip of transforms in the 3MF matrix convention
//! - Mesh import from triangle-soup buffers and STL files
//! - Registry-driven extension loading with a post-read hook
//!
//! ## Example
//!
//! ```
//! use threemf::{CuraExtension, Document, Mesh, ParserConfig, Transform};
//!
//! # fn main() -> threemf::Result<()> {
//! let mut doc = Document::new();
//! let part = doc.default_model_part();
//! let mesh = Mesh::from_points(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])?;
//! let object = part.new_object_from_mesh(mesh);
//! object.set_cura_metadata("infill_sparse_density", 20);
//! let id = object.id();
//! part.build.add_item_with_transform(id, Transform::translation(10.0, 10.0, 0.0));
//!
//! let bytes = doc.to_bytes()?;
//!
//! let config = ParserConfig::new().with_extension::<CuraExtension>();
//! let read = Document::from_reader_with_config(std::io::Cursor::new(bytes), &config)?;
//! assert_eq!(read.model_parts().len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extension;
pub mod extensions;
pub mod mesh_ops;
pub mod model;
pub mod opc;
mod parser;
mod writer;

pub use config::{ParserConfig, WriterConfig};
pub use error::{Error, Result};
pub use extension::{
    AsAny, Asset, AssetContent, Extension, ExtensionFactory, ExtensionRegistry, PackageSink,
    PackageSource,
};
pub use extensions::{CuraExtension, DirectoryExtension};
pub use model::{
    Build, BuildItem, Component, Document, Mesh, Metadata, MetadataEntry, ModelPart, Object,
    ObjectKind, ObjectType, Transform, Triangle, Unit, Vertex,
};
pub use parser::parse_model_part;
pub use writer::{CORE_NS, CURA_NS, PRODUCTION_NS, write_model_part_xml};

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

impl Document {
    /// Read a 3MF package from a reader
    ///
    /// No extensions are registered, so vendor directories are ignored.
    /// Use [`Document::from_reader_with_config`] to load them.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_config(reader, &ParserConfig::default())
    }

    /// Read a 3MF package with a custom configuration
    ///
    /// Either the whole document loads, with every reference resolved and
    /// every registered extension read and post-processed, or an error is
    /// returned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::{CuraExtension, Document, ParserConfig};
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("model.3mf")?;
    /// let config = ParserConfig::new().with_extension::<CuraExtension>();
    /// let doc = Document::from_reader_with_config(file, &config)?;
    ///
    /// if let Some(cura) = doc.extension::<CuraExtension>() {
    ///     println!("Cura assets: {}", threemf::Extension::assets(cura).len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader_with_config<R: Read + Seek>(reader: R, config: &ParserConfig) -> Result<Self> {
        parser::read_package(reader, config)
    }

    /// Read a 3MF package from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_config(path, &ParserConfig::default())
    }

    /// Read a 3MF package from a file path with a custom configuration
    pub fn from_file_with_config<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Self::from_reader_with_config(file, config)
    }

    /// Serialize the document into package bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with_config(&WriterConfig::default())
    }

    /// Serialize the document into package bytes with a custom configuration
    pub fn to_bytes_with_config(&self, config: &WriterConfig) -> Result<Vec<u8>> {
        writer::write_package(self, config)
    }

    /// Write the document to a stream
    ///
    /// The archive is assembled in memory and handed to `writer` in a single
    /// write once complete. The writer is returned for further use.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::Document;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut doc = Document::new();
    /// doc.default_model_part();
    ///
    /// let file = File::create("output.3mf")?;
    /// doc.to_writer(file)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<W> {
        self.to_writer_with_config(writer, &WriterConfig::default())
    }

    /// Write the document to a stream with a custom configuration
    pub fn to_writer_with_config<W: Write>(&self, mut writer: W, config: &WriterConfig) -> Result<W> {
        let bytes = self.to_bytes_with_config(config)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(writer)
    }

    /// Write the document to a file path
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
