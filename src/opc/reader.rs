//! Package reading

use std::io::{Read, Seek};

use tracing::{trace, warn};
use zip::ZipArchive;

use super::{CONTENT_TYPES_PATH, ContentTypes, RELS_PATH, Relationship, parse_relationships};
use crate::error::{Error, Result};
use crate::extension::PackageSource;

/// An opened 3MF package (ZIP archive)
///
/// The archive handle lives exactly as long as the `Package`.
pub struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package and check that both OPC descriptors are present
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let package = Self { archive };

        for required in [CONTENT_TYPES_PATH, RELS_PATH] {
            if !package.has_file(required) {
                return Err(Error::MissingFile(required.to_string()));
            }
        }

        Ok(package)
    }

    /// Check if a file exists in the archive
    pub fn has_file(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Get the number of files in the archive
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive is empty
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// All entry names in archive order
    pub fn file_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(str::to_string))
            .collect()
    }

    /// Get a file as UTF-8 text
    pub fn get_file(&mut self, name: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingFile(name.to_string()))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Get a file as binary data
    pub fn get_file_binary(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingFile(name.to_string()))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        trace!(entry = name, bytes = content.len(), "read package entry");
        Ok(content)
    }

    /// Parse `[Content_Types].xml`
    pub fn content_types(&mut self) -> Result<ContentTypes> {
        let xml = self.get_file_binary(CONTENT_TYPES_PATH)?;
        ContentTypes::parse(&xml)
    }

    /// Parse `_rels/.rels`
    pub fn relationships(&mut self) -> Result<Vec<Relationship>> {
        let xml = self.get_file_binary(RELS_PATH)?;
        parse_relationships(&xml)
    }

    /// Archive names of every model part, in relationship order
    ///
    /// Relationships of other types are skipped with a warning.
    pub fn model_part_names(&mut self) -> Result<Vec<String>> {
        let mut parts: Vec<String> = Vec::new();
        for rel in self.relationships()? {
            if !rel.is_model() {
                warn!(
                    id = %rel.id,
                    rel_type = %rel.rel_type,
                    target = %rel.target,
                    "skipping relationship of unsupported type"
                );
                continue;
            }
            let part = rel.target_part()?;
            if !parts.contains(&part) {
                parts.push(part);
            }
        }
        Ok(parts)
    }
}

impl<R: Read + Seek> PackageSource for Package<R> {
    fn entry_names(&self) -> Vec<String> {
        self.file_names()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        self.get_file_binary(name)
    }
}
