//! Raw pass-through for an arbitrary package directory

use crate::extension::{Asset, Extension};

/// Keeps every file of one directory as raw bytes
///
/// Useful for vendor data this crate has no dedicated type for. Register it
/// with [`ParserConfig::with_extension_factory`](crate::ParserConfig::with_extension_factory)
/// to have a read pick the directory up.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryExtension {
    name: String,
    directory: String,
    assets: Vec<Asset>,
}

impl DirectoryExtension {
    /// Create an empty extension bound to `directory`
    pub fn new(name: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            assets: Vec::new(),
        }
    }
}

impl Extension for DirectoryExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn directory(&self) -> &str {
        &self.directory
    }

    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut Vec<Asset> {
        &mut self.assets
    }
}
