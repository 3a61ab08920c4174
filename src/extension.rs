//! Extension protocol for vendor data stored next to the model parts
//!
//! A 3MF package may carry arbitrary vendor directories (Cura keeps its
//! settings under `Cura/`). The core codec treats them as opaque: an
//! [`Extension`] owns the assets of exactly one directory and decides how to
//! read and write them. Which directories are turned into extensions during a
//! read is decided by the [`ExtensionRegistry`] passed in the
//! [`ParserConfig`](crate::ParserConfig); unclaimed directories are ignored.
//!
//! # Example
//!
//! ```
//! use threemf::{Asset, DirectoryExtension, Document, Extension};
//!
//! let mut doc = Document::new();
//! let mut ext = DirectoryExtension::new("Slicer", "Slicer");
//! ext.add_asset(Asset::raw("profile.ini", b"layer_height = 0.2".to_vec()));
//! doc.add_extension(ext);
//! let bytes = doc.to_bytes().unwrap();
//! assert!(!bytes.is_empty());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::model::Document;

/// Conversion to [`Any`] so boxed extensions can be downcast to their concrete type
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Content of one extension asset
#[derive(Debug, Clone, PartialEq)]
pub enum AssetContent {
    /// Opaque bytes, written back unchanged
    Raw(Vec<u8>),
    /// A JSON tree, written as pretty-printed JSON
    Structured(serde_json::Value),
}

impl AssetContent {
    /// Bytes stored in the package for this content
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            AssetContent::Raw(bytes) => Ok(bytes.clone()),
            AssetContent::Structured(value) => Ok(serde_json::to_vec_pretty(value)?),
        }
    }
}

/// A named file inside an extension's directory
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Path relative to the extension directory
    pub name: String,
    /// Stored content
    pub content: AssetContent,
}

impl Asset {
    /// Asset holding raw bytes
    pub fn raw(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: AssetContent::Raw(bytes),
        }
    }

    /// Asset holding a JSON tree
    pub fn structured(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            content: AssetContent::Structured(value),
        }
    }

    /// The content as a JSON tree, parsing raw bytes if needed
    pub fn as_json(&self) -> Result<serde_json::Value> {
        match &self.content {
            AssetContent::Structured(value) => Ok(value.clone()),
            AssetContent::Raw(bytes) => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

/// Read access to package entries, handed to [`Extension::read`]
pub trait PackageSource {
    /// All entry names in archive order
    fn entry_names(&self) -> Vec<String>;

    /// Bytes of one entry
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>>;
}

/// Write access to the package being built, handed to [`Extension::write`]
pub trait PackageSink {
    /// Add one entry
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

fn directory_prefix(directory: &str) -> String {
    format!("{}/", directory.trim_matches('/'))
}

/// Vendor data bound to one package directory
///
/// Implementors supply identity and asset storage; the read and write hooks
/// default to copying every file under [`directory`](Extension::directory)
/// as raw bytes.
pub trait Extension: AsAny + fmt::Debug + Send + Sync {
    /// Unique extension name, used as the registry key
    fn name(&self) -> &str;

    /// Package directory that holds this extension's assets
    fn directory(&self) -> &str;

    /// Assets in read or insertion order
    fn assets(&self) -> &[Asset];

    /// Mutable asset storage
    fn assets_mut(&mut self) -> &mut Vec<Asset>;

    /// Asset stored under `name`
    fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets().iter().find(|a| a.name == name)
    }

    /// Add an asset, replacing any asset with the same name
    fn add_asset(&mut self, asset: Asset) {
        let assets = self.assets_mut();
        match assets.iter_mut().find(|a| a.name == asset.name) {
            Some(existing) => *existing = asset,
            None => assets.push(asset),
        }
    }

    /// Load this extension's assets from the package
    fn read(&mut self, source: &mut dyn PackageSource) -> Result<()> {
        let prefix = directory_prefix(self.directory());
        for entry in source.entry_names() {
            let Some(relative) = entry.strip_prefix(&prefix) else {
                continue;
            };
            if relative.is_empty() || relative.ends_with('/') {
                continue;
            }
            let bytes = source.read_entry(&entry)?;
            self.assets_mut().push(Asset::raw(relative, bytes));
        }
        Ok(())
    }

    /// Store this extension's assets in the package
    fn write(&self, sink: &mut dyn PackageSink) -> Result<()> {
        let prefix = directory_prefix(self.directory());
        for asset in self.assets() {
            let data = asset.content.to_bytes()?;
            sink.write_entry(&format!("{}{}", prefix, asset.name), &data)?;
        }
        Ok(())
    }

    /// Post-process hook, called once after the whole document has loaded
    fn process(&mut self, _document: &Document) -> Result<()> {
        Ok(())
    }
}

/// Constructor stored in an [`ExtensionRegistry`]
pub type ExtensionFactory = Arc<dyn Fn() -> Result<Box<dyn Extension>> + Send + Sync>;

/// Table of extensions the reader should instantiate
///
/// Entries keep registration order, which is also the order of the
/// `process` calls after a read.
///
/// # Example
///
/// ```
/// use threemf::{CuraExtension, ExtensionRegistry};
///
/// let mut registry = ExtensionRegistry::new();
/// registry.register::<CuraExtension>();
/// assert!(registry.contains("Cura"));
/// ```
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    entries: Vec<(String, ExtensionFactory)>,
}

impl ExtensionRegistry {
    /// Create a new empty extension registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`, named after `E::default().name()`
    pub fn register<E: Extension + Default + 'static>(&mut self) -> &mut Self {
        let name = E::default().name().to_string();
        self.register_factory(name, || Ok(Box::new(E::default()) as Box<dyn Extension>))
    }

    /// Register a factory under `name`
    ///
    /// Registering a name again replaces the factory but keeps its position.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn Extension>> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: ExtensionFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((name, factory)),
        }
        self
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionFactory)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f))
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
