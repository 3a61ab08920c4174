//! Reader and writer configuration

use zip::CompressionMethod;

use crate::error::Result;
use crate::extension::{Extension, ExtensionRegistry};

/// Configuration for reading 3MF files
///
/// Carries the table of extensions the reader instantiates. With the default
/// configuration every vendor directory in the package is ignored.
///
/// # Example
///
/// ```
/// use threemf::{CuraExtension, DirectoryExtension, Extension, ParserConfig};
///
/// let config = ParserConfig::new()
///     .with_extension::<CuraExtension>()
///     .with_extension_factory("Slicer", || {
///         Ok(Box::new(DirectoryExtension::new("Slicer", "Slicer")) as Box<dyn Extension>)
///     })
///     .with_strict_content_types(true);
/// assert_eq!(config.registry().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    registry: ExtensionRegistry,
    strict_content_types: bool,
}

impl ParserConfig {
    /// Create a configuration with no registered extensions
    pub fn new() -> Self {
        Self::default()
    }

    /// Register extension type `E`
    pub fn with_extension<E: Extension + Default + 'static>(mut self) -> Self {
        self.registry.register::<E>();
        self
    }

    /// Register an extension factory under `name`
    pub fn with_extension_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Extension>> + Send + Sync + 'static,
    {
        self.registry.register_factory(name, factory);
        self
    }

    /// Treat a model part whose declared content type is wrong as an error
    ///
    /// Off by default, in which case the mismatch is only logged.
    pub fn with_strict_content_types(mut self, strict: bool) -> Self {
        self.strict_content_types = strict;
        self
    }

    /// Whether content-type mismatches are errors
    pub fn strict_content_types(&self) -> bool {
        self.strict_content_types
    }

    /// The extension registry
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Mutable access to the extension registry
    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.registry
    }
}

/// Configuration for writing 3MF files
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterConfig {
    /// Compression used for every archive entry
    pub compression: CompressionMethod,
}

impl WriterConfig {
    /// Create the default configuration (Deflate compression)
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `compression` for every entry
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}
