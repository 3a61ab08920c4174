//! Error types for 3MF reading and writing
//!
//! Every error carries a code so callers can categorize failures without
//! matching on message text.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model and reference errors
//! - **E4xxx**: Extension errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing the stream
//! - `E1002`: ZIP archive format error
//! - `E1003`: Missing required entry in archive
//! - `E2001`: XML parsing error
//! - `E2003`: Invalid XML structure
//! - `E3001`: Invalid model structure
//! - `E3003`: Object reference that resolves to nothing
//! - `E3004`: Malformed transform attribute
//! - `E4001`: Extension hook failed

use std::io;
use thiserror::Error;

/// Result type for 3MF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading or writing 3MF packages
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing the stream
    ///
    /// **Error Code**: E1001
    ///
    /// Passed through unmodified from the underlying stream.
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Truncated archive
    /// - Two entries written under the same name
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required entry in the 3MF archive
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Missing `[Content_Types].xml` or `_rels/.rels`
    /// - A relationship targets a model part that is not in the archive
    #[error("[E1003] Missing required file: {0}")]
    MissingFile(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required attributes such as `id` or `objectid`
    /// - Non-finite vertex coordinates
    /// - DTD declarations
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid package format
    ///
    /// **Error Code**: E2004
    #[error("[E2004] Invalid 3MF format: {0}")]
    InvalidFormat(String),

    /// XML writing error
    ///
    /// **Error Code**: E2005
    #[error("[E2005] XML writing error: {0}")]
    XmlWrite(String),

    /// Invalid model structure
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - Duplicate object ids within one model part
    /// - Triangle index past the end of the vertex list
    /// - Point buffer whose length is not a multiple of 9
    #[error("[E3001] Invalid model: {0}")]
    InvalidModel(String),

    /// Parse error for numeric values
    ///
    /// **Error Code**: E3002
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// A build item or component references an object id that no part defines
    ///
    /// **Error Code**: E3003
    #[error("[E3003] Unresolved object reference: {context} in '{path}' references object {objectid}, which is not defined")]
    UnresolvedReference {
        /// Model part holding the dangling reference
        path: String,
        /// The referenced id
        objectid: usize,
        /// What holds the reference ("build item", "component of object 4", ...)
        context: String,
    },

    /// Malformed transform attribute
    ///
    /// **Error Code**: E3004
    #[error("[E3004] Invalid transform: {0}")]
    InvalidTransform(String),

    /// Components form a reference cycle
    ///
    /// **Error Code**: E3005
    #[error("[E3005] Component cycle: object {objectid} in '{path}' contains itself")]
    ComponentCycle {
        /// Model part holding the object where the cycle was detected
        path: String,
        /// Object id that was reached twice
        objectid: usize,
    },

    /// An extension hook or factory failed
    ///
    /// **Error Code**: E4001
    #[error("[E4001] Extension '{name}' failed: {source}")]
    Extension {
        /// Name of the extension
        name: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Structured asset content could not be encoded or decoded
    ///
    /// **Error Code**: E4002
    #[error("[E4002] Asset JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::InvalidXml(format!("Invalid escape sequence: {}", err))
    }
}

impl Error {
    /// Create an InvalidXml error for a missing required attribute
    ///
    /// # Example
    /// ```ignore
    /// Error::missing_attribute("object", "id")
    /// ```
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a ParseError with context about what was being parsed
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }

    /// Create an XmlWrite error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }

    /// Wrap a failure raised by an extension hook
    pub fn extension(name: impl Into<String>, source: Error) -> Self {
        Error::Extension {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error means the package content itself is structurally broken
    ///
    /// Structural errors cover missing archive entries, unresolved ids,
    /// malformed transforms, component cycles and invalid XML or model data.
    /// Stream failures and extension failures are not structural.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::MissingFile(_)
                | Error::InvalidXml(_)
                | Error::XmlAttr(_)
                | Error::InvalidFormat(_)
                | Error::InvalidModel(_)
                | Error::ParseError(_)
                | Error::UnresolvedReference { .. }
                | Error::InvalidTransform(_)
                | Error::ComponentCycle { .. }
        )
    }
}
