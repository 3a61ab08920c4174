//! Package writing

use std::io::{Cursor, Write};

use tracing::trace;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;
use crate::extension::PackageSink;

/// Builds a 3MF archive in memory
///
/// Nothing reaches the caller's stream until [`PackageWriter::finish`]
/// returns the complete archive. Entries carry a fixed timestamp so equal
/// documents produce equal bytes.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PackageWriter {
    /// Start an empty archive whose entries use `compression`
    pub fn new(compression: CompressionMethod) -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(compression)
                .last_modified_time(DateTime::default()),
        }
    }

    /// Add one entry
    ///
    /// Writing the same name twice is a ZIP error.
    pub fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        trace!(entry = name, bytes = data.len(), "write package entry");
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Finish the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl PackageSink for PackageWriter {
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        PackageWriter::write_entry(self, name, data)
    }
}
