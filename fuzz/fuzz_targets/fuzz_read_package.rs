#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use threemf::{CuraExtension, Document, ParserConfig};

fuzz_target!(|data: &[u8]| {
    // Full pipeline: ZIP, OPC descriptors, model parts, references, extensions
    let config = ParserConfig::new().with_extension::<CuraExtension>();
    if let Ok(doc) = Document::from_reader_with_config(Cursor::new(data), &config) {
        // Writing back must not panic either
        let _ = doc.to_bytes();
    }
});
