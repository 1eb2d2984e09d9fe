//! Plain XML reader.

use crate::ast::Program;
use crate::normalize::NormalizeOptions;
use crate::traits::{ReadError, Reader};

/// Static instance of the XML reader for registry.
pub static XML_READER: XmlReader = XmlReader;

/// Reader for uncompressed program XML.
pub struct XmlReader;

impl Reader for XmlReader {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml"]
    }

    fn read(&self, source: &[u8], options: &NormalizeOptions) -> Result<Program, ReadError> {
        read_xml(source, options)
    }
}

/// Normalize an uncompressed document. Invalid UTF-8 is replaced, not rejected.
pub fn read_xml(source: &[u8], options: &NormalizeOptions) -> Result<Program, ReadError> {
    let text = String::from_utf8_lossy(source);
    super::read_document(&text, options)
}
