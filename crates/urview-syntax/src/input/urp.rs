//! `.urp` reader: a gzip stream wrapping the program XML.

use crate::ast::Program;
use crate::normalize::NormalizeOptions;
use crate::traits::{ReadError, Reader};
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

/// Static instance of the URP reader for registry.
pub static URP_READER: UrpReader = UrpReader;

/// Reader for gzip-compressed `.urp` files.
pub struct UrpReader;

impl Reader for UrpReader {
    fn format(&self) -> &'static str {
        "urp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["urp"]
    }

    fn read(&self, source: &[u8], options: &NormalizeOptions) -> Result<Program, ReadError> {
        read_urp(source, options)
    }
}

/// Decompress and normalize a `.urp` file.
pub fn read_urp(source: &[u8], options: &NormalizeOptions) -> Result<Program, ReadError> {
    let mut raw = Vec::new();
    GzDecoder::new(source).read_to_end(&mut raw)?;
    debug!(compressed = source.len(), decompressed = raw.len(), "decompressed urp");
    let text = String::from_utf8_lossy(&raw);
    super::read_document(&text, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_read_urp() {
        let source = gzip(
            br#"<?xml version="1.0"?><URProgram name="packed"><children><MainProgram/></children></URProgram>"#,
        );
        let program = read_urp(&source, &NormalizeOptions::default()).unwrap();
        assert_eq!(program.name(), Some("packed"));
        assert_eq!(program.root.children.len(), 1);
    }

    #[test]
    fn test_not_gzip() {
        let err = read_urp(b"<URProgram/>", &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, ReadError::Decompress(_)));
    }

    #[test]
    fn test_missing_program() {
        let source = gzip(b"<installation/>");
        let err = read_urp(&source, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, ReadError::MissingProgram));
        assert_eq!(err.to_string(), "no <URProgram> element found");
    }
}
