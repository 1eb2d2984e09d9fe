//! Registry for readers and writers.

use crate::traits::{Reader, Writer};
use std::sync::{OnceLock, RwLock};

/// Global reader registry.
static READERS: RwLock<Vec<&'static dyn Reader>> = RwLock::new(Vec::new());
static READERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Global writer registry.
static WRITERS: RwLock<Vec<&'static dyn Writer>> = RwLock::new(Vec::new());
static WRITERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom reader.
pub fn register_reader(reader: &'static dyn Reader) {
    READERS.write().unwrap().push(reader);
}

/// Register a custom writer.
pub fn register_writer(writer: &'static dyn Writer) {
    WRITERS.write().unwrap().push(writer);
}

fn init_readers() {
    READERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "read-urp")]
        {
            register_reader(&crate::input::urp::URP_READER);
        }
        #[cfg(feature = "read-xml")]
        {
            register_reader(&crate::input::xml::XML_READER);
        }
    });
}

fn init_writers() {
    WRITERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "write-text")]
        {
            register_writer(&crate::output::text::TEXT_WRITER);
        }
        #[cfg(feature = "write-drawio")]
        {
            register_writer(&crate::output::drawio::DRAWIO_WRITER);
        }
        #[cfg(feature = "write-json")]
        {
            register_writer(&crate::output::json::JSON_WRITER);
        }
    });
}

/// Get a reader by format name.
pub fn reader_for_format(format: &str) -> Option<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap()
        .iter()
        .find(|r| r.format() == format)
        .copied()
}

/// Get a reader by file extension (without the dot, case-insensitive).
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap()
        .iter()
        .find(|r| r.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .copied()
}

/// Get a writer by format name.
pub fn writer_for_format(format: &str) -> Option<&'static dyn Writer> {
    init_writers();
    WRITERS
        .read()
        .unwrap()
        .iter()
        .find(|w| w.format() == format)
        .copied()
}

/// Get all registered readers.
pub fn readers() -> Vec<&'static dyn Reader> {
    init_readers();
    READERS.read().unwrap().clone()
}

/// Get all registered writers.
pub fn writers() -> Vec<&'static dyn Writer> {
    init_writers();
    WRITERS.read().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "read-urp")]
    fn test_urp_reader_lookup() {
        let reader = reader_for_format("urp").expect("urp reader");
        assert_eq!(reader.format(), "urp");
        assert!(reader.extensions().contains(&"urp"));

        let reader = reader_for_extension("URP").expect("urp extension");
        assert_eq!(reader.format(), "urp");
    }

    #[test]
    #[cfg(feature = "read-xml")]
    fn test_xml_reader_lookup() {
        let reader = reader_for_extension("xml").expect("xml extension");
        assert_eq!(reader.format(), "xml");
        assert!(reader_for_extension("lua").is_none());
    }

    #[test]
    #[cfg(feature = "write-drawio")]
    fn test_drawio_writer_lookup() {
        let writer = writer_for_format("drawio").expect("drawio writer");
        assert_eq!(writer.format(), "drawio");
        assert_eq!(writer.extension(), "drawio");
    }

    #[test]
    #[cfg(all(feature = "read-xml", feature = "write-text"))]
    fn test_read_and_write_via_registry() {
        let reader = reader_for_format("xml").unwrap();
        let writer = writer_for_format("text").unwrap();

        let program = reader
            .read(
                br#"<URProgram name="p"><children><MainProgram/></children></URProgram>"#,
                &Default::default(),
            )
            .unwrap();
        let text = writer.write(&program);

        assert_eq!(text, "  1 |   - MainProgram: Main Program\n");
    }

    #[test]
    fn test_all_builtin_writers_registered() {
        let formats: Vec<_> = writers().iter().map(|w| w.format()).collect();
        #[cfg(feature = "write-text")]
        assert!(formats.contains(&"text"));
        #[cfg(feature = "write-json")]
        assert!(formats.contains(&"json"));
        let _ = formats;
    }
}
