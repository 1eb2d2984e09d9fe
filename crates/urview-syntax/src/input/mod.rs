//! Input readers - load serialized programs and normalize them.

use crate::ast::Program;
use crate::normalize::{NormalizeOptions, normalize_with};
use crate::traits::ReadError;
use tracing::debug;

#[cfg(feature = "read-urp")]
pub mod urp;

#[cfg(feature = "read-urp")]
pub use urp::{URP_READER, UrpReader, read_urp};

#[cfg(feature = "read-xml")]
pub mod xml;

#[cfg(feature = "read-xml")]
pub use xml::{XML_READER, XmlReader, read_xml};

const PROGRAM_START: &str = "<URProgram";
const PROGRAM_END: &str = "</URProgram>";

/// Slice out the `<URProgram>` element: from the first start tag through the
/// first closing tag. Anything around it (prolog, wrapper markup) is ignored.
pub fn locate_program(text: &str) -> Option<&str> {
    let start = text.find(PROGRAM_START)?;
    let end = text.find(PROGRAM_END)? + PROGRAM_END.len();
    if end <= start {
        return None;
    }
    Some(&text[start..end])
}

/// Locate, parse and normalize a decoded document.
pub(crate) fn read_document(text: &str, options: &NormalizeOptions) -> Result<Program, ReadError> {
    let segment = locate_program(text).ok_or(ReadError::MissingProgram)?;
    debug!(bytes = segment.len(), "located program segment");
    let document = roxmltree::Document::parse(segment)?;
    Ok(normalize_with(document.root_element(), options))
}
