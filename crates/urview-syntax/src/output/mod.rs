//! Output writers - render a normalized program.

#[cfg(feature = "write-text")]
pub mod text;

#[cfg(feature = "write-text")]
pub use text::{TEXT_WRITER, TextWriter, TextWriterImpl};

#[cfg(feature = "write-drawio")]
pub mod drawio;

#[cfg(feature = "write-drawio")]
pub use drawio::{DRAWIO_WRITER, DrawioWriter, DrawioWriterImpl};

#[cfg(feature = "write-json")]
pub mod json;

#[cfg(feature = "write-json")]
pub use json::{JSON_WRITER, JsonWriterImpl};
