//! Traits for document readers and writers.

use crate::ast::Program;
use crate::normalize::NormalizeOptions;

/// Error that can occur when loading a document. Normalization itself
/// never fails; everything here happens before it starts.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("no <URProgram> element found")]
    MissingProgram,

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// A reader loads a serialized program and normalizes it.
pub trait Reader: Send + Sync {
    /// Format identifier (e.g., "urp", "xml").
    fn format(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["urp"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Load `source` and normalize it.
    fn read(&self, source: &[u8], options: &NormalizeOptions) -> Result<Program, ReadError>;
}

/// A writer renders a normalized program.
pub trait Writer: Send + Sync {
    /// Format identifier (e.g., "text", "drawio").
    fn format(&self) -> &'static str;

    /// File extension for output (e.g., "drawio").
    fn extension(&self) -> &'static str;

    fn write(&self, program: &Program) -> String;
}
