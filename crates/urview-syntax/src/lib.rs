//! Structural normalization of URProgram documents.
//!
//! `urview-syntax` turns a loosely-typed URProgram XML tree into a typed
//! program tree with one node per program construct, and renders that tree
//! as text, as a draw.io diagram, or as JSON.
//!
//! # Architecture
//!
//! ```text
//! Input                 Core                          Output
//! ──────────────    ──────────────────────────    ─────────────
//! .urp (gzip)  ─┐                                ┌─> text
//!               ├─> SourceNode ─> Normalizer ────┼─> drawio
//! .xml         ─┘   (tree.rs)     │  (Program)   └─> json
//!                                 ├─ resolve.rs (document-scoped references)
//!                                 └─ expr.rs    (expression fragments)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use urview_syntax::{input, output};
//!
//! let program = input::read_xml(xml_bytes, &Default::default())?;
//! let text = output::TextWriter::emit(&program);
//! // =>
//! //   1 |   - MainProgram: Main Program
//! //   2 |     - Loop: 5 Times
//! ```
//!
//! # Totality
//!
//! Normalization never fails. Values that cannot be determined (a reference
//! that matches nothing, a missing expression) become the sentinel `"?"` or a
//! bracketed fallback such as `"(unresolved): <ref>"`. Only the readers can
//! fail, and only before normalization starts.

pub mod ast;
pub mod expr;
pub mod normalize;
pub mod path;
pub mod registry;
pub mod resolve;
pub mod traits;
pub mod tree;

pub mod input;
pub mod output;

// Re-exports: AST types
pub use ast::{AstNode, NodeKind, Program};

// Re-exports: core
pub use expr::{VariableLookup, decode_expression};
pub use normalize::{DEFAULT_MAX_DEPTH, NormalizeOptions, Normalizer, normalize, normalize_with};
pub use path::{PathError, PathQuery};
pub use resolve::{Resolver, UNKNOWN, name_of, resolve};
pub use tree::SourceNode;

// Re-exports: Traits
pub use traits::{ReadError, Reader, Writer};

// Re-exports: Registry
pub use registry::{
    reader_for_extension, reader_for_format, readers, register_reader, register_writer,
    writer_for_format, writers,
};

// Re-exports: Built-in readers
#[cfg(feature = "read-urp")]
pub use input::urp::{UrpReader, read_urp};
#[cfg(feature = "read-xml")]
pub use input::xml::{XmlReader, read_xml};

// Re-exports: Built-in writers
#[cfg(feature = "write-drawio")]
pub use output::drawio::{DrawioWriter, DrawioWriterImpl};
#[cfg(feature = "write-json")]
pub use output::json::JsonWriterImpl;
#[cfg(feature = "write-text")]
pub use output::text::{TextWriter, TextWriterImpl};
