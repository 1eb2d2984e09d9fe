//! JSON writer: the normalized tree as serialized by serde.

use crate::ast::Program;
use crate::traits::Writer;

/// Static instance of the JSON writer for registry.
pub static JSON_WRITER: JsonWriterImpl = JsonWriterImpl;

/// JSON writer implementing the Writer trait.
pub struct JsonWriterImpl;

impl Writer for JsonWriterImpl {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, program: &Program) -> String {
        // Serializing plain strings and integers cannot fail.
        let mut json = serde_json::to_string_pretty(program).unwrap_or_default();
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, NodeKind};

    #[test]
    fn test_json_round_trip() {
        let program = Program::new(
            AstNode::new(NodeKind::Program, "p", 0)
                .with_children(vec![AstNode::new(NodeKind::Other("Pallet".into()), "", 1)]),
        );
        let json = JSON_WRITER.write(&program);
        assert!(json.contains("\"kind\": \"Pallet\""));
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(back, program);
    }
}
