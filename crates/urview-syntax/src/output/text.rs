//! Line-numbered text listing.
//!
//! ```text
//!   1 |   - MainProgram: Main Program
//!   2 |     - InitVariablesNode: Initialize Variables
//!     |       - InitVariable: speed = 250
//!   3 |     - Loop: 5 Times
//! ```
//!
//! Numbering is global across sections. Entries inside a variable
//! initialization block get a blank gutter and do not consume a number.

use crate::ast::{AstNode, Program};
use crate::traits::Writer;
use std::fmt::Write;

/// Static instance of the text writer for registry.
pub static TEXT_WRITER: TextWriterImpl = TextWriterImpl;

/// Text writer implementing the Writer trait.
pub struct TextWriterImpl;

impl Writer for TextWriterImpl {
    fn format(&self) -> &'static str {
        "text"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn write(&self, program: &Program) -> String {
        TextWriter::emit(program)
    }
}

/// Emits a program as an indented listing.
pub struct TextWriter {
    output: String,
    line: usize,
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            line: 1,
        }
    }

    /// Render a program. A `URProgram` root is not printed; each of its
    /// sections is listed, with a blank line between sections.
    pub fn emit(program: &Program) -> String {
        let mut writer = Self::new();
        for (i, section) in program.sections().iter().enumerate() {
            if i > 0 {
                writer.output.push('\n');
            }
            writer.write_node(section);
        }
        writer.output
    }

    fn write_node(&mut self, node: &AstNode) {
        if node.in_init {
            self.output.push_str("    | ");
        } else {
            write!(self.output, "{:>3} | ", self.line).unwrap();
            self.line += 1;
        }
        for _ in 0..node.depth {
            self.output.push_str("  ");
        }
        writeln!(self.output, "- {}: {}", node.kind, node.display_text).unwrap();

        for child in &node.children {
            self.write_node(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn test_gutter_and_sections() {
        let root = AstNode::new(NodeKind::Program, "demo", 0).with_children(vec![
            AstNode::new(NodeKind::BeforeStart, "Before Start Sequence", 1),
            AstNode::new(NodeKind::MainProgram, "Main Program", 1).with_children(vec![
                AstNode::new(NodeKind::InitVariables, "Initialize Variables", 2).with_children(vec![
                    AstNode::synthetic(NodeKind::InitVariable, "a = 1", 3).in_init(),
                    AstNode::synthetic(NodeKind::InitVariable, "b = 2", 3).in_init(),
                ]),
                AstNode::new(NodeKind::Loop, "5 Times", 2),
            ]),
        ]);
        let text = TextWriter::emit(&Program::new(root));
        let expected = concat!(
            "  1 |   - SpecialSequence: Before Start Sequence\n",
            "\n",
            "  2 |   - MainProgram: Main Program\n",
            "  3 |     - InitVariablesNode: Initialize Variables\n",
            "    |       - InitVariable: a = 1\n",
            "    |       - InitVariable: b = 2\n",
            "  4 |     - Loop: 5 Times\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_non_program_root_is_printed() {
        let root = AstNode::new(NodeKind::Other("Fragment".into()), "", 0)
            .with_children(vec![AstNode::new(NodeKind::Comment, "x", 1)]);
        let text = TextWriter::emit(&Program::new(root));
        assert_eq!(text, "  1 | - Fragment: \n  2 |   - Comment: x\n");
    }

    #[test]
    fn test_wide_line_numbers() {
        let children = (0..1000)
            .map(|i| AstNode::new(NodeKind::Comment, i.to_string(), 1))
            .collect();
        let root = AstNode::new(NodeKind::Program, "", 0).with_children(children);
        let text = TextWriter::emit(&Program::new(root));
        assert!(text.ends_with("1000 |   - Comment: 999\n"));
    }
}
