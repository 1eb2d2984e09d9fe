//! draw.io (`mxfile`) diagram writer.
//!
//! Sections of the program are stacked vertically under a title box and
//! chained with edges. Inside a section, children flow downward from their
//! parent; `If` branches fan out sideways; folders and threads become
//! swimlane frames.

use crate::ast::{AstNode, NodeKind, Program};
use crate::traits::Writer;
use quick_xml::escape::escape;
use std::fmt::Write;

/// Static instance of the draw.io writer for registry.
pub static DRAWIO_WRITER: DrawioWriterImpl = DrawioWriterImpl;

/// draw.io writer implementing the Writer trait.
pub struct DrawioWriterImpl;

impl Writer for DrawioWriterImpl {
    fn format(&self) -> &'static str {
        "drawio"
    }

    fn extension(&self) -> &'static str {
        "drawio"
    }

    fn write(&self, program: &Program) -> String {
        DrawioWriter::emit(program)
    }
}

const VERTICAL_SPACING: i64 = 120;
const HORIZONTAL_SPACING: i64 = 250;
const NODE_WIDTH: i64 = 180;
const NODE_HEIGHT: i64 = 70;
const SECTION_SPACING: i64 = 300;
const GROUP_HEADER: i64 = 40;
const GROUP_INSET: i64 = 20;

const MAIN_PROGRAM_STYLE: &str = "ellipse;fillColor=#d5e8d4;strokeColor=#82b366;fontStyle=1";
const SUBROUTINE_STYLE: &str = "ellipse;fillColor=#dae8fc;strokeColor=#6c8ebf";
const DECISION_STYLE: &str = "rhombus;fillColor=#f8cecc;strokeColor=#b85450";
const ACTION_STYLE: &str = "rounded=1;fillColor=#fff2cc;strokeColor=#d6b656";
const GROUP_STYLE: &str = "rounded=1;fillColor=#f5f5f5;strokeColor=#666666;dashed=1";
const MOVEMENT_STYLE: &str = "rounded=0;fillColor=#e1d5e7;strokeColor=#9673a6";

const YES_EDGE: &str = "exitX=0.5;exitY=1;entryX=0;entryY=0;dashed=0;label=Yes";
const NO_EDGE: &str = "exitX=0;exitY=0.5;entryX=0.5;entryY=1;dashed=0;label=No";

/// Shape style per node kind.
pub fn style_for(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Program => "rectangle;fillColor=#f5f5f5;strokeColor=#666666;fontStyle=1;fontSize=16",
        NodeKind::MainProgram | NodeKind::BeforeStart => MAIN_PROGRAM_STYLE,
        NodeKind::SubProgram | NodeKind::CallSubProgram => SUBROUTINE_STYLE,
        NodeKind::If | NodeKind::Loop | NodeKind::Switch | NodeKind::Else => DECISION_STYLE,
        NodeKind::Case => "rectangle;fillColor=#f8cecc;strokeColor=#b85450",
        NodeKind::Move => MOVEMENT_STYLE,
        NodeKind::Waypoint => {
            "rounded=0;fillColor=#e1d5e7;strokeColor=#9673a6;whiteSpace=wrap;html=1;align=left"
        }
        NodeKind::Script
        | NodeKind::Assignment
        | NodeKind::Set
        | NodeKind::SetPayload
        | NodeKind::Wait
        | NodeKind::InitVariable => ACTION_STYLE,
        NodeKind::Comment => "note;fillColor=#fff2cc;strokeColor=#d6b656",
        NodeKind::Folder => GROUP_STYLE,
        NodeKind::Thread => "rounded=1;fillColor=#f5f5f5;strokeColor=#666666;dashed=1;fillColor=#d4e1f5",
        NodeKind::Contributed => "rounded=1;fillColor=#d4e1f5;strokeColor=#6c8ebf",
        NodeKind::InitVariables => "rectangle;fillColor=#f5f5f5;strokeColor=#666666",
        NodeKind::Direction
        | NodeKind::Until
        | NodeKind::Timer
        | NodeKind::Popup
        | NodeKind::Suppressed
        | NodeKind::TooDeep
        | NodeKind::Other(_) => "rectangle",
    }
}

/// Label shown in a node's box.
pub fn label_for(node: &AstNode) -> String {
    match node.kind {
        NodeKind::Move => {
            let waypoints: Vec<String> = node
                .children
                .iter()
                .filter(|c| c.kind == NodeKind::Waypoint)
                .map(|c| format!("• {}", c.display_text))
                .collect();
            if waypoints.is_empty() {
                format!("Move: {}", node.display_text)
            } else {
                format!("Move: {}\n{}", node.display_text, waypoints.join("\n"))
            }
        }
        NodeKind::SubProgram | NodeKind::CallSubProgram => format!("Sub: {}", node.display_text),
        NodeKind::Folder => format!("Group: {}", node.display_text),
        _ => format!("{}: {}", node.kind, node.display_text),
    }
}

/// Attribute-safe text: line breaks flattened, markup escaped.
fn attr_text(text: &str) -> String {
    let flat = text.replace('\r', "").replace('\n', " ");
    escape(flat.as_str()).into_owned()
}

struct Geometry {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

impl Geometry {
    fn node(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }
}

/// Emits a program as a draw.io document.
pub struct DrawioWriter {
    groups: String,
    vertices: String,
    edges: String,
    last_id: usize,
}

impl Default for DrawioWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawioWriter {
    pub fn new() -> Self {
        Self {
            groups: String::new(),
            vertices: String::new(),
            edges: String::new(),
            // Ids 0 and 1 are the model's root cells.
            last_id: 1,
        }
    }

    pub fn emit(program: &Program) -> String {
        let mut writer = Self::new();
        writer.write_program(program);
        writer.finish()
    }

    fn write_program(&mut self, program: &Program) {
        let title = AstNode::new(NodeKind::Program, program.name().unwrap_or(""), 0);
        self.vertex(
            &title,
            Geometry {
                x: 0,
                y: 0,
                width: NODE_WIDTH * 2,
                height: NODE_HEIGHT * 3 / 2,
            },
        );

        let mut y = NODE_HEIGHT * 2;
        let mut previous = None;
        for section in program.sections() {
            let id = self.section(section, 0, y);
            if let Some(previous) = previous {
                self.edge(previous, id, "");
            }
            previous = Some(id);
            y += SECTION_SPACING;
        }
    }

    fn finish(self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<mxfile host=\"app.diagrams.net\">\n");
        out.push_str("  <diagram name=\"URProgram\" id=\"1\">\n");
        out.push_str(
            "    <mxGraphModel dx=\"1500\" dy=\"1500\" grid=\"1\" gridSize=\"10\" guides=\"1\" \
             tooltips=\"1\" connect=\"1\" arrows=\"1\" fold=\"1\" page=\"1\" pageScale=\"1\" \
             pageWidth=\"850\" pageHeight=\"1100\">\n",
        );
        out.push_str("      <root>\n");
        out.push_str("        <mxCell id=\"0\"/>\n");
        out.push_str("        <mxCell id=\"1\" parent=\"0\"/>\n");
        out.push_str(&self.groups);
        out.push_str(&self.vertices);
        out.push_str(&self.edges);
        out.push_str("      </root>\n");
        out.push_str("    </mxGraphModel>\n");
        out.push_str("  </diagram>\n");
        out.push_str("</mxfile>\n");
        out
    }

    fn next_id(&mut self) -> usize {
        self.last_id += 1;
        self.last_id
    }

    fn vertex(&mut self, node: &AstNode, mut geometry: Geometry) -> usize {
        let id = self.next_id();
        if node.kind == NodeKind::Move {
            let waypoints = node
                .children
                .iter()
                .filter(|c| c.kind == NodeKind::Waypoint)
                .count() as i64;
            if waypoints > 0 {
                geometry.height = geometry.height.max(30 + 20 * waypoints);
            }
        }
        writeln!(
            self.vertices,
            "        <mxCell id=\"{id}\" value=\"{}\" style=\"{};whiteSpace=wrap;html=1;\" vertex=\"1\" parent=\"1\">",
            attr_text(&label_for(node)),
            style_for(&node.kind),
        )
        .unwrap();
        write_geometry(&mut self.vertices, &geometry);
        id
    }

    fn group(&mut self, label: &str, geometry: Geometry) -> usize {
        let id = self.next_id();
        writeln!(
            self.groups,
            "        <mxCell id=\"{id}\" value=\"{}\" style=\"swimlane;whiteSpace=wrap;html=1;\" vertex=\"1\" parent=\"1\">",
            attr_text(label),
        )
        .unwrap();
        write_geometry(&mut self.groups, &geometry);
        id
    }

    fn edge(&mut self, source: usize, target: usize, style: &str) {
        let id = self.next_id();
        writeln!(
            self.edges,
            "        <mxCell id=\"{id}\" style=\"edgeStyle=orthogonalEdgeStyle;rounded=0;{style}\" edge=\"1\" parent=\"1\" source=\"{source}\" target=\"{target}\">"
        )
        .unwrap();
        self.edges
            .push_str("          <mxGeometry relative=\"1\" as=\"geometry\"/>\n");
        self.edges.push_str("        </mxCell>\n");
    }

    /// Folders and threads become a frame with their children chained inside.
    fn section(&mut self, node: &AstNode, x: i64, y: i64) -> usize {
        if !matches!(node.kind, NodeKind::Folder | NodeKind::Thread) {
            return self.flow(node, x, y);
        }
        let group = self.group(
            &node.display_text,
            Geometry {
                x,
                y,
                width: NODE_WIDTH * 2,
                height: SECTION_SPACING,
            },
        );
        let mut child_y = y + GROUP_HEADER;
        let mut previous = None;
        for child in &node.children {
            let id = self.flow(child, x + GROUP_INSET, child_y);
            if let Some(previous) = previous {
                self.edge(previous, id, "");
            }
            previous = Some(id);
            child_y += VERTICAL_SPACING;
        }
        group
    }

    fn flow(&mut self, node: &AstNode, x: i64, y: i64) -> usize {
        let id = self.vertex(node, Geometry::node(x, y));

        if node.kind == NodeKind::If {
            let then_branch = node.children.iter().find(|c| c.kind != NodeKind::Else);
            let else_branch = node.children.iter().find(|c| c.kind == NodeKind::Else);
            if let Some(branch) = then_branch {
                let branch_id = self.flow(branch, x + HORIZONTAL_SPACING, y);
                self.edge(id, branch_id, YES_EDGE);
            }
            if let Some(branch) = else_branch {
                let branch_id = self.flow(branch, x - HORIZONTAL_SPACING, y);
                self.edge(id, branch_id, NO_EDGE);
            }
            return id;
        }

        let mut child_y = y + VERTICAL_SPACING;
        let mut previous = None;
        for child in &node.children {
            let child_id = self.flow(child, x, child_y);
            match previous {
                None => self.edge(id, child_id, ""),
                Some(previous) => self.edge(previous, child_id, ""),
            }
            previous = Some(child_id);
            child_y += VERTICAL_SPACING;
        }
        id
    }
}

fn write_geometry(out: &mut String, geometry: &Geometry) {
    writeln!(
        out,
        "          <mxGeometry x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" as=\"geometry\"/>",
        geometry.x, geometry.y, geometry.width, geometry.height
    )
    .unwrap();
    out.push_str("        </mxCell>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(children: Vec<AstNode>) -> Program {
        Program::new(AstNode::new(NodeKind::Program, "demo", 0).with_children(children))
    }

    fn cell_count(xml: &str, marker: &str) -> usize {
        xml.matches(marker).count()
    }

    #[test]
    fn test_document_is_well_formed() {
        let tree = program(vec![
            AstNode::new(NodeKind::MainProgram, "Main Program", 1).with_children(vec![
                AstNode::new(NodeKind::Comment, "a < b & \"c\"", 2),
                AstNode::new(NodeKind::Popup, "line\nbreak", 2),
            ]),
        ]);
        let xml = DrawioWriter::emit(&tree);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "mxfile");

        let labels: Vec<_> = doc
            .descendants()
            .filter_map(|n| n.attribute("value"))
            .collect();
        assert_eq!(
            labels,
            vec![
                "URProgram: demo",
                "MainProgram: Main Program",
                "Comment: a < b & \"c\"",
                "Popup: line break",
            ]
        );
    }

    #[test]
    fn test_sequence_edges() {
        let tree = program(vec![
            AstNode::new(NodeKind::BeforeStart, "Before Start Sequence", 1),
            AstNode::new(NodeKind::MainProgram, "Main Program", 1).with_children(vec![
                AstNode::new(NodeKind::Comment, "1", 2),
                AstNode::new(NodeKind::Comment, "2", 2),
            ]),
        ]);
        let xml = DrawioWriter::emit(&tree);
        // Ids are handed out in creation order, edges included:
        // title 2, before-start 3, main 4, c1 5, edge 6, c2 7, edge 8, section edge 9.
        assert!(xml.contains(r#"id="6" style="edgeStyle=orthogonalEdgeStyle;rounded=0;" edge="1" parent="1" source="4" target="5""#));
        assert!(xml.contains(r#"source="5" target="7""#));
        assert!(xml.contains(r#"source="3" target="4""#));
        assert_eq!(cell_count(&xml, "vertex=\"1\""), 5);
        assert_eq!(cell_count(&xml, "edge=\"1\""), 3);
        assert!(xml.contains(r#"<mxGeometry x="0" y="440" width="180" height="70" as="geometry"/>"#));
        assert!(xml.contains(r#"<mxGeometry x="0" y="0" width="360" height="105" as="geometry"/>"#));
    }

    #[test]
    fn test_if_branches() {
        let tree = program(vec![
            AstNode::new(NodeKind::If, "x > 1", 1).with_children(vec![
                AstNode::new(NodeKind::Else, "Else", 2),
                AstNode::new(NodeKind::Comment, "then", 2),
                AstNode::new(NodeKind::Comment, "ignored", 2),
            ]),
        ]);
        let xml = DrawioWriter::emit(&tree);
        assert!(xml.contains("label=Yes\" edge=\"1\" parent=\"1\" source=\"3\" target=\"4\""));
        assert!(xml.contains("label=No\" edge=\"1\" parent=\"1\" source=\"3\" target=\"6\""));
        assert!(!xml.contains("ignored"));
        assert!(xml.contains(r#"<mxGeometry x="250" y="140""#));
        assert!(xml.contains(r#"<mxGeometry x="-250" y="140""#));
    }

    #[test]
    fn test_folder_becomes_swimlane() {
        let tree = program(vec![
            AstNode::new(NodeKind::Folder, "Setup", 1).with_children(vec![
                AstNode::new(NodeKind::Comment, "a", 2),
                AstNode::new(NodeKind::Comment, "b", 2),
            ]),
        ]);
        let xml = DrawioWriter::emit(&tree);
        assert_eq!(cell_count(&xml, "swimlane"), 1);
        assert!(xml.contains(r#"value="Setup" style="swimlane"#));
        assert!(xml.contains(r#"<mxGeometry x="20" y="180""#));
        assert!(xml.contains(r#"<mxGeometry x="20" y="300""#));
        assert!(xml.contains(r#"source="4" target="5""#));
    }

    #[test]
    fn test_move_label_lists_waypoints() {
        let node = AstNode::new(NodeKind::Move, "MoveJ", 1).with_children(vec![
            AstNode::new(NodeKind::Waypoint, "Approach", 2),
            AstNode::new(NodeKind::Waypoint, "Pick", 2),
            AstNode::new(NodeKind::Comment, "x", 2),
        ]);
        assert_eq!(label_for(&node), "Move: MoveJ\n• Approach\n• Pick");
        assert_eq!(
            label_for(&AstNode::new(NodeKind::CallSubProgram, "grip", 1)),
            "Sub: grip"
        );
        assert_eq!(style_for(&NodeKind::Other("X".into())), "rectangle");

        let moves = (0..4)
            .map(|i| AstNode::new(NodeKind::Waypoint, format!("w{i}"), 2))
            .collect();
        let xml = DrawioWriter::emit(&program(vec![
            AstNode::new(NodeKind::Move, "MoveL", 1).with_children(moves),
        ]));
        assert!(xml.contains(r#"width="180" height="110""#));
    }
}
