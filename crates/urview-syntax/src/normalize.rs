//! URProgram tree → normalized [`Program`].
//!
//! One rule per node kind. Every rule is total: missing attributes, missing
//! sub-elements and dangling references turn into `"?"` or a bracketed
//! fallback, never an error.

use crate::ast::{AstNode, NodeKind, Program};
use crate::expr::{VariableLookup, decode_expression};
use crate::resolve::{Resolver, UNKNOWN, resolve};
use crate::tree::{CHILDREN, SourceNode};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Tags marking a commented-out subtree.
const SUPPRESSION_WRAPPERS: &[&str] = &["SuppressedNode", "suppressedNode"];

/// Options for a normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Nodes deeper than this become a `TooDeep` marker.
    pub max_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Normalize a document root with default options.
pub fn normalize<'a, N: SourceNode<'a>>(root: N) -> Program {
    normalize_with(root, &NormalizeOptions::default())
}

pub fn normalize_with<'a, N: SourceNode<'a>>(root: N, options: &NormalizeOptions) -> Program {
    Normalizer::new(*options).run(root)
}

/// One normalization session over one document.
///
/// The session owns the document's name cache; run a fresh normalizer for
/// every document.
pub struct Normalizer<'a, N: SourceNode<'a>> {
    resolver: Resolver<'a, N>,
    options: NormalizeOptions,
}

impl<'a, N: SourceNode<'a>> Normalizer<'a, N> {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            resolver: Resolver::new(),
            options,
        }
    }

    pub fn run(mut self, root: N) -> Program {
        Program::new(self.node(root, 0))
    }

    /// Normalize one element at `depth`.
    pub fn node(&mut self, node: N, depth: usize) -> AstNode {
        if depth > self.options.max_depth {
            return self.too_deep(node, depth);
        }

        if SUPPRESSION_WRAPPERS.contains(&node.tag()) {
            let mut elements = node.elements();
            return match (elements.next(), elements.next()) {
                (Some(only), None) if only.tag() != CHILDREN => self.node(only, depth),
                _ => self.suppressed(node, depth),
            };
        }

        let tag = node.tag();
        trace!(tag, depth, "normalize");

        let kind = NodeKind::from_tag(tag).unwrap_or_else(|| NodeKind::Other(tag.to_string()));
        let (kind, display_text) = match kind {
            NodeKind::InitVariables => return self.init_variables(node, depth),
            NodeKind::SubProgram => return self.sub_program(node, depth),
            NodeKind::If if node.attr("type") == Some("Else") => (NodeKind::Else, "Else".into()),
            kind => {
                let text = self.display_text(&kind, node);
                (kind, text)
            }
        };

        AstNode::new(kind, display_text, depth).with_children(self.children(node, depth))
    }

    fn too_deep(&self, node: N, depth: usize) -> AstNode {
        warn!(
            tag = node.tag(),
            depth,
            max_depth = self.options.max_depth,
            "nesting limit reached, subtree dropped"
        );
        AstNode::synthetic(NodeKind::TooDeep, "[nesting too deep]", depth)
    }

    fn children(&mut self, node: N, depth: usize) -> Vec<AstNode> {
        node.structural_children()
            .into_iter()
            .map(|child| self.node(child, depth + 1))
            .collect()
    }

    fn display_text(&mut self, kind: &NodeKind, node: N) -> String {
        match kind {
            NodeKind::MainProgram => "Main Program".into(),
            NodeKind::BeforeStart => "Before Start Sequence".into(),
            NodeKind::Assignment => self.assignment(node),
            NodeKind::CallSubProgram => call_target(node),
            NodeKind::Move => attr_or(node, "motionType", ""),
            NodeKind::Direction => attr_or(node, "selectedDirection", UNKNOWN),
            NodeKind::Until => until_distance(node),
            NodeKind::Script => self.script(node),
            NodeKind::If => self.expression(node, VariableLookup::Full),
            NodeKind::Loop => self.loop_text(node),
            NodeKind::Wait => wait_text(node),
            NodeKind::Switch => self.switch_variable(node),
            NodeKind::Case => attr_or(node, "caseValue", UNKNOWN),
            NodeKind::Set => self.set(node),
            NodeKind::Timer => self.timer(node),
            NodeKind::SetPayload => attr_or(node, "workpieceName", UNKNOWN),
            NodeKind::Comment => attr_or(node, "comment", UNKNOWN),
            NodeKind::Popup => attr_or(node, "message", UNKNOWN),
            NodeKind::Contributed => contributed(node),
            NodeKind::Program
            | NodeKind::Waypoint
            | NodeKind::Folder
            | NodeKind::Thread
            | NodeKind::Other(_) => attr_or(node, "name", ""),
            // Never produced from a source tag.
            NodeKind::InitVariables
            | NodeKind::SubProgram
            | NodeKind::InitVariable
            | NodeKind::Else
            | NodeKind::Suppressed
            | NodeKind::TooDeep => attr_or(node, "name", ""),
        }
    }

    fn suppressed(&mut self, node: N, depth: usize) -> AstNode {
        let sources: Vec<N> = match node.child(CHILDREN) {
            Some(container) => container.elements().collect(),
            None => node.elements().collect(),
        };
        let children = sources
            .into_iter()
            .map(|child| self.node(child, depth + 1))
            .collect();
        AstNode::synthetic(NodeKind::Suppressed, "[commented out]", depth).with_children(children)
    }

    /// Each declared variable becomes one synthetic `name = value` entry.
    fn init_variables(&mut self, node: N, depth: usize) -> AstNode {
        let children = if depth + 1 > self.options.max_depth {
            vec![self.too_deep(node, depth + 1).in_init()]
        } else {
            node.descendants_named("variable")
                .into_iter()
                .map(|variable| {
                    let name = self.resolver.variable_name(variable);
                    let value: String = variable
                        .descendants_named("ExpressionChar")
                        .into_iter()
                        .filter_map(|c| c.attr("character"))
                        .collect();
                    AstNode::synthetic(NodeKind::InitVariable, format!("{name} = {value}"), depth + 1)
                        .in_init()
                })
                .collect()
        };
        AstNode::new(NodeKind::InitVariables, "Initialize Variables", depth).with_children(children)
    }

    /// Referenced definitions take name and body from the target.
    fn sub_program(&mut self, node: N, depth: usize) -> AstNode {
        let (text, body) = match node.attr("reference").filter(|r| !r.is_empty()) {
            Some(reference) => match resolve(reference, node) {
                Some(target) => (attr_or(target, "name", "[anonymous]"), Some(target)),
                None => (format!("(unresolved): {reference}"), None),
            },
            None => (attr_or(node, "name", "[anonymous]"), Some(node)),
        };
        let children = body
            .map(|body| self.children(body, depth))
            .unwrap_or_default();
        AstNode::new(NodeKind::SubProgram, text, depth).with_children(children)
    }

    fn expression(&mut self, node: N, lookup: VariableLookup) -> String {
        decode_expression(node.find("expression"), &mut self.resolver, lookup)
    }

    fn assignment(&mut self, node: N) -> String {
        let variable = node
            .find("variable")
            .map_or(UNKNOWN, |v| self.resolver.variable_name(v));
        let value = self.expression(node, VariableLookup::Full);
        format!("{variable} = {value}")
    }

    fn script(&mut self, node: N) -> String {
        match node.attr("type").unwrap_or("") {
            "File" => node
                .child("file")
                .and_then(|f| f.text())
                .map_or(UNKNOWN, str::trim)
                .to_string(),
            "Line" => self.expression(node, VariableLookup::ReferenceOnly),
            other => format!("[Unknown type: {other}]"),
        }
    }

    fn loop_text(&mut self, node: N) -> String {
        let loop_type = node.attr("type").unwrap_or("While");
        if loop_type == "Counting" {
            return format!("{} Times", node.attr("count").unwrap_or(UNKNOWN));
        }
        let token = first_token(node);
        let variable = node
            .find("ProgramVariable")
            .map_or(UNKNOWN, |v| self.resolver.reference_name(v));
        format!("{loop_type} ({token} {variable})").trim().to_string()
    }

    fn switch_variable(&mut self, node: N) -> String {
        node.find("expression")
            .and_then(|e| e.find("ProgramVariable"))
            .map_or(UNKNOWN, |v| self.resolver.variable_name(v))
            .to_string()
    }

    fn set(&mut self, node: N) -> String {
        match node.attr("type").unwrap_or("") {
            "NoAction" => format!("Set TCP: {}", self.referenced(node.child("tcp"))),
            "DigitalOutput" => {
                let pin = self.referenced(node.child("pin"));
                let value = node
                    .child("digitalValue")
                    .and_then(|v| v.text())
                    .map_or(UNKNOWN, str::trim);
                format!("{pin} = {value}")
            }
            _ => attr_or(node, "name", ""),
        }
    }

    fn referenced(&mut self, element: Option<N>) -> &'a str {
        element.map_or(UNKNOWN, |e| self.resolver.referenced_name(e))
    }

    fn timer(&mut self, node: N) -> String {
        let action = node.attr("action").unwrap_or(UNKNOWN);
        let variable = node
            .find("variable")
            .map_or(UNKNOWN, |v| self.resolver.variable_name(v));
        format!("{action} Timer: {variable}")
    }
}

fn attr_or<'a, N: SourceNode<'a>>(node: N, name: &str, default: &str) -> String {
    node.attr(name).unwrap_or(default).to_string()
}

fn first_token<'a, N: SourceNode<'a>>(node: N) -> &'a str {
    node.find("ExpressionToken")
        .and_then(|t| t.attr("token"))
        .map_or("", str::trim)
}

fn call_target<'a, N: SourceNode<'a>>(node: N) -> String {
    let Some(subprogram) = node.find("subprogram") else {
        return "[Missing <subprogram>]".into();
    };
    if let Some(name) = subprogram.attr("name").filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let reference = subprogram.attr("reference").unwrap_or("");
    resolve(reference, subprogram)
        .and_then(|target| target.attr("name"))
        .filter(|n| !n.is_empty())
        .map_or_else(|| format!("(ref): {reference}"), str::to_string)
}

/// `Distance` in meters, shown in whole millimeters.
fn until_distance<'a, N: SourceNode<'a>>(node: N) -> String {
    let raw = node
        .child("Distance")
        .and_then(|d| d.text())
        .filter(|t| !t.is_empty());
    let Some(raw) = raw else {
        return "Distance: ?".into();
    };
    match raw.trim().parse::<f64>() {
        Ok(meters) if meters.is_finite() => format!("{}mm", (meters * 1000.0).trunc() as i64),
        _ => "Distance: [Invalid value]".into(),
    }
}

fn wait_text<'a, N: SourceNode<'a>>(node: N) -> String {
    if node.attr("type").unwrap_or("Condition") == "Sleep" {
        let seconds = node
            .child("waitTime")
            .and_then(|t| t.text())
            .map_or(UNKNOWN, str::trim);
        return format!("{seconds}s");
    }
    let Some(expression) = node.find("expression") else {
        return UNKNOWN.into();
    };
    let token = first_token(expression);
    let suffix: String = expression
        .find_all("ExpressionChar")
        .into_iter()
        .filter_map(|c| c.attr("character"))
        .collect();
    if token.is_empty() && suffix.is_empty() {
        UNKNOWN.into()
    } else {
        format!("{token}{suffix}")
    }
}

fn contributed<'a, N: SourceNode<'a>>(node: N) -> String {
    let node_type = node.attr("strategyProgramNodeType").unwrap_or(UNKNOWN);
    match node.attr("strategyURCapDeveloper").filter(|d| !d.is_empty()) {
        Some(developer) => format!("{node_type} ({developer})"),
        None => node_type.to_string(),
    }
}
