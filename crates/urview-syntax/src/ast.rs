//! Normalized program tree.
//!
//! One [`AstNode`] per program construct. Nodes own their children; there
//! are no links back into the source document or between nodes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The closed set of program constructs, plus a fallback for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    MainProgram,
    BeforeStart,
    SubProgram,
    CallSubProgram,
    Assignment,
    InitVariables,
    InitVariable,
    Move,
    Waypoint,
    Direction,
    Until,
    Script,
    If,
    Else,
    Loop,
    Wait,
    Switch,
    Case,
    Set,
    Timer,
    SetPayload,
    Comment,
    Popup,
    Contributed,
    Folder,
    Thread,
    /// Synthetic container for a commented-out subtree.
    Suppressed,
    /// Synthetic marker where the depth limit cut the walk.
    TooDeep,
    /// Unrecognized source tag, carried verbatim.
    Other(String),
}

impl NodeKind {
    /// Kind for a known source tag, `None` for tags that need a per-node rule
    /// (`If` may become `Else`) or are unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "URProgram" => Self::Program,
            "MainProgram" => Self::MainProgram,
            "SpecialSequence" => Self::BeforeStart,
            "SubProgram" => Self::SubProgram,
            "CallSubProgram" => Self::CallSubProgram,
            "Assignment" => Self::Assignment,
            "InitVariablesNode" => Self::InitVariables,
            "Move" => Self::Move,
            "Waypoint" => Self::Waypoint,
            "gui.program.direction.MoveDirectionNode" => Self::Direction,
            "Until" => Self::Until,
            "Script" => Self::Script,
            "If" => Self::If,
            "Loop" => Self::Loop,
            "Wait" => Self::Wait,
            "Switch" => Self::Switch,
            "Case" => Self::Case,
            "Set" => Self::Set,
            "Timer" => Self::Timer,
            "SetPayload" => Self::SetPayload,
            "Comment" => Self::Comment,
            "Popup" => Self::Popup,
            "Contributed" => Self::Contributed,
            "Folder" => Self::Folder,
            "Thread" => Self::Thread,
            _ => return None,
        };
        Some(kind)
    }

    /// Name used by writers and in serialized output.
    pub fn name(&self) -> &str {
        match self {
            Self::Program => "URProgram",
            Self::MainProgram => "MainProgram",
            Self::BeforeStart => "SpecialSequence",
            Self::SubProgram => "SubProgram",
            Self::CallSubProgram => "CallSubProgram",
            Self::Assignment => "Assignment",
            Self::InitVariables => "InitVariablesNode",
            Self::InitVariable => "InitVariable",
            Self::Move => "Move",
            Self::Waypoint => "Waypoint",
            Self::Direction => "Direction",
            Self::Until => "Until",
            Self::Script => "Script",
            Self::If => "If",
            Self::Else => "Else",
            Self::Loop => "Loop",
            Self::Wait => "Wait",
            Self::Switch => "Switch",
            Self::Case => "Case",
            Self::Set => "Set",
            Self::Timer => "Timer",
            Self::SetPayload => "SetPayload",
            Self::Comment => "Comment",
            Self::Popup => "Popup",
            Self::Contributed => "Contributed",
            Self::Folder => "Folder",
            Self::Thread => "Thread",
            Self::Suppressed => "Suppressed",
            Self::TooDeep => "TooDeep",
            Self::Other(tag) => tag,
        }
    }

    /// Inverse of [`NodeKind::name`]. Unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Direction" => Self::Direction,
            "InitVariable" => Self::InitVariable,
            "Else" => Self::Else,
            "Suppressed" => Self::Suppressed,
            "TooDeep" => Self::TooDeep,
            _ => Self::from_tag(name).unwrap_or_else(|| Self::Other(name.to_string())),
        }
    }

    /// True for kinds only the normalizer creates.
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            Self::InitVariable | Self::Suppressed | Self::TooDeep
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A normalized program node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub display_text: String,
    pub depth: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<AstNode>,
    /// Manufactured by the normalizer, with no single source element behind it.
    #[serde(skip_serializing_if = "is_false", default)]
    pub synthetic: bool,
    /// Inside a variable-initialization block. Renderers leave these unnumbered.
    #[serde(skip_serializing_if = "is_false", default)]
    pub in_init: bool,
}

impl AstNode {
    pub fn new(kind: NodeKind, display_text: impl Into<String>, depth: usize) -> Self {
        Self {
            kind,
            display_text: display_text.into(),
            depth,
            children: Vec::new(),
            synthetic: false,
            in_init: false,
        }
    }

    /// A node with no source counterpart.
    pub fn synthetic(kind: NodeKind, display_text: impl Into<String>, depth: usize) -> Self {
        Self {
            synthetic: true,
            ..Self::new(kind, display_text, depth)
        }
    }

    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    pub fn in_init(mut self) -> Self {
        self.in_init = true;
        self
    }

    /// Depth-first, preorder traversal of this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &AstNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A normalized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub root: AstNode,
}

impl Program {
    pub fn new(root: AstNode) -> Self {
        Self { root }
    }

    /// Program name when the root is a `URProgram` node.
    pub fn name(&self) -> Option<&str> {
        (self.root.kind == NodeKind::Program).then_some(self.root.display_text.as_str())
    }

    /// Top-level sections: the root's children for a `URProgram` root,
    /// otherwise the root itself.
    pub fn sections(&self) -> &[AstNode] {
        if self.root.kind == NodeKind::Program {
            &self.root.children
        } else {
            std::slice::from_ref(&self.root)
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &AstNode> {
        self.root.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        let kinds = [
            NodeKind::Program,
            NodeKind::BeforeStart,
            NodeKind::InitVariables,
            NodeKind::InitVariable,
            NodeKind::Direction,
            NodeKind::Else,
            NodeKind::Suppressed,
            NodeKind::TooDeep,
            NodeKind::Other("PalletNode".into()),
        ];
        for kind in kinds {
            assert_eq!(NodeKind::from_name(kind.name()), kind);
        }
        assert_eq!(NodeKind::BeforeStart.name(), "SpecialSequence");
        assert_eq!(NodeKind::from_tag("If"), Some(NodeKind::If));
        assert_eq!(NodeKind::from_tag("Else"), None);
    }

    #[test]
    fn test_preorder_iter() {
        let tree = AstNode::new(NodeKind::Program, "p", 0).with_children(vec![
            AstNode::new(NodeKind::MainProgram, "Main Program", 1)
                .with_children(vec![AstNode::new(NodeKind::Comment, "a", 2)]),
            AstNode::new(NodeKind::Comment, "b", 1),
        ]);
        let texts: Vec<_> = tree.iter().map(|n| n.display_text.as_str()).collect();
        assert_eq!(texts, vec!["p", "Main Program", "a", "b"]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_serde_shape() {
        let node = AstNode::synthetic(NodeKind::InitVariable, "x = 1", 2).in_init();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "InitVariable",
                "display_text": "x = 1",
                "depth": 2,
                "synthetic": true,
                "in_init": true,
            })
        );
        let back: AstNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_sections() {
        let program = Program::new(AstNode::new(NodeKind::Comment, "alone", 0));
        assert_eq!(program.sections().len(), 1);
        assert_eq!(program.name(), None);
    }
}
