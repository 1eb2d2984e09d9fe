//! The generic source tree the normalizer walks.
//!
//! `SourceNode` is the only view of the input document the core relies on:
//! tags, attributes, text, parent/child navigation, and document-scoped
//! path selection. `roxmltree::Node` implements it; roxmltree nodes keep a
//! reference to their document, so selection can climb to the document root
//! from any node.

use crate::path::{PathError, select};
use std::fmt::Debug;
use std::hash::Hash;

/// Tag of the container element that holds a node's structural children.
pub const CHILDREN: &str = "children";

/// A read-only element of a loaded document.
pub trait SourceNode<'a>: Copy + Sized + 'a {
    /// Stable identity of a node within its document.
    type Key: Copy + Eq + Hash + Debug;

    /// Element tag (local name).
    fn tag(self) -> &'a str;

    /// Attribute value by name.
    fn attr(self, name: &str) -> Option<&'a str>;

    /// Text content, if the first child is a text node.
    fn text(self) -> Option<&'a str>;

    /// Parent element. `None` for the document's root element.
    fn parent(self) -> Option<Self>;

    /// Child elements in document order.
    fn elements(self) -> impl Iterator<Item = Self> + 'a;

    fn key(self) -> Self::Key;

    /// First direct child element with the given tag.
    fn child(self, tag: &str) -> Option<Self> {
        self.elements().find(|node| node.tag() == tag)
    }

    /// Elements under this node's `children` container.
    fn structural_children(self) -> Vec<Self> {
        self.child(CHILDREN)
            .map(|container| container.elements().collect())
            .unwrap_or_default()
    }

    /// Nearest descendant with the given tag, in document order.
    ///
    /// Nested `children` containers are skipped: a program node's own
    /// sub-elements never include the program nodes nested under it.
    fn find(self, tag: &str) -> Option<Self> {
        local_descendants(self).find(|node| node.tag() == tag)
    }

    /// All descendants with the given tag, skipping nested `children` containers.
    fn find_all(self, tag: &str) -> Vec<Self> {
        local_descendants(self)
            .filter(|node| node.tag() == tag)
            .collect()
    }

    /// All descendants with the given tag, including those in nested containers.
    fn descendants_named(self, tag: &str) -> Vec<Self> {
        Preorder::new(self, false)
            .filter(|node| node.tag() == tag)
            .collect()
    }

    /// The root element of the owning document.
    fn document_root(self) -> Self {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Evaluate a document-scoped path query from this node and return the
    /// first match.
    fn select(self, query: &str) -> Result<Option<Self>, PathError> {
        select(query, self)
    }
}

fn local_descendants<'a, N: SourceNode<'a>>(node: N) -> Preorder<'a, N> {
    Preorder::new(node, true)
}

/// Preorder walk over the descendants of a node (the node itself excluded).
struct Preorder<'a, N: SourceNode<'a>> {
    stack: Vec<N>,
    skip_containers: bool,
    _doc: std::marker::PhantomData<&'a ()>,
}

impl<'a, N: SourceNode<'a>> Preorder<'a, N> {
    fn new(node: N, skip_containers: bool) -> Self {
        let mut stack: Vec<N> = node.elements().collect();
        stack.reverse();
        Self {
            stack,
            skip_containers,
            _doc: std::marker::PhantomData,
        }
    }
}

impl<'a, N: SourceNode<'a>> Iterator for Preorder<'a, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        loop {
            let node = self.stack.pop()?;
            if self.skip_containers && node.tag() == CHILDREN {
                continue;
            }
            let mark = self.stack.len();
            self.stack.extend(node.elements());
            self.stack[mark..].reverse();
            return Some(node);
        }
    }
}

impl<'a, 'input: 'a> SourceNode<'a> for roxmltree::Node<'a, 'input> {
    type Key = roxmltree::NodeId;

    fn tag(self) -> &'a str {
        self.tag_name().name()
    }

    fn attr(self, name: &str) -> Option<&'a str> {
        self.attribute(name)
    }

    fn text(self) -> Option<&'a str> {
        roxmltree::Node::text(&self)
    }

    fn parent(self) -> Option<Self> {
        self.parent_element()
    }

    fn elements(self) -> impl Iterator<Item = Self> + 'a {
        self.children().filter(|node| node.is_element())
    }

    fn key(self) -> Self::Key {
        self.id()
    }
}
