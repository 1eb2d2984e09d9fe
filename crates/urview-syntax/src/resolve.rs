//! Reference resolution.
//!
//! A reference is an attribute whose value is a path query over the whole
//! document, evaluated from the element that carries it. Resolution is a
//! value lookup: only the target's name is ever copied into the program
//! tree, never a link to the target.

use crate::tree::SourceNode;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// Placeholder for any value that could not be determined.
pub const UNKNOWN: &str = "?";

/// Evaluate `reference` from `context` and return the first match.
///
/// Malformed queries and empty results are both reported as `None`.
pub fn resolve<'a, N: SourceNode<'a>>(reference: &str, context: N) -> Option<N> {
    match context.select(reference) {
        Ok(Some(target)) => Some(target),
        Ok(None) => {
            debug!(reference, context = context.tag(), "reference matched nothing");
            None
        }
        Err(err) => {
            debug!(reference, %err, "malformed reference");
            None
        }
    }
}

/// Name of a resolved node: `name`, else `referencedName`, else `"?"`.
pub fn name_of<'a, N: SourceNode<'a>>(node: Option<N>) -> &'a str {
    node.and_then(|n| n.attr("name").or_else(|| n.attr("referencedName")))
        .unwrap_or(UNKNOWN)
}

/// Resolves element names for one document.
///
/// Names found through references are memoized per element, so repeated
/// lookups of the same variable element are stable and cheap. A resolver is
/// created for one document and dropped with it.
pub struct Resolver<'a, N: SourceNode<'a>> {
    names: HashMap<N::Key, &'a str>,
    _doc: PhantomData<&'a ()>,
}

impl<'a, N: SourceNode<'a>> Default for Resolver<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, N: SourceNode<'a>> Resolver<'a, N> {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            _doc: PhantomData,
        }
    }

    /// Name of a variable element: its inline `name`, else the name of the
    /// node its `reference` points at, else `"?"`.
    pub fn variable_name(&mut self, variable: N) -> &'a str {
        match variable.attr("name") {
            Some(name) => name,
            None => self.reference_name(variable),
        }
    }

    /// Name of the node `element`'s `reference` points at, ignoring any
    /// inline name. `"?"` when there is no reference or it does not resolve.
    pub fn reference_name(&mut self, element: N) -> &'a str {
        if let Some(&name) = self.names.get(&element.key()) {
            return name;
        }
        let name = match element.attr("reference") {
            Some(reference) => name_of(resolve(reference, element)),
            None => UNKNOWN,
        };
        self.names.insert(element.key(), name);
        name
    }

    /// Name of a pin or TCP element: inline `referencedName`, else the
    /// resolved reference target's name, else `"?"`.
    pub fn referenced_name(&mut self, element: N) -> &'a str {
        match element.attr("referencedName") {
            Some(name) => name,
            None => self.reference_name(element),
        }
    }

    /// Number of memoized reference lookups.
    pub fn cached(&self) -> usize {
        self.names.len()
    }
}
