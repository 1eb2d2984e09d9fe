//! Document-scoped path queries.
//!
//! URProgram documents link nodes with XPath location paths stored in
//! `reference` attributes, e.g. `../../../../children/SubProgram[2]`. This
//! module implements the subset those references use:
//!
//! - absolute (`/URProgram/...`) and relative paths
//! - steps `.`, `..`, `*` and element names
//! - `//` (descendant-or-self, then child)
//! - predicates `[n]`, `[last()]`, `[@attr]`, `[@attr='value']`
//!
//! Evaluation never fails once a query has parsed; a query that matches
//! nothing yields an empty node set.

use crate::tree::SourceNode;
use std::collections::HashSet;

/// Error in the syntax of a path query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty path query")]
    Empty,

    #[error("empty step in path query '{0}'")]
    EmptyStep(String),

    #[error("unterminated predicate or string in '{0}'")]
    Unterminated(String),

    #[error("invalid step '{0}'")]
    InvalidStep(String),

    #[error("unsupported predicate '[{0}]'")]
    UnsupportedPredicate(String),

    #[error("position predicates are 1-based, got [0]")]
    ZeroPosition,
}

/// A parsed path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Preceded by `//`: expand to descendant-or-self before applying.
    descend: bool,
    kind: StepKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepKind {
    Current,
    Parent,
    Child {
        test: NameTest,
        predicates: Vec<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    Last,
    HasAttr(String),
    AttrEq(String, String),
}

/// Either the document node (parent of the root element) or an element.
#[derive(Clone, Copy)]
enum Cursor<N> {
    Document,
    Element(N),
}

impl PathQuery {
    /// Parse a query string.
    pub fn parse(query: &str) -> Result<Self, PathError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PathError::Empty);
        }

        let mut rest = query;
        let mut absolute = false;
        let mut descend = false;
        if let Some(r) = rest.strip_prefix("//") {
            absolute = true;
            descend = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('/') {
            absolute = true;
            rest = r;
            if rest.is_empty() {
                return Ok(Self {
                    absolute,
                    steps: Vec::new(),
                });
            }
        }

        let mut steps = Vec::new();
        loop {
            let (text, remainder) = split_step(rest, query)?;
            if text.trim().is_empty() {
                return Err(PathError::EmptyStep(query.to_string()));
            }
            steps.push(Step {
                descend,
                kind: parse_step(text.trim())?,
            });

            match remainder {
                None => break,
                Some(r) => {
                    descend = r.starts_with('/');
                    rest = if descend { &r[1..] } else { r };
                    if rest.is_empty() {
                        return Err(PathError::EmptyStep(query.to_string()));
                    }
                }
            }
        }

        Ok(Self { absolute, steps })
    }

    /// Evaluate the query from `context`, returning matching elements in
    /// discovery order without duplicates.
    pub fn evaluate<'a, N: SourceNode<'a>>(&self, context: N) -> Vec<N> {
        let root = context.document_root();
        let mut current = vec![if self.absolute {
            Cursor::Document
        } else {
            Cursor::Element(context)
        }];

        for step in &self.steps {
            if step.descend {
                current = descendant_or_self(&current, root);
            }

            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for cursor in current {
                for candidate in apply_step(&step.kind, cursor, root) {
                    if seen.insert(cursor_key(candidate)) {
                        next.push(candidate);
                    }
                }
            }

            current = next;
            if current.is_empty() {
                break;
            }
        }

        current
            .into_iter()
            .filter_map(|cursor| match cursor {
                Cursor::Element(node) => Some(node),
                Cursor::Document => None,
            })
            .collect()
    }
}

/// Parse `query` and return the first element it selects from `context`.
pub fn select<'a, N: SourceNode<'a>>(query: &str, context: N) -> Result<Option<N>, PathError> {
    let query = PathQuery::parse(query)?;
    Ok(query.evaluate(context).into_iter().next())
}

/// Split off the first step, honoring brackets and quotes.
fn split_step<'q>(rest: &'q str, query: &str) -> Result<(&'q str, Option<&'q str>), PathError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in rest.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| PathError::InvalidStep(rest.to_string()))?;
            }
            (None, '/') if depth == 0 => return Ok((&rest[..idx], Some(&rest[idx + 1..]))),
            _ => {}
        }
    }

    if depth > 0 || quote.is_some() {
        return Err(PathError::Unterminated(query.to_string()));
    }
    Ok((rest, None))
}

fn parse_step(text: &str) -> Result<StepKind, PathError> {
    match text {
        "." => return Ok(StepKind::Current),
        ".." => return Ok(StepKind::Parent),
        _ => {}
    }

    let (name, mut rest) = match text.find('[') {
        Some(idx) => (text[..idx].trim(), &text[idx..]),
        None => (text, ""),
    };

    let test = if name == "*" {
        NameTest::Any
    } else if is_name(name) {
        NameTest::Name(name.to_string())
    } else {
        return Err(PathError::InvalidStep(text.to_string()));
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let body_end = closing_bracket(rest).ok_or_else(|| PathError::InvalidStep(text.to_string()))?;
        predicates.push(parse_predicate(rest[1..body_end].trim())?);
        rest = rest[body_end + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathError::InvalidStep(text.to_string()));
        }
    }

    Ok(StepKind::Child { test, predicates })
}

/// Byte index of the `]` closing the predicate that opens at `text[0]`.
fn closing_bracket(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in text.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ']') => return Some(idx),
            _ => {}
        }
    }
    None
}

fn parse_predicate(body: &str) -> Result<Predicate, PathError> {
    if let Ok(position) = body.parse::<usize>() {
        if position == 0 {
            return Err(PathError::ZeroPosition);
        }
        return Ok(Predicate::Position(position));
    }
    if body == "last()" {
        return Ok(Predicate::Last);
    }

    let unsupported = || PathError::UnsupportedPredicate(body.to_string());
    let attr = body.strip_prefix('@').ok_or_else(unsupported)?;
    match attr.split_once('=') {
        None if is_name(attr.trim()) => Ok(Predicate::HasAttr(attr.trim().to_string())),
        None => Err(unsupported()),
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
            match unquoted {
                Some(v) if is_name(name) => Ok(Predicate::AttrEq(name.to_string(), v.to_string())),
                _ => Err(unsupported()),
            }
        }
    }
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

fn cursor_key<'a, N: SourceNode<'a>>(cursor: Cursor<N>) -> Option<N::Key> {
    match cursor {
        Cursor::Document => None,
        Cursor::Element(node) => Some(node.key()),
    }
}

fn child_cursors<'a, N: SourceNode<'a>>(cursor: Cursor<N>, root: N) -> Vec<Cursor<N>> {
    match cursor {
        Cursor::Document => vec![Cursor::Element(root)],
        Cursor::Element(node) => node.elements().map(Cursor::Element).collect(),
    }
}

fn descendant_or_self<'a, N: SourceNode<'a>>(cursors: &[Cursor<N>], root: N) -> Vec<Cursor<N>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for &start in cursors {
        let mut stack = vec![start];
        while let Some(cursor) = stack.pop() {
            if !seen.insert(cursor_key(cursor)) {
                continue;
            }
            out.push(cursor);
            let mut children = child_cursors(cursor, root);
            children.reverse();
            stack.extend(children);
        }
    }
    out
}

fn apply_step<'a, N: SourceNode<'a>>(step: &StepKind, cursor: Cursor<N>, root: N) -> Vec<Cursor<N>> {
    match step {
        StepKind::Current => vec![cursor],
        StepKind::Parent => match cursor {
            Cursor::Document => Vec::new(),
            Cursor::Element(node) => vec![node.parent().map_or(Cursor::Document, Cursor::Element)],
        },
        StepKind::Child { test, predicates } => {
            let mut candidates: Vec<N> = child_cursors(cursor, root)
                .into_iter()
                .filter_map(|c| match c {
                    Cursor::Element(node) => Some(node),
                    Cursor::Document => None,
                })
                .filter(|node| match test {
                    NameTest::Any => true,
                    NameTest::Name(name) => node.tag() == name,
                })
                .collect();

            for predicate in predicates {
                candidates = match predicate {
                    Predicate::Position(n) => candidates.get(n - 1).copied().into_iter().collect(),
                    Predicate::Last => candidates.last().copied().into_iter().collect(),
                    Predicate::HasAttr(name) => candidates
                        .into_iter()
                        .filter(|node| node.attr(name).is_some())
                        .collect(),
                    Predicate::AttrEq(name, value) => candidates
                        .into_iter()
                        .filter(|node| node.attr(name) == Some(value.as_str()))
                        .collect(),
                };
            }

            candidates.into_iter().map(Cursor::Element).collect()
        }
    }
}
