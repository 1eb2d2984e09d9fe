//! Expression fragment decoding.
//!
//! URProgram stores expressions as a flat list of typed fragments:
//!
//! ```xml
//! <expression>
//!   <ExpressionChar character="x"/>
//!   <ExpressionToken token=" &gt; "/>
//!   <ExpressionVariable><ProgramVariable reference="..."/></ExpressionVariable>
//! </expression>
//! ```
//!
//! Decoding folds the fragments into one display string. Unknown fragments
//! show up as `"?"` rather than disappearing.

use crate::resolve::{Resolver, UNKNOWN};
use crate::tree::SourceNode;

/// How `ExpressionVariable` fragments are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariableLookup {
    /// Inline `name` on the nested variable element, else its reference.
    #[default]
    Full,
    /// Only the first reference-bearing variable element inside the
    /// fragment, resolved through its reference.
    ReferenceOnly,
}

/// Decode an `expression` element. A missing expression decodes to `"?"`.
pub fn decode_expression<'a, N: SourceNode<'a>>(
    expression: Option<N>,
    resolver: &mut Resolver<'a, N>,
    lookup: VariableLookup,
) -> String {
    let Some(expression) = expression else {
        return UNKNOWN.to_string();
    };

    let mut out = String::new();
    for fragment in expression.elements() {
        decode_fragment(fragment, resolver, lookup, &mut out);
    }
    out.trim().to_string()
}

fn decode_fragment<'a, N: SourceNode<'a>>(
    fragment: N,
    resolver: &mut Resolver<'a, N>,
    lookup: VariableLookup,
    out: &mut String,
) {
    match fragment.tag() {
        "ExpressionChar" => out.push_str(fragment.attr("character").unwrap_or("")),
        "ExpressionToken" => out.push_str(&token_text(fragment.attr("token").unwrap_or(""))),
        "ExpressionVariable" => {
            let name = match lookup {
                VariableLookup::Full => fragment
                    .elements()
                    .next()
                    .map(|variable| resolver.variable_name(variable)),
                VariableLookup::ReferenceOnly => first_reference_variable(fragment)
                    .map(|variable| resolver.reference_name(variable)),
            };
            out.push_str(name.unwrap_or(UNKNOWN));
        }
        "ExpressionGeomFeature" => {
            let name = fragment
                .find("feature")
                .and_then(|feature| feature.attr("referencedName"));
            out.push_str(name.unwrap_or(UNKNOWN));
        }
        _ => out.push_str(UNKNOWN),
    }
}

/// Trim a token, keeping one space on each side that had whitespace so
/// operators such as `" = "` stay separated from their operands.
fn token_text(raw: &str) -> String {
    let core = raw.trim();
    if core.is_empty() {
        return if raw.is_empty() { String::new() } else { " ".to_string() };
    }
    let lead = if raw.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if raw.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{lead}{core}{trail}")
}

fn first_reference_variable<'a, N: SourceNode<'a>>(node: N) -> Option<N> {
    node.elements().find_map(|child| {
        if child.tag().ends_with("Variable") && child.attr("reference").is_some() {
            Some(child)
        } else {
            first_reference_variable(child)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(xml: &str, lookup: VariableLookup) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        let mut resolver = Resolver::new();
        decode_expression(root.find("expression"), &mut resolver, lookup)
    }

    #[test]
    fn test_char_token_variable() {
        let xml = r#"<Assignment><expression>
            <ExpressionChar character="X"/>
            <ExpressionToken token=" = "/>
            <ExpressionVariable><ProgramVariable name="Y"/></ExpressionVariable>
        </expression></Assignment>"#;
        assert_eq!(decode(xml, VariableLookup::Full), "X = Y");
    }

    #[test]
    fn test_token_whitespace_is_collapsed() {
        assert_eq!(token_text("  and   "), " and ");
        assert_eq!(token_text("True"), "True");
        assert_eq!(token_text("   "), " ");
        assert_eq!(token_text(""), "");
    }

    #[test]
    fn test_variable_by_reference() {
        let xml = r#"<Program>
            <variables><ProgramVariable name="speed"/></variables>
            <If><expression>
                <ExpressionVariable><ProgramVariable reference="../../../variables/ProgramVariable"/></ExpressionVariable>
                <ExpressionChar character="&gt;"/>
                <ExpressionChar character="1"/>
            </expression></If>
        </Program>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let node = doc.root_element().child("If").unwrap();
        let mut resolver = Resolver::new();
        let text = decode_expression(node.find("expression"), &mut resolver, VariableLookup::Full);
        assert_eq!(text, "speed>1");
    }

    #[test]
    fn test_geom_feature_and_unknown_fragments() {
        let xml = r#"<Move><expression>
            <ExpressionGeomFeature><feature referencedName="Plane_1"/></ExpressionGeomFeature>
            <ExpressionGeomFeature/>
            <ExpressionFunction name="sin"/>
            <ExpressionVariable/>
        </expression></Move>"#;
        assert_eq!(decode(xml, VariableLookup::Full), "Plane_1???");
    }

    #[test]
    fn test_missing_expression() {
        assert_eq!(decode("<Assignment/>", VariableLookup::Full), "?");
        assert_eq!(decode("<Assignment><expression/></Assignment>", VariableLookup::Full), "");
    }

    #[test]
    fn test_reference_only_ignores_inline_names() {
        let xml = r#"<Script><expression>
            <ExpressionChar character="popup("/>
            <ExpressionVariable><ProgramVariable name="inline"/></ExpressionVariable>
            <ExpressionChar character=")"/>
        </expression></Script>"#;
        assert_eq!(decode(xml, VariableLookup::ReferenceOnly), "popup(?)");
        assert_eq!(decode(xml, VariableLookup::Full), "popup(inline)");
    }
}
