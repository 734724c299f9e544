//! Tags available in every template

use crate::component::{compile_slot, compile_slot_output};
use crate::engine::Library;
use crate::error::{ParseError, TagSyntaxError};
use crate::parser::{parse_condition, parse_for, ForNode, IfNode, Node, NodeList, Parser, TagToken};

/// The builtin library: `if`, `for`, `load` and the slot tags
pub fn library() -> Library {
    let mut library = Library::new();
    library
        .tag("if", compile_if)
        .tag("for", compile_for)
        .tag("load", compile_load)
        .tag("slot", compile_slot)
        .tag("slot/", compile_slot_output);
    library
}

fn compile_if(parser: &mut Parser<'_>, token: &TagToken) -> Result<Node, ParseError> {
    let condition = parse_condition(token)?;
    let then_branch = parser.parse_until(&["else", "endif"])?;

    let else_branch = match parser.consume_end_tag() {
        Some(end) if end.name == "else" => {
            let nodes = parser.parse_until(&["endif"])?;
            parser.consume_end_tag();
            nodes
        }
        _ => NodeList::default(),
    };

    Ok(Node::If(IfNode {
        negated: condition.negated,
        condition: condition.expr,
        then_branch,
        else_branch,
    }))
}

fn compile_for(parser: &mut Parser<'_>, token: &TagToken) -> Result<Node, ParseError> {
    let header = parse_for(token)?;
    let body = parser.parse_until(&["empty", "endfor"])?;

    let empty = match parser.consume_end_tag() {
        Some(end) if end.name == "empty" => {
            let nodes = parser.parse_until(&["endfor"])?;
            parser.consume_end_tag();
            nodes
        }
        _ => NodeList::default(),
    };

    Ok(Node::For(ForNode {
        variable: header.variable.node,
        iterable: header.iterable,
        body,
        empty,
    }))
}

fn compile_load(parser: &mut Parser<'_>, token: &TagToken) -> Result<Node, ParseError> {
    let bits = token.bits();
    if bits.len() < 2 {
        return Err(TagSyntaxError::new(
            token.name.as_str(),
            token.span.clone(),
            token.line,
            "'load' tag requires at least one library name",
        )
        .into());
    }
    for name in &bits[1..] {
        parser.load_library(name, token)?;
    }
    Ok(Node::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags() {
        assert_eq!(
            library().tag_names(),
            vec!["for", "if", "load", "slot", "slot/"]
        );
    }

    #[test]
    fn test_if_requires_condition() {
        let engine = crate::engine::Engine::new();
        let err = engine.compile("{% if %}x{% endif %}").unwrap_err();
        assert!(matches!(err, ParseError::Tag(ref e) if e.tag == "if"));
    }

    #[test]
    fn test_load_requires_name() {
        let engine = crate::engine::Engine::new();
        let err = engine.compile("{% load %}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'load' tag requires at least one library name in 'load' on line 1"
        );
    }
}
