//! Compile functions for inline and block component tags

use std::sync::Arc;

use tracing::debug;

use crate::component::{partition_slots, Argument, ComponentDescriptor, ComponentNode};
use crate::error::{ParseError, TagSyntaxError};
use crate::parser::{parse_kwargs, Node, Parser, TagToken};

/// `{% name/ key=expr ... %}`: a node with no slots
pub fn compile_inline(
    descriptor: &Arc<ComponentDescriptor>,
    token: &TagToken,
) -> Result<Node, ParseError> {
    let arguments = parse_arguments(token)?;
    debug!(tag = %token.name, args = arguments.len(), "Compiled inline component");
    Ok(Node::Component(ComponentNode::new(
        descriptor.clone(),
        token.name.as_str(),
        arguments,
        Vec::new(),
        token.span.clone(),
    )))
}

/// `{% name key=expr ... %}...{% /name %}`: nested content becomes slots
pub fn compile_block(
    descriptor: &Arc<ComponentDescriptor>,
    parser: &mut Parser<'_>,
    token: &TagToken,
) -> Result<Node, ParseError> {
    let arguments = parse_arguments(token)?;

    let (_, close) = descriptor.block_tag_names();
    let content = parser.parse_until(&[close.as_str()])?;
    parser.consume_end_tag();

    let slots = partition_slots(token, content)?;
    debug!(
        tag = %token.name,
        args = arguments.len(),
        slots = slots.len(),
        "Compiled block component"
    );

    Ok(Node::Component(ComponentNode::new(
        descriptor.clone(),
        token.name.as_str(),
        arguments,
        slots,
        token.span.clone(),
    )))
}

/// Keyword arguments of a component tag; each name may appear once
fn parse_arguments(token: &TagToken) -> Result<Vec<Argument>, TagSyntaxError> {
    let mut arguments: Vec<Argument> = Vec::new();
    for kwarg in parse_kwargs(token)? {
        if arguments.iter().any(|a| a.name == kwarg.name.node) {
            return Err(TagSyntaxError::new(
                token.name.as_str(),
                kwarg.name.span,
                token.line,
                format!("'{}' received multiple values for keyword argument '{}'", token.name, kwarg.name.node),
            ));
        }
        let span = kwarg.name.span.start..kwarg.value.span.end;
        arguments.push(Argument {
            name: kwarg.name.node,
            value: kwarg.value,
            span,
        });
    }
    Ok(arguments)
}
