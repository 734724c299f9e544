//! Slot tags and partitioning of block bodies into slots

use crate::component::DEFAULT_SLOT_NAME;
use crate::engine::RenderContext;
use crate::error::{ParseError, RenderError, TagSyntaxError};
use crate::parser::{Node, NodeList, Parser, Span, TagToken};
use crate::value::Value;

/// Closing tag of a slot marker
pub const SLOT_END_TAG: &str = "/slot";

/// A named region of a component invocation's body
#[derive(Debug)]
pub struct Slot {
    pub name: String,
    pub content: NodeList,
}

impl Slot {
    pub fn new(name: impl Into<String>, content: NodeList) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_SLOT_NAME
    }
}

/// `{% slot [name] %}...{% /slot %}`
#[derive(Debug)]
pub struct SlotMarkerNode {
    pub name: String,
    pub content: NodeList,
    pub span: Span,
    pub line: usize,
}

impl SlotMarkerNode {
    /// Render the filled slot of the same name when the enclosing component
    /// template received one, otherwise this marker's own content
    pub fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        if let Some(filled) = filled_slot(rc, &self.name) {
            out.push_str(&filled);
            return Ok(());
        }
        self.content.render(rc, out)
    }
}

/// `{% slot/ [name] %}`: output of a filled slot, or nothing
#[derive(Debug)]
pub struct SlotOutputNode {
    pub name: String,
}

impl SlotOutputNode {
    pub fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) {
        if let Some(filled) = filled_slot(rc, &self.name) {
            out.push_str(&filled);
        }
    }
}

/// Non-empty slot content passed to the component template being rendered
fn filled_slot(rc: &RenderContext<'_>, name: &str) -> Option<String> {
    match rc.scope().get("slots") {
        Some(Value::Slots(slots)) if slots.is_filled(name) => Some(slots.get(name).to_string()),
        _ => None,
    }
}

/// Slot name from a slot tag's arguments; at most one is allowed
fn slot_name(token: &TagToken) -> Result<String, TagSyntaxError> {
    let bits = token.bits();
    if bits.len() > 2 {
        let extra: Vec<String> = bits[2..].iter().map(|b| format!("'{}'", b)).collect();
        return Err(TagSyntaxError::new(
            token.name.as_str(),
            token.span.clone(),
            token.line,
            format!("'{}' tag got unexpected arguments [{}]", token.name, extra.join(", ")),
        ));
    }
    Ok(bits
        .get(1)
        .map(|name| name.to_string())
        .unwrap_or_else(|| DEFAULT_SLOT_NAME.to_string()))
}

/// Compile function for the block slot marker
pub fn compile_slot(parser: &mut Parser<'_>, token: &TagToken) -> Result<Node, ParseError> {
    let name = slot_name(token)?;
    let content = parser.parse_until(&[SLOT_END_TAG])?;
    parser.consume_end_tag();
    Ok(Node::Slot(SlotMarkerNode {
        name,
        content,
        span: token.span.clone(),
        line: token.line,
    }))
}

/// Compile function for the inline slot output
pub fn compile_slot_output(_parser: &mut Parser<'_>, token: &TagToken) -> Result<Node, ParseError> {
    let name = slot_name(token)?;
    Ok(Node::SlotOutput(SlotOutputNode { name }))
}

/// Split a block body into slots: the default slot first, then named slots in
/// source order.
///
/// Named markers are found anywhere in the body, including inside `if`, `for`
/// and other markers, and are moved out of the content they sat in. A
/// top-level marker using the default name is spliced back into the default
/// slot where it stands. Naming the same slot twice is an error attributed
/// to `tag`.
pub fn partition_slots(tag: &TagToken, content: NodeList) -> Result<Vec<Slot>, TagSyntaxError> {
    let mut markers = Vec::new();
    let mut remainder = Vec::new();

    for node in content.into_vec() {
        match node {
            Node::Slot(marker) if marker.name == DEFAULT_SLOT_NAME => {
                remainder.extend(collect_markers(marker.content.into_vec(), &mut markers));
            }
            other => remainder.extend(collect_markers(vec![other], &mut markers)),
        }
    }

    let mut slots = Vec::with_capacity(markers.len() + 1);
    slots.push(Slot::new(DEFAULT_SLOT_NAME, NodeList::new(remainder)));
    for marker in markers {
        if slots[1..].iter().any(|slot| slot.name == marker.name) {
            return Err(TagSyntaxError::new(
                tag.name.as_str(),
                marker.span,
                marker.line,
                format!("Slot '{}' is declared more than once", marker.name),
            ));
        }
        slots.push(Slot::new(marker.name, marker.content));
    }
    Ok(slots)
}

/// Move named markers out of `nodes` into `markers`, in source order.
/// Component invocations are not entered; their markers are already theirs.
fn collect_markers(nodes: Vec<Node>, markers: &mut Vec<SlotMarkerNode>) -> Vec<Node> {
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Slot(mut marker) => {
                let mut inner = Vec::new();
                marker.content = collect_in(marker.content, &mut inner);
                if marker.name == DEFAULT_SLOT_NAME {
                    kept.push(Node::Slot(marker));
                } else {
                    markers.push(marker);
                }
                markers.extend(inner);
            }
            Node::If(mut node) => {
                node.then_branch = collect_in(node.then_branch, markers);
                node.else_branch = collect_in(node.else_branch, markers);
                kept.push(Node::If(node));
            }
            Node::For(mut node) => {
                node.body = collect_in(node.body, markers);
                node.empty = collect_in(node.empty, markers);
                kept.push(Node::For(node));
            }
            other => kept.push(other),
        }
    }
    kept
}

fn collect_in(list: NodeList, markers: &mut Vec<SlotMarkerNode>) -> NodeList {
    NodeList::new(collect_markers(list.into_vec(), markers))
}
