//! Syntax tree types for compiled templates

use crate::component::{ComponentNode, SlotMarkerNode, SlotOutputNode};
use crate::value::Value;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A `{% ... %}` token, as handed to compile functions
#[derive(Debug, Clone, PartialEq)]
pub struct TagToken {
    /// First whitespace-separated word of the contents
    pub name: String,
    /// Everything between the delimiters, trimmed
    pub contents: String,
    /// Span of the whole token including delimiters
    pub span: Span,
    /// 1-based line of the opening delimiter
    pub line: usize,
    /// Absolute offset of the text following the tag name
    pub args_offset: usize,
}

impl TagToken {
    /// `contents_offset` is the absolute offset of the trimmed contents
    pub fn new(contents: String, contents_offset: usize, span: Span, line: usize) -> Self {
        let name = contents
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        let args_offset = contents_offset + name.len();
        Self {
            name,
            contents,
            span,
            line,
            args_offset,
        }
    }

    /// The text after the tag name
    pub fn args(&self) -> &str {
        &self.contents[self.name.len()..]
    }

    /// Whitespace-separated words, tag name included
    pub fn bits(&self) -> Vec<&str> {
        self.contents.split_whitespace().collect()
    }
}

/// Leading value of an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    Literal(Value),
    /// Dotted lookup such as `user.name` or `items.0`
    Lookup(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Default,
    Upper,
    Lower,
    Title,
    Length,
    Safe,
    Escape,
}

impl FilterKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(FilterKind::Default),
            "upper" => Some(FilterKind::Upper),
            "lower" => Some(FilterKind::Lower),
            "title" => Some(FilterKind::Title),
            "length" => Some(FilterKind::Length),
            "safe" => Some(FilterKind::Safe),
            "escape" => Some(FilterKind::Escape),
            _ => None,
        }
    }

    pub fn takes_arg(self) -> bool {
        matches!(self, FilterKind::Default)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub kind: FilterKind,
    pub arg: Option<Primary>,
    pub span: Span,
}

/// An unresolved host expression: `primary|filter|filter:arg`
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub primary: Primary,
    pub filters: Vec<Filter>,
    pub span: Span,
}

/// One compiled template node
#[derive(Debug)]
pub enum Node {
    Text(String),
    /// `{{ expr }}`
    Variable(Expr),
    If(IfNode),
    For(ForNode),
    /// A component invocation, inline or block form
    Component(ComponentNode),
    /// `{% slot name %}...{% /slot %}`
    Slot(SlotMarkerNode),
    /// `{% slot/ name %}`
    SlotOutput(SlotOutputNode),
    /// Renders nothing (`load`)
    Empty,
}

#[derive(Debug)]
pub struct IfNode {
    pub negated: bool,
    pub condition: Expr,
    pub then_branch: NodeList,
    pub else_branch: NodeList,
}

#[derive(Debug)]
pub struct ForNode {
    pub variable: String,
    pub iterable: Expr,
    pub body: NodeList,
    /// Rendered instead of the body when the iterable is empty
    pub empty: NodeList,
}

/// An ordered sequence of nodes; the content tree of a template or block
#[derive(Debug, Default)]
pub struct NodeList(Vec<Node>);

impl NodeList {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.0
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
