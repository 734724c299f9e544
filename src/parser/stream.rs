//! Token-stream parser that dispatches block tags to compile functions

use std::collections::HashMap;

use crate::engine::{CompileFn, Library};
use crate::error::{ParseError, TagSyntaxError};
use crate::parser::ast::{Node, NodeList, TagToken};
use crate::parser::grammar;
use crate::parser::lexer::{tokenize, Lexeme, MarkupToken};

/// Parser over one template's markup tokens.
///
/// Compile functions receive a `&mut Parser` so they can consume nested
/// content with [`Parser::parse_until`] and then [`Parser::consume_end_tag`].
pub struct Parser<'a> {
    tokens: Vec<Lexeme>,
    pos: usize,
    tags: HashMap<String, CompileFn>,
    libraries: &'a HashMap<String, Library>,
    /// Tags whose compile functions are currently running, innermost last
    open: Vec<TagToken>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, builtins: &Library, libraries: &'a HashMap<String, Library>) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            tags: builtins.tag_table().clone(),
            libraries,
            open: Vec::new(),
        }
    }

    /// Parse the whole template
    pub fn parse(&mut self) -> Result<NodeList, ParseError> {
        self.parse_until(&[])
    }

    /// Parse nodes until one of `ends` is the next tag, leaving it unconsumed.
    ///
    /// With a non-empty `ends`, running out of input is an error.
    pub fn parse_until(&mut self, ends: &[&str]) -> Result<NodeList, ParseError> {
        let mut nodes = Vec::new();

        while let Some(lexeme) = self.tokens.get(self.pos) {
            let line = lexeme.line;
            match &lexeme.token {
                MarkupToken::Text(text) => {
                    nodes.push(Node::Text(text.clone()));
                    self.pos += 1;
                }
                MarkupToken::Variable { contents, offset } => {
                    let expr = grammar::parse_variable(contents, *offset, line)?;
                    nodes.push(Node::Variable(expr));
                    self.pos += 1;
                }
                MarkupToken::Block(tag) => {
                    if ends.contains(&tag.name.as_str()) {
                        return Ok(NodeList::new(nodes));
                    }
                    let tag = tag.clone();
                    self.pos += 1;

                    let compile = self.tags.get(&tag.name).cloned().ok_or_else(|| {
                        ParseError::InvalidBlockTag {
                            name: tag.name.clone(),
                            span: tag.span.clone(),
                            line: tag.line,
                            expected: ends.iter().map(|e| e.to_string()).collect(),
                        }
                    })?;

                    self.open.push(tag.clone());
                    let node = compile(self, &tag);
                    self.open.pop();
                    nodes.push(node?);
                }
            }
        }

        if ends.is_empty() {
            return Ok(NodeList::new(nodes));
        }

        let expected: Vec<String> = ends.iter().map(|e| e.to_string()).collect();
        Err(match self.open.last() {
            Some(open) => ParseError::UnclosedTag {
                tag: open.name.clone(),
                span: open.span.clone(),
                line: open.line,
                expected,
            },
            None => ParseError::UnclosedTag {
                tag: String::new(),
                span: self.end_span(),
                line: self.tokens.last().map(|l| l.line).unwrap_or(1),
                expected,
            },
        })
    }

    /// Consume the tag that stopped the last [`Parser::parse_until`]
    pub fn consume_end_tag(&mut self) -> Option<TagToken> {
        match self.tokens.get(self.pos) {
            Some(Lexeme {
                token: MarkupToken::Block(tag),
                ..
            }) => {
                let tag = tag.clone();
                self.pos += 1;
                Some(tag)
            }
            _ => None,
        }
    }

    /// Make a named library's tags available for the rest of this parse
    pub fn load_library(&mut self, name: &str, token: &TagToken) -> Result<(), TagSyntaxError> {
        let library = self.libraries.get(name).ok_or_else(|| {
            TagSyntaxError::new(
                token.name.as_str(),
                token.span.clone(),
                token.line,
                format!("'{}' is not a registered tag library", name),
            )
        })?;
        for (tag, compile) in library.tag_table() {
            self.tags.insert(tag.clone(), compile.clone());
        }
        Ok(())
    }

    /// Whether a tag name is currently known to this parser
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    fn end_span(&self) -> std::ops::Range<usize> {
        let end = self.tokens.last().map(|l| l.span.end).unwrap_or(0);
        end..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<NodeList, ParseError> {
        let builtins = crate::engine::builtins::library();
        let libraries = HashMap::new();
        Parser::new(source, &builtins, &libraries).parse()
    }

    #[test]
    fn test_text_and_variables() {
        let nodes = parse("Hello {{ name }}!").expect("Should parse");
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes.iter().next(), Some(Node::Text(t)) if t == "Hello "));
    }

    #[test]
    fn test_unknown_tag() {
        let err = parse("{% hr/ %}").unwrap_err();
        assert_eq!(err.to_string(), "Invalid block tag on line 1: 'hr/'");
    }

    #[test]
    fn test_unknown_tag_inside_block_lists_expected() {
        let err = parse("{% if x %}\n{% bogus %}{% endif %}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid block tag on line 2: 'bogus', expected 'else' or 'endif'"
        );
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("a\n{% if x %}b").unwrap_err();
        match err {
            ParseError::UnclosedTag { tag, line, .. } => {
                assert_eq!(tag, "if");
                assert_eq!(line, 2);
            }
            other => panic!("Expected UnclosedTag, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_end_tag() {
        let err = parse("{% endif %}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidBlockTag { ref name, .. } if name == "endif"));
    }

    #[test]
    fn test_load_unknown_library() {
        let err = parse("{% load widgets %}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'widgets' is not a registered tag library in 'load' on line 1"
        );
    }

    #[test]
    fn test_load_makes_tags_available() {
        let builtins = crate::engine::builtins::library();
        let mut widgets = Library::new();
        widgets.tag("hr/", |_parser, _token| Ok(Node::Empty));
        let mut libraries = HashMap::new();
        libraries.insert("widgets".to_string(), widgets);

        let mut parser = Parser::new("{% load widgets %}{% hr/ %}", &builtins, &libraries);
        assert!(!parser.has_tag("hr/"));
        let nodes = parser.parse().expect("Should parse");
        assert!(parser.has_tag("hr/"));
        assert_eq!(nodes.len(), 2);
    }
}
