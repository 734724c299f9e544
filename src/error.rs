//! Error types for template compilation and component rendering

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Malformed syntax inside a single tag or variable, detected at compile time
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} in '{tag}' on line {line}")]
pub struct TagSyntaxError {
    /// Concrete tag name as written in the source (`alert/`, `foo:bar`, `slot`)
    pub tag: String,
    pub span: Span,
    pub line: usize,
    pub message: String,
    pub expected: Vec<String>,
}

impl TagSyntaxError {
    pub fn new(tag: impl Into<String>, span: Span, line: usize, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            span,
            line,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    /// Build from the first chumsky error produced while parsing a tag fragment
    pub(crate) fn from_rich(tag: &str, line: usize, err: chumsky::error::Rich<'_, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of tag".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of tag".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        Self {
            tag: tag.to_string(),
            span: err.span().into_range(),
            line,
            message,
            expected,
        }
    }
}

/// Errors that abort compilation of a whole template
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A `{% name %}` tag that no active library registers
    #[error("Invalid block tag on line {line}: '{name}'{}", expected_suffix(.expected))]
    InvalidBlockTag {
        name: String,
        span: Span,
        line: usize,
        expected: Vec<String>,
    },

    /// End of input reached while looking for a closing tag
    #[error("Unclosed tag on line {line}: '{tag}'. Looking for one of: {}", .expected.join(", "))]
    UnclosedTag {
        tag: String,
        span: Span,
        line: usize,
        expected: Vec<String>,
    },

    #[error(transparent)]
    Tag(#[from] TagSyntaxError),
}

fn expected_suffix(expected: &[String]) -> String {
    if expected.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = expected.iter().map(|e| format!("'{}'", e)).collect();
    format!(", expected {}", quoted.join(" or "))
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidBlockTag { span, .. } | ParseError::UnclosedTag { span, .. } => {
                span.clone()
            }
            ParseError::Tag(err) => err.span.clone(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidBlockTag { line, .. } | ParseError::UnclosedTag { line, .. } => *line,
            ParseError::Tag(err) => err.line,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let span = self.span();

        let label_message = match self {
            ParseError::InvalidBlockTag { .. } => {
                "did you forget to register or load this tag?".to_string()
            }
            ParseError::UnclosedTag { expected, .. } => {
                format!("this tag is never closed; expected {}", expected.join(" or "))
            }
            ParseError::Tag(err) if err.expected.is_empty() => err.message.clone(),
            ParseError::Tag(err) => {
                format!("{}\nExpected: {}", err.message, err.expected.join(", "))
            }
        };

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label_message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Why resolved arguments could not be bound to a component's signature
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("got an unexpected keyword argument '{0}'")]
    Unexpected(String),

    /// Raised by a component's own context-data code
    #[error("{0}")]
    Custom(String),
}

/// Resolved arguments do not match a component's data-production contract
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{component} component {cause}")]
pub struct ComponentValidationError {
    /// Canonical (un-namespaced) component name
    pub component: String,
    #[source]
    pub cause: BindingError,
}

/// No template source knows the requested logical name
#[derive(Error, Debug, Clone, PartialEq)]
#[error("template not found: {name}")]
pub struct TemplateNotFoundError {
    pub name: String,
    /// Locations that were checked, in order
    pub tried: Vec<String>,
}

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Validation(#[from] ComponentValidationError),

    #[error(transparent)]
    TemplateNotFound(#[from] TemplateNotFoundError),

    /// A template loaded during rendering failed to compile
    #[error("error compiling template '{name}': {error}")]
    Compile {
        name: String,
        #[source]
        error: ParseError,
    },

    /// Nested template renders went deeper than the configured limit
    #[error("recursion limit of {limit} exceeded while rendering '{template}'")]
    RecursionLimit { template: String, limit: usize },
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Integer(n) => format!("number {}", n),
        Token::Float(n) => format!("number {}", n),
        Token::Equals => "'='".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Dot => "'.'".to_string(),
    }
}
