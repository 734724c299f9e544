//! Grammar for tag arguments and variables, using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::TagSyntaxError;
use crate::parser::ast::{Expr, Filter, FilterKind, Primary, Span, Spanned, TagToken};
use crate::parser::lexer::{self, Token};
use crate::value::Value;

/// `name=expr` as written in a component tag
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordArg {
    pub name: Spanned<String>,
    pub value: Expr,
}

/// `x in items` from a `for` tag
#[derive(Debug, Clone, PartialEq)]
pub struct ForHeader {
    pub variable: Spanned<String>,
    pub iterable: Expr,
}

/// `[not] expr` from an `if` tag
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub negated: bool,
    pub expr: Expr,
}

// Filters come out of the grammar unchecked; names and arity are validated
// afterwards so the error points at the offending filter.
#[derive(Debug, Clone)]
struct RawFilter {
    name: String,
    arg: Option<Primary>,
    span: Span,
}

#[derive(Debug, Clone)]
struct RawExpr {
    primary: Primary,
    filters: Vec<RawFilter>,
    span: Span,
}

impl RawExpr {
    fn check(self, tag: &str, line: usize) -> Result<Expr, TagSyntaxError> {
        let filters = self
            .filters
            .into_iter()
            .map(|raw| {
                let kind = FilterKind::from_name(&raw.name).ok_or_else(|| {
                    TagSyntaxError::new(
                        tag,
                        raw.span.clone(),
                        line,
                        format!("Invalid filter: '{}'", raw.name),
                    )
                })?;
                let message = match (kind.takes_arg(), raw.arg.is_some()) {
                    (true, false) => Some(format!("Filter '{}' requires an argument", raw.name)),
                    (false, true) => Some(format!(
                        "Filter '{}' does not accept an argument",
                        raw.name
                    )),
                    _ => None,
                };
                match message {
                    Some(message) => Err(TagSyntaxError::new(tag, raw.span, line, message)),
                    None => Ok(Filter {
                        kind,
                        arg: raw.arg,
                        span: raw.span,
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expr {
            primary: self.primary,
            filters,
            span: self.span,
        })
    }
}

// Lexes `$text`, feeds the tokens to `$parser` and maps the first error to a
// TagSyntaxError attributed to `$tag`.
macro_rules! run_parser {
    ($parser:expr, $tag:expr, $line:expr, $text:expr, $offset:expr) => {{
        let tag: &str = $tag;
        let line: usize = $line;
        let text: &str = $text;
        let offset: usize = $offset;
        let end = offset + text.len();

        let tokens = lexer::lex(text, offset).map_err(|span| {
            TagSyntaxError::new(tag, span, line, "Unexpected character")
        })?;
        let token_iter = tokens
            .into_iter()
            .map(|(tok, span): (Token, Span)| (tok, SimpleSpan::from(span)));
        let token_stream =
            Stream::from_iter(token_iter).map((end..end).into(), |(t, s): (_, _)| (t, s));

        $parser
            .parse(token_stream)
            .into_result()
            .map_err(|errs| match errs.into_iter().next() {
                Some(err) => TagSyntaxError::from_rich(tag, line, err),
                None => TagSyntaxError::new(tag, offset..end, line, "Invalid syntax"),
            })
    }};
}

/// Parse the keyword arguments of a component tag
pub fn parse_kwargs(token: &TagToken) -> Result<Vec<KeywordArg>, TagSyntaxError> {
    let raw = run_parser!(
        kwargs_parser(),
        &token.name,
        token.line,
        token.args(),
        token.args_offset
    )?;
    raw.into_iter()
        .map(|(name, value)| -> Result<KeywordArg, TagSyntaxError> {
            Ok(KeywordArg {
                name,
                value: value.check(&token.name, token.line)?,
            })
        })
        .collect()
}

/// Parse the header of a `for` tag
pub fn parse_for(token: &TagToken) -> Result<ForHeader, TagSyntaxError> {
    let (variable, iterable) = run_parser!(
        for_parser(),
        &token.name,
        token.line,
        token.args(),
        token.args_offset
    )?;
    Ok(ForHeader {
        variable,
        iterable: iterable.check(&token.name, token.line)?,
    })
}

/// Parse the condition of an `if` tag
pub fn parse_condition(token: &TagToken) -> Result<Condition, TagSyntaxError> {
    let (negated, expr) = run_parser!(
        condition_parser(),
        &token.name,
        token.line,
        token.args(),
        token.args_offset
    )?;
    Ok(Condition {
        negated,
        expr: expr.check(&token.name, token.line)?,
    })
}

/// Parse the contents of a `{{ ... }}` variable
pub fn parse_variable(contents: &str, offset: usize, line: usize) -> Result<Expr, TagSyntaxError> {
    let label = format!("{{{{ {} }}}}", contents);
    let raw = run_parser!(
        expression_parser().then_ignore(end()),
        &label,
        line,
        contents,
        offset
    )?;
    raw.check(&label, line)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn primary_parser<'a, I>() -> impl Parser<'a, I, Primary, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let literal = select! {
        Token::String(s) => Primary::Literal(Value::String(s)),
        Token::Integer(n) => Primary::Literal(Value::Int(n)),
        Token::Float(f) => Primary::Literal(Value::Float(f)),
    };

    // Path segments after a dot may be list indices
    let segment = select! {
        Token::Ident(s) => s,
        Token::Integer(n) => n.to_string(),
    };

    let lookup = select! { Token::Ident(s) => s }
        .then(
            just(Token::Dot)
                .ignore_then(segment)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(head, rest)| match (head.as_str(), rest.is_empty()) {
            ("True", true) => Primary::Literal(Value::Bool(true)),
            ("False", true) => Primary::Literal(Value::Bool(false)),
            ("None", true) => Primary::Literal(Value::Null),
            _ => {
                let mut segments = vec![head];
                segments.extend(rest);
                Primary::Lookup(segments)
            }
        });

    choice((literal, lookup))
}

fn expression_parser<'a, I>() -> impl Parser<'a, I, RawExpr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let filter = just(Token::Pipe)
        .ignore_then(select! { Token::Ident(s) => s })
        .then(just(Token::Colon).ignore_then(primary_parser()).or_not())
        .map_with(|(name, arg), e| RawFilter {
            name,
            arg,
            span: span_range(&e.span()),
        });

    primary_parser()
        .then(filter.repeated().collect::<Vec<_>>())
        .map_with(|(primary, filters), e| RawExpr {
            primary,
            filters,
            span: span_range(&e.span()),
        })
}

fn identifier<'a, I>() -> impl Parser<'a, I, Spanned<String>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! { Token::Ident(s) => s }.map_with(|s, e| Spanned::new(s, span_range(&e.span())))
}

fn kwargs_parser<'a, I>(
) -> impl Parser<'a, I, Vec<(Spanned<String>, RawExpr)>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    identifier()
        .then_ignore(just(Token::Equals))
        .then(expression_parser())
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn for_parser<'a, I>(
) -> impl Parser<'a, I, (Spanned<String>, RawExpr), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    identifier()
        .then_ignore(just(Token::Ident("in".to_string())))
        .then(expression_parser())
        .then_ignore(end())
}

fn condition_parser<'a, I>() -> impl Parser<'a, I, (bool, RawExpr), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    just(Token::Ident("not".to_string()))
        .or_not()
        .map(|not| not.is_some())
        .then(expression_parser())
        .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(contents: &str) -> TagToken {
        TagToken::new(contents.to_string(), 3, 0..contents.len() + 6, 1)
    }

    #[test]
    fn test_parse_no_kwargs() {
        let args = parse_kwargs(&tag("hr/")).expect("Should parse");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_kwargs() {
        let args = parse_kwargs(&tag(r#"button/ value="Save" size=3 user=request.user"#))
            .expect("Should parse");
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].name.node, "value");
        assert_eq!(
            args[0].value.primary,
            Primary::Literal(Value::String("Save".to_string()))
        );
        assert_eq!(args[1].value.primary, Primary::Literal(Value::Int(3)));
        assert_eq!(
            args[2].value.primary,
            Primary::Lookup(vec!["request".to_string(), "user".to_string()])
        );
    }

    #[test]
    fn test_kwarg_spans_are_absolute() {
        // contents start at offset 3; "alert/" is 6 bytes, then a space
        let args = parse_kwargs(&tag("alert/ message=m")).expect("Should parse");
        assert_eq!(args[0].name.span, 10..17);
    }

    #[test]
    fn test_parse_kwarg_with_filters() {
        let args = parse_kwargs(&tag(r#"card title=name|default:"Untitled"|upper"#))
            .expect("Should parse");
        let filters = &args[0].value.filters;
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].kind, FilterKind::Default);
        assert_eq!(
            filters[0].arg,
            Some(Primary::Literal(Value::String("Untitled".to_string())))
        );
        assert_eq!(filters[1].kind, FilterKind::Upper);
    }

    #[test]
    fn test_literal_keywords() {
        let args = parse_kwargs(&tag("x/ a=True b=False c=None")).expect("Should parse");
        assert_eq!(args[0].value.primary, Primary::Literal(Value::Bool(true)));
        assert_eq!(args[1].value.primary, Primary::Literal(Value::Bool(false)));
        assert_eq!(args[2].value.primary, Primary::Literal(Value::Null));
    }

    #[test]
    fn test_positional_argument_rejected() {
        let err = parse_kwargs(&tag(r#"button/ "Save""#)).unwrap_err();
        assert_eq!(err.tag, "button/");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_missing_value_rejected() {
        let err = parse_kwargs(&tag("button/ value=")).unwrap_err();
        assert_eq!(err.tag, "button/");
        assert!(err.message.starts_with("Unexpected"), "got: {}", err.message);
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let err = parse_kwargs(&tag("button/ value=x|shout")).unwrap_err();
        assert_eq!(err.message, "Invalid filter: 'shout'");
    }

    #[test]
    fn test_filter_arity_checked() {
        let err = parse_kwargs(&tag("button/ value=x|default")).unwrap_err();
        assert_eq!(err.message, "Filter 'default' requires an argument");
        let err = parse_kwargs(&tag("button/ value=x|upper:1")).unwrap_err();
        assert_eq!(err.message, "Filter 'upper' does not accept an argument");
    }

    #[test]
    fn test_unexpected_character() {
        let err = parse_kwargs(&tag("button/ value=@")).unwrap_err();
        assert_eq!(err.message, "Unexpected character");
    }

    #[test]
    fn test_parse_for_header() {
        let header = parse_for(&tag("for item in inventory.items")).expect("Should parse");
        assert_eq!(header.variable.node, "item");
        assert_eq!(
            header.iterable.primary,
            Primary::Lookup(vec!["inventory".to_string(), "items".to_string()])
        );
    }

    #[test]
    fn test_parse_for_requires_in() {
        assert!(parse_for(&tag("for item inventory")).is_err());
    }

    #[test]
    fn test_parse_condition() {
        let cond = parse_condition(&tag("if not user.is_admin")).expect("Should parse");
        assert!(cond.negated);
        let cond = parse_condition(&tag("if slots.summary")).expect("Should parse");
        assert!(!cond.negated);
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_variable("items.0|length", 0, 1).expect("Should parse");
        assert_eq!(
            expr.primary,
            Primary::Lookup(vec!["items".to_string(), "0".to_string()])
        );
        assert_eq!(expr.filters[0].kind, FilterKind::Length);
    }

    #[test]
    fn test_parse_empty_variable_fails() {
        let err = parse_variable("", 2, 4).unwrap_err();
        assert_eq!(err.line, 4);
    }
}
