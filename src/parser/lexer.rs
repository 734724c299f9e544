//! Lexers for template markup and for tag/variable contents, using logos

use logos::Logos;

use super::ast::{Span, TagToken};

/// Top-level markup: text, `{{ }}`, `{% %}` and `{# #}`
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    #[regex(r"\{\{([^}]|\}[^}])*\}\}")]
    Variable,

    #[regex(r"\{%([^%]|%[^}])*%\}")]
    Block,

    #[regex(r"\{#([^#]|#[^}])*#\}")]
    Comment,

    #[regex(r"[^{]+")]
    Text,

    // A brace that does not start a complete delimiter is plain text
    #[token("{")]
    Brace,
}

/// A markup-level token
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupToken {
    Text(String),
    /// `{{ contents }}`; `offset` is the absolute position of the trimmed contents
    Variable { contents: String, offset: usize },
    Block(TagToken),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: MarkupToken,
    pub span: Span,
    pub line: usize,
}

/// Split template source into markup tokens.
///
/// Comments are dropped, unterminated delimiters are kept as text and
/// adjacent text pieces are merged.
pub fn tokenize(source: &str) -> Vec<Lexeme> {
    let mut lexemes: Vec<Lexeme> = Vec::new();
    let mut line = 1;
    let mut lexer = Markup::lexer(source);

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();

        match kind {
            Ok(Markup::Variable) => {
                let (contents, offset) = inner(slice, span.start);
                lexemes.push(Lexeme {
                    token: MarkupToken::Variable { contents, offset },
                    span: span.clone(),
                    line,
                });
            }
            Ok(Markup::Block) => {
                let (contents, offset) = inner(slice, span.start);
                lexemes.push(Lexeme {
                    token: MarkupToken::Block(TagToken::new(contents, offset, span.clone(), line)),
                    span: span.clone(),
                    line,
                });
            }
            Ok(Markup::Comment) => {}
            Ok(Markup::Text) | Ok(Markup::Brace) | Err(()) => {
                push_text(&mut lexemes, slice, span.clone(), line);
            }
        }

        line += slice.matches('\n').count();
    }

    lexemes
}

/// Trimmed contents between two-character delimiters, with their absolute offset
fn inner(slice: &str, start: usize) -> (String, usize) {
    let body = &slice[2..slice.len() - 2];
    let leading = body.len() - body.trim_start().len();
    (body.trim().to_string(), start + 2 + leading)
}

fn push_text(lexemes: &mut Vec<Lexeme>, slice: &str, span: Span, line: usize) {
    if let Some(Lexeme {
        token: MarkupToken::Text(text),
        span: last,
        ..
    }) = lexemes.last_mut()
    {
        if last.end == span.start {
            text.push_str(slice);
            last.end = span.end;
            return;
        }
    }
    lexemes.push(Lexeme {
        token: MarkupToken::Text(slice.to_string()),
        span,
        line,
    });
}

/// Tokens inside a tag's argument list or a variable
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token("=")]
    Equals,
    #[token("|")]
    Pipe,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),
}

/// Strip surrounding quotes and resolve backslash escapes
fn unquote(quoted: &str) -> String {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Lex a fragment into tokens with absolute spans.
///
/// Returns the span of the first unrecognized input on failure.
pub fn lex(input: &str, offset: usize) -> Result<Vec<(Token, Span)>, Span> {
    let mut tokens: Vec<(Token, Span)> = Vec::new();
    for (tok, range) in Token::lexer(input).spanned() {
        let span = range.start + offset..range.end + offset;
        match tok {
            // `a.0.1` is two index segments, not a float
            Ok(Token::Float(_)) if matches!(tokens.last(), Some((Token::Dot, _))) => {
                let slice = &input[range];
                let Some((left, right)) = slice.split_once('.') else {
                    return Err(span);
                };
                let (Ok(first), Ok(second)) = (left.parse::<i64>(), right.parse::<i64>()) else {
                    return Err(span);
                };
                let dot = span.start + left.len();
                tokens.push((Token::Integer(first), span.start..dot));
                tokens.push((Token::Dot, dot..dot + 1));
                tokens.push((Token::Integer(second), dot + 1..span.end));
            }
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}
