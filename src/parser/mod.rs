//! Template parser: markup lexer, tag-argument grammar and the token stream

pub mod ast;
mod grammar;
pub mod lexer;
mod stream;

pub use ast::*;
pub use grammar::{parse_condition, parse_for, parse_kwargs, parse_variable, Condition, ForHeader, KeywordArg};
pub use stream::Parser;
