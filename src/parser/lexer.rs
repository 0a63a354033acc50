//! Lexer for directive headers using logos
//!
//! Only the first token of a directive line matters: the directive keyword.
//! Everything after it is the raw argument and is sliced from the line by the
//! grammar, so spacing inside arguments (regex patterns) survives untouched.

use logos::Logos;

use crate::parser::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[token("@target", ignore(ascii_case))]
    Target,
    #[token("@line", ignore(ascii_case))]
    Line,
    #[token("@lines", ignore(ascii_case))]
    Lines,
    #[token("@match", ignore(ascii_case))]
    Match,
    #[token("@append", ignore(ascii_case))]
    Append,
    #[token("@prepend", ignore(ascii_case))]
    Prepend,

    // Any other word after the marker, e.g. `@colour` or a bare `@`
    #[regex(r"@[^ \t\r\n\f]*", |lex| lex.slice()[1..].to_string())]
    Unknown(String),
}

impl Token {
    /// Whether a content block follows this directive
    pub fn takes_block(&self) -> bool {
        !matches!(self, Token::Target)
    }

    /// Lowercase directive name as written after `@`
    pub fn name(&self) -> &str {
        match self {
            Token::Target => "target",
            Token::Line => "line",
            Token::Lines => "lines",
            Token::Match => "match",
            Token::Append => "append",
            Token::Prepend => "prepend",
            Token::Unknown(name) => name,
        }
    }
}

/// Lex the directive keyword at the start of `line`
///
/// Returns `None` when the line does not start with a directive marker.
pub fn lex_directive(line: &str) -> Option<(Token, Span)> {
    if !line.starts_with('@') {
        return None;
    }
    let mut lexer = Token::lexer(line);
    match lexer.next() {
        Some(Ok(tok)) => Some((tok, lexer.span())),
        _ => None,
    }
}
