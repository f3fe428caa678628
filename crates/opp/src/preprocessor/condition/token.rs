//! Token definitions for condition expressions

use std::ops::Range;

use logos::Logos;

/// Token with its byte range in the expression
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Token kinds of the `~NAME|~(...)` condition language
///
/// Whitespace is not skipped: it belongs to the surrounding name text and is
/// trimmed by the evaluator where the grammar allows it.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[token("~")]
    Tilde,
    #[token("|")]
    Bar,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    /// Anything else up to the next operator character
    #[regex(r"[^~|()]+")]
    Text,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Tilde => write!(f, "'~'"),
            TokenKind::Bar => write!(f, "'|'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Text => write!(f, "text"),
        }
    }
}
