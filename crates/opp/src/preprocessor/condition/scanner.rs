//! Condition lexer using logos

use super::token::{Token, TokenKind};
use logos::Logos;

/// Lexer for condition expressions
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
        }
    }

    /// Tokenize the entire expression
    ///
    /// Every character is covered by some token kind, so lexing cannot fail;
    /// a rejected slice would be folded into `Text` all the same.
    pub fn tokenize_all(self) -> Vec<Token> {
        self.inner
            .spanned()
            .map(|(kind, span)| Token::new(kind.unwrap_or(TokenKind::Text), span))
            .collect()
    }
}

/// Byte offset of the rightmost `|` not enclosed in parentheses
pub fn top_level_separator(expr: &str) -> Option<usize> {
    let mut depth = 0i32;
    for token in Lexer::new(expr).tokenize_all().iter().rev() {
        match token.kind {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen => depth -= 1,
            TokenKind::Bar if depth == 0 => return Some(token.span.start),
            _ => {}
        }
    }
    None
}
