//! Condition evaluation for `##~` and `##@` directives
//!
//! A condition is one or more `~`-prefixed terms. `~NAME` tests whether a
//! variable is defined and `~(...)` groups a sub-expression. Two terms joined
//! by `|` combine as NAND, so `~A|~B` holds unless both are defined.

mod evaluator;
mod scanner;
mod token;

pub use evaluator::ConditionEvaluator;
pub use scanner::{top_level_separator, Lexer};
pub use token::{Token, TokenKind};
