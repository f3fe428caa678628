//! Macro expansion engine
//!
//! A line is rescanned left to right until a full pass makes no substitution,
//! so an expansion may itself contain further macro references. Function-like
//! bodies are rendered against their positional arguments with three operators:
//!
//! - `#N` inserts argument `N` verbatim
//! - `#"#N` inserts argument `N` as a double-quoted string literal
//! - `#'#N` inserts argument `N` as a single-quoted character literal

use log::trace;

use super::macros::{Macro, MacroTable};
use crate::common::ErrorKind;

/// Bounds on a single line's expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_passes: usize,
    pub max_len: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_passes: 1024,
            max_len: 1 << 20,
        }
    }
}

/// A parsed `NAME(...)` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub args: Vec<String>,
    /// Bytes from the opening parenthesis through the closing one
    pub len: usize,
}

/// Expands object-like and function-like macros over a line
pub struct Expander<'a> {
    macros: &'a MacroTable,
    limits: ExpansionLimits,
}

impl<'a> Expander<'a> {
    pub fn new(macros: &'a MacroTable, limits: ExpansionLimits) -> Self {
        Self { macros, limits }
    }

    /// Expand `line` to a fixed point
    pub fn expand(&self, line: &str) -> Result<String, ErrorKind> {
        let mut result = line.to_string();

        for pass in 1..=self.limits.max_passes {
            let Some(next) = self.expand_pass(&result) else {
                return Ok(result);
            };
            trace!("expand pass {}: {:?}", pass, next);

            if next.len() > self.limits.max_len {
                return Err(ErrorKind::MacroExpansionLimitExceeded {
                    passes: pass,
                    len: next.len(),
                });
            }
            result = next;
        }

        Err(ErrorKind::MacroExpansionLimitExceeded {
            passes: self.limits.max_passes,
            len: result.len(),
        })
    }

    /// One left-to-right pass; `None` if nothing was substituted
    fn expand_pass(&self, text: &str) -> Option<String> {
        let mut result = String::with_capacity(text.len());
        let mut changed = false;
        let mut pos = 0;

        while let Some(ch) = text[pos..].chars().next() {
            match self.match_at(&text[pos..]) {
                Some((replacement, consumed)) => {
                    result.push_str(&replacement);
                    pos += consumed;
                    changed = true;
                }
                None => {
                    result.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }

        changed.then_some(result)
    }

    /// Try every macro at the start of `rest`, returning the replacement and bytes consumed
    fn match_at(&self, rest: &str) -> Option<(String, usize)> {
        for mac in self.macros.candidates() {
            let Some(after) = rest.strip_prefix(mac.name.as_str()) else {
                continue;
            };

            if mac.function_like {
                if let Some(call) = parse_call(after) {
                    return Some((render_call(mac, &call.args), mac.name.len() + call.len));
                }
            } else if !after.chars().next().is_some_and(is_word_char) {
                return Some((mac.body.clone(), mac.name.len()));
            }
        }
        None
    }
}

fn render_call(mac: &Macro, args: &[String]) -> String {
    trace!("{}({:?})", mac.name, args);
    render_body(&mac.body, args)
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Parse `(arg, arg, ...)` at the start of `text`
///
/// Commas nested inside parentheses do not split. Arguments are trimmed; `()`
/// yields no arguments at all. Returns `None` if `text` does not start with
/// `(` or the parentheses never balance.
pub fn parse_call(text: &str) -> Option<MacroCall> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }

    let mut depth = 1usize;
    let mut args = Vec::new();
    let mut arg_start = 1;

    for (i, &byte) in bytes.iter().enumerate().skip(1) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    let arg = text[arg_start..i].trim();
                    if !arg.is_empty() || !args.is_empty() {
                        args.push(arg.to_string());
                    }
                    return Some(MacroCall { args, len: i + 1 });
                }
            }
            b',' if depth == 1 => {
                args.push(text[arg_start..i].trim().to_string());
                arg_start = i + 1;
            }
            _ => {}
        }
    }

    None
}

/// Render a function-like body against its arguments
pub fn render_body(body: &str, args: &[String]) -> String {
    let mut result = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(idx) = rest.find('#') {
        result.push_str(&rest[..idx]);
        let op = &rest[idx..];
        let bytes = op.as_bytes();

        // #"#N and #'#N
        if bytes.len() >= 4
            && matches!(bytes[1], b'"' | b'\'')
            && bytes[2] == b'#'
            && bytes[3].is_ascii_digit()
        {
            let quote = bytes[1] as char;
            let arg = args.get(usize::from(bytes[3] - b'0')).map_or("", String::as_str);
            result.push_str(&quote_literal(arg, quote));
            rest = &op[4..];
            continue;
        }

        // #N, left alone when there is no such argument
        if bytes.len() >= 2 && bytes[1].is_ascii_digit() {
            match args.get(usize::from(bytes[1] - b'0')) {
                Some(arg) => result.push_str(arg),
                None => result.push_str(&op[..2]),
            }
            rest = &op[2..];
            continue;
        }

        result.push('#');
        rest = &op[1..];
    }

    result.push_str(rest);
    result
}

/// Wrap `arg` in `quote`, escaping backslashes first and then the quote itself
pub fn quote_literal(arg: &str, quote: char) -> String {
    let escaped = arg
        .replace('\\', "\\\\")
        .replace(quote, &format!("\\{}", quote));
    format!("{quote}{escaped}{quote}")
}
