//! `##<path.` file inclusion
//!
//! Paths are written with a four-rule escape so they survive inside a
//! directive:
//!
//! | in the path | written as |
//! |---|---|
//! | `\\` | `//` |
//! | `..` | `\\` |
//! | `\` | `..` |
//! | `.` | `\.` |
//!
//! so `\\server\users\opp\sample.h` is written `//server..users..opp..sample\.h`.
//!
//! An included file is processed by a child preprocessor that shares the
//! parent's macros and variables. The child starts from the parent's brace
//! counters and random seed with its own line numbering; only the brace
//! counters flow back when it finishes.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use super::Preprocessor;
use crate::common::ErrorKind;

/// (path text, escaped text), longest path text first
const ESCAPE_RULES: [(&str, &str); 4] = [("\\\\", "//"), ("..", "\\\\"), ("\\", ".."), (".", "\\.")];

/// (escaped text, path text)
const UNESCAPE_RULES: [(&str, &str); 4] = [("//", "\\\\"), ("\\\\", ".."), ("..", "\\"), ("\\.", ".")];

/// Escape a path for use in an include directive
pub fn escape_path(path: &str) -> String {
    translate(path, &ESCAPE_RULES)
}

/// Decode the escaped path of an include directive
pub fn unescape_path(escaped: &str) -> String {
    translate(escaped, &UNESCAPE_RULES)
}

/// Single left-to-right pass; output of one rule is never fed to another
fn translate(text: &str, rules: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while let Some(ch) = rest.chars().next() {
        for (from, to) in rules {
            if let Some(after) = rest.strip_prefix(from) {
                result.push_str(to);
                rest = after;
                continue 'scan;
            }
        }
        result.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    result
}

impl Preprocessor {
    /// Handle `##<...` ; `directive` starts at the `<`
    pub(super) fn process_include(&mut self, directive: &str) -> Result<Option<String>, ErrorKind> {
        let escaped = directive
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| ErrorKind::InvalidIncludeSyntax {
                directive: directive.to_string(),
            })?;

        if self.include_depth >= self.config.max_include_depth {
            return Err(ErrorKind::IncludeDepthExceeded {
                limit: self.config.max_include_depth,
            });
        }

        let filename = unescape_path(escaped);
        let (path, content) = self.read_include(&filename)?;
        debug!("line {}: including {}", self.line, path.display());

        let mut child = self.child(path.clone());
        let result = child
            .process_body(&content)
            .map_err(|err| ErrorKind::Included {
                file: path.clone(),
                source: Box::new(err),
            })?;

        self.braces = child.braces;
        debug!("finished {}, braces now {:?}", path.display(), self.braces);

        Ok((!result.is_empty()).then_some(result))
    }

    /// Read `filename` as given, then relative to the current file's directory
    fn read_include(&self, filename: &str) -> Result<(PathBuf, String), ErrorKind> {
        let direct = PathBuf::from(filename);
        let mut last_error = match fs::read_to_string(&direct) {
            Ok(content) => return Ok((direct, content)),
            Err(err) => err,
        };

        if let Some(dir) = self.current_file.as_deref().and_then(Path::parent) {
            let relative = dir.join(filename);
            match fs::read_to_string(&relative) {
                Ok(content) => return Ok((relative, content)),
                Err(err) => last_error = err,
            }
        }

        Err(ErrorKind::FileNotFound {
            path: direct,
            source: last_error,
        })
    }

    /// A preprocessor for an included file
    fn child(&self, file: PathBuf) -> Self {
        Self {
            symbols: Rc::clone(&self.symbols),
            random: self.random,
            braces: self.braces,
            line: 1,
            current_file: Some(file),
            include_depth: self.include_depth + 1,
            config: self.config.clone(),
        }
    }
}
