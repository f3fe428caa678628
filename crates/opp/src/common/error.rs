//! Error types and diagnostic reporting

use std::io;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

/// What went wrong, without the line it went wrong on
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("invalid include syntax: ##{directive}")]
    InvalidIncludeSyntax { directive: String },

    #[error("cannot read file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("term must start with ~: {term}")]
    MalformedTerm { term: String },

    #[error("no matching conditional to close")]
    UnmatchedClose,

    #[error("##@ without matching conditional")]
    DanglingElse,

    #[error("unknown directive: {directive}")]
    UnknownDirective { directive: String },

    #[error("unclosed conditional block")]
    UnclosedConditional,

    #[error("macro expansion did not settle within {passes} passes ({len} bytes)")]
    MacroExpansionLimitExceeded { passes: usize, len: usize },

    #[error("includes nested deeper than {limit} levels")]
    IncludeDepthExceeded { limit: usize },

    #[error("error processing included file {}: {source}", file.display())]
    Included {
        file: PathBuf,
        #[source]
        source: Box<PreprocessError>,
    },
}

/// Preprocessing error
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("line {line}: {kind}")]
    Line { line: usize, kind: ErrorKind },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PreprocessError {
    pub fn at_line(line: usize, kind: ErrorKind) -> Self {
        Self::Line { line, kind }
    }

    /// 1-based line in the file that was being processed
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }

    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Line { kind, .. } => Some(kind),
            Self::Io(_) => None,
        }
    }

    /// Follow `Included` wrappers down to the error that started it all
    pub fn root_cause(&self) -> &PreprocessError {
        match self {
            Self::Line {
                kind: ErrorKind::Included { source, .. },
                ..
            } => source.root_cause(),
            _ => self,
        }
    }
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Build the diagnostic for `error` against the file registered as `file_id`
    pub fn diagnostic(&self, file_id: usize, error: &PreprocessError) -> Diagnostic<usize> {
        match error {
            PreprocessError::Line { line, kind } => {
                let mut diagnostic = Diagnostic::error().with_message(kind.to_string());

                // Line 0 never happens for engine errors, but an empty source has no line 1 either
                if let Ok(range) = self.files.line_range(file_id, line.saturating_sub(1)) {
                    let message = match kind {
                        ErrorKind::Included { .. } => "included here",
                        ErrorKind::UnclosedConditional => "conditional opened here",
                        _ => "while processing this line",
                    };
                    diagnostic = diagnostic
                        .with_labels(vec![Label::primary(file_id, range).with_message(message)]);
                }

                if let ErrorKind::Included { .. } = kind {
                    diagnostic = diagnostic
                        .with_notes(vec![format!("caused by: {}", error.root_cause())]);
                }

                diagnostic
            }

            PreprocessError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {}", err))
            }
        }
    }

    pub fn report_error(&self, file_id: usize, error: &PreprocessError) {
        let diagnostic = self.diagnostic(file_id, error);
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_prefix_in_message() {
        let err = PreprocessError::at_line(3, ErrorKind::UnmatchedClose);
        assert_eq!(err.to_string(), "line 3: no matching conditional to close");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_included_wraps_inner_error() {
        let inner = PreprocessError::at_line(2, ErrorKind::DanglingElse);
        let err = PreprocessError::at_line(
            5,
            ErrorKind::Included {
                file: PathBuf::from("inc.h"),
                source: Box::new(inner),
            },
        );
        assert_eq!(
            err.to_string(),
            "line 5: error processing included file inc.h: line 2: ##@ without matching conditional"
        );
        assert_eq!(err.root_cause().line(), Some(2));
    }

    #[test]
    fn test_diagnostic_labels_failing_line() {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("main.c", "first\n##.\nthird\n");
        let err = PreprocessError::at_line(2, ErrorKind::UnmatchedClose);

        let diagnostic = reporter.diagnostic(file_id, &err);
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.labels[0].range, 6..10);
    }

    #[test]
    fn test_diagnostic_without_source_line() {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("empty.c", "");
        let err = PreprocessError::at_line(9, ErrorKind::UnclosedConditional);

        let diagnostic = reporter.diagnostic(file_id, &err);
        assert!(diagnostic.labels.is_empty());
        assert_eq!(diagnostic.message, "unclosed conditional block");
    }
}
