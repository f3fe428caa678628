//! Directive classification and dispatch
//!
//! A directive is a line whose first non-whitespace content is `##`. The
//! character after the marker picks the directive:
//!
//! | text | directive |
//! |---|---|
//! | `##.` | close the innermost conditional |
//! | `##@` / `##@cond` | else / else-if |
//! | `##~cond` | open a conditional |
//! | `##<path.` | include a file |
//! | `##:NAME body` | define a macro |
//! | `##-NAME` | undefine |
//! | `##i`, `##_`, `##$`, `##{`, `##}` | predefined macro on a line of its own |

use log::debug;

use super::conditional::ConditionalStack;
use super::dynamic::{DynamicContext, DynamicMacro};
use super::macros::{parse_definition, IMAGINARY_UNIT, IMAGINARY_UNIT_NAME};
use super::Preprocessor;
use crate::common::ErrorKind;

/// Prefix that marks a directive line
pub const DIRECTIVE_MARKER: &str = "##";

/// Predefined macros usable as a whole-line directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedMacro {
    /// `##i`
    ImaginaryUnit,
    Dynamic(DynamicMacro),
}

impl PredefinedMacro {
    pub fn from_text(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some('i'), None) => Some(Self::ImaginaryUnit),
            (Some(marker), None) => DynamicMacro::from_marker(marker).map(Self::Dynamic),
            _ => None,
        }
    }
}

/// A classified directive; `'a` borrows the text after the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    Close,
    /// `condition` is the text after `@`, if any
    Else { condition: Option<&'a str> },
    /// `condition` includes its leading `~`
    Open { condition: &'a str },
    /// `payload` includes its leading `<`
    Include { payload: &'a str },
    Define { definition: &'a str },
    /// Whitespace around `name` is kept
    Undefine { name: &'a str },
    Predefined(PredefinedMacro),
    Unknown,
}

impl<'a> Directive<'a> {
    /// Classify the text following `##`
    pub fn classify(directive: &'a str) -> Self {
        if directive == "." {
            return Self::Close;
        }

        match directive.chars().next() {
            Some('@') => Self::Else {
                condition: Some(&directive[1..]).filter(|c| !c.is_empty()),
            },
            Some('~') => Self::Open {
                condition: directive,
            },
            Some('<') => Self::Include { payload: directive },
            Some(':') => Self::Define {
                definition: &directive[1..],
            },
            Some('-') => Self::Undefine {
                name: &directive[1..],
            },
            _ => PredefinedMacro::from_text(directive).map_or(Self::Unknown, Self::Predefined),
        }
    }
}

impl Preprocessor {
    /// Carry out one directive; `line` is the trimmed source line
    pub(super) fn process_directive(
        &mut self,
        directive: Directive<'_>,
        line: &str,
        stack: &mut ConditionalStack,
    ) -> Result<Option<String>, ErrorKind> {
        match directive {
            Directive::Close => {
                let frame = stack.pop()?;
                debug!("line {}: close block opened at line {}", self.line, frame.opened_at);
                Ok(None)
            }

            Directive::Else { condition } => {
                stack.toggle_else()?;
                if let Some(condition) = condition {
                    let active = self.evaluate_condition(condition)?;
                    stack.replace_top(active)?;
                }
                debug!("line {}: else, now active={}", self.line, stack.should_process());
                Ok(None)
            }

            Directive::Open { condition } => {
                let active = self.evaluate_condition(condition)?;
                stack.push(active, self.line);
                debug!("line {}: open block {:?} = {}", self.line, condition, active);
                Ok(None)
            }

            // Everything below only takes effect inside active regions
            _ if !stack.should_process() => Ok(None),

            Directive::Include { payload } => self.process_include(payload),

            Directive::Define { definition } => {
                let mac = parse_definition(definition);
                debug!("line {}: define {:?}", self.line, mac);
                self.symbols.borrow_mut().define_macro(mac);
                Ok(None)
            }

            Directive::Undefine { name } => {
                debug!("line {}: undefine {:?}", self.line, name);
                self.symbols.borrow_mut().undefine(name);
                Ok(None)
            }

            Directive::Predefined(mac) => Ok(Some(self.render_predefined(mac))),

            Directive::Unknown => Err(ErrorKind::UnknownDirective {
                directive: line.to_string(),
            }),
        }
    }

    fn render_predefined(&mut self, mac: PredefinedMacro) -> String {
        match mac {
            PredefinedMacro::ImaginaryUnit => self
                .symbols
                .borrow()
                .macros
                .get(IMAGINARY_UNIT_NAME)
                .map_or_else(|| IMAGINARY_UNIT.to_string(), |m| m.body.clone()),
            PredefinedMacro::Dynamic(dynamic) => {
                let mut ctx = DynamicContext {
                    line: self.line,
                    braces: self.braces,
                    random: &mut self.random,
                };
                ctx.render(dynamic, 0)
            }
        }
    }
}
