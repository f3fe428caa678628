//! The OPP engine
//!
//! Input is processed one line at a time. Lines starting with `##` are
//! directives; everything else is emitted after macro expansion, provided
//! every enclosing conditional block is active.

pub mod condition;
pub mod conditional;
pub mod directive;
pub mod dynamic;
pub mod expand;
pub mod include;
pub mod macros;

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::common::{ErrorKind, PreprocessError, PreprocessResult};
use condition::ConditionEvaluator;
use conditional::ConditionalStack;
use directive::{Directive, DIRECTIVE_MARKER};
use dynamic::{BraceCounters, DynamicContext, PseudoRandom};
use expand::{ExpansionLimits, Expander};
use macros::{Macro, SharedSymbols, SymbolTable};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessorConfig {
    /// Initial seed of the `##$` sequence
    pub seed: u32,
    /// Rescans allowed per line before giving up
    pub max_expansion_passes: usize,
    /// Longest a line may grow during expansion, in bytes
    pub max_expanded_len: usize,
    pub max_include_depth: usize,
}

impl PreprocessorConfig {
    pub fn expansion_limits(&self) -> ExpansionLimits {
        ExpansionLimits {
            max_passes: self.max_expansion_passes,
            max_len: self.max_expanded_len,
        }
    }
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        let limits = ExpansionLimits::default();
        Self {
            seed: 42,
            max_expansion_passes: limits.max_passes,
            max_expanded_len: limits.max_len,
            max_include_depth: 64,
        }
    }
}

/// OPP preprocessor instance
pub struct Preprocessor {
    symbols: SharedSymbols,
    random: PseudoRandom,
    braces: BraceCounters,
    /// 1-based line in the current file
    line: usize,
    /// File being processed, for relative includes
    current_file: Option<PathBuf>,
    include_depth: usize,
    config: PreprocessorConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self {
            symbols: SymbolTable::shared(),
            random: PseudoRandom::new(config.seed),
            braces: BraceCounters::default(),
            line: 1,
            current_file: None,
            include_depth: 0,
            config,
        }
    }

    /// Create a preprocessor with each `(name, value)` pre-defined
    pub fn with_defines<I, K, V>(config: PreprocessorConfig, defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut preprocessor = Self::new(config);
        for (name, value) in defines {
            preprocessor.define(name.as_ref(), value.as_ref());
        }
        preprocessor
    }

    /// Mark `name` defined; a non-empty `value` also becomes its object-like body
    pub fn define(&mut self, name: &str, value: &str) {
        let mut symbols = self.symbols.borrow_mut();
        if value.is_empty() {
            if !name.is_empty() {
                symbols.variables.insert(name.to_string());
            }
        } else {
            symbols.define_macro(Macro::object(name, value));
        }
    }

    /// Remove a variable and its macro; predefined macros are kept
    pub fn undefine(&mut self, name: &str) {
        self.symbols.borrow_mut().undefine(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.symbols.borrow().is_defined(name)
    }

    /// Body of the macro called `name`, if any
    pub fn macro_body(&self, name: &str) -> Option<String> {
        self.symbols.borrow().macros.get(name).map(|m| m.body.clone())
    }

    pub fn set_current_file(&mut self, path: impl Into<PathBuf>) {
        self.current_file = Some(path.into());
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn brace_counters(&self) -> BraceCounters {
        self.braces
    }

    pub fn random_seed(&self) -> u32 {
        self.random.seed()
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    /// Process a complete text
    ///
    /// A trailing newline on the input is kept on the output.
    pub fn process(&mut self, input: &str) -> PreprocessResult<String> {
        let mut output = self.process_body(input)?;
        if input.ends_with('\n') {
            output.push('\n');
        }
        Ok(output)
    }

    pub fn process_reader(&mut self, mut reader: impl Read) -> PreprocessResult<String> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        self.process(&input)
    }

    pub fn process_to_writer(
        &mut self,
        reader: impl Read,
        mut writer: impl Write,
    ) -> PreprocessResult<()> {
        let output = self.process_reader(reader)?;
        writer.write_all(output.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read and process `path`, resolving relative includes against it
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> PreprocessResult<String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.set_current_file(path);
        self.process(&content)
    }

    /// Process text without its trailing newline; output lines are joined by `\n`
    fn process_body(&mut self, input: &str) -> PreprocessResult<String> {
        let input = input.strip_suffix('\n').unwrap_or(input);
        let mut stack = ConditionalStack::new();
        let mut output: Vec<String> = Vec::new();

        for (index, line) in input.split('\n').enumerate() {
            self.line = index + 1;

            let produced = self
                .process_line(line, &mut stack)
                .map_err(|kind| PreprocessError::at_line(self.line, kind))?;
            if let Some(text) = produced {
                output.push(text);
            }

            self.braces.update(line);
        }

        if let Some(frame) = stack.top() {
            return Err(PreprocessError::at_line(
                frame.opened_at,
                ErrorKind::UnclosedConditional,
            ));
        }

        debug!(
            "processed {} lines of {}",
            self.line,
            self.current_file
                .as_deref()
                .map_or_else(|| "<input>".into(), |p| p.display().to_string())
        );
        Ok(output.join("\n"))
    }

    /// One input line; `None` when it produces no output
    fn process_line(
        &mut self,
        line: &str,
        stack: &mut ConditionalStack,
    ) -> Result<Option<String>, ErrorKind> {
        let trimmed = line.trim();

        if let Some(directive) = trimmed.strip_prefix(DIRECTIVE_MARKER) {
            return self.process_directive(Directive::classify(directive), trimmed, stack);
        }

        if !stack.should_process() {
            return Ok(None);
        }

        self.expand_line(line).map(Some)
    }

    /// Stored macros to a fixed point, then the dynamic ones
    fn expand_line(&mut self, line: &str) -> Result<String, ErrorKind> {
        let expanded = {
            let symbols = self.symbols.borrow();
            Expander::new(&symbols.macros, self.config.expansion_limits()).expand(line)?
        };

        let mut ctx = DynamicContext {
            line: self.line,
            braces: self.braces,
            random: &mut self.random,
        };
        Ok(ctx.expand(&expanded))
    }

    fn evaluate_condition(&self, expr: &str) -> Result<bool, ErrorKind> {
        let symbols = self.symbols.borrow();
        ConditionEvaluator::new(&symbols.variables).evaluate(expr)
    }

    /// Handle on the symbol storage this instance shares with its includes
    pub fn symbols(&self) -> SharedSymbols {
        Rc::clone(&self.symbols)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessorConfig::default())
    }
}
