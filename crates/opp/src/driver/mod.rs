//! File and stream orchestration

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::common::{DiagnosticReporter, PreprocessResult};
use crate::preprocessor::{Preprocessor, PreprocessorConfig};

/// Path that stands for standard input
pub const STDIN_PATH: &str = "-";

/// What to process and how
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    /// `None` or `-` reads standard input
    pub input: Option<PathBuf>,
    /// `None` writes standard output
    pub output: Option<PathBuf>,
    /// Pre-seeded `(name, value)` definitions
    pub defines: Vec<(String, String)>,
    pub config: PreprocessorConfig,
}

/// Split a `NAME[=VALUE]` command-line definition; the value defaults to `1`
pub fn parse_define(define: &str) -> (String, String) {
    match define.split_once('=') {
        Some((name, value)) => (name.to_string(), value.to_string()),
        None => (define.to_string(), "1".to_string()),
    }
}

/// Runs one preprocessing job end to end
pub struct Driver {
    options: DriverOptions,
}

impl Driver {
    pub fn new(options: DriverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    fn input_file(&self) -> Option<&Path> {
        self.options
            .input
            .as_deref()
            .filter(|path| *path != Path::new(STDIN_PATH))
    }

    /// Process `source` with the configured defines
    ///
    /// When the input is a file it becomes the base for relative includes.
    pub fn preprocess(&self, source: &str) -> PreprocessResult<String> {
        let mut preprocessor =
            Preprocessor::with_defines(self.options.config.clone(), self.options.defines.iter().cloned());
        if let Some(path) = self.input_file() {
            preprocessor.set_current_file(path);
        }
        preprocessor.process(source)
    }

    /// Read, process and write, rendering a diagnostic on failure
    pub fn run(&self) -> Result<()> {
        let (name, source) = self.read_input()?;
        info!("read {} bytes from {}", source.len(), name);

        let output = match self.preprocess(&source) {
            Ok(output) => output,
            Err(err) => {
                let mut reporter = DiagnosticReporter::new();
                let file_id = reporter.add_file(name, source);
                reporter.report_error(file_id, &err);
                return Err(err.into());
            }
        };

        self.write_output(&output)
    }

    fn read_input(&self) -> Result<(String, String)> {
        match self.input_file() {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok((path.display().to_string(), source))
            }
            None => {
                let mut source = String::new();
                io::stdin()
                    .read_to_string(&mut source)
                    .context("failed to read standard input")?;
                Ok(("<stdin>".to_string(), source))
            }
        }
    }

    fn write_output(&self, output: &str) -> Result<()> {
        match &self.options.output {
            Some(path) => {
                fs::write(path, output)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("wrote {} bytes to {}", output.len(), path.display());
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(output.as_bytes())
                    .and_then(|()| stdout.flush())
                    .context("failed to write standard output")?;
            }
        }
        Ok(())
    }
}
