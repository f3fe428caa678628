//! OPP - the Obfuscated Pre-Processor
//!
//! A line-oriented text preprocessor with macros, NAND-only conditional
//! compilation, escaped-path file inclusion and a handful of context
//! dependent predefined macros.
//!
//! ## Architecture
//!
//! - **Preprocessor** (`preprocessor/`): the engine, split into condition
//!   evaluation, the conditional stack, macro storage, expansion, dynamic
//!   macros, directive dispatch and include resolution
//! - **Driver** (`driver/`): file and stream orchestration for the CLI
//! - **Common** (`common/`): errors and diagnostics

pub mod common;
pub mod driver;
pub mod preprocessor;

// Re-exports for convenience
pub use common::{DiagnosticReporter, ErrorKind, PreprocessError, PreprocessResult};
pub use driver::{Driver, DriverOptions};
pub use preprocessor::include::{escape_path, unescape_path};
pub use preprocessor::{Preprocessor, PreprocessorConfig};
