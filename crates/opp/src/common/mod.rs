//! Common infrastructure shared by the engine and the driver

mod error;

pub use error::{DiagnosticReporter, ErrorKind, PreprocessError, PreprocessResult};
