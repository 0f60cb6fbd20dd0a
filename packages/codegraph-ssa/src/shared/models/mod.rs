//! Shared models

mod diagnostic;
mod error;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticTag, Severity};
pub use error::{CodegraphError, ErrorKind, Result};
pub use span::Span;
