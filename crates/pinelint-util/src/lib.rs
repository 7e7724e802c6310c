//! Shared types for the pinelint pipeline: source positions and the
//! diagnostic model used by every later stage.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticCode, Report, Severity};
pub use span::Span;
