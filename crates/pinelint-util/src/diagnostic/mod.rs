//! The diagnostic model shared by every pipeline stage: severities, the
//! closed code registry, the `Diagnostic` value itself, and the `Report`
//! that aggregates and serializes them.

mod codes;
mod report;

pub use codes::DiagnosticCode;
pub use report::Report;

use crate::span::Span;
use serde::Serialize;
use std::fmt;

/// Diagnostic severity. Ordered least to most severe for display grouping;
/// only `Error` affects the report's `valid` flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Hint => "HINT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single structured diagnostic: what went wrong, where, and how it might
/// be fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub file: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity,
            code,
            message: message.into(),
            line: span.line,
            column: span.column,
            file: None,
            suggestion: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    /// `path:line:col: SEVERITY[CODE]: message`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.file.as_deref().unwrap_or("<input>");
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            path, self.line, self.column, self.severity, self.code, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_text_format() {
        let d = Diagnostic::error(DiagnosticCode::R001, "missing version", Span::new(0, 0, 1, 1))
            .with_file("script.pine");
        assert_eq!(
            d.to_string(),
            "script.pine:1:1: ERROR[R001]: missing version"
        );
    }

    #[test]
    fn severity_is_error_only_for_error() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(!Severity::Info.is_error());
        assert!(!Severity::Hint.is_error());
    }
}
