//! The closed registry of diagnostic codes. Unlike a typical
//! `prefix + number` scheme, this registry mixes numbered codes (`R001`)
//! with fixed short codes (`SEC01`), so it is modeled as a closed enum
//! rather than a generic struct.

use std::fmt;

/// One of the stable diagnostic code identifiers a `Report` may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Version directive missing or present more than once.
    R001,
    /// Version value is not one of the supported versions.
    R003,
    /// Suspicious non-target pattern found in source text.
    Sec01,
    /// Redeclaration of a name already bound in the same scope.
    R200,
    /// Reference to an identifier that does not resolve.
    R201,
    /// Value's type is not assignable to its declared type hint.
    R202,
    /// Inner declaration shadows a binding from an ancestor scope.
    W001,
    /// Mutable local declared but never read.
    W002,
    /// Lexer failed to tokenize the source (covers inconsistent
    /// indentation, an unrecognized character, and an unterminated string).
    E001,
    /// Parser recorded a recoverable syntax error.
    E002,
    /// Unexpected internal failure during semantic analysis.
    E999,
}

impl DiagnosticCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::R001 => "R001",
            DiagnosticCode::R003 => "R003",
            DiagnosticCode::Sec01 => "SEC01",
            DiagnosticCode::R200 => "R200",
            DiagnosticCode::R201 => "R201",
            DiagnosticCode::R202 => "R202",
            DiagnosticCode::W001 => "W001",
            DiagnosticCode::W002 => "W002",
            DiagnosticCode::E001 => "E001",
            DiagnosticCode::E002 => "E002",
            DiagnosticCode::E999 => "E999",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_spec_literals() {
        assert_eq!(DiagnosticCode::R001.as_str(), "R001");
        assert_eq!(DiagnosticCode::Sec01.as_str(), "SEC01");
        assert_eq!(DiagnosticCode::E001.as_str(), "E001");
    }

    #[test]
    fn display_matches_as_str() {
        for code in [
            DiagnosticCode::R001,
            DiagnosticCode::R003,
            DiagnosticCode::Sec01,
            DiagnosticCode::R200,
            DiagnosticCode::R201,
            DiagnosticCode::R202,
            DiagnosticCode::W001,
            DiagnosticCode::W002,
            DiagnosticCode::E001,
            DiagnosticCode::E002,
            DiagnosticCode::E999,
        ] {
            assert_eq!(code.to_string(), code.as_str());
        }
    }
}
