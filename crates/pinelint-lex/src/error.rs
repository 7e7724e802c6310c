use pinelint_util::Span;
use thiserror::Error;

/// Fatal lexer conditions. Either one aborts tokenization entirely; the
/// caller turns it into a single `E001` diagnostic at this error's own span
/// and skips the remaining pipeline stages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("inconsistent indentation at line {line}, column {column}")]
    InconsistentIndent { span: Span, line: u32, column: u32 },

    #[error("unrecognized character {ch:?} at line {line}, column {column}")]
    UnrecognizedChar {
        span: Span,
        ch: char,
        line: u32,
        column: u32,
    },

    #[error("unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { span: Span, line: u32, column: u32 },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InconsistentIndent { span, .. }
            | LexError::UnrecognizedChar { span, .. }
            | LexError::UnterminatedString { span, .. } => *span,
        }
    }
}
