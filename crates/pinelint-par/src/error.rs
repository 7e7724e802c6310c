use pinelint_util::Span;

/// A single recoverable parse failure. The parser records these and keeps
/// going (resynchronizing to the next `NEWLINE`) rather than aborting —
/// multiple parse errors per file are normal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}
