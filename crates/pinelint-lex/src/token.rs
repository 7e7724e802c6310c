use pinelint_util::Span;
use std::fmt;

/// The kind of a scanned token. Structural kinds (`Newline`, `Indent`,
/// `Dedent`, `Eof`) are synthesized by the indentation pass rather than
/// matched directly against source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    LiteralInteger,
    LiteralFloat,
    LiteralString,
    LiteralColor,
    Operator,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Question,
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// `(kind, lexeme, line, column, byte_offset)`. Synthetic tokens (`Newline`,
/// `Indent`, `Dedent`, `Eof`) carry an empty lexeme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }

    pub fn byte_offset(&self) -> usize {
        self.span.start
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_operator(&self, lexeme: &str) -> bool {
        self.kind == TokenKind::Operator && self.lexeme == lexeme
    }

    pub fn is_keyword(&self, lexeme: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == lexeme
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})@{}", self.kind, self.lexeme, self.span)
    }
}
