//! Source positions.
//!
//! Every token and syntax tree node carries a [`Span`] rather than a bare
//! `(line, column)` pair. Line and column are derived accessors so callers
//! that only care about the spec's public `(line, column)` shape never need
//! to know about byte offsets.

use std::fmt;

/// A half-open byte range within a single source file, tagged with the
/// 1-based line/column of its start.
///
/// Columns are counted in `char`s, not bytes, so multi-byte UTF-8 source
/// still produces the column number a human editor would show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Span {
            start,
            end,
            line,
            column,
        }
    }

    /// A zero-width span at line 1, column 1. Used for diagnostics that have
    /// no precise source location (e.g. `E999`).
    pub const DUMMY: Span = Span::new(0, 0, 1, 1);

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A span covering both `self` and `other`, taking the earlier start.
    pub fn to(&self, other: Span) -> Span {
        if self.start <= other.start {
            Span::new(self.start, other.end, self.line, self.column)
        } else {
            Span::new(other.start, self.end, other.line, other.column)
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_and_empty() {
        let s = Span::new(4, 10, 2, 3);
        assert_eq!(s.len(), 6);
        assert!(!s.is_empty());
        assert!(Span::new(4, 4, 2, 3).is_empty());
    }

    #[test]
    fn to_takes_earlier_start() {
        let a = Span::new(10, 15, 3, 1);
        let b = Span::new(2, 6, 1, 1);
        let joined = a.to(b);
        assert_eq!(joined.start, 2);
        assert_eq!(joined.end, 15);
        assert_eq!(joined.line, 1);
    }

    #[test]
    fn dummy_is_line_one_column_one() {
        assert_eq!(Span::DUMMY.line, 1);
        assert_eq!(Span::DUMMY.column, 1);
    }
}
