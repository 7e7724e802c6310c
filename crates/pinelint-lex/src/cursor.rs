/// A `char`-indexed cursor over source text, tracking the 1-based line and
/// column of the current position so every scanned token can stamp an
/// accurate [`pinelint_util::Span`].
pub struct Cursor<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        let chars: Vec<(usize, char)> = source.char_indices().collect();
        Cursor {
            source,
            chars,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Byte offset of the current position, suitable as a `Span::start`.
    pub fn byte_offset(&self) -> usize {
        self.chars
            .get(self.position)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.position).map(|(_, c)| *c)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).map(|(_, c)| *c)
    }

    pub fn advance(&mut self) -> Option<char> {
        let (_, ch) = *self.chars.get(self.position)?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Slice of source text between two byte offsets obtained from this
    /// cursor.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_line_and_column() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!((cursor.line(), cursor.column()), (1, 1));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 3));
        cursor.advance(); // consumes '\n'
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }

    #[test]
    fn peek_does_not_consume() {
        let cursor = Cursor::new("xy");
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.peek(), Some('x'));
    }

    #[test]
    fn matches_consumes_only_on_match() {
        let mut cursor = Cursor::new("==");
        assert!(cursor.matches('='));
        assert!(cursor.matches('='));
        assert!(cursor.is_at_end());
    }
}
