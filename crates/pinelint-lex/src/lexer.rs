//! The five-phase algorithm: prioritized token scanning, keyword
//! reclassification, line partitioning, indent-stack management, and an
//! end-of-input dedent flush. Ported from the reference implementation's
//! `lexer.py`, preserving its exact token-priority ordering and
//! indentation rules (tabs widen to 4 columns; blank lines are skipped
//! entirely; a multi-line block comment contributes exactly one synthetic
//! newline).

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};
use crate::is_keyword;
use pinelint_util::Span;

const TAB_WIDTH: u32 = 4;

/// A token as scanned before the indentation pass runs; carries kinds the
/// public `TokenKind` has no use for (comments, raw whitespace, a pre-pass
/// newline).
#[derive(Clone, Debug, PartialEq, Eq)]
enum RawKind {
    Real(TokenKind),
    LineComment,
    BlockComment,
    Newline,
    Whitespace,
}

#[derive(Clone, Debug)]
struct RawToken {
    kind: RawKind,
    lexeme: String,
    span: Span,
}

pub struct Lexer;

impl Lexer {
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let raw = scan_raw(source)?;
        process_indentation(raw)
    }
}

fn scan_raw(source: &str) -> Result<Vec<RawToken>, LexError> {
    let mut cursor = Cursor::new(source);
    let mut out = Vec::new();

    while !cursor.is_at_end() {
        let start_offset = cursor.byte_offset();
        let start_line = cursor.line();
        let start_col = cursor.column();
        let ch = cursor.peek().unwrap();

        // 1. line comment
        if ch == '/' && cursor.peek_at(1) == Some('/') {
            while let Some(c) = cursor.peek() {
                if c == '\n' {
                    break;
                }
                cursor.advance();
            }
            let end = cursor.byte_offset();
            out.push(raw(RawKind::LineComment, &cursor, start_offset, end, start_line, start_col));
            continue;
        }

        // 2. block comment
        if ch == '/' && cursor.peek_at(1) == Some('*') {
            cursor.advance();
            cursor.advance();
            while !cursor.is_at_end() {
                if cursor.peek() == Some('*') && cursor.peek_at(1) == Some('/') {
                    cursor.advance();
                    cursor.advance();
                    break;
                }
                cursor.advance();
            }
            let end = cursor.byte_offset();
            out.push(raw(RawKind::BlockComment, &cursor, start_offset, end, start_line, start_col));
            continue;
        }

        // 3. strings
        if ch == '"' || ch == '\'' {
            let quote = ch;
            cursor.advance();
            loop {
                match cursor.peek() {
                    None | Some('\n') => {
                        return Err(LexError::UnterminatedString {
                            span: Span::new(start_offset, cursor.byte_offset(), start_line, start_col),
                            line: start_line,
                            column: start_col,
                        })
                    }
                    Some('\\') => {
                        cursor.advance();
                        cursor.advance();
                    }
                    Some(c) if c == quote => {
                        cursor.advance();
                        break;
                    }
                    Some(_) => {
                        cursor.advance();
                    }
                }
            }
            let end = cursor.byte_offset();
            out.push(raw(
                RawKind::Real(TokenKind::LiteralString),
                &cursor,
                start_offset,
                end,
                start_line,
                start_col,
            ));
            continue;
        }

        // 4. hex colors: '#' + 6 or 8 hex digits
        if ch == '#' && is_hex_color(&cursor) {
            cursor.advance();
            let count = if hex_run_len(&cursor) == 8 { 8 } else { 6 };
            for _ in 0..count {
                cursor.advance();
            }
            let end = cursor.byte_offset();
            out.push(raw(
                RawKind::Real(TokenKind::LiteralColor),
                &cursor,
                start_offset,
                end,
                start_line,
                start_col,
            ));
            continue;
        }

        // 5. floats / 6. integers
        if ch.is_ascii_digit() || (ch == '.' && cursor.peek_at(1).map_or(false, |c| c.is_ascii_digit())) {
            let is_float = scan_number(&mut cursor);
            let end = cursor.byte_offset();
            let kind = if is_float {
                TokenKind::LiteralFloat
            } else {
                TokenKind::LiteralInteger
            };
            out.push(raw(RawKind::Real(kind), &cursor, start_offset, end, start_line, start_col));
            continue;
        }

        // 7. multi-char operators
        if let Some(op) = match_multi_char_operator(&mut cursor) {
            let end = cursor.byte_offset();
            out.push(RawToken {
                kind: RawKind::Real(TokenKind::Operator),
                lexeme: op.to_string(),
                span: Span::new(start_offset, end, start_line, start_col),
            });
            continue;
        }

        // 8. single-char arithmetic, 9. comparison, 10. assignment
        if "+-*/%<>=".contains(ch) {
            cursor.advance();
            let end = cursor.byte_offset();
            out.push(raw(
                RawKind::Real(TokenKind::Operator),
                &cursor,
                start_offset,
                end,
                start_line,
                start_col,
            ));
            continue;
        }

        // 11. dedicated ? :
        if ch == '?' {
            cursor.advance();
            out.push(raw(RawKind::Real(TokenKind::Question), &cursor, start_offset, cursor.byte_offset(), start_line, start_col));
            continue;
        }
        if ch == ':' {
            cursor.advance();
            out.push(raw(RawKind::Real(TokenKind::Colon), &cursor, start_offset, cursor.byte_offset(), start_line, start_col));
            continue;
        }

        // 12. delimiters
        if let Some(kind) = single_char_delimiter(ch) {
            cursor.advance();
            out.push(raw(kind, &cursor, start_offset, cursor.byte_offset(), start_line, start_col));
            continue;
        }

        // 13. identifier
        if ch.is_ascii_alphabetic() || ch == '_' {
            while let Some(c) = cursor.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    cursor.advance();
                } else {
                    break;
                }
            }
            let end = cursor.byte_offset();
            let lexeme = cursor.slice(start_offset, end).to_string();
            let kind = if is_keyword(&lexeme) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            out.push(RawToken {
                kind: RawKind::Real(kind),
                lexeme,
                span: Span::new(start_offset, end, start_line, start_col),
            });
            continue;
        }

        // 14. newline
        if ch == '\n' {
            cursor.advance();
            out.push(RawToken {
                kind: RawKind::Newline,
                lexeme: String::new(),
                span: Span::new(start_offset, cursor.byte_offset(), start_line, start_col),
            });
            continue;
        }

        // 15. horizontal whitespace
        if ch == ' ' || ch == '\t' || ch == '\r' {
            while matches!(cursor.peek(), Some(' ') | Some('\t') | Some('\r')) {
                cursor.advance();
            }
            let end = cursor.byte_offset();
            out.push(raw(RawKind::Whitespace, &cursor, start_offset, end, start_line, start_col));
            continue;
        }

        return Err(LexError::UnrecognizedChar {
            span: Span::new(start_offset, start_offset + ch.len_utf8(), start_line, start_col),
            ch,
            line: start_line,
            column: start_col,
        });
    }

    Ok(out)
}

fn raw(kind: RawKind, cursor: &Cursor, start: usize, end: usize, line: u32, column: u32) -> RawToken {
    RawToken {
        lexeme: cursor.slice(start, end).to_string(),
        kind,
        span: Span::new(start, end, line, column),
    }
}

fn is_hex_color(cursor: &Cursor) -> bool {
    hex_run_len(cursor) == 6 || hex_run_len(cursor) == 8
}

fn hex_run_len(cursor: &Cursor) -> usize {
    let mut n = 0;
    while cursor.peek_at(1 + n).map_or(false, |c| c.is_ascii_hexdigit()) {
        n += 1;
    }
    n
}

/// Advances past a numeric literal (integer or float, including leading-dot
/// and exponent-only forms). Returns `true` if it is a float.
fn scan_number(cursor: &mut Cursor) -> bool {
    let mut is_float = false;

    if cursor.peek() == Some('.') {
        is_float = true;
        cursor.advance();
        while cursor.peek().map_or(false, |c| c.is_ascii_digit()) {
            cursor.advance();
        }
    } else {
        while cursor.peek().map_or(false, |c| c.is_ascii_digit()) {
            cursor.advance();
        }
        if cursor.peek() == Some('.') {
            is_float = true;
            cursor.advance();
            while cursor.peek().map_or(false, |c| c.is_ascii_digit()) {
                cursor.advance();
            }
        }
    }

    if matches!(cursor.peek(), Some('e') | Some('E')) {
        let mut lookahead = 1;
        if matches!(cursor.peek_at(1), Some('+') | Some('-')) {
            lookahead += 1;
        }
        if cursor.peek_at(lookahead).map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            cursor.advance(); // e/E
            if matches!(cursor.peek(), Some('+') | Some('-')) {
                cursor.advance();
            }
            while cursor.peek().map_or(false, |c| c.is_ascii_digit()) {
                cursor.advance();
            }
        }
    }

    is_float
}

fn match_multi_char_operator(cursor: &mut Cursor) -> Option<&'static str> {
    let pairs: &[(char, char, &str)] = &[
        ('=', '=', "=="),
        ('!', '=', "!="),
        ('<', '=', "<="),
        ('>', '=', ">="),
        (':', '=', ":="),
        ('=', '>', "=>"),
    ];
    let (a, b) = (cursor.peek()?, cursor.peek_at(1)?);
    for (x, y, lexeme) in pairs {
        if a == *x && b == *y {
            cursor.advance();
            cursor.advance();
            return Some(lexeme);
        }
    }
    None
}

fn single_char_delimiter(ch: char) -> Option<RawKind> {
    use TokenKind::*;
    let kind = match ch {
        '(' => LParen,
        ')' => RParen,
        '[' => LBracket,
        ']' => RBracket,
        '{' => LBrace,
        '}' => RBrace,
        ',' => Comma,
        '.' => Dot,
        _ => return None,
    };
    Some(RawKind::Real(kind))
}

/// Groups raw tokens into physical lines, strips comments/whitespace, and
/// synthesizes `INDENT`/`DEDENT`/`NEWLINE`.
fn process_indentation(raw_tokens: Vec<RawToken>) -> Result<Vec<Token>, LexError> {
    let mut out = Vec::new();
    let mut indent_stack: Vec<u32> = vec![0];
    let mut line: Vec<RawToken> = Vec::new();
    let mut last_span = Span::DUMMY;

    // Processes one logical line's worth of raw tokens: pushes INDENT/DEDENT
    // against `width`, emits the real tokens, then a trailing NEWLINE. A
    // segment with no real tokens (blank, or entirely whitespace/comments)
    // contributes nothing, mirroring an ordinary blank line being skipped.
    let flush_segment = |tokens: &[RawToken], width: u32, out: &mut Vec<Token>, indent_stack: &mut Vec<u32>| -> Result<(), LexError> {
        let content: Vec<&RawToken> = tokens
            .iter()
            .filter(|t| !matches!(t.kind, RawKind::LineComment | RawKind::BlockComment | RawKind::Whitespace))
            .collect();

        if content.is_empty() {
            return Ok(());
        }

        let top = *indent_stack.last().unwrap();
        if width > top {
            indent_stack.push(width);
            out.push(Token::new(TokenKind::Indent, "", content[0].span));
        } else if width < top {
            while *indent_stack.last().unwrap() > width {
                indent_stack.pop();
                out.push(Token::new(TokenKind::Dedent, "", content[0].span));
            }
            if *indent_stack.last().unwrap() != width {
                return Err(LexError::InconsistentIndent {
                    span: content[0].span,
                    line: content[0].span.line,
                    column: content[0].span.column,
                });
            }
        }

        for token in &content {
            let kind = match &token.kind {
                RawKind::Real(k) => *k,
                _ => unreachable!("comments and whitespace filtered above"),
            };
            out.push(Token::new(kind, token.lexeme.clone(), token.span));
        }

        let end_span = content.last().unwrap().span;
        out.push(Token::new(TokenKind::Newline, "", end_span));
        Ok(())
    };

    let mut flush_line = |line: &mut Vec<RawToken>, out: &mut Vec<Token>, indent_stack: &mut Vec<u32>| -> Result<(), LexError> {
        if line.is_empty() {
            return Ok(());
        }

        // leading indent width: sum of leading whitespace runs (tabs widen to 4)
        let mut idx = 0;
        let mut width = 0u32;
        while idx < line.len() && line[idx].kind == RawKind::Whitespace {
            width += indent_width(&line[idx].lexeme);
            idx += 1;
        }

        // A block comment spanning multiple physical lines is stripped in
        // place of a synthetic NEWLINE, splitting this raw line into one
        // logical line per spanning comment — e.g. `x = 1 /* a\nb */ + 2`
        // becomes `x = 1` and `+ 2` as two independent logical lines. Each
        // segment after the first measures its own leading whitespace,
        // since real whitespace may still separate the comment from the
        // next token on that physical line.
        let mut segment_start = idx;
        let mut segment_width = width;
        for i in idx..line.len() {
            if line[i].kind == RawKind::BlockComment && line[i].lexeme.contains('\n') {
                flush_segment(&line[segment_start..i], segment_width, out, indent_stack)?;
                segment_start = i + 1;
                segment_width = 0;
                while segment_start < line.len() && line[segment_start].kind == RawKind::Whitespace {
                    segment_width += indent_width(&line[segment_start].lexeme);
                    segment_start += 1;
                }
            }
        }
        flush_segment(&line[segment_start..], segment_width, out, indent_stack)?;

        line.clear();
        Ok(())
    };

    for token in raw_tokens {
        if token.kind == RawKind::Newline {
            last_span = token.span;
            flush_line(&mut line, &mut out, &mut indent_stack)?;
        } else {
            line.push(token);
        }
    }
    flush_line(&mut line, &mut out, &mut indent_stack)?;

    while indent_stack.len() > 1 {
        indent_stack.pop();
        out.push(Token::new(TokenKind::Dedent, "", last_span));
    }
    out.push(Token::new(TokenKind::Eof, "", last_span));

    Ok(out)
}

fn indent_width(whitespace: &str) -> u32 {
    whitespace
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn simple_statement_ends_with_newline_and_eof() {
        let ks = kinds("x = 1\n");
        assert_eq!(
            ks,
            vec![
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::LiteralInteger,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indent_and_dedent_are_balanced() {
        let tokens = Lexer::tokenize("if true\n    x = 1\ny = 2\n").unwrap();
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, dedents);
        assert_eq!(indents, 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let tokens = Lexer::tokenize("x = 1\n\n\ny = 2\n").unwrap();
        let newlines = tokens.iter().filter(|t| t.kind == TokenKind::Newline).count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn keyword_reclassification() {
        let tokens = Lexer::tokenize("if x\n    y = 1\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].lexeme, "if");
    }

    #[test]
    fn na_is_a_keyword() {
        let tokens = Lexer::tokenize("x = na\n").unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword && t.lexeme == "na"));
    }

    #[test]
    fn inconsistent_dedent_is_fatal() {
        let err = Lexer::tokenize("if true\n        x = 1\n    y = 2\n").unwrap_err();
        assert!(matches!(err, LexError::InconsistentIndent { .. }));
    }

    #[test]
    fn line_comment_consumes_to_end_of_line() {
        let tokens = Lexer::tokenize("x = 1 // comment\n").unwrap();
        assert!(!tokens.iter().any(|t| t.lexeme.contains("comment")));
    }

    #[test]
    fn spanning_block_comment_splits_code_around_it_into_two_lines() {
        let tokens = Lexer::tokenize("x = 1 /* a\nb */ + 2\n").unwrap();
        assert!(!tokens.iter().any(|t| t.lexeme.contains('a') || t.lexeme.contains('b')));
        let newline_count = tokens.iter().filter(|t| t.kind == TokenKind::Newline).count();
        assert_eq!(newline_count, 2, "expected one NEWLINE for each side of the comment");
        // the `+` lands on its own logical line at column 0, not indented
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::Indent));
    }

    #[test]
    fn spanning_block_comment_alone_on_a_line_is_blank() {
        let tokens = kinds("/* a\nb */\nx = 1\n");
        assert_eq!(tokens, vec![
            TokenKind::Identifier,
            TokenKind::Operator,
            TokenKind::LiteralInteger,
            TokenKind::Newline,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn string_with_escaped_quote() {
        let tokens = Lexer::tokenize("s = \"a\\\"b\"\n").unwrap();
        let lit = tokens.iter().find(|t| t.kind == TokenKind::LiteralString).unwrap();
        assert_eq!(lit.lexeme, "\"a\\\"b\"");
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = Lexer::tokenize("s = \"abc\n").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn hex_color_six_and_eight_digit() {
        let tokens = Lexer::tokenize("c = #FF0000\nd = #FF0000AA\n").unwrap();
        let colors: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::LiteralColor).collect();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].lexeme, "#FF0000");
        assert_eq!(colors[1].lexeme, "#FF0000AA");
    }

    #[test]
    fn float_forms() {
        let tokens = Lexer::tokenize("a = 1.5\nb = .5\nc = 1e10\nd = 1.5e-3\n").unwrap();
        let floats = tokens.iter().filter(|t| t.kind == TokenKind::LiteralFloat).count();
        assert_eq!(floats, 4);
    }

    #[test]
    fn multi_char_operators_take_priority() {
        let tokens = Lexer::tokenize("x := 1\ny == 2\n").unwrap();
        assert!(tokens.iter().any(|t| t.lexeme == ":="));
        assert!(tokens.iter().any(|t| t.lexeme == "=="));
    }

    #[test]
    fn eof_flushes_remaining_dedents() {
        let tokens = Lexer::tokenize("if true\n    x = 1\n").unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(dedents, 1);
    }

    #[test]
    fn token_lexeme_matches_source_slice() {
        let source = "plot(close)\n";
        for token in Lexer::tokenize(source).unwrap() {
            if matches!(
                token.kind,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
            ) {
                continue;
            }
            let end = token.byte_offset() + token.lexeme.len();
            assert_eq!(&source[token.byte_offset()..end], token.lexeme);
        }
    }
}
