use stencil_common::span::Position;

/// Character-level source iterator for the Stencil lexer.
///
/// The cursor wraps a source string and provides character-by-character
/// iteration while tracking the full [`Position`] (line, column and byte
/// offset) of the next unread character.
pub struct Cursor<'src> {
    source: &'src str,
    pos: Position,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: Position::START,
            chars: source.chars(),
        }
    }

    /// Look at the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Whether the unread input begins with `literal`.
    pub fn starts_with(&self, literal: &str) -> bool {
        self.chars.as_str().starts_with(literal)
    }

    /// Consume the current character and advance the position.
    ///
    /// Returns the consumed character, or `None` if at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos.offset += c.len_utf8() as u32;
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    /// Consume `n` characters. Used after a successful `starts_with`.
    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Position of the next unread character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Whether there are no more characters to consume.
    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// Advance while the predicate holds for the current character.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Extract the source text between two positions.
    pub fn slice(&self, start: Position, end: Position) -> &'src str {
        &self.source[start.offset as usize..end.offset as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_starts_at_origin() {
        let cursor = Cursor::new("hello");
        assert_eq!(cursor.pos(), Position::START);
        assert!(!cursor.is_eof());
    }

    #[test]
    fn peek_does_not_advance() {
        let cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.pos().offset, 0);
    }

    #[test]
    fn starts_with_compares_literal() {
        let mut cursor = Cursor::new("a{{b");
        assert!(!cursor.starts_with("{{"));
        cursor.advance();
        assert!(cursor.starts_with("{{"));
        cursor.advance_by(2);
        assert_eq!(cursor.peek(), Some('b'));
    }

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\nc");
        cursor.advance();
        assert_eq!(cursor.pos(), Position::new(1, 2, 1));
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.pos(), Position::new(2, 1, 3));
        assert_eq!(cursor.advance(), Some('c'));
        assert_eq!(cursor.advance(), None);
        assert!(cursor.is_eof());
    }

    #[test]
    fn advance_tracks_multibyte_utf8() {
        // U+00E9 (e with accent) is 2 bytes in UTF-8 but one column.
        let mut cursor = Cursor::new("\u{00E9}a");
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), Position::new(1, 2, 2));
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos().offset, 3);
    }

    #[test]
    fn eat_while_consumes_matching() {
        let mut cursor = Cursor::new("aaab");
        cursor.eat_while(|c| c == 'a');
        assert_eq!(cursor.pos().offset, 3);
        assert_eq!(cursor.peek(), Some('b'));
    }

    #[test]
    fn slice_extracts_text() {
        let mut cursor = Cursor::new("hello world");
        let start = cursor.pos();
        cursor.advance_by(5);
        assert_eq!(cursor.slice(start, cursor.pos()), "hello");
    }

    #[test]
    fn empty_source() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), None);
    }
}
