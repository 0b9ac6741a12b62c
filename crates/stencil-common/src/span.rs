use serde::Serialize;

/// A point in the source text.
///
/// `line` and `column` are 1-based and measured in characters; `offset` is
/// the 0-based byte offset into the original UTF-8 source. The byte offset
/// is what diagnostics renderers consume, line/column is what humans read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    /// The position of the first character of a document.
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A half-open region of source text. Start is inclusive, end is exclusive.
///
/// Spans are plain values: every token, chunk, statement and constraint
/// carries a copy so that any stage can point back at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Create a new span from two positions.
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "span start ({}) must be <= end ({})",
            start.offset,
            end.offset
        );
        Self { start, end }
    }

    /// A zero-length span sitting at `pos`.
    pub fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end.offset - self.start.offset
    }

    /// Whether the span is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }

    /// Byte range of this span, for slicing the source or feeding ariadne.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset as usize..self.end.offset as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32) -> Span {
        Span::new(Position::new(1, start + 1, start), Position::new(1, end + 1, end))
    }

    #[test]
    fn span_new_and_len() {
        let span = span(5, 10);
        assert_eq!(span.start.offset, 5);
        assert_eq!(span.end.offset, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn span_point_is_empty() {
        let span = Span::point(Position::new(2, 4, 9));
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
        assert_eq!(span.start.line, 2);
    }

    #[test]
    fn span_merge_keeps_outer_positions() {
        let a = span(5, 10);
        let b = span(8, 15);
        let merged = a.merge(b);
        assert_eq!(merged.start.offset, 5);
        assert_eq!(merged.end.offset, 15);
        assert_eq!(merged.end.column, 16);
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn span_range() {
        assert_eq!(span(3, 7).range(), 3..7);
    }
}
