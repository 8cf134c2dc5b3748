//! Source location tracking
//!
//! Queries are single lines, so a byte offset maps to a column directly. The
//! line number records which line of a query file the query came from.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of the query (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number in characters (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of byte `offset` within `query`, which sits on `line`
    pub fn in_query(query: &str, offset: usize, line: u32) -> Self {
        let offset = offset.min(query.len());
        let column = query
            .char_indices()
            .take_while(|(index, _)| *index < offset)
            .count();
        Self::new(offset, line, column as u32 + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Zero-width span at a cursor
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_in_query_counts_characters() {
        let query = "SELECT * FROM 'zoo é' WHERE";
        let pos = Position::in_query(query, query.find("WHERE").unwrap(), 4);
        assert_eq!(pos.line, 4);
        assert_eq!(pos.column, 23);
        assert_eq!(pos.offset, 23);
    }

    #[test]
    fn test_position_clamps_to_query_end() {
        let pos = Position::in_query("SELECT", 99, 1);
        assert_eq!(pos.offset, 6);
        assert_eq!(pos.column, 7);
    }

    #[test]
    fn test_span_display() {
        let span = Span::new(Position::new(0, 1, 1), Position::new(6, 1, 7));
        assert_eq!(span.to_string(), "1:1-7");
        assert_eq!(span.len(), 6);
        assert!(Span::point(Position::new(3, 1, 4)).is_empty());
    }
}
