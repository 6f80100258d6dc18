//! Source positions.
//!
//! Three types describe where something lives in a file:
//!
//! - [`Span`]: a half-open byte range `[start, end)` into the UTF-8 source
//! - [`Position`]: a 1-based line and 0-based column (in characters)
//! - [`TextRange`]: a span together with its start and end positions
//!
//! Tokens carry all three; diagnostics carry [`TextRange`] so that a
//! reporter never has to go back to the source text to compute lines.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Create a span from `usize` offsets, as produced when scanning a `&str`.
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(start as u64, end as u64)
    }

    /// An empty span at `offset`.
    pub fn empty_at(offset: usize) -> Self {
        Self::from_offsets(offset, offset)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The span as a `usize` range, suitable for slicing the source text.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Position
// ============================================================================

/// A line/column position.
///
/// Lines are 1-based. Columns are 0-based and counted in characters, not
/// bytes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed, characters).
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ============================================================================
// TextRange
// ============================================================================

/// A byte span with the positions of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Position of the first character.
    pub start: Position,
    /// Position just past the last character.
    pub end: Position,
    /// Byte offsets of the same range.
    pub span: Span,
}

impl TextRange {
    pub fn new(start: Position, end: Position, span: Span) -> Self {
        TextRange { start, end, span }
    }

    /// Join two ranges, taking the start of `self` and the end of `last`.
    pub fn to(&self, last: &TextRange) -> TextRange {
        TextRange {
            start: self.start,
            end: last.end,
            span: Span::new(self.span.start, last.span.end.max(self.span.start)),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap_and_contain() {
        let a = Span::new(0, 10);
        let b = Span::new(5, 15);
        let c = Span::new(10, 12);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(&Span::new(2, 3)));
        assert!(!a.contains(&b));
        assert_eq!(a.cover(&c), Span::new(0, 12));
    }

    #[test]
    fn test_span_range_slices_source() {
        let source = "def foo(): pass";
        let span = Span::from_offsets(4, 7);
        assert_eq!(&source[span.range()], "foo");
        assert_eq!(span.len(), 3);
    }

    #[test]
    #[should_panic]
    fn test_span_rejects_inverted_bounds() {
        let _ = Span::new(3, 1);
    }

    #[test]
    fn test_text_range_join() {
        let first = TextRange::new(Position::new(1, 0), Position::new(1, 3), Span::new(0, 3));
        let last = TextRange::new(Position::new(2, 4), Position::new(2, 9), Span::new(8, 13));
        let joined = first.to(&last);
        assert_eq!(joined.start, Position::new(1, 0));
        assert_eq!(joined.end, Position::new(2, 9));
        assert_eq!(joined.span, Span::new(0, 13));
        assert_eq!(joined.to_string(), "1:0-2:9");
    }
}
