//! Byte-based span type for source location tracking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A byte-based span representing a range in source text.
///
/// Spans are half-open intervals `[start, end)` of byte offsets. They are
/// recorded by the lexer on every token and propagated onto AST nodes; the
/// renderers and error reporters convert them to line/column positions via
/// [`LineIndex`](crate::LineIndex) only when needed.
///
/// # Invariants
///
/// - `start <= end` (enforced by constructors in debug builds)
/// - Both offsets are valid byte positions in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ByteSpan {
    /// Starting byte offset in the source text (inclusive)
    pub start: usize,
    /// Ending byte offset in the source text (exclusive)
    pub end: usize,
}

impl ByteSpan {
    /// Creates a new `ByteSpan` with the given start and end offsets.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "ByteSpan: start ({}) > end ({})", start, end);
        Self { start, end }
    }

    /// Creates an empty span at the given position.
    #[inline]
    pub const fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty (start == end).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given byte offset.
    #[inline]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns a new span that covers both this span and the given span.
    #[inline]
    pub fn union(&self, other: ByteSpan) -> ByteSpan {
        ByteSpan { start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    /// Extracts the slice of source text covered by this span.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds for the source text.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Safely extracts the slice of source text, returning None if out of bounds.
    #[inline]
    pub fn try_slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }

    /// Converts to a standard Range.
    #[inline]
    pub const fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for ByteSpan {
    #[inline]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<ByteSpan> for Range<usize> {
    #[inline]
    fn from(span: ByteSpan) -> Self {
        span.start..span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = ByteSpan::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10));
    }

    #[test]
    fn empty_span() {
        let span = ByteSpan::empty(7);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn union_covers_both() {
        let a = ByteSpan::new(0, 10);
        let b = ByteSpan::new(5, 15);
        assert_eq!(a.union(b), ByteSpan::new(0, 15));
    }

    #[test]
    fn slice_extracts_text() {
        let source = "echo hello";
        assert_eq!(ByteSpan::new(5, 10).slice(source), "hello");
        assert_eq!(ByteSpan::new(5, 99).try_slice(source), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", ByteSpan::new(3, 8)), "3..8");
    }
}
