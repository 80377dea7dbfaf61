//! Offset to line/column conversion.

/// A 0-indexed line/column pair derived from a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Precomputed table of line start offsets for a source buffer.
///
/// Built once per diagnostic-rendering pass; lookups are a binary search
/// over the line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Builds the index for the given source text.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts, len: source.len() }
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a 0-indexed line/column pair.
    ///
    /// Offsets past the end of the source clamp to the final position.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        LineCol { line, column: offset - self.line_starts[line] }
    }

    /// Byte offset of the start of the given 0-indexed line, if it exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let idx = LineIndex::new("echo hi");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), LineCol { line: 0, column: 0 });
        assert_eq!(idx.line_col(5), LineCol { line: 0, column: 5 });
    }

    #[test]
    fn multi_line() {
        let idx = LineIndex::new("echo a\necho b\n");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.line_col(7), LineCol { line: 1, column: 0 });
        assert_eq!(idx.line_col(12), LineCol { line: 1, column: 5 });
    }

    #[test]
    fn offset_past_end_clamps() {
        let idx = LineIndex::new("ab");
        assert_eq!(idx.line_col(100), LineCol { line: 0, column: 2 });
    }

    #[test]
    fn line_start_lookup() {
        let idx = LineIndex::new("a\nbc\nd");
        assert_eq!(idx.line_start(1), Some(2));
        assert_eq!(idx.line_start(2), Some(5));
        assert_eq!(idx.line_start(3), None);
    }
}
