//! Byte offset to line/column conversion.

use memchr::memchr_iter;
use xmldom_dom::Position;

/// Newline index over a source string.
///
/// Built once per parse; lookups binary-search the newline offsets.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    /// Byte offsets of each `\n`.
    line_breaks: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            line_breaks: memchr_iter(b'\n', source.as_bytes()).collect(),
        }
    }

    /// The 1-based line and character column of `offset`.
    ///
    /// Offsets past the end are clamped to the end of the source.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());

        // A newline belongs to the line it terminates
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };
        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };

        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |line| line.chars().count());

        Position::new(row + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("<a/>");
        assert_eq!(index.position(0), Position::new(1, 1));
        assert_eq!(index.position(3), Position::new(1, 4));
        assert_eq!(index.line_count(), 1);
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::new("<a>\n  <b/>\n</a>");
        assert_eq!(index.position(3), Position::new(1, 4));
        assert_eq!(index.position(4), Position::new(2, 1));
        assert_eq!(index.position(6), Position::new(2, 3));
        assert_eq!(index.position(11), Position::new(3, 1));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_columns_count_characters() {
        let index = LineIndex::new("<é>é</é>");
        // '<' + 'é' (2 bytes) + '>' puts the text at byte 4
        assert_eq!(index.position(4), Position::new(1, 4));
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let index = LineIndex::new("ab\n");
        assert_eq!(index.position(100), Position::new(2, 1));
    }
}
