//! Span utility functions for diagnostic processing.
//!
//! Converts byte spans into the 1-based line and column numbers shown in
//! error messages. For repeated lookups on the same source, use
//! [`LineOffsetTable`], which pre-computes line starts for O(log L)
//! binary-search lookup.

use nexus_ir::Span;

/// Pre-computed line offset table for efficient line/column lookup.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start.
    /// offsets[0] = 0 (line 1 starts at byte 0), offsets[1] = byte after
    /// the first `\n`, and so on.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text. O(n) construction for
    /// O(log L) lookups.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push((i + 1) as u32);
            }
        }
        LineOffsetTable { offsets }
    }

    /// Get the 1-based line number containing a byte offset.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        (line_idx as u32) + 1
    }

    /// Get 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters (not bytes) from the line start.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());

        let col_text = &source[line_start..offset];
        let col = u32::try_from(col_text.chars().count()).unwrap_or(u32::MAX - 1) + 1;

        (line, col)
    }

    /// Byte offset of a 1-based line's start, or `None` if out of range.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Compute the 1-based line number where a span starts.
///
/// For repeated lookups, build a [`LineOffsetTable`] instead.
pub fn line_number(source: &str, span: Span) -> u32 {
    let mut line = 1u32;
    for &byte in source.as_bytes().iter().take(span.start as usize) {
        if byte == b'\n' {
            line += 1;
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number_single_line() {
        let source = "hello world";
        assert_eq!(line_number(source, Span::new(0, 5)), 1);
        assert_eq!(line_number(source, Span::new(10, 11)), 1);
    }

    #[test]
    fn test_line_number_multiple_lines() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_number(source, Span::new(0, 5)), 1);
        assert_eq!(line_number(source, Span::new(6, 11)), 2);
        assert_eq!(line_number(source, Span::new(12, 17)), 3);
    }

    #[test]
    fn test_table_build() {
        let source = "line1\nline2\nline3";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.line_start_offset(1), Some(0));
        assert_eq!(table.line_start_offset(2), Some(6));
        assert_eq!(table.line_start_offset(3), Some(12));
        assert_eq!(table.line_start_offset(4), None);
        assert_eq!(table.line_start_offset(0), None);
    }

    #[test]
    fn test_table_line_from_offset() {
        let source = "line1\nline2\nline3";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_from_offset(0), 1);
        assert_eq!(table.line_from_offset(5), 1); // the '\n' itself
        assert_eq!(table.line_from_offset(6), 2);
        assert_eq!(table.line_from_offset(12), 3);
    }

    #[test]
    fn test_table_offset_to_line_col() {
        let source = "abc\ndefgh\nij";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 2), (1, 3));
        assert_eq!(table.offset_to_line_col(source, 4), (2, 1));
        assert_eq!(table.offset_to_line_col(source, 7), (2, 4));
        assert_eq!(table.offset_to_line_col(source, 10), (3, 1));
    }

    #[test]
    fn test_table_empty_source() {
        let table = LineOffsetTable::build("");
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.offset_to_line_col("", 0), (1, 1));
    }

    #[test]
    fn test_table_unicode_columns() {
        let source = "αβγ\nδε";
        let table = LineOffsetTable::build(source);
        // Greek letters are 2 bytes each; columns count characters.
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 2), (1, 2));
        assert_eq!(table.offset_to_line_col(source, 4), (1, 3));
        assert_eq!(table.offset_to_line_col(source, 7), (2, 1));
    }

    #[test]
    fn test_table_matches_linear_scan() {
        let source = "first line\nsecond longer line\n\nfourth after empty\nlast";
        let table = LineOffsetTable::build(source);
        for offset in 0..source.len() as u32 {
            assert_eq!(
                table.line_from_offset(offset),
                line_number(source, Span::point(offset)),
                "mismatch at offset {offset}"
            );
        }
    }
}
