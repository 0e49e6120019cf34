//! Rope-based text document addressed by character offset.
//!
//! Hosts keep their text here and answer the bridge's geometry questions
//! from it. Offsets are `char` indices (not bytes), rows split on `\n`, and a
//! trailing newline produces a final empty row, so `lines()` round-trips with
//! `text().split('\n')`.

use core_selection::{LineGeometry, RowCol};
use ropey::Rope;
use std::ops::Range;

#[derive(Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of rows, counting the empty row after a trailing newline.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Row contents without the newline.
    pub fn line(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(row).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Row length in chars, excluding the newline. Zero past the end.
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    pub fn line_start(&self, row: usize) -> usize {
        self.rope.line_to_char(row.min(self.last_row()))
    }

    /// All rows, as the engine wants them.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .map(|row| self.line(row).unwrap_or_default())
            .collect()
    }

    pub fn slice(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Replace `range` (clamped to the document) with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        self.rope.remove(start..end);
        self.rope.insert(start, text);
    }

    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    fn last_row(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    /// Clamp a position onto the document: row to the last row, column to
    /// the row's end.
    pub fn clamp(&self, pos: RowCol) -> RowCol {
        let row = pos.row.min(self.last_row());
        RowCol::new(row, pos.col.min(self.line_len(row)))
    }
}

impl LineGeometry for Document {
    fn to_offset(&self, pos: RowCol) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.row) + pos.col
    }

    fn line_bounds(&self, offset: usize) -> (usize, usize) {
        let row = self.rope.char_to_line(offset.min(self.len_chars()));
        let start = self.rope.line_to_char(row);
        (start, start + self.line_len(row))
    }

    fn row_col_of(&self, offset: usize) -> RowCol {
        let offset = offset.min(self.len_chars());
        let row = self.rope.char_to_line(offset);
        RowCol::new(row, offset - self.rope.line_to_char(row))
    }

    fn text_len(&self) -> usize {
        self.len_chars()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("chars", &self.len_chars())
            .field("lines", &self.line_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_round_trip_with_split() {
        for text in ["", "a", "a\nb", "a\n", "\n\n", "héllo\nwörld\n"] {
            let doc = Document::from_str(text);
            let expected: Vec<String> = text.split('\n').map(str::to_owned).collect();
            assert_eq!(doc.lines(), expected, "text {text:?}");
            assert_eq!(doc.lines().join("\n"), text);
        }
    }

    #[test]
    fn offsets_are_characters_not_bytes() {
        let doc = Document::from_str("héllo\nwörld");
        assert_eq!(doc.to_offset(RowCol::new(1, 2)), 8);
        assert_eq!(doc.row_col_of(8), RowCol::new(1, 2));
        assert_eq!(doc.line_bounds(7), (6, 11));
        assert_eq!(doc.text_len(), 11);
    }

    #[test]
    fn positions_clamp_to_document() {
        let doc = Document::from_str("abc\nde");
        assert_eq!(doc.to_offset(RowCol::new(0, 10)), 3);
        assert_eq!(doc.to_offset(RowCol::new(9, 0)), 4);
        assert_eq!(doc.row_col_of(100), RowCol::new(1, 2));
        assert_eq!(doc.line_bounds(100), (4, 6));
    }

    #[test]
    fn line_bounds_at_newline_stays_on_row() {
        let doc = Document::from_str("abc\nde");
        // offset 3 is the newline of row 0
        assert_eq!(doc.line_bounds(3), (0, 3));
        assert_eq!(doc.row_col_of(3), RowCol::new(0, 3));
    }

    #[test]
    fn trailing_newline_has_empty_last_row() {
        let doc = Document::from_str("abc\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_len(1), 0);
        assert_eq!(doc.line_bounds(4), (4, 4));
    }

    #[test]
    fn replace_clamps_range() {
        let mut doc = Document::from_str("hello");
        doc.replace(3..99, "p!");
        assert_eq!(doc.text(), "help!");
        doc.replace(0..0, ">");
        assert_eq!(doc.text(), ">help!");
        assert_eq!(doc.slice(1..5), "help");
    }
}
