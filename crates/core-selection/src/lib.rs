//! Selection model shared by the host side and the engine side of the bridge.
//!
//! Two coordinate spaces meet here:
//! * the host addresses text by character offset and describes a selection as
//!   an ordered list of directional ranges ([`SelectionSnapshot`]);
//! * the modal engine addresses text by [`RowCol`] and describes a selection
//!   as a [`VisualMode`] plus an anchor and a cursor.
//!
//! Translating between them needs line geometry, which only the host can
//! answer; [`LineGeometry`] is that seam. The [`resolver`] module turns an
//! engine selection into host ranges.

use smallvec::SmallVec;
use std::fmt;

pub mod resolver;
pub use resolver::resolve;

/// Engine coordinate: zero-based row and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl RowCol {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
}

impl From<(usize, usize)> for RowCol {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for RowCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// Visual sub-mode of the engine; decides how anchor/cursor map to ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualMode {
    /// No visual selection: a plain cursor (or a host-pushed range).
    #[default]
    None,
    /// Character-wise, inclusive of both endpoints.
    Char,
    /// Line-wise, always whole lines.
    Line,
    /// Block-wise: a column span repeated over a row span.
    Block,
}

impl VisualMode {
    pub fn is_visual(self) -> bool {
        !matches!(self, VisualMode::None)
    }
}

/// One host selection range. `anchor` is the fixed end, `head` the caret end;
/// either may be the larger offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub anchor: usize,
    pub head: usize,
}

impl Range {
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Zero-width range at `offset`.
    pub const fn point(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn begin(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Normalized `(begin, end)` pair.
    pub fn span(&self) -> (usize, usize) {
        (self.begin(), self.end())
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    pub fn is_reversed(&self) -> bool {
        self.anchor > self.head
    }
}

impl From<(usize, usize)> for Range {
    fn from((anchor, head): (usize, usize)) -> Self {
        Self { anchor, head }
    }
}

/// Ordered list of host ranges, compared element-wise to detect change.
///
/// Almost every selection the bridge sees is a single range; block-wise
/// visual selections are the only multi-range shape it produces itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectionSnapshot {
    ranges: SmallVec<[Range; 1]>,
}

impl SelectionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(range: Range) -> Self {
        let mut ranges = SmallVec::new();
        ranges.push(range);
        Self { ranges }
    }

    pub fn point(offset: usize) -> Self {
        Self::single(Range::point(offset))
    }

    pub fn push(&mut self, range: Range) {
        self.ranges.push(range);
    }

    /// First range; the one pushed into the engine.
    pub fn primary(&self) -> Option<Range> {
        self.ranges.first().copied()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// `(anchor, head)` pairs, the shape hosts usually log or compare.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.ranges.iter().map(|r| (r.anchor, r.head)).collect()
    }
}

impl FromIterator<Range> for SelectionSnapshot {
    fn from_iter<T: IntoIterator<Item = Range>>(iter: T) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl From<&[(usize, usize)]> for SelectionSnapshot {
    fn from(pairs: &[(usize, usize)]) -> Self {
        pairs.iter().copied().map(Range::from).collect()
    }
}

impl<const N: usize> From<[(usize, usize); N]> for SelectionSnapshot {
    fn from(pairs: [(usize, usize); N]) -> Self {
        pairs.into_iter().map(Range::from).collect()
    }
}

/// Line geometry queries answered by the host document.
///
/// Implementations decide how to treat out-of-range input; the in-memory
/// document clamps rows to the last row and columns to the row's end.
pub trait LineGeometry {
    /// Character offset of a row/column position.
    fn to_offset(&self, pos: RowCol) -> usize;
    /// `(line_start, line_end)` of the line containing `offset`. `line_end`
    /// excludes the newline.
    fn line_bounds(&self, offset: usize) -> (usize, usize);
    /// Row/column of a character offset.
    fn row_col_of(&self, offset: usize) -> RowCol;
    /// Total characters in the document.
    fn text_len(&self) -> usize;
}

impl<G: LineGeometry + ?Sized> LineGeometry for &G {
    fn to_offset(&self, pos: RowCol) -> usize {
        (**self).to_offset(pos)
    }
    fn line_bounds(&self, offset: usize) -> (usize, usize) {
        (**self).line_bounds(offset)
    }
    fn row_col_of(&self, offset: usize) -> RowCol {
        (**self).row_col_of(offset)
    }
    fn text_len(&self) -> usize {
        (**self).text_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_compare_element_wise() {
        let a = SelectionSnapshot::from([(3, 3)]);
        let b = SelectionSnapshot::point(3);
        assert_eq!(a, b);
        let c = SelectionSnapshot::from([(3, 3), (5, 6)]);
        assert_ne!(a, c);
        let reversed = SelectionSnapshot::from([(6, 5)]);
        assert_ne!(reversed, SelectionSnapshot::from([(5, 6)]));
    }

    #[test]
    fn range_span_normalizes_direction() {
        let r = Range::new(7, 2);
        assert!(r.is_reversed());
        assert_eq!(r.span(), (2, 7));
        assert_eq!(r.len(), 5);
        assert!(Range::point(4).is_empty());
    }

    #[test]
    fn primary_is_first_range() {
        let snap = SelectionSnapshot::from([(1, 2), (8, 9)]);
        assert_eq!(snap.primary(), Some(Range::new(1, 2)));
        assert_eq!(SelectionSnapshot::new().primary(), None);
        assert_eq!(snap.pairs(), vec![(1, 2), (8, 9)]);
    }
}
