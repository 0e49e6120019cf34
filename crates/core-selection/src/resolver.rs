//! Engine selection -> host ranges.
//!
//! Given the engine's visual sub-mode, anchor and cursor, compute the ranges
//! the host should display. The resolver is pure: every coordinate question is
//! asked of the [`LineGeometry`] and nothing is mutated.
//!
//! * `Char`: the engine treats both endpoints as inclusive while host ranges
//!   are half-open, so whichever endpoint sits later in the document is nudged
//!   one character forward (clamped to the document end).
//! * `Line`: whole lines. The range keeps the selection's direction: when the
//!   anchor is below the cursor it runs from the end of the anchor's line back
//!   to the start of the cursor's line.
//! * `Block`: one range per row between the two endpoints, covering the column
//!   span `[min col, max col + 1)`. Rows too short to reach the left edge are
//!   skipped; shorter rows are clipped at their own end.
//! * `None`: the anchor/cursor pair as is (usually a zero-width cursor).

use crate::{LineGeometry, Range, RowCol, SelectionSnapshot, VisualMode};

pub fn resolve<G>(mode: VisualMode, anchor: RowCol, cursor: RowCol, geometry: &G) -> SelectionSnapshot
where
    G: LineGeometry + ?Sized,
{
    match mode {
        VisualMode::Char => SelectionSnapshot::single(charwise(anchor, cursor, geometry)),
        VisualMode::Line => SelectionSnapshot::single(linewise(anchor, cursor, geometry)),
        VisualMode::Block => blockwise(anchor, cursor, geometry),
        VisualMode::None => SelectionSnapshot::single(Range::new(
            geometry.to_offset(anchor),
            geometry.to_offset(cursor),
        )),
    }
}

fn charwise<G: LineGeometry + ?Sized>(anchor: RowCol, cursor: RowCol, geometry: &G) -> Range {
    let mut a = geometry.to_offset(anchor);
    let mut b = geometry.to_offset(cursor);
    let limit = geometry.text_len();
    if a > b {
        a = (a + 1).min(limit);
    } else {
        b = (b + 1).min(limit);
    }
    Range::new(a, b)
}

fn linewise<G: LineGeometry + ?Sized>(anchor: RowCol, cursor: RowCol, geometry: &G) -> Range {
    let a = geometry.to_offset(anchor);
    let b = geometry.to_offset(cursor);
    let (anchor_start, anchor_end) = geometry.line_bounds(a);
    let (cursor_start, cursor_end) = geometry.line_bounds(b);
    if a > b {
        Range::new(anchor_end, cursor_start)
    } else {
        Range::new(anchor_start, cursor_end)
    }
}

fn blockwise<G: LineGeometry + ?Sized>(
    anchor: RowCol,
    cursor: RowCol,
    geometry: &G,
) -> SelectionSnapshot {
    let left = anchor.col.min(cursor.col);
    let right = anchor.col.max(cursor.col) + 1;
    let top = anchor.row.min(cursor.row);
    let bottom = anchor.row.max(cursor.row);

    let mut out = SelectionSnapshot::new();
    for row in top..=bottom {
        let end = row_end_col(row, geometry);
        if left > end {
            continue;
        }
        out.push(Range::new(
            geometry.to_offset(RowCol::new(row, left)),
            geometry.to_offset(RowCol::new(row, right.min(end))),
        ));
    }
    tracing::trace!(target: "selection.resolve", top, bottom, left, right, ranges = out.len(), "blockwise");
    out
}

/// Column of the end of `row` (its length in characters).
fn row_end_col<G: LineGeometry + ?Sized>(row: usize, geometry: &G) -> usize {
    let (_, line_end) = geometry.line_bounds(geometry.to_offset(RowCol::new(row, 0)));
    geometry.row_col_of(line_end).col
}
