//! Property tests for the selection shape resolver.

mod common;

use common::StrGeometry;
use core_selection::{LineGeometry, RowCol, VisualMode, resolve};
use proptest::prelude::*;

fn lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ]{0,12}", 1..8)
}

fn clamp(geo: &StrGeometry, row: usize, col: usize) -> RowCol {
    geo.row_col_of(geo.to_offset(RowCol::new(row, col)))
}

proptest! {
    #[test]
    fn charwise_span_is_symmetric(lines in lines(), r1 in 0usize..8, c1 in 0usize..14, r2 in 0usize..8, c2 in 0usize..14) {
        let text = lines.join("\n");
        let geo = StrGeometry::new(&text);
        let a = clamp(&geo, r1, c1);
        let b = clamp(&geo, r2, c2);
        let fwd = resolve(VisualMode::Char, a, b, &geo).primary().unwrap();
        let back = resolve(VisualMode::Char, b, a, &geo).primary().unwrap();
        prop_assert_eq!(fwd.span(), back.span());
        prop_assert!(fwd.end() <= geo.text_len());
    }

    #[test]
    fn linewise_always_covers_whole_lines(lines in lines(), r1 in 0usize..8, c1 in 0usize..14, r2 in 0usize..8, c2 in 0usize..14) {
        let text = lines.join("\n");
        let geo = StrGeometry::new(&text);
        let sel = resolve(VisualMode::Line, clamp(&geo, r1, c1), clamp(&geo, r2, c2), &geo);
        prop_assert_eq!(sel.len(), 1);
        let (begin, end) = sel.primary().unwrap().span();
        prop_assert_eq!(geo.line_bounds(begin).0, begin);
        prop_assert_eq!(geo.line_bounds(end).1, end);
    }

    #[test]
    fn blockwise_ranges_stay_within_their_rows(lines in lines(), r1 in 0usize..8, c1 in 0usize..14, r2 in 0usize..8, c2 in 0usize..14) {
        let text = lines.join("\n");
        let geo = StrGeometry::new(&text);
        let a = clamp(&geo, r1, c1);
        let b = clamp(&geo, r2, c2);
        let sel = resolve(VisualMode::Block, a, b, &geo);
        let rows = a.row.max(b.row) - a.row.min(b.row) + 1;
        prop_assert!(sel.len() <= rows);
        let width = a.col.max(b.col) - a.col.min(b.col) + 1;
        for range in sel.iter() {
            let (start, end) = geo.line_bounds(range.anchor);
            prop_assert!(range.anchor >= start && range.head <= end);
            prop_assert!(range.len() <= width);
        }
    }
}
