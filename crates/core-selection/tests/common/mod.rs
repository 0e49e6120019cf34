#![allow(dead_code)] // Shared across test binaries; each uses a subset.

use core_selection::{LineGeometry, RowCol};

/// Line geometry over a plain string, clamping out-of-range input.
pub struct StrGeometry {
    starts: Vec<usize>,
    lens: Vec<usize>,
    total: usize,
}

impl StrGeometry {
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::new();
        let mut lens = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            let len = line.chars().count();
            starts.push(offset);
            lens.push(len);
            offset += len + 1;
        }
        Self {
            starts,
            lens,
            total: text.chars().count(),
        }
    }

    fn row_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.total);
        match self.starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        }
    }
}

impl LineGeometry for StrGeometry {
    fn to_offset(&self, pos: RowCol) -> usize {
        let row = pos.row.min(self.starts.len() - 1);
        self.starts[row] + pos.col.min(self.lens[row])
    }

    fn line_bounds(&self, offset: usize) -> (usize, usize) {
        let row = self.row_of(offset);
        (self.starts[row], self.starts[row] + self.lens[row])
    }

    fn row_col_of(&self, offset: usize) -> RowCol {
        let offset = offset.min(self.total);
        let row = self.row_of(offset);
        RowCol::new(row, offset - self.starts[row])
    }

    fn text_len(&self) -> usize {
        self.total
    }
}
