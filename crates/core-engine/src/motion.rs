//! Cursor motions over a line vector.
//!
//! Columns are character indices. `past_end` selects the insert-mode clamp
//! (cursor may sit after the last character) versus the normal-mode clamp
//! (cursor rests on a real character, or column 0 on an empty line).

use core_selection::RowCol;

pub(crate) fn char_len(line: &str) -> usize {
    line.chars().count()
}

pub(crate) fn max_col(lines: &[String], row: usize, past_end: bool) -> usize {
    let len = lines.get(row).map_or(0, |l| char_len(l));
    if past_end { len } else { len.saturating_sub(1) }
}

pub(crate) fn clamp(lines: &[String], pos: RowCol, past_end: bool) -> RowCol {
    let row = pos.row.min(lines.len().saturating_sub(1));
    RowCol::new(row, pos.col.min(max_col(lines, row, past_end)))
}

pub(crate) fn left(pos: RowCol) -> RowCol {
    RowCol::new(pos.row, pos.col.saturating_sub(1))
}

pub(crate) fn right(lines: &[String], pos: RowCol, past_end: bool) -> RowCol {
    clamp(lines, RowCol::new(pos.row, pos.col + 1), past_end)
}

pub(crate) fn up(lines: &[String], pos: RowCol, past_end: bool) -> RowCol {
    clamp(lines, RowCol::new(pos.row.saturating_sub(1), pos.col), past_end)
}

pub(crate) fn down(lines: &[String], pos: RowCol, past_end: bool) -> RowCol {
    clamp(lines, RowCol::new(pos.row + 1, pos.col), past_end)
}

pub(crate) fn line_end(lines: &[String], pos: RowCol, past_end: bool) -> RowCol {
    RowCol::new(pos.row, max_col(lines, pos.row, past_end))
}

pub(crate) fn first_non_blank(lines: &[String], row: usize) -> RowCol {
    let col = lines
        .get(row)
        .and_then(|l| l.chars().position(|c| !c.is_whitespace()))
        .unwrap_or(0);
    RowCol::new(row, col)
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum Class {
    Blank,
    Word,
    Punct,
}

fn class(c: char) -> Class {
    if c.is_whitespace() {
        Class::Blank
    } else if c.is_alphanumeric() || c == '_' {
        Class::Word
    } else {
        Class::Punct
    }
}

/// Flattened (char, position) stream with a blank at each line break.
fn cells(lines: &[String]) -> Vec<(char, RowCol)> {
    let mut out = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        for (col, c) in line.chars().enumerate() {
            out.push((c, RowCol::new(row, col)));
        }
        out.push(('\n', RowCol::new(row, char_len(line))));
    }
    out
}

/// Start of the next word (`w`). Stays put at the end of the buffer.
pub(crate) fn word_forward(lines: &[String], pos: RowCol) -> RowCol {
    let cells = cells(lines);
    let Some(mut i) = cells.iter().position(|(_, p)| *p == pos) else {
        return pos;
    };
    let start = class(cells[i].0);
    while i < cells.len() && class(cells[i].0) == start && start != Class::Blank {
        i += 1;
    }
    while i < cells.len() && class(cells[i].0) == Class::Blank {
        i += 1;
    }
    match cells.get(i) {
        Some((_, p)) => *p,
        None => clamp(lines, RowCol::new(usize::MAX, usize::MAX), false),
    }
}

/// Start of the current or previous word (`b`).
pub(crate) fn word_backward(lines: &[String], pos: RowCol) -> RowCol {
    let cells = cells(lines);
    let Some(mut i) = cells.iter().position(|(_, p)| *p == pos) else {
        return pos;
    };
    while i > 0 && class(cells[i - 1].0) == Class::Blank {
        i -= 1;
    }
    if i == 0 {
        return RowCol::origin();
    }
    let target = class(cells[i - 1].0);
    while i > 0 && class(cells[i - 1].0) == target {
        i -= 1;
    }
    cells[i].1
}

/// Character offset of `pos` in the newline-joined text.
pub(crate) fn offset(lines: &[String], pos: RowCol) -> usize {
    lines[..pos.row.min(lines.len())]
        .iter()
        .map(|l| char_len(l) + 1)
        .sum::<usize>()
        + pos.col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_owned).collect()
    }

    #[test]
    fn normal_clamp_rests_on_last_character() {
        let l = lines("abc\n");
        assert_eq!(clamp(&l, RowCol::new(0, 9), false), RowCol::new(0, 2));
        assert_eq!(clamp(&l, RowCol::new(0, 9), true), RowCol::new(0, 3));
        assert_eq!(clamp(&l, RowCol::new(5, 2), false), RowCol::new(1, 0));
    }

    #[test]
    fn words_cross_lines() {
        let l = lines("foo bar\n  baz");
        assert_eq!(word_forward(&l, RowCol::new(0, 0)), RowCol::new(0, 4));
        assert_eq!(word_forward(&l, RowCol::new(0, 4)), RowCol::new(1, 2));
        assert_eq!(word_backward(&l, RowCol::new(1, 2)), RowCol::new(0, 4));
        assert_eq!(word_backward(&l, RowCol::new(0, 5)), RowCol::new(0, 4));
        assert_eq!(word_backward(&l, RowCol::new(0, 0)), RowCol::new(0, 0));
    }

    #[test]
    fn offsets_count_newlines() {
        let l = lines("ab\ncde");
        assert_eq!(offset(&l, RowCol::new(1, 1)), 4);
    }
}
