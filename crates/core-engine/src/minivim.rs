//! Reference modal engine.
//!
//! Supported keys (anything else is ignored in the mode it arrives in):
//! * Normal: `h j k l` and arrows, `0 $ w b`, `i a A I o O R`, `x`,
//!   `v V ^V`, `:` and `/` (request line input).
//! * Visual: the normal motions, `o` (swap ends), `d`/`x` (delete the
//!   selection), `v V ^V` (switch or leave), escape.
//! * Insert / Replace: printable text, tab, enter, backspace, arrows, escape
//!   (the cursor steps back one column on leaving, as in vi).
//! * Command line: typed characters, backspace, enter (`:N` jumps to row N,
//!   `/pat` searches forward with wrap-around), escape.
//!
//! Host selections arrive with an exclusive far end; `set_visual_selection`
//! pulls that end back one character so that resolving the engine's
//! inclusive selection reproduces the host range exactly.

use crate::motion;
use crate::{BufferHandle, EngineError, EngineMode, EngineSelection, ModalEngine};
use core_selection::{RowCol, VisualMode};
use std::collections::BTreeMap;
use tracing::{debug, trace};

const ESC: char = '\x1b';
const BACKSPACE: char = '\x08';
const CTRL_V: char = '\x16';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Char(char),
    Esc,
    Up,
    Down,
    Left,
    Right,
}

/// Split a literal into keys, recognizing `ESC [ A-D` arrow sequences.
fn keys(literal: &str) -> Vec<Key> {
    let chars: Vec<char> = literal.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ESC {
            let arrow = match (chars.get(i + 1), chars.get(i + 2)) {
                (Some('['), Some('A')) => Some(Key::Up),
                (Some('['), Some('B')) => Some(Key::Down),
                (Some('['), Some('C')) => Some(Key::Right),
                (Some('['), Some('D')) => Some(Key::Left),
                _ => None,
            };
            if let Some(key) = arrow {
                out.push(key);
                i += 3;
                continue;
            }
            out.push(Key::Esc);
        } else {
            out.push(Key::Char(c));
        }
        i += 1;
    }
    out
}

#[derive(Debug, Clone, Default)]
struct EngineBuffer {
    lines: Vec<String>,
    cursor: RowCol,
    anchor: RowCol,
    name: Option<String>,
}

impl EngineBuffer {
    fn new() -> Self {
        Self {
            lines: vec![String::new()],
            ..Self::default()
        }
    }

    fn byte(&self, pos: RowCol) -> usize {
        let line = &self.lines[pos.row];
        line.char_indices().nth(pos.col).map_or(line.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte(self.cursor);
        self.lines[self.cursor.row].insert(at, c);
        self.cursor.col += 1;
    }

    fn overwrite_char(&mut self, c: char) {
        let pos = self.cursor;
        let at = self.byte(pos);
        let line = &mut self.lines[pos.row];
        if at < line.len() {
            let len = line[at..].chars().next().map_or(0, char::len_utf8);
            line.replace_range(at..at + len, &c.to_string());
        } else {
            line.push(c);
        }
        self.cursor.col += 1;
    }

    fn split_line(&mut self) {
        let at = self.byte(self.cursor);
        let rest = self.lines[self.cursor.row].split_off(at);
        self.lines.insert(self.cursor.row + 1, rest);
        self.cursor = RowCol::new(self.cursor.row + 1, 0);
    }

    fn backspace(&mut self) {
        let pos = self.cursor;
        if pos.col > 0 {
            let at = self.byte(RowCol::new(pos.row, pos.col - 1));
            self.lines[pos.row].remove(at);
            self.cursor.col -= 1;
        } else if pos.row > 0 {
            let tail = self.lines.remove(pos.row);
            let prev = &mut self.lines[pos.row - 1];
            let col = motion::char_len(prev);
            prev.push_str(&tail);
            self.cursor = RowCol::new(pos.row - 1, col);
        }
    }

    fn delete_under(&mut self) {
        let pos = self.cursor;
        if motion::char_len(&self.lines[pos.row]) > pos.col {
            let at = self.byte(pos);
            self.lines[pos.row].remove(at);
        }
        self.cursor = motion::clamp(&self.lines, self.cursor, false);
    }

    /// Pull cursor and anchor back inside the text. Either can be left past
    /// the last row by edits made while the other end was not in use.
    fn settle(&mut self, past_end: bool) {
        self.cursor = motion::clamp(&self.lines, self.cursor, past_end);
        self.anchor = motion::clamp(&self.lines, self.anchor, false);
    }

    fn ordered(&self) -> (RowCol, RowCol) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    fn delete_selection(&mut self, mode: VisualMode) {
        let (start, end) = self.ordered();
        match mode {
            VisualMode::Line => {
                self.lines.drain(start.row..=end.row.min(self.lines.len() - 1));
                if self.lines.is_empty() {
                    self.lines.push(String::new());
                }
                self.cursor = motion::clamp(&self.lines, RowCol::new(start.row, 0), false);
            }
            VisualMode::Block => {
                let left = start.col.min(end.col);
                let right = start.col.max(end.col) + 1;
                for row in start.row..=end.row {
                    let line = &mut self.lines[row];
                    let chars: Vec<char> = line.chars().collect();
                    if left < chars.len() {
                        let kept: String = chars[..left]
                            .iter()
                            .chain(chars[right.min(chars.len())..].iter())
                            .collect();
                        *line = kept;
                    }
                }
                self.cursor = motion::clamp(&self.lines, RowCol::new(start.row, left), false);
            }
            VisualMode::Char | VisualMode::None => {
                let text = self.lines.join("\n");
                let chars: Vec<char> = text.chars().collect();
                let from = motion::offset(&self.lines, start).min(chars.len());
                let to = (motion::offset(&self.lines, end) + 1).min(chars.len());
                let kept: String = chars[..from].iter().chain(chars[to..].iter()).collect();
                self.lines = kept.split('\n').map(str::to_owned).collect();
                self.cursor = motion::clamp(&self.lines, start, false);
            }
        }
        self.anchor = self.cursor;
    }
}

/// Small vi-like interpreter implementing [`ModalEngine`].
#[derive(Debug)]
pub struct MiniVim {
    buffers: BTreeMap<BufferHandle, EngineBuffer>,
    focused: Option<BufferHandle>,
    next_handle: u64,
    mode: EngineMode,
    command_line: String,
    line_request: Option<char>,
    available: bool,
}

impl Default for MiniVim {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniVim {
    pub fn new() -> Self {
        Self {
            buffers: BTreeMap::new(),
            focused: None,
            next_handle: 1,
            mode: EngineMode::Normal,
            command_line: String::new(),
            line_request: None,
            available: true,
        }
    }

    /// An engine that refuses to create buffers, as when the backing process
    /// failed to start.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_name(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(&buffer)?.name.as_deref()
    }

    /// Pending command-line text, including its leading `:` or `/`.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    fn dispatch(&mut self, buf: &mut EngineBuffer, key: Key) {
        buf.settle(self.mode.is_insert());
        match self.mode {
            EngineMode::Normal | EngineMode::OperatorPending => self.normal(buf, key),
            EngineMode::Visual(mode) => self.visual(buf, mode, key),
            EngineMode::Insert => self.insert(buf, key),
            EngineMode::Replace => self.replace(buf, key),
            EngineMode::CommandLine => self.command(buf, key),
        }
    }

    /// Shared cursor motions; returns false when `key` is not a motion.
    fn motion(buf: &mut EngineBuffer, key: Key) -> bool {
        let lines = &buf.lines;
        let pos = buf.cursor;
        buf.cursor = match key {
            Key::Char('h') | Key::Left => motion::left(pos),
            Key::Char('l') | Key::Right => motion::right(lines, pos, false),
            Key::Char('j') | Key::Down => motion::down(lines, pos, false),
            Key::Char('k') | Key::Up => motion::up(lines, pos, false),
            Key::Char('0') => RowCol::new(pos.row, 0),
            Key::Char('$') => motion::line_end(lines, pos, false),
            Key::Char('w') => motion::word_forward(lines, pos),
            Key::Char('b') => motion::word_backward(lines, pos),
            _ => return false,
        };
        true
    }

    fn enter_visual(&mut self, buf: &mut EngineBuffer, mode: VisualMode) {
        buf.anchor = buf.cursor;
        self.mode = EngineMode::Visual(mode);
    }

    fn normal(&mut self, buf: &mut EngineBuffer, key: Key) {
        if Self::motion(buf, key) {
            return;
        }
        let Key::Char(c) = key else {
            // escape in normal mode only cancels a pending operator
            self.mode = EngineMode::Normal;
            return;
        };
        match c {
            'i' => self.mode = EngineMode::Insert,
            'a' => {
                buf.cursor = motion::right(&buf.lines, buf.cursor, true);
                self.mode = EngineMode::Insert;
            }
            'A' => {
                buf.cursor = motion::line_end(&buf.lines, buf.cursor, true);
                self.mode = EngineMode::Insert;
            }
            'I' => {
                buf.cursor = motion::first_non_blank(&buf.lines, buf.cursor.row);
                self.mode = EngineMode::Insert;
            }
            'o' => {
                buf.lines.insert(buf.cursor.row + 1, String::new());
                buf.cursor = RowCol::new(buf.cursor.row + 1, 0);
                self.mode = EngineMode::Insert;
            }
            'O' => {
                buf.lines.insert(buf.cursor.row, String::new());
                buf.cursor = RowCol::new(buf.cursor.row, 0);
                self.mode = EngineMode::Insert;
            }
            'R' => self.mode = EngineMode::Replace,
            'x' => buf.delete_under(),
            'v' => self.enter_visual(buf, VisualMode::Char),
            'V' => self.enter_visual(buf, VisualMode::Line),
            CTRL_V => self.enter_visual(buf, VisualMode::Block),
            ':' | '/' => {
                self.command_line = c.to_string();
                self.line_request = Some(c);
                self.mode = EngineMode::CommandLine;
            }
            _ => trace!(target: "engine.minivim", key = ?c, "normal_key_ignored"),
        }
    }

    fn visual(&mut self, buf: &mut EngineBuffer, mode: VisualMode, key: Key) {
        if Self::motion(buf, key) {
            return;
        }
        let requested = match key {
            Key::Esc => {
                self.mode = EngineMode::Normal;
                return;
            }
            Key::Char('v') => VisualMode::Char,
            Key::Char('V') => VisualMode::Line,
            Key::Char(CTRL_V) => VisualMode::Block,
            Key::Char('o') => {
                std::mem::swap(&mut buf.anchor, &mut buf.cursor);
                return;
            }
            Key::Char('d') | Key::Char('x') => {
                buf.delete_selection(mode);
                self.mode = EngineMode::Normal;
                return;
            }
            _ => return,
        };
        self.mode = if requested == mode {
            EngineMode::Normal
        } else {
            EngineMode::Visual(requested)
        };
    }

    fn leave_text_entry(&mut self, buf: &mut EngineBuffer) {
        buf.cursor = motion::clamp(&buf.lines, motion::left(buf.cursor), false);
        self.mode = EngineMode::Normal;
    }

    fn insert_motion(buf: &mut EngineBuffer, key: Key) -> bool {
        let pos = buf.cursor;
        buf.cursor = match key {
            Key::Left => motion::left(pos),
            Key::Right => motion::right(&buf.lines, pos, true),
            Key::Up => motion::up(&buf.lines, pos, true),
            Key::Down => motion::down(&buf.lines, pos, true),
            _ => return false,
        };
        true
    }

    fn insert(&mut self, buf: &mut EngineBuffer, key: Key) {
        if Self::insert_motion(buf, key) {
            return;
        }
        match key {
            Key::Esc => self.leave_text_entry(buf),
            Key::Char('\n') => buf.split_line(),
            Key::Char(BACKSPACE) => buf.backspace(),
            Key::Char(c) if c == '\t' || !c.is_control() => buf.insert_char(c),
            _ => {}
        }
    }

    fn replace(&mut self, buf: &mut EngineBuffer, key: Key) {
        if Self::insert_motion(buf, key) {
            return;
        }
        match key {
            Key::Esc => self.leave_text_entry(buf),
            Key::Char('\n') => buf.split_line(),
            Key::Char(BACKSPACE) => buf.cursor = motion::left(buf.cursor),
            Key::Char(c) if c == '\t' || !c.is_control() => buf.overwrite_char(c),
            _ => {}
        }
    }

    fn command(&mut self, buf: &mut EngineBuffer, key: Key) {
        match key {
            Key::Esc => {
                self.command_line.clear();
                self.mode = EngineMode::Normal;
            }
            Key::Char('\n') => {
                let line = std::mem::take(&mut self.command_line);
                self.mode = EngineMode::Normal;
                Self::execute(buf, &line);
            }
            Key::Char(BACKSPACE) => {
                self.command_line.pop();
                if self.command_line.is_empty() {
                    self.mode = EngineMode::Normal;
                }
            }
            Key::Char(c) if !c.is_control() => self.command_line.push(c),
            _ => {}
        }
    }

    fn execute(buf: &mut EngineBuffer, line: &str) {
        if let Some(rest) = line.strip_prefix(':') {
            if let Ok(n) = rest.trim().parse::<usize>() {
                let target = RowCol::new(n.saturating_sub(1), 0);
                buf.cursor = motion::clamp(&buf.lines, target, false);
            }
        } else if let Some(pattern) = line.strip_prefix('/') {
            if let Some(found) = Self::search(buf, pattern) {
                buf.cursor = found;
            }
        }
        debug!(target: "engine.minivim", command = line, cursor = %buf.cursor, "command_executed");
    }

    /// First match of `pattern` strictly after the cursor, wrapping around.
    fn search(buf: &EngineBuffer, pattern: &str) -> Option<RowCol> {
        if pattern.is_empty() {
            return None;
        }
        let rows = buf.lines.len();
        for step in 0..=rows {
            let row = (buf.cursor.row + step) % rows;
            let line = &buf.lines[row];
            for (byte, _) in line.match_indices(pattern) {
                let col = line[..byte].chars().count();
                let candidate = RowCol::new(row, col);
                let after_cursor = step > 0 || col > buf.cursor.col;
                let wrapped = step == rows && col <= buf.cursor.col;
                if after_cursor && (step < rows || wrapped) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn focused_mut(&mut self) -> Option<&mut EngineBuffer> {
        let handle = self.focused?;
        self.buffers.get_mut(&handle)
    }
}

impl ModalEngine for MiniVim {
    fn is_available(&self) -> bool {
        self.available
    }

    fn new_buffer(&mut self) -> Result<BufferHandle, EngineError> {
        if !self.available {
            return Err(EngineError::Unavailable);
        }
        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.buffers.insert(handle, EngineBuffer::new());
        debug!(target: "engine.minivim", buffer = %handle, "buffer_new");
        Ok(handle)
    }

    fn set_buffer_content(
        &mut self,
        buffer: BufferHandle,
        lines: &[String],
    ) -> Result<(), EngineError> {
        let buf = self
            .buffers
            .get_mut(&buffer)
            .ok_or(EngineError::UnknownBuffer(buffer))?;
        buf.lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines.to_vec()
        };
        buf.cursor = motion::clamp(&buf.lines, buf.cursor, false);
        buf.anchor = motion::clamp(&buf.lines, buf.anchor, false);
        Ok(())
    }

    fn buffer_content(&self, buffer: BufferHandle) -> Result<Vec<String>, EngineError> {
        self.buffers
            .get(&buffer)
            .map(|b| b.lines.clone())
            .ok_or(EngineError::UnknownBuffer(buffer))
    }

    fn set_buffer_name(&mut self, buffer: BufferHandle, name: &str) -> Result<(), EngineError> {
        let buf = self
            .buffers
            .get_mut(&buffer)
            .ok_or(EngineError::UnknownBuffer(buffer))?;
        buf.name = Some(name.to_owned());
        Ok(())
    }

    fn focus_buffer(&mut self, buffer: BufferHandle) -> Result<(), EngineError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(EngineError::UnknownBuffer(buffer));
        }
        self.focused = Some(buffer);
        Ok(())
    }

    fn focused_buffer(&self) -> Option<BufferHandle> {
        self.focused
    }

    fn close_buffer(&mut self, buffer: BufferHandle) -> Result<(), EngineError> {
        self.buffers
            .remove(&buffer)
            .ok_or(EngineError::UnknownBuffer(buffer))?;
        if self.focused == Some(buffer) {
            self.focused = None;
        }
        debug!(target: "engine.minivim", buffer = %buffer, "buffer_closed");
        Ok(())
    }

    fn current_mode(&self) -> EngineMode {
        self.mode
    }

    fn press_key(&mut self, literal: &str) {
        let Some(handle) = self.focused else {
            trace!(target: "engine.minivim", "press_without_buffer");
            return;
        };
        let Some(mut buf) = self.buffers.remove(&handle) else {
            return;
        };
        for key in keys(literal) {
            self.dispatch(&mut buf, key);
        }
        buf.settle(self.mode.is_insert());
        trace!(target: "engine.minivim", mode = self.mode.as_str(), cursor = %buf.cursor, "keys_processed");
        self.buffers.insert(handle, buf);
    }

    fn move_cursor(&mut self, pos: RowCol) {
        let past_end = self.mode.is_insert();
        if self.mode.is_visual() {
            self.mode = EngineMode::Normal;
        }
        if let Some(buf) = self.focused_mut() {
            buf.cursor = motion::clamp(&buf.lines, pos, past_end);
            buf.anchor = buf.cursor;
        }
    }

    fn set_visual_selection(&mut self, anchor: RowCol, cursor: RowCol) {
        let Some(buf) = self.focused_mut() else {
            return;
        };
        // host far ends are exclusive; the engine's are inclusive
        let (anchor, cursor) = if cursor > anchor {
            (anchor, step_back(&buf.lines, cursor))
        } else if anchor > cursor {
            (step_back(&buf.lines, anchor), cursor)
        } else {
            (anchor, cursor)
        };
        buf.anchor = motion::clamp(&buf.lines, anchor, false);
        buf.cursor = motion::clamp(&buf.lines, cursor, false);
        self.mode = EngineMode::Visual(VisualMode::Char);
    }

    fn current_selection(&self) -> EngineSelection {
        let Some(buf) = self.focused.and_then(|h| self.buffers.get(&h)) else {
            return EngineSelection::cursor(RowCol::origin());
        };
        match self.mode {
            EngineMode::Visual(mode) => EngineSelection {
                mode,
                anchor: buf.anchor,
                cursor: buf.cursor,
            },
            _ => EngineSelection::cursor(buf.cursor),
        }
    }

    fn take_line_input_request(&mut self) -> Option<char> {
        self.line_request.take()
    }
}

/// Previous character position, crossing to the end of the previous row.
fn step_back(lines: &[String], pos: RowCol) -> RowCol {
    if pos.col > 0 {
        RowCol::new(pos.row, pos.col - 1)
    } else if pos.row > 0 {
        RowCol::new(pos.row - 1, motion::max_col(lines, pos.row - 1, true))
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_sequences_are_single_keys() {
        assert_eq!(keys("\x1b[A"), vec![Key::Up]);
        assert_eq!(keys("\x1b"), vec![Key::Esc]);
        assert_eq!(keys("\x1bx"), vec![Key::Esc, Key::Char('x')]);
        assert_eq!(keys("ab"), vec![Key::Char('a'), Key::Char('b')]);
    }

    #[test]
    fn step_back_crosses_rows() {
        let lines = vec!["ab".to_owned(), "c".to_owned()];
        assert_eq!(step_back(&lines, RowCol::new(1, 0)), RowCol::new(0, 2));
        assert_eq!(step_back(&lines, RowCol::new(0, 0)), RowCol::new(0, 0));
    }
}
