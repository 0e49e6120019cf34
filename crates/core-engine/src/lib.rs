//! Modal engine abstraction.
//!
//! The engine is the embedded vi-like interpreter the bridge drives. It owns
//! a mirror of each surface's text, a row/column cursor, the visual anchor
//! and the mode machine; the bridge only talks to it through [`ModalEngine`].
//! Mode is engine-wide (there is one interpreter), buffers are per surface.
//!
//! [`MiniVim`] is a small reference implementation: enough of the normal,
//! insert, visual and command-line modes to exercise every bridge path.

use core_selection::{RowCol, VisualMode};
use std::fmt;

mod minivim;
mod motion;

pub use minivim::MiniVim;

/// Engine-side buffer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf{}", self.0)
    }
}

/// Engine mode as observed by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineMode {
    #[default]
    Normal,
    Insert,
    Replace,
    /// Any visual sub-mode; never `VisualMode::None`.
    Visual(VisualMode),
    CommandLine,
    OperatorPending,
}

impl EngineMode {
    /// Text-entry modes.
    pub fn is_insert(self) -> bool {
        matches!(self, EngineMode::Insert | EngineMode::Replace)
    }

    pub fn is_visual(self) -> bool {
        matches!(self, EngineMode::Visual(_))
    }

    /// Block caret for everything that is neither text entry nor visual.
    pub fn wants_wide_caret(self) -> bool {
        !(self.is_insert() || self.is_visual())
    }

    pub fn visual_mode(self) -> VisualMode {
        match self {
            EngineMode::Visual(mode) => mode,
            _ => VisualMode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineMode::Normal => "NORMAL",
            EngineMode::Insert => "INSERT",
            EngineMode::Replace => "REPLACE",
            EngineMode::Visual(VisualMode::Line) => "V-LINE",
            EngineMode::Visual(VisualMode::Block) => "V-BLOCK",
            EngineMode::Visual(_) => "VISUAL",
            EngineMode::CommandLine => "COMMAND",
            EngineMode::OperatorPending => "OP-PENDING",
        }
    }
}

/// Current selection of the focused buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSelection {
    pub mode: VisualMode,
    pub anchor: RowCol,
    pub cursor: RowCol,
}

impl EngineSelection {
    pub fn cursor(pos: RowCol) -> Self {
        Self {
            mode: VisualMode::None,
            anchor: pos,
            cursor: pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("modal engine is unavailable")]
    Unavailable,
    #[error("unknown engine buffer {0}")]
    UnknownBuffer(BufferHandle),
}

/// Operations the bridge performs on the modal engine.
///
/// Cursor and selection calls act on the focused buffer.
pub trait ModalEngine {
    fn is_available(&self) -> bool {
        true
    }

    fn new_buffer(&mut self) -> Result<BufferHandle, EngineError>;
    fn set_buffer_content(&mut self, buffer: BufferHandle, lines: &[String])
    -> Result<(), EngineError>;
    fn buffer_content(&self, buffer: BufferHandle) -> Result<Vec<String>, EngineError>;
    fn set_buffer_name(&mut self, buffer: BufferHandle, name: &str) -> Result<(), EngineError>;
    fn focus_buffer(&mut self, buffer: BufferHandle) -> Result<(), EngineError>;
    fn focused_buffer(&self) -> Option<BufferHandle>;
    fn close_buffer(&mut self, buffer: BufferHandle) -> Result<(), EngineError>;

    fn current_mode(&self) -> EngineMode;
    /// Feed a literal key sequence (see `core-keys`).
    fn press_key(&mut self, literal: &str);
    /// Collapse to a cursor at `pos`, leaving any visual mode.
    fn move_cursor(&mut self, pos: RowCol);
    /// Enter character-wise visual mode with the given endpoints.
    fn set_visual_selection(&mut self, anchor: RowCol, cursor: RowCol);
    fn current_selection(&self) -> EngineSelection;

    /// Character that opened a pending line-input prompt (`:` or `/`), if the
    /// engine asked for one since the last call.
    fn take_line_input_request(&mut self) -> Option<char>;
}
