//! In-memory host surface.
//!
//! Behaves like a minimal host view: a [`Document`], a selection clamped to
//! the text, caret style, flags, single-level edit transactions, and input
//! panels recorded as child surfaces. Counters expose how often the bridge
//! wrote text or selection so tests can assert on churn.

use crate::{EditToken, HostError, HostSurface, SurfaceFlags, SurfaceId, SurfaceIdentity};
use core_selection::{LineGeometry, Range, RowCol, SelectionSnapshot};
use core_text::Document;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

fn next_surface_id() -> SurfaceId {
    SurfaceId(NEXT_SURFACE.fetch_add(1, Ordering::Relaxed))
}

fn next_identity() -> SurfaceIdentity {
    SurfaceIdentity(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
}

/// Input widget opened on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPanel {
    pub id: SurfaceId,
    pub initial: char,
    pub flags: SurfaceFlags,
    pub open: bool,
}

#[derive(Debug)]
struct PendingEdit {
    token: EditToken,
    backup: Document,
}

#[derive(Debug)]
pub struct MemorySurface {
    id: SurfaceId,
    identity: SurfaceIdentity,
    valid: bool,
    doc: Document,
    selection: SelectionSnapshot,
    flags: SurfaceFlags,
    wide_caret: bool,
    file_name: Option<String>,
    edit: Option<PendingEdit>,
    next_token: u64,
    panels: Vec<InputPanel>,
    edits_committed: usize,
    selection_writes: usize,
}

impl MemorySurface {
    /// New surface with a fresh id, caret at offset 0.
    pub fn new(text: &str) -> Self {
        Self::with_id(next_surface_id(), text)
    }

    /// New surface reusing `id` (as hosts do after destroying a surface).
    pub fn with_id(id: SurfaceId, text: &str) -> Self {
        Self {
            id,
            identity: next_identity(),
            valid: true,
            doc: Document::from_str(text),
            selection: SelectionSnapshot::point(0),
            flags: SurfaceFlags::empty(),
            wide_caret: false,
            file_name: None,
            edit: None,
            next_token: 1,
            panels: Vec::new(),
            edits_committed: 0,
            selection_writes: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host-side selection change (a click or drag), bypassing the bridge.
    pub fn select(&mut self, selection: impl Into<SelectionSnapshot>) {
        self.selection = self.clamp_selection(&selection.into());
    }

    /// Host-side text change, bypassing the bridge.
    pub fn type_text(&mut self, offset: usize, text: &str) {
        self.doc.replace(offset..offset, text);
    }

    pub fn caret_is_wide(&self) -> bool {
        self.wide_caret
    }

    /// Destroy the surface.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Simulate the host destroying this surface and handing its id to a new
    /// one: same id, new identity, fresh text.
    pub fn recycle(&mut self, text: &str) {
        let id = self.id;
        *self = Self::with_id(id, text);
    }

    pub fn panels(&self) -> &[InputPanel] {
        &self.panels
    }

    pub fn open_panel(&self) -> Option<&InputPanel> {
        self.panels.iter().rev().find(|p| p.open)
    }

    pub fn edits_committed(&self) -> usize {
        self.edits_committed
    }

    pub fn selection_writes(&self) -> usize {
        self.selection_writes
    }

    pub fn edit_in_progress(&self) -> bool {
        self.edit.is_some()
    }

    fn clamp_selection(&self, selection: &SelectionSnapshot) -> SelectionSnapshot {
        let len = self.doc.len_chars();
        let clamped: SelectionSnapshot = selection
            .iter()
            .map(|r| Range::new(r.anchor.min(len), r.head.min(len)))
            .collect();
        if clamped.is_empty() {
            SelectionSnapshot::point(0)
        } else {
            clamped
        }
    }
}

impl LineGeometry for MemorySurface {
    fn to_offset(&self, pos: RowCol) -> usize {
        self.doc.to_offset(pos)
    }
    fn line_bounds(&self, offset: usize) -> (usize, usize) {
        self.doc.line_bounds(offset)
    }
    fn row_col_of(&self, offset: usize) -> RowCol {
        self.doc.row_col_of(offset)
    }
    fn text_len(&self) -> usize {
        self.doc.len_chars()
    }
}

impl HostSurface for MemorySurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn identity(&self) -> SurfaceIdentity {
        self.identity
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }

    fn flags(&self) -> SurfaceFlags {
        self.flags
    }

    fn set_flags(&mut self, flags: SurfaceFlags) {
        self.flags = flags;
    }

    fn selection(&self) -> SelectionSnapshot {
        self.selection.clone()
    }

    fn set_selection(&mut self, selection: &SelectionSnapshot) {
        self.selection = self.clamp_selection(selection);
        self.selection_writes += 1;
        trace!(target: "host.memory", surface = %self.id, ranges = ?self.selection.pairs(), "set_selection");
    }

    fn full_text(&self) -> String {
        self.doc.text()
    }

    fn set_caret_style(&mut self, wide: bool) {
        self.wide_caret = wide;
    }

    fn begin_edit(&mut self) -> Result<EditToken, HostError> {
        if !self.valid {
            return Err(HostError::Closed(self.id));
        }
        if self.edit.is_some() {
            return Err(HostError::EditInProgress(self.id));
        }
        let token = EditToken(self.next_token);
        self.next_token += 1;
        self.edit = Some(PendingEdit {
            token,
            backup: self.doc.clone(),
        });
        Ok(token)
    }

    fn replace(
        &mut self,
        token: EditToken,
        range: std::ops::Range<usize>,
        text: &str,
    ) -> Result<(), HostError> {
        match &self.edit {
            Some(edit) if edit.token == token => {
                self.doc.replace(range, text);
                Ok(())
            }
            _ => Err(HostError::StaleEdit(token)),
        }
    }

    fn end_edit(&mut self, token: EditToken, commit: bool) {
        let Some(edit) = self.edit.take_if(|e| e.token == token) else {
            return;
        };
        if commit {
            self.edits_committed += 1;
        } else {
            self.doc = edit.backup;
        }
        self.selection = self.clamp_selection(&self.selection);
    }

    fn open_input_widget(
        &mut self,
        initial: char,
        flags: SurfaceFlags,
    ) -> Result<SurfaceId, HostError> {
        if !self.valid {
            return Err(HostError::Closed(self.id));
        }
        let id = next_surface_id();
        self.panels.push(InputPanel {
            id,
            initial,
            flags,
            open: true,
        });
        Ok(id)
    }

    fn close_input_widget(&mut self, panel: SurfaceId) {
        if let Some(p) = self.panels.iter_mut().find(|p| p.id == panel) {
            p.open = false;
        }
    }
}
