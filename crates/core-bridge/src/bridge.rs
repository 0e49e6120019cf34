//! Per-surface synchronization.
//!
//! A [`Bridge`] is a short-lived view over one surface's [`BridgeState`] plus
//! the shared engine, task queue and key translator. The coordinator builds
//! one per hook call.

use crate::panel::Panel;
use crate::queue::{Deferred, TaskQueue};
use crate::state::{BridgeState, CaretStyle};
use crate::BridgeError;
use core_engine::{BufferHandle, ModalEngine};
use core_host::{Edit, HostSurface, SurfaceFlags};
use core_keys::KeyTranslator;
use core_selection::{LineGeometry, SelectionSnapshot, resolve};
use tracing::{debug, info, trace, warn};

pub struct Bridge<'a, E, S>
where
    E: ModalEngine + ?Sized,
    S: HostSurface + ?Sized,
{
    state: &'a mut BridgeState,
    engine: &'a mut E,
    surface: &'a mut S,
    queue: &'a mut TaskQueue,
    keys: &'a KeyTranslator,
}

/// Host ranges for the engine's current selection.
fn engine_ranges<E, G>(engine: &E, geometry: &G) -> SelectionSnapshot
where
    E: ModalEngine + ?Sized,
    G: LineGeometry + ?Sized,
{
    let sel = engine.current_selection();
    resolve(sel.mode, sel.anchor, sel.cursor, geometry)
}

impl<'a, E, S> Bridge<'a, E, S>
where
    E: ModalEngine + ?Sized,
    S: HostSurface + ?Sized,
{
    pub fn new(
        state: &'a mut BridgeState,
        engine: &'a mut E,
        surface: &'a mut S,
        queue: &'a mut TaskQueue,
        keys: &'a KeyTranslator,
    ) -> Self {
        Self {
            state,
            engine,
            surface,
            queue,
            keys,
        }
    }

    pub fn state(&self) -> &BridgeState {
        &*self.state
    }

    /// Make sure the surface has an engine buffer and that it is the focused
    /// one. The first activation seeds the buffer from the host text and
    /// pushes the host selection into the engine. The caret keeps the style
    /// it was constructed with until the next key or selection change.
    pub fn activate(&mut self) -> Result<BufferHandle, BridgeError> {
        if !self.engine.is_available() {
            return Err(BridgeError::EngineUnavailable);
        }
        let Some(buffer) = self.state.buffer else {
            let buffer = self.attach()?;
            // a fresh buffer has no cursor yet
            self.state.last_selection = None;
            self.push_selection();
            return Ok(buffer);
        };
        if self.engine.focused_buffer() != Some(buffer) {
            self.engine.focus_buffer(buffer)?;
            trace!(target: "bridge.sync", surface = %self.state.surface, buffer = %buffer, "buffer_refocused");
        }
        Ok(buffer)
    }

    fn attach(&mut self) -> Result<BufferHandle, BridgeError> {
        let buffer = self.engine.new_buffer()?;
        if let Err(err) = self.seed(buffer) {
            if let Err(close_err) = self.engine.close_buffer(buffer) {
                warn!(target: "bridge.sync", surface = %self.state.surface, buffer = %buffer, error = %close_err, "buffer_release_failed");
            }
            return Err(err);
        }
        self.state.buffer = Some(buffer);
        info!(target: "bridge.sync", surface = %self.state.surface, buffer = %buffer, "buffer_attached");
        Ok(buffer)
    }

    fn seed(&mut self, buffer: BufferHandle) -> Result<(), BridgeError> {
        let lines: Vec<String> = self
            .surface
            .full_text()
            .split('\n')
            .map(str::to_owned)
            .collect();
        self.engine.set_buffer_content(buffer, &lines)?;
        if let Some(name) = self.surface.file_name() {
            self.engine.set_buffer_name(buffer, &name)?;
        }
        self.engine.focus_buffer(buffer)?;
        Ok(())
    }

    /// Push the host selection into the engine when it changed since the last
    /// synchronization.
    pub fn sel_to_vim(&mut self) -> Result<(), BridgeError> {
        self.activate()?;
        if self.push_selection() {
            self.update_caret();
        }
        Ok(())
    }

    /// Move the engine cursor or selection to the host selection. False when
    /// the selection is unchanged.
    fn push_selection(&mut self) -> bool {
        let current = self.surface.selection();
        if self.state.last_selection.as_ref() == Some(&current) {
            return false;
        }
        let Some(primary) = current.primary() else {
            return false;
        };
        let head = self.surface.row_col_of(primary.head);
        if primary.is_empty() {
            self.engine.move_cursor(head);
        } else {
            let anchor = self.surface.row_col_of(primary.anchor);
            self.engine.set_visual_selection(anchor, head);
        }
        trace!(
            target: "bridge.sync",
            surface = %self.state.surface,
            ranges = ?current.pairs(),
            "sel_to_vim_pushed"
        );
        self.state.last_selection = Some(current);
        self.sel_from_vim();
        true
    }

    /// Queue a host selection write reflecting the engine selection.
    pub fn sel_from_vim(&mut self) {
        let selection = engine_ranges(&*self.engine, &*self.surface);
        self.queue.push(Deferred::Select {
            surface: self.state.surface,
            selection,
        });
    }

    /// Attach the engine selection to `edit`, to be written when it commits.
    pub fn sel_from_vim_in(engine: &E, edit: &mut Edit<'_, S>) {
        let selection = engine_ranges(engine, edit.surface());
        edit.select_on_commit(selection);
    }

    /// Forward one logical key to the engine and bring the host in line with
    /// the result. Returns the character of a pending line-input request.
    pub fn press(&mut self, key: &str) -> Result<Option<char>, BridgeError> {
        let buffer = self.activate()?;
        let literal = self.keys.translate(key);
        self.engine.press_key(&literal);

        let text = self.engine.buffer_content(buffer)?.join("\n");
        let replaced = text != self.surface.full_text();
        if replaced {
            let mut edit = Edit::begin(&mut *self.surface)?;
            edit.replace_all(&text)?;
            Self::sel_from_vim_in(&*self.engine, &mut edit);
            self.state.last_selection = edit.commit();
            self.queue.discard(self.state.surface);
        } else {
            self.sel_from_vim();
        }
        trace!(
            target: "bridge.press",
            surface = %self.state.surface,
            key,
            literal = ?literal,
            replaced,
            mode = self.engine.current_mode().as_str(),
            "key_pressed"
        );

        self.update_caret();
        Ok(self.engine.take_line_input_request())
    }

    /// Caret is wide outside text entry and visual modes.
    pub fn update_caret(&mut self) {
        let wide = self.engine.current_mode().wants_wide_caret();
        self.surface.set_caret_style(wide);
        let mut flags = self.surface.flags();
        flags.set(SurfaceFlags::WIDE_CARET, wide);
        self.surface.set_flags(flags);
        self.state.caret = CaretStyle::from_wide(wide);
    }

    /// Release the engine buffer and any open panel. The state itself is
    /// dropped by the caller.
    pub fn close(&mut self) {
        if let Some(buffer) = self.state.buffer.take() {
            if let Err(err) = self.engine.close_buffer(buffer) {
                warn!(target: "bridge.sync", surface = %self.state.surface, error = %err, "buffer_release_failed");
            }
        }
        if let Some(panel) = self.state.panel.take() {
            Panel::close(&mut *self.surface, panel);
        }
        let dropped = self.queue.discard(self.state.surface);
        debug!(target: "bridge.sync", surface = %self.state.surface, dropped, "bridge_closed");
    }
}
