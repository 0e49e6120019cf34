//! Host surface abstraction.
//!
//! A host surface is one editing view owned by the host editor: it holds
//! text, a character-offset selection, a caret style and a handful of flags
//! the bridge reads and writes. The bridge never owns a surface; the host
//! passes `&mut dyn HostSurface` into every hook.
//!
//! Text mutation goes through [`Edit`], a scoped transaction guard that
//! rolls back on every exit path that does not commit. [`MemorySurface`] is
//! the in-memory implementation used by tests and the CLI.

use bitflags::bitflags;
use core_selection::{LineGeometry, SelectionSnapshot};
use std::fmt;
use std::ops::Range;

pub mod edit;
pub mod memory;

pub use edit::Edit;
pub use memory::{InputPanel, MemorySurface};

/// Host-assigned surface id. Hosts may hand the same id to a new surface once
/// the old one is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Distinguishes successive live surfaces that reused one [`SurfaceId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceIdentity(pub u64);

/// Id plus identity: names exactly one live surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceKey {
    pub id: SurfaceId,
    pub identity: SurfaceIdentity,
}

impl SurfaceKey {
    pub const fn new(id: SurfaceId, identity: SurfaceIdentity) -> Self {
        Self { id, identity }
    }
}

bitflags! {
    /// Per-surface settings shared between host and bridge.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceFlags: u8 {
        /// Key events on this surface are routed to the bridge.
        const INTERCEPT = 1 << 0;
        /// Modal editing is enabled on this surface.
        const MODAL = 1 << 1;
        /// Surface is an input panel forwarding to another surface's bridge.
        const PROXY = 1 << 2;
        /// Block caret is currently shown.
        const WIDE_CARET = 1 << 3;
    }
}

/// Token naming the host's open edit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("surface {0} is closed")]
    Closed(SurfaceId),
    #[error("surface {0} already has an edit in progress")]
    EditInProgress(SurfaceId),
    #[error("edit token {0:?} is not the active edit")]
    StaleEdit(EditToken),
    #[error("input widget unavailable: {0}")]
    WidgetUnavailable(String),
}

/// Operations the bridge performs on a host surface.
///
/// Geometry queries come from the [`LineGeometry`] supertrait and always
/// reflect the current text, including uncommitted edits.
pub trait HostSurface: LineGeometry {
    fn id(&self) -> SurfaceId;
    fn identity(&self) -> SurfaceIdentity;

    fn key(&self) -> SurfaceKey {
        SurfaceKey::new(self.id(), self.identity())
    }

    /// False once the host has destroyed the surface.
    fn is_valid(&self) -> bool;

    /// File name backing the surface, when there is one.
    fn file_name(&self) -> Option<String> {
        None
    }

    fn flags(&self) -> SurfaceFlags;
    fn set_flags(&mut self, flags: SurfaceFlags);

    fn selection(&self) -> SelectionSnapshot;
    fn set_selection(&mut self, selection: &SelectionSnapshot);

    fn full_text(&self) -> String;

    fn set_caret_style(&mut self, wide: bool);

    /// Open an edit transaction. Prefer [`Edit::begin`].
    fn begin_edit(&mut self) -> Result<EditToken, HostError>;
    fn replace(&mut self, token: EditToken, range: Range<usize>, text: &str)
    -> Result<(), HostError>;
    /// Close the transaction, keeping its changes when `commit` is true and
    /// restoring the pre-edit text otherwise.
    fn end_edit(&mut self, token: EditToken, commit: bool);

    /// Show the modal single-line input widget seeded with `initial`. The
    /// widget surface receives `flags`; its id is returned.
    fn open_input_widget(
        &mut self,
        initial: char,
        flags: SurfaceFlags,
    ) -> Result<SurfaceId, HostError>;
    fn close_input_widget(&mut self, panel: SurfaceId);
}
