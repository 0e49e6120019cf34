//! Per-surface bridge state.
//!
//! State layouts are versioned. When a field is added, the previous layout is
//! kept as `BridgeStateV<n>` with a `From` conversion into the current one, and
//! [`crate::Registry::migrate`] moves a live registry across.

use core_engine::BufferHandle;
use core_host::{SurfaceId, SurfaceIdentity, SurfaceKey};
use core_selection::SelectionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaretStyle {
    /// Block caret (command modes).
    #[default]
    Wide,
    /// Bar caret (text entry and visual modes).
    Thin,
}

impl CaretStyle {
    pub fn from_wide(wide: bool) -> Self {
        if wide { Self::Wide } else { Self::Thin }
    }

    pub fn is_wide(self) -> bool {
        self == Self::Wide
    }
}

/// Current per-surface state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeState {
    pub surface: SurfaceId,
    pub identity: SurfaceIdentity,
    /// Host selection as of the last completed synchronization.
    pub last_selection: Option<SelectionSnapshot>,
    /// Engine buffer, created on first activation.
    pub buffer: Option<BufferHandle>,
    /// Open command-line panel.
    pub panel: Option<SurfaceId>,
    pub caret: CaretStyle,
}

impl BridgeState {
    pub fn new(key: SurfaceKey, caret: CaretStyle) -> Self {
        Self {
            surface: key.id,
            identity: key.identity,
            last_selection: None,
            buffer: None,
            panel: None,
            caret,
        }
    }

    pub fn key(&self) -> SurfaceKey {
        SurfaceKey::new(self.surface, self.identity)
    }
}

/// Layout used before panels and caret style were tracked per surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeStateV1 {
    pub surface: SurfaceId,
    pub identity: SurfaceIdentity,
    pub last_selection: Option<SelectionSnapshot>,
    pub buffer: Option<BufferHandle>,
}

impl BridgeStateV1 {
    pub fn new(key: SurfaceKey) -> Self {
        Self {
            surface: key.id,
            identity: key.identity,
            last_selection: None,
            buffer: None,
        }
    }
}

impl From<BridgeStateV1> for BridgeState {
    fn from(old: BridgeStateV1) -> Self {
        Self {
            surface: old.surface,
            identity: old.identity,
            last_selection: old.last_selection,
            buffer: old.buffer,
            panel: None,
            caret: CaretStyle::default(),
        }
    }
}
