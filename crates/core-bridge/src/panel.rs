//! Command-line panel adapter.
//!
//! When the engine asks for a line of input (after `:` or `/`), the owner
//! surface opens its single-line input widget seeded with that character.
//! Keys typed into the widget are forwarded to the owner's bridge; closing the
//! widget sends `enter` (confirmed) or `escape` (cancelled).

use core_host::{HostError, HostSurface, SurfaceFlags, SurfaceId};
use tracing::debug;

/// How the host's input widget was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    Confirmed,
    Cancelled,
}

impl PanelOutcome {
    /// Logical key forwarded to the owner when the panel closes.
    pub fn key(self) -> &'static str {
        match self {
            PanelOutcome::Confirmed => "enter",
            PanelOutcome::Cancelled => "escape",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub id: SurfaceId,
    pub owner: SurfaceId,
    pub initial: char,
}

impl Panel {
    pub const FLAGS: SurfaceFlags = SurfaceFlags::INTERCEPT.union(SurfaceFlags::PROXY);

    /// Open the input widget on `owner`.
    pub fn show<S: HostSurface + ?Sized>(owner: &mut S, initial: char) -> Result<Self, HostError> {
        let id = owner.open_input_widget(initial, Self::FLAGS)?;
        debug!(target: "bridge.panel", owner = %owner.id(), panel = %id, initial = %initial, "panel_opened");
        Ok(Self {
            id,
            owner: owner.id(),
            initial,
        })
    }

    pub fn close<S: HostSurface + ?Sized>(owner: &mut S, panel: SurfaceId) {
        owner.close_input_widget(panel);
        debug!(target: "bridge.panel", owner = %owner.id(), panel = %panel, "panel_closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_host::MemorySurface;

    #[test]
    fn outcomes_map_to_keys() {
        assert_eq!(PanelOutcome::Confirmed.key(), "enter");
        assert_eq!(PanelOutcome::Cancelled.key(), "escape");
    }

    #[test]
    fn shown_panel_is_flagged_proxy() {
        let mut owner = MemorySurface::new("text");
        let panel = Panel::show(&mut owner, '/').unwrap();
        assert_eq!(panel.owner, owner.id());
        let widget = owner.open_panel().unwrap();
        assert_eq!(widget.id, panel.id);
        assert!(widget.flags.contains(SurfaceFlags::INTERCEPT | SurfaceFlags::PROXY));
        Panel::close(&mut owner, panel.id);
        assert!(owner.open_panel().is_none());
    }
}
