//! Key-script replay used by the `mbridge` binary.
//!
//! A replay opens one in-memory surface through the coordinator and feeds it
//! logical keys the way a host event loop would: one hook per key, deferred
//! work drained after each. While a command-line panel is open, keys go to
//! the panel; `enter` and `escape` close it.

use anyhow::{Result, bail};
use core_bridge::{Coordinator, PanelOutcome};
use core_engine::{EngineMode, MiniVim, ModalEngine};
use core_host::{HostSurface, MemorySurface};
use core_selection::SelectionSnapshot;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub text: String,
    pub selection: SelectionSnapshot,
    pub wide_caret: bool,
    pub mode: EngineMode,
    /// Keys the bridge accepted.
    pub handled: usize,
}

/// Parse `a:b` (or a bare offset) into a selection pair.
pub fn parse_selection(arg: &str) -> Result<(usize, usize), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid offset {s:?}: {e}"))
    };
    match arg.split_once(':') {
        Some((a, b)) => Ok((parse(a)?, parse(b)?)),
        None => parse(arg).map(|a| (a, a)),
    }
}

fn panel_outcome(key: &str) -> Option<PanelOutcome> {
    match key {
        "enter" => Some(PanelOutcome::Confirmed),
        "escape" => Some(PanelOutcome::Cancelled),
        _ => None,
    }
}

pub fn replay<K: AsRef<str>>(
    coordinator: &mut Coordinator<MiniVim>,
    surface: &mut MemorySurface,
    keys: &[K],
) -> Result<ReplayOutcome> {
    if !coordinator.on_surface_opened(surface) {
        bail!("no bridge could be attached to surface {}", surface.id());
    }
    coordinator.run_deferred(surface);

    let mut handled = 0;
    for key in keys.iter().map(|k| k.as_ref()) {
        let accepted = match surface.open_panel().map(|p| p.id) {
            Some(panel) => match panel_outcome(key) {
                Some(outcome) => {
                    surface.close_input_widget(panel);
                    coordinator.on_panel_closed(surface, panel, outcome);
                    true
                }
                None => coordinator.on_panel_key(surface, panel, key),
            },
            None => coordinator.on_key(surface, key),
        };
        if accepted {
            handled += 1;
        } else {
            warn!(target: "runtime.replay", key, "key_not_handled");
        }
        let ran = coordinator.run_deferred(surface);
        debug!(target: "runtime.replay", key, deferred = ran, "key_replayed");
    }

    Ok(ReplayOutcome {
        text: surface.text(),
        selection: surface.selection(),
        wide_caret: surface.caret_is_wide(),
        mode: coordinator.engine().current_mode(),
        handled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_argument_forms() {
        assert_eq!(parse_selection("3:7"), Ok((3, 7)));
        assert_eq!(parse_selection("7:3"), Ok((7, 3)));
        assert_eq!(parse_selection("5"), Ok((5, 5)));
        assert!(parse_selection("x:1").is_err());
        assert!(parse_selection("").is_err());
    }
}
