#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_bridge::Coordinator;
use core_config::{BridgeConfig, Config, ConfigFile};
use core_engine::MiniVim;
use core_host::MemorySurface;
use core_selection::SelectionSnapshot;

pub fn coordinator() -> Coordinator<MiniVim> {
    Coordinator::new(MiniVim::new(), Config::default())
}

pub fn coordinator_with_bridge(bridge: BridgeConfig) -> Coordinator<MiniVim> {
    let config = Config {
        file: ConfigFile {
            bridge,
            ..ConfigFile::default()
        },
        ..Config::default()
    };
    Coordinator::new(MiniVim::new(), config)
}

/// Surface with the caret at `caret`, opened through the coordinator with
/// its deferred writes drained.
pub fn open(coordinator: &mut Coordinator<MiniVim>, text: &str, caret: usize) -> MemorySurface {
    let mut surface = MemorySurface::new(text);
    surface.select(SelectionSnapshot::point(caret));
    assert!(coordinator.on_surface_opened(&mut surface));
    coordinator.run_deferred(&mut surface);
    surface
}

/// Press one key and drain deferred work, as a host event loop would.
pub fn press(coordinator: &mut Coordinator<MiniVim>, surface: &mut MemorySurface, key: &str) {
    assert!(coordinator.on_key(surface, key), "key {key:?} not handled");
    coordinator.run_deferred(surface);
}

pub fn press_all(coordinator: &mut Coordinator<MiniVim>, surface: &mut MemorySurface, keys: &[&str]) {
    for key in keys {
        press(coordinator, surface, key);
    }
}

/// Host-side selection change followed by the host notification.
pub fn select(
    coordinator: &mut Coordinator<MiniVim>,
    surface: &mut MemorySurface,
    selection: impl Into<SelectionSnapshot>,
) {
    surface.select(selection);
    coordinator.on_selection_modified(surface);
    coordinator.run_deferred(surface);
}
