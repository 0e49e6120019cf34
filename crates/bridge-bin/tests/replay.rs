use bridge_bin::replay;
use core_bridge::Coordinator;
use core_config::{BridgeConfig, Config, ConfigFile};
use core_engine::{EngineMode, MiniVim};
use core_host::MemorySurface;
use core_selection::SelectionSnapshot;
use pretty_assertions::assert_eq;

fn coordinator() -> Coordinator<MiniVim> {
    Coordinator::new(MiniVim::new(), Config::default())
}

#[test]
fn insert_script_edits_text() {
    let mut c = coordinator();
    let mut surface = MemorySurface::new("hello world");
    surface.select(SelectionSnapshot::point(6));
    let outcome = replay(&mut c, &mut surface, &["escape", "i", "x", "escape"]).unwrap();

    assert_eq!(outcome.text, "hello xworld");
    assert_eq!(outcome.selection, SelectionSnapshot::point(6));
    assert!(outcome.wide_caret);
    assert_eq!(outcome.mode, EngineMode::Normal);
    assert_eq!(outcome.handled, 4);
}

#[test]
fn command_line_keys_go_through_panel() {
    let mut c = coordinator();
    let mut surface = MemorySurface::new("a\nb\nc");
    let outcome = replay(&mut c, &mut surface, &[":", "3", "enter"]).unwrap();

    assert_eq!(outcome.selection, SelectionSnapshot::point(4));
    assert_eq!(outcome.mode, EngineMode::Normal);
    assert!(surface.open_panel().is_none());
    assert_eq!(surface.panels().len(), 1);
}

#[test]
fn cancelled_command_keeps_cursor() {
    let mut c = coordinator();
    let mut surface = MemorySurface::new("a\nb\nc");
    let outcome = replay(&mut c, &mut surface, &["j", ":", "1", "escape"]).unwrap();
    assert_eq!(outcome.selection, SelectionSnapshot::point(2));
    assert_eq!(outcome.mode, EngineMode::Normal);
}

#[test]
fn disabled_bridge_is_an_error() {
    let config = Config {
        file: ConfigFile {
            bridge: BridgeConfig {
                enabled: false,
                start_in_command_mode: true,
            },
            ..ConfigFile::default()
        },
        ..Config::default()
    };
    let mut c = Coordinator::new(MiniVim::new(), config);
    let mut surface = MemorySurface::new("abc");
    let keys: [&str; 0] = [];
    assert!(replay(&mut c, &mut surface, &keys).is_err());
}
