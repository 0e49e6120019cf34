mod common;

use common::{coordinator, open, press, select};
use core_engine::{EngineMode, ModalEngine};
use core_host::HostSurface;
use core_selection::{RowCol, SelectionSnapshot, VisualMode};
use pretty_assertions::assert_eq;

#[test]
fn host_range_enters_visual_mode() {
    let mut c = coordinator();
    let mut s = open(&mut c, "hello world", 0);
    select(&mut c, &mut s, [(0, 5)]);

    let sel = c.engine().current_selection();
    assert_eq!(sel.mode, VisualMode::Char);
    assert_eq!((sel.anchor, sel.cursor), (RowCol::new(0, 0), RowCol::new(0, 4)));
    assert_eq!(s.selection().pairs(), vec![(0, 5)]);
    assert!(!s.caret_is_wide());
}

#[test]
fn reversed_host_range_is_stable() {
    let mut c = coordinator();
    let mut s = open(&mut c, "hello world", 0);
    select(&mut c, &mut s, [(5, 0)]);
    assert_eq!(s.selection().pairs(), vec![(5, 0)]);
}

#[test]
fn multi_row_host_range_is_stable() {
    let mut c = coordinator();
    let mut s = open(&mut c, "ab\ncd", 0);
    select(&mut c, &mut s, [(1, 4)]);
    assert_eq!(s.selection().pairs(), vec![(1, 4)]);
    let sel = c.engine().current_selection();
    assert_eq!(sel.cursor, RowCol::new(1, 0));
}

#[test]
fn click_collapses_engine_selection() {
    let mut c = coordinator();
    let mut s = open(&mut c, "hello world", 0);
    select(&mut c, &mut s, [(0, 5)]);
    select(&mut c, &mut s, SelectionSnapshot::point(3));

    assert_eq!(c.engine().current_mode(), EngineMode::Normal);
    assert_eq!(c.engine().current_selection().cursor, RowCol::new(0, 3));
    assert!(s.caret_is_wide());
}

#[test]
fn unchanged_selection_is_a_no_op() {
    let mut c = coordinator();
    let mut s = open(&mut c, "hello", 2);
    let writes = s.selection_writes();
    c.on_selection_modified(&mut s);
    assert!(c.queue().is_empty());
    assert_eq!(s.selection_writes(), writes);
}

#[test]
fn host_selection_then_delete() {
    let mut c = coordinator();
    let mut s = open(&mut c, "hello world", 0);
    select(&mut c, &mut s, [(0, 6)]);
    press(&mut c, &mut s, "d");
    assert_eq!(s.text(), "world");
    assert_eq!(s.selection(), SelectionSnapshot::point(0));
}

#[test]
fn host_side_edits_are_replaced_by_engine_text() {
    let mut c = coordinator();
    let mut s = open(&mut c, "abc", 0);
    s.type_text(3, "!");
    press(&mut c, &mut s, "x");
    assert_eq!(s.text(), "bc");
}
