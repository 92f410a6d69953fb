//! End-to-end scenarios driving `Terminal`/`InputEncoder` by feeding raw
//! bytes or logical input events and asserting on the resulting grid,
//! cursor, and encoder output, the way the teacher's in-module tests
//! drive `TerminalState` byte-by-byte.

use pretty_assertions::assert_eq;
use vt_core::callbacks::NullCallbacks;
use vt_core::color::Color;
use vt_core::cursor::CellAttrs;
use vt_core::input::{CursorKeyDirection, InputEncoder, MouseButton, MouseEventKind, MouseEncoding, MouseProtocol};
use vt_core::modes::DecMode;
use vt_core::terminal::Terminal;

fn term(rows: u16, cols: u16) -> Terminal {
    Terminal::new(rows, cols, Box::new(NullCallbacks))
}

#[test]
fn writes_hello_world_with_crlf() {
    let mut t = term(24, 80);
    t.feed(b"Hello, World!\r\n");

    let row0 = t.active_screen().grid.viewport_row(0).unwrap();
    assert_eq!(row0.to_text().trim_end(), "Hello, World!");
    assert_eq!(t.active_screen().cursor.row, 1);
    assert_eq!(t.active_screen().cursor.col, 0);
    assert!(!t.active_screen().cursor.autowrap_pending);
}

#[test]
fn autowrap_splits_across_rows_and_marks_wrapped_flag() {
    let mut t = term(24, 5);
    t.feed(b"abcdef");

    let row0 = t.active_screen().grid.viewport_row(0).unwrap();
    let row1 = t.active_screen().grid.viewport_row(1).unwrap();
    assert_eq!(row0.to_text(), "abcde");
    assert_eq!(row1.to_text().trim_end(), "f");
    assert_eq!(t.active_screen().cursor.row, 1);
    assert_eq!(t.active_screen().cursor.col, 1);
    assert!(!row0.is_wrapped());
    assert!(row1.is_wrapped());
}

#[test]
fn sgr_truecolor_sets_cell_foreground() {
    let mut t = term(24, 80);
    t.feed(b"\x1b[38;2;255;128;65mX");

    let row0 = t.active_screen().grid.viewport_row(0).unwrap();
    let cell = row0.cell(0).unwrap();
    assert_eq!(cell.fg, Color::Rgb(255, 128, 65));
    assert_eq!(cell.text, "X");
}

#[test]
fn colon_subparam_sgr_sets_curly_underline() {
    let mut t = term(24, 80);
    t.feed(b"\x1b[4:3mX");

    let row0 = t.active_screen().grid.viewport_row(0).unwrap();
    let cell = row0.cell(0).unwrap();
    assert!(cell.attrs.contains(CellAttrs::CURLY_UNDERLINE));
}

#[test]
fn ctrl_space_encodes_as_nul() {
    assert_eq!(InputEncoder::encode_ctrl(' '), Some(0x00));
}

#[test]
fn sgr_mouse_left_press_at_cell() {
    let mut enc = InputEncoder::new();
    enc.mouse_protocol.protocol = Some(MouseProtocol::Normal);
    enc.mouse_protocol.encoding = MouseEncoding::Sgr;
    let out = enc.encode_mouse(
        MouseButton::Left,
        MouseEventKind::Press,
        vt_core::input::Modifiers::empty(),
        10,
        5,
    );
    assert_eq!(out, b"\x1b[<0;11;6M");
}

#[test]
fn alt_screen_clear_scrollback_is_noop() {
    let mut t = term(3, 10);
    t.feed(b"one\r\ntwo\r\nthree\r\nfour\r\n"); // scroll primary, building scrollback
    assert!(t.active_screen().grid.scrollback_len() > 0);

    t.feed(b"\x1b[?1049h"); // enter alt screen
    assert!(t.using_alt_screen());
    t.feed(b"\x1b[3J"); // erase display + scrollback, should be a no-op on alt
    assert_eq!(t.active_screen().grid.scrollback_len(), 0);

    t.feed(b"\x1b[?1049l"); // back to primary
    assert!(t.active_screen().grid.scrollback_len() > 0);
}

#[test]
fn application_cursor_keys_mode_flips_encoder_via_dec_mode() {
    let mut t = term(24, 80);
    t.feed(b"\x1b[?1h");
    assert!(t.input.application_cursor_keys);
    let out = t.input.encode_cursor_key(CursorKeyDirection::Up, vt_core::input::Modifiers::empty());
    assert_eq!(out, b"\x1bOA");
    t.feed(b"\x1b[?1l");
    assert!(!t.input.application_cursor_keys);
}

#[test]
fn decstbm_restricted_region_does_not_feed_scrollback() {
    let mut t = term(5, 10);
    t.feed(b"\x1b[2;4r"); // restrict scroll region to rows 2..4 (1-indexed)
    for _ in 0..5 {
        t.feed(b"\r\n");
    }
    assert_eq!(t.active_screen().grid.scrollback_len(), 0);
}

#[test]
fn unknown_dec_mode_toggle_is_silently_ignored() {
    let mut t = term(24, 80);
    t.feed(b"\x1b[?9999h");
    assert!(t.modes.dec(DecMode::ShowCursor));
}
