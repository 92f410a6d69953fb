//! Function Dispatcher: turns an assembled `Sequence` into a state
//! transition on the terminal. Organized as one function per
//! `SequenceCategory`, each doing the `(leader, final_byte)` match the
//! teacher's `csi_dispatch`/`esc_dispatch`/`osc_dispatch` used, just
//! promoted to operate on `Sequence`/`ParamList` instead of raw vte
//! callback arguments.

use base64::Engine;

use crate::callbacks::{ClipboardSelection, ColorQuery};
use crate::charset::{CharsetId, GSet};
use crate::color::Color;
use crate::cursor::{CellAttrs, CursorShape};
use crate::modes::{AnsiMode, DecMode};
use crate::parser::{Sequence, SequenceCategory};
use crate::terminal::Terminal;

pub fn dispatch(term: &mut Terminal, seq: Sequence) {
    match seq.category {
        SequenceCategory::Csi => csi(term, &seq),
        SequenceCategory::Escape => esc(term, &seq),
        SequenceCategory::Osc => osc(term, &seq),
        SequenceCategory::Dcs | SequenceCategory::Apc | SequenceCategory::Pm => {}
    }
}

fn csi(term: &mut Terminal, seq: &Sequence) {
    let p = &seq.params;
    match (seq.leader, seq.final_byte) {
        (None, b'A') => term.move_cursor_up(p.get(0, 1).max(1)),
        (None, b'B') | (None, b'e') => term.move_cursor_down(p.get(0, 1).max(1)),
        (None, b'C') | (None, b'a') => term.move_cursor_forward(p.get(0, 1).max(1)),
        (None, b'D') => term.move_cursor_backward(p.get(0, 1).max(1)),
        (None, b'E') => {
            term.move_cursor_down(p.get(0, 1).max(1));
            term.move_cursor_to_col(0);
        }
        (None, b'F') => {
            term.move_cursor_up(p.get(0, 1).max(1));
            term.move_cursor_to_col(0);
        }
        (None, b'G') | (None, b'`') => term.move_cursor_to_col(p.get(0, 1).saturating_sub(1)),
        (None, b'd') => term.move_cursor_to_row(p.get(0, 1).saturating_sub(1)),
        (None, b'H') | (None, b'f') => {
            let row = p.get(0, 1).saturating_sub(1);
            let col = p.get(1, 1).saturating_sub(1);
            term.move_cursor_to(row, col);
        }
        (None, b'J') => term.active_screen_mut().erase_display(p.get(0, 0)),
        (None, b'K') => term.active_screen_mut().erase_line(p.get(0, 0)),
        (None, b'L') => term.active_screen_mut().insert_lines(p.get(0, 1).max(1)),
        (None, b'M') => term.active_screen_mut().delete_lines(p.get(0, 1).max(1)),
        (None, b'P') => term.active_screen_mut().delete_chars(p.get(0, 1).max(1)),
        (None, b'@') => term.active_screen_mut().insert_chars(p.get(0, 1).max(1)),
        (None, b'X') => term.active_screen_mut().erase_chars(p.get(0, 1).max(1)),
        (None, b'S') => term.active_screen_mut().scroll_up(p.get(0, 1).max(1)),
        (None, b'T') => term.active_screen_mut().scroll_down(p.get(0, 1).max(1)),
        (None, b'b') => {
            if let Some(ch) = term.last_printed_char {
                for _ in 0..p.get(0, 1).max(1) {
                    term.print_char(ch);
                }
            }
        }
        (None, b'g') => match p.get(0, 0) {
            0 => {
                let col = term.active_screen().cursor.col;
                term.active_screen_mut().clear_tab_stop(col);
            }
            3 => term.active_screen_mut().clear_all_tab_stops(),
            _ => {}
        },
        (None, b'm') => sgr(term, p),
        (None, b'r') => {
            let rows = term.active_screen().rows();
            let top = p.get(0, 1).saturating_sub(1);
            let bottom = p.get(1, rows).saturating_sub(1).min(rows.saturating_sub(1));
            term.active_screen_mut().set_vertical_margins(top, bottom);
            term.move_cursor_to(0, 0);
        }
        (Some(b'?'), b's') => {
            for n in p.all_numbers() {
                if let Some(mode) = DecMode::from_number(n) {
                    term.modes.push_dec(mode);
                }
            }
        }
        (Some(b'?'), b'r') => {
            for n in p.all_numbers() {
                if let Some(mode) = DecMode::from_number(n) {
                    term.modes.pop_dec(mode);
                }
            }
        }
        (Some(b'?'), b'h') => set_dec_modes(term, p, true),
        (Some(b'?'), b'l') => set_dec_modes(term, p, false),
        (None, b'h') => set_ansi_modes(term, p, true),
        (None, b'l') => set_ansi_modes(term, p, false),
        (Some(b'?'), b'n') => report_dec_mode(term, p.get(0, 0)),
        (None, b'n') => report_ansi_query(term, p.get(0, 0)),
        (None, b'c') => term.queue_response(b"\x1b[?62;1;6c".to_vec()),
        (Some(b'>'), b'c') => term.queue_response(b"\x1b[>0;10;0c".to_vec()),
        (None, b's') => term.save_cursor(),
        (None, b'u') => term.restore_cursor(),
        (None, b'q') if seq.intermediates == [b' '] => {
            term.active_screen_mut().cursor.shape = match p.get(0, 1) {
                0 | 1 | 2 => CursorShape::Block,
                3 | 4 => CursorShape::Underline,
                5 | 6 => CursorShape::Bar,
                _ => CursorShape::Block,
            };
            term.active_screen_mut().cursor.blinking = matches!(p.get(0, 1), 0 | 1 | 3 | 5);
        }
        _ => term.note_unknown(seq),
    }
}

fn set_dec_modes(term: &mut Terminal, p: &crate::parser::ParamList, value: bool) {
    for n in p.all_numbers() {
        if let Some(mode) = DecMode::from_number(n) {
            term.apply_dec_mode(mode, value);
        }
    }
}

fn set_ansi_modes(term: &mut Terminal, p: &crate::parser::ParamList, value: bool) {
    for n in p.all_numbers() {
        if let Some(mode) = AnsiMode::from_number(n) {
            term.modes.set_ansi(mode, value);
        }
    }
}

fn report_dec_mode(term: &mut Terminal, n: u16) {
    if let Some(mode) = DecMode::from_number(n) {
        let v = term.modes.dec_report_value(mode);
        term.queue_response(format!("\x1b[?{};{}$y", n, v).into_bytes());
    }
}

fn report_ansi_query(term: &mut Terminal, n: u16) {
    if n == 6 {
        let (row, col) = term.cursor_report_position();
        term.queue_response(format!("\x1b[{};{}R", row, col).into_bytes());
    } else if n == 5 {
        term.queue_response(b"\x1b[0n".to_vec());
    }
}

fn sgr(term: &mut Terminal, p: &crate::parser::ParamList) {
    if p.is_empty() {
        term.active_screen_mut().cursor.reset_pen();
        return;
    }
    let mut i = 0;
    let numbers: Vec<u16> = p.all_numbers().collect();
    while i < numbers.len() {
        let n = numbers[i];
        let cursor = &mut term.active_screen_mut().cursor;
        match n {
            0 => cursor.reset_pen(),
            1 => cursor.attrs.insert(CellAttrs::BOLD),
            2 => cursor.attrs.insert(CellAttrs::DIM),
            3 => cursor.attrs.insert(CellAttrs::ITALIC),
            4 => cursor.attrs.set_underline_style(CellAttrs::UNDERLINE),
            5 => cursor.attrs.insert(CellAttrs::BLINK),
            6 => cursor.attrs.insert(CellAttrs::RAPID_BLINK),
            7 => cursor.attrs.insert(CellAttrs::REVERSE),
            8 => cursor.attrs.insert(CellAttrs::HIDDEN),
            9 => cursor.attrs.insert(CellAttrs::STRIKETHROUGH),
            21 => cursor.attrs.set_underline_style(CellAttrs::DOUBLY_UNDERLINE),
            22 => cursor.attrs.remove(CellAttrs::BOLD | CellAttrs::DIM),
            23 => cursor.attrs.remove(CellAttrs::ITALIC),
            24 => cursor.attrs.set_underline_style(CellAttrs::empty()),
            25 => cursor.attrs.remove(CellAttrs::BLINK | CellAttrs::RAPID_BLINK),
            27 => cursor.attrs.remove(CellAttrs::REVERSE),
            28 => cursor.attrs.remove(CellAttrs::HIDDEN),
            29 => cursor.attrs.remove(CellAttrs::STRIKETHROUGH),
            53 => cursor.attrs.insert(CellAttrs::OVERLINE),
            55 => cursor.attrs.remove(CellAttrs::OVERLINE),
            30..=37 => cursor.fg = Color::Indexed((n - 30) as u8),
            39 => cursor.fg = Color::Default,
            40..=47 => cursor.bg = Color::Indexed((n - 40) as u8),
            49 => cursor.bg = Color::Default,
            90..=97 => cursor.fg = Color::Indexed((n - 90 + 8) as u8),
            100..=107 => cursor.bg = Color::Indexed((n - 100 + 8) as u8),
            38 | 48 => {
                let (color, consumed) = parse_extended_color(&numbers[i..], p, i);
                if n == 38 {
                    term.active_screen_mut().cursor.fg = color;
                } else {
                    term.active_screen_mut().cursor.bg = color;
                }
                i += consumed;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
}

fn parse_extended_color(rest: &[u16], p: &crate::parser::ParamList, base_idx: usize) -> (Color, usize) {
    let sub = p.subparams(base_idx);
    if sub.len() >= 2 {
        // colon form: 38:2:r:g:b or 38:5:idx
        return match sub[1] {
            2 if sub.len() >= 5 => (Color::Rgb(sub[2] as u8, sub[3] as u8, sub[4] as u8), 1),
            5 if sub.len() >= 3 => (Color::Indexed(sub[2] as u8), 1),
            _ => (Color::Default, 1),
        };
    }
    if rest.len() >= 2 && rest[1] == 5 && rest.len() >= 3 {
        (Color::Indexed(rest[2] as u8), 3)
    } else if rest.len() >= 2 && rest[1] == 2 && rest.len() >= 5 {
        (Color::Rgb(rest[2] as u8, rest[3] as u8, rest[4] as u8), 5)
    } else {
        (Color::Default, 1)
    }
}

fn esc(term: &mut Terminal, seq: &Sequence) {
    match (seq.intermediates.as_slice(), seq.final_byte) {
        ([], b'c') => term.reset_to_initial_state(),
        ([], b'D') => term.line_feed(),
        ([], b'E') => term.new_line(),
        ([], b'H') => {
            let col = term.active_screen().cursor.col;
            term.active_screen_mut().set_tab_stop(col);
        }
        ([], b'M') => term.active_screen_mut().reverse_index(),
        ([], b'7') => term.save_cursor(),
        ([], b'8') => term.restore_cursor(),
        ([], b'=') => term.input.application_keypad = true,
        ([], b'>') => term.input.application_keypad = false,
        ([], b'N') => term.active_screen_mut().charset.single_shift(GSet::G2),
        ([], b'O') => term.active_screen_mut().charset.single_shift(GSet::G3),
        ([b'('], f) => designate(term, GSet::G0, seq.intermediates[0], f),
        ([b')'], f) => designate(term, GSet::G1, seq.intermediates[0], f),
        ([b'*'], f) => designate(term, GSet::G2, seq.intermediates[0], f),
        ([b'+'], f) => designate(term, GSet::G3, seq.intermediates[0], f),
        _ => term.note_unknown(seq),
    }
}

fn designate(term: &mut Terminal, set: GSet, intermediate: u8, final_byte: u8) {
    if let Some(charset) = CharsetId::from_designator(intermediate, final_byte) {
        term.active_screen_mut().charset.designate(set, charset);
    }
}

fn osc(term: &mut Terminal, seq: &Sequence) {
    let mut parts = seq.data.splitn(2, |&b| b == b';');
    let Some(ps) = parts.next() else { return };
    let Ok(code) = std::str::from_utf8(ps).unwrap_or("").parse::<u32>() else {
        return;
    };
    let rest = parts.next().unwrap_or(b"");
    let rest_str = String::from_utf8_lossy(rest).to_string();

    match code {
        0 | 2 => {
            term.title = rest_str.clone();
            term.callbacks.on_title_change(&rest_str);
            term.push_event(crate::render::TerminalEvent::TitleChanged { title: rest_str });
        }
        1 => term.callbacks.on_icon_name_change(&rest_str),
        7 => term.callbacks.on_cwd_change(&rest_str),
        8 => osc_hyperlink(term, &rest_str),
        52 => osc_clipboard(term, &rest_str),
        10 | 11 | 12 => osc_color_query(term, code, &rest_str),
        _ => term.note_unknown_osc(code),
    }
}

fn osc_hyperlink(term: &mut Terminal, payload: &str) {
    let mut fields = payload.splitn(2, ';');
    let params = fields.next().unwrap_or("");
    let uri = fields.next().unwrap_or("");

    if uri.is_empty() {
        term.active_hyperlink = None;
        return;
    }
    let explicit_id = params
        .split(':')
        .find_map(|kv| kv.strip_prefix("id="))
        .map(|s| s.to_string());
    let id = term.hyperlinks.intern(explicit_id, uri.to_string());
    term.active_hyperlink = Some(id);
}

fn osc_clipboard(term: &mut Terminal, payload: &str) {
    let mut fields = payload.splitn(2, ';');
    let selector = fields.next().unwrap_or("c");
    let data = fields.next().unwrap_or("");
    let selection = if selector.contains('p') {
        ClipboardSelection::Primary
    } else {
        ClipboardSelection::Clipboard
    };

    if data == "?" {
        term.callbacks.on_request_clipboard(selection);
        return;
    }
    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(data) {
        if let Ok(text) = String::from_utf8(decoded) {
            term.callbacks.on_copy_to_clipboard(selection, &text);
        }
    }
}

fn osc_color_query(term: &mut Terminal, code: u32, payload: &str) {
    if payload != "?" {
        return;
    }
    let which = match code {
        10 => ColorQuery::Foreground,
        11 => ColorQuery::Background,
        _ => ColorQuery::Cursor,
    };
    if let Some(Color::Rgb(r, g, b)) = term.callbacks.on_color_query(which) {
        let resp = format!(
            "\x1b]{};rgb:{:02x}{:02x}/{:02x}{:02x}/{:02x}{:02x}\x1b\\",
            code, r, r, g, g, b, b
        );
        term.queue_response(resp.into_bytes());
    }
}

#[cfg(test)]
mod tests {
    use crate::callbacks::NullCallbacks;
    use crate::terminal::Terminal;

    fn term() -> Terminal {
        Terminal::new(24, 80, Box::new(NullCallbacks))
    }

    #[test]
    fn csi_cup_moves_cursor() {
        let mut t = term();
        t.feed(b"\x1b[5;10H");
        let (row, col) = (t.active_screen().cursor.row, t.active_screen().cursor.col);
        assert_eq!((row, col), (4, 9));
    }

    #[test]
    fn sgr_bold_and_reset() {
        let mut t = term();
        t.feed(b"\x1b[1m");
        assert!(t.active_screen().cursor.attrs.contains(crate::cursor::CellAttrs::BOLD));
        t.feed(b"\x1b[0m");
        assert!(t.active_screen().cursor.attrs.is_empty());
    }

    #[test]
    fn sgr_256_color_indexed() {
        let mut t = term();
        t.feed(b"\x1b[38;5;200m");
        assert_eq!(t.active_screen().cursor.fg, crate::color::Color::Indexed(200));
    }

    #[test]
    fn sgr_truecolor_rgb() {
        let mut t = term();
        t.feed(b"\x1b[38;2;10;20;30m");
        assert_eq!(t.active_screen().cursor.fg, crate::color::Color::Rgb(10, 20, 30));
    }

    #[test]
    fn decstbm_sets_margins_and_homes_cursor() {
        let mut t = term();
        t.feed(b"\x1b[5;10r");
        assert_eq!(t.active_screen().vmargins.top, 4);
        assert_eq!(t.active_screen().vmargins.bottom, 9);
        assert_eq!(t.active_screen().cursor.row, 0);
    }

    #[test]
    fn dec_private_mode_25_toggles_cursor_visibility() {
        let mut t = term();
        t.feed(b"\x1b[?25l");
        assert!(!t.active_screen().cursor.visible);
        t.feed(b"\x1b[?25h");
        assert!(t.active_screen().cursor.visible);
    }

    #[test]
    fn title_osc_updates_title() {
        let mut t = term();
        t.feed(b"\x1b]2;hello\x1b\\");
        assert_eq!(t.title, "hello");
    }

    #[test]
    fn osc8_registers_hyperlink_and_terminates_on_empty_uri() {
        let mut t = term();
        t.feed(b"\x1b]8;;https://example.com\x1b\\");
        assert!(t.active_hyperlink.is_some());
        t.feed(b"\x1b]8;;\x1b\\");
        assert!(t.active_hyperlink.is_none());
    }
}
