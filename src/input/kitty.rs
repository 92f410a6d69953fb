//! Kitty keyboard protocol (`CSI > flags u` to push, `CSI < u` to pop,
//! `CSI unicode-key-code ; modifiers : event-type u` to report a key).

use bitflags::bitflags;

use super::{CursorKeyDirection, Modifiers};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KittyFlags: u8 {
        const DISAMBIGUATE_ESCAPE_CODES = 0b0000_0001;
        const REPORT_EVENT_TYPES        = 0b0000_0010;
        const REPORT_ALTERNATE_KEYS     = 0b0000_0100;
        const REPORT_ALL_KEYS_AS_ESCAPE = 0b0000_1000;
        const REPORT_ASSOCIATED_TEXT    = 0b0001_0000;
    }
}

impl KittyFlags {
    pub fn report_all_keys_as_escape_codes(self) -> bool {
        self.contains(KittyFlags::REPORT_ALL_KEYS_AS_ESCAPE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Press,
    Repeat,
    Release,
}

impl EventType {
    fn code(self) -> u8 {
        match self {
            EventType::Press => 1,
            EventType::Repeat => 2,
            EventType::Release => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub unicode_key_code: u32,
    pub modifiers: Modifiers,
    pub event_type: EventType,
}

/// Encodes a full key event under the Kitty protocol:
/// `CSI unicode-key-code[:alternate] ; modifiers[:event-type] u`.
/// Modifiers and event-type suffixes are omitted when at their default
/// (no modifiers, Press) to match real-world Kitty output and keep
/// tests comparable to `InputGenerator_test.cpp`'s expectations.
pub fn encode_key(event: KeyEvent) -> Vec<u8> {
    let mut s = format!("\x1b[{}", event.unicode_key_code);
    let has_mods = !event.modifiers.is_empty();
    let has_event = event.event_type != EventType::Press;
    if has_mods || has_event {
        s.push(';');
        s.push_str(&event.modifiers.param().to_string());
        if has_event {
            s.push(':');
            s.push_str(&event.event_type.code().to_string());
        }
    }
    s.push('u');
    s.into_bytes()
}

/// Cursor keys still use their legacy CSI letter finals under the Kitty
/// protocol (only ordinary keys move to the `u`-terminated form), but
/// gain the same `;modifiers` parameter convention.
pub fn encode_cursor_key(dir: CursorKeyDirection, mods: Modifiers) -> Vec<u8> {
    let final_byte = match dir {
        CursorKeyDirection::Up => b'A',
        CursorKeyDirection::Down => b'B',
        CursorKeyDirection::Forward => b'C',
        CursorKeyDirection::Backward => b'D',
        CursorKeyDirection::Home => b'H',
        CursorKeyDirection::End => b'F',
    };
    if mods.is_empty() {
        vec![0x1b, b'[', final_byte]
    } else {
        let mut out = format!("\x1b[1;{}", mods.param()).into_bytes();
        out.push(final_byte);
        out
    }
}

pub fn encode_push_flags(flags: KittyFlags, mode: u8) -> Vec<u8> {
    format!("\x1b[={};{}u", flags.bits(), mode).into_bytes()
}

pub fn encode_pop(count: u16) -> Vec<u8> {
    format!("\x1b[<{}u", count).into_bytes()
}

pub fn encode_query() -> &'static [u8] {
    b"\x1b[?u"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_param_matches_one_plus_bitmask() {
        assert_eq!(Modifiers::SHIFT.param(), 2);
        assert_eq!(Modifiers::ALT.param(), 3);
        assert_eq!(Modifiers::CONTROL.param(), 5);
        assert_eq!((Modifiers::CONTROL | Modifiers::SHIFT).param(), 6);
        assert_eq!(Modifiers::SUPER.param(), 9);
        assert_eq!((Modifiers::SUPER | Modifiers::CONTROL | Modifiers::ALT | Modifiers::SHIFT).param(), 16);
    }

    #[test]
    fn plain_key_press_omits_modifier_and_event_suffix() {
        let event = KeyEvent { unicode_key_code: 97, modifiers: Modifiers::empty(), event_type: EventType::Press };
        assert_eq!(encode_key(event), b"\x1b[97u");
    }

    #[test]
    fn release_event_appends_event_type_suffix() {
        let event = KeyEvent { unicode_key_code: 97, modifiers: Modifiers::empty(), event_type: EventType::Release };
        assert_eq!(encode_key(event), b"\x1b[97;1:3u");
    }

    #[test]
    fn modified_key_includes_modifier_param() {
        let event = KeyEvent { unicode_key_code: 97, modifiers: Modifiers::CONTROL, event_type: EventType::Press };
        assert_eq!(encode_key(event), b"\x1b[97;5u");
    }
}
