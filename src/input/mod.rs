pub mod kitty;

use bitflags::bitflags;

pub use kitty::{KeyEvent as KittyKeyEvent, KittyFlags};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const ALT     = 0b0010;
        const CONTROL = 0b0100;
        const SUPER   = 0b1000;
    }
}

impl Modifiers {
    /// The `1 + bitmask` encoding CSI/SS3 sequences use for the `;Pm`
    /// modifier parameter (`\033[1;5A` is Ctrl+Up, etc).
    pub fn param(self) -> u16 {
        1 + self.bits() as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Motion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseProtocol {
    Off,
    X10,
    Normal,
    ButtonEvent,
    AnyEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEncoding {
    Legacy,
    Utf8,
    Sgr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKeyDirection {
    Up,
    Down,
    Forward,
    Backward,
    Home,
    End,
}

/// Translates logical input events (key presses, mouse actions, paste)
/// into the byte sequences a PTY-side application expects, honoring
/// whichever mode bits the terminal currently has set (application
/// cursor keys, Kitty keyboard protocol, SGR/URXVT/X10 mouse encoding,
/// bracketed paste).
#[derive(Debug, Default)]
pub struct InputEncoder {
    pub application_cursor_keys: bool,
    pub application_keypad: bool,
    pub bracketed_paste: bool,
    pub kitty_flags: KittyFlags,
    pub mouse_protocol: MouseProtocolState,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MouseProtocolState {
    pub protocol: Option<MouseProtocol>,
    pub encoding: MouseEncoding,
}

impl Default for MouseProtocol {
    fn default() -> Self {
        MouseProtocol::Off
    }
}

impl Default for MouseEncoding {
    fn default() -> Self {
        MouseEncoding::Legacy
    }
}

impl InputEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ctrl+<letter>` and the handful of control punctuation xterm maps
    /// to C0 codes (`Ctrl+[` → ESC, `Ctrl+\` → FS, ...).
    pub fn encode_ctrl(ch: char) -> Option<u8> {
        let upper = ch.to_ascii_uppercase();
        match upper {
            'A'..='Z' => Some(upper as u8 - b'A' + 1),
            ' ' | '@' => Some(0x00),
            '[' => Some(0x1b),
            '\\' => Some(0x1c),
            ']' => Some(0x1d),
            '^' | '6' => Some(0x1e),
            '_' | '-' => Some(0x1f),
            _ => None,
        }
    }

    pub fn encode_cursor_key(&self, dir: CursorKeyDirection, mods: Modifiers) -> Vec<u8> {
        if self.kitty_flags.report_all_keys_as_escape_codes() {
            return kitty::encode_cursor_key(dir, mods);
        }
        let final_byte = match dir {
            CursorKeyDirection::Up => b'A',
            CursorKeyDirection::Down => b'B',
            CursorKeyDirection::Forward => b'C',
            CursorKeyDirection::Backward => b'D',
            CursorKeyDirection::Home => b'H',
            CursorKeyDirection::End => b'F',
        };
        if mods.is_empty() {
            let lead = if self.application_cursor_keys { b'O' } else { b'[' };
            vec![0x1b, lead, final_byte]
        } else {
            let mut out = format!("\x1b[1;{}", mods.param()).into_bytes();
            out.push(final_byte);
            out
        }
    }

    pub fn encode_mouse(&self, button: MouseButton, kind: MouseEventKind, mods: Modifiers, col: u16, row: u16) -> Vec<u8> {
        let Some(protocol) = self.mouse_protocol.protocol else {
            return Vec::new();
        };
        if protocol == MouseProtocol::Normal && kind == MouseEventKind::Motion {
            return Vec::new();
        }
        if protocol == MouseProtocol::ButtonEvent && kind == MouseEventKind::Motion && button == MouseButton::None {
            return Vec::new();
        }

        let mut code = match button {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::None => 3,
            MouseButton::WheelUp => 64,
            MouseButton::WheelDown => 65,
        };
        if kind == MouseEventKind::Motion {
            code += 32;
        }
        if mods.contains(Modifiers::SHIFT) {
            code += 4;
        }
        if mods.contains(Modifiers::ALT) {
            code += 8;
        }
        if mods.contains(Modifiers::CONTROL) {
            code += 16;
        }

        match self.mouse_protocol.encoding {
            MouseEncoding::Sgr => {
                let final_byte = if kind == MouseEventKind::Release { 'm' } else { 'M' };
                format!("\x1b[<{};{};{}{}", code, col + 1, row + 1, final_byte).into_bytes()
            }
            MouseEncoding::Utf8 | MouseEncoding::Legacy => {
                let cb = if kind == MouseEventKind::Release && self.mouse_protocol.encoding == MouseEncoding::Legacy {
                    3
                } else {
                    code
                };
                let mut out = vec![0x1b, b'[', b'M', cb as u8 + 32];
                out.push((col + 1).min(223) as u8 + 32);
                out.push((row + 1).min(223) as u8 + 32);
                out
            }
        }
    }

    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        if self.bracketed_paste {
            let mut out = b"\x1b[200~".to_vec();
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b"\x1b[201~");
            out
        } else {
            text.as_bytes().to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_letter_encoding() {
        assert_eq!(InputEncoder::encode_ctrl('a'), Some(0x01));
        assert_eq!(InputEncoder::encode_ctrl('['), Some(0x1b));
        assert_eq!(InputEncoder::encode_ctrl('\\'), Some(0x1c));
        assert_eq!(InputEncoder::encode_ctrl(']'), Some(0x1d));
        assert_eq!(InputEncoder::encode_ctrl('^'), Some(0x1e));
        assert_eq!(InputEncoder::encode_ctrl('_'), Some(0x1f));
        assert_eq!(InputEncoder::encode_ctrl(' '), Some(0x00));
    }

    #[test]
    fn plain_arrow_key_uses_csi_unless_application_mode() {
        let mut enc = InputEncoder::new();
        assert_eq!(enc.encode_cursor_key(CursorKeyDirection::Up, Modifiers::empty()), b"\x1b[A");
        enc.application_cursor_keys = true;
        assert_eq!(enc.encode_cursor_key(CursorKeyDirection::Up, Modifiers::empty()), b"\x1bOA");
    }

    #[test]
    fn modified_arrow_key_always_uses_csi_with_modifier_param() {
        let enc = InputEncoder::new();
        let out = enc.encode_cursor_key(CursorKeyDirection::Up, Modifiers::SHIFT);
        assert_eq!(out, b"\x1b[1;2A");
        let out = enc.encode_cursor_key(CursorKeyDirection::Up, Modifiers::ALT);
        assert_eq!(out, b"\x1b[1;3A");
    }

    #[test]
    fn sgr_mouse_encodes_press_and_release_distinctly() {
        let mut enc = InputEncoder::new();
        enc.mouse_protocol.protocol = Some(MouseProtocol::Normal);
        enc.mouse_protocol.encoding = MouseEncoding::Sgr;
        let press = enc.encode_mouse(MouseButton::Left, MouseEventKind::Press, Modifiers::empty(), 0, 0);
        let release = enc.encode_mouse(MouseButton::Left, MouseEventKind::Release, Modifiers::empty(), 0, 0);
        assert_eq!(press, b"\x1b[<0;1;1M");
        assert_eq!(release, b"\x1b[<0;1;1m");
    }

    #[test]
    fn bracketed_paste_wraps_text_when_enabled() {
        let mut enc = InputEncoder::new();
        enc.bracketed_paste = true;
        let out = enc.encode_paste("hi");
        assert_eq!(out, b"\x1b[200~hi\x1b[201~");
    }
}
