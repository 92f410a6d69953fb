use std::collections::HashMap;

/// DEC private mode numbers this core understands, keyed the same way
/// `CSI ? Pm h/l` addresses them. Kept as an enum (rather than raw `u16`
/// scattered through `screen.rs`) so the save/restore stack and the
/// freeze policy can both index by a typed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecMode {
    ApplicationCursorKeys, // 1
    Origin,                // 6
    AutoWrap,              // 7
    ShowCursor,            // 25
    MouseX10,              // 9
    MouseNormal,           // 1000
    MouseButtonEvent,      // 1002
    MouseAnyEvent,         // 1003
    FocusEvents,           // 1004
    Utf8Mouse,             // 1005
    SgrMouse,              // 1006
    AlternateScroll,       // 1007
    AltScreenSaveCursor,   // 1049
    AltScreenClassic,      // 47
    AltScreenWithClear,    // 1047
    BracketedPaste,        // 2004
    SynchronizedOutput,    // 2026
    LeftRightMargin,       // 69 (DECLRMM)
}

impl DecMode {
    pub fn from_number(n: u16) -> Option<Self> {
        use DecMode::*;
        Some(match n {
            1 => ApplicationCursorKeys,
            6 => Origin,
            7 => AutoWrap,
            9 => MouseX10,
            25 => ShowCursor,
            47 => AltScreenClassic,
            69 => LeftRightMargin,
            1000 => MouseNormal,
            1002 => MouseButtonEvent,
            1003 => MouseAnyEvent,
            1004 => FocusEvents,
            1005 => Utf8Mouse,
            1006 => SgrMouse,
            1007 => AlternateScroll,
            1047 => AltScreenWithClear,
            1049 => AltScreenSaveCursor,
            2004 => BracketedPaste,
            2026 => SynchronizedOutput,
            _ => return None,
        })
    }

    pub fn number(self) -> u16 {
        use DecMode::*;
        match self {
            ApplicationCursorKeys => 1,
            Origin => 6,
            AutoWrap => 7,
            MouseX10 => 9,
            ShowCursor => 25,
            AltScreenClassic => 47,
            LeftRightMargin => 69,
            MouseNormal => 1000,
            MouseButtonEvent => 1002,
            MouseAnyEvent => 1003,
            FocusEvents => 1004,
            Utf8Mouse => 1005,
            SgrMouse => 1006,
            AlternateScroll => 1007,
            AltScreenWithClear => 1047,
            AltScreenSaveCursor => 1049,
            BracketedPaste => 2004,
            SynchronizedOutput => 2026,
        }
    }
}

/// ANSI (non-private, `CSI Pm h/l`) modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiMode {
    Insert,            // 4 (IRM)
    LineFeedNewline,   // 20 (LNM)
}

impl AnsiMode {
    pub fn from_number(n: u16) -> Option<Self> {
        match n {
            4 => Some(AnsiMode::Insert),
            20 => Some(AnsiMode::LineFeedNewline),
            _ => None,
        }
    }

    pub fn number(self) -> u16 {
        match self {
            AnsiMode::Insert => 4,
            AnsiMode::LineFeedNewline => 20,
        }
    }
}

/// The full addressable mode state of a terminal: current DEC/ANSI mode
/// bits, a policy-driven freeze set that rejects further `h`/`l` writes to
/// specific modes, and the XT-SAVE/XT-RESTORE stack (`CSI ? Pm s` / `CSI ?
/// Pm r`) keyed per mode number.
#[derive(Debug, Clone)]
pub struct TerminalModes {
    dec: HashMap<DecMode, bool>,
    ansi: HashMap<AnsiMode, bool>,
    frozen: std::collections::HashSet<DecMode>,
    save_stack: HashMap<DecMode, Vec<bool>>,
}

impl Default for TerminalModes {
    fn default() -> Self {
        let mut dec = HashMap::new();
        dec.insert(DecMode::AutoWrap, true);
        dec.insert(DecMode::ShowCursor, true);
        Self {
            dec,
            ansi: HashMap::new(),
            frozen: std::collections::HashSet::new(),
            save_stack: HashMap::new(),
        }
    }
}

impl TerminalModes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dec(&self, mode: DecMode) -> bool {
        *self.dec.get(&mode).unwrap_or(&false)
    }

    pub fn ansi(&self, mode: AnsiMode) -> bool {
        *self.ansi.get(&mode).unwrap_or(&false)
    }

    /// Sets a DEC mode unless it's frozen, in which case the write is
    /// silently dropped (the mode keeps reporting its frozen value via
    /// DECRPM) and logged.
    pub fn set_dec(&mut self, mode: DecMode, value: bool) {
        if self.frozen.contains(&mode) {
            tracing::debug!(?mode, "ignoring write to frozen mode");
            return;
        }
        self.dec.insert(mode, value);
    }

    pub fn set_ansi(&mut self, mode: AnsiMode, value: bool) {
        self.ansi.insert(mode, value);
    }

    /// Freezes `mode` against further `h`/`l` writes. `BatchedRendering`
    /// can never be frozen — an operator policy that froze synchronized
    /// output would let a misbehaving client wedge the display in a
    /// permanently-batched state with no way to flush it.
    pub fn freeze(&mut self, mode: DecMode) {
        if mode == DecMode::SynchronizedOutput {
            tracing::debug!("attempt to freeze batched rendering, ignoring");
            return;
        }
        self.frozen.insert(mode);
    }

    pub fn unfreeze(&mut self, mode: DecMode) {
        self.frozen.remove(&mode);
    }

    pub fn is_frozen(&self, mode: DecMode) -> bool {
        self.frozen.contains(&mode)
    }

    /// `CSI ? Pm s` — push the current value of `mode` onto its stack.
    pub fn push_dec(&mut self, mode: DecMode) {
        let v = self.dec(mode);
        self.save_stack.entry(mode).or_default().push(v);
    }

    /// `CSI ? Pm r` — pop and restore the most recently pushed value, if
    /// any. A pop against an empty stack is a no-op (xterm behavior).
    pub fn pop_dec(&mut self, mode: DecMode) {
        if let Some(stack) = self.save_stack.get_mut(&mode) {
            if let Some(v) = stack.pop() {
                self.set_dec(mode, v);
            }
        }
    }

    /// DECRPM-style 3-value report: 0 = not recognized (unused here, the
    /// caller only asks about modes it knows), 1 = set, 2 = reset, 3 =
    /// permanently set, 4 = permanently reset (frozen).
    pub fn dec_report_value(&self, mode: DecMode) -> u8 {
        if self.is_frozen(mode) {
            if self.dec(mode) {
                3
            } else {
                4
            }
        } else if self.dec(mode) {
            1
        } else {
            2
        }
    }

    pub fn ansi_report_value(&self, mode: AnsiMode) -> u8 {
        if self.ansi(mode) {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_autowrap_and_cursor_visible() {
        let m = TerminalModes::new();
        assert!(m.dec(DecMode::AutoWrap));
        assert!(m.dec(DecMode::ShowCursor));
        assert!(!m.dec(DecMode::Origin));
    }

    #[test]
    fn frozen_mode_rejects_writes() {
        let mut m = TerminalModes::new();
        m.freeze(DecMode::ShowCursor);
        m.set_dec(DecMode::ShowCursor, false);
        assert!(m.dec(DecMode::ShowCursor));
        assert_eq!(m.dec_report_value(DecMode::ShowCursor), 3);
    }

    #[test]
    fn batched_rendering_mode_cannot_be_frozen() {
        let mut m = TerminalModes::new();
        m.freeze(DecMode::SynchronizedOutput);
        assert!(!m.is_frozen(DecMode::SynchronizedOutput));
        m.set_dec(DecMode::SynchronizedOutput, true);
        assert!(m.dec(DecMode::SynchronizedOutput));
    }

    #[test]
    fn save_restore_stack_is_lifo() {
        let mut m = TerminalModes::new();
        m.set_dec(DecMode::Origin, false);
        m.push_dec(DecMode::Origin);
        m.set_dec(DecMode::Origin, true);
        m.push_dec(DecMode::Origin);
        m.set_dec(DecMode::Origin, false);

        m.pop_dec(DecMode::Origin);
        assert!(m.dec(DecMode::Origin));
        m.pop_dec(DecMode::Origin);
        assert!(!m.dec(DecMode::Origin));
    }

    #[test]
    fn pop_on_empty_stack_is_noop() {
        let mut m = TerminalModes::new();
        m.pop_dec(DecMode::Origin);
        assert!(!m.dec(DecMode::Origin));
    }

    #[test]
    fn mode_number_roundtrip() {
        for n in [1u16, 6, 7, 9, 25, 47, 69, 1000, 1002, 1003, 1004, 1005, 1006, 1007, 1047, 1049, 2004, 2026] {
            let mode = DecMode::from_number(n).expect("known mode");
            assert_eq!(mode.number(), n);
        }
    }
}
