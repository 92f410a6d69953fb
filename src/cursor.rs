use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// SGR-driven rendition flags carried by the cursor's current pen and
    /// copied into each printed cell. Wide-character bookkeeping lives in
    /// `grid::CellFlags` instead, since it's a layout fact about the cell
    /// rather than a rendition fact about the pen.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellAttrs: u16 {
        const BOLD               = 0b0000_0000_0000_0001;
        const DIM                = 0b0000_0000_0000_0010;
        const ITALIC             = 0b0000_0000_0000_0100;
        const UNDERLINE          = 0b0000_0000_0000_1000;
        const BLINK              = 0b0000_0000_0001_0000;
        const RAPID_BLINK        = 0b0000_0000_0010_0000;
        const REVERSE            = 0b0000_0000_0100_0000;
        const HIDDEN             = 0b0000_0000_1000_0000;
        const STRIKETHROUGH      = 0b0000_0001_0000_0000;
        const DOUBLY_UNDERLINE   = 0b0000_0010_0000_0000;
        const CURLY_UNDERLINE    = 0b0000_0100_0000_0000;
        const DOTTED_UNDERLINE   = 0b0000_1000_0000_0000;
        const DASHED_UNDERLINE   = 0b0001_0000_0000_0000;
        const FRAMED             = 0b0010_0000_0000_0000;
        const OVERLINE           = 0b0100_0000_0000_0000;
    }
}

impl CellAttrs {
    /// The underline-style bits are mutually exclusive; SGR 4 variants
    /// (4, 4:1-4:5) each replace whichever underline style was active.
    pub fn set_underline_style(&mut self, style: CellAttrs) {
        self.remove(
            CellAttrs::UNDERLINE
                | CellAttrs::DOUBLY_UNDERLINE
                | CellAttrs::CURLY_UNDERLINE
                | CellAttrs::DOTTED_UNDERLINE
                | CellAttrs::DASHED_UNDERLINE,
        );
        self.insert(style);
    }
}

impl Default for CellAttrs {
    fn default() -> Self {
        CellAttrs::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    Underline,
    Bar,
}

impl Default for CursorShape {
    fn default() -> Self {
        CursorShape::Block
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedCursor {
    row: u16,
    col: u16,
    fg: Color,
    bg: Color,
    attrs: CellAttrs,
    origin_mode: bool,
    autowrap_pending: bool,
}

/// Cursor position, current SGR pen, and the DECSC/DECRC save slot.
///
/// One `CursorState` is owned per screen (primary and alternate each have
/// their own), matching how the save slot must not leak across a screen
/// swap.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub shape: CursorShape,
    pub visible: bool,
    pub blinking: bool,
    /// Set after printing in the last column without a pending wrap yet
    /// applied (the "deferred wrap" / `autowrap_pending` flag that makes
    /// writing to the last column followed by another printable char
    /// wrap exactly once).
    pub autowrap_pending: bool,
    saved: Option<SavedCursor>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
            shape: CursorShape::Block,
            visible: true,
            blinking: true,
            autowrap_pending: false,
            saved: None,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_pen(&mut self) {
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.attrs = CellAttrs::empty();
    }

    /// DECSC: push position, pen, and origin-mode onto the one-deep save
    /// slot. `origin_mode` is passed in rather than stored on the cursor
    /// because DECOM lives on `TerminalModes`, not here.
    pub fn save(&mut self, origin_mode: bool) {
        self.saved = Some(SavedCursor {
            row: self.row,
            col: self.col,
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
            origin_mode,
            autowrap_pending: self.autowrap_pending,
        });
    }

    /// DECRC: restore position/pen from the save slot, returning the
    /// saved origin-mode flag so the caller can re-apply it. Restoring
    /// with nothing saved resets to the power-on default, per DEC STD 070.
    pub fn restore(&mut self) -> bool {
        if let Some(s) = self.saved.take() {
            self.row = s.row;
            self.col = s.col;
            self.fg = s.fg;
            self.bg = s.bg;
            self.attrs = s.attrs;
            self.autowrap_pending = s.autowrap_pending;
            self.saved = Some(s);
            s.origin_mode
        } else {
            self.row = 0;
            self.col = 0;
            self.reset_pen();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_roundtrips_position_and_pen() {
        let mut c = CursorState::new();
        c.row = 5;
        c.col = 10;
        c.fg = Color::Indexed(3);
        c.attrs.insert(CellAttrs::BOLD);
        c.save(true);

        c.row = 0;
        c.col = 0;
        c.fg = Color::Default;
        c.attrs = CellAttrs::empty();

        let origin = c.restore();
        assert!(origin);
        assert_eq!(c.row, 5);
        assert_eq!(c.col, 10);
        assert_eq!(c.fg, Color::Indexed(3));
        assert!(c.attrs.contains(CellAttrs::BOLD));
    }

    #[test]
    fn restore_without_save_resets_to_origin() {
        let mut c = CursorState::new();
        c.row = 7;
        c.col = 7;
        let origin = c.restore();
        assert!(!origin);
        assert_eq!((c.row, c.col), (0, 0));
    }

    #[test]
    fn underline_styles_are_mutually_exclusive() {
        let mut a = CellAttrs::empty();
        a.set_underline_style(CellAttrs::CURLY_UNDERLINE);
        assert!(a.contains(CellAttrs::CURLY_UNDERLINE));
        a.set_underline_style(CellAttrs::DOUBLY_UNDERLINE);
        assert!(!a.contains(CellAttrs::CURLY_UNDERLINE));
        assert!(a.contains(CellAttrs::DOUBLY_UNDERLINE));
    }
}
