use bitflags::bitflags;

use crate::color::Color;
use crate::cursor::CellAttrs;
use crate::hyperlink::HyperlinkId;
use crate::image::ImageFragment;

bitflags! {
    /// Layout facts about a cell that are independent of its rendition
    /// (`CellAttrs` carries rendition; this carries grid topology).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        /// This cell holds the first column of a double-width grapheme.
        const WIDE_CHAR = 0b0000_0001;
        /// This cell is the trailing, non-addressable column of a
        /// double-width grapheme occupying the cell to its left.
        const WIDE_CHAR_CONTINUATION = 0b0000_0010;
        /// The line this cell ends was soft-wrapped by the autowrap
        /// logic rather than terminated by an explicit newline.
        const WRAPPED = 0b0000_0100;
    }
}

/// A single addressable grid position.
///
/// `text` holds a full grapheme cluster (not just one `char`) so that
/// combining marks and ZWJ emoji sequences printed onto one cell stay
/// together; the common case of a single ASCII byte is still cheap since
/// `String` inlines nothing but the allocator already handles short
/// strings well in practice for this corpus's allocation patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub width: u8,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub flags: CellFlags,
    pub hyperlink: Option<HyperlinkId>,
    pub image: Option<ImageFragment>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::new(),
            width: 1,
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
            flags: CellFlags::empty(),
            hyperlink: None,
            image: None,
        }
    }
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.image.is_none()
    }

    /// Resets to the blank cell carrying the pen's current background,
    /// matching how ED/EL paint the cleared region in the cursor's bg.
    pub fn erase(&mut self, bg: Color) {
        *self = Cell {
            bg,
            ..Cell::default()
        };
    }

    pub fn clear(&mut self) {
        *self = Cell::default();
    }

    /// Builds the trailing continuation cell for a wide character just
    /// written at the preceding column.
    pub fn wide_continuation(bg: Color) -> Cell {
        Cell {
            bg,
            flags: CellFlags::WIDE_CHAR_CONTINUATION,
            width: 0,
            ..Cell::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_empty() {
        assert!(Cell::default().is_empty());
    }

    #[test]
    fn erase_preserves_background_only() {
        let mut c = Cell::default();
        c.text = "x".into();
        c.fg = Color::Indexed(1);
        c.erase(Color::Indexed(4));
        assert!(c.is_empty());
        assert_eq!(c.bg, Color::Indexed(4));
        assert_eq!(c.fg, Color::Default);
    }

    #[test]
    fn wide_continuation_has_zero_width() {
        let c = Cell::wide_continuation(Color::Default);
        assert_eq!(c.width, 0);
        assert!(c.flags.contains(CellFlags::WIDE_CHAR_CONTINUATION));
    }
}
