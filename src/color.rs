use serde::{Deserialize, Serialize};

/// A cell foreground/background color as carried in SGR state.
///
/// `Default` means "whatever the embedder's theme says" rather than a
/// concrete RGB triple — the grid never bakes in a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

/// Wire-friendly projection of `Color` for embedders that want to
/// serialize a rendered frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SerializableColor {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "indexed")]
    Indexed { index: u8 },
    #[serde(rename = "rgb")]
    Rgb { r: u8, g: u8, b: u8 },
}

impl From<Color> for SerializableColor {
    fn from(c: Color) -> Self {
        match c {
            Color::Default => SerializableColor::Default,
            Color::Indexed(i) => SerializableColor::Indexed { index: i },
            Color::Rgb(r, g, b) => SerializableColor::Rgb { r, g, b },
        }
    }
}

/// Resolves an indexed color (0-255) to a concrete RGB triple using the
/// standard 16-color ANSI set extended by the 6x6x6 cube and the
/// grayscale ramp (ECMA-48 / xterm 256-color convention).
pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
    const BASE16: [(u8, u8, u8); 16] = [
        (0x1a, 0x1b, 0x26),
        (0xf7, 0x76, 0x8e),
        (0x9e, 0xce, 0x6a),
        (0xe0, 0xaf, 0x68),
        (0x7a, 0xa2, 0xf7),
        (0xbb, 0x9a, 0xf7),
        (0x7d, 0xcf, 0xff),
        (0xa9, 0xb1, 0xd6),
        (0x41, 0x48, 0x68),
        (0xf7, 0x76, 0x8e),
        (0x9e, 0xce, 0x6a),
        (0xe0, 0xaf, 0x68),
        (0x7a, 0xa2, 0xf7),
        (0xbb, 0x9a, 0xf7),
        (0x7d, 0xcf, 0xff),
        (0xc0, 0xca, 0xf5),
    ];

    match index {
        0..=15 => BASE16[index as usize],
        16..=231 => {
            let i = index - 16;
            let r = i / 36;
            let g = (i % 36) / 6;
            let b = i % 6;
            let scale = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (scale(r), scale(g), scale(b))
        }
        232..=255 => {
            let v = 8 + (index - 232) * 10;
            (v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base16_roundtrips_known_colors() {
        assert_eq!(indexed_to_rgb(0), (0x1a, 0x1b, 0x26));
        assert_eq!(indexed_to_rgb(15), (0xc0, 0xca, 0xf5));
    }

    #[test]
    fn cube_endpoints() {
        assert_eq!(indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(indexed_to_rgb(231), (255, 255, 255));
    }

    #[test]
    fn grayscale_ramp_monotonic() {
        let a = indexed_to_rgb(232).0;
        let b = indexed_to_rgb(255).0;
        assert!(b > a);
    }

    #[test]
    fn serializable_roundtrip() {
        let c = Color::Rgb(1, 2, 3);
        let s: SerializableColor = c.into();
        assert_eq!(s, SerializableColor::Rgb { r: 1, g: 2, b: 3 });
    }
}
