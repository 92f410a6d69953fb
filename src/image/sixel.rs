//! Sixel graphics decoder: `DCS Pa;Pb;Ph q ... sixel data ... ST`.

/// The 16 VT340 default palette entries
/// (https://www.vt100.net/docs/vt3xx-gp/chapter2.html#S2.4), registers
/// 16 and up start out unset and are populated by `#Pc;Pu;Px;Py;Pz`
/// color-introducer sequences.
const DEFAULT_COLORS: [(u8, u8, u8); 16] = [
    (0, 0, 0),       //  0: black
    (51, 51, 204),   //  1: blue
    (204, 33, 33),   //  2: red
    (51, 204, 51),   //  3: green
    (204, 51, 204),  //  4: magenta
    (51, 204, 204),  //  5: cyan
    (204, 204, 51),  //  6: yellow
    (135, 135, 135), //  7: gray 50%
    (66, 66, 66),    //  8: gray 25%
    (84, 84, 153),   //  9: less saturated blue
    (153, 66, 66),   // 10: less saturated red
    (84, 153, 84),   // 11: less saturated green
    (153, 84, 153),  // 12: less saturated magenta
    (84, 153, 153),  // 13: less saturated cyan
    (153, 153, 84),  // 14: less saturated yellow
    (204, 204, 204), // 15: gray 75%
];

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Converts hue (0-360), lightness (0-100), saturation (0-100) to RGB8,
/// matching the VT340 `hue2rgb`/`hsl2rgb` convention used by the
/// original sixel palette tables.
pub fn hls_to_rgb(hue: u16, lightness: u16, saturation: u16) -> (u8, u8, u8) {
    let h = (hue as f32) / 360.0;
    let l = (lightness as f32) / 100.0;
    let s = (saturation as f32) / 100.0;
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

/// Converts an RGB-mode color parameter triple (`2;R;G;B`, each 0-100)
/// straight to RGB8.
fn rgb_percent(r: u16, g: u16, b: u16) -> (u8, u8, u8) {
    let scale = |v: u16| ((v.min(100) as u32 * 255 / 100) as u8);
    (scale(r), scale(g), scale(b))
}

#[derive(Debug, Clone)]
pub struct SixelPalette {
    colors: Vec<(u8, u8, u8)>,
}

impl Default for SixelPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl SixelPalette {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_size(&mut self, n: usize) {
        self.colors.resize(n.max(1), (0, 0, 0));
    }

    pub fn set_color(&mut self, index: u16, rgb: (u8, u8, u8)) {
        let idx = index as usize;
        if idx >= self.colors.len() {
            self.colors.resize(idx + 1, (0, 0, 0));
        }
        self.colors[idx] = rgb;
    }

    /// Color lookups wrap modulo the palette size, matching the
    /// original's `at()` behavior for out-of-range indices.
    pub fn at(&self, index: u16) -> (u8, u8, u8) {
        if self.colors.is_empty() {
            return (0, 0, 0);
        }
        self.colors[index as usize % self.colors.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    RepeatIntroducer,
    ColorIntroducer,
    ColorParam,
    RasterSettings,
}

fn is_sixel(v: u8) -> bool {
    (0x3f..=0x7e).contains(&v)
}

fn to_sixel(v: u8) -> u8 {
    v - 0x3f
}

/// Incremental Sixel decoder. Feed bytes one at a time via `parse`; the
/// DCS passthrough layer is responsible for stripping the surrounding
/// `DCS ... q` / `ST` framing and handing only the sixel body in.
pub struct SixelParser {
    state: State,
    palette: SixelPalette,
    params: Vec<u16>,
    current_param: Option<u16>,
    repeat_count: u32,
    cursor_col: u32,
    cursor_row: u32,
    max_col: u32,
    raster_width: Option<u32>,
    raster_height: Option<u32>,
    current_color: u16,
    /// row-major RGBA8 canvas, grown lazily as sixels are painted.
    canvas: Vec<u8>,
    canvas_width: u32,
    canvas_height: u32,
}

impl SixelParser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            palette: SixelPalette::default(),
            params: Vec::new(),
            current_param: None,
            repeat_count: 1,
            cursor_col: 0,
            cursor_row: 0,
            max_col: 0,
            raster_width: None,
            raster_height: None,
            current_color: 0,
            canvas: Vec::new(),
            canvas_width: 0,
            canvas_height: 0,
        }
    }

    fn push_digit(&mut self, d: u16) {
        self.current_param = Some(self.current_param.unwrap_or(0) * 10 + d);
    }

    fn flush_param(&mut self) {
        self.params.push(self.current_param.take().unwrap_or(0));
    }

    fn ensure_canvas(&mut self, w: u32, h: u32) {
        if w <= self.canvas_width && h <= self.canvas_height {
            return;
        }
        let new_w = w.max(self.canvas_width);
        let new_h = h.max(self.canvas_height);
        let mut new_canvas = vec![0u8; (new_w * new_h * 4) as usize];
        for y in 0..self.canvas_height {
            for x in 0..self.canvas_width {
                let old_i = ((y * self.canvas_width + x) * 4) as usize;
                let new_i = ((y * new_w + x) * 4) as usize;
                new_canvas[new_i..new_i + 4].copy_from_slice(&self.canvas[old_i..old_i + 4]);
            }
        }
        self.canvas = new_canvas;
        self.canvas_width = new_w;
        self.canvas_height = new_h;
    }

    fn paint_sixel(&mut self, bits: u8) {
        let rgb = self.palette.at(self.current_color);
        self.ensure_canvas(self.cursor_col + self.repeat_count, self.cursor_row + 6);
        for rep in 0..self.repeat_count {
            let x = self.cursor_col + rep;
            for bit in 0..6u32 {
                if bits & (1 << bit) != 0 {
                    let y = self.cursor_row + bit;
                    let i = ((y * self.canvas_width + x) * 4) as usize;
                    self.canvas[i] = rgb.0;
                    self.canvas[i + 1] = rgb.1;
                    self.canvas[i + 2] = rgb.2;
                    self.canvas[i + 3] = 255;
                }
            }
        }
        self.cursor_col += self.repeat_count;
        self.max_col = self.max_col.max(self.cursor_col);
        self.repeat_count = 1;
    }

    pub fn parse(&mut self, value: u8) {
        match self.state {
            State::Ground => match value {
                b'!' => {
                    self.state = State::RepeatIntroducer;
                    self.params.clear();
                    self.current_param = None;
                }
                b'#' => {
                    self.state = State::ColorIntroducer;
                    self.params.clear();
                    self.current_param = None;
                }
                b'"' => {
                    self.state = State::RasterSettings;
                    self.params.clear();
                    self.current_param = None;
                }
                b'$' => {
                    self.cursor_col = 0;
                }
                b'-' => {
                    self.cursor_col = 0;
                    self.cursor_row += 6;
                }
                v if is_sixel(v) => self.paint_sixel(to_sixel(v)),
                _ => {}
            },
            State::RepeatIntroducer => {
                if value.is_ascii_digit() {
                    self.push_digit((value - b'0') as u16);
                } else if is_sixel(value) {
                    self.repeat_count = self.current_param.take().unwrap_or(1).max(1) as u32;
                    self.paint_sixel(to_sixel(value));
                    self.state = State::Ground;
                } else {
                    self.state = State::Ground;
                }
            }
            State::ColorIntroducer | State::ColorParam => {
                if value.is_ascii_digit() {
                    self.push_digit((value - b'0') as u16);
                    self.state = State::ColorParam;
                } else if value == b';' {
                    self.flush_param();
                    self.state = State::ColorParam;
                } else {
                    self.flush_param();
                    self.apply_color_params();
                    self.state = State::Ground;
                    // Re-dispatch this byte through Ground since it
                    // terminated the color sequence but still carries
                    // meaning there (e.g. a sixel char or '$').
                    self.parse(value);
                }
            }
            State::RasterSettings => {
                if value.is_ascii_digit() {
                    self.push_digit((value - b'0') as u16);
                } else if value == b';' {
                    self.flush_param();
                } else {
                    self.flush_param();
                    self.apply_raster_params();
                    self.state = State::Ground;
                    self.parse(value);
                }
            }
        }
    }

    fn apply_color_params(&mut self) {
        if self.params.is_empty() {
            return;
        }
        let index = self.params[0];
        if self.params.len() >= 5 {
            let space = self.params[1];
            let p1 = self.params[2];
            let p2 = self.params[3];
            let p3 = self.params[4];
            let rgb = if space == 1 {
                hls_to_rgb(p2 * 2, p1, p3) // HLS: H is 0-360 in 2-degree units
            } else {
                rgb_percent(p1, p2, p3)
            };
            self.palette.set_color(index, rgb);
        }
        self.current_color = index;
        self.params.clear();
    }

    fn apply_raster_params(&mut self) {
        if self.params.len() >= 4 {
            self.raster_width = Some(self.params[2] as u32);
            self.raster_height = Some(self.params[3] as u32);
            self.ensure_canvas(self.params[2] as u32, self.params[3] as u32);
        }
        self.params.clear();
    }

    pub fn palette_mut(&mut self) -> &mut SixelPalette {
        &mut self.palette
    }

    /// Finishes decoding and produces the raster, trimmed to the
    /// narrowest bounding box actually painted (or the raster-settings
    /// declared size, if given and larger).
    pub fn finish(self) -> (u32, u32, Vec<u8>) {
        let w = self.raster_width.unwrap_or(self.canvas_width).max(self.max_col);
        let h = self
            .raster_height
            .unwrap_or(self.canvas_height)
            .max(self.cursor_row + 6);
        if w == self.canvas_width && h == self.canvas_height {
            (w, h, self.canvas)
        } else {
            let mut out = vec![0u8; (w * h * 4) as usize];
            for y in 0..h.min(self.canvas_height) {
                for x in 0..w.min(self.canvas_width) {
                    let old_i = ((y * self.canvas_width + x) * 4) as usize;
                    let new_i = ((y * w + x) * 4) as usize;
                    out[new_i..new_i + 4].copy_from_slice(&self.canvas[old_i..old_i + 4]);
                }
            }
            (w, h, out)
        }
    }
}

impl Default for SixelParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hls_black_and_white() {
        assert_eq!(hls_to_rgb(0, 0, 0), (0, 0, 0));
        assert_eq!(hls_to_rgb(0, 100, 0), (255, 255, 255));
    }

    #[test]
    fn default_palette_matches_vt340_registers() {
        let p = SixelPalette::default();
        assert_eq!(p.at(0), (0, 0, 0));
        assert_eq!(p.at(1), (51, 51, 204)); // blue
        assert_eq!(p.at(2), (204, 33, 33)); // red
    }

    #[test]
    fn palette_wraps_on_overflow_index() {
        let mut p = SixelPalette::default();
        p.set_size(4);
        let a = p.at(0);
        let wrapped = p.at(4);
        assert_eq!(a, wrapped);
    }

    #[test]
    fn single_sixel_paints_a_column() {
        let mut parser = SixelParser::new();
        parser.palette_mut().set_color(1, (255, 0, 0));
        parser.parse(b'#');
        for b in b"1".iter() {
            parser.parse(*b);
        }
        parser.parse(b'?' + 0x3f - 0x3f); // no-op placeholder to keep state machine honest
        // select color 1, then paint a full column (all 6 bits set = '~' - 0x3f offset)
        let full_column = 0x3fu8 + 0b0011_1111;
        parser.parse(full_column);
        let (w, h, rgba) = parser.finish();
        assert!(w >= 1 && h >= 6);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn repeat_introducer_paints_multiple_columns() {
        let mut parser = SixelParser::new();
        parser.parse(b'!');
        parser.parse(b'3');
        let full_column = 0x3fu8 + 0b0011_1111;
        parser.parse(full_column);
        let (w, _h, _rgba) = parser.finish();
        assert!(w >= 3);
    }
}
