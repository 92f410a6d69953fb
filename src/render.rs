use serde::{Deserialize, Serialize};

use crate::color::{Color, SerializableColor};
use crate::cursor::{CellAttrs, CursorShape};
use crate::grid::{Cell, CellFlags, Line};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyledSpan {
    pub text: String,
    pub fg: SerializableColor,
    pub bg: SerializableColor,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub url: Option<String>,
}

impl StyledSpan {
    pub fn new(text: String, fg: Color, bg: Color, attrs: CellAttrs, url: Option<String>) -> Self {
        let (mut fg, mut bg) = (fg, bg);
        if attrs.contains(CellAttrs::REVERSE) {
            std::mem::swap(&mut fg, &mut bg);
        }
        if attrs.contains(CellAttrs::HIDDEN) {
            fg = bg;
        }
        Self {
            text,
            fg: fg.into(),
            bg: bg.into(),
            bold: attrs.contains(CellAttrs::BOLD),
            dim: attrs.contains(CellAttrs::DIM),
            italic: attrs.contains(CellAttrs::ITALIC),
            underline: attrs.intersects(
                CellAttrs::UNDERLINE
                    | CellAttrs::DOUBLY_UNDERLINE
                    | CellAttrs::CURLY_UNDERLINE
                    | CellAttrs::DOTTED_UNDERLINE
                    | CellAttrs::DASHED_UNDERLINE,
            ),
            strikethrough: attrs.contains(CellAttrs::STRIKETHROUGH),
            url,
        }
    }
}

/// Groups a row's cells into runs of identical rendition, the way a text
/// shaper/renderer wants them (one draw call per run rather than per
/// cell). Wide-character continuation cells are skipped since they carry
/// no independent glyph.
pub fn group_cells_into_spans(cells: &[Cell], hyperlink_uri: impl Fn(&Cell) -> Option<String>) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    let mut current: Option<(String, Color, Color, CellAttrs, Option<String>)> = None;

    for cell in cells {
        if cell.flags.contains(CellFlags::WIDE_CHAR_CONTINUATION) {
            continue;
        }
        let url = hyperlink_uri(cell);
        let text = if cell.text.is_empty() { " ".to_string() } else { cell.text.clone() };

        match &mut current {
            Some((t, fg, bg, attrs, u)) if *fg == cell.fg && *bg == cell.bg && *attrs == cell.attrs && *u == url => {
                t.push_str(&text);
            }
            _ => {
                if let Some((t, fg, bg, attrs, u)) = current.take() {
                    spans.push(StyledSpan::new(t, fg, bg, attrs, u));
                }
                current = Some((text, cell.fg, cell.bg, cell.attrs, url));
            }
        }
    }
    if let Some((t, fg, bg, attrs, u)) = current {
        spans.push(StyledSpan::new(t, fg, bg, attrs, u));
    }
    spans
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedLine {
    pub index: u32,
    pub spans: Vec<StyledSpan>,
}

pub fn line_to_rendered(index: u32, line: &Line, hyperlink_uri: impl Fn(&Cell) -> Option<String>) -> RenderedLine {
    let spans = match line {
        Line::Trivial { width, bg, .. } => {
            vec![StyledSpan::new(" ".repeat(*width as usize), Color::Default, *bg, CellAttrs::empty(), None)]
        }
        Line::Inflated(cells) => group_cells_into_spans(cells, hyperlink_uri),
    };
    RenderedLine { index, spans }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorRender {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
    pub shape: String,
}

impl CursorRender {
    pub fn shape_name(shape: CursorShape) -> &'static str {
        match shape {
            CursorShape::Block => "block",
            CursorShape::Underline => "underline",
            CursorShape::Bar => "bar",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TerminalEvent {
    TitleChanged { title: String },
    AltScreenEntered,
    AltScreenExited,
    Bell,
    CwdChanged { path: String },
    MouseModeChanged { enabled: bool },
    ScrollbackCleared,
    InlineImage { id: u64 },
    SixelImage { id: u64 },
    HyperlinkHover { uri: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub frame_seq: u64,
    pub resize_epoch: u64,
    pub lines: Vec<RenderedLine>,
    pub visible_rows: u16,
    pub visible_cols: u16,
    pub cursor: CursorRender,
    pub events: Vec<TerminalEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_same_style_cells_merge_into_one_span() {
        let cells = vec![
            Cell { text: "a".into(), ..Cell::default() },
            Cell { text: "b".into(), ..Cell::default() },
        ];
        let spans = group_cells_into_spans(&cells, |_| None);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "ab");
    }

    #[test]
    fn style_change_starts_a_new_span() {
        let mut b = Cell { text: "b".into(), ..Cell::default() };
        b.fg = Color::Indexed(1);
        let cells = vec![Cell { text: "a".into(), ..Cell::default() }, b];
        let spans = group_cells_into_spans(&cells, |_| None);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn wide_char_continuation_is_skipped() {
        let cells = vec![
            Cell { text: "\u{4e2d}".into(), width: 2, ..Cell::default() },
            crate::grid::Cell::wide_continuation(Color::Default),
            Cell { text: "x".into(), ..Cell::default() },
        ];
        let spans = group_cells_into_spans(&cells, |_| None);
        assert_eq!(spans[0].text, "\u{4e2d}x");
    }

    #[test]
    fn reverse_attr_swaps_fg_and_bg() {
        let span = StyledSpan::new("x".into(), Color::Indexed(1), Color::Indexed(2), CellAttrs::REVERSE, None);
        assert_eq!(span.fg, SerializableColor::Indexed { index: 2 });
        assert_eq!(span.bg, SerializableColor::Indexed { index: 1 });
    }
}
