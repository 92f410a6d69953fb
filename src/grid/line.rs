use unicode_width::UnicodeWidthStr;

use super::cell::{Cell, CellFlags};
use crate::color::Color;

/// A single row of the grid.
///
/// Most rows in a long-running shell session are either blank or a
/// short prompt line; storing every one of them as a `Vec<Cell>` wastes
/// memory across a deep scrollback. `Trivial` represents an all-blank
/// row of a given background color without allocating a cell vector;
/// any write promotes it to `Inflated` on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Trivial { width: u16, bg: Color, wrapped: bool },
    Inflated(Vec<Cell>),
}

impl Line {
    pub fn blank(width: u16, bg: Color) -> Self {
        Line::Trivial {
            width,
            bg,
            wrapped: false,
        }
    }

    pub fn width(&self) -> u16 {
        match self {
            Line::Trivial { width, .. } => *width,
            Line::Inflated(cells) => cells.len() as u16,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        match self {
            Line::Trivial { wrapped, .. } => *wrapped,
            Line::Inflated(cells) => cells
                .last()
                .map(|c| c.flags.contains(CellFlags::WRAPPED))
                .unwrap_or(false),
        }
    }

    pub fn set_wrapped(&mut self, wrapped: bool) {
        match self {
            Line::Trivial { wrapped: w, .. } => *w = wrapped,
            Line::Inflated(cells) => {
                if let Some(last) = cells.last_mut() {
                    last.flags.set(CellFlags::WRAPPED, wrapped);
                }
            }
        }
    }

    fn inflate(&mut self) -> &mut Vec<Cell> {
        if let Line::Trivial { width, bg, wrapped } = *self {
            let mut cells = vec![Cell { bg, ..Cell::default() }; width as usize];
            if wrapped {
                if let Some(last) = cells.last_mut() {
                    last.flags.insert(CellFlags::WRAPPED);
                }
            }
            *self = Line::Inflated(cells);
        }
        match self {
            Line::Inflated(cells) => cells,
            Line::Trivial { .. } => unreachable!(),
        }
    }

    pub fn cell(&self, col: u16) -> Option<Cell> {
        match self {
            Line::Trivial { width, bg, .. } => {
                if col < *width {
                    Some(Cell { bg: *bg, ..Cell::default() })
                } else {
                    None
                }
            }
            Line::Inflated(cells) => cells.get(col as usize).cloned(),
        }
    }

    pub fn set_cell(&mut self, col: u16, cell: Cell) {
        let width = self.width();
        if col >= width {
            return;
        }
        self.inflate()[col as usize] = cell;
    }

    pub fn cell_mut(&mut self, col: u16) -> Option<&mut Cell> {
        let width = self.width();
        if col >= width {
            return None;
        }
        self.inflate().get_mut(col as usize)
    }

    pub fn clear_cell(&mut self, col: u16, bg: Color) {
        if let Line::Trivial { bg: cur_bg, .. } = self {
            if *cur_bg == bg {
                return;
            }
        }
        if let Some(c) = self.cell_mut(col) {
            c.erase(bg);
        }
    }

    /// Whether this row is entirely blank — used by scrollback
    /// compaction and by ED/EL to decide whether a fresh
    /// `Line::Trivial` can replace an inflated one.
    pub fn is_blank(&self) -> bool {
        match self {
            Line::Trivial { .. } => true,
            Line::Inflated(cells) => cells.iter().all(|c| c.is_empty()),
        }
    }

    /// Collapses back to `Trivial` if every cell shares one background
    /// and carries no text/attrs/hyperlink/image — called after an
    /// erase so scrollback doesn't keep paying for cells it just
    /// cleared.
    pub fn try_demote(&mut self) {
        let wrapped = self.is_wrapped();
        if let Line::Inflated(cells) = self {
            if cells.is_empty() {
                return;
            }
            let bg = cells[0].bg;
            if cells.iter().all(|c| c.is_empty() && c.bg == bg) {
                *self = Line::Trivial {
                    width: cells.len() as u16,
                    bg,
                    wrapped,
                };
            }
        }
    }

    pub fn resize(&mut self, new_width: u16, bg: Color) {
        match self {
            Line::Trivial { width, .. } => *width = new_width,
            Line::Inflated(cells) => {
                cells.resize_with(new_width as usize, || Cell { bg, ..Cell::default() });
            }
        }
    }

    /// Plain-text rendering of the row (for hint-mode scanning and
    /// selection-to-clipboard), stripping trailing blanks.
    pub fn to_text(&self) -> String {
        match self {
            Line::Trivial { .. } => String::new(),
            Line::Inflated(cells) => {
                let mut s = String::new();
                for c in cells {
                    if !c.flags.contains(CellFlags::WIDE_CHAR_CONTINUATION) {
                        if c.text.is_empty() {
                            s.push(' ');
                        } else {
                            s.push_str(&c.text);
                        }
                    }
                }
                s.trim_end().to_string()
            }
        }
    }

    pub fn display_width_used(&self) -> usize {
        self.to_text().width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_line_reports_blank_cells() {
        let line = Line::blank(10, Color::Default);
        assert!(line.is_blank());
        assert_eq!(line.cell(5).unwrap().bg, Color::Default);
    }

    #[test]
    fn set_cell_inflates_and_preserves_others() {
        let mut line = Line::blank(4, Color::Default);
        line.set_cell(1, Cell { text: "x".into(), ..Cell::default() });
        assert!(matches!(line, Line::Inflated(_)));
        assert_eq!(line.cell(1).unwrap().text, "x");
        assert!(line.cell(0).unwrap().is_empty());
    }

    #[test]
    fn demote_collapses_fully_erased_line() {
        let mut line = Line::blank(4, Color::Default);
        line.set_cell(0, Cell { text: "x".into(), ..Cell::default() });
        line.clear_cell(0, Color::Indexed(2));
        line.try_demote();
        assert!(matches!(line, Line::Trivial { bg: Color::Indexed(2), .. }));
    }

    #[test]
    fn resize_grows_and_shrinks_inflated_line() {
        let mut line = Line::blank(4, Color::Default);
        line.set_cell(0, Cell { text: "x".into(), ..Cell::default() });
        line.resize(6, Color::Default);
        assert_eq!(line.width(), 6);
        line.resize(2, Color::Default);
        assert_eq!(line.width(), 2);
    }
}
