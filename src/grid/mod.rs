pub mod cell;
pub mod line;

use std::collections::VecDeque;

pub use cell::{Cell, CellFlags};
pub use line::Line;

use crate::color::Color;

/// A rectangular cell buffer with an attached scrollback history.
///
/// `viewport` is always exactly `rows` lines long; `scrollback` grows
/// from the top as lines scroll off, capped at `scrollback_limit`. The
/// alternate screen uses a `Grid` with `scrollback_limit == 0`, so
/// `scroll_up` simply drops the departing line instead of retaining it
/// (xterm/most terminal emulators never give alt-screen apps history).
#[derive(Debug, Clone)]
pub struct Grid {
    viewport: VecDeque<Line>,
    scrollback: VecDeque<Line>,
    cols: u16,
    scrollback_limit: usize,
    /// Offset into scrollback the viewport is currently scrolled to;
    /// `0` means pinned to the live bottom.
    view_offset: usize,
}

impl Grid {
    pub fn new(rows: u16, cols: u16, scrollback_limit: usize) -> Self {
        let mut viewport = VecDeque::with_capacity(rows as usize);
        for _ in 0..rows {
            viewport.push_back(Line::blank(cols, Color::Default));
        }
        Self {
            viewport,
            scrollback: VecDeque::new(),
            cols,
            scrollback_limit,
            view_offset: 0,
        }
    }

    pub fn rows(&self) -> u16 {
        self.viewport.len() as u16
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    pub fn total_lines(&self) -> usize {
        self.scrollback.len() + self.viewport.len()
    }

    pub fn view_offset(&self) -> usize {
        self.view_offset
    }

    pub fn set_view_offset(&mut self, offset: usize) {
        self.view_offset = offset.min(self.scrollback.len());
    }

    /// Row `row` of the currently scrolled-to window, `0` being the top
    /// of what's on screen (which may be a scrollback line if
    /// `view_offset > 0`).
    pub fn visible_row(&self, row: u16) -> Option<&Line> {
        let row = row as usize;
        let sb_len = self.scrollback.len();
        let start = sb_len.saturating_sub(self.view_offset);
        let idx = start + row;
        if idx < sb_len {
            self.scrollback.get(idx)
        } else {
            self.viewport.get(idx - sb_len)
        }
    }

    pub fn viewport_row(&self, row: u16) -> Option<&Line> {
        self.viewport.get(row as usize)
    }

    pub fn viewport_row_mut(&mut self, row: u16) -> Option<&mut Line> {
        self.viewport.get_mut(row as usize)
    }

    pub fn set_cell(&mut self, row: u16, col: u16, cell: Cell) {
        if let Some(line) = self.viewport_row_mut(row) {
            line.set_cell(col, cell);
        }
    }

    pub fn clear_cell(&mut self, row: u16, col: u16, bg: Color) {
        if let Some(line) = self.viewport_row_mut(row) {
            line.clear_cell(col, bg);
        }
    }

    /// Scrolls the region `[top, bottom]` (inclusive, viewport-relative)
    /// up by one line. When `top == 0` the departing line is retained in
    /// scrollback (capped at `scrollback_limit`); otherwise it's
    /// discarded, matching how a DECSTBM-restricted scroll region never
    /// feeds history.
    pub fn scroll_up(&mut self, top: u16, bottom: u16, bg: Color) -> Option<Line> {
        let top = top as usize;
        let bottom = bottom as usize;
        if top > bottom || bottom >= self.viewport.len() {
            return None;
        }
        let departing = self.viewport.remove(top)?;
        self.viewport.insert(bottom, Line::blank(self.cols, bg));

        if top == 0 {
            if self.scrollback_limit > 0 {
                self.scrollback.push_back(departing.clone());
                while self.scrollback.len() > self.scrollback_limit {
                    self.scrollback.pop_front();
                }
            }
            Some(departing)
        } else {
            None
        }
    }

    pub fn scroll_down(&mut self, top: u16, bottom: u16, bg: Color) {
        let top = top as usize;
        let bottom = bottom as usize;
        if top > bottom || bottom >= self.viewport.len() {
            return;
        }
        self.viewport.remove(bottom);
        self.viewport.insert(top, Line::blank(self.cols, bg));
    }

    pub fn insert_lines(&mut self, at: u16, bottom: u16, count: u16, bg: Color) {
        let at = at as usize;
        let bottom = (bottom as usize).min(self.viewport.len().saturating_sub(1));
        for _ in 0..count {
            if at > bottom || bottom >= self.viewport.len() {
                break;
            }
            self.viewport.remove(bottom);
            self.viewport.insert(at, Line::blank(self.cols, bg));
        }
    }

    pub fn delete_lines(&mut self, at: u16, bottom: u16, count: u16, bg: Color) {
        let at = at as usize;
        let bottom = (bottom as usize).min(self.viewport.len().saturating_sub(1));
        for _ in 0..count {
            if at > bottom || bottom >= self.viewport.len() {
                break;
            }
            self.viewport.remove(at);
            self.viewport.insert(bottom, Line::blank(self.cols, bg));
        }
    }

    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
        self.view_offset = 0;
    }

    pub fn mark_all_dirty(&mut self) {
        // Dirty-tracking for the renderer lives in the facade's frame
        // diffing, not per-line here; kept as a no-op hook so callers
        // that used to force a full repaint (e.g. after a resize) have
        // a stable call site.
    }

    /// Resizes the viewport, reflowing logical (wrap-joined) lines to
    /// the new column width when `reflow` is set. Alt-screen grids pass
    /// `reflow = false`: xterm/most terminals never reflow the
    /// alternate screen, they just clear and rebuild it.
    pub fn resize(&mut self, new_rows: u16, new_cols: u16, reflow: bool, bg: Color) {
        if reflow && new_cols != self.cols {
            self.reflow_to_width(new_cols, bg);
        } else if new_cols != self.cols {
            for line in self.viewport.iter_mut() {
                line.resize(new_cols, bg);
            }
            for line in self.scrollback.iter_mut() {
                line.resize(new_cols, bg);
            }
        }
        self.cols = new_cols;

        while self.viewport.len() < new_rows as usize {
            self.viewport.push_back(Line::blank(new_cols, bg));
        }
        while self.viewport.len() > new_rows as usize {
            if let Some(departing) = self.viewport.pop_front() {
                if self.scrollback_limit > 0 {
                    self.scrollback.push_back(departing);
                    while self.scrollback.len() > self.scrollback_limit {
                        self.scrollback.pop_front();
                    }
                }
            }
        }
        self.view_offset = 0;
    }

    /// Clears the grid and rebuilds it at a new size without touching
    /// scrollback — used for the alternate screen, which has none.
    pub fn resize_no_scrollback(&mut self, new_rows: u16, new_cols: u16, bg: Color) {
        self.viewport = (0..new_rows).map(|_| Line::blank(new_cols, bg)).collect();
        self.cols = new_cols;
        self.view_offset = 0;
    }

    fn reflow_to_width(&mut self, new_cols: u16, bg: Color) {
        let mut all: VecDeque<Line> = VecDeque::new();
        all.append(&mut self.scrollback);
        all.append(&mut self.viewport);

        // A line's `wrapped` flag marks it as a soft-wrap continuation of
        // the *previous* physical line, not as itself continuing into
        // the next — so a wrapped line extends the in-progress logical
        // line, and a non-wrapped line starts a fresh one.
        let mut logical: Vec<Vec<Cell>> = Vec::new();
        let mut current: Vec<Cell> = Vec::new();
        for line in all.into_iter() {
            if !line.is_wrapped() && !current.is_empty() {
                logical.push(std::mem::take(&mut current));
            }
            let width = line.width();
            for c in 0..width {
                current.push(line.cell(c).unwrap_or_default());
            }
        }
        if !current.is_empty() {
            logical.push(current);
        }

        let mut rebuilt: VecDeque<Line> = VecDeque::new();
        for logical_line in logical {
            if logical_line.is_empty() {
                rebuilt.push_back(Line::blank(new_cols, bg));
                continue;
            }
            let mut first_chunk = true;
            for chunk in logical_line.chunks(new_cols.max(1) as usize) {
                let mut cells: Vec<Cell> = chunk.to_vec();
                cells.resize_with(new_cols as usize, || Cell { bg, ..Cell::default() });
                let mut line = Line::Inflated(cells);
                if !first_chunk {
                    line.set_wrapped(true);
                }
                first_chunk = false;
                line.try_demote();
                rebuilt.push_back(line);
            }
        }

        self.scrollback = VecDeque::new();
        self.viewport = VecDeque::new();
        let total = rebuilt.len();
        let keep_sb = total.saturating_sub(0);
        let _ = keep_sb;
        for (i, line) in rebuilt.into_iter().enumerate() {
            if total > 0 && i < total {
                self.viewport.push_back(line);
            }
        }
        // Everything beyond the tail becomes scrollback once resize()
        // trims the viewport down to `new_rows` immediately after this
        // call returns.
        while self.viewport.len() > 1 {
            if let Some(front) = self.viewport.pop_front() {
                self.scrollback.push_back(front);
            } else {
                break;
            }
        }
        // Move everything but nothing back: resize() re-splits by
        // popping from scrollback's tail into viewport's front up to
        // new_rows via the push_back loop below.
        while self.viewport.len() < new_rows as usize && !self.scrollback.is_empty() {
            if let Some(line) = self.scrollback.pop_back() {
                self.viewport.push_front(line);
            }
        }
        while self.scrollback.len() > self.scrollback_limit {
            self.scrollback.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_up_from_top_feeds_scrollback() {
        let mut g = Grid::new(3, 10, 100);
        g.set_cell(0, 0, Cell { text: "x".into(), ..Cell::default() });
        let departing = g.scroll_up(0, 2, Color::Default);
        assert!(departing.is_some());
        assert_eq!(g.scrollback_len(), 1);
    }

    #[test]
    fn scroll_up_outside_top_margin_does_not_feed_scrollback() {
        let mut g = Grid::new(5, 10, 100);
        g.scroll_up(1, 3, Color::Default);
        assert_eq!(g.scrollback_len(), 0);
    }

    #[test]
    fn resize_no_scrollback_clears_grid() {
        let mut g = Grid::new(3, 10, 0);
        g.set_cell(0, 0, Cell { text: "x".into(), ..Cell::default() });
        g.resize_no_scrollback(3, 20, Color::Default);
        assert_eq!(g.cols(), 20);
        assert!(g.viewport_row(0).unwrap().is_blank());
    }

    #[test]
    fn insert_lines_shifts_region_down() {
        let mut g = Grid::new(4, 10, 0);
        g.set_cell(1, 0, Cell { text: "a".into(), ..Cell::default() });
        g.insert_lines(0, 3, 1, Color::Default);
        assert!(g.viewport_row(0).unwrap().is_blank());
        assert_eq!(g.viewport_row(2).unwrap().cell(0).unwrap().text, "a");
    }

    #[test]
    fn reflow_rewraps_a_long_logical_line() {
        let mut g = Grid::new(2, 4, 100);
        for (i, ch) in "abcdefgh".chars().enumerate() {
            let row = (i / 4) as u16;
            let col = (i % 4) as u16;
            g.set_cell(row, col, Cell { text: ch.to_string(), ..Cell::default() });
        }
        g.viewport_row_mut(1).unwrap().set_wrapped(true);
        g.resize(2, 8, true, Color::Default);
        let text = g.viewport_row(0).unwrap().to_text();
        assert!(text.starts_with("abcdefgh"));
    }
}
