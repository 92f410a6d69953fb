use crate::charset::CharsetState;
use crate::color::Color;
use crate::cursor::CursorState;
use crate::grid::{Cell, Grid, Line};

/// Inclusive top/bottom row margin pair for DECSTBM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMargins {
    pub top: u16,
    pub bottom: u16,
}

/// Inclusive left/right column margin pair for DECSLRM, only meaningful
/// while DECLRMM (`CSI ? 69 h`) is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalMargins {
    pub left: u16,
    pub right: u16,
}

/// Everything one logical screen (primary or alternate) owns: its own
/// grid, cursor (with its own DECSC slot), tab stops, and scroll margins
/// on both axes. `TerminalModes` lives one level up and is shared
/// between screens, since DEC modes like application-cursor-keys aren't
/// screen-local state.
#[derive(Debug, Clone)]
pub struct Screen {
    pub grid: Grid,
    pub cursor: CursorState,
    pub charset: CharsetState,
    pub tab_stops: Vec<bool>,
    pub vmargins: VerticalMargins,
    pub hmargins: HorizontalMargins,
    pub left_right_margin_mode: bool,
}

impl Screen {
    pub fn new(rows: u16, cols: u16, scrollback_limit: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols, scrollback_limit),
            cursor: CursorState::new(),
            charset: CharsetState::new(),
            tab_stops: default_tab_stops(cols),
            vmargins: VerticalMargins { top: 0, bottom: rows.saturating_sub(1) },
            hmargins: HorizontalMargins { left: 0, right: cols.saturating_sub(1) },
            left_right_margin_mode: false,
        }
    }

    pub fn rows(&self) -> u16 {
        self.grid.rows()
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols()
    }

    pub fn resize(&mut self, new_rows: u16, new_cols: u16, reflow: bool) {
        self.grid.resize(new_rows, new_cols, reflow, self.cursor.bg);
        self.tab_stops = default_tab_stops(new_cols);
        self.vmargins = VerticalMargins { top: 0, bottom: new_rows.saturating_sub(1) };
        self.hmargins = HorizontalMargins { left: 0, right: new_cols.saturating_sub(1) };
        self.cursor.row = self.cursor.row.min(new_rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(new_cols.saturating_sub(1));
    }

    pub fn set_vertical_margins(&mut self, top: u16, bottom: u16) {
        if top < bottom && bottom < self.rows() {
            self.vmargins = VerticalMargins { top, bottom };
        } else {
            self.vmargins = VerticalMargins { top: 0, bottom: self.rows().saturating_sub(1) };
        }
    }

    pub fn set_horizontal_margins(&mut self, left: u16, right: u16) {
        if !self.left_right_margin_mode {
            return;
        }
        if left < right && right < self.cols() {
            self.hmargins = HorizontalMargins { left, right };
        } else {
            self.hmargins = HorizontalMargins { left: 0, right: self.cols().saturating_sub(1) };
        }
    }

    pub fn reset_margins(&mut self) {
        self.vmargins = VerticalMargins { top: 0, bottom: self.rows().saturating_sub(1) };
        self.hmargins = HorizontalMargins { left: 0, right: self.cols().saturating_sub(1) };
    }

    pub fn in_scroll_region(&self, row: u16) -> bool {
        row >= self.vmargins.top && row <= self.vmargins.bottom
    }

    pub fn set_tab_stop(&mut self, col: u16) {
        if let Some(t) = self.tab_stops.get_mut(col as usize) {
            *t = true;
        }
    }

    pub fn clear_tab_stop(&mut self, col: u16) {
        if let Some(t) = self.tab_stops.get_mut(col as usize) {
            *t = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|t| *t = false);
    }

    pub fn next_tab_stop(&self, from: u16) -> u16 {
        let cols = self.cols();
        let mut col = from + 1;
        while col < cols {
            if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
            col += 1;
        }
        cols.saturating_sub(1)
    }

    /// Scrolls the current scroll region up by `n`, feeding scrollback
    /// only when the top of the region is row 0 of the full grid (an
    /// app-restricted region never contributes history).
    pub fn scroll_up(&mut self, n: u16) {
        for _ in 0..n {
            self.grid.scroll_up(self.vmargins.top, self.vmargins.bottom, self.cursor.bg);
        }
    }

    pub fn scroll_down(&mut self, n: u16) {
        for _ in 0..n {
            self.grid.scroll_down(self.vmargins.top, self.vmargins.bottom, self.cursor.bg);
        }
    }

    pub fn insert_lines(&mut self, n: u16) {
        if !self.in_scroll_region(self.cursor.row) {
            return;
        }
        self.grid
            .insert_lines(self.cursor.row, self.vmargins.bottom, n, self.cursor.bg);
    }

    pub fn delete_lines(&mut self, n: u16) {
        if !self.in_scroll_region(self.cursor.row) {
            return;
        }
        self.grid
            .delete_lines(self.cursor.row, self.vmargins.bottom, n, self.cursor.bg);
    }

    pub fn line_feed(&mut self) {
        self.cursor.autowrap_pending = false;
        if self.cursor.row == self.vmargins.bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
    }

    pub fn reverse_index(&mut self) {
        self.cursor.autowrap_pending = false;
        if self.cursor.row == self.vmargins.top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    pub fn erase_line(&mut self, mode: u16) {
        let row = self.cursor.row;
        let bg = self.cursor.bg;
        match mode {
            0 => {
                for c in self.cursor.col..self.cols() {
                    self.grid.clear_cell(row, c, bg);
                }
            }
            1 => {
                for c in 0..=self.cursor.col.min(self.cols().saturating_sub(1)) {
                    self.grid.clear_cell(row, c, bg);
                }
            }
            2 | 3 => {
                for c in 0..self.cols() {
                    self.grid.clear_cell(row, c, bg);
                }
            }
            _ => {}
        }
        if let Some(line) = self.grid.viewport_row_mut(row) {
            line.try_demote();
        }
    }

    pub fn erase_display(&mut self, mode: u16) {
        let bg = self.cursor.bg;
        match mode {
            0 => {
                self.erase_line(0);
                for r in (self.cursor.row + 1)..self.rows() {
                    for c in 0..self.cols() {
                        self.grid.clear_cell(r, c, bg);
                    }
                }
            }
            1 => {
                self.erase_line(1);
                for r in 0..self.cursor.row {
                    for c in 0..self.cols() {
                        self.grid.clear_cell(r, c, bg);
                    }
                }
            }
            2 => {
                for r in 0..self.rows() {
                    for c in 0..self.cols() {
                        self.grid.clear_cell(r, c, bg);
                    }
                }
            }
            3 => {
                self.grid.clear_scrollback();
            }
            _ => {}
        }
    }

    pub fn insert_chars(&mut self, n: u16) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let right = self.hmargins.right.min(self.cols().saturating_sub(1));
        if let Some(line) = self.grid.viewport_row_mut(row) {
            for _ in 0..n {
                if col > right {
                    break;
                }
                // shift [col, right] right by one, dropping the cell at `right`
                for c in (col..right).rev() {
                    let moved = line.cell(c).unwrap_or_default();
                    line.set_cell(c + 1, moved);
                }
                line.set_cell(col, Cell { bg: self.cursor.bg, ..Cell::default() });
            }
        }
    }

    pub fn delete_chars(&mut self, n: u16) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let right = self.hmargins.right.min(self.cols().saturating_sub(1));
        if let Some(line) = self.grid.viewport_row_mut(row) {
            for _ in 0..n {
                if col > right {
                    break;
                }
                for c in col..right {
                    let moved = line.cell(c + 1).unwrap_or_default();
                    line.set_cell(c, moved);
                }
                line.set_cell(right, Cell { bg: self.cursor.bg, ..Cell::default() });
            }
        }
    }

    pub fn erase_chars(&mut self, n: u16) {
        let row = self.cursor.row;
        let bg = self.cursor.bg;
        let end = (self.cursor.col + n).min(self.cols());
        for c in self.cursor.col..end {
            self.grid.clear_cell(row, c, bg);
        }
    }

    pub fn write_cell(&mut self, cell: Cell) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        self.grid.set_cell(row, col, cell);
    }

    pub fn blank_line(&self) -> Line {
        Line::blank(self.cols(), self.cursor.bg)
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    (0..cols).map(|c| c % 8 == 0).collect()
}
