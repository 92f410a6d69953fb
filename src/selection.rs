//! Text selection: linear, word-wise, full-line, and rectangular modes,
//! driven through a `SelectionHelper` the grid implements so this module
//! stays grid-representation-agnostic.

use crate::geometry::{CellLocation, ColumnOffset, ColumnRange, LineOffset, PageSize};

/// What the selection engine needs to know about the grid to extend and
/// render a selection, without depending on `Grid`/`Screen` directly.
pub trait SelectionHelper {
    fn page_size(&self) -> PageSize;
    fn word_delimited(&self, pos: CellLocation) -> bool;
    fn wrapped_line(&self, line: LineOffset) -> bool;
    fn cell_empty(&self, pos: CellLocation) -> bool;
    fn cell_width(&self, pos: CellLocation) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Waiting,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Linear,
    WordWise,
    FullLine,
    Rectangular,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub mode: SelectionMode,
    pub state: SelectionState,
    from: CellLocation,
    to: CellLocation,
}

impl Selection {
    pub fn new(mode: SelectionMode, start: CellLocation) -> Self {
        Self {
            mode,
            state: SelectionState::Waiting,
            from: start,
            to: start,
        }
    }

    pub fn from(&self) -> CellLocation {
        self.from
    }

    pub fn to(&self) -> CellLocation {
        self.to
    }

    pub fn complete(&mut self) {
        self.state = SelectionState::Complete;
    }

    fn ordered(&self) -> (CellLocation, CellLocation) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    /// Shifts both endpoints when the viewport scrolls, clamping at the
    /// top of scrollback so a selection anchored in history doesn't walk
    /// past what's retained.
    pub fn apply_scroll(&mut self, delta: i32, scrollback_len: i32) {
        let floor = -scrollback_len;
        self.from.line = LineOffset((self.from.line.0 - delta).max(floor));
        self.to.line = LineOffset((self.to.line.0 - delta).max(floor));
    }

    pub fn contains(&self, pos: CellLocation, helper: &dyn SelectionHelper) -> bool {
        match self.mode {
            SelectionMode::Rectangular => {
                let (a, b) = self.ordered();
                let (left, right) = if a.column <= b.column {
                    (a.column, b.column)
                } else {
                    (b.column, a.column)
                };
                pos.line >= a.line && pos.line <= b.line && pos.column >= left && pos.column <= right
            }
            _ => {
                let _ = helper;
                let (a, b) = self.ordered();
                if pos.line < a.line || pos.line > b.line {
                    return false;
                }
                if pos.line == a.line && pos.column < a.column {
                    return false;
                }
                if pos.line == b.line && pos.column > b.column {
                    return false;
                }
                true
            }
        }
    }

    pub fn extend(&mut self, to: CellLocation, helper: &dyn SelectionHelper) {
        self.state = SelectionState::InProgress;
        match self.mode {
            SelectionMode::Linear | SelectionMode::Rectangular => {
                self.to = to;
            }
            SelectionMode::WordWise => {
                if to < self.from {
                    self.from = extend_word_forward(self.from, helper);
                    self.to = extend_word_backward(to, helper);
                } else {
                    self.from = extend_word_backward(self.from, helper);
                    self.to = extend_word_forward(to, helper);
                }
            }
            SelectionMode::FullLine => {
                let cols = helper.page_size().columns as i32;
                let mut top = self.from.line;
                let mut bottom = to.line;
                if bottom < top {
                    std::mem::swap(&mut top, &mut bottom);
                }
                while top.0 != i32::MIN && helper.wrapped_line(top - 1) {
                    top = top - 1;
                }
                while helper.wrapped_line(bottom) {
                    bottom = bottom + 1;
                }
                if to.line < self.from.line {
                    self.from = CellLocation { line: bottom, column: ColumnOffset(cols - 1) };
                    self.to = CellLocation { line: top, column: ColumnOffset(0) };
                } else {
                    self.from = CellLocation { line: top, column: ColumnOffset(0) };
                    self.to = CellLocation { line: bottom, column: ColumnOffset(cols - 1) };
                }
            }
        }
    }

    /// Builds the per-line column ranges this selection covers, the form
    /// the renderer and clipboard-copy logic both consume.
    pub fn ranges(&self, helper: &dyn SelectionHelper) -> Vec<ColumnRange> {
        let (a, b) = self.ordered();
        let cols = helper.page_size().columns as i32;

        if self.mode == SelectionMode::Rectangular {
            let (left, right) = if a.column <= b.column { (a.column, b.column) } else { (b.column, a.column) };
            let mut out = Vec::new();
            let mut line = a.line;
            while line <= b.line {
                out.push(ColumnRange { line, from_column: left, to_column: right });
                line = line + 1;
            }
            return out;
        }

        if a.line == b.line {
            return vec![ColumnRange { line: a.line, from_column: a.column, to_column: b.column }];
        }

        let mut out = Vec::with_capacity((b.line.0 - a.line.0 + 1) as usize);
        out.push(ColumnRange { line: a.line, from_column: a.column, to_column: ColumnOffset(cols - 1) });
        let mut line = a.line + 1;
        while line < b.line {
            out.push(ColumnRange { line, from_column: ColumnOffset(0), to_column: ColumnOffset(cols - 1) });
            line = line + 1;
        }
        out.push(ColumnRange { line: b.line, from_column: ColumnOffset(0), to_column: b.column });
        out
    }
}

fn extend_word_backward(mut pos: CellLocation, helper: &dyn SelectionHelper) -> CellLocation {
    loop {
        if helper.word_delimited(pos) {
            break;
        }
        if pos.column.0 == 0 {
            if pos.line.0 == i32::MIN || !helper.wrapped_line(pos.line - 1) {
                break;
            }
            pos.line = pos.line - 1;
            pos.column = ColumnOffset(helper.page_size().columns as i32 - 1);
        } else {
            pos.column = pos.column - 1;
        }
        if helper.word_delimited(pos) {
            // stepped onto a delimiter: undo the last move
            if pos.column.0 == helper.page_size().columns as i32 - 1 {
                pos.line = pos.line + 1;
                pos.column = ColumnOffset(0);
            } else {
                pos.column = pos.column + 1;
            }
            break;
        }
    }
    pos
}

fn extend_word_forward(mut pos: CellLocation, helper: &dyn SelectionHelper) -> CellLocation {
    let max_col = helper.page_size().columns as i32 - 1;
    loop {
        if helper.word_delimited(pos) {
            break;
        }
        if pos.column.0 >= max_col {
            if !helper.wrapped_line(pos.line) {
                break;
            }
            pos.line = pos.line + 1;
            pos.column = ColumnOffset(0);
        } else {
            pos.column = pos.column + 1;
        }
        if helper.word_delimited(pos) {
            if pos.column.0 == 0 {
                pos.line = pos.line - 1;
                pos.column = ColumnOffset(max_col);
            } else {
                pos.column = pos.column - 1;
            }
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeGrid {
        cols: u16,
        delimiters: Vec<CellLocation>,
        wrapped: Vec<LineOffset>,
    }

    impl SelectionHelper for FakeGrid {
        fn page_size(&self) -> PageSize {
            PageSize::new(5, self.cols)
        }
        fn word_delimited(&self, pos: CellLocation) -> bool {
            self.delimiters.contains(&pos)
        }
        fn wrapped_line(&self, line: LineOffset) -> bool {
            self.wrapped.contains(&line)
        }
        fn cell_empty(&self, _pos: CellLocation) -> bool {
            false
        }
        fn cell_width(&self, _pos: CellLocation) -> i32 {
            1
        }
    }

    #[test]
    fn linear_selection_orders_from_to() {
        let sel = Selection::new(SelectionMode::Linear, CellLocation::new(0, 5));
        let helper = FakeGrid { cols: 10, delimiters: vec![], wrapped: vec![] };
        assert!(sel.contains(CellLocation::new(0, 5), &helper));
        assert!(!sel.contains(CellLocation::new(0, 6), &helper));
    }

    #[test]
    fn rectangular_selection_bounds_by_column_on_every_line() {
        let mut sel = Selection::new(SelectionMode::Rectangular, CellLocation::new(0, 2));
        let helper = FakeGrid { cols: 10, delimiters: vec![], wrapped: vec![] };
        sel.extend(CellLocation::new(2, 6), &helper);
        assert!(sel.contains(CellLocation::new(1, 4), &helper));
        assert!(!sel.contains(CellLocation::new(1, 7), &helper));
    }

    #[test]
    fn full_line_selection_snaps_to_edges() {
        let mut sel = Selection::new(SelectionMode::FullLine, CellLocation::new(0, 3));
        let helper = FakeGrid { cols: 10, delimiters: vec![], wrapped: vec![] };
        sel.extend(CellLocation::new(1, 3), &helper);
        let ranges = sel.ranges(&helper);
        assert_eq!(ranges[0].from_column, ColumnOffset(0));
        assert_eq!(ranges.last().unwrap().to_column, ColumnOffset(9));
    }

    #[test]
    fn full_line_selection_expands_through_wrapped_chain() {
        // Line 0 wraps into line 1, which wraps into line 2; starting the
        // selection on line 1 must still pick up the whole wrapped
        // paragraph (lines 0-2), not just line 1.
        let mut sel = Selection::new(SelectionMode::FullLine, CellLocation::new(1, 3));
        let helper = FakeGrid {
            cols: 10,
            delimiters: vec![],
            wrapped: vec![LineOffset(0), LineOffset(1)],
        };
        sel.extend(CellLocation::new(1, 3), &helper);
        assert_eq!(sel.from().line, LineOffset(0));
        assert_eq!(sel.to().line, LineOffset(2));
    }

    #[test]
    fn multi_line_ranges_cover_full_width_in_the_middle() {
        let sel = Selection {
            mode: SelectionMode::Linear,
            state: SelectionState::Complete,
            from: CellLocation::new(0, 5),
            to: CellLocation::new(2, 3),
        };
        let helper = FakeGrid { cols: 10, delimiters: vec![], wrapped: vec![] };
        let ranges = sel.ranges(&helper);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[1].from_column, ColumnOffset(0));
        assert_eq!(ranges[1].to_column, ColumnOffset(9));
    }

    #[test]
    fn apply_scroll_clamps_at_scrollback_floor() {
        let mut sel = Selection::new(SelectionMode::Linear, CellLocation::new(0, 0));
        sel.apply_scroll(5, 3);
        assert_eq!(sel.from().line, LineOffset(-3));
    }
}
