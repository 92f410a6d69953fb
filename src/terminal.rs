use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use unicode_segmentation::UnicodeSegmentation;

use crate::callbacks::EmbedderCallbacks;
use crate::charset::WidthPolicy;
use crate::config::TerminalConfig;
use crate::dispatch;
use crate::grid::{Cell, CellFlags};
use crate::hint::HintModeHandler;
use crate::hyperlink::HyperlinkRegistry;
use crate::image::ImagePool;
use crate::input::InputEncoder;
use crate::modes::{DecMode, TerminalModes};
use crate::parser::{ByteParser, FunctionSelector, Sequence, SequenceSink};
use crate::render::{line_to_rendered, CursorRender, RenderFrame, TerminalEvent};
use crate::screen::Screen;
use crate::selection::Selection;
use crate::vi::ViInputHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Process input as it arrives, no throttling.
    Normal,
    /// Suspended: `feed` buffers bytes but does not advance the parser.
    Waiting,
    /// Process exactly one assembled sequence (or one printed character)
    /// per `step` call, for deterministic debugging/replay.
    SingleStep,
    /// Run until the input queue is drained, then stop, even if more
    /// bytes arrive mid-batch (used by the `S1`-style scripted-replay
    /// test harness).
    BreakAtEmptyQueue,
}

/// The terminal core: two screens (primary with scrollback, alternate
/// without), shared mode/hyperlink/image state, and the byte parser
/// that feeds it. This owns no PTY and no thread — it's driven entirely
/// by `feed`/`write_input`/`take_render_snapshot` calls from whatever
/// owns the PTY and the render loop.
pub struct Terminal {
    primary: Screen,
    alternate: Screen,
    using_alt: bool,
    pub modes: TerminalModes,
    pub hyperlinks: HyperlinkRegistry,
    pub active_hyperlink: Option<crate::hyperlink::HyperlinkId>,
    pub images: ImagePool,
    pub input: InputEncoder,
    pub vi: ViInputHandler,
    pub hint: HintModeHandler,
    pub selection: Option<Selection>,
    pub config: TerminalConfig,
    pub callbacks: Box<dyn EmbedderCallbacks>,
    parser: ByteParser,
    pending_sequence: Option<Sequence>,
    sixel_parser: Option<crate::image::sixel::SixelParser>,
    pending_responses: Vec<u8>,
    pub execution_mode: ExecutionMode,
    frame_seq: u64,
    resize_epoch: u64,
    bell_pending: bool,
    pub title: String,
    pending_events: Vec<TerminalEvent>,
    pub last_printed_char: Option<char>,
    last_printed_cell: Option<(u16, u16)>,
    unknown_seen: HashSet<FunctionSelector>,
    unknown_osc_seen: HashSet<u32>,
    dirty: bool,
}

impl Terminal {
    pub fn new(rows: u16, cols: u16, callbacks: Box<dyn EmbedderCallbacks>) -> Self {
        let config = TerminalConfig::default();
        Self {
            primary: Screen::new(rows, cols, config.scrollback_limit),
            alternate: Screen::new(rows, cols, 0),
            using_alt: false,
            modes: TerminalModes::new(),
            hyperlinks: HyperlinkRegistry::new(),
            active_hyperlink: None,
            images: ImagePool::new(),
            input: InputEncoder::new(),
            vi: ViInputHandler::new(),
            hint: HintModeHandler::new(),
            selection: None,
            config,
            callbacks,
            parser: ByteParser::new(),
            pending_sequence: None,
            sixel_parser: None,
            pending_responses: Vec::new(),
            execution_mode: ExecutionMode::Normal,
            frame_seq: 0,
            resize_epoch: 0,
            bell_pending: false,
            title: String::new(),
            pending_events: Vec::new(),
            last_printed_char: None,
            last_printed_cell: None,
            unknown_seen: HashSet::new(),
            unknown_osc_seen: HashSet::new(),
            dirty: true,
        }
    }

    pub fn active_screen(&self) -> &Screen {
        if self.using_alt {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub fn active_screen_mut(&mut self) -> &mut Screen {
        if self.using_alt {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn using_alt_screen(&self) -> bool {
        self.using_alt
    }

    /// Feeds PTY-read bytes through the parser. A no-op while
    /// `execution_mode` is `Waiting`.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.execution_mode == ExecutionMode::Waiting {
            return;
        }
        let mut parser = std::mem::replace(&mut self.parser, ByteParser::new());
        parser.advance(self, bytes);
        self.parser = parser;
    }

    pub fn take_pending_responses(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending_responses)
    }

    pub fn queue_response(&mut self, bytes: Vec<u8>) {
        self.pending_responses.extend(bytes);
    }

    pub(crate) fn push_event(&mut self, event: TerminalEvent) {
        self.pending_events.push(event);
    }

    pub(crate) fn note_unknown(&mut self, seq: &Sequence) {
        let selector = FunctionSelector::from(seq);
        if self.unknown_seen.insert(selector.clone()) {
            tracing::info!(?selector, "unrecognized control sequence (first occurrence)");
        } else {
            tracing::trace!(?selector, "unrecognized control sequence");
        }
    }

    pub(crate) fn note_unknown_osc(&mut self, code: u32) {
        if self.unknown_osc_seen.insert(code) {
            tracing::info!(code, "unrecognized OSC (first occurrence)");
        } else {
            tracing::trace!(code, "unrecognized OSC");
        }
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.primary.resize(rows, cols, true);
        self.alternate.resize(rows, cols, false);
        self.resize_epoch += 1;
        self.last_printed_cell = None;
        self.dirty = true;
    }

    // -- cursor motion, margin-aware --

    pub fn move_cursor_up(&mut self, n: u16) {
        let screen = self.active_screen_mut();
        let top = screen.vmargins.top;
        screen.cursor.row = screen.cursor.row.saturating_sub(n).max(top);
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_down(&mut self, n: u16) {
        let screen = self.active_screen_mut();
        let bottom = screen.vmargins.bottom;
        screen.cursor.row = (screen.cursor.row + n).min(bottom);
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_forward(&mut self, n: u16) {
        let screen = self.active_screen_mut();
        let right = screen.hmargins.right.max(screen.cols().saturating_sub(1));
        screen.cursor.col = (screen.cursor.col + n).min(right);
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_backward(&mut self, n: u16) {
        let screen = self.active_screen_mut();
        screen.cursor.col = screen.cursor.col.saturating_sub(n);
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_to_col(&mut self, col: u16) {
        let screen = self.active_screen_mut();
        screen.cursor.col = col.min(screen.cols().saturating_sub(1));
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_to_row(&mut self, row: u16) {
        let screen = self.active_screen_mut();
        screen.cursor.row = row.min(screen.rows().saturating_sub(1));
        screen.cursor.autowrap_pending = false;
    }

    pub fn move_cursor_to(&mut self, row: u16, col: u16) {
        let origin = self.modes.dec(DecMode::Origin);
        let screen = self.active_screen_mut();
        let (row_base, row_max) = if origin {
            (screen.vmargins.top, screen.vmargins.bottom)
        } else {
            (0, screen.rows().saturating_sub(1))
        };
        screen.cursor.row = (row_base + row).min(row_max);
        screen.cursor.col = col.min(screen.cols().saturating_sub(1));
        screen.cursor.autowrap_pending = false;
    }

    pub fn cursor_report_position(&self) -> (u16, u16) {
        let screen = self.active_screen();
        let origin = self.modes.dec(DecMode::Origin);
        let row_base = if origin { screen.vmargins.top } else { 0 };
        (screen.cursor.row - row_base + 1, screen.cursor.col + 1)
    }

    pub fn save_cursor(&mut self) {
        let origin = self.modes.dec(DecMode::Origin);
        self.active_screen_mut().cursor.save(origin);
    }

    pub fn restore_cursor(&mut self) {
        let origin = self.active_screen_mut().cursor.restore();
        self.modes.set_dec(DecMode::Origin, origin);
    }

    pub fn line_feed(&mut self) {
        self.active_screen_mut().line_feed();
    }

    pub fn new_line(&mut self) {
        self.active_screen_mut().line_feed();
        self.move_cursor_to_col(0);
    }

    pub fn apply_dec_mode(&mut self, mode: DecMode, value: bool) {
        self.modes.set_dec(mode, value);
        match mode {
            DecMode::ShowCursor => self.active_screen_mut().cursor.visible = value,
            DecMode::AltScreenClassic => self.set_alt_screen(value, false),
            DecMode::AltScreenWithClear => self.set_alt_screen(value, true),
            DecMode::AltScreenSaveCursor => {
                if value {
                    self.save_cursor();
                    self.set_alt_screen(true, true);
                } else {
                    self.set_alt_screen(false, true);
                    self.restore_cursor();
                }
            }
            DecMode::LeftRightMargin => {
                self.active_screen_mut().left_right_margin_mode = value;
            }
            DecMode::MouseNormal | DecMode::MouseButtonEvent | DecMode::MouseAnyEvent | DecMode::MouseX10 => {
                self.input.mouse_protocol.protocol = if value {
                    Some(match mode {
                        DecMode::MouseX10 => crate::input::MouseProtocol::X10,
                        DecMode::MouseButtonEvent => crate::input::MouseProtocol::ButtonEvent,
                        DecMode::MouseAnyEvent => crate::input::MouseProtocol::AnyEvent,
                        _ => crate::input::MouseProtocol::Normal,
                    })
                } else {
                    None
                };
                self.callbacks.on_mouse_mode_changed(value);
                self.push_event(TerminalEvent::MouseModeChanged { enabled: value });
            }
            DecMode::SgrMouse => {
                self.input.mouse_protocol.encoding = if value {
                    crate::input::MouseEncoding::Sgr
                } else {
                    crate::input::MouseEncoding::Legacy
                };
            }
            DecMode::Utf8Mouse => {
                if value {
                    self.input.mouse_protocol.encoding = crate::input::MouseEncoding::Utf8;
                }
            }
            DecMode::BracketedPaste => self.input.bracketed_paste = value,
            DecMode::ApplicationCursorKeys => self.input.application_cursor_keys = value,
            _ => {}
        }
    }

    fn set_alt_screen(&mut self, enabled: bool, clear: bool) {
        if enabled == self.using_alt {
            return;
        }
        self.last_printed_cell = None;
        if enabled {
            if clear {
                let (rows, cols) = (self.primary.rows(), self.primary.cols());
                self.alternate.grid.resize_no_scrollback(rows, cols, self.alternate.cursor.bg);
            }
            self.using_alt = true;
            self.callbacks.on_alt_screen_entered();
            self.push_event(TerminalEvent::AltScreenEntered);
        } else {
            self.using_alt = false;
            self.callbacks.on_alt_screen_exited();
            self.push_event(TerminalEvent::AltScreenExited);
        }
    }

    pub fn reset_to_initial_state(&mut self) {
        let (rows, cols) = (self.primary.rows(), self.primary.cols());
        self.primary = Screen::new(rows, cols, self.config.scrollback_limit);
        self.alternate = Screen::new(rows, cols, 0);
        self.using_alt = false;
        self.modes = TerminalModes::new();
        self.title.clear();
        self.active_hyperlink = None;
        self.last_printed_cell = None;
    }

    pub fn print_char(&mut self, ch: char) {
        let width_policy = self.config.width_change_policy;
        let autowrap_enabled = self.modes.dec(DecMode::AutoWrap);
        let hyperlink = self.active_hyperlink;
        let last_printed = self.last_printed_char.zip(self.last_printed_cell);

        let screen = self.active_screen_mut();
        let translated = screen.charset.translate(ch);
        let width = grapheme_width(translated, width_policy);
        if width == 0 {
            // A zero-width codepoint only survives if it extends the
            // previously printed cell into one grapheme cluster (e.g. a
            // combining accent); otherwise it's dropped, matching how a
            // lone combining mark with nothing to attach to has no cell
            // to live in.
            if let Some((prev, (row, col))) = last_printed {
                let mut joined = String::new();
                joined.push(prev);
                joined.push(translated);
                if joined.graphemes(true).count() == 1 {
                    if let Some(cell) = screen.grid.viewport_row_mut(row).and_then(|line| line.cell_mut(col)) {
                        cell.text.push(translated);
                        self.dirty = true;
                    }
                }
            }
            return;
        }

        if screen.cursor.autowrap_pending {
            if autowrap_enabled {
                // The row a soft wrap lands on carries `WRAPPED`, not the
                // row it left — that row's content simply continues here
                // rather than the break being a hard newline.
                screen.cursor.col = screen.hmargins.left;
                screen.line_feed();
                let new_row = screen.cursor.row;
                if let Some(line) = screen.grid.viewport_row_mut(new_row) {
                    line.set_wrapped(true);
                }
            }
            screen.cursor.autowrap_pending = false;
        }

        let right = screen.hmargins.right.max(screen.cols().saturating_sub(1));
        if screen.cursor.col > right {
            screen.cursor.col = right;
        }

        let attrs = screen.cursor.attrs;
        let fg = screen.cursor.fg;
        let bg = screen.cursor.bg;

        let mut cell = Cell {
            text: translated.to_string(),
            width: width as u8,
            fg,
            bg,
            attrs,
            flags: CellFlags::empty(),
            hyperlink,
            image: None,
        };
        if width == 2 {
            cell.flags.insert(CellFlags::WIDE_CHAR);
        }

        let base_pos = (screen.cursor.row, screen.cursor.col);
        screen.write_cell(cell);
        if width == 2 && screen.cursor.col + 1 <= right {
            let cont = Cell::wide_continuation(bg);
            let row = screen.cursor.row;
            screen.grid.set_cell(row, screen.cursor.col + 1, cont);
        }

        if screen.cursor.col + (width as u16) > right {
            screen.cursor.autowrap_pending = true;
            screen.cursor.col = right;
        } else {
            screen.cursor.col += width as u16;
        }

        self.last_printed_char = Some(ch);
        self.last_printed_cell = Some(base_pos);
        self.dirty = true;
    }

    /// Encodes and queues a logical paste event as PTY input; callers
    /// still need to actually write `take_pending_responses` /
    /// equivalent buffer to the PTY.
    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        self.input.encode_paste(text)
    }

    pub fn take_render_snapshot(&mut self) -> Option<RenderFrame> {
        if !self.dirty && self.pending_events.is_empty() {
            return None;
        }
        self.frame_seq += 1;
        let screen = self.active_screen();
        let rows = screen.rows();
        let cols = screen.cols();
        let hyperlinks = &self.hyperlinks;
        let lines = (0..rows)
            .filter_map(|r| screen.grid.visible_row(r))
            .enumerate()
            .map(|(i, line)| {
                line_to_rendered(i as u32, line, |cell| {
                    cell.hyperlink.and_then(|id| hyperlinks.get(id)).map(|h| h.uri.to_string())
                })
            })
            .collect();

        let cursor = CursorRender {
            row: screen.cursor.row,
            col: screen.cursor.col,
            visible: screen.cursor.visible,
            shape: CursorRender::shape_name(screen.cursor.shape).to_string(),
        };

        let mut events = std::mem::take(&mut self.pending_events);
        if self.bell_pending {
            events.push(TerminalEvent::Bell);
            self.bell_pending = false;
            self.callbacks.on_bell();
        }

        let frame = RenderFrame {
            frame_seq: self.frame_seq,
            resize_epoch: self.resize_epoch,
            lines,
            visible_rows: rows,
            visible_cols: cols,
            cursor,
            events,
        };
        self.dirty = false;
        Some(frame)
    }
}

/// Shared ownership of a `Terminal` behind one coarse lock, per the
/// single-lock/two-lane concurrency model: a writer lane feeds PTY bytes
/// in via `feed`, a reader lane pulls `RenderFrame` snapshots out. Both
/// lanes take the same lock, so there is exactly one place contention
/// can happen and no risk of the two ever observing torn state.
#[derive(Clone)]
pub struct TerminalHandle(Arc<Mutex<Terminal>>);

impl TerminalHandle {
    pub fn new(rows: u16, cols: u16, callbacks: Box<dyn EmbedderCallbacks>) -> Self {
        Self(Arc::new(Mutex::new(Terminal::new(rows, cols, callbacks))))
    }

    /// Writer lane: feed bytes just read from the PTY.
    pub fn feed(&self, bytes: &[u8]) {
        self.0.lock().feed(bytes);
    }

    /// Reader lane: pull the current frame, or `None` if nothing changed
    /// since the last snapshot.
    pub fn take_render_snapshot(&self) -> Option<RenderFrame> {
        self.0.lock().take_render_snapshot()
    }

    pub fn take_pending_responses(&self) -> Vec<u8> {
        self.0.lock().take_pending_responses()
    }

    pub fn resize(&self, rows: u16, cols: u16) {
        self.0.lock().resize(rows, cols);
    }

    pub fn set_execution_mode(&self, mode: ExecutionMode) {
        self.0.lock().execution_mode = mode;
    }

    /// Runs `f` with exclusive access, for callers that need to compose
    /// several facade calls (e.g. input encoding + queuing) atomically.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Terminal) -> R) -> R {
        f(&mut self.0.lock())
    }
}

fn grapheme_width(ch: char, policy: WidthPolicy) -> usize {
    use unicode_width::UnicodeWidthChar;
    match policy {
        WidthPolicy::Narrow => 1,
        WidthPolicy::Wide => 2,
        WidthPolicy::Auto => ch.width().unwrap_or(0),
    }
}

impl SequenceSink for Terminal {
    fn print(&mut self, ch: char) {
        self.print_char(ch);
    }

    fn execute_c0(&mut self, byte: u8) {
        match byte {
            0x07 => {
                self.bell_pending = true;
                self.dirty = true;
            }
            0x08 => self.move_cursor_backward(1),
            0x09 => {
                let screen = self.active_screen_mut();
                let next = screen.next_tab_stop(screen.cursor.col);
                screen.cursor.col = next;
            }
            0x0a | 0x0b | 0x0c => self.line_feed(),
            0x0d => self.move_cursor_to_col(0),
            0x0e => self.active_screen_mut().charset.shift_out(),
            0x0f => self.active_screen_mut().charset.shift_in(),
            _ => {}
        }
        if byte != 0x07 {
            self.last_printed_cell = None;
        }
        self.dirty = true;
    }

    fn dispatch(&mut self, seq: Sequence) {
        self.last_printed_cell = None;
        dispatch::dispatch(self, seq);
        self.dirty = true;
    }

    fn dcs_put(&mut self, byte: u8) {
        if let Some(parser) = &mut self.sixel_parser {
            parser.parse(byte);
        }
    }

    fn dcs_hook(&mut self, seq: Sequence) {
        if seq.final_byte == b'q' {
            self.sixel_parser = Some(crate::image::sixel::SixelParser::new());
        }
        self.pending_sequence = Some(seq);
    }

    fn dcs_unhook(&mut self) {
        if let Some(parser) = self.sixel_parser.take() {
            let (w, h, rgba) = parser.finish();
            if w > 0 && h > 0 {
                let cap = self.config.image_canvas_size_cap;
                if w <= cap.0 && h <= cap.1 {
                    let image = self.images.insert(w, h, rgba);
                    self.push_event(TerminalEvent::SixelImage { id: image.id });
                } else {
                    tracing::warn!(w, h, "sixel image exceeds canvas size cap, dropping");
                }
            }
        }
        self.pending_sequence = None;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::NullCallbacks;

    fn term() -> Terminal {
        Terminal::new(4, 10, Box::new(NullCallbacks))
    }

    #[test]
    fn printing_advances_cursor() {
        let mut t = term();
        t.feed(b"ab");
        assert_eq!(t.active_screen().cursor.col, 2);
    }

    #[test]
    fn autowrap_defers_until_next_print() {
        let mut t = term();
        t.feed(b"0123456789");
        assert_eq!(t.active_screen().cursor.col, 9);
        assert!(t.active_screen().cursor.autowrap_pending);
        t.feed(b"X");
        assert_eq!(t.active_screen().cursor.row, 1);
        assert_eq!(t.active_screen().cursor.col, 1);
    }

    #[test]
    fn wide_char_writes_continuation_cell() {
        let mut t = term();
        t.feed("中".as_bytes());
        assert_eq!(t.active_screen().cursor.col, 2);
        let line = t.active_screen().grid.viewport_row(0).unwrap();
        assert!(line.cell(1).unwrap().flags.contains(CellFlags::WIDE_CHAR_CONTINUATION));
    }

    #[test]
    fn alt_screen_round_trip_preserves_primary_contents() {
        let mut t = term();
        t.feed(b"hello");
        t.feed(b"\x1b[?1049h");
        assert!(t.using_alt_screen());
        t.feed(b"world");
        t.feed(b"\x1b[?1049l");
        assert!(!t.using_alt_screen());
        let line = t.active_screen().grid.viewport_row(0).unwrap();
        assert_eq!(line.cell(0).unwrap().text, "h");
    }

    #[test]
    fn ris_resets_modes_and_clears_screen() {
        let mut t = term();
        t.feed(b"\x1b[1m");
        t.feed(b"\x1bc");
        assert!(t.active_screen().cursor.attrs.is_empty());
    }

    #[test]
    fn bell_sets_pending_event_once_consumed() {
        let mut t = term();
        t.feed(b"\x07");
        let frame = t.take_render_snapshot().unwrap();
        assert!(frame.events.iter().any(|e| matches!(e, TerminalEvent::Bell)));
    }

    #[test]
    fn combining_accent_merges_into_previous_cell() {
        let mut t = term();
        t.feed("e\u{0301}".as_bytes());
        assert_eq!(t.active_screen().cursor.col, 1);
        let line = t.active_screen().grid.viewport_row(0).unwrap();
        assert_eq!(line.cell(0).unwrap().text, "e\u{0301}");
    }

    #[test]
    fn combining_accent_with_no_prior_cell_is_dropped() {
        let mut t = term();
        t.feed("\u{0301}".as_bytes());
        assert_eq!(t.active_screen().cursor.col, 0);
        let line = t.active_screen().grid.viewport_row(0).unwrap();
        assert!(line.is_blank());
    }
}
