//! Vi-like modal navigation/selection handler: Normal/Insert/Visual/
//! VisualLine/VisualBlock modes, motions, operators, text objects, and
//! repeat counts, dispatched to an `Executor` the embedder/facade
//! implements.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViMode {
    Insert,
    Normal,
    Visual,
    VisualLine,
    VisualBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    WordEndForward,
    LineStart,
    LineEnd,
    FirstNonBlank,
    PageUp,
    PageDown,
    FileStart,
    FileEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjectScope {
    Inner,
    Around,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObject {
    Word,
    Line,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Yank,
}

/// Callbacks the Vi handler drives; implemented by whatever owns the
/// live screen (the facade, in this crate).
pub trait ViExecutor {
    fn mode_changed(&mut self, mode: ViMode);
    fn move_cursor(&mut self, motion: Motion, count: u32);
    fn yank(&mut self, text_object: Option<(TextObjectScope, TextObject)>, count: u32);
    fn select(&mut self, motion: Motion, count: u32);
    fn paste(&mut self);
    fn toggle_visual(&mut self, mode: ViMode);
    fn reverse_search_current_word(&mut self);
    fn scroll_page(&mut self, down: bool);
}

pub fn char_to_motion(ch: char) -> Option<Motion> {
    Some(match ch {
        'h' => Motion::Left,
        'l' => Motion::Right,
        'k' => Motion::Up,
        'j' => Motion::Down,
        'w' => Motion::WordForward,
        'b' => Motion::WordBackward,
        'e' => Motion::WordEndForward,
        '0' => Motion::LineStart,
        '$' => Motion::LineEnd,
        '^' => Motion::FirstNonBlank,
        'G' => Motion::FileEnd,
        _ => return None,
    })
}

pub fn char_to_text_object(ch: char) -> Option<TextObject> {
    Some(match ch {
        'w' => TextObject::Word,
        'l' => TextObject::Line,
        'p' => TextObject::Paragraph,
        _ => return None,
    })
}

/// Modal input state machine. Every top-level action (`yank`/`select`/
/// `execute`) resets `count`/`pending_operator`/`pending_text_object_scope`
/// once dispatched, matching the original's "commands don't carry state
/// across keystrokes" invariant.
pub struct ViInputHandler {
    mode: ViMode,
    count: Option<u32>,
    pending_operator: Option<Operator>,
    pending_text_object_scope: Option<TextObjectScope>,
}

impl ViInputHandler {
    pub fn new() -> Self {
        Self {
            mode: ViMode::Insert,
            count: None,
            pending_operator: None,
            pending_text_object_scope: None,
        }
    }

    pub fn mode(&self) -> ViMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViMode, executor: &mut dyn ViExecutor) {
        self.mode = mode;
        self.count = None;
        self.pending_operator = None;
        self.pending_text_object_scope = None;
        executor.mode_changed(mode);
    }

    fn take_count(&mut self) -> u32 {
        self.count.take().unwrap_or(1)
    }

    fn reset_pending(&mut self) {
        self.count = None;
        self.pending_operator = None;
        self.pending_text_object_scope = None;
    }

    fn parse_count(&mut self, digit: u32) -> bool {
        if digit == 0 && self.count.is_none() {
            return false; // leading zero is a motion (line-start), not a count digit
        }
        self.count = Some(self.count.unwrap_or(0) * 10 + digit);
        true
    }

    fn execute(&mut self, motion: Motion, executor: &mut dyn ViExecutor) {
        let count = self.take_count();
        executor.move_cursor(motion, count);
        self.reset_pending();
    }

    fn select(&mut self, motion: Motion, executor: &mut dyn ViExecutor) {
        let count = self.take_count();
        executor.select(motion, count);
        self.reset_pending();
    }

    fn yank(&mut self, text_object: Option<(TextObjectScope, TextObject)>, executor: &mut dyn ViExecutor) {
        let count = self.take_count();
        executor.yank(text_object, count);
        self.reset_pending();
    }

    pub fn send_char_press_event(&mut self, ch: char, executor: &mut dyn ViExecutor) -> bool {
        match self.mode {
            ViMode::Insert => false,
            ViMode::Normal => self.handle_normal_mode(ch, executor),
            ViMode::Visual | ViMode::VisualLine | ViMode::VisualBlock => self.handle_visual_mode(ch, executor),
        }
    }

    fn parse_text_object(&mut self, ch: char) -> Option<(TextObjectScope, TextObject)> {
        if self.pending_operator != Some(Operator::Yank) {
            return None;
        }
        let scope = self.pending_text_object_scope?;
        let obj = char_to_text_object(ch)?;
        Some((scope, obj))
    }

    fn handle_normal_mode(&mut self, ch: char, executor: &mut dyn ViExecutor) -> bool {
        if ch.is_ascii_digit() {
            return self.parse_count(ch.to_digit(10).unwrap());
        }

        if let Some(to) = self.parse_text_object(ch) {
            self.yank(Some(to), executor);
            return true;
        }

        match ch {
            'i' | 'a' => {
                self.pending_text_object_scope = Some(if ch == 'i' { TextObjectScope::Inner } else { TextObjectScope::Around });
                true
            }
            'y' | 'Y' => {
                self.pending_operator = Some(Operator::Yank);
                true
            }
            'v' => {
                self.set_mode(ViMode::Visual, executor);
                true
            }
            'V' => {
                self.set_mode(ViMode::VisualLine, executor);
                true
            }
            '\x16' => {
                self.set_mode(ViMode::VisualBlock, executor);
                true
            }
            'p' => {
                executor.paste();
                self.reset_pending();
                true
            }
            '#' => {
                executor.reverse_search_current_word();
                self.reset_pending();
                true
            }
            '\x04' => {
                executor.scroll_page(true);
                self.reset_pending();
                true
            }
            '\x15' => {
                executor.scroll_page(false);
                self.reset_pending();
                true
            }
            _ => {
                if let Some(motion) = char_to_motion(ch) {
                    self.execute(motion, executor);
                    true
                } else {
                    self.reset_pending();
                    false
                }
            }
        }
    }

    fn handle_visual_mode(&mut self, ch: char, executor: &mut dyn ViExecutor) -> bool {
        match ch {
            'v' => {
                self.toggle_or_exit(ViMode::Visual, executor);
                true
            }
            'V' => {
                self.toggle_or_exit(ViMode::VisualLine, executor);
                true
            }
            '\x16' => {
                self.toggle_or_exit(ViMode::VisualBlock, executor);
                true
            }
            'y' | 'Y' => {
                executor.yank(None, self.take_count());
                self.set_mode(ViMode::Normal, executor);
                true
            }
            '\x1b' => {
                self.set_mode(ViMode::Normal, executor);
                true
            }
            '\x04' => {
                executor.scroll_page(true);
                true
            }
            '\x15' => {
                executor.scroll_page(false);
                true
            }
            _ => {
                if let Some(motion) = char_to_motion(ch) {
                    self.select(motion, executor);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn toggle_or_exit(&mut self, mode: ViMode, executor: &mut dyn ViExecutor) {
        if self.mode == mode {
            self.set_mode(ViMode::Normal, executor);
        } else {
            self.mode = mode;
            executor.toggle_visual(mode);
        }
    }
}

impl Default for ViInputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingExecutor {
        moves: Vec<(Motion, u32)>,
        yanks: Vec<(Option<(TextObjectScope, TextObject)>, u32)>,
        modes: Vec<ViMode>,
    }

    impl ViExecutor for RecordingExecutor {
        fn mode_changed(&mut self, mode: ViMode) {
            self.modes.push(mode);
        }
        fn move_cursor(&mut self, motion: Motion, count: u32) {
            self.moves.push((motion, count));
        }
        fn yank(&mut self, text_object: Option<(TextObjectScope, TextObject)>, count: u32) {
            self.yanks.push((text_object, count));
        }
        fn select(&mut self, _motion: Motion, _count: u32) {}
        fn paste(&mut self) {}
        fn toggle_visual(&mut self, _mode: ViMode) {}
        fn reverse_search_current_word(&mut self) {}
        fn scroll_page(&mut self, _down: bool) {}
    }

    #[test]
    fn count_accumulates_and_resets_after_motion() {
        let mut vi = ViInputHandler::new();
        let mut exec = RecordingExecutor::default();
        vi.set_mode(ViMode::Normal, &mut exec);
        vi.send_char_press_event('3', &mut exec);
        vi.send_char_press_event('2', &mut exec);
        vi.send_char_press_event('j', &mut exec);
        assert_eq!(exec.moves, vec![(Motion::Down, 32)]);
        vi.send_char_press_event('k', &mut exec);
        assert_eq!(exec.moves[1], (Motion::Up, 1));
    }

    #[test]
    fn leading_zero_is_line_start_motion_not_count() {
        let mut vi = ViInputHandler::new();
        let mut exec = RecordingExecutor::default();
        vi.set_mode(ViMode::Normal, &mut exec);
        vi.send_char_press_event('0', &mut exec);
        assert_eq!(exec.moves, vec![(Motion::LineStart, 1)]);
    }

    #[test]
    fn yank_inner_word_dispatches_text_object() {
        let mut vi = ViInputHandler::new();
        let mut exec = RecordingExecutor::default();
        vi.set_mode(ViMode::Normal, &mut exec);
        vi.send_char_press_event('y', &mut exec);
        vi.send_char_press_event('i', &mut exec);
        vi.send_char_press_event('w', &mut exec);
        assert_eq!(exec.yanks, vec![(Some((TextObjectScope::Inner, TextObject::Word)), 1)]);
    }

    #[test]
    fn insert_mode_ignores_all_input() {
        let mut vi = ViInputHandler::new();
        let mut exec = RecordingExecutor::default();
        assert!(!vi.send_char_press_event('j', &mut exec));
        assert!(exec.moves.is_empty());
    }
}
