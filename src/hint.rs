//! Hint mode: scans visible lines for regex matches (URLs, paths, git
//! hashes, IP addresses), overlays a label on each, and lets the user
//! type the label to select one.

use regex::Regex;

use crate::geometry::{CellLocation, ColumnOffset, LineOffset, PageSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintAction {
    Copy,
    Open,
}

#[derive(Clone)]
pub struct HintPattern {
    pub name: &'static str,
    pub regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintMatch {
    pub label: String,
    pub matched_text: String,
    pub start: CellLocation,
    pub end: CellLocation,
}

pub trait HintExecutor {
    fn on_hint_mode_entered(&mut self);
    fn on_hint_mode_exited(&mut self);
    fn on_hint_selected(&mut self, text: String, action: HintAction);
    fn request_redraw(&mut self);
}

pub struct HintModeHandler {
    active: bool,
    patterns: Vec<HintPattern>,
    all_matches: Vec<HintMatch>,
    filtered_matches: Vec<HintMatch>,
    filter: String,
    action: HintAction,
}

impl HintModeHandler {
    pub fn new() -> Self {
        Self {
            active: false,
            patterns: Vec::new(),
            all_matches: Vec::new(),
            filtered_matches: Vec::new(),
            filter: String::new(),
            action: HintAction::Copy,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn matches(&self) -> &[HintMatch] {
        &self.filtered_matches
    }

    pub fn activate(
        &mut self,
        visible_lines: &[String],
        page_size: PageSize,
        patterns: Vec<HintPattern>,
        action: HintAction,
        executor: &mut dyn HintExecutor,
    ) {
        self.action = action;
        self.patterns = patterns;
        self.rescan_lines(visible_lines, page_size);
        self.active = true;
        executor.on_hint_mode_entered();
        executor.request_redraw();
    }

    pub fn refresh(&mut self, visible_lines: &[String], page_size: PageSize, executor: &mut dyn HintExecutor) {
        self.rescan_lines(visible_lines, page_size);
        executor.request_redraw();
    }

    pub fn deactivate(&mut self, executor: &mut dyn HintExecutor) {
        if !self.active {
            return;
        }
        self.active = false;
        self.filter.clear();
        self.all_matches.clear();
        self.filtered_matches.clear();
        executor.on_hint_mode_exited();
        executor.request_redraw();
    }

    fn rescan_lines(&mut self, visible_lines: &[String], page_size: PageSize) {
        self.filter.clear();
        self.all_matches.clear();
        self.filtered_matches.clear();

        let line_count = visible_lines.len().min(page_size.lines as usize);
        for line_idx in 0..line_count {
            let text = &visible_lines[line_idx];
            let line_offset = LineOffset(line_idx as i32);
            for pattern in &self.patterns {
                for m in pattern.regex.find_iter(text) {
                    if m.as_str().is_empty() {
                        continue;
                    }
                    let start_col = text[..m.start()].chars().count() as i32;
                    let end_col = start_col + m.as_str().chars().count() as i32 - 1;
                    self.all_matches.push(HintMatch {
                        label: String::new(),
                        matched_text: m.as_str().to_string(),
                        start: CellLocation { line: line_offset, column: ColumnOffset(start_col) },
                        end: CellLocation { line: line_offset, column: ColumnOffset(end_col) },
                    });
                }
            }
        }

        self.all_matches.sort_by(|a, b| {
            a.start
                .line
                .cmp(&b.start.line)
                .then(a.start.column.cmp(&b.start.column))
                .then(b.end.column.cmp(&a.end.column))
        });

        self.all_matches.dedup_by(|a, b| a.start == b.start && a.end == b.end);

        let mut kept: Vec<HintMatch> = Vec::with_capacity(self.all_matches.len());
        for m in self.all_matches.drain(..) {
            if let Some(last) = kept.last() {
                if last.start.line == m.start.line && m.start.column <= last.end.column {
                    continue;
                }
            }
            kept.push(m);
        }
        self.all_matches = kept;

        self.assign_labels();
        self.filtered_matches = self.all_matches.clone();
    }

    fn assign_labels(&mut self) {
        let count = self.all_matches.len();
        if count == 0 {
            return;
        }
        let two_char = count > 26;
        for (i, m) in self.all_matches.iter_mut().enumerate() {
            m.label = if two_char {
                let first = (b'a' + (i / 26) as u8) as char;
                let second = (b'a' + (i % 26) as u8) as char;
                format!("{first}{second}")
            } else {
                ((b'a' + i as u8) as char).to_string()
            };
        }
    }

    fn update_filtered_matches(&mut self) {
        let filter = self.filter.clone();
        self.filtered_matches = self
            .all_matches
            .iter()
            .filter(|m| m.label.starts_with(&filter))
            .cloned()
            .collect();
    }

    pub fn process_input(&mut self, ch: char, executor: &mut dyn HintExecutor) -> bool {
        if !self.active {
            return false;
        }

        if ch == '\u{1b}' {
            self.deactivate(executor);
            return true;
        }

        if ch == '\u{8}' || ch == '\u{7f}' {
            if !self.filter.is_empty() {
                self.filter.pop();
                self.update_filtered_matches();
                executor.request_redraw();
            }
            return true;
        }

        let ch = ch.to_ascii_lowercase();
        if !ch.is_ascii_lowercase() {
            return true;
        }

        self.filter.push(ch);
        self.update_filtered_matches();

        if self.filtered_matches.len() == 1 && self.filtered_matches[0].label == self.filter {
            let text = self.filtered_matches[0].matched_text.clone();
            let action = self.action;
            self.deactivate(executor);
            executor.on_hint_selected(text, action);
            return true;
        }

        if self.filtered_matches.is_empty() {
            self.deactivate(executor);
            return true;
        }

        executor.request_redraw();
        true
    }
}

impl Default for HintModeHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn builtin_patterns() -> Vec<HintPattern> {
    vec![
        HintPattern { name: "url", regex: Regex::new(r#"https?://[^\s<>"'\)\]\}]+"#).unwrap() },
        HintPattern {
            name: "filepath",
            regex: Regex::new(r#"(?:~?/[\w./-]+|\.{1,2}/[\w./-]+|[\w][\w.-]*/[\w./-]+)"#).unwrap(),
        },
        HintPattern { name: "githash", regex: Regex::new(r"\b[0-9a-f]{7,40}\b").unwrap() },
        HintPattern {
            name: "ipv4",
            regex: Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}(?::\d+)?\b").unwrap(),
        },
        HintPattern {
            name: "ipv6",
            regex: Regex::new(r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b").unwrap(),
        },
    ]
}

/// `file:///path` -> `/path`, `file://host/path` -> `/path`.
pub fn extract_path_from_file_url(url: &str) -> String {
    const PREFIX: &str = "file://";
    let Some(remainder) = url.strip_prefix(PREFIX) else {
        return url.to_string();
    };
    if !remainder.starts_with('/') {
        return match remainder.find('/') {
            Some(pos) => remainder[pos..].to_string(),
            None => String::new(),
        };
    }
    remainder.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingExecutor {
        entered: bool,
        exited: bool,
        selected: Option<(String, HintAction)>,
    }

    impl HintExecutor for RecordingExecutor {
        fn on_hint_mode_entered(&mut self) {
            self.entered = true;
        }
        fn on_hint_mode_exited(&mut self) {
            self.exited = true;
        }
        fn on_hint_selected(&mut self, text: String, action: HintAction) {
            self.selected = Some((text, action));
        }
        fn request_redraw(&mut self) {}
    }

    #[test]
    fn scans_and_labels_two_urls() {
        let mut hint = HintModeHandler::new();
        let mut exec = RecordingExecutor::default();
        let lines = vec!["visit https://a.example and https://b.example".to_string()];
        hint.activate(&lines, PageSize::new(24, 80), builtin_patterns(), HintAction::Copy, &mut exec);
        assert_eq!(hint.matches().len(), 2);
        assert_eq!(hint.matches()[0].label, "a");
        assert_eq!(hint.matches()[1].label, "b");
    }

    #[test]
    fn typing_unique_label_selects_and_deactivates() {
        let mut hint = HintModeHandler::new();
        let mut exec = RecordingExecutor::default();
        let lines = vec!["https://a.example".to_string()];
        hint.activate(&lines, PageSize::new(24, 80), builtin_patterns(), HintAction::Open, &mut exec);
        hint.process_input('a', &mut exec);
        assert!(!hint.is_active());
        assert_eq!(exec.selected, Some(("https://a.example".to_string(), HintAction::Open)));
    }

    #[test]
    fn escape_cancels_hint_mode() {
        let mut hint = HintModeHandler::new();
        let mut exec = RecordingExecutor::default();
        let lines = vec!["https://a.example".to_string()];
        hint.activate(&lines, PageSize::new(24, 80), builtin_patterns(), HintAction::Copy, &mut exec);
        hint.process_input('\u{1b}', &mut exec);
        assert!(!hint.is_active());
        assert!(exec.exited);
    }

    #[test]
    fn overlapping_matches_keep_the_earlier_longer_one() {
        let mut hint = HintModeHandler::new();
        let mut exec = RecordingExecutor::default();
        // githash overlaps a filepath-looking ipv4: keep whichever sorts first (longer at same start).
        let lines = vec!["deadbeefcafebabe0123456789".to_string()];
        hint.activate(&lines, PageSize::new(24, 80), builtin_patterns(), HintAction::Copy, &mut exec);
        assert_eq!(hint.matches().len(), 1);
    }

    #[test]
    fn file_url_path_extraction() {
        assert_eq!(extract_path_from_file_url("file:///tmp/x"), "/tmp/x");
        assert_eq!(extract_path_from_file_url("file://host/tmp/x"), "/tmp/x");
        assert_eq!(extract_path_from_file_url("not-a-url"), "not-a-url");
    }
}
