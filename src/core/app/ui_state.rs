use std::time::{Duration, Instant};

use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders};
use tui_textarea::TextArea;

use crate::core::highlight::{Highlighter, PlainHighlighter};
use crate::core::history::ChatHistory;
use crate::ui::theme::Theme;
use crate::ui::transcript::{build_transcript, Transcript};
use crate::utils::scroll::{prewrap_lines, ScrollState};
use crate::utils::syntax::SyntectHighlighter;

pub const INPUT_PLACEHOLDER: &str = "Type...";
/// How long a status message replaces the key hints.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Transcript built for one history revision, plus its wrapping for the
/// last width drawn.
struct TranscriptCache {
    revision: u64,
    waiting: bool,
    transcript: Transcript,
    wrapped: Option<(u16, Vec<Line<'static>>)>,
}

/// Presentation state: transcript, input editor, scroll and status line.
pub struct UiState {
    pub history: ChatHistory,
    pub theme: Theme,
    pub syntax_enabled: bool,
    pub scroll: ScrollState,
    /// Set while a reply is outstanding; sending is refused meanwhile.
    pub waiting: bool,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    /// Index into the transcript's code blocks last copied.
    pub copy_cursor: Option<usize>,
    pub pulse_start: Instant,
    /// Wrapped transcript size and visible height from the last frame.
    pub viewport_lines: usize,
    pub viewport_height: u16,
    textarea: TextArea<'static>,
    highlighter: Box<dyn Highlighter + Send + Sync>,
    transcript_cache: Option<TranscriptCache>,
}

fn make_highlighter(theme: &Theme, syntax_enabled: bool) -> Box<dyn Highlighter + Send + Sync> {
    if syntax_enabled {
        Box::new(SyntectHighlighter::for_theme(theme))
    } else {
        Box::new(PlainHighlighter::with_style(theme.codeblock_style()))
    }
}

fn make_textarea(theme: &Theme) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(INPUT_PLACEHOLDER);
    textarea.set_style(theme.input_text_style);
    textarea.set_cursor_line_style(Style::default());
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style),
    );
    textarea
}

impl UiState {
    pub fn new(theme: Theme, syntax_enabled: bool) -> Self {
        Self {
            history: ChatHistory::new(),
            highlighter: make_highlighter(&theme, syntax_enabled),
            textarea: make_textarea(&theme),
            theme,
            syntax_enabled,
            scroll: ScrollState::default(),
            waiting: false,
            status: None,
            status_set_at: None,
            copy_cursor: None,
            pulse_start: Instant::now(),
            viewport_lines: 0,
            viewport_height: 0,
            transcript_cache: None,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    /// True once the current status has been shown for `STATUS_TIMEOUT`.
    pub fn status_expired(&self, now: Instant) -> bool {
        self.status_set_at
            .is_some_and(|set_at| now.saturating_duration_since(set_at) >= STATUS_TIMEOUT)
    }

    fn transcript_cache(&mut self) -> &mut TranscriptCache {
        let revision = self.history.revision();
        let waiting = self.waiting;
        if self
            .transcript_cache
            .as_ref()
            .is_some_and(|c| c.revision != revision || c.waiting != waiting)
        {
            self.transcript_cache = None;
        }
        let (history, theme, highlighter) = (&self.history, &self.theme, self.highlighter.as_ref());
        self.transcript_cache.get_or_insert_with(|| TranscriptCache {
            revision,
            waiting,
            transcript: build_transcript(history.entries(), waiting, theme, highlighter),
            wrapped: None,
        })
    }

    /// Formatted transcript, rebuilt only when the history changed.
    pub fn transcript(&mut self) -> &Transcript {
        &self.transcript_cache().transcript
    }

    /// Transcript lines wrapped to `width`, cached until the history or the
    /// width changes.
    pub fn prewrapped_lines(&mut self, width: u16) -> &[Line<'static>] {
        let cache = self.transcript_cache();
        if !cache.wrapped.as_ref().is_some_and(|(w, _)| *w == width) {
            let lines = prewrap_lines(&cache.transcript.lines, width);
            cache.wrapped = Some((width, lines));
        }
        match &cache.wrapped {
            Some((_, lines)) => lines,
            None => &[],
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll
            .scroll_down(lines, self.viewport_lines, self.viewport_height);
    }

    pub fn page_size(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.textarea = make_textarea(&self.theme);
        self.textarea.insert_str(text);
    }

    pub fn clear_input(&mut self) {
        self.set_input_text("");
    }

    /// Rows the input box needs, borders excluded, capped at `max_rows`.
    pub fn input_rows(&self, max_rows: u16) -> u16 {
        let rows = u16::try_from(self.textarea.lines().len()).unwrap_or(u16::MAX);
        rows.clamp(1, max_rows.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::ChatEntry;

    #[test]
    fn input_round_trips_multiline_text() {
        let mut ui = UiState::new(Theme::monochrome(), false);
        ui.set_input_text("line one\nline two");
        assert_eq!(ui.input_text(), "line one\nline two");
        assert_eq!(ui.input_rows(5), 2);
        ui.clear_input();
        assert_eq!(ui.input_text(), "");
        assert_eq!(ui.input_rows(5), 1);
    }

    #[test]
    fn input_rows_are_capped() {
        let mut ui = UiState::new(Theme::monochrome(), false);
        ui.set_input_text("1\n2\n3\n4\n5\n6");
        assert_eq!(ui.input_rows(4), 4);
    }

    #[test]
    fn transcript_is_reused_until_history_changes() {
        let mut ui = UiState::new(Theme::dark_default(), true);
        for i in 0..40 {
            ui.history
                .push(ChatEntry::bot(format!("block {i}\n```rust\nlet v{i} = {i};\n```")));
        }
        let first = ui.transcript().lines.as_ptr();
        let second = ui.transcript().lines.as_ptr();
        assert_eq!(first, second, "unchanged history must not rebuild");

        ui.history.push_exchange("more");
        assert_eq!(ui.transcript().code_blocks.len(), 40);
        assert_eq!(ui.transcript().lines.last().map(|l| l.to_string()), Some(String::new()));
        assert!(ui
            .transcript()
            .lines
            .iter()
            .any(|l| l.to_string() == "more"));
    }

    #[test]
    fn prewrap_cache_reuse_and_width_change() {
        let mut ui = UiState::new(Theme::monochrome(), false);
        for _ in 0..20 {
            ui.history
                .push(ChatEntry::bot("lorem ipsum dolor sit amet consectetur adipiscing elit"));
        }
        let (ptr, wide) = {
            let lines = ui.prewrapped_lines(100);
            (lines.as_ptr(), lines.len())
        };
        assert_eq!(ptr, ui.prewrapped_lines(100).as_ptr());

        let narrow = ui.prewrapped_lines(20).len();
        assert!(narrow > wide);
    }

    #[test]
    fn prewrap_cache_follows_history_edits() {
        let mut ui = UiState::new(Theme::monochrome(), false);
        ui.history.push_exchange("q");
        ui.waiting = true;
        let pending = ui.prewrapped_lines(40).len();

        assert!(ui.history.replace_last_reply("a\nb\nc"));
        ui.waiting = false;
        assert_eq!(ui.prewrapped_lines(40).len(), pending + 2);

        ui.history.clear();
        assert!(ui.prewrapped_lines(40).is_empty());
    }

    #[test]
    fn status_expires_after_timeout() {
        let mut ui = UiState::new(Theme::monochrome(), false);
        assert!(!ui.status_expired(Instant::now()));

        ui.set_status("History cleared");
        let set_at = ui.status_set_at.expect("timestamp");
        assert!(!ui.status_expired(set_at));
        assert!(ui.status_expired(set_at + STATUS_TIMEOUT));

        ui.clear_status();
        assert!(ui.status.is_none());
        assert!(!ui.status_expired(set_at + STATUS_TIMEOUT));
    }
}
