use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Wrap styled lines to `width` columns, keeping span styles and alignment.
///
/// Lines are rendered without ratatui's own wrapping so that the number of
/// lines produced here is exactly what ends up on screen.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len());

    for line in lines {
        let alignment = line.alignment;
        let finish = |spans: Vec<Span<'static>>| {
            let mut wrapped = Line::from(spans).style(line.style);
            wrapped.alignment = alignment;
            wrapped
        };

        if width == 0 || line.width() <= width {
            let spans = line
                .spans
                .iter()
                .map(|s| Span::styled(s.content.to_string(), s.style))
                .collect();
            out.push(finish(spans));
            continue;
        }

        let mut current: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0usize;
        for span in &line.spans {
            let mut run = String::new();
            for ch in span.content.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > width && current_width > 0 {
                    if !run.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut run), span.style));
                    }
                    out.push(finish(std::mem::take(&mut current)));
                    current_width = 0;
                }
                run.push(ch);
                current_width += ch_width;
            }
            if !run.is_empty() {
                current.push(Span::styled(run, span.style));
            }
        }
        out.push(finish(current));
    }

    out
}

/// Scroll position of the transcript, measured in lines from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub offset: u16,
    /// Follow new content at the bottom until the user scrolls up.
    pub auto_scroll: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            auto_scroll: true,
        }
    }
}

impl ScrollState {
    pub fn max_offset(total_lines: usize, available_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total.saturating_sub(available_height)
    }

    /// Offset to render with, applying auto-scroll and clamping.
    pub fn effective_offset(&mut self, total_lines: usize, available_height: u16) -> u16 {
        let max = Self::max_offset(total_lines, available_height);
        if self.auto_scroll {
            self.offset = max;
        } else {
            self.offset = self.offset.min(max);
        }
        self.offset
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16, total_lines: usize, available_height: u16) {
        let max = Self::max_offset(total_lines, available_height);
        self.offset = self.offset.saturating_add(lines).min(max);
        if self.offset >= max {
            self.auto_scroll = true;
        }
    }

    pub fn to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    #[test]
    fn short_lines_are_untouched() {
        let lines = vec![Line::from("hello"), Line::from("")];
        let wrapped = prewrap_lines(&lines, 10);
        assert_eq!(wrapped, lines);
    }

    #[test]
    fn long_lines_wrap_and_keep_styles() {
        let red = Style::default().fg(Color::Red);
        let line = Line::from(vec![Span::styled("abcd", red), Span::raw("efgh")]);
        let wrapped = prewrap_lines(&[line], 3);
        let texts: Vec<String> = wrapped.iter().map(|l| l.to_string()).collect();
        assert_eq!(texts, vec!["abc", "def", "gh"]);
        assert_eq!(wrapped[1].spans[0].style, red);
        assert_eq!(wrapped[1].spans[1].style, Style::default());
    }

    #[test]
    fn wide_characters_count_double() {
        let wrapped = prewrap_lines(&[Line::from("日本語")], 4);
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn alignment_survives_wrapping() {
        let line = Line::from("right aligned text").alignment(Alignment::Right);
        let wrapped = prewrap_lines(&[line], 6);
        assert!(wrapped.iter().all(|l| l.alignment == Some(Alignment::Right)));
    }

    #[test]
    fn auto_scroll_sticks_to_bottom() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.effective_offset(30, 10), 20);
        assert_eq!(scroll.effective_offset(35, 10), 25);
    }

    #[test]
    fn manual_scroll_disables_follow_until_bottom() {
        let mut scroll = ScrollState::default();
        scroll.effective_offset(30, 10);
        scroll.scroll_up(5);
        assert!(!scroll.auto_scroll);
        assert_eq!(scroll.effective_offset(40, 10), 15);

        scroll.scroll_down(100, 40, 10);
        assert!(scroll.auto_scroll);
        assert_eq!(scroll.effective_offset(40, 10), 30);
    }

    #[test]
    fn short_transcript_never_scrolls() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.effective_offset(3, 10), 0);
    }
}
