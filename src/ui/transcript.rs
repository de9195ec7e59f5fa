//! Turns chat entries into styled terminal lines.
//!
//! Every entry is run through [`format_message`]; plain segments become one
//! line per source line and code blocks become a header followed by the
//! highlighter's markup.

use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::format::{code_blocks, format_message, CodeBlock, Segment};
use crate::core::highlight::Highlighter;
use crate::core::message::ChatEntry;
use crate::ui::theme::Theme;

const CODE_GUTTER: &str = "│ ";

/// A code block as exposed to the copy action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub language: Option<String>,
    pub content: String,
}

impl From<&CodeBlock> for CopyTarget {
    fn from(block: &CodeBlock) -> Self {
        Self {
            language: block.language.clone(),
            content: block.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub lines: Vec<Line<'static>>,
    /// Code blocks of the whole transcript, in display order.
    pub code_blocks: Vec<CopyTarget>,
}

/// Build the transcript for `entries`.
///
/// With `awaiting_reply` set, a trailing bot entry is the pending reply and
/// is drawn in the placeholder style instead of being formatted.
pub fn build_transcript(
    entries: &[ChatEntry],
    awaiting_reply: bool,
    theme: &Theme,
    highlighter: &dyn Highlighter,
) -> Transcript {
    let mut transcript = Transcript::default();
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let pending = awaiting_reply && i == last && entry.is_bot;
        render_entry(entry, pending, theme, highlighter, &mut transcript);
        transcript.lines.push(Line::from(""));
    }
    transcript
}

/// Render one message body without a speaker header, as `say` and `format`
/// print it.
pub fn render_message(text: &str, theme: &Theme, highlighter: &dyn Highlighter) -> Transcript {
    let mut transcript = Transcript::default();
    push_body(
        text,
        theme.bot_text_style,
        Alignment::Left,
        theme,
        highlighter,
        &mut transcript,
    );
    transcript
}

fn render_entry(
    entry: &ChatEntry,
    pending: bool,
    theme: &Theme,
    highlighter: &dyn Highlighter,
    out: &mut Transcript,
) {
    let (prefix_style, text_style, alignment) = if entry.is_bot {
        (theme.bot_prefix_style, theme.bot_text_style, Alignment::Left)
    } else {
        (theme.user_prefix_style, theme.user_text_style, Alignment::Right)
    };

    out.lines
        .push(Line::from(Span::styled(entry.speaker_label(), prefix_style)).alignment(alignment));

    if pending {
        out.lines
            .push(Line::from(Span::styled(entry.text.clone(), theme.placeholder_style)));
        return;
    }

    push_body(&entry.text, text_style, alignment, theme, highlighter, out);
}

fn push_body(
    text: &str,
    text_style: Style,
    alignment: Alignment,
    theme: &Theme,
    highlighter: &dyn Highlighter,
    out: &mut Transcript,
) {
    let segments = format_message(text, highlighter);
    let only_segment = segments.len() == 1;
    let mut index = out.code_blocks.len();
    for segment in &segments {
        match segment {
            Segment::Plain { content } => {
                // Empty text between adjacent fences has nothing to show.
                if content.is_empty() && !only_segment {
                    continue;
                }
                for line in segment.lines() {
                    out.lines.push(
                        Line::from(Span::styled(line.replace('\t', "    "), text_style))
                            .alignment(alignment),
                    );
                }
            }
            Segment::Code(block) => {
                index += 1;
                push_code_block(block, index, theme, &mut out.lines);
            }
        }
    }
    out.code_blocks
        .extend(code_blocks(&segments).map(CopyTarget::from));
}

fn push_code_block(block: &CodeBlock, index: usize, theme: &Theme, lines: &mut Vec<Line<'static>>) {
    let label = block.language.as_deref().unwrap_or("code");
    lines.push(Line::from(vec![
        Span::styled(format!("╭─ {label} "), theme.codeblock_header_style),
        Span::styled(format!("[#{index}]"), theme.codeblock_header_style),
    ]));

    let gutter_style = theme.codeblock_header_style;
    if block.markup.is_empty() {
        lines.push(Line::from(vec![
            Span::styled(CODE_GUTTER, gutter_style),
            Span::styled("", theme.codeblock_style()),
        ]));
    }
    for markup_line in &block.markup {
        let mut spans = Vec::with_capacity(markup_line.spans.len() + 1);
        spans.push(Span::styled(CODE_GUTTER, gutter_style));
        spans.extend(
            markup_line
                .spans
                .iter()
                .map(|span| Span::styled(span.content.to_string(), span.style)),
        );
        lines.push(Line::from(spans).style(code_line_style(theme)));
    }
    lines.push(Line::from(Span::styled("╰─", gutter_style)));
}

fn code_line_style(theme: &Theme) -> Style {
    match theme.codeblock_bg {
        Some(bg) => Style::default().bg(bg),
        None => Style::default(),
    }
}
