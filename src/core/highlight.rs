//! Highlighting capability used by the message formatter.
//!
//! The formatter only needs "turn this code into styled lines". Backends
//! decide how: [`PlainHighlighter`] leaves the text untouched, while
//! [`crate::utils::syntax::SyntectHighlighter`] applies syntect grammars.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Styled output for a code block, one entry per source line.
pub type Markup = Vec<Line<'static>>;

pub trait Highlighter {
    /// Highlight `code`, using `language` to pick a grammar when present.
    ///
    /// Implementations never fail: an unknown language or a grammar error
    /// degrades to a best guess or to unstyled lines.
    fn highlight(&self, code: &str, language: Option<&str>) -> Markup;
}

/// Highlighter that performs no styling beyond an optional base style.
#[derive(Debug, Clone, Default)]
pub struct PlainHighlighter {
    style: Style,
}

impl PlainHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: Style) -> Self {
        Self { style }
    }
}

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Markup {
        plain_lines(code, self.style)
    }
}

/// Split `code` into unstyled (or uniformly styled) lines.
///
/// A trailing newline terminates the last line rather than opening a new one,
/// so `"a\nb\n"` yields two lines.
pub fn plain_lines(code: &str, style: Style) -> Markup {
    code.lines()
        .map(|line| Line::from(Span::styled(detab(line), style)))
        .collect()
}

pub(crate) fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

/// Concatenate the text of styled lines, dropping styles.
pub fn markup_text(markup: &[Line<'_>]) -> String {
    markup
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
