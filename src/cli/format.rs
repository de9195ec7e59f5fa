//! Offline formatting of a message, and the shared printer used by `say`.

use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use ratatui::crossterm::style::{Attribute, Color as CColor, ContentStyle, StyledContent};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;

use crate::core::highlight::{Highlighter, PlainHighlighter};
use crate::ui::theme::Theme;
use crate::ui::transcript::render_message;
use crate::utils::syntax::SyntectHighlighter;

/// How printed messages are styled.
pub struct OutputStyle {
    pub theme: Theme,
    pub highlighter: Box<dyn Highlighter + Send + Sync>,
    pub color: bool,
}

impl OutputStyle {
    /// Colored output only when stdout is a terminal.
    pub fn detect(theme_name: Option<&str>, syntax_enabled: bool) -> Self {
        Self::new(theme_name, syntax_enabled, io::stdout().is_terminal())
    }

    pub fn new(theme_name: Option<&str>, syntax_enabled: bool, color: bool) -> Self {
        if !color {
            return Self {
                theme: Theme::monochrome(),
                highlighter: Box::new(PlainHighlighter::new()),
                color,
            };
        }
        let theme = theme_name.map_or_else(Theme::dark_default, Theme::from_name);
        let highlighter: Box<dyn Highlighter + Send + Sync> = if syntax_enabled {
            Box::new(SyntectHighlighter::for_theme(&theme))
        } else {
            Box::new(PlainHighlighter::with_style(theme.codeblock_style()))
        };
        Self {
            theme,
            highlighter,
            color,
        }
    }

    pub fn render(&self, text: &str) -> Vec<String> {
        render_message(text, &self.theme, self.highlighter.as_ref())
            .lines
            .iter()
            .map(|line| {
                if self.color {
                    line_to_ansi(line)
                } else {
                    line.to_string()
                }
            })
            .collect()
    }

    pub fn print<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        for line in self.render(text) {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = style.fg.map(CColor::from);
    content.background_color = style.bg.map(CColor::from);
    if style.add_modifier.contains(Modifier::BOLD) {
        content.attributes.set(Attribute::Bold);
    }
    if style.add_modifier.contains(Modifier::ITALIC) {
        content.attributes.set(Attribute::Italic);
    }
    content
}

/// Render a styled line as text with ANSI escapes.
pub fn line_to_ansi(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|span| {
            let style = line.style.patch(span.style);
            if style == Style::default() {
                span.content.to_string()
            } else {
                StyledContent::new(content_style(style), span.content.as_ref()).to_string()
            }
        })
        .collect()
}

pub fn run_format(file: Option<&Path>, style: &OutputStyle) -> Result<(), Box<dyn Error>> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Cannot read {}: {err}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    style.print(&mut io::stdout().lock(), &text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use ratatui::text::Span;
    use tempfile::NamedTempFile;

    #[test]
    fn monochrome_output_is_plain_text() {
        let style = OutputStyle::new(Some("dracula"), true, false);
        let rendered = style.render("Try:\n```bash\necho hi\n```\ndone");
        assert_eq!(
            rendered,
            vec!["Try:", "", "╭─ bash [#1]", "│ echo hi", "╰─", "", "done"]
        );
    }

    #[test]
    fn colored_output_contains_escapes_but_same_text() {
        let style = OutputStyle::new(Some("dark"), false, true);
        let rendered = style.render("```\nx\n```");
        assert!(rendered.iter().any(|l| l.contains("\x1b[")));
        assert!(rendered.iter().any(|l| l.contains("x")));
    }

    #[test]
    fn unstyled_spans_have_no_escapes() {
        let line = Line::from(vec![
            Span::raw("plain "),
            Span::styled("red", Style::default().fg(Color::Red)),
        ]);
        let ansi = line_to_ansi(&line);
        assert!(ansi.starts_with("plain \x1b["));
        assert!(ansi.contains("red"));
    }

    #[test]
    fn print_writes_one_row_per_line() {
        let style = OutputStyle::new(None, false, false);
        let mut out = Vec::new();
        style.print(&mut out, "a\nb").expect("print");
        assert_eq!(String::from_utf8(out).expect("utf8"), "a\nb\n");
    }

    #[test]
    fn run_format_reports_missing_file() {
        let style = OutputStyle::new(None, false, false);
        let err = run_format(Some(Path::new("/no/such/ultron-input.txt")), &style)
            .expect_err("missing file");
        assert!(err.to_string().starts_with("Cannot read"));
    }

    #[test]
    fn run_format_accepts_a_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(file, "hello").expect("write");
        let style = OutputStyle::new(None, false, false);
        run_format(Some(file.path()), &style).expect("format file");
    }
}
