use crate::core::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

const MAX_INPUT_ROWS: u16 = 6;
const INPUT_HINT: &str = "Enter send • Alt+Enter newline • Ctrl+Y copy code • Ctrl+L clear • Ctrl+C quit";

/// Waiting glyph for the current pulse phase (two cycles per second).
pub fn pulse_symbol(elapsed_ms: u128) -> &'static str {
    let phase = (elapsed_ms % 1000) as f32 / 500.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.ui.theme.background_color)),
        area,
    );

    let input_rows = app.ui.input_rows(MAX_INPUT_ROWS);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(input_rows + 2), // +2 for borders
            Constraint::Length(1),
        ])
        .split(area);

    render_title(f, app, chunks[0]);
    render_transcript(f, app, chunks[1]);
    render_input(f, app, chunks[2]);
    render_status(f, app, chunks[3]);
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        "Ultron v{} • {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        app.session.endpoint,
        app.session.logging.get_status_string()
    );
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(title, app.ui.theme.title_style))),
        area,
    );
}

fn render_transcript(f: &mut Frame, app: &mut App, area: Rect) {
    let lines = app.ui.prewrapped_lines(area.width).to_vec();

    app.ui.viewport_lines = lines.len();
    app.ui.viewport_height = area.height;
    let offset = app.ui.scroll.effective_offset(lines.len(), area.height);

    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let mut textarea = app.ui.textarea().clone();
    let mut block = Block::bordered()
        .border_style(theme.input_border_style)
        .title(Span::styled(" Message ", theme.input_title_style));
    if app.ui.waiting {
        let elapsed = app.ui.pulse_start.elapsed().as_millis();
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {} waiting ", pulse_symbol(elapsed)),
                theme.waiting_indicator_style,
            ))
            .right_aligned(),
        );
    }
    textarea.set_block(block);
    f.render_widget(&textarea, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let text = app.ui.status.as_deref().unwrap_or(INPUT_HINT);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text.to_string(),
            app.ui.theme.status_style,
        ))),
        area,
    );
}
