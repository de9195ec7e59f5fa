use crate::ui::builtin_themes::{find_builtin_theme, ThemeSpec};
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat entry styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_prefix_style: Style,
    pub bot_text_style: Style,
    pub placeholder_style: Style,

    // Code blocks
    pub codeblock_bg: Option<Color>,
    pub codeblock_text_style: Style,
    pub codeblock_header_style: Style,

    // Chrome
    pub title_style: Style,
    pub waiting_indicator_style: Style,
    pub status_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        // Prefer built-in spec for consistent RGB colors
        if let Some(spec) = find_builtin_theme("dark") {
            return Self::from_spec(&spec);
        }
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            bot_prefix_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            bot_text_style: Style::default().fg(Color::White),
            placeholder_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            codeblock_bg: Some(Color::Rgb(30, 30, 30)),
            codeblock_text_style: Style::default().fg(Color::Gray),
            codeblock_header_style: Style::default().fg(Color::DarkGray),
            title_style: Style::default().fg(Color::Gray),
            waiting_indicator_style: Style::default().fg(Color::White),
            status_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
        }
    }

    pub fn light() -> Self {
        if let Some(spec) = find_builtin_theme("light") {
            return Self::from_spec(&spec);
        }
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            bot_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            bot_text_style: Style::default().fg(Color::Black),
            placeholder_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            codeblock_bg: Some(Color::Rgb(241, 241, 241)),
            codeblock_text_style: Style::default().fg(Color::Black),
            codeblock_header_style: Style::default().fg(Color::DarkGray),
            title_style: Style::default().fg(Color::Blue),
            waiting_indicator_style: Style::default().fg(Color::Black),
            status_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::Black),
        }
    }

    /// Uncolored theme for piping formatted output.
    pub fn monochrome() -> Self {
        Theme {
            background_color: Color::Reset,
            user_prefix_style: Style::default().add_modifier(Modifier::BOLD),
            user_text_style: Style::default(),
            bot_prefix_style: Style::default().add_modifier(Modifier::BOLD),
            bot_text_style: Style::default(),
            placeholder_style: Style::default().add_modifier(Modifier::ITALIC),
            codeblock_bg: None,
            codeblock_text_style: Style::default(),
            codeblock_header_style: Style::default(),
            title_style: Style::default(),
            waiting_indicator_style: Style::default(),
            status_style: Style::default(),
            input_border_style: Style::default(),
            input_title_style: Style::default(),
            input_text_style: Style::default(),
        }
    }

    /// Resolve a theme by name, falling back to the dark default.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dark" | "default" | "default-dark" => Self::dark_default(),
            "light" => Self::light(),
            "mono" | "monochrome" => Self::monochrome(),
            other => find_builtin_theme(other)
                .map(|spec| Self::from_spec(&spec))
                .unwrap_or_else(Self::dark_default),
        }
    }

    /// Whether `name` resolves to a theme other than the fallback.
    pub fn is_known(name: &str) -> bool {
        matches!(
            name.to_ascii_lowercase().as_str(),
            "dark" | "default" | "default-dark" | "light" | "mono" | "monochrome"
        ) || find_builtin_theme(name).is_some()
    }

    pub fn codeblock_style(&self) -> Style {
        match self.codeblock_bg {
            Some(bg) => self.codeblock_text_style.bg(bg),
            None => self.codeblock_text_style,
        }
    }

    pub fn from_spec(spec: &ThemeSpec) -> Self {
        let background_color = spec
            .background
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(Color::Black);

        Theme {
            background_color,
            user_prefix_style: parse_style(spec.user_prefix.as_deref()),
            user_text_style: parse_style(spec.user_text.as_deref()),
            bot_prefix_style: parse_style(spec.bot_prefix.as_deref()),
            bot_text_style: parse_style(spec.bot_text.as_deref()),
            placeholder_style: parse_style(spec.placeholder.as_deref()),
            codeblock_bg: spec.codeblock_bg.as_deref().and_then(parse_color),
            codeblock_text_style: parse_style(spec.codeblock_text.as_deref()),
            codeblock_header_style: parse_style(spec.codeblock_header.as_deref()),
            title_style: parse_style(spec.title.as_deref()),
            waiting_indicator_style: parse_style(spec.waiting_indicator.as_deref()),
            status_style: parse_style(spec.status.as_deref()),
            input_border_style: parse_style(spec.input_border.as_deref()),
            input_title_style: parse_style(spec.input_title.as_deref()),
            input_text_style: parse_style(spec.input_text.as_deref()),
        }
    }
}

pub(crate) fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    // Hex: #rgb or #rrggbb
    if let Some(c) = parse_hex_color(&lower) {
        return Some(c);
    }
    // rgb(r,g,b)
    if let Some(c) = parse_rgb_func(&lower) {
        return Some(c);
    }
    match lower.as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark-grey" | "darkgray" => Some(Color::DarkGray),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "blue" => Some(Color::Blue),
        "light_blue" | "light-blue" => Some(Color::LightBlue),
        "cyan" => Some(Color::Cyan),
        "magenta" => Some(Color::Magenta),
        "light_magenta" | "light-magenta" => Some(Color::LightMagenta),
        "yellow" => Some(Color::Yellow),
        "reset" => Some(Color::Reset),
        _ => None,
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_func(s: &str) -> Option<Color> {
    // Format: rgb(r,g,b)
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<_> = content
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u16>().ok()?;
    let g = parts[1].parse::<u16>().ok()?;
    let b = parts[2].parse::<u16>().ok()?;
    Some(Color::Rgb(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8))
}

/// Parse a comma-separated style spec such as `"#88c0d0,bold"`.
pub(crate) fn parse_style(spec: Option<&str>) -> Style {
    let mut style = Style::default();
    let Some(spec) = spec else {
        return style;
    };
    for tok in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(color) = parse_color(tok) {
            style = style.fg(color);
            continue;
        }
        match tok.to_ascii_lowercase().as_str() {
            "bold" => style = style.add_modifier(Modifier::BOLD),
            "reversed" => style = style.add_modifier(Modifier::REVERSED),
            "italic" => style = style.add_modifier(Modifier::ITALIC),
            "dim" => style = style.add_modifier(Modifier::DIM),
            _ => {}
        }
    }
    style
}
