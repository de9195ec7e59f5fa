use crate::core::config::Config;
use crate::ui::builtin_themes::load_builtin_themes;

/// Theme listing with the configured one marked.
pub fn theme_listing(config: &Config) -> Vec<String> {
    let current_id_for_mark = config.theme.as_deref().unwrap_or("dark");
    let current_display = config.theme.as_deref().unwrap_or("(default: dark)");

    let mut out = vec!["Available themes:".to_string(), String::new()];
    for t in load_builtin_themes() {
        let mark = if t.id.eq_ignore_ascii_case(current_id_for_mark) {
            "*"
        } else {
            " "
        };
        out.push(format!("  {} {} - {}", mark, t.id, t.display_name));
    }
    let mono_mark = if current_id_for_mark.eq_ignore_ascii_case("monochrome") {
        "*"
    } else {
        " "
    };
    out.push(format!("  {mono_mark} monochrome - Monochrome"));
    out.push(String::new());
    out.push(format!("Current: {current_display}"));
    out
}

pub fn list_themes(config: &Config) {
    for line in theme_listing(config) {
        println!("{line}");
    }
}
