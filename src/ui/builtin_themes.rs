use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSpec {
    pub id: String,
    pub display_name: String,
    pub background: Option<String>,
    pub user_prefix: Option<String>,
    pub user_text: Option<String>,
    pub bot_prefix: Option<String>,
    pub bot_text: Option<String>,
    pub placeholder: Option<String>,
    pub codeblock_bg: Option<String>,
    pub codeblock_text: Option<String>,
    pub codeblock_header: Option<String>,
    pub title: Option<String>,
    pub waiting_indicator: Option<String>,
    pub status: Option<String>,
    pub input_border: Option<String>,
    pub input_title: Option<String>,
    pub input_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinThemesConfig {
    themes: Vec<ThemeSpec>,
}

const CONFIG_CONTENT: &str = include_str!("../builtin_themes.toml");

/// Built-in theme specs. A malformed bundle yields no themes and callers fall
/// back to the hard-coded palettes.
pub fn load_builtin_themes() -> Vec<ThemeSpec> {
    match toml::from_str::<BuiltinThemesConfig>(CONFIG_CONTENT) {
        Ok(config) => config.themes,
        Err(err) => {
            tracing::error!(%err, "failed to parse builtin_themes.toml");
            Vec::new()
        }
    }
}

pub fn find_builtin_theme(id: &str) -> Option<ThemeSpec> {
    load_builtin_themes()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}
