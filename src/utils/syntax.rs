use crate::core::highlight::{detab, plain_lines, Highlighter, Markup};
use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock, PoisonError};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

const CACHE_CAPACITY: usize = 64;

// Simple FIFO cache (bounded) for highlighted blocks
// key = (lang_norm, hash)
struct SimpleCache {
    map: HashMap<(String, u64), Markup>,
    order: VecDeque<(String, u64)>,
    cap: usize,
}

impl SimpleCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, k: &(String, u64)) -> Option<Markup> {
        self.map.get(k).cloned()
    }

    fn put(&mut self, k: (String, u64), v: Markup) {
        if !self.map.contains_key(&k) {
            self.order.push_back(k.clone());
        }
        self.map.insert(k, v);
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn hash_code(lang: &str, code: &str, theme_sig: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    theme_sig.hash(&mut hasher);
    hasher.finish()
}

fn is_dark_background(c: &TuiColor) -> bool {
    match c {
        TuiColor::Rgb(r, g, b) => {
            let br = 0.2126 * (*r as f32) + 0.7152 * (*g as f32) + 0.0722 * (*b as f32);
            br < 128.0
        }
        TuiColor::White => false,
        _ => true,
    }
}

pub(crate) fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" | "python3" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "javascript" | "jsx" | "mjs" | "node" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "json" => "json".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "go" | "golang" => "go".into(),
        "c" | "h" => "c".into(),
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "cpp".into(),
        "cs" | "csharp" => "cs".into(),
        "java" => "java".into(),
        "rb" | "ruby" => "ruby".into(),
        "html" | "htm" | "xml" => t,
        "css" => "css".into(),
        "sql" => "sql".into(),
        "md" | "markdown" => "markdown".into(),
        other => other.into(),
    }
}

/// Guess a language token from the code itself when no hint is available.
pub(crate) fn guess_language(code: &str) -> Option<&'static str> {
    if let Some(syntax) = syntax_set().find_syntax_by_first_line(code) {
        let token = syntax
            .file_extensions
            .first()
            .and_then(|ext| match ext.as_str() {
                "sh" => Some("bash"),
                "py" => Some("python"),
                "rb" => Some("ruby"),
                "pl" => Some("perl"),
                "php" => Some("php"),
                "js" => Some("javascript"),
                "xml" => Some("xml"),
                _ => None,
            });
        if token.is_some() {
            return token;
        }
    }

    let trimmed = code.trim_start();
    let has = |needle: &str| code.contains(needle);
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
            return Some("json");
        }
    }
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") || has("</div>") {
        return Some("html");
    }
    if has("fn ") && (has("let ") || has("->") || has("::")) {
        return Some("rust");
    }
    if has("package main") || (has("func ") && has(":=")) {
        return Some("go");
    }
    if has("#include") {
        return Some("cpp");
    }
    if has("public class ") || has("public static void") {
        return Some("java");
    }
    if (has("def ") || has("import ")) && has(":\n") {
        return Some("python");
    }
    if has("function ") || has("const ") || has("=>") || has("console.log") {
        return Some("javascript");
    }
    let upper = trimmed.to_ascii_uppercase();
    if ["SELECT ", "CREATE TABLE", "INSERT INTO"]
        .iter()
        .any(|kw| upper.starts_with(kw))
    {
        return Some("sql");
    }
    None
}

fn find_syntax<'a>(ps: &'a SyntaxSet, lang_norm: &str) -> Option<&'a SyntaxReference> {
    if lang_norm.is_empty() {
        return None;
    }
    ps.find_syntax_by_token(lang_norm)
        .or_else(|| ps.find_syntax_by_extension(lang_norm))
}

// Helper to choose a syntect theme name based on background brightness.
// Kept small and pure for testing.
pub(crate) fn pick_syntect_theme_name_for_theme(theme: &Theme) -> &'static str {
    if is_dark_background(&theme.background_color) {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

// Helper to build the cache-relevant theme signature.
pub(crate) fn build_theme_signature(theme: &Theme, chosen_syntect: &str) -> String {
    fn color_sig_opt(c: Option<TuiColor>) -> String {
        match c {
            Some(TuiColor::Rgb(r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
            Some(other) => format!("{:?}", other),
            None => "none".to_string(),
        }
    }
    format!(
        "{}|{}|{:?}",
        chosen_syntect,
        color_sig_opt(theme.codeblock_bg),
        theme.background_color
    )
}

/// [`Highlighter`] backed by syntect's default grammars and themes.
pub struct SyntectHighlighter {
    syntect_theme: &'static str,
    theme_sig: String,
    code_style: Style,
    code_bg: Option<TuiColor>,
    cache: Mutex<SimpleCache>,
}

impl SyntectHighlighter {
    pub fn for_theme(theme: &Theme) -> Self {
        let syntect_theme = pick_syntect_theme_name_for_theme(theme);
        Self {
            syntect_theme,
            theme_sig: build_theme_signature(theme, syntect_theme),
            code_style: theme.codeblock_style(),
            code_bg: theme.codeblock_bg,
            cache: Mutex::new(SimpleCache::new(CACHE_CAPACITY)),
        }
    }

    pub fn cached_blocks(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn resolve_language(&self, code: &str, hint: Option<&str>) -> String {
        let ps = syntax_set();
        if let Some(hint) = hint {
            let norm = normalize_lang_hint(hint);
            if find_syntax(ps, &norm).is_some() {
                return norm;
            }
            debug!(hint, "no grammar for language hint; guessing");
        }
        guess_language(code).map(str::to_owned).unwrap_or_default()
    }

    fn highlight_with_syntect(&self, lang_norm: &str, code: &str) -> Option<Markup> {
        let ps = syntax_set();
        let ts = theme_set();
        let fallback_names = [
            "base16-ocean.light",
            "Solarized (light)",
            "base16-ocean.dark",
        ];
        let syn_theme = ts
            .themes
            .get(self.syntect_theme)
            .or_else(|| fallback_names.iter().find_map(|name| ts.themes.get(*name)))?;

        let syntax = find_syntax(ps, lang_norm).unwrap_or_else(|| ps.find_syntax_plain_text());
        let mut h = HighlightLines::new(syntax, syn_theme);

        let mut out: Markup = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = match h.highlight_line(line, ps) {
                Ok(ranges) => ranges,
                Err(err) => {
                    debug!(%err, lang = lang_norm, "syntect failed; using plain lines");
                    return None;
                }
            };
            let mut spans: Vec<Span<'static>> = Vec::new();
            for (style, text) in ranges {
                // strip the line terminator before rendering in a Line
                let frag = text.trim_end_matches(['\n', '\r']);
                if frag.is_empty() {
                    continue;
                }
                let fg = style.foreground;
                let mut st = Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = self.code_bg {
                    st = st.bg(bg);
                }
                spans.push(Span::styled(detab(frag), st));
            }
            out.push(Line::from(spans));
        }
        Some(out)
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Markup {
        let lang_norm = self.resolve_language(code, language);
        let key = (lang_norm.clone(), hash_code(&lang_norm, code, &self.theme_sig));
        if let Some(lines) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return lines;
        }

        let out = self
            .highlight_with_syntect(&lang_norm, code)
            .unwrap_or_else(|| plain_lines(code, self.code_style));

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, out.clone());
        out
    }
}
