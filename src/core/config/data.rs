use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::completion::DEFAULT_ENDPOINT;
use crate::utils::url::validate_endpoint;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Completion endpoint queried with `?q=<prompt>`
    pub endpoint: Option<String>,
    /// UI theme name (e.g., "dark", "light", "dracula")
    pub theme: Option<String>,
    /// Enable syntax highlighting for fenced code blocks
    pub syntax: Option<bool>,
}

/// Keys accepted by `ultron set` / `ultron unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    Theme,
    Syntax,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Endpoint, ConfigKey::Theme, ConfigKey::Syntax];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::Theme => "theme",
            ConfigKey::Syntax => "syntax",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown config key: {s} (expected one of: {})", known.join(", "))
            })
    }
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Expected on/off, got '{other}'")),
    }
}

impl Config {
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    /// Validate and store `value` under `key`.
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        match key {
            ConfigKey::Endpoint => self.endpoint = Some(validate_endpoint(value)?),
            ConfigKey::Theme => {
                let theme = value.trim();
                if theme.is_empty() {
                    return Err("Theme name cannot be empty".to_string());
                }
                self.theme = Some(theme.to_string());
            }
            ConfigKey::Syntax => self.syntax = Some(parse_toggle(value)?),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::Theme => self.theme = None,
            ConfigKey::Syntax => self.syntax = None,
        }
    }

    /// Human-readable listing of every key, one per line.
    pub fn describe(&self) -> Vec<String> {
        vec![
            match &self.endpoint {
                Some(endpoint) => format!("  endpoint: {endpoint}"),
                None => format!("  endpoint: (unset, default {DEFAULT_ENDPOINT})"),
            },
            match &self.theme {
                Some(theme) => format!("  theme: {theme}"),
                None => "  theme: (unset)".to_string(),
            },
            format!(
                "  syntax: {}",
                if self.syntax_enabled() { "on" } else { "off" }
            ),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("{line}");
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
