use std::error::Error;

use tracing::warn;

use crate::core::config::Config;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;
use crate::utils::url::validate_endpoint;

pub mod actions;
pub mod session;
pub mod ui_state;

pub use actions::{apply_action, apply_actions, AppAction, AppCommand, RequestParams};
pub use session::SessionContext;
pub use ui_state::{UiState, STATUS_TIMEOUT};

/// Command-line overrides applied on top of the saved configuration.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub endpoint: Option<String>,
    pub log_file: Option<String>,
    pub theme: Option<String>,
    pub no_syntax: bool,
}

pub struct App {
    pub session: SessionContext,
    pub ui: UiState,
}

impl App {
    pub fn new(config: &Config, options: Option<AppOptions>) -> Result<App, Box<dyn Error>> {
        let options = options.unwrap_or_default();

        let endpoint = match options.endpoint {
            Some(endpoint) => validate_endpoint(&endpoint)?,
            None => config.endpoint_or_default().to_string(),
        };
        let logging = LoggingState::new(options.log_file)?;

        let theme_name = options.theme.as_deref().or(config.theme.as_deref());
        let theme = match theme_name {
            Some(name) => {
                let theme = Theme::from_name(name);
                if !Theme::is_known(name) {
                    warn!(theme = name, "unknown theme, using dark");
                }
                theme
            }
            None => Theme::dark_default(),
        };
        let syntax_enabled = config.syntax_enabled() && !options.no_syntax;

        Ok(App {
            session: SessionContext::new(endpoint, logging),
            ui: UiState::new(theme, syntax_enabled),
        })
    }

    pub fn is_waiting(&self) -> bool {
        self.ui.waiting
    }

    /// Take the input box contents as a submit action.
    pub fn take_input(&mut self) -> AppAction {
        let message = self.ui.input_text();
        if !message.trim().is_empty() && !self.ui.waiting {
            self.ui.clear_input();
        }
        AppAction::SubmitMessage { message }
    }
}
