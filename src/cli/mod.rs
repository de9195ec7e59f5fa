//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod format;
pub mod say;
pub mod theme_list;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::format::{run_format, OutputStyle};
use crate::cli::say::{resolve_endpoint, run_say};
use crate::cli::theme_list::list_themes;
use crate::core::app::AppOptions;
use crate::core::config::{path_display, Config, ConfigKey};
use crate::ui::chat_loop::run_chat;
use crate::ui::theme::Theme;
use crate::utils::diagnostics::{init_tracing, LogTarget};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_SHA"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")\nbuilt: ",
    env!("VERGEN_BUILD_DATE"),
    "\ntarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "ultron")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat client for the Ultron completion endpoint")]
#[command(
    long_about = "Ultron is a full-screen terminal chat client. Each message is sent to a \
text-completion endpoint as `?q=<prompt>` and the reply is shown with fenced code \
blocks highlighted.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Up/Down/Mouse     Scroll through chat history\n\
  PgUp/PgDn         Scroll by a page\n\
  Ctrl+Y            Copy the last code block (repeat for earlier ones)\n\
  Ctrl+L            Clear the conversation\n\
  Ctrl+C / Esc      Quit the application\n\n\
Environment Variables:\n\
  ULTRON_LOG        Diagnostic log filter (e.g. debug, ultron=trace)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Completion endpoint URL (overrides the saved one)
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Append the conversation to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Theme to use (dark, light, monochrome, or a built-in theme id)
    #[arg(short = 't', long, global = true, value_name = "THEME")]
    pub theme: Option<String>,

    /// Disable syntax highlighting of code blocks
    #[arg(long, global = true)]
    pub no_syntax: bool,

    /// Write diagnostic logs to the specified file
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one prompt and print the formatted reply
    Say {
        /// Prompt text; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Format a message from a file or stdin without sending it
    Format {
        /// File to read (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Set configuration values (endpoint, theme, syntax)
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// List available themes
    Themes,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

impl Args {
    fn app_options(&self) -> AppOptions {
        AppOptions {
            endpoint: self.endpoint.clone(),
            log_file: self.log.clone(),
            theme: self.theme.clone(),
            no_syntax: self.no_syntax,
        }
    }

    fn log_target(&self, interactive: bool) -> LogTarget<'_> {
        match (&self.debug_log, interactive) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Discard,
            (None, false) => LogTarget::Stderr,
        }
    }

    fn output_style(&self, config: &Config) -> OutputStyle {
        let theme = self.theme.as_deref().or(config.theme.as_deref());
        OutputStyle::detect(theme, config.syntax_enabled() && !self.no_syntax)
    }
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    let command = args.command.take().unwrap_or(Commands::Chat);
    init_tracing(args.log_target(matches!(command, Commands::Chat)))?;

    match command {
        Commands::Chat => {
            let config = Config::load()?;
            run_chat(config, args.app_options()).await
        }
        Commands::Say { prompt } => {
            let config = Config::load()?;
            let endpoint = resolve_endpoint(args.endpoint.as_deref(), &config)?;
            run_say(prompt, endpoint, &args.output_style(&config)).await
        }
        Commands::Format { file } => {
            let config = Config::load()?;
            run_format(file.as_deref(), &args.output_style(&config))
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(key) = key else {
                config.print_all();
                return Ok(());
            };
            let key: ConfigKey = key.parse()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            if key == ConfigKey::Theme && !Theme::is_known(&value) {
                eprintln!("⚠️  Unknown theme '{value}'; the dark theme will be used until it exists");
            }
            config.set_value(key, &value)?;
            config.save()?;
            println!(
                "✅ Set {key} to: {value} ({})",
                path_display(Config::get_config_path()?)
            );
            Ok(())
        }
        Commands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            let mut config = Config::load()?;
            config.unset_value(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Themes => {
            let config = Config::load()?;
            list_themes(&config);
            Ok(())
        }
    }
}
