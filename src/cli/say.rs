//! TUI-less "say" command

use std::error::Error;
use std::io;

use tracing::info;

use crate::cli::format::OutputStyle;
use crate::core::completion::{CompletionBackend, HttpCompletionBackend};
use crate::core::config::Config;
use crate::utils::url::validate_endpoint;

/// Endpoint from the command line, else the saved one, else the default.
pub fn resolve_endpoint(flag: Option<&str>, config: &Config) -> Result<String, Box<dyn Error>> {
    match flag {
        Some(endpoint) => Ok(validate_endpoint(endpoint)?),
        None => Ok(config.endpoint_or_default().to_string()),
    }
}

pub async fn run_say(
    prompt: Vec<String>,
    endpoint: String,
    style: &OutputStyle,
) -> Result<(), Box<dyn Error>> {
    let backend = HttpCompletionBackend::new(&endpoint);
    run_say_with(prompt, &backend, style, &mut io::stdout().lock()).await
}

pub async fn run_say_with<W: io::Write>(
    prompt: Vec<String>,
    backend: &dyn CompletionBackend,
    style: &OutputStyle,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: ultron say <prompt>".into());
    }

    info!(chars = prompt.len(), "sending one-shot prompt");
    let reply = backend
        .complete(&prompt)
        .await
        .map_err(|err| err.to_chat_text())?;
    style.print(out, &reply)?;
    Ok(())
}
