//! `tracing` subscriber setup.
//!
//! The interactive UI owns the terminal, so diagnostics go to a file when one
//! is requested and are otherwise dropped. Non-interactive commands log to
//! stderr. Filtering follows `ULTRON_LOG` (EnvFilter syntax), default `info`.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "ULTRON_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Where diagnostic output should go.
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

pub fn init_tracing(target: LogTarget<'_>) -> Result<(), Box<dyn Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);

    let result = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::Discard => return Ok(()),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    if let Err(err) = result {
        tracing::debug!(%err, "tracing subscriber already set");
    }
    Ok(())
}
