use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::App;
use crate::core::completion::CompletionMessage;
use crate::core::message::ChatEntry;
use crate::ui::transcript::CopyTarget;

pub enum AppAction {
    SubmitMessage {
        message: String,
    },
    CompletionReceived {
        message: CompletionMessage,
        request_id: u64,
    },
    ClearHistory,
    CopyNextCodeBlock,
    SetStatus {
        message: String,
    },
    ClearStatus,
}

/// Parameters of a completion request the event loop should start.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub prompt: String,
    pub request_id: u64,
    pub cancel_token: CancellationToken,
}

/// Side effects an action asks the event loop to perform.
#[derive(Debug, Clone)]
pub enum AppCommand {
    SpawnRequest(RequestParams),
    CopyToClipboard(CopyTarget),
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SubmitMessage { message } => submit_message(app, message),
        AppAction::CompletionReceived {
            message,
            request_id,
        } => {
            handle_completion(app, message, request_id);
            None
        }
        AppAction::ClearHistory => {
            clear_history(app);
            None
        }
        AppAction::CopyNextCodeBlock => next_copy_target(app).map(AppCommand::CopyToClipboard),
        AppAction::SetStatus { message } => {
            app.ui.set_status(message);
            None
        }
        AppAction::ClearStatus => {
            app.ui.clear_status();
            None
        }
    }
}

fn submit_message(app: &mut App, message: String) -> Option<AppCommand> {
    if message.trim().is_empty() {
        return None;
    }
    if app.ui.waiting {
        app.ui.set_status("Still waiting for the previous reply");
        return None;
    }

    if let Err(err) = app.session.logging.log_entry(&ChatEntry::user(message.as_str())) {
        warn!(%err, "failed to write transcript log");
    }

    app.ui.history.push_exchange(message.as_str());
    app.ui.waiting = true;
    app.ui.pulse_start = Instant::now();
    app.ui.clear_status();
    app.ui.copy_cursor = None;
    app.ui.scroll.to_bottom();

    let (request_id, cancel_token) = app.session.begin_request();
    debug!(request_id, "submitting prompt");
    Some(AppCommand::SpawnRequest(RequestParams {
        prompt: message,
        request_id,
        cancel_token,
    }))
}

fn handle_completion(app: &mut App, message: CompletionMessage, request_id: u64) {
    if !app.session.accepts(request_id) {
        debug!(request_id, "dropping stale completion");
        return;
    }
    app.session.finish_request();
    app.ui.waiting = false;

    let text = match message {
        CompletionMessage::Reply(text) => text,
        CompletionMessage::Error(text) => {
            app.ui.set_status("Request failed");
            text
        }
    };

    if let Err(err) = app.session.logging.log_entry(&ChatEntry::bot(text.as_str())) {
        warn!(%err, "failed to write transcript log");
    }
    if !app.ui.history.replace_last_reply(text.as_str()) {
        app.ui.history.push(ChatEntry::bot(text));
    }
    app.ui.scroll.to_bottom();
}

fn clear_history(app: &mut App) {
    if app.session.cancel_request() {
        debug!("cancelled in-flight request on clear");
    }
    app.ui.history.clear();
    app.ui.waiting = false;
    app.ui.copy_cursor = None;
    app.ui.scroll.reset();
    app.ui.set_status("History cleared");
}

/// Walk code blocks from the newest backwards, wrapping around.
fn next_copy_target(app: &mut App) -> Option<CopyTarget> {
    let cursor = app.ui.copy_cursor;
    let blocks = &app.ui.transcript().code_blocks;
    let count = blocks.len();
    let index = match cursor {
        _ if count == 0 => None,
        Some(current) if current > 0 && current < count => Some(current - 1),
        _ => Some(count - 1),
    };
    let target = index.and_then(|i| blocks.get(i).cloned());
    match target {
        Some(target) => {
            app.ui.copy_cursor = index;
            Some(target)
        }
        None => {
            app.ui.set_status("No code blocks to copy");
            None
        }
    }
}
