//! Main chat event loop
//!
//! Terminal events are read on a background task and forwarded over a
//! channel; the loop redraws, then waits for the next terminal event, a
//! completion result, or the animation tick.

mod keybindings;
mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, MouseEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tui_textarea::Input as TAInput;

use self::keybindings::{classify_key, KeyAction, SCROLL_STEP};
use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::app::{apply_action, App, AppAction, AppCommand, AppOptions};
use crate::core::completion::{
    CompletionBackend, CompletionMessage, CompletionService, HttpCompletionBackend,
};
use crate::core::config::Config;
use crate::ui::renderer::ui;
use crate::utils::clipboard::{copy_to_clipboard, CopyMethod};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Break,
}

pub async fn run_chat(config: Config, options: AppOptions) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(&config, Some(options))?;
    info!(endpoint = %app.session.endpoint, "starting chat");

    let backend: Arc<dyn CompletionBackend> =
        Arc::new(HttpCompletionBackend::new(&app.session.endpoint));
    let (service, mut completion_rx) = CompletionService::new(backend);

    // Setup terminal only after successful app creation
    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let reader = spawn_event_reader(event_tx);

    let result = event_loop(
        &mut app,
        &mut terminal,
        &service,
        &mut event_rx,
        &mut completion_rx,
    )
    .await;

    reader.abort();
    app.session.cancel_request();
    restore_terminal(&mut terminal)?;
    result
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // Use a short timeout to prevent blocking
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(err) => debug!(%err, "failed to read terminal event"),
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

async fn event_loop(
    app: &mut App,
    terminal: &mut ChatTerminal,
    service: &CompletionService,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    completion_rx: &mut mpsc::UnboundedReceiver<(CompletionMessage, u64)>,
) -> Result<(), Box<dyn Error>> {
    let mut tick = tokio::time::interval(TICK);
    loop {
        terminal.draw(|f| ui(f, &mut *app))?;

        tokio::select! {
            Some(ev) = event_rx.recv() => {
                if handle_event(app, ev, service) == LoopControl::Break {
                    return Ok(());
                }
            }
            Some((message, request_id)) = completion_rx.recv() => {
                apply_action(app, AppAction::CompletionReceived { message, request_id });
            }
            _ = tick.tick() => on_tick(app, Instant::now()),
        }
    }
}

/// Expire a status message once it has been shown long enough.
fn on_tick(app: &mut App, now: Instant) {
    if app.ui.status_expired(now) {
        apply_action(app, AppAction::ClearStatus);
    }
}

fn handle_event(app: &mut App, ev: Event, service: &CompletionService) -> LoopControl {
    match ev {
        Event::Key(key) => match classify_key(&key) {
            KeyAction::Quit => return LoopControl::Break,
            KeyAction::Send => {
                let action = app.take_input();
                dispatch(app, action, service);
            }
            KeyAction::InsertNewline => app.ui.textarea_mut().insert_newline(),
            KeyAction::ClearHistory => dispatch(app, AppAction::ClearHistory, service),
            KeyAction::CopyCodeBlock => dispatch(app, AppAction::CopyNextCodeBlock, service),
            KeyAction::ScrollUp(lines) => app.ui.scroll_up(lines),
            KeyAction::ScrollDown(lines) => app.ui.scroll_down(lines),
            KeyAction::PageUp => {
                let page = app.ui.page_size();
                app.ui.scroll_up(page);
            }
            KeyAction::PageDown => {
                let page = app.ui.page_size();
                app.ui.scroll_down(page);
            }
            KeyAction::Edit => {
                app.ui.textarea_mut().input(TAInput::from(key));
            }
            KeyAction::Ignore => {}
        },
        Event::Paste(text) => {
            app.ui.textarea_mut().insert_str(text);
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.ui.scroll_up(SCROLL_STEP),
            MouseEventKind::ScrollDown => app.ui.scroll_down(SCROLL_STEP),
            _ => {}
        },
        _ => {}
    }
    LoopControl::Continue
}

fn dispatch(app: &mut App, action: AppAction, service: &CompletionService) {
    if let Some(command) = apply_action(app, action) {
        execute_command(app, command, service);
    }
}

fn execute_command(app: &mut App, command: AppCommand, service: &CompletionService) {
    match command {
        AppCommand::SpawnRequest(params) => {
            service.spawn_request(params.prompt, params.request_id, params.cancel_token);
        }
        AppCommand::CopyToClipboard(target) => {
            let number = app.ui.copy_cursor.map_or(0, |index| index + 1);
            let message = match copy_to_clipboard(&target.content) {
                Ok(CopyMethod::Command(cmd)) => {
                    debug!(cmd, "copied code block");
                    format!("Copied code block #{number}")
                }
                Ok(CopyMethod::Osc52) => format!("Copied code block #{number} (terminal clipboard)"),
                Err(err) => {
                    warn!(%err, "copy failed");
                    format!("Copy failed: {err}")
                }
            };
            apply_action(app, AppAction::SetStatus { message });
        }
    }
}
