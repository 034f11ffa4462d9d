//! Terminal front end for the whitelist page
//!
//! The controller runs on its own task and publishes every state transition
//! through its watch channel, so the UI keeps redrawing (and shows the
//! loading affordance) while a join transaction is pending.

pub mod app;
pub mod ui;

pub use app::{App, KeyOutcome, PageCommand};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::WhitelistConfig;
use crate::error::Error;
use crate::page::{Alerter, WhitelistPage};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Forwards alerts to the UI, which shows them as a modal popup
pub struct ChannelAlerter {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelAlerter {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl Alerter for ChannelAlerter {
    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "user alert raised");
        let _ = self.tx.send(message.to_string());
    }
}

type Backend = CrosstermBackend<Stdout>;

fn setup_terminal() -> Result<Terminal<Backend>, Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<(), Error> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Drive the page from commands until cancelled
async fn run_controller(
    mut page: WhitelistPage,
    mut commands: mpsc::Receiver<PageCommand>,
    cancel: CancellationToken,
) {
    if let Err(e) = page.mount().await {
        tracing::debug!(error = %e, "initial mount failed");
    }

    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        tracing::debug!(?command, "page command");
        let result = match command {
            PageCommand::Press => page.press_action().await,
            PageCommand::Refresh => page.refresh().await,
            PageCommand::Reconnect => page.reconnect().await,
            PageCommand::ClearError => {
                page.clear_error();
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::debug!(?command, error = %e, "page command failed");
        }
    }
}

/// Read terminal key events on a blocking thread
fn spawn_input_reader(
    tx: mpsc::UnboundedSender<crossterm::event::KeyEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    })
}

/// Run the terminal UI until the user quits
pub async fn run_tui(config: WhitelistConfig) -> Result<(), Error> {
    let (alert_tx, mut alert_rx) = mpsc::unbounded_channel();
    let page = WhitelistPage::from_config(&config, Arc::new(ChannelAlerter::new(alert_tx)));
    let mut state_rx = page.subscribe();

    let cancel = CancellationToken::new();
    let (command_tx, command_rx) = mpsc::channel(16);
    let controller = tokio::spawn(run_controller(page, command_rx, cancel.clone()));

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let input = spawn_input_reader(key_tx, cancel.clone());

    let mut terminal = setup_terminal()?;
    let mut app = App::new(config.network_label.clone(), config.contract_address.to_string());

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &app)) {
            break Err(Error::from(e));
        }

        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                app.state = state_rx.borrow_and_update().clone();
            }
            Some(message) = alert_rx.recv() => {
                app.show_alert(message);
            }
            key = key_rx.recv() => {
                let Some(key) = key else {
                    break Ok(());
                };
                match app.handle_key(key) {
                    KeyOutcome::Quit => break Ok(()),
                    KeyOutcome::Command(command) => {
                        if command_tx.try_send(command).is_err() {
                            tracing::debug!(?command, "controller busy, command dropped");
                        }
                    }
                    KeyOutcome::DismissAlert | KeyOutcome::Ignored => {}
                }
            }
        }
    };

    cancel.cancel();
    restore_terminal(&mut terminal)?;
    let _ = input.await;
    controller.abort();
    tracing::info!("terminal UI closed");
    result
}
