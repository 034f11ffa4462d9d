use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::page::{render_page, PageView, SessionState};

/// Requests the UI sends to the controller task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Press,
    Refresh,
    Reconnect,
    ClearError,
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Command(PageCommand),
    DismissAlert,
    Quit,
}

/// UI-side state: the latest session snapshot plus anything only the
/// terminal cares about
#[derive(Debug, Clone)]
pub struct App {
    pub state: SessionState,
    pub alert: Option<String>,
    pub network_label: String,
    pub contract: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(network_label: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            state: SessionState::default(),
            alert: None,
            network_label: network_label.into(),
            contract: contract.into(),
            should_quit: false,
        }
    }

    pub fn view(&self) -> PageView {
        render_page(&self.state)
    }

    pub fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return KeyOutcome::Quit;
        }

        // An open alert swallows the next key
        if self.alert.is_some() {
            self.alert = None;
            return KeyOutcome::DismissAlert;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                KeyOutcome::Quit
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.view().button.is_enabled() {
                    KeyOutcome::Command(PageCommand::Press)
                } else {
                    KeyOutcome::Ignored
                }
            }
            KeyCode::Char('r') => KeyOutcome::Command(PageCommand::Refresh),
            KeyCode::Char('c') => KeyOutcome::Command(PageCommand::Reconnect),
            KeyCode::Char('x') if self.state.last_error.is_some() => {
                KeyOutcome::Command(PageCommand::ClearError)
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_only_when_button_enabled() {
        let mut app = App::new("Ropsten", "0x0");
        assert_eq!(
            app.handle_key(press(KeyCode::Enter)),
            KeyOutcome::Command(PageCommand::Press)
        );

        app.state = SessionState::default()
            .connected()
            .submitted(alloy_primitives::B256::ZERO);
        assert_eq!(app.handle_key(press(KeyCode::Enter)), KeyOutcome::Ignored);
    }

    #[test]
    fn test_alert_swallows_key() {
        let mut app = App::new("Ropsten", "0x0");
        app.show_alert("Change the network to Ropsten".to_string());
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), KeyOutcome::DismissAlert);
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), KeyOutcome::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_shortcuts() {
        let mut app = App::new("Ropsten", "0x0");
        assert_eq!(
            app.handle_key(press(KeyCode::Char('c'))),
            KeyOutcome::Command(PageCommand::Reconnect)
        );
        assert_eq!(
            app.handle_key(press(KeyCode::Char('r'))),
            KeyOutcome::Command(PageCommand::Refresh)
        );
        assert_eq!(app.handle_key(press(KeyCode::Char('x'))), KeyOutcome::Ignored);
    }
}
