//! Pure view derivation for the whitelist page
//!
//! Nothing here performs I/O: the same [`SessionState`] always renders the
//! same [`PageView`].

use crate::page::state::SessionState;

pub const TITLE: &str = "Welcome to Crypto Devs!";
pub const DESCRIPTION: &str = "This is an NFT collection for my fellow Crypto developers.";
pub const FOOTER: &str = "Made with \u{2764} by Crypto Devs";

const JOIN_LABEL: &str = "Join the Whitelist";
const LOADING_LABEL: &str = "Loading...Please Wait";
const THANK_YOU: &str = "Thanks for joining the exclusive Whitelist!";

/// What pressing the action button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Connect,
    Join,
}

/// The page's single context-sensitive affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    /// Wallet not connected; pressing connects
    ConnectPrompt,
    /// Connected but not a member; pressing joins
    Join,
    /// Join transaction pending; disabled
    Loading,
    /// Static message, not a control
    ThankYou,
}

impl ActionButton {
    pub fn label(&self) -> &'static str {
        match self {
            ActionButton::ConnectPrompt | ActionButton::Join => JOIN_LABEL,
            ActionButton::Loading => LOADING_LABEL,
            ActionButton::ThankYou => THANK_YOU,
        }
    }

    pub fn action(&self) -> Option<ButtonAction> {
        match self {
            ActionButton::ConnectPrompt => Some(ButtonAction::Connect),
            ActionButton::Join => Some(ButtonAction::Join),
            ActionButton::Loading | ActionButton::ThankYou => None,
        }
    }

    /// Whether this renders as a control at all
    pub fn is_button(&self) -> bool {
        !matches!(self, ActionButton::ThankYou)
    }

    pub fn is_enabled(&self) -> bool {
        self.action().is_some()
    }
}

/// Map `(wallet_connected, joined_whitelist, loading)` to the affordance
pub fn render_button(state: &SessionState) -> ActionButton {
    if !state.wallet_connected {
        return ActionButton::ConnectPrompt;
    }
    if state.joined_whitelist {
        ActionButton::ThankYou
    } else if state.loading {
        ActionButton::Loading
    } else {
        ActionButton::Join
    }
}

/// Everything the page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub title: &'static str,
    pub description: &'static str,
    pub count_line: String,
    pub button: ActionButton,
    pub account_line: Option<String>,
    pub error_line: Option<String>,
    pub footer: &'static str,
}

pub fn render_page(state: &SessionState) -> PageView {
    let count_line = match state.max_whitelisted {
        Some(max) => format!(
            "{} have already joined the Whitelist! ({} spots in total)",
            state.number_of_whitelisted, max
        ),
        None => format!(
            "{} have already joined the Whitelist!",
            state.number_of_whitelisted
        ),
    };

    PageView {
        title: TITLE,
        description: DESCRIPTION,
        count_line,
        button: render_button(state),
        account_line: state.account.map(|a| format!("Connected as {}", a)),
        error_line: state
            .last_error
            .as_ref()
            .map(|e| format!("[{}] {}", e.kind, e.message)),
        footer: FOOTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn state(wallet_connected: bool, joined_whitelist: bool, loading: bool) -> SessionState {
        SessionState {
            wallet_connected,
            joined_whitelist,
            loading,
            ..Default::default()
        }
    }

    #[test]
    fn test_button_truth_table() {
        for joined in [false, true] {
            for loading in [false, true] {
                assert_eq!(
                    render_button(&state(false, joined, loading)),
                    ActionButton::ConnectPrompt
                );
                assert_eq!(
                    render_button(&state(true, true, loading)),
                    ActionButton::ThankYou
                );
            }
        }
        assert_eq!(render_button(&state(true, false, true)), ActionButton::Loading);
        assert_eq!(render_button(&state(true, false, false)), ActionButton::Join);
    }

    #[test]
    fn test_button_ignores_other_fields() {
        let mut busy = state(true, false, false);
        busy.number_of_whitelisted = 9;
        busy.last_error = Some((&Error::Rpc("down".to_string())).into());
        assert_eq!(render_button(&busy), render_button(&state(true, false, false)));
    }

    #[test]
    fn test_labels_and_actions() {
        assert_eq!(ActionButton::ConnectPrompt.label(), "Join the Whitelist");
        assert_eq!(ActionButton::Join.label(), "Join the Whitelist");
        assert_eq!(ActionButton::Loading.label(), "Loading...Please Wait");
        assert!(!ActionButton::Loading.is_enabled());
        assert!(ActionButton::Loading.is_button());
        assert!(!ActionButton::ThankYou.is_button());
        assert_eq!(ActionButton::ThankYou.action(), None);
        assert_eq!(ActionButton::Join.action(), Some(ButtonAction::Join));
    }

    #[test]
    fn test_render_page_lines() {
        let mut s = state(true, false, false);
        s.number_of_whitelisted = 3;
        let view = render_page(&s);
        assert_eq!(view.title, TITLE);
        assert_eq!(view.count_line, "3 have already joined the Whitelist!");
        assert!(view.error_line.is_none());

        s.max_whitelisted = Some(10);
        s.last_error = Some((&Error::Wallet("rejected".to_string())).into());
        let view = render_page(&s);
        assert!(view.count_line.contains("10 spots"));
        assert_eq!(view.error_line.as_deref(), Some("[wallet] Wallet error: rejected"));
    }
}
