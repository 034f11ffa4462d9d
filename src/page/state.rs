use alloy_primitives::{Address, B256};

use crate::error::{Error, ErrorKind};

/// A failure surfaced to the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for PageError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connected,
    Joining,
    Joined,
}

/// Snapshot of the page's session state
///
/// Snapshots are never mutated in place; each transition returns the next
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub wallet_connected: bool,
    pub joined_whitelist: bool,
    /// True only while a submitted join transaction is unconfirmed
    pub loading: bool,
    pub number_of_whitelisted: u8,
    pub max_whitelisted: Option<u8>,
    /// Connected account, known after the first membership check
    pub account: Option<Address>,
    /// Hash of the join transaction being waited on
    pub pending_tx: Option<B256>,
    pub last_error: Option<PageError>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match (self.wallet_connected, self.joined_whitelist, self.loading) {
            (false, _, _) => Phase::Disconnected,
            (true, true, _) => Phase::Joined,
            (true, false, true) => Phase::Joining,
            (true, false, false) => Phase::Connected,
        }
    }

    /// A provider handle was obtained
    pub fn connected(&self) -> Self {
        Self {
            wallet_connected: true,
            last_error: None,
            ..self.clone()
        }
    }

    /// Membership of `account` was read
    pub fn membership(&self, account: Address, joined: bool) -> Self {
        Self {
            account: Some(account),
            joined_whitelist: joined,
            ..self.clone()
        }
    }

    /// The whitelist count (and, when read, its capacity) was refreshed
    pub fn count(&self, number_of_whitelisted: u8, max_whitelisted: Option<u8>) -> Self {
        Self {
            number_of_whitelisted,
            max_whitelisted: max_whitelisted.or(self.max_whitelisted),
            ..self.clone()
        }
    }

    /// The join transaction was accepted by the node
    pub fn submitted(&self, tx: B256) -> Self {
        Self {
            loading: true,
            pending_tx: Some(tx),
            last_error: None,
            ..self.clone()
        }
    }

    /// The join transaction was mined successfully
    pub fn confirmed(&self) -> Self {
        Self {
            loading: false,
            pending_tx: None,
            ..self.clone()
        }
    }

    /// The connected account is now a member
    pub fn joined(&self) -> Self {
        Self {
            joined_whitelist: true,
            ..self.clone()
        }
    }

    /// An operation failed; any pending join is abandoned
    pub fn failed(&self, err: &Error) -> Self {
        Self {
            loading: false,
            pending_tx: None,
            last_error: Some(PageError::from(err)),
            ..self.clone()
        }
    }

    pub fn cleared_error(&self) -> Self {
        Self {
            last_error: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_phases() {
        let start = SessionState::default();
        assert_eq!(start.phase(), Phase::Disconnected);

        let connected = start.connected();
        assert_eq!(connected.phase(), Phase::Connected);

        let joining = connected.submitted(B256::repeat_byte(1));
        assert_eq!(joining.phase(), Phase::Joining);
        assert_eq!(joining.pending_tx, Some(B256::repeat_byte(1)));

        let joined = joining.confirmed().count(4, Some(10)).joined();
        assert_eq!(joined.phase(), Phase::Joined);
        assert!(!joined.loading);
        assert!(joined.pending_tx.is_none());
        assert_eq!(joined.number_of_whitelisted, 4);

        // earlier snapshots are untouched
        assert!(joining.loading);
        assert!(!connected.loading);
    }

    #[test]
    fn test_failure_clears_loading() {
        let joining = SessionState::default()
            .connected()
            .submitted(B256::repeat_byte(2));
        let failed = joining.failed(&Error::TransactionReverted("0x02".to_string()));

        assert_eq!(failed.phase(), Phase::Connected);
        assert!(!failed.loading);
        assert!(failed.pending_tx.is_none());
        let error = failed.last_error.clone().unwrap();
        assert_eq!(error.kind, ErrorKind::Transaction);

        assert!(failed.cleared_error().last_error.is_none());
    }

    #[test]
    fn test_count_keeps_known_capacity() {
        let state = SessionState::default().count(1, Some(10)).count(2, None);
        assert_eq!(state.number_of_whitelisted, 2);
        assert_eq!(state.max_whitelisted, Some(10));
    }
}
