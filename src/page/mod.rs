//! The whitelist page controller
//!
//! [`WhitelistPage`] owns the session state, the connector slot and the
//! alert sink. Every chain interaction goes through
//! [`WhitelistPage::get_provider_or_signer`], which checks the network before
//! handing out a handle. Each operation returns a typed result and also
//! records failures in the published state so the view can show them.

pub mod alert;
pub mod state;
pub mod view;

pub use alert::{Alerter, StderrAlerter};
pub use state::{PageError, Phase, SessionState};
pub use view::{render_button, render_page, ActionButton, ButtonAction, PageView};

use alloy_primitives::Address;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::WhitelistConfig;
use crate::error::Error;
use crate::evm::contracts::WhitelistContract;
use crate::evm::{ChainHandle, TransactionOutcome};
use crate::wallet::{ConnectorSlot, LocalKeyConnector, WalletConnector};

/// Static settings the controller needs
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub contract_address: Address,
    /// The single accepted chain id
    pub expected_chain_id: u64,
    /// Network name shown in the wrong-network alert
    pub network_label: String,
}

impl From<&WhitelistConfig> for PageSettings {
    fn from(config: &WhitelistConfig) -> Self {
        Self {
            contract_address: config.contract_address,
            expected_chain_id: config.chain_id,
            network_label: config.network_label.clone(),
        }
    }
}

/// Controller for the whitelist page
pub struct WhitelistPage {
    slot: ConnectorSlot,
    alerter: Arc<dyn Alerter>,
    settings: PageSettings,
    state: watch::Sender<SessionState>,
}

impl WhitelistPage {
    pub fn new(slot: ConnectorSlot, alerter: Arc<dyn Alerter>, settings: PageSettings) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            slot,
            alerter,
            settings,
            state,
        }
    }

    /// Page wired to a [`LocalKeyConnector`] built from `config`
    pub fn from_config(config: &WhitelistConfig, alerter: Arc<dyn Alerter>) -> Self {
        let connector_config = config.clone();
        let slot = ConnectorSlot::new(Box::new(move || {
            Ok(Arc::new(LocalKeyConnector::from_config(&connector_config))
                as Arc<dyn WalletConnector>)
        }));
        Self::new(slot, alerter, PageSettings::from(config))
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current rendering of the page
    pub fn view(&self) -> PageView {
        render_page(&self.state.borrow())
    }

    fn transition<F>(&self, next: F)
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        let next = {
            let current = self.state.borrow();
            next(&current)
        };
        self.state.send_replace(next);
    }

    /// Log and record a failure, handing the error back to the caller
    fn fail(&self, operation: &'static str, err: Error) -> Error {
        tracing::warn!(operation, kind = %err.kind(), error = %err, "page operation failed");
        self.transition(|s| s.failed(&err));
        err
    }

    /// First-render effect: connect if not already connected
    pub async fn mount(&mut self) -> Result<(), Error> {
        if self.state.borrow().wallet_connected {
            return Ok(());
        }
        self.slot
            .get_or_init()
            .map_err(|e| self.fail("mount", e))?;
        self.connect_wallet().await
    }

    /// Drop the connector and session state, then mount again
    pub async fn reconnect(&mut self) -> Result<(), Error> {
        self.slot.reset();
        self.state.send_replace(SessionState::default());
        self.mount().await
    }

    /// Obtain a handle, rejecting any network other than the accepted one
    ///
    /// The check runs on every call; nothing is cached between calls.
    pub async fn get_provider_or_signer(&mut self, need_signer: bool) -> Result<ChainHandle, Error> {
        let connector = self.slot.get_or_init()?;
        let provider = connector.connect().await?;

        let actual = provider.chain_id().await?;
        if actual != self.settings.expected_chain_id {
            let message = format!("Change the network to {}", self.settings.network_label);
            self.alerter.alert(&message);
            return Err(Error::WrongNetwork {
                expected: self.settings.expected_chain_id,
                actual,
            });
        }

        if need_signer {
            let signer = provider.signer()?;
            Ok(ChainHandle::Signer { provider, signer })
        } else {
            Ok(ChainHandle::ReadOnly(provider))
        }
    }

    /// Connect the wallet, then read membership and the whitelist count once each
    ///
    /// Failures of the two follow-up reads are recorded in the state but do
    /// not fail the connection.
    pub async fn connect_wallet(&mut self) -> Result<(), Error> {
        if let Err(e) = self.get_provider_or_signer(false).await {
            return Err(self.fail("connect_wallet", e));
        }
        self.transition(SessionState::connected);
        tracing::info!(network = %self.settings.network_label, "wallet connected");

        let _ = self.check_if_address_in_whitelist().await;
        let _ = self.get_number_of_whitelisted().await;
        Ok(())
    }

    /// Read the whitelist count (and capacity) through a read-only handle
    pub async fn get_number_of_whitelisted(&mut self) -> Result<u8, Error> {
        let handle = match self.get_provider_or_signer(false).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail("get_number_of_whitelisted", e)),
        };
        let contract = WhitelistContract::new(self.settings.contract_address, &handle);

        let count = match contract.num_addresses_whitelisted().await {
            Ok(count) => count,
            Err(e) => return Err(self.fail("get_number_of_whitelisted", e)),
        };
        let max = match contract.max_whitelisted_addresses().await {
            Ok(max) => Some(max),
            Err(e) => {
                tracing::debug!(error = %e, "capacity unavailable");
                None
            }
        };

        tracing::debug!(count, ?max, "whitelist count read");
        self.transition(|s| s.count(count, max));
        Ok(count)
    }

    /// Read whether the connected account is whitelisted
    ///
    /// Uses the signer handle: the signer is where the connected address
    /// comes from, and the read goes through the same handle.
    pub async fn check_if_address_in_whitelist(&mut self) -> Result<bool, Error> {
        let handle = match self.get_provider_or_signer(true).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail("check_if_address_in_whitelist", e)),
        };
        let account = match handle.signer() {
            Ok(signer) => signer.address(),
            Err(e) => return Err(self.fail("check_if_address_in_whitelist", e)),
        };

        let contract = WhitelistContract::new(self.settings.contract_address, &handle);
        match contract.whitelisted_addresses(account).await {
            Ok(joined) => {
                tracing::debug!(%account, joined, "membership read");
                self.transition(|s| s.membership(account, joined));
                Ok(joined)
            }
            Err(e) => Err(self.fail("check_if_address_in_whitelist", e)),
        }
    }

    /// Submit the join transaction and wait for it to be mined
    ///
    /// `loading` is set once the node accepts the transaction and cleared on
    /// confirmation or failure. After confirmation the count is refreshed and
    /// the account is marked as joined.
    pub async fn add_address_to_whitelist(&mut self) -> Result<TransactionOutcome, Error> {
        let handle = match self.get_provider_or_signer(true).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail("add_address_to_whitelist", e)),
        };
        let contract = WhitelistContract::new(self.settings.contract_address, &handle);

        let pending = match contract.add_address_to_whitelist().await {
            Ok(pending) => pending,
            Err(e) => return Err(self.fail("add_address_to_whitelist", e)),
        };
        self.transition(|s| s.submitted(pending.hash));

        let confirmed = match handle.signer() {
            Ok(signer) => signer
                .wait_for_confirmation(&pending)
                .await
                .and_then(TransactionOutcome::into_result),
            Err(e) => Err(e),
        };
        let outcome = match confirmed {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail("add_address_to_whitelist", e)),
        };

        self.transition(SessionState::confirmed);
        tracing::info!(tx = ?outcome.hash, block = ?outcome.block_number, "joined the whitelist");

        let _ = self.get_number_of_whitelisted().await;
        self.transition(|s| s.membership(pending.from, true).joined());
        Ok(outcome)
    }

    /// Perform whatever the current button does
    pub async fn press_action(&mut self) -> Result<(), Error> {
        let button = render_button(&self.state.borrow());
        match button.action() {
            Some(ButtonAction::Connect) => self.connect_wallet().await,
            Some(ButtonAction::Join) => self.add_address_to_whitelist().await.map(|_| ()),
            None => Ok(()),
        }
    }

    /// Re-read membership and count for a connected session
    pub async fn refresh(&mut self) -> Result<(), Error> {
        if !self.state.borrow().wallet_connected {
            return Ok(());
        }
        self.check_if_address_in_whitelist().await?;
        self.get_number_of_whitelisted().await?;
        Ok(())
    }

    pub fn clear_error(&self) {
        self.transition(SessionState::cleared_error);
    }

    /// Whether the connector slot currently holds a connector
    pub fn has_connector(&self) -> bool {
        self.slot.is_initialized()
    }
}
