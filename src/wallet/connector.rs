use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::WhitelistConfig;
use crate::error::Error;
use crate::evm::{ChainProvider, HttpChainProvider};
use crate::wallet::WhitelistWallet;

/// Source of provider handles for the page
///
/// `connect` may involve user interaction the first time it is called;
/// later calls return a handle for the same account.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Network name the connector was configured with
    fn network(&self) -> &str;

    /// Obtain a raw provider handle
    async fn connect(&self) -> Result<Arc<dyn ChainProvider>, Error>;
}

/// Connector backed by a locally held mnemonic
pub struct LocalKeyConnector {
    network: String,
    rpc_url: Url,
    mnemonic: Option<SecretString>,
    account_index: u32,
    poll_interval: Duration,
    confirmation_timeout: Duration,
    /// Derived once on first connect
    wallet: OnceCell<Arc<WhitelistWallet>>,
}

impl LocalKeyConnector {
    pub fn new(network: impl Into<String>, rpc_url: Url, mnemonic: Option<SecretString>) -> Self {
        Self {
            network: network.into(),
            rpc_url,
            mnemonic,
            account_index: 0,
            poll_interval: Duration::from_secs(4),
            confirmation_timeout: Duration::from_secs(300),
            wallet: OnceCell::new(),
        }
    }

    pub fn from_config(config: &WhitelistConfig) -> Self {
        let mut connector = Self::new(
            config.network_name.clone(),
            config.rpc_url.clone(),
            config.mnemonic.clone(),
        );
        connector.account_index = config.account_index;
        connector.poll_interval = config.poll_interval;
        connector.confirmation_timeout = config.confirmation_timeout;
        connector
    }

    async fn wallet(&self) -> Result<Arc<WhitelistWallet>, Error> {
        self.wallet
            .get_or_try_init(|| async {
                let mnemonic = self.mnemonic.as_ref().ok_or_else(|| {
                    Error::Wallet(
                        "No wallet available; set WHITELIST_WALLET_MNEMONIC or add [wallet] to the config file"
                            .to_string(),
                    )
                })?;
                let wallet =
                    WhitelistWallet::from_mnemonic(mnemonic.expose_secret(), self.account_index)?;
                tracing::info!(address = %wallet.address()?, network = %self.network, "wallet unlocked");
                Ok::<_, Error>(Arc::new(wallet))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl WalletConnector for LocalKeyConnector {
    fn network(&self) -> &str {
        &self.network
    }

    async fn connect(&self) -> Result<Arc<dyn ChainProvider>, Error> {
        let wallet = self.wallet().await?;
        let provider = HttpChainProvider::new(self.rpc_url.clone())
            .with_wallet(wallet)
            .with_confirmation_policy(self.poll_interval, self.confirmation_timeout);
        Ok(Arc::new(provider))
    }
}

/// Builds a fresh connector when the slot is (re)initialised
pub type ConnectorFactory =
    Box<dyn Fn() -> Result<Arc<dyn WalletConnector>, Error> + Send + Sync>;

/// Holder for the page's single wallet connector
///
/// The connector is created on first use and reused until [`reset`] is
/// called, after which the next use builds a new one.
///
/// [`reset`]: ConnectorSlot::reset
pub struct ConnectorSlot {
    factory: ConnectorFactory,
    current: Option<Arc<dyn WalletConnector>>,
    generation: u64,
}

impl ConnectorSlot {
    pub fn new(factory: ConnectorFactory) -> Self {
        Self {
            factory,
            current: None,
            generation: 0,
        }
    }

    /// Slot that always hands out the same connector instance
    pub fn fixed(connector: Arc<dyn WalletConnector>) -> Self {
        Self::new(Box::new(move || Ok(connector.clone())))
    }

    /// The current connector, creating it if the slot is empty
    pub fn get_or_init(&mut self) -> Result<Arc<dyn WalletConnector>, Error> {
        if let Some(connector) = &self.current {
            return Ok(connector.clone());
        }
        let connector = (self.factory)()?;
        self.generation += 1;
        tracing::debug!(generation = self.generation, network = connector.network(), "wallet connector created");
        self.current = Some(connector.clone());
        Ok(connector)
    }

    /// The current connector without creating one
    pub fn current(&self) -> Option<Arc<dyn WalletConnector>> {
        self.current.clone()
    }

    /// Drop the current connector
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Number of connectors created so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
