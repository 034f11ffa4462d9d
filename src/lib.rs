pub mod config;
pub mod error;
pub mod evm;
pub mod page;
pub mod wallet;

// Terminal UI - optional via "tui" feature
#[cfg(feature = "tui")]
pub mod tui;

// Main exports
pub use config::{NetworkConstants, WhitelistConfig};
pub use error::{Error, ErrorKind};
pub use wallet::{ConnectorSlot, LocalKeyConnector, WalletConnector, WhitelistWallet};

// Chain client exports
pub use evm::contracts::{IWhitelist, WhitelistContract};
pub use evm::{
    ChainHandle, ChainProvider, HttpChainProvider, PendingTransaction, TransactionOutcome,
    TransactionSigner,
};

// Page exports
pub use page::{
    render_button, render_page, ActionButton, Alerter, ButtonAction, PageError, PageSettings,
    PageView, Phase, SessionState, StderrAlerter, WhitelistPage,
};

// Re-export TUI entry point when feature is enabled
#[cfg(feature = "tui")]
pub use tui::run_tui;
