//! Chain client for the whitelist contract
//!
//! The client is split along the two seams the page controller depends on:
//!
//! - [`ChainProvider`]: the raw provider handle a wallet connector yields.
//!   It reports the network's chain id and executes read-only calls.
//! - [`TransactionSigner`]: the write-capable side, bound to the user's key.
//!   It submits transactions and waits for their confirmation.
//!
//! [`ChainHandle`] is what the controller passes to the contract proxy: either
//! a read-only view or a provider paired with its signer.
//!
//! # Example
//!
//! ```rust,no_run
//! use whitelist_dapp::evm::{ChainHandle, ChainProvider, HttpChainProvider};
//! use whitelist_dapp::evm::contracts::WhitelistContract;
//! use alloy_primitives::address;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), whitelist_dapp::Error> {
//! let url = "http://127.0.0.1:8545".parse().unwrap();
//! let provider: Arc<dyn ChainProvider> = Arc::new(HttpChainProvider::new(url));
//! let handle = ChainHandle::ReadOnly(provider);
//! let whitelist = WhitelistContract::new(
//!     address!("742d35Cc6634C0532925a3b844Bc454e4438f44e"),
//!     &handle,
//! );
//! println!("{} addresses whitelisted", whitelist.num_addresses_whitelisted().await?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod contracts;
pub mod tx;
pub mod types;

pub use client::{HttpChainProvider, LocalSigner};
pub use types::{EvmError, PendingTransaction, TransactionOutcome};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Error;

/// Read access to the connected network
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Chain id reported by the network (`eth_chainId`)
    async fn chain_id(&self) -> Result<u64, Error>;

    /// Execute a read-only contract call (`eth_call`) and return the raw result
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, Error>;

    /// The signer attached to this provider, if the wallet can sign
    fn signer(&self) -> Result<Arc<dyn TransactionSigner>, Error>;
}

/// Write access bound to the user's key
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address of the signing account
    fn address(&self) -> Address;

    /// Sign and submit a zero-value call to `to`
    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> Result<PendingTransaction, Error>;

    /// Suspend until `pending` is mined
    async fn wait_for_confirmation(
        &self,
        pending: &PendingTransaction,
    ) -> Result<TransactionOutcome, Error>;
}

/// A provider handle, optionally carrying the signer
#[derive(Clone)]
pub enum ChainHandle {
    ReadOnly(Arc<dyn ChainProvider>),
    Signer {
        provider: Arc<dyn ChainProvider>,
        signer: Arc<dyn TransactionSigner>,
    },
}

impl ChainHandle {
    /// The provider, available on both variants
    pub fn provider(&self) -> &Arc<dyn ChainProvider> {
        match self {
            ChainHandle::ReadOnly(provider) => provider,
            ChainHandle::Signer { provider, .. } => provider,
        }
    }

    /// The signer, or [`Error::SignerRequired`] for read-only handles
    pub fn signer(&self) -> Result<&Arc<dyn TransactionSigner>, Error> {
        match self {
            ChainHandle::ReadOnly(_) => Err(Error::SignerRequired),
            ChainHandle::Signer { signer, .. } => Ok(signer),
        }
    }
}

impl std::fmt::Debug for ChainHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainHandle::ReadOnly(_) => f.write_str("ChainHandle::ReadOnly"),
            ChainHandle::Signer { signer, .. } => f
                .debug_struct("ChainHandle::Signer")
                .field("address", &signer.address())
                .finish(),
        }
    }
}
