//! EVM-specific types shared by the chain client and the contract proxy

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A transaction accepted by the node but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Transaction hash
    pub hash: B256,
    /// Sender
    pub from: Address,
    /// Target contract
    pub to: Address,
}

impl PendingTransaction {
    pub fn new(hash: B256, from: Address, to: Address) -> Self {
        Self { hash, from, to }
    }
}

/// Result of waiting for a transaction to be mined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub hash: B256,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Receipt status; `false` means the transaction reverted
    pub success: bool,
}

impl TransactionOutcome {
    /// Turn a reverted receipt into an error
    pub fn into_result(self) -> Result<Self, Error> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::TransactionReverted(format!("{:?}", self.hash)))
        }
    }
}

/// EVM-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("ABI encoding/decoding error: {0}")]
    AbiError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimationError(String),
}

impl From<EvmError> for Error {
    fn from(err: EvmError) -> Self {
        match err {
            EvmError::RpcError(msg) => Error::Rpc(msg),
            other => Error::Evm(other.to_string()),
        }
    }
}
