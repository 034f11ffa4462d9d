use thiserror::Error;

/// Errors produced by the whitelist client
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("EVM error: {0}")]
    Evm(String),

    /// The connected network is not the one the contract is deployed on
    #[error("Wrong network: expected chain id {expected}, connected to {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("A signer is required for this operation")]
    SignerRequired,

    #[error("Transaction {0} reverted")]
    TransactionReverted(String),

    #[error("Transaction {hash} was not confirmed within {timeout_secs}s")]
    ConfirmationTimeout { hash: String, timeout_secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short machine-friendly name of the failure class
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Wallet(_) | Error::SignerRequired => ErrorKind::Wallet,
            Error::Rpc(_) | Error::Evm(_) | Error::Io(_) | Error::Other(_) => ErrorKind::Rpc,
            Error::WrongNetwork { .. } => ErrorKind::WrongNetwork,
            Error::TransactionReverted(_) | Error::ConfirmationTimeout { .. } => {
                ErrorKind::Transaction
            }
        }
    }
}

/// Coarse classification of an [`Error`], carried into the rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Wallet,
    Rpc,
    WrongNetwork,
    Transaction,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Wallet => "wallet",
            ErrorKind::Rpc => "rpc",
            ErrorKind::WrongNetwork => "wrong-network",
            ErrorKind::Transaction => "transaction",
        };
        f.write_str(name)
    }
}
