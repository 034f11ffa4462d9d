//! Configuration for the whitelist client
//!
//! Values are layered: built-in network constants, then configuration files,
//! then `WHITELIST_*` environment variables. The result is resolved and
//! validated into a [`WhitelistConfig`].

pub mod env;

pub use env::{
    ContractEnvConfig, EnvironmentConfig, LoggingEnvConfig, NetworkEnvConfig, TxEnvConfig,
    WalletEnvConfig,
};

use alloy_primitives::Address;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::Error;

/// Default log filter when none is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Built-in constants for a known network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// Network name
    pub network_name: String,
    /// Human readable label used in user-facing messages
    pub display_name: String,
    /// Chain ID the contract is deployed on
    pub chain_id: u64,
    /// Default RPC endpoint
    pub default_rpc: String,
}

impl NetworkConstants {
    /// Look up the constants for a known network
    pub fn load(network: &str) -> Result<Self, Error> {
        match network {
            "ropsten" => Ok(Self::ropsten()),
            _ => Err(Error::Config(format!(
                "Network configuration for '{}' not found",
                network
            ))),
        }
    }

    /// The Ropsten test network, where the whitelist contract lives
    pub fn ropsten() -> Self {
        Self {
            network_name: "ropsten".to_string(),
            display_name: "Ropsten".to_string(),
            chain_id: 3,
            default_rpc: "http://127.0.0.1:8545".to_string(),
        }
    }
}

/// Fully resolved client configuration
#[derive(Debug, Clone)]
pub struct WhitelistConfig {
    /// Network name handed to the wallet connector
    pub network_name: String,
    /// Label used in the wrong-network alert
    pub network_label: String,
    /// The single accepted chain id
    pub chain_id: u64,
    /// JSON-RPC endpoint
    pub rpc_url: Url,
    /// Whitelist contract address
    pub contract_address: Address,
    /// Mnemonic for the local key connector
    pub mnemonic: Option<SecretString>,
    /// Account index in the derivation path
    pub account_index: u32,
    /// Interval between receipt polls
    pub poll_interval: Duration,
    /// Upper bound on the confirmation wait
    pub confirmation_timeout: Duration,
    /// Log filter directive
    pub log_level: String,
    /// Optional log file (TUI)
    pub log_file: Option<PathBuf>,
}

impl WhitelistConfig {
    /// Load from files and the environment, then resolve
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let env_config = EnvironmentConfig::load_from(path)?;
        Self::from_env_config(&env_config)
    }

    /// Resolve loaded values against the network constants and validate them
    pub fn from_env_config(env_config: &EnvironmentConfig) -> Result<Self, Error> {
        let network_name = env_config
            .network
            .name
            .clone()
            .unwrap_or_else(|| "ropsten".to_string());

        // Unknown networks are allowed as long as chain id and RPC are configured
        let constants = NetworkConstants::load(&network_name).ok();

        let chain_id = env_config
            .network
            .chain_id
            .or_else(|| constants.as_ref().map(|c| c.chain_id))
            .ok_or_else(|| {
                Error::Config(format!("No chain id configured for network '{}'", network_name))
            })?;
        if chain_id == 0 {
            return Err(Error::Config("Chain id must be non-zero".to_string()));
        }

        let rpc = env_config
            .network
            .rpc_url
            .clone()
            .or_else(|| constants.as_ref().map(|c| c.default_rpc.clone()))
            .ok_or_else(|| {
                Error::Config(format!("No RPC URL configured for network '{}'", network_name))
            })?;
        let rpc_url =
            Url::parse(&rpc).map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;

        let raw_address = env_config.contract.address.as_deref().ok_or_else(|| {
            Error::Config(
                "Whitelist contract address is not configured (WHITELIST_CONTRACT_ADDRESS)"
                    .to_string(),
            )
        })?;
        let contract_address = Address::from_str(raw_address.trim())
            .map_err(|e| Error::Config(format!("Invalid contract address: {}", e)))?;

        let network_label = constants
            .as_ref()
            .map(|c| c.display_name.clone())
            .unwrap_or_else(|| network_name.clone());

        Ok(Self {
            network_name,
            network_label,
            chain_id,
            rpc_url,
            contract_address,
            mnemonic: env_config
                .wallet
                .mnemonic
                .clone()
                .map(SecretString::new),
            account_index: env_config.wallet.account_index.unwrap_or(0),
            poll_interval: Duration::from_secs(env_config.tx.poll_interval_secs.unwrap_or(4).max(1)),
            confirmation_timeout: Duration::from_secs(env_config.tx.timeout_secs.unwrap_or(300)),
            log_level: env_config
                .logging
                .level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: env_config.logging.file_path.as_ref().map(PathBuf::from),
        })
    }

    /// Default location for a user-level configuration file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("whitelist-dapp");
        path.push("whitelist.toml");
        path
    }

    /// Write a starter configuration file (without secrets)
    pub fn write_template(path: &Path, contract_address: Option<&str>) -> Result<(), Error> {
        let constants = NetworkConstants::ropsten();
        let template = EnvironmentConfig {
            network: NetworkEnvConfig {
                name: Some(constants.network_name),
                chain_id: Some(constants.chain_id),
                rpc_url: Some(constants.default_rpc),
            },
            contract: ContractEnvConfig {
                address: contract_address.map(str::to_string),
            },
            tx: TxEnvConfig {
                poll_interval_secs: Some(4),
                timeout_secs: Some(300),
            },
            ..Default::default()
        };

        let content = toml::to_string_pretty(&template)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> EnvironmentConfig {
        let mut cfg = EnvironmentConfig::default();
        cfg.contract.address = Some("0x742d35Cc6634C0532925a3b844Bc454e4438f44e".to_string());
        cfg
    }

    #[test]
    fn test_defaults_resolve_to_ropsten() {
        let cfg = WhitelistConfig::from_env_config(&base_env()).unwrap();
        assert_eq!(cfg.network_name, "ropsten");
        assert_eq!(cfg.network_label, "Ropsten");
        assert_eq!(cfg.chain_id, 3);
        assert_eq!(cfg.rpc_url.as_str(), "http://127.0.0.1:8545/");
        assert_eq!(cfg.poll_interval, Duration::from_secs(4));
        assert_eq!(cfg.confirmation_timeout, Duration::from_secs(300));
        assert!(cfg.mnemonic.is_none());
    }

    #[test]
    fn test_missing_contract_address_is_rejected() {
        let err = WhitelistConfig::from_env_config(&EnvironmentConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("contract address")));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut cfg = base_env();
        cfg.contract.address = Some("0x1234".to_string());
        assert!(WhitelistConfig::from_env_config(&cfg).is_err());

        let mut cfg = base_env();
        cfg.network.rpc_url = Some("not a url".to_string());
        assert!(WhitelistConfig::from_env_config(&cfg).is_err());

        let mut cfg = base_env();
        cfg.network.chain_id = Some(0);
        assert!(WhitelistConfig::from_env_config(&cfg).is_err());
    }

    #[test]
    fn test_unknown_network_needs_explicit_chain_id() {
        let mut cfg = base_env();
        cfg.network.name = Some("devnet".to_string());
        assert!(WhitelistConfig::from_env_config(&cfg).is_err());

        cfg.network.chain_id = Some(1337);
        cfg.network.rpc_url = Some("http://localhost:8545".to_string());
        let resolved = WhitelistConfig::from_env_config(&cfg).unwrap();
        assert_eq!(resolved.chain_id, 1337);
        assert_eq!(resolved.network_label, "devnet");
    }

    #[test]
    fn test_template_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("whitelist.toml");
        WhitelistConfig::write_template(&path, Some("0x742d35Cc6634C0532925a3b844Bc454e4438f44e"))
            .unwrap();

        let loaded = EnvironmentConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.network.chain_id, Some(3));
        assert_eq!(loaded.loaded_files.len(), 1);
    }
}
