use config::{Config as ConfigLoader, ConfigError, File, FileFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Environment variable prefixes for different configuration sections
const ENV_NETWORK_PREFIX: &str = "WHITELIST_NETWORK";
const ENV_CONTRACT_PREFIX: &str = "WHITELIST_CONTRACT";
const ENV_WALLET_PREFIX: &str = "WHITELIST_WALLET";
const ENV_TX_PREFIX: &str = "WHITELIST_TX";
const ENV_LOG_PREFIX: &str = "WHITELIST_LOG";

/// Directory override for configuration file lookup
pub const CONFIG_DIR_VAR: &str = "WHITELIST_CONFIG_DIR";

/// Network configuration loaded from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkEnvConfig {
    /// Network name handed to the wallet connector (e.g. "ropsten")
    pub name: Option<String>,
    /// The only chain id the client accepts
    pub chain_id: Option<u64>,
    /// JSON-RPC endpoint URL
    pub rpc_url: Option<String>,
}

/// Whitelist contract location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractEnvConfig {
    /// Deployed contract address (0x-prefixed hex)
    pub address: Option<String>,
}

/// Wallet source for the local key connector
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct WalletEnvConfig {
    /// BIP-39 mnemonic phrase
    pub mnemonic: Option<String>,
    /// Account index in the derivation path
    pub account_index: Option<u32>,
}

impl std::fmt::Debug for WalletEnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletEnvConfig")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("account_index", &self.account_index)
            .finish()
    }
}

/// Transaction confirmation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxEnvConfig {
    /// Interval between receipt polls in seconds
    pub poll_interval_secs: Option<u64>,
    /// Give up waiting for a confirmation after this many seconds
    pub timeout_secs: Option<u64>,
}

/// Logging configuration from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingEnvConfig {
    /// Log level or filter directive (error, warn, info, debug, trace)
    pub level: Option<String>,
    /// Log file path, used by the TUI
    pub file_path: Option<String>,
}

/// Complete environment configuration
///
/// Every field is optional; defaults are applied when the configuration is
/// resolved into a [`crate::config::WhitelistConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub network: NetworkEnvConfig,
    #[serde(default)]
    pub contract: ContractEnvConfig,
    #[serde(default)]
    pub wallet: WalletEnvConfig,
    #[serde(default)]
    pub tx: TxEnvConfig,
    #[serde(default)]
    pub logging: LoggingEnvConfig,
    /// Configuration file paths that were loaded
    #[serde(skip)]
    pub loaded_files: Vec<String>,
}

impl EnvironmentConfig {
    /// Load configuration, reading `path` instead of searching when given
    pub fn load_from(path: Option<&Path>) -> Result<Self, Error> {
        let mut env_config = Self::default();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Configuration file {} does not exist",
                        path.display()
                    )));
                }
                env_config.load_config_file(path)?;
                env_config
                    .loaded_files
                    .push(path.to_string_lossy().to_string());
            }
            None => env_config.load_from_files()?,
        }

        env_config.load_from_env_with(|key| env::var(key).ok());

        Ok(env_config)
    }

    /// Directories searched for configuration files, in order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(dir) = env::var(CONFIG_DIR_VAR) {
            paths.push(PathBuf::from(dir));
        }
        paths.push(PathBuf::from("config"));
        paths.push(PathBuf::from("."));
        if let Some(mut dir) = dirs::config_dir() {
            dir.push("whitelist-dapp");
            paths.push(dir);
        }
        paths
    }

    fn load_from_files(&mut self) -> Result<(), Error> {
        let config_files = ["whitelist.toml", "whitelist.json"];

        for search_path in Self::search_paths() {
            for config_file in &config_files {
                let file_path = search_path.join(config_file);
                if file_path.exists() {
                    self.load_config_file(&file_path)?;
                    self.loaded_files
                        .push(file_path.to_string_lossy().to_string());
                    tracing::debug!(path = %file_path.display(), "loaded configuration file");
                }
            }
        }

        Ok(())
    }

    /// Merge a single configuration file; later files override earlier values
    fn load_config_file(&mut self, file_path: &Path) -> Result<(), Error> {
        let file_format = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        let settings = ConfigLoader::builder()
            .add_source(File::from(file_path).format(file_format))
            .build()
            .map_err(|e| Error::Config(format!("Failed to load config file: {}", e)))?;

        if let Some(network) = section::<NetworkEnvConfig>(&settings, "network", file_path)? {
            merge(&mut self.network.name, network.name);
            merge(&mut self.network.chain_id, network.chain_id);
            merge(&mut self.network.rpc_url, network.rpc_url);
        }

        if let Some(contract) = section::<ContractEnvConfig>(&settings, "contract", file_path)? {
            merge(&mut self.contract.address, contract.address);
        }

        if let Some(wallet) = section::<WalletEnvConfig>(&settings, "wallet", file_path)? {
            merge(&mut self.wallet.mnemonic, wallet.mnemonic);
            merge(&mut self.wallet.account_index, wallet.account_index);
        }

        if let Some(tx) = section::<TxEnvConfig>(&settings, "tx", file_path)? {
            merge(&mut self.tx.poll_interval_secs, tx.poll_interval_secs);
            merge(&mut self.tx.timeout_secs, tx.timeout_secs);
        }

        if let Some(logging) = section::<LoggingEnvConfig>(&settings, "logging", file_path)? {
            merge(&mut self.logging.level, logging.level);
            merge(&mut self.logging.file_path, logging.file_path);
        }

        Ok(())
    }

    /// Override values from environment variables resolved through `lookup`
    ///
    /// Unparsable numeric values are ignored with a warning.
    pub fn load_from_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |prefix: &str, name: &str| lookup(&format!("{}_{}", prefix, name));

        if let Some(name) = var(ENV_NETWORK_PREFIX, "NAME") {
            self.network.name = Some(name);
        }
        if let Some(chain_id) = var(ENV_NETWORK_PREFIX, "CHAIN_ID") {
            parse_into(&mut self.network.chain_id, "WHITELIST_NETWORK_CHAIN_ID", &chain_id);
        }
        if let Some(rpc_url) = var(ENV_NETWORK_PREFIX, "RPC_URL") {
            self.network.rpc_url = Some(rpc_url);
        }

        if let Some(address) = var(ENV_CONTRACT_PREFIX, "ADDRESS") {
            self.contract.address = Some(address);
        }

        if let Some(mnemonic) = var(ENV_WALLET_PREFIX, "MNEMONIC") {
            self.wallet.mnemonic = Some(mnemonic);
        }
        if let Some(index) = var(ENV_WALLET_PREFIX, "ACCOUNT_INDEX") {
            parse_into(
                &mut self.wallet.account_index,
                "WHITELIST_WALLET_ACCOUNT_INDEX",
                &index,
            );
        }

        if let Some(interval) = var(ENV_TX_PREFIX, "POLL_INTERVAL_SECS") {
            parse_into(
                &mut self.tx.poll_interval_secs,
                "WHITELIST_TX_POLL_INTERVAL_SECS",
                &interval,
            );
        }
        if let Some(timeout) = var(ENV_TX_PREFIX, "TIMEOUT_SECS") {
            parse_into(&mut self.tx.timeout_secs, "WHITELIST_TX_TIMEOUT_SECS", &timeout);
        }

        if let Some(level) = var(ENV_LOG_PREFIX, "LEVEL") {
            self.logging.level = Some(level);
        }
        if let Some(file_path) = var(ENV_LOG_PREFIX, "FILE_PATH") {
            self.logging.file_path = Some(file_path);
        }
    }
}

fn merge<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn parse_into<T: std::str::FromStr>(target: &mut Option<T>, name: &str, raw: &str) {
    match raw.trim().parse::<T>() {
        Ok(value) => *target = Some(value),
        Err(_) => tracing::warn!(variable = name, value = raw, "ignoring unparsable value"),
    }
}

/// Read one section of `settings`; absent is fine, malformed is not
fn section<T: DeserializeOwned>(
    settings: &ConfigLoader,
    key: &str,
    file_path: &Path,
) -> Result<Option<T>, Error> {
    match settings.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(Error::Config(format!(
            "Invalid [{}] section in {}: {}",
            key,
            file_path.display(),
            e
        ))),
    }
}
