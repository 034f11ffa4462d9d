use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use whitelist_dapp::WhitelistConfig;

#[derive(Parser)]
#[command(name = "whitelist-tui", version, about = "Crypto Devs whitelist terminal UI")]
struct Cli {
    /// Configuration file (defaults to whitelist.toml in the search paths)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network name, overriding the configured one
    #[arg(short, long)]
    network: Option<String>,
}

fn default_log_file() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("whitelist-dapp");
    path.push("whitelist-tui.log");
    path
}

/// Logs go to a file; writing to the terminal would corrupt the UI
fn init_file_logging(config: &WhitelistConfig) -> anyhow::Result<PathBuf> {
    let path = config.log_file.clone().unwrap_or_else(default_log_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(whitelist_dapp::config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(network) = &cli.network {
        std::env::set_var("WHITELIST_NETWORK_NAME", network);
    }

    let config =
        WhitelistConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let log_path = init_file_logging(&config)?;
    tracing::info!(log = %log_path.display(), network = %config.network_name, "starting terminal UI");

    whitelist_dapp::run_tui(config).await?;
    Ok(())
}
