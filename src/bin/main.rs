use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use whitelist_dapp::{PageView, StderrAlerter, WhitelistConfig, WhitelistPage};

#[derive(Parser)]
#[command(name = "whitelist", version, about = "Crypto Devs whitelist client")]
struct Cli {
    /// Configuration file (defaults to whitelist.toml in the search paths)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network name, overriding the configured one
    #[arg(short, long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Command {
    #[command(flatten)]
    Page(PageCommand),
    /// Write a configuration template
    InitConfig {
        /// Destination (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Whitelist contract address to put in the template
        #[arg(long)]
        contract: Option<String>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(whitelist_dapp::config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_view(view: &PageView) {
    println!("{}", view.title);
    println!("{}", view.description);
    println!("{}", view.count_line);
    if let Some(account) = &view.account_line {
        println!("{}", account);
    }
    if view.button.is_button() {
        let marker = if view.button.is_enabled() { ">" } else { "-" };
        println!("[{} {}]", marker, view.button.label());
    } else {
        println!("{}", view.button.label());
    }
    if let Some(error) = &view.error_line {
        println!("{}", error);
    }
    println!("{}", view.footer);
}

/// Commands that drive the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum PageCommand {
    /// Connect and show the page
    Status,
    /// Connect the wallet and show membership
    Connect,
    /// Join the whitelist with the configured wallet
    Join,
}

async fn run_page(command: PageCommand, config: WhitelistConfig) -> anyhow::Result<()> {
    let mut page = WhitelistPage::from_config(&config, Arc::new(StderrAlerter));

    match command {
        PageCommand::Status => {
            // Failures are shown in the rendered page
            let _ = page.mount().await;
        }
        PageCommand::Connect => {
            page.mount().await.context("connecting wallet")?;
        }
        PageCommand::Join => {
            page.mount().await.context("connecting wallet")?;
            if page.state().joined_whitelist {
                tracing::info!("account already whitelisted");
            } else {
                let outcome = page
                    .add_address_to_whitelist()
                    .await
                    .context("joining the whitelist")?;
                println!("Transaction {} confirmed", outcome.hash);
            }
        }
    }

    print_view(&page.view());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Page(command) => command,
        Command::InitConfig { path, contract } => {
            let path = path.unwrap_or_else(WhitelistConfig::default_path);
            WhitelistConfig::write_template(&path, contract.as_deref())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Configuration template written to {}", path.display());
            return Ok(());
        }
    };

    if let Some(network) = &cli.network {
        std::env::set_var("WHITELIST_NETWORK_NAME", network);
    }
    let config =
        WhitelistConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.log_level);

    run_page(command, config).await
}
