//! hitdesk - interactive operator shell for marketplace micro-task pools.
//!
//! Reads configuration, wires up the marketplace client and the experiment
//! server controller, and hands control to the REPL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hitdesk_cli::shell::Shell;
use hitdesk_cli::shell::prompt::StdinPrompt;
use hitdesk_cli::shell::session::Session;
use hitdesk_cli::styled_output::should_colorize;
use hitdesk_config::ConfigStore;
use hitdesk_marketplace::{Environment, HttpMarketplaceClient, MarketplaceConfig};
use hitdesk_server::{ControllerConfig, ServerController};

#[derive(Debug, Parser)]
#[command(name = "hitdesk", version, about = "Operator shell for marketplace HIT pools")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH", default_value = "hitdesk.toml")]
    config: PathBuf,

    /// Start in this mode, overriding the configured one
    #[arg(long, value_enum)]
    mode: Option<Environment>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn marketplace_config(config: &ConfigStore) -> MarketplaceConfig {
    MarketplaceConfig {
        sandbox_endpoint: config
            .get_str("marketplace", "sandbox_endpoint")
            .unwrap_or("https://sandbox.marketplace.example.com")
            .to_string(),
        live_endpoint: config
            .get_str("marketplace", "live_endpoint")
            .unwrap_or("https://marketplace.example.com")
            .to_string(),
        api_token: config
            .get_str("marketplace", "api_token")
            .unwrap_or_default()
            .to_string(),
    }
}

fn controller_config(config: &ConfigStore) -> ControllerConfig {
    let defaults = ControllerConfig::default();
    ControllerConfig {
        command: config
            .get_str("server", "command")
            .map(str::to_string)
            .unwrap_or(defaults.command),
        host: config
            .get_str("server", "host")
            .map(str::to_string)
            .unwrap_or(defaults.host),
        port: config
            .get_int("server", "port")
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(defaults.port),
        poll_interval: config
            .get_int("server", "poll_interval_ms")
            .map(|ms| Duration::from_millis(ms.max(1) as u64))
            .unwrap_or(defaults.poll_interval),
        wait_timeout: config
            .get_int("server", "wait_timeout_secs")
            .map(|s| Duration::from_secs(s.max(1) as u64))
            .unwrap_or(defaults.wait_timeout),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ConfigStore::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    let mode = cli.mode.unwrap_or_else(|| {
        if config.get_bool("hit", "using_sandbox").unwrap_or(true) {
            Environment::Sandbox
        } else {
            Environment::Live
        }
    });

    let market = Arc::new(
        HttpMarketplaceClient::new(marketplace_config(&config))
            .context("failed to build marketplace client")?,
    );
    let server = ServerController::new(controller_config(&config));
    let colors = !cli.no_color && should_colorize();

    let mut shell = Shell::new(
        Session::new(mode),
        config,
        market,
        server,
        Box::new(StdinPrompt),
        std::io::stdout(),
        colors,
    );
    shell.run(std::io::stdin().lock()).await
}
