//! `ton20`: mint, deploy, transfer and check TON20 tokens.

mod cli;
mod commands;
mod credentials;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ton20::Ton20Config;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Command};
use commands::{balance, deploy, mint, transfer, Context};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", e);
    }
}

fn load_config(cli: &Cli) -> Result<Ton20Config> {
    let mut config = match &cli.config {
        Some(path) => Ton20Config::from_file(path)?,
        None => Ton20Config::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.toncenter_url = endpoint.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(indexer) = &cli.indexer {
        config.indexer_url = indexer.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(
        toncenter = %config.toncenter_url,
        indexer = %config.indexer_url,
        "configuration loaded"
    );
    let ctx = Context::new(config);

    match &cli.command {
        Command::Mint(args) => mint::run(&ctx, args).await,
        Command::Deploy(args) => deploy::run(&ctx, args).await,
        Command::Transfer(args) => transfer::run(&ctx, args).await,
        Command::Balance(args) => balance::run(&ctx, args).await,
    }
}
