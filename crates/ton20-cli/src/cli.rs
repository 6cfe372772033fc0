//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ton20_wallet::{WalletSelector, WalletVersion};

/// Ticker used when `--tick` is omitted.
pub const DEFAULT_TICKER: &str = "grum";

#[derive(Debug, Parser)]
#[command(name = "ton20", version, about = "TON20 command line interface")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// toncenter v2 API URL
    #[arg(long, global = true, env = "TON20_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// toncenter API key
    #[arg(long, global = true, env = "TONCENTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// TON20 indexer GraphQL endpoint
    #[arg(long, global = true, env = "TON20_INDEXER", value_name = "URL")]
    pub indexer: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint tokens
    Mint(MintArgs),
    /// Deploy a new ticker
    Deploy(DeployArgs),
    /// Transfer tokens to another address
    Transfer(TransferArgs),
    /// Show a token balance
    Balance(BalanceArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct AmountArgs {
    /// Amount in tokens, e.g. 100 or 0.5
    #[arg(long)]
    pub amount: Option<String>,

    /// Amount in nano-units
    #[arg(long, allow_hyphen_values = true)]
    pub amount_nano: Option<i128>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SupplyArgs {
    /// Total supply in tokens
    #[arg(long)]
    pub supply: Option<String>,

    /// Total supply in nano-units
    #[arg(long, allow_hyphen_values = true)]
    pub supply_nano: Option<i128>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct OneMintArgs {
    /// Limit per mint in tokens
    #[arg(long)]
    pub one_mint: Option<String>,

    /// Limit per mint in nano-units
    #[arg(long, allow_hyphen_values = true)]
    pub one_mint_nano: Option<i128>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct MnemonicArgs {
    /// Mnemonic phrase (24 words)
    #[arg(long)]
    pub mnemo: Option<String>,

    /// File holding the mnemonic phrase
    #[arg(long, value_name = "FILE")]
    pub mnemo_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WalletArgs {
    #[command(flatten)]
    pub mnemonic: MnemonicArgs,

    /// Wallet contract version: auto, v4r2 or v3r2
    #[arg(long, default_value = "auto")]
    pub wallet_type: WalletSelector,

    /// Wait until the last transaction is confirmed
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct MintArgs {
    #[command(flatten)]
    pub amount: AmountArgs,

    /// Ticker symbol
    #[arg(long, default_value = DEFAULT_TICKER)]
    pub tick: String,

    /// Number of transactions to send
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Mint messages per transaction (1..4)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub msgs: u8,

    #[command(flatten)]
    pub wallet: WalletArgs,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Ticker symbol
    #[arg(long)]
    pub tick: String,

    #[command(flatten)]
    pub supply: SupplyArgs,

    #[command(flatten)]
    pub one_mint: OneMintArgs,

    #[command(flatten)]
    pub wallet: WalletArgs,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub amount: AmountArgs,

    /// Ticker symbol
    #[arg(long, default_value = DEFAULT_TICKER)]
    pub tick: String,

    /// Recipient address
    #[arg(long)]
    pub to: String,

    #[command(flatten)]
    pub wallet: WalletArgs,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct BalanceSource {
    /// Mnemonic phrase (24 words)
    #[arg(long)]
    pub mnemo: Option<String>,

    /// File holding the mnemonic phrase
    #[arg(long, value_name = "FILE")]
    pub mnemo_file: Option<PathBuf>,

    /// Wallet address
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Args)]
pub struct BalanceArgs {
    /// Ticker symbol
    #[arg(long, default_value = DEFAULT_TICKER)]
    pub tick: String,

    #[command(flatten)]
    pub source: BalanceSource,

    /// Wallet contract version used with a mnemonic
    #[arg(long, default_value_t = WalletSelector::Exact(WalletVersion::V4R2))]
    pub wallet_type: WalletSelector,
}
