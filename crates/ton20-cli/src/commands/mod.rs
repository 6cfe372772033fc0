//! Command handlers.

pub mod balance;
pub mod deploy;
pub mod mint;
pub mod transfer;

use anyhow::Result;
use ton20::{
    SubmitEvent, SubmitOptions, Ton20Config, TonCenterClient, WalletHandle, WalletResolver,
};
use ton20_cell::MsgAddress;
use ton20_wallet::WalletSelector;

use crate::cli::{MnemonicArgs, WalletArgs};
use crate::credentials::load_mnemonic;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Ton20Config,
}

impl Context {
    pub fn new(config: Ton20Config) -> Self {
        Context { config }
    }

    pub fn chain(&self) -> Result<TonCenterClient> {
        Ok(TonCenterClient::new(
            &self.config.toncenter_url,
            self.config.api_key.clone(),
            self.config.request_timeout(),
        )?)
    }

    pub fn submit_options(&self, wait: bool) -> SubmitOptions {
        SubmitOptions {
            await_last: wait,
            ..self.config.submit_options()
        }
    }

    /// Resolve the wallet named by mnemonic arguments.
    pub async fn resolve_wallet(
        &self,
        chain: &TonCenterClient,
        mnemonic: &MnemonicArgs,
        selector: WalletSelector,
        require_balance: bool,
    ) -> Result<WalletHandle> {
        let phrase = load_mnemonic(mnemonic)?;
        let handle = WalletResolver::new(selector)
            .with_workchain(self.config.workchain)
            .with_require_balance(require_balance)
            .resolve(chain, &phrase)
            .await?;
        Ok(handle)
    }

    /// Resolve the funded wallet a sending command signs with.
    pub async fn sending_wallet(
        &self,
        chain: &TonCenterClient,
        args: &WalletArgs,
    ) -> Result<WalletHandle> {
        self.resolve_wallet(chain, &args.mnemonic, args.wallet_type, true)
            .await
    }
}

/// User-friendly bounceable form, or raw for addresses without one.
pub fn display_address(address: &MsgAddress) -> String {
    address
        .to_user_friendly(true, false)
        .unwrap_or_else(|| address.to_raw_string())
}

/// Print submission progress.
pub fn print_event(event: &SubmitEvent) {
    match event {
        SubmitEvent::Bootstrapping { .. } => println!("Initializing wallet..."),
        SubmitEvent::Bootstrapped { .. } => {}
        SubmitEvent::Dispatched { iteration, seqno } => {
            println!("Sent tx {} with seqno {}", iteration, seqno)
        }
        SubmitEvent::Confirmed { iteration, seqno } => {
            tracing::info!(iteration, seqno, "transaction confirmed")
        }
    }
}
