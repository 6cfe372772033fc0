//! Wallet resolution.
//!
//! The same mnemonic controls one wallet per contract version, each at its
//! own address. Resolution derives the key once, probes every candidate
//! version on chain and keeps the one that is actually in use:
//!
//! ```text
//! mnemonic -> keypair -> [V4R2, V3R2] -> probe each -> candidates
//!   candidate: active or balance > 0
//!   winner:    greatest balance, ties to the earlier probe
//! ```

use std::fmt;

use ton20_cell::MsgAddress;
use ton20_wallet::{create_wallet, Ed25519Keypair, Mnemonic, Wallet, WalletSelector, WalletVersion};
use tracing::{debug, info, warn};

use crate::amount::Amount;
use crate::chain::{ChainService, WalletState};
use crate::error::{Ton20Error, Ton20Result};

/// A resolved wallet: the signing contract plus its last observed state.
pub struct WalletHandle {
    wallet: Box<dyn Wallet>,
    state: WalletState,
}

impl WalletHandle {
    pub fn new(wallet: Box<dyn Wallet>, state: WalletState) -> Self {
        WalletHandle { wallet, state }
    }

    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    pub fn address(&self) -> &MsgAddress {
        self.wallet.address()
    }

    pub fn version(&self) -> WalletVersion {
        self.wallet.version()
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn seqno(&self) -> u32 {
        self.state.seqno
    }

    pub fn balance(&self) -> Amount {
        self.state.balance
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Re-read the wallet state from chain.
    pub async fn refresh<C: ChainService + ?Sized>(&mut self, chain: &C) -> Ton20Result<()> {
        self.state = chain.get_wallet_state(self.wallet.address()).await?;
        debug!(
            address = %self.wallet.address(),
            seqno = self.state.seqno,
            balance = self.state.balance,
            "wallet refreshed"
        );
        Ok(())
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("address", self.address())
            .field("version", &self.version())
            .field("state", &self.state)
            .finish()
    }
}

/// Outcome of probing one wallet version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub version: WalletVersion,
    pub state: WalletState,
}

impl Probe {
    /// Whether this wallet looks like it is in use.
    pub fn is_candidate(&self) -> bool {
        self.state.is_active() || self.state.balance > 0
    }
}

/// Index of the probe to use: the candidate with the greatest balance,
/// the earliest one on ties.
pub fn select_candidate(probes: &[Probe]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, probe) in probes.iter().enumerate() {
        if !probe.is_candidate() {
            continue;
        }
        match best {
            Some(current) if probes[current].state.balance >= probe.state.balance => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Finds the wallet a mnemonic controls.
#[derive(Debug, Clone, Copy)]
pub struct WalletResolver {
    selector: WalletSelector,
    workchain: i32,
    require_balance: bool,
}

impl WalletResolver {
    /// Resolver on workchain 0 that requires a funded wallet.
    pub fn new(selector: WalletSelector) -> Self {
        WalletResolver {
            selector,
            workchain: 0,
            require_balance: true,
        }
    }

    pub fn with_workchain(mut self, workchain: i32) -> Self {
        self.workchain = workchain;
        self
    }

    pub fn with_require_balance(mut self, require_balance: bool) -> Self {
        self.require_balance = require_balance;
        self
    }

    /// Resolve the wallet controlled by a 24-word mnemonic phrase.
    pub async fn resolve<C: ChainService + ?Sized>(
        &self,
        chain: &C,
        phrase: &str,
    ) -> Ton20Result<WalletHandle> {
        let keypair = Mnemonic::from_phrase(phrase)?.to_keypair()?;
        self.resolve_keypair(chain, keypair).await
    }

    /// Resolve the wallet controlled by an already derived keypair.
    pub async fn resolve_keypair<C: ChainService + ?Sized>(
        &self,
        chain: &C,
        keypair: Ed25519Keypair,
    ) -> Ton20Result<WalletHandle> {
        let mut wallets = Vec::new();
        let mut probes = Vec::new();
        let mut failures = Vec::new();

        for version in self.selector.candidates() {
            let wallet = create_wallet(version, keypair.clone(), self.workchain)?;
            match chain.get_wallet_state(wallet.address()).await {
                Ok(state) => {
                    debug!(%version, address = %wallet.address(), ?state, "probed wallet");
                    probes.push(Probe { version, state });
                    wallets.push(wallet);
                }
                Err(e) => {
                    warn!(%version, address = %wallet.address(), error = %e, "wallet probe failed");
                    failures.push(format!("{}: {}", version, e));
                }
            }
        }

        let Some(index) = select_candidate(&probes) else {
            let mut message = "no wallets found".to_string();
            if !failures.is_empty() {
                message.push_str(&format!(" ({})", failures.join("; ")));
            }
            return Err(Ton20Error::WalletResolution(message));
        };

        let state = probes[index].state;
        if self.require_balance && state.balance == 0 {
            return Err(Ton20Error::WalletResolution("no balance".to_string()));
        }

        let wallet = wallets.swap_remove(index);
        info!(
            version = %wallet.version(),
            address = %wallet.address(),
            balance = state.balance,
            seqno = state.seqno,
            "resolved wallet"
        );
        Ok(WalletHandle::new(wallet, state))
    }
}
