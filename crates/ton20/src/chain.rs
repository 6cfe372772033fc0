//! Chain service interface.
//!
//! The engine needs exactly two things from the network: the state of a
//! wallet account and a way to broadcast a signed external message. Both go
//! through [`ChainService`] so the engine can run against toncenter, a lite
//! client or the in-memory [`MockChain`](crate::mock::MockChain).

use ton20_cell::MsgAddress;

use crate::amount::Amount;
use crate::error::Ton20Result;

/// On-chain account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// Contract deployed and running.
    Active,
    /// Account exists (usually funded) but has no code yet.
    Uninit,
    Frozen,
    /// No account at this address.
    Nonexist,
}

impl AccountStatus {
    /// Parse the status names used by toncenter and lite clients.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "active" => Some(AccountStatus::Active),
            "uninit" | "uninitialized" => Some(AccountStatus::Uninit),
            "frozen" => Some(AccountStatus::Frozen),
            "nonexist" | "non_exist" | "nonexistent" | "empty" => Some(AccountStatus::Nonexist),
            _ => None,
        }
    }
}

/// A wallet account as seen on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletState {
    pub status: AccountStatus,
    /// Balance in nanotons.
    pub balance: Amount,
    /// Current wallet seqno; 0 for accounts without code.
    pub seqno: u32,
}

impl WalletState {
    /// State of an address that has never been touched.
    pub fn nonexistent() -> Self {
        WalletState {
            status: AccountStatus::Nonexist,
            balance: 0,
            seqno: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Whether the wallet contract is deployed and can accept signed
    /// messages without a StateInit.
    pub fn is_initialized(&self) -> bool {
        self.is_active()
    }
}

/// Read and write access to the chain.
#[async_trait::async_trait]
pub trait ChainService: Send + Sync {
    /// Fetch status, balance and seqno of a wallet.
    async fn get_wallet_state(&self, address: &MsgAddress) -> Ton20Result<WalletState>;

    /// Broadcast a serialized external message (a single-root BoC).
    async fn send_external_message(&self, boc: &[u8]) -> Ton20Result<()>;
}

#[async_trait::async_trait]
impl<T: ChainService + ?Sized> ChainService for std::sync::Arc<T> {
    async fn get_wallet_state(&self, address: &MsgAddress) -> Ton20Result<WalletState> {
        (**self).get_wallet_state(address).await
    }

    async fn send_external_message(&self, boc: &[u8]) -> Ton20Result<()> {
        (**self).send_external_message(boc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(AccountStatus::from_name("active"), Some(AccountStatus::Active));
        assert_eq!(AccountStatus::from_name("Uninit"), Some(AccountStatus::Uninit));
        assert_eq!(AccountStatus::from_name("uninitialized"), Some(AccountStatus::Uninit));
        assert_eq!(AccountStatus::from_name("frozen"), Some(AccountStatus::Frozen));
        assert_eq!(AccountStatus::from_name("nonexist"), Some(AccountStatus::Nonexist));
        assert_eq!(AccountStatus::from_name("weird"), None);
    }

    #[test]
    fn test_wallet_state_flags() {
        let state = WalletState {
            status: AccountStatus::Uninit,
            balance: 5,
            seqno: 0,
        };
        assert!(!state.is_active());
        assert!(!state.is_initialized());

        let state = WalletState {
            status: AccountStatus::Active,
            ..state
        };
        assert!(state.is_active());
        assert!(state.is_initialized());

        assert_eq!(WalletState::nonexistent().balance, 0);
    }
}
