//! TON wallet contracts for the TON20 toolkit
//!
//! This crate provides:
//! - Mnemonic: 24-word TON mnemonic and key derivation
//! - Ed25519Keypair: signing keys
//! - Wallet V3R2 and Wallet V4R2, behind the common [`Wallet`] trait
//! - Transfer: internal messages carried by a wallet's external message

pub mod codes;
pub mod error;
pub mod keys;
pub mod mnemonic;
pub mod transfer;
pub mod v3r2;
pub mod v4r2;
pub mod version;
pub mod wallet;

// Re-exports
pub use error::{WalletError, WalletResult};
pub use keys::Ed25519Keypair;
pub use mnemonic::{Mnemonic, MNEMONIC_WORDS};
pub use transfer::{Transfer, SEND_MODE_PAY_FEES_SEPARATELY};
pub use v3r2::WalletV3R2;
pub use v4r2::WalletV4R2;
pub use version::{WalletSelector, WalletVersion};
pub use wallet::{create_wallet, default_subwallet_id, Wallet, DEFAULT_SUBWALLET_ID, MAX_TRANSFERS};

#[cfg(test)]
pub(crate) const TEST_PHRASE: &str = "oak tiger glass river panda wheel jacket frost lemon canvas \
    orbit mango pilot sugar velvet anchor bright camera dolphin eagle harbor island jungle kettle";
