//! Error types for ton20-wallet

use thiserror::Error;

/// Wallet error type
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton20_cell::CellError),

    #[error("Wrong word count: expected 24, got {0}")]
    WrongWordCount(usize),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Too many transfers: max {max}, got {got}")]
    TooManyTransfers { max: usize, got: usize },

    #[error("Unknown wallet version: {0}")]
    UnknownVersion(String),

    #[error("Invalid signature")]
    InvalidSignature,
}

/// Result type alias
pub type WalletResult<T> = Result<T, WalletError>;
