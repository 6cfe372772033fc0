//! Error types for TON20 operations.

use thiserror::Error;

/// Result type for TON20 operations.
pub type Ton20Result<T> = Result<T, Ton20Error>;

/// Errors that can occur while building, submitting or confirming TON20
/// operations.
#[derive(Debug, Error)]
pub enum Ton20Error {
    /// Bad user input: amount, mnemonic, ticker, address or oversized payload.
    #[error("{0}")]
    Config(String),

    /// No usable wallet controls the given credentials.
    #[error("{0}")]
    WalletResolution(String),

    /// Transport or indexer failure.
    #[error("network error: {0}")]
    Network(String),

    /// A message was dispatched but its effect was not observed in time.
    /// The message may still be included later.
    #[error("not confirmed after {polls} polls while waiting for {awaiting}")]
    ConfirmationTimeout { awaiting: String, polls: u32 },

    /// A submission stopped after at least one transaction was dispatched.
    /// `iteration` is the transaction being sent or confirmed at that point;
    /// earlier ones are on chain and are not rolled back.
    #[error("transaction {iteration} of {requested} failed: {source}")]
    Interrupted {
        iteration: u32,
        requested: u32,
        source: Box<Ton20Error>,
    },
}

impl Ton20Error {
    /// Whether re-running the whole command is safe.
    ///
    /// Only transport failures before anything was dispatched qualify. A
    /// timeout or an interrupted submission may already have changed chain
    /// state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Ton20Error::Network(_))
    }
}

impl From<ton20_cell::CellError> for Ton20Error {
    fn from(err: ton20_cell::CellError) -> Self {
        Ton20Error::Config(format!("cell error: {}", err))
    }
}

impl From<ton20_wallet::WalletError> for Ton20Error {
    fn from(err: ton20_wallet::WalletError) -> Self {
        Ton20Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Ton20Error {
    fn from(err: reqwest::Error) -> Self {
        Ton20Error::Network(err.to_string())
    }
}
