//! # ton20
//!
//! Transaction engine for the TON20 comment-message token protocol.
//!
//! TON20 tokens have no contract of their own. An operation is a JSON
//! document sent as a text comment from a wallet to itself; an off-chain
//! indexer replays those comments to compute balances. This crate builds
//! and confirms such transactions:
//!
//! - **Amounts**: exact decimal to nano-unit conversion
//! - **Operations**: deploy, mint and transfer in canonical JSON, encoded as
//!   a snake-format comment cell
//! - **Wallet resolution**: find the V3R2 or V4R2 wallet a mnemonic controls
//! - **Submission**: batched, repeated transactions with wallet bootstrap
//! - **Confirmation**: bounded polling for seqno advancement
//! - **Balances**: queries against a TON20 indexer
//!
//! Chain access goes through [`ChainService`]. [`TonCenterClient`] talks to
//! a toncenter v2 API; [`MockChain`] keeps everything in memory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ton20::{
//!     encode_operation, parse_amount, MockChain, SubmitOptions, Submitter, TokenOperation,
//!     TransactionRequest, WalletResolver,
//! };
//! use ton20_wallet::WalletSelector;
//!
//! async fn mint(phrase: &str) -> ton20::Ton20Result<()> {
//!     let chain = MockChain::new();
//!     let mut wallet = WalletResolver::new(WalletSelector::Auto)
//!         .resolve(&chain, phrase)
//!         .await?;
//!
//!     let amount = parse_amount(Some("100"), None)?;
//!     let payload = encode_operation(&TokenOperation::mint("grum", amount)?)?;
//!     let request = TransactionRequest::new(payload)
//!         .with_message_count(4)
//!         .with_repeat_count(2);
//!
//!     let report = Submitter::new(&chain, SubmitOptions::default())
//!         .submit(&mut wallet, &request, |event| println!("{:?}", event))
//!         .await?;
//!     println!("sent {} transactions", report.dispatches.len());
//!     Ok(())
//! }
//! ```

pub mod amount;
pub mod chain;
pub mod config;
pub mod confirmation;
pub mod encoder;
pub mod error;
pub mod indexer;
pub mod mock;
pub mod operation;
pub mod resolver;
pub mod submitter;
pub mod toncenter;

// Re-exports
pub use amount::{format_amount, parse_amount, parse_amount_field, Amount, NANO_PER_UNIT};
pub use chain::{AccountStatus, ChainService, WalletState};
pub use config::Ton20Config;
pub use confirmation::{
    await_confirmation, transition, Awaiting, ConfirmationOutcome, ConfirmationState,
};
pub use encoder::{decode_operation, encode_operation, MAX_PAYLOAD_CELLS};
pub use error::{Ton20Error, Ton20Result};
pub use indexer::{BalanceIndexer, DtonIndexer};
pub use mock::{AdvancePolicy, MockChain, SentMessage};
pub use operation::{Recipient, TokenOperation, PROTOCOL};
pub use resolver::{select_candidate, Probe, WalletHandle, WalletResolver};
pub use submitter::{
    Dispatch, SubmissionReport, SubmitEvent, SubmitOptions, Submitter, TransactionRequest,
};
pub use toncenter::TonCenterClient;
