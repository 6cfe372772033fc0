//! In-memory chain for tests and dry runs.
//!
//! [`MockChain`] keeps wallet accounts in a map, accepts external messages
//! produced by the wallet contracts in `ton20-wallet`, and applies each one
//! after a configurable number of state polls, the way a real wallet's
//! seqno advances a few seconds after broadcast.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ton20_cell::{BagOfCells, Cell, CellSlice, MsgAddress};
use tracing::debug;

use crate::chain::{AccountStatus, ChainService, WalletState};
use crate::error::{Ton20Error, Ton20Result};

/// Bits in an Ed25519 signature.
const SIGNATURE_BITS: usize = 512;

/// When a dispatched message takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Applied on the n-th state query for the wallet after dispatch
    /// (0 applies it immediately).
    AfterPolls(u32),
    /// Never applied: the seqno stalls forever.
    Never,
}

/// An external message accepted by the mock chain.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Wallet the message was addressed to.
    pub destination: MsgAddress,
    /// Whether a StateInit was attached.
    pub with_state_init: bool,
    pub seqno: u32,
    pub valid_until: u32,
    /// Send mode of each internal message.
    pub modes: Vec<u8>,
    /// Destination of each internal message.
    pub recipients: Vec<MsgAddress>,
    /// Body of each internal message (`None` for an empty body).
    pub payloads: Vec<Option<Arc<Cell>>>,
    /// The raw BoC as dispatched.
    pub boc: Vec<u8>,
}

#[derive(Debug)]
struct MockAccount {
    state: WalletState,
    /// Polls left before the pending message applies.
    pending: Option<u32>,
}

#[derive(Debug)]
struct MockState {
    policy: AdvancePolicy,
    accounts: HashMap<MsgAddress, MockAccount>,
    failing: HashSet<MsgAddress>,
    sent: Vec<SentMessage>,
    state_queries: u64,
}

/// In-memory [`ChainService`].
#[derive(Debug)]
pub struct MockChain {
    inner: Mutex<MockState>,
}

impl MockChain {
    /// Messages apply on the first poll after dispatch.
    pub fn new() -> Self {
        Self::with_policy(AdvancePolicy::AfterPolls(1))
    }

    pub fn with_policy(policy: AdvancePolicy) -> Self {
        MockChain {
            inner: Mutex::new(MockState {
                policy,
                accounts: HashMap::new(),
                failing: HashSet::new(),
                sent: Vec::new(),
                state_queries: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or replace an account.
    pub fn set_account(&self, address: MsgAddress, state: WalletState) {
        self.lock().accounts.insert(
            address,
            MockAccount {
                state,
                pending: None,
            },
        );
    }

    /// Shorthand for a deployed wallet.
    pub fn set_active(&self, address: MsgAddress, balance: u128, seqno: u32) {
        self.set_account(
            address,
            WalletState {
                status: AccountStatus::Active,
                balance,
                seqno,
            },
        );
    }

    /// Make every query and dispatch touching `address` fail with a
    /// network error.
    pub fn fail_address(&self, address: MsgAddress) {
        self.lock().failing.insert(address);
    }

    pub fn set_policy(&self, policy: AdvancePolicy) {
        self.lock().policy = policy;
    }

    /// Current state of an account, without counting as a poll.
    pub fn account(&self, address: &MsgAddress) -> Option<WalletState> {
        self.lock().accounts.get(address).map(|a| a.state)
    }

    /// Messages accepted so far, in dispatch order.
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Number of `get_wallet_state` calls served.
    pub fn state_queries(&self) -> u64 {
        self.lock().state_queries
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChainService for MockChain {
    async fn get_wallet_state(&self, address: &MsgAddress) -> Ton20Result<WalletState> {
        let mut inner = self.lock();
        inner.state_queries += 1;
        if inner.failing.contains(address) {
            return Err(Ton20Error::Network(format!("{} unreachable", address)));
        }

        let Some(account) = inner.accounts.get_mut(address) else {
            return Ok(WalletState::nonexistent());
        };
        match account.pending {
            Some(left) if left <= 1 => {
                account.pending = None;
                apply_pending(&mut account.state);
            }
            Some(left) => account.pending = Some(left - 1),
            None => {}
        }
        Ok(account.state)
    }

    async fn send_external_message(&self, boc: &[u8]) -> Ton20Result<()> {
        let message = parse_external_message(boc)?;
        let mut inner = self.lock();
        if inner.failing.contains(&message.destination) {
            return Err(Ton20Error::Network(format!(
                "{} unreachable",
                message.destination
            )));
        }

        let policy = inner.policy;
        let account = inner
            .accounts
            .entry(message.destination)
            .or_insert_with(|| MockAccount {
                state: WalletState::nonexistent(),
                pending: None,
            });

        if !account.state.is_initialized() && !message.with_state_init {
            return Err(Ton20Error::Network(
                "external message rejected: account is not initialized".to_string(),
            ));
        }
        if message.seqno != account.state.seqno {
            return Err(Ton20Error::Network(format!(
                "external message rejected: seqno {} does not match wallet seqno {}",
                message.seqno, account.state.seqno
            )));
        }

        match policy {
            AdvancePolicy::AfterPolls(0) => apply_pending(&mut account.state),
            AdvancePolicy::AfterPolls(n) => account.pending = Some(n),
            AdvancePolicy::Never => account.pending = None,
        }

        debug!(
            destination = %message.destination,
            seqno = message.seqno,
            messages = message.payloads.len(),
            "mock chain accepted external message"
        );
        inner.sent.push(message);
        Ok(())
    }
}

fn apply_pending(state: &mut WalletState) {
    state.status = AccountStatus::Active;
    state.seqno = state.seqno.wrapping_add(1);
}

/// Decode an external message built by a V3R2 or V4R2 wallet.
pub fn parse_external_message(boc: &[u8]) -> Ton20Result<SentMessage> {
    let malformed = |what: &str| Ton20Error::Network(format!("malformed external message: {}", what));

    let bag = BagOfCells::deserialize(boc)?;
    let root = bag.single_root()?;
    let mut slice = CellSlice::new(root);

    if slice.load_uint(2)? != 0b10 {
        return Err(malformed("not ext_in_msg_info"));
    }
    slice.load_address()?;
    let destination = slice.load_address()?;
    if destination.is_null() {
        return Err(malformed("no destination"));
    }
    slice.load_coins()?;

    let with_state_init = slice.load_bit()?;
    if with_state_init {
        if !slice.load_bit()? {
            return Err(malformed("inline StateInit"));
        }
        slice.load_ref()?;
    }
    if !slice.load_bit()? {
        return Err(malformed("inline body"));
    }
    let body = slice.load_ref()?;

    let mut body_slice = CellSlice::new(body);
    body_slice.skip_bits(SIGNATURE_BITS)?;
    let _subwallet = body_slice.load_u32()?;
    let valid_until = body_slice.load_u32()?;
    let seqno = body_slice.load_u32()?;

    let transfers = body_slice.refs_left();
    match body_slice.bits_left().checked_sub(8 * transfers) {
        Some(0) => {}
        // V4R2 op byte
        Some(8) => {
            if body_slice.load_u8()? != 0 {
                return Err(malformed("unsupported wallet op"));
            }
        }
        _ => return Err(malformed("unexpected body layout")),
    }

    let mut modes = Vec::with_capacity(transfers);
    let mut recipients = Vec::with_capacity(transfers);
    let mut payloads = Vec::with_capacity(transfers);
    for _ in 0..transfers {
        modes.push(body_slice.load_u8()?);
        let message = body_slice.load_ref()?;
        let (recipient, payload) = parse_internal_message(message)?;
        recipients.push(recipient);
        payloads.push(payload);
    }

    Ok(SentMessage {
        destination,
        with_state_init,
        seqno,
        valid_until,
        modes,
        recipients,
        payloads,
        boc: boc.to_vec(),
    })
}

fn parse_internal_message(cell: &Cell) -> Ton20Result<(MsgAddress, Option<Arc<Cell>>)> {
    let mut slice = CellSlice::new(cell);
    if slice.load_bit()? {
        return Err(Ton20Error::Network(
            "malformed external message: not an internal message".to_string(),
        ));
    }
    slice.skip_bits(3)?;
    slice.load_address()?;
    let destination = slice.load_address()?;
    slice.load_coins()?;
    slice.skip_bits(1)?;
    slice.load_coins()?;
    slice.load_coins()?;
    slice.skip_bits(64 + 32)?;
    if slice.load_bit()? {
        return Err(Ton20Error::Network(
            "malformed external message: internal StateInit".to_string(),
        ));
    }

    let payload = if slice.load_bit()? {
        cell.reference(0).cloned()
    } else {
        None
    };
    Ok((destination, payload))
}
