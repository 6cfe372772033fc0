//! Confirmation by seqno advancement.
//!
//! A wallet's seqno goes up by one each time it accepts an external message,
//! so a dispatch is confirmed once the seqno differs from the one it was
//! signed with. A bootstrap message is confirmed once the contract is
//! deployed.
//!
//! ```text
//! Pending{awaiting, ticks} --met--------------> Confirmed(seqno)
//!          |            \--ticks+1 == budget--> TimedOut
//!          \--otherwise--> Pending{awaiting, ticks+1}
//! ```

use std::fmt;
use std::time::Duration;

use ton20_cell::MsgAddress;
use tracing::{debug, warn};

use crate::chain::{ChainService, WalletState};
use crate::error::Ton20Result;

/// Interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls before giving up.
pub const DEFAULT_MAX_POLLS: u32 = 1000;

/// What a pending confirmation waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    /// The seqno to move away from this value.
    SeqnoChange(u32),
    /// The contract to become initialized.
    Initialization,
}

impl Awaiting {
    pub fn is_met(&self, observed: &WalletState) -> bool {
        match self {
            Awaiting::SeqnoChange(seqno) => observed.seqno != *seqno,
            Awaiting::Initialization => observed.is_initialized(),
        }
    }
}

impl fmt::Display for Awaiting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Awaiting::SeqnoChange(seqno) => write!(f, "seqno change from {}", seqno),
            Awaiting::Initialization => f.write_str("wallet initialization"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    Pending { awaiting: Awaiting, ticks: u32 },
    Confirmed(u32),
    TimedOut,
}

impl ConfirmationState {
    pub fn start(awaiting: Awaiting) -> Self {
        ConfirmationState::Pending { awaiting, ticks: 0 }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Pending { .. })
    }
}

/// Terminal result of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Confirmed; carries the seqno observed at that point.
    Confirmed(u32),
    TimedOut,
}

/// Advance `state` by one observation. Terminal states are returned as is.
///
/// A budget of `max_polls` allows that many observations; the last one that
/// still does not meet the condition times out. A zero budget behaves as one.
pub fn transition(state: ConfirmationState, observed: &WalletState, max_polls: u32) -> ConfirmationState {
    let ConfirmationState::Pending { awaiting, ticks } = state else {
        return state;
    };
    if awaiting.is_met(observed) {
        return ConfirmationState::Confirmed(observed.seqno);
    }
    let ticks = ticks.saturating_add(1);
    if ticks >= max_polls.max(1) {
        ConfirmationState::TimedOut
    } else {
        ConfirmationState::Pending { awaiting, ticks }
    }
}

/// Poll `address` until `awaiting` is met or the budget runs out.
///
/// A failed poll stops the driver with that error.
pub async fn await_confirmation<C: ChainService + ?Sized>(
    chain: &C,
    address: &MsgAddress,
    awaiting: Awaiting,
    poll_interval: Duration,
    max_polls: u32,
) -> Ton20Result<ConfirmationOutcome> {
    let mut state = ConfirmationState::start(awaiting);
    loop {
        let observed = chain.get_wallet_state(address).await?;
        state = transition(state, &observed, max_polls);
        match state {
            ConfirmationState::Confirmed(seqno) => {
                debug!(%address, %awaiting, seqno, "confirmed");
                return Ok(ConfirmationOutcome::Confirmed(seqno));
            }
            ConfirmationState::TimedOut => {
                warn!(%address, %awaiting, max_polls, "confirmation timed out");
                return Ok(ConfirmationOutcome::TimedOut);
            }
            ConfirmationState::Pending { .. } => tokio::time::sleep(poll_interval).await,
        }
    }
}
