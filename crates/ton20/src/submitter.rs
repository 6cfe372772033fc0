//! Transaction submission.
//!
//! A request is sent as `repeat_count` external messages, each carrying
//! `message_count` copies of the same internal message to the wallet itself.
//! Consecutive messages need consecutive seqnos, so every transaction except
//! the last is confirmed on chain before the next one is signed.
//!
//! ```text
//! [bootstrap if uninitialized] -> tx 1 -> confirm -> refresh -> tx 2 -> ... -> tx N
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ton20_cell::{BagOfCells, Cell, MsgAddress};
use ton20_wallet::{Transfer, MAX_TRANSFERS, SEND_MODE_PAY_FEES_SEPARATELY};
use tracing::{debug, info};

use crate::chain::ChainService;
use crate::confirmation::{
    await_confirmation, Awaiting, ConfirmationOutcome, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL,
};
use crate::error::{Ton20Error, Ton20Result};
use crate::resolver::WalletHandle;

/// How long a signed message stays valid.
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(60);

/// What to send.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// Body of every internal message.
    pub payload: Arc<Cell>,
    pub send_mode: u8,
    /// Internal messages per transaction, 1 to 4.
    pub message_count: usize,
    /// Transactions to send, at least 1.
    pub repeat_count: u32,
}

impl TransactionRequest {
    /// One transaction with one message, fees paid separately.
    pub fn new(payload: Arc<Cell>) -> Self {
        TransactionRequest {
            payload,
            send_mode: SEND_MODE_PAY_FEES_SEPARATELY,
            message_count: 1,
            repeat_count: 1,
        }
    }

    pub fn with_send_mode(mut self, send_mode: u8) -> Self {
        self.send_mode = send_mode;
        self
    }

    pub fn with_message_count(mut self, message_count: usize) -> Self {
        self.message_count = message_count;
        self
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn validate(&self) -> Ton20Result<()> {
        if !(1..=MAX_TRANSFERS).contains(&self.message_count) {
            return Err(Ton20Error::Config(format!(
                "message count must be between 1 and {}, got {}",
                MAX_TRANSFERS, self.message_count
            )));
        }
        if self.repeat_count == 0 {
            return Err(Ton20Error::Config(
                "repeat count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The internal messages of one transaction from `own_address`.
    pub fn transfers(&self, own_address: MsgAddress) -> Vec<Transfer> {
        let transfer = Transfer::new(own_address, 0)
            .with_payload(self.payload.clone())
            .with_mode(self.send_mode);
        vec![transfer; self.message_count]
    }
}

/// Timing of a submission.
#[derive(Debug, Clone, Copy)]
pub struct SubmitOptions {
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub message_ttl: Duration,
    /// Also wait for the last transaction to be confirmed.
    pub await_last: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        SubmitOptions {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            message_ttl: DEFAULT_MESSAGE_TTL,
            await_last: false,
        }
    }
}

/// Progress reported to the submission observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitEvent {
    /// The wallet is not deployed; a deployment message is about to go out.
    Bootstrapping { address: MsgAddress },
    /// The wallet is deployed and reports `seqno`.
    Bootstrapped { seqno: u32 },
    /// Transaction `iteration` was broadcast, signed with `seqno`.
    Dispatched { iteration: u32, seqno: u32 },
    /// Transaction `iteration` was included; the wallet moved to `seqno`.
    Confirmed { iteration: u32, seqno: u32 },
}

/// One broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// 1-based.
    pub iteration: u32,
    /// Seqno the transaction was signed with.
    pub seqno: u32,
    /// `None` when the transaction was not awaited.
    pub outcome: Option<ConfirmationOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Whether a deployment message went out first.
    pub bootstrapped: bool,
    pub dispatches: Vec<Dispatch>,
}

/// Sends transaction requests through a chain service.
pub struct Submitter<'a, C: ChainService + ?Sized> {
    chain: &'a C,
    options: SubmitOptions,
}

impl<'a, C: ChainService + ?Sized> Submitter<'a, C> {
    pub fn new(chain: &'a C, options: SubmitOptions) -> Self {
        Submitter { chain, options }
    }

    pub fn options(&self) -> &SubmitOptions {
        &self.options
    }

    /// Send `request` from `handle`, deploying the wallet first if needed.
    ///
    /// `handle` is refreshed from chain after every confirmation. Once a
    /// transaction has been broadcast, later failures are reported as
    /// [`Ton20Error::Interrupted`].
    pub async fn submit<F>(
        &self,
        handle: &mut WalletHandle,
        request: &TransactionRequest,
        mut observer: F,
    ) -> Ton20Result<SubmissionReport>
    where
        F: FnMut(&SubmitEvent),
    {
        request.validate()?;
        let mut report = SubmissionReport::default();

        if !handle.is_initialized() {
            observer(&SubmitEvent::Bootstrapping {
                address: *handle.address(),
            });
            self.bootstrap(handle).await?;
            report.bootstrapped = true;
            observer(&SubmitEvent::Bootstrapped {
                seqno: handle.seqno(),
            });
        }

        let requested = request.repeat_count;
        for iteration in 1..=requested {
            if let Err(source) = self
                .run_iteration(handle, request, iteration, &mut report, &mut observer)
                .await
            {
                if report.dispatches.is_empty() {
                    return Err(source);
                }
                return Err(Ton20Error::Interrupted {
                    iteration,
                    requested,
                    source: Box::new(source),
                });
            }
        }

        info!(
            address = %handle.address(),
            transactions = report.dispatches.len(),
            "submission complete"
        );
        Ok(report)
    }

    async fn run_iteration<F>(
        &self,
        handle: &mut WalletHandle,
        request: &TransactionRequest,
        iteration: u32,
        report: &mut SubmissionReport,
        observer: &mut F,
    ) -> Ton20Result<()>
    where
        F: FnMut(&SubmitEvent),
    {
        let seqno = handle.seqno();
        let transfers = request.transfers(*handle.address());
        self.dispatch(handle, seqno, &transfers, false).await?;

        info!(iteration, seqno, messages = transfers.len(), "transaction sent");
        report.dispatches.push(Dispatch {
            iteration,
            seqno,
            outcome: None,
        });
        observer(&SubmitEvent::Dispatched { iteration, seqno });

        let is_last = iteration == request.repeat_count;
        if is_last && !self.options.await_last {
            return Ok(());
        }

        let awaiting = Awaiting::SeqnoChange(seqno);
        let new_seqno = self.confirm(handle.address(), awaiting).await?;
        if let Some(dispatch) = report.dispatches.last_mut() {
            dispatch.outcome = Some(ConfirmationOutcome::Confirmed(new_seqno));
        }
        observer(&SubmitEvent::Confirmed {
            iteration,
            seqno: new_seqno,
        });
        handle.refresh(self.chain).await
    }

    /// Deploy the wallet with an empty seqno-0 message carrying its
    /// StateInit, and wait until it reports initialized.
    async fn bootstrap(&self, handle: &mut WalletHandle) -> Ton20Result<()> {
        info!(address = %handle.address(), "initializing wallet");
        self.dispatch(handle, 0, &[], true).await?;
        self.confirm(handle.address(), Awaiting::Initialization).await?;
        handle.refresh(self.chain).await
    }

    async fn confirm(&self, address: &MsgAddress, awaiting: Awaiting) -> Ton20Result<u32> {
        let outcome = await_confirmation(
            self.chain,
            address,
            awaiting,
            self.options.poll_interval,
            self.options.max_polls,
        )
        .await?;
        match outcome {
            ConfirmationOutcome::Confirmed(seqno) => Ok(seqno),
            ConfirmationOutcome::TimedOut => Err(Ton20Error::ConfirmationTimeout {
                awaiting: awaiting.to_string(),
                polls: self.options.max_polls,
            }),
        }
    }

    /// Sign and broadcast one external message.
    async fn dispatch(
        &self,
        handle: &WalletHandle,
        seqno: u32,
        transfers: &[Transfer],
        with_state_init: bool,
    ) -> Ton20Result<()> {
        let wallet = handle.wallet();
        let valid_until = valid_until(SystemTime::now(), self.options.message_ttl);
        let body = wallet.create_transfer_body(seqno, transfers, valid_until)?;
        let signed = wallet.sign(&body)?;
        let message = wallet.create_external_message(&signed, with_state_init)?;
        let boc = BagOfCells::from_root(message).serialize()?;

        debug!(
            address = %wallet.address(),
            seqno,
            valid_until,
            with_state_init,
            bytes = boc.len(),
            "dispatching external message"
        );
        self.chain.send_external_message(&boc).await
    }
}

/// Expiry timestamp for a message signed at `now`.
fn valid_until(now: SystemTime, ttl: Duration) -> u32 {
    let now = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(now.saturating_add(ttl.as_secs())).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Arc<Cell> {
        Arc::new(Cell::empty())
    }

    #[test]
    fn test_request_defaults() {
        let request = TransactionRequest::new(payload());
        assert_eq!(request.send_mode, 1);
        assert_eq!(request.message_count, 1);
        assert_eq!(request.repeat_count, 1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_validation() {
        for count in [0, 5] {
            let err = TransactionRequest::new(payload())
                .with_message_count(count)
                .validate()
                .unwrap_err();
            assert!(matches!(err, Ton20Error::Config(_)));
        }
        assert!(TransactionRequest::new(payload())
            .with_message_count(4)
            .validate()
            .is_ok());
        assert!(TransactionRequest::new(payload())
            .with_repeat_count(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_transfers_replicate_payload() {
        let own = MsgAddress::Internal {
            workchain: 0,
            address: [9; 32],
        };
        let request = TransactionRequest::new(payload())
            .with_message_count(3)
            .with_send_mode(3);
        let transfers = request.transfers(own);
        assert_eq!(transfers.len(), 3);
        for transfer in &transfers {
            assert_eq!(transfer.to, own);
            assert_eq!(transfer.amount, 0);
            assert_eq!(transfer.mode, 3);
            assert!(transfer.bounce);
            assert!(Arc::ptr_eq(transfer.payload.as_ref().unwrap(), &request.payload));
        }
    }

    #[test]
    fn test_valid_until() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(valid_until(now, Duration::from_secs(60)), 1_700_000_060);
        let far = UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX));
        assert_eq!(valid_until(far, Duration::from_secs(60)), u32::MAX);
    }

    #[test]
    fn test_default_options() {
        let options = SubmitOptions::default();
        assert_eq!(options.poll_interval, Duration::from_secs(1));
        assert_eq!(options.max_polls, 1000);
        assert_eq!(options.message_ttl, Duration::from_secs(60));
        assert!(!options.await_last);
    }
}
