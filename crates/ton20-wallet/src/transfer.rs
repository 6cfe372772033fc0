//! Internal message transfers carried by a wallet's external message.

use std::sync::Arc;

use ton20_cell::{Cell, CellBuilder, CellResult, MsgAddress};

/// Pay transfer fees separately from the message value.
pub const SEND_MODE_PAY_FEES_SEPARATELY: u8 = 1;

/// A transfer to be sent from a wallet
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Destination address
    pub to: MsgAddress,
    /// Amount in nanotons
    pub amount: u128,
    /// Optional message body
    pub payload: Option<Arc<Cell>>,
    /// Bounce flag
    pub bounce: bool,
    /// Send mode (default: 1)
    pub mode: u8,
}

impl Transfer {
    /// Create a simple transfer
    pub fn new(to: MsgAddress, amount: u128) -> Self {
        Self {
            to,
            amount,
            payload: None,
            bounce: true,
            mode: SEND_MODE_PAY_FEES_SEPARATELY,
        }
    }

    /// Set payload
    pub fn with_payload(mut self, payload: Arc<Cell>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set bounce flag
    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    /// Set send mode
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Build the internal message cell (`int_msg_info$0`).
    ///
    /// Source, fees, lt and timestamp are left zero; the wallet contract and
    /// validators rewrite them.
    pub fn to_internal_message(&self) -> CellResult<Cell> {
        let mut builder = CellBuilder::new();

        // int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
        builder.store_bit(false)?;
        builder.store_bit(true)?;
        builder.store_bit(self.bounce)?;
        builder.store_bit(false)?;

        // src: addr_none
        builder.store_address(&MsgAddress::Null)?;
        builder.store_address(&self.to)?;

        // value:CurrencyCollection with an empty extra-currency dict
        builder.store_coins(self.amount)?;
        builder.store_bit(false)?;

        // ihr_fee, fwd_fee, created_lt, created_at
        builder.store_coins(0)?;
        builder.store_coins(0)?;
        builder.store_u64(0)?;
        builder.store_u32(0)?;

        // init: none
        builder.store_bit(false)?;

        match &self.payload {
            Some(payload) => {
                builder.store_bit(true)?;
                builder.store_ref(payload.clone())?;
            }
            None => {
                builder.store_bit(false)?;
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton20_cell::CellSlice;

    #[test]
    fn test_transfer_builder() {
        let transfer = Transfer::new(MsgAddress::Null, 1_000_000_000)
            .with_bounce(false)
            .with_mode(3);

        assert_eq!(transfer.amount, 1_000_000_000);
        assert!(!transfer.bounce);
        assert_eq!(transfer.mode, 3);
    }

    #[test]
    fn test_defaults() {
        let transfer = Transfer::new(MsgAddress::Null, 0);
        assert!(transfer.bounce);
        assert_eq!(transfer.mode, SEND_MODE_PAY_FEES_SEPARATELY);
        assert!(transfer.payload.is_none());
    }

    #[test]
    fn test_internal_message_layout() {
        let dest = MsgAddress::Internal {
            workchain: 0,
            address: [0x5A; 32],
        };
        let payload = Arc::new(Cell::empty());
        let msg = Transfer::new(dest, 0)
            .with_payload(payload.clone())
            .to_internal_message()
            .unwrap();

        let mut slice = CellSlice::new(&msg);
        assert!(!slice.load_bit().unwrap()); // int_msg_info$0
        assert!(slice.load_bit().unwrap()); // ihr_disabled
        assert!(slice.load_bit().unwrap()); // bounce
        assert!(!slice.load_bit().unwrap()); // bounced
        assert_eq!(slice.load_address().unwrap(), MsgAddress::Null);
        assert_eq!(slice.load_address().unwrap(), dest);
        assert_eq!(slice.load_coins().unwrap(), 0);
        assert!(!slice.load_bit().unwrap());
        assert_eq!(slice.load_coins().unwrap(), 0);
        assert_eq!(slice.load_coins().unwrap(), 0);
        assert_eq!(slice.load_u64().unwrap(), 0);
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert!(!slice.load_bit().unwrap()); // no init
        assert!(slice.load_bit().unwrap()); // body in ref
        assert_eq!(slice.load_ref().unwrap().hash(), payload.hash());
        assert!(slice.is_empty());
    }
}
