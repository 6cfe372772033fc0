//! Wallet trait definition

use std::sync::Arc;

use ton20_cell::{Cell, CellBuilder, MsgAddress};

use crate::error::WalletResult;
use crate::keys::Ed25519Keypair;
use crate::transfer::Transfer;
use crate::v3r2::WalletV3R2;
use crate::v4r2::WalletV4R2;
use crate::version::WalletVersion;

/// Default subwallet ID for workchain 0
pub const DEFAULT_SUBWALLET_ID: u32 = 698983191;

/// Maximum number of internal messages in one external message.
pub const MAX_TRANSFERS: usize = 4;

/// Common wallet interface
pub trait Wallet: Send + Sync {
    /// Get wallet version
    fn version(&self) -> WalletVersion;

    /// Get wallet address
    fn address(&self) -> &MsgAddress;

    /// Get the signing keypair
    fn keypair(&self) -> &Ed25519Keypair;

    /// Get workchain
    fn workchain(&self) -> i32;

    /// Get state init cell for deployment
    fn state_init(&self) -> WalletResult<Cell>;

    /// Create unsigned transfer message body
    fn create_transfer_body(
        &self,
        seqno: u32,
        transfers: &[Transfer],
        valid_until: u32,
    ) -> WalletResult<Cell>;

    /// Get public key
    fn public_key(&self) -> &[u8; 32] {
        self.keypair().public_key()
    }

    /// Sign a message body: `signature:bits512` followed by the body.
    fn sign(&self, body: &Cell) -> WalletResult<Cell> {
        let signature = self.keypair().sign(&body.hash());

        let mut builder = CellBuilder::new();
        builder.store_bytes(&signature)?;
        for i in 0..body.bit_len() {
            if let Some(bit) = body.get_bit(i) {
                builder.store_bit(bit)?;
            }
        }
        for reference in body.references() {
            builder.store_ref(reference.clone())?;
        }

        builder.build().map_err(Into::into)
    }

    /// Create the external message carrying `signed_body`.
    ///
    /// `with_state_init` attaches the wallet's StateInit, which is needed
    /// while the contract is not yet deployed.
    fn create_external_message(
        &self,
        signed_body: &Cell,
        with_state_init: bool,
    ) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();

        // ext_in_msg_info$10 src:addr_none dest:MsgAddressInt import_fee:Grams
        builder.store_bits(&[true, false])?;
        builder.store_address(&MsgAddress::Null)?;
        builder.store_address(self.address())?;
        builder.store_coins(0)?;

        // init:(Maybe (Either StateInit ^StateInit))
        if with_state_init {
            builder.store_bit(true)?;
            builder.store_bit(true)?;
            builder.store_ref(Arc::new(self.state_init()?))?;
        } else {
            builder.store_bit(false)?;
        }

        // body:(Either X ^X)
        builder.store_bit(true)?;
        builder.store_ref(Arc::new(signed_body.clone()))?;

        builder.build().map_err(Into::into)
    }
}

/// Construct the wallet of `version` controlled by `keypair`.
pub fn create_wallet(
    version: WalletVersion,
    keypair: Ed25519Keypair,
    workchain: i32,
) -> WalletResult<Box<dyn Wallet>> {
    Ok(match version {
        WalletVersion::V3R2 => Box::new(WalletV3R2::new(keypair, workchain)?),
        WalletVersion::V4R2 => Box::new(WalletV4R2::new(keypair, workchain)?),
    })
}

/// Subwallet ID used by standard wallets on `workchain`.
pub fn default_subwallet_id(workchain: i32) -> u32 {
    DEFAULT_SUBWALLET_ID.wrapping_add(workchain as u32)
}

/// Build a StateInit cell with code and data and no other fields.
pub(crate) fn build_state_init(code: Arc<Cell>, data: Cell) -> WalletResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_bit(false)?; // split_depth
    builder.store_bit(false)?; // special
    builder.store_bit(true)?;
    builder.store_ref(code)?;
    builder.store_bit(true)?;
    builder.store_ref(Arc::new(data))?;
    builder.store_bit(false)?; // library
    builder.build().map_err(Into::into)
}

/// Build the wallet message body prefix shared by V3R2 and V4R2.
pub(crate) fn body_header(
    subwallet_id: u32,
    valid_until: u32,
    seqno: u32,
    transfers: &[Transfer],
) -> WalletResult<CellBuilder> {
    if transfers.len() > MAX_TRANSFERS {
        return Err(crate::WalletError::TooManyTransfers {
            max: MAX_TRANSFERS,
            got: transfers.len(),
        });
    }

    let mut builder = CellBuilder::new();
    builder.store_u32(subwallet_id)?;
    builder.store_u32(valid_until)?;
    builder.store_u32(seqno)?;
    Ok(builder)
}

/// Append `[mode:uint8 message:^Cell]*` to a wallet body.
pub(crate) fn store_transfers(builder: &mut CellBuilder, transfers: &[Transfer]) -> WalletResult<()> {
    for transfer in transfers {
        builder.store_u8(transfer.mode)?;
        builder.store_ref(Arc::new(transfer.to_internal_message()?))?;
    }
    Ok(())
}
