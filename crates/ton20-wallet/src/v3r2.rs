//! Wallet V3R2 implementation

use ton20_cell::{Cell, CellBuilder, MsgAddress};

use crate::codes::wallet_v3r2_code;
use crate::error::WalletResult;
use crate::keys::Ed25519Keypair;
use crate::transfer::Transfer;
use crate::version::WalletVersion;
use crate::wallet::{body_header, build_state_init, default_subwallet_id, store_transfers, Wallet};

/// Wallet V3 revision 2
pub struct WalletV3R2 {
    keypair: Ed25519Keypair,
    workchain: i32,
    subwallet_id: u32,
    address: MsgAddress,
}

impl WalletV3R2 {
    /// Create a wallet with the default subwallet ID for `workchain`.
    pub fn new(keypair: Ed25519Keypair, workchain: i32) -> WalletResult<Self> {
        Self::with_subwallet(keypair, workchain, default_subwallet_id(workchain))
    }

    /// Create wallet with custom subwallet ID
    pub fn with_subwallet(
        keypair: Ed25519Keypair,
        workchain: i32,
        subwallet_id: u32,
    ) -> WalletResult<Self> {
        let state_init = Self::build_state_init(keypair.public_key(), subwallet_id)?;
        let address = MsgAddress::Internal {
            workchain,
            address: state_init.hash(),
        };
        Ok(Self {
            keypair,
            workchain,
            subwallet_id,
            address,
        })
    }

    fn build_state_init(pubkey: &[u8; 32], subwallet_id: u32) -> WalletResult<Cell> {
        // seqno:uint32 subwallet_id:uint32 public_key:bits256
        let mut data = CellBuilder::new();
        data.store_u32(0)?;
        data.store_u32(subwallet_id)?;
        data.store_bytes(pubkey)?;

        build_state_init(wallet_v3r2_code()?, data.build()?)
    }

    /// Get subwallet ID
    pub fn subwallet_id(&self) -> u32 {
        self.subwallet_id
    }
}

impl Wallet for WalletV3R2 {
    fn version(&self) -> WalletVersion {
        WalletVersion::V3R2
    }

    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn keypair(&self) -> &Ed25519Keypair {
        &self.keypair
    }

    fn workchain(&self) -> i32 {
        self.workchain
    }

    fn state_init(&self) -> WalletResult<Cell> {
        Self::build_state_init(self.keypair.public_key(), self.subwallet_id)
    }

    fn create_transfer_body(
        &self,
        seqno: u32,
        transfers: &[Transfer],
        valid_until: u32,
    ) -> WalletResult<Cell> {
        // subwallet_id:32 valid_until:32 seqno:32 [mode:8 message:^Cell]*
        let mut builder = body_header(self.subwallet_id, valid_until, seqno, transfers)?;
        store_transfers(&mut builder, transfers)?;
        builder.build().map_err(Into::into)
    }
}
