//! TON Cell and Bag of Cells (BoC) support for the TON20 toolkit.
//!
//! This crate provides the data structures needed to build and ship
//! wallet messages:
//!
//! - **Cell**: The basic unit of data storage in TON
//! - **CellBuilder**: Builder for creating cells
//! - **CellSlice**: Reader for extracting data from cells
//! - **BagOfCells**: Serialization format for cells
//! - **MsgAddress**: TON address representation
//! - **SnakeChain**: Byte strings chunked across a linear chain of cells
//!
//! Only ordinary cells are supported. Exotic cells (pruned branches, Merkle
//! proofs, libraries) never appear in wallet messages or wallet code and are
//! rejected by the BoC reader.
//!
//! # Example
//!
//! ```
//! use ton20_cell::{BagOfCells, CellBuilder, SnakeChain};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(0).unwrap();
//! SnakeChain::split(b"data:application/json,{}", 123)
//!     .store_into(&mut builder)
//!     .unwrap();
//! let cell = builder.build().unwrap();
//!
//! let bytes = BagOfCells::from_root(cell.clone()).serialize().unwrap();
//! let restored = BagOfCells::deserialize(&bytes).unwrap();
//! assert_eq!(restored.single_root().unwrap().hash(), cell.hash());
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod slice;
mod snake;

pub use address::MsgAddress;
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::{Cell, HASH_BYTES};
pub use slice::CellSlice;
pub use snake::{SnakeChain, SNAKE_CELL_BYTES};

/// Errors that can occur during Cell/BoC operations.
#[derive(Debug, Error)]
pub enum CellError {
    /// The cell data exceeds the maximum of 1023 bits.
    #[error("Cell data too long: {0} bits (max 1023)")]
    DataTooLong(usize),

    /// The cell has too many references (max 4).
    #[error("Too many cell references: {0} (max 4)")]
    TooManyRefs(usize),

    /// Invalid BoC format.
    #[error("Invalid BoC format: {0}")]
    InvalidBoc(String),

    /// Cell not found in BoC.
    #[error("Cell not found: index {0}")]
    CellNotFound(usize),

    /// CRC32 checksum mismatch.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Unexpected end of data.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Not enough bits available.
    #[error("Not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references available.
    #[error("Not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Invalid address format.
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid base64 encoding.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Expected single root but found multiple or none.
    #[error("Expected single root, found {0}")]
    NotSingleRoot(usize),

    /// Exotic cells are not supported.
    #[error("Unsupported exotic cell")]
    ExoticCell,

    /// Invalid bit length.
    #[error("Invalid bit length: {0}")]
    InvalidBitLength(usize),

    /// A snake chain is longer than the caller allows.
    #[error("Snake chain too deep: {depth} cells (max {max})")]
    SnakeTooDeep { depth: usize, max: usize },
}

/// Result type for Cell/BoC operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of bits in a cell's data.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have.
pub const MAX_CELL_REFS: usize = 4;

/// BoC magic number for generic BoC.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// Compute SHA256 hash of the input data.
fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute CRC32-C checksum (Castagnoli polynomial).
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_store_and_load_various_integers() {
        let mut builder = CellBuilder::new();
        builder.store_u8(0xFF).unwrap();
        builder.store_u32(0x12345678).unwrap();
        builder.store_u64(0xDEADBEEFCAFEBABE).unwrap();
        builder.store_int(-1, 8).unwrap();
        builder.store_coins(1_000_000_000).unwrap();
        let cell = builder.build().unwrap();

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_u8().unwrap(), 0xFF);
        assert_eq!(slice.load_u32().unwrap(), 0x12345678);
        assert_eq!(slice.load_u64().unwrap(), 0xDEADBEEFCAFEBABE);
        assert_eq!(slice.load_i8().unwrap(), -1);
        assert_eq!(slice.load_coins().unwrap(), 1_000_000_000);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_nested_cells_hash_and_depth() {
        let mut leaf = CellBuilder::new();
        leaf.store_u32(1).unwrap();
        let leaf = Arc::new(leaf.build().unwrap());

        let mut root = CellBuilder::new();
        root.store_u32(2).unwrap();
        root.store_ref(leaf.clone()).unwrap();
        let root = root.build().unwrap();

        assert_eq!(root.depth(), 1);
        assert_eq!(leaf.depth(), 0);
        assert_ne!(root.hash(), leaf.hash());
    }

    #[test]
    fn test_empty_cell_hash() {
        // Well-known hash of the empty ordinary cell.
        let cell = CellBuilder::new().build().unwrap();
        assert_eq!(
            hex::encode(cell.hash()),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
    }

    #[test]
    fn test_crc32c_vector() {
        assert_eq!(crc32c(b"123456789"), 0xe3069283);
    }

    #[test]
    fn test_max_bits() {
        let mut builder = CellBuilder::new();
        for _ in 0..MAX_CELL_BITS {
            builder.store_bit(true).unwrap();
        }
        assert!(matches!(
            builder.store_bit(true),
            Err(CellError::DataTooLong(_))
        ));
    }
}
