//! CellBuilder for constructing TON cells.
//!
//! The builder allows storing bits, integers, bytes, addresses and references
//! to other cells, then building the final Cell.

use std::sync::Arc;

use crate::{Cell, CellError, CellResult, MsgAddress, MAX_CELL_BITS, MAX_CELL_REFS};

/// Builder for constructing TON cells.
///
/// # Example
///
/// ```
/// use ton20_cell::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// builder.store_bytes(&[1, 2, 3, 4]).unwrap();
/// let cell = builder.build().unwrap();
/// assert_eq!(cell.bit_len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct CellBuilder {
    /// Data buffer.
    data: Vec<u8>,
    /// Current bit position within the buffer.
    bit_len: usize,
    /// References to other cells.
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    /// Create a new empty CellBuilder.
    pub fn new() -> Self {
        CellBuilder {
            data: Vec::with_capacity(128),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    /// Store a single bit.
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        if self.bit_len >= MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + 1));
        }

        let byte_index = self.bit_len / 8;
        if byte_index >= self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[byte_index] |= 1 << (7 - self.bit_len % 8);
        }

        self.bit_len += 1;
        Ok(self)
    }

    /// Store multiple bits.
    pub fn store_bits(&mut self, bits: &[bool]) -> CellResult<&mut Self> {
        for &bit in bits {
            self.store_bit(bit)?;
        }
        Ok(self)
    }

    /// Store an unsigned 8-bit integer.
    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 8)
    }

    /// Store an unsigned 32-bit integer (big-endian).
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 32)
    }

    /// Store an unsigned 64-bit integer (big-endian).
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_uint(value, 64)
    }

    /// Store an unsigned integer with a specific bit width (big-endian).
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        if self.bit_len + bits > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + bits));
        }

        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Store a signed integer with a specific bit width (two's complement).
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.store_uint(value as u64, bits)
    }

    /// Store a byte array.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        if self.bit_len + bytes.len() * 8 > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + bytes.len() * 8));
        }
        for &byte in bytes {
            self.store_u8(byte)?;
        }
        Ok(self)
    }

    /// Store a reference to another cell.
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(self.references.len() + 1));
        }
        self.references.push(cell);
        Ok(self)
    }

    /// Store coins (VarUInteger 16): 4 bits of byte length, then the value.
    pub fn store_coins(&mut self, nanotons: u128) -> CellResult<&mut Self> {
        if nanotons == 0 {
            return self.store_uint(0, 4);
        }

        let bytes_needed = (128 - nanotons.leading_zeros()).div_ceil(8) as usize;
        if bytes_needed > 15 {
            return Err(CellError::DataTooLong(bytes_needed * 8 + 4));
        }

        self.store_uint(bytes_needed as u64, 4)?;
        for i in (0..bytes_needed).rev() {
            self.store_u8((nanotons >> (i * 8)) as u8)?;
        }
        Ok(self)
    }

    /// Store a message address.
    pub fn store_address(&mut self, addr: &MsgAddress) -> CellResult<&mut Self> {
        match addr {
            // addr_none$00
            MsgAddress::Null => self.store_uint(0b00, 2),
            // addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
            MsgAddress::Internal { workchain, address } => {
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(*workchain as i64, 8)?;
                self.store_bytes(address)
            }
        }
    }

    /// Get the current number of bits stored.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Build the cell.
    pub fn build(self) -> CellResult<Cell> {
        Ok(Cell::new(self.data, self.bit_len, self.references))
    }
}

impl Default for CellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builder() {
        let builder = CellBuilder::new();
        assert_eq!(builder.bit_len(), 0);
        let cell = builder.build().unwrap();
        assert_eq!(cell.reference_count(), 0);
    }

    #[test]
    fn test_store_bit() {
        let mut builder = CellBuilder::new();
        builder.store_bit(true).unwrap();
        builder.store_bit(false).unwrap();
        builder.store_bit(true).unwrap();

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 3);
        assert_eq!(cell.data(), &[0b10100000]);
    }

    #[test]
    fn test_store_u32() {
        let mut builder = CellBuilder::new();
        builder.store_u32(0x12345678).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.data(), &[0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_store_coins() {
        let mut builder = CellBuilder::new();
        builder.store_coins(0).unwrap();
        assert_eq!(builder.bit_len(), 4);

        let mut builder = CellBuilder::new();
        builder.store_coins(0x01_00).unwrap();
        // len=2 (4 bits) + 16 bits
        assert_eq!(builder.bit_len(), 20);
        let cell = builder.build().unwrap();
        assert_eq!(cell.data(), &[0x20, 0x10, 0x00]);
    }

    #[test]
    fn test_store_bytes_overflow() {
        let mut builder = CellBuilder::new();
        builder.store_u32(0).unwrap();
        assert!(builder.store_bytes(&[0u8; 124]).is_err());
        // Nothing was written by the failed call.
        assert_eq!(builder.bit_len(), 32);
        builder.store_bytes(&[0u8; 123]).unwrap();
    }

    #[test]
    fn test_store_internal_address() {
        let mut builder = CellBuilder::new();
        builder
            .store_address(&MsgAddress::Internal {
                workchain: -1,
                address: [0xAA; 32],
            })
            .unwrap();
        assert_eq!(builder.bit_len(), 2 + 1 + 8 + 256);
    }
}
