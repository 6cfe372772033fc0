//! CellSlice for reading data from TON cells.

use crate::{Cell, CellError, CellResult, MsgAddress};

/// A slice view into a Cell for reading data.
///
/// CellSlice tracks the current read position and allows sequential
/// reading of bits, integers, bytes, addresses and references.
///
/// # Example
///
/// ```
/// use ton20_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build().unwrap();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_offset: usize,
    ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    /// Create a new slice from a cell.
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            ref_offset: 0,
        }
    }

    /// Load a single bit.
    pub fn load_bit(&mut self) -> CellResult<bool> {
        let bit = self
            .cell
            .get_bit(self.bit_offset)
            .ok_or(CellError::NotEnoughBits { need: 1, have: 0 })?;
        self.bit_offset += 1;
        Ok(bit)
    }

    /// Load an unsigned 8-bit integer.
    pub fn load_u8(&mut self) -> CellResult<u8> {
        self.load_uint(8).map(|v| v as u8)
    }

    /// Load an unsigned 32-bit integer (big-endian).
    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    /// Load an unsigned 64-bit integer (big-endian).
    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    /// Load a signed 8-bit integer.
    pub fn load_i8(&mut self) -> CellResult<i8> {
        self.load_int(8).map(|v| v as i8)
    }

    /// Load an unsigned integer with a specific bit width.
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;

        let mut result: u64 = 0;
        for _ in 0..bits {
            result = (result << 1) | (self.load_bit()? as u64);
        }
        Ok(result)
    }

    /// Load a signed integer with a specific bit width (two's complement).
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 {
            return Ok(0);
        }
        let unsigned = self.load_uint(bits)?;
        if bits < 64 && unsigned & (1u64 << (bits - 1)) != 0 {
            Ok((unsigned | !((1u64 << bits) - 1)) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Load a byte array.
    pub fn load_bytes(&mut self, count: usize) -> CellResult<Vec<u8>> {
        self.ensure_bits(count * 8)?;
        (0..count).map(|_| self.load_u8()).collect()
    }

    /// Load every remaining whole byte.
    pub fn load_remaining_bytes(&mut self) -> CellResult<Vec<u8>> {
        self.load_bytes(self.bits_left() / 8)
    }

    /// Load coins (VarUInteger 16).
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let len = self.load_uint(4)? as usize;
        let mut value: u128 = 0;
        for _ in 0..len {
            value = (value << 8) | self.load_u8()? as u128;
        }
        Ok(value)
    }

    /// Load a message address (addr_none or addr_std without anycast).
    pub fn load_address(&mut self) -> CellResult<MsgAddress> {
        match self.load_uint(2)? {
            0b00 => Ok(MsgAddress::Null),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidAddress(
                        "anycast addresses are not supported".to_string(),
                    ));
                }
                let workchain = self.load_i8()? as i32;
                let mut address = [0u8; 32];
                address.copy_from_slice(&self.load_bytes(32)?);
                Ok(MsgAddress::Internal { workchain, address })
            }
            tag => Err(CellError::InvalidAddress(format!(
                "unsupported address tag {:02b}",
                tag
            ))),
        }
    }

    /// Load a reference to another cell.
    pub fn load_ref(&mut self) -> CellResult<&'a Cell> {
        let reference = self
            .cell
            .reference(self.ref_offset)
            .ok_or(CellError::NotEnoughRefs { need: 1, have: 0 })?;
        self.ref_offset += 1;
        Ok(reference.as_ref())
    }

    /// Skip bits.
    pub fn skip_bits(&mut self, count: usize) -> CellResult<()> {
        self.ensure_bits(count)?;
        self.bit_offset += count;
        Ok(())
    }

    /// Get the number of remaining bits.
    pub fn bits_left(&self) -> usize {
        self.cell.bit_len() - self.bit_offset
    }

    /// Get the number of remaining references.
    pub fn refs_left(&self) -> usize {
        self.cell.reference_count() - self.ref_offset
    }

    /// Check if the slice has no bits and no references left.
    pub fn is_empty(&self) -> bool {
        self.bits_left() == 0 && self.refs_left() == 0
    }

    fn ensure_bits(&self, need: usize) -> CellResult<()> {
        let have = self.bits_left();
        if need > have {
            return Err(CellError::NotEnoughBits { need, have });
        }
        Ok(())
    }
}
