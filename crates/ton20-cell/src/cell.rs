//! Cell implementation.
//!
//! A Cell holds up to 1023 bits of data and up to 4 references to other
//! cells. Hash and depth are computed once, when the cell is created, using
//! the standard representation for ordinary cells:
//!
//! ```text
//! d1 d2 data_with_completion_tag (child_depth:16)* (child_hash:256)*
//! ```

use std::sync::Arc;

use crate::{sha256, MAX_CELL_BITS, MAX_CELL_REFS};

/// Hash size in bytes (SHA256).
pub const HASH_BYTES: usize = 32;

/// An ordinary TON cell.
///
/// Cells form a DAG where each cell can reference up to 4 other cells. The
/// cell hash uniquely identifies the cell and its entire subtree.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Raw data bytes (may contain partial byte at the end).
    pub(crate) data: Vec<u8>,
    /// Number of bits stored in data.
    pub(crate) bit_len: usize,
    /// References to child cells.
    pub(crate) references: Vec<Arc<Cell>>,
    /// Representation hash.
    hash: [u8; HASH_BYTES],
    /// 0 for leaves, otherwise 1 + max child depth.
    depth: u16,
}

impl Cell {
    /// Create a new cell. Called by `CellBuilder::build()` and the BoC reader.
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, references: Vec<Arc<Cell>>) -> Self {
        debug_assert!(bit_len <= MAX_CELL_BITS);
        debug_assert!(references.len() <= MAX_CELL_REFS);

        let depth = references
            .iter()
            .map(|r| r.depth)
            .max()
            .map_or(0, |d| d.saturating_add(1));

        let mut cell = Cell {
            data,
            bit_len,
            references,
            hash: [0u8; HASH_BYTES],
            depth,
        };
        cell.hash = sha256(&cell.representation());
        cell
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, Vec::new())
    }

    fn representation(&self) -> Vec<u8> {
        let mut repr =
            Vec::with_capacity(2 + self.data.len() + self.references.len() * (2 + HASH_BYTES));

        let (d1, d2) = self.descriptors();
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&self.data_with_completion_tag());

        for reference in &self.references {
            repr.extend_from_slice(&reference.depth.to_be_bytes());
        }
        for reference in &self.references {
            repr.extend_from_slice(&reference.hash);
        }

        repr
    }

    /// Get the descriptor bytes (d1, d2).
    ///
    /// d1 = refs_count (ordinary cell, level 0)
    /// d2 = ceil(bit_len / 8) + floor(bit_len / 8)
    pub fn descriptors(&self) -> (u8, u8) {
        let d1 = self.references.len() as u8;
        let d2 = (self.bit_len.div_ceil(8) + self.bit_len / 8) as u8;
        (d1, d2)
    }

    /// Get data with completion tag.
    ///
    /// If bit_len is not byte-aligned, the bit after the last data bit is set
    /// to 1 and the rest of the byte stays 0.
    pub fn data_with_completion_tag(&self) -> Vec<u8> {
        let mut result = self.data[..self.bit_len.div_ceil(8)].to_vec();
        let remainder = self.bit_len % 8;
        if remainder != 0
            && let Some(last) = result.last_mut()
        {
            *last |= 1 << (7 - remainder);
        }
        result
    }

    /// Get the SHA256 representation hash of this cell.
    pub fn hash(&self) -> [u8; HASH_BYTES] {
        self.hash
    }

    /// Get the depth of this cell.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Get the raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the number of bits in this cell.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Get all references to child cells.
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    /// Get a reference by index.
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    /// Get the number of references.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Get a specific bit from the cell data.
    pub fn get_bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some((self.data[index / 8] >> (7 - index % 8)) & 1 == 1)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_descriptors() {
        let cell = Cell::empty();
        assert_eq!(cell.descriptors(), (0, 0));

        let cell = Cell::new(vec![0xFF], 8, vec![]);
        assert_eq!(cell.descriptors(), (0, 2));

        let cell = Cell::new(vec![0b11111000], 5, vec![]);
        assert_eq!(cell.descriptors(), (0, 1));

        let child = Arc::new(Cell::empty());
        let cell = Cell::new(vec![], 0, vec![child.clone(), child]);
        assert_eq!(cell.descriptors(), (2, 0));
    }

    #[test]
    fn test_data_with_completion_tag() {
        let cell = Cell::new(vec![0xFF], 8, vec![]);
        assert_eq!(cell.data_with_completion_tag(), vec![0xFF]);

        // 11111 + tag 1 + 00
        let cell = Cell::new(vec![0b11111000], 5, vec![]);
        assert_eq!(cell.data_with_completion_tag(), vec![0b11111100]);
    }

    #[test]
    fn test_depth_calculation() {
        let cell0 = Arc::new(Cell::empty());
        let cell1 = Arc::new(Cell::new(vec![], 0, vec![cell0.clone()]));
        let cell2 = Cell::new(vec![], 0, vec![cell1, cell0]);
        assert_eq!(cell2.depth(), 2);
    }

    #[test]
    fn test_get_bit() {
        let cell = Cell::new(vec![0b1010_0000], 3, vec![]);
        assert_eq!(cell.get_bit(0), Some(true));
        assert_eq!(cell.get_bit(1), Some(false));
        assert_eq!(cell.get_bit(2), Some(true));
        assert_eq!(cell.get_bit(3), None);
    }
}
