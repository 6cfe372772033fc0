//! Bag of Cells (BoC) serialization format.
//!
//! BoC is the standard serialization format for TON cells. Wallet messages
//! are shipped to the network as single-root BoCs with a CRC32-C trailer,
//! and wallet contract code is embedded in the same format.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{crc32c, Cell, CellError, CellResult, BOC_GENERIC_MAGIC};

/// Bag of Cells - a serialized collection of cells.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

impl BagOfCells {
    /// Create a new BoC with the given root cells.
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    /// Create a BoC with a single root cell.
    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    /// Get all root cells.
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// Get a single root cell (errors if not exactly one root).
    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        if self.roots.len() != 1 {
            return Err(CellError::NotSingleRoot(self.roots.len()));
        }
        Ok(&self.roots[0])
    }

    /// Serialize the BoC to bytes (generic format, CRC32-C, no index).
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("No root cells".to_string()));
        }

        let cells = self.collect_cells();
        let hash_to_index: HashMap<[u8; 32], usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let size_bytes = Self::bytes_needed(cells.len());
        let mut cell_data = Vec::new();
        for cell in &cells {
            Self::serialize_cell(cell, &hash_to_index, size_bytes, &mut cell_data)?;
        }
        let off_bytes = Self::bytes_needed(cell_data.len());

        let mut result = Vec::with_capacity(16 + cell_data.len());
        result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());
        // has_idx = 0, has_crc32c = 1, has_cache_bits = 0, flags = 0, size
        result.push(0x40 | size_bytes as u8);
        result.push(off_bytes as u8);
        Self::write_uint(&mut result, cells.len() as u64, size_bytes);
        Self::write_uint(&mut result, self.roots.len() as u64, size_bytes);
        Self::write_uint(&mut result, 0, size_bytes);
        Self::write_uint(&mut result, cell_data.len() as u64, off_bytes);
        for root in &self.roots {
            let idx = hash_to_index
                .get(&root.hash())
                .ok_or_else(|| CellError::InvalidBoc("Root not found".to_string()))?;
            Self::write_uint(&mut result, *idx as u64, size_bytes);
        }
        result.extend_from_slice(&cell_data);

        let crc = crc32c(&result);
        result.extend_from_slice(&crc.to_le_bytes());
        Ok(result)
    }

    /// Serialize to a standard base64 string.
    pub fn serialize_to_base64(&self) -> CellResult<String> {
        let bytes = self.serialize()?;
        Ok(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &bytes,
        ))
    }

    /// Deserialize a generic (`b5ee9c72`) BoC.
    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        if data.len() < 6 {
            return Err(CellError::UnexpectedEof);
        }

        let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        if magic != BOC_GENERIC_MAGIC {
            return Err(CellError::InvalidBoc(format!(
                "Invalid magic: {:08x}, expected {:08x}",
                magic, BOC_GENERIC_MAGIC
            )));
        }

        let flags = data[4];
        let has_idx = flags & 0x80 != 0;
        let has_crc = flags & 0x40 != 0;
        let size_bytes = (flags & 0x07) as usize;
        let off_bytes = data[5] as usize;
        if size_bytes == 0 || size_bytes > 4 || off_bytes == 0 || off_bytes > 8 {
            return Err(CellError::InvalidBoc(format!(
                "Invalid size fields: size_bytes={}, off_bytes={}",
                size_bytes, off_bytes
            )));
        }

        let data_end = if has_crc {
            if data.len() < 10 {
                return Err(CellError::UnexpectedEof);
            }
            let end = data.len() - 4;
            let expected = u32::from_le_bytes([data[end], data[end + 1], data[end + 2], data[end + 3]]);
            let actual = crc32c(&data[..end]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
            end
        } else {
            data.len()
        };
        let data = &data[..data_end];

        let mut offset = 6;
        let cells_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let roots_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let _absent_count = Self::read_uint(data, &mut offset, size_bytes)?;
        let total_cells_size = Self::read_uint(data, &mut offset, off_bytes)? as usize;

        // Header counts are untrusted; never reserve more than the input could hold.
        let mut root_indices = Vec::with_capacity(roots_count.min(data.len()));
        for _ in 0..roots_count {
            root_indices.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
        }

        if has_idx {
            offset = cells_count
                .checked_mul(off_bytes)
                .and_then(|index_len| offset.checked_add(index_len))
                .ok_or(CellError::UnexpectedEof)?;
        }

        let cells_end = offset
            .checked_add(total_cells_size)
            .ok_or(CellError::UnexpectedEof)?;
        let cells_data = data.get(offset..cells_end).ok_or(CellError::UnexpectedEof)?;
        let cells = Self::parse_cells(cells_data, cells_count, size_bytes)?;

        let roots = root_indices
            .iter()
            .map(|&idx| cells.get(idx).cloned().ok_or(CellError::CellNotFound(idx)))
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    /// Deserialize from base64 string.
    pub fn deserialize_from_base64(base64_str: &str) -> CellResult<Self> {
        let bytes = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            base64_str.trim(),
        )
        .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Deserialize from hex string.
    pub fn deserialize_from_hex(hex_str: &str) -> CellResult<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CellError::InvalidBoc(format!("invalid hex string: {}", e)))?;
        Self::deserialize(&bytes)
    }

    /// Collect all cells parents-first: every reference points to a higher
    /// index than the cell holding it.
    fn collect_cells(&self) -> Vec<Arc<Cell>> {
        let mut post_order: Vec<Arc<Cell>> = Vec::new();
        let mut visited: HashMap<[u8; 32], ()> = HashMap::new();

        for root in &self.roots {
            Self::visit(root, &mut post_order, &mut visited);
        }

        post_order.reverse();
        post_order
    }

    fn visit(
        cell: &Arc<Cell>,
        out: &mut Vec<Arc<Cell>>,
        visited: &mut HashMap<[u8; 32], ()>,
    ) {
        if visited.insert(cell.hash(), ()).is_some() {
            return;
        }
        for reference in cell.references().iter().rev() {
            Self::visit(reference, out, visited);
        }
        out.push(cell.clone());
    }

    fn serialize_cell(
        cell: &Cell,
        hash_to_index: &HashMap<[u8; 32], usize>,
        size_bytes: usize,
        out: &mut Vec<u8>,
    ) -> CellResult<()> {
        let (d1, d2) = cell.descriptors();
        out.push(d1);
        out.push(d2);
        out.extend_from_slice(&cell.data_with_completion_tag());

        for reference in cell.references() {
            let idx = hash_to_index
                .get(&reference.hash())
                .ok_or_else(|| CellError::InvalidBoc("Reference not found".to_string()))?;
            Self::write_uint(out, *idx as u64, size_bytes);
        }
        Ok(())
    }

    fn parse_cells(data: &[u8], cell_count: usize, size_bytes: usize) -> CellResult<Vec<Arc<Cell>>> {
        struct RawCell {
            data: Vec<u8>,
            bit_len: usize,
            refs: Vec<usize>,
        }

        let mut raw = Vec::with_capacity(cell_count.min(data.len()));
        let mut offset = 0;

        for _ in 0..cell_count {
            let (d1, d2) = match data.get(offset..offset + 2) {
                Some(&[d1, d2]) => (d1, d2),
                _ => return Err(CellError::UnexpectedEof),
            };
            offset += 2;

            if d1 & 0x08 != 0 || d1 >> 5 != 0 {
                return Err(CellError::ExoticCell);
            }
            let refs_count = (d1 & 0x07) as usize;
            if refs_count > crate::MAX_CELL_REFS {
                return Err(CellError::TooManyRefs(refs_count));
            }

            let data_len = (d2 as usize).div_ceil(2);
            let cell_data = data
                .get(offset..offset + data_len)
                .ok_or(CellError::UnexpectedEof)?;
            offset += data_len;

            let bit_len = if d2 % 2 == 0 {
                data_len * 8
            } else {
                Self::find_bit_len(cell_data)
            };

            let mut refs = Vec::with_capacity(refs_count);
            for _ in 0..refs_count {
                refs.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
            }

            raw.push(RawCell {
                data: Self::remove_completion_tag(cell_data, bit_len),
                bit_len,
                refs,
            });
        }

        // Build children before parents. Cells written parents-first only
        // reference higher indices, so walking backwards always finds them.
        let mut cells: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
        for i in (0..cell_count).rev() {
            let references = raw[i]
                .refs
                .iter()
                .map(|&idx| {
                    if idx <= i {
                        return Err(CellError::InvalidBoc(format!(
                            "cell {} references earlier cell {}",
                            i, idx
                        )));
                    }
                    cells
                        .get(idx)
                        .and_then(|c| c.clone())
                        .ok_or(CellError::CellNotFound(idx))
                })
                .collect::<CellResult<Vec<_>>>()?;

            cells[i] = Some(Arc::new(Cell::new(
                raw[i].data.clone(),
                raw[i].bit_len,
                references,
            )));
        }

        cells
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.ok_or(CellError::CellNotFound(i)))
            .collect()
    }

    /// Find the bit length of tagged data: the completion tag is the lowest
    /// set bit of the last non-zero byte.
    fn find_bit_len(data: &[u8]) -> usize {
        for i in (0..data.len()).rev() {
            let byte = data[i];
            if byte != 0 {
                return (i + 1) * 8 - byte.trailing_zeros() as usize - 1;
            }
        }
        0
    }

    fn remove_completion_tag(data: &[u8], bit_len: usize) -> Vec<u8> {
        let mut result = data[..bit_len.div_ceil(8)].to_vec();
        let remainder = bit_len % 8;
        if remainder != 0
            && let Some(last) = result.last_mut()
        {
            *last &= !((1u8 << (8 - remainder)) - 1);
        }
        result
    }

    fn bytes_needed(n: usize) -> usize {
        if n == 0 {
            1
        } else {
            (64 - (n as u64).leading_zeros()).div_ceil(8) as usize
        }
    }

    fn write_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
        for i in (0..bytes).rev() {
            buf.push((value >> (i * 8)) as u8);
        }
    }

    fn read_uint(data: &[u8], offset: &mut usize, bytes: usize) -> CellResult<u64> {
        let chunk = data
            .get(*offset..*offset + bytes)
            .ok_or(CellError::UnexpectedEof)?;
        *offset += bytes;
        Ok(chunk.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }
}
