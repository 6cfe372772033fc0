//! Snake-format byte strings.
//!
//! A snake string is stored as a linear chain of cells: each cell holds a
//! run of whole bytes and at most one reference to the cell holding the
//! continuation. The first chunk lives in whatever cell the caller is
//! building (after its own header); every continuation cell is filled up to
//! [`SNAKE_CELL_BYTES`].

use std::sync::Arc;

use crate::{Cell, CellBuilder, CellError, CellResult, CellSlice, MAX_CELL_BITS};

/// Payload capacity of a continuation cell in whole bytes.
pub const SNAKE_CELL_BYTES: usize = MAX_CELL_BITS / 8;

/// A chunked byte string: one chunk per cell, 0 or 1 continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeChain {
    chunk: Vec<u8>,
    next: Option<Box<SnakeChain>>,
}

impl SnakeChain {
    /// Split `bytes` into a chain whose head holds at most `head_capacity`
    /// bytes and whose continuations hold at most [`SNAKE_CELL_BYTES`] each.
    pub fn split(bytes: &[u8], head_capacity: usize) -> Self {
        let head_len = bytes.len().min(head_capacity);
        let (head, rest) = bytes.split_at(head_len);

        let mut next = None;
        for chunk in rest.chunks(SNAKE_CELL_BYTES).rev() {
            next = Some(Box::new(SnakeChain {
                chunk: chunk.to_vec(),
                next,
            }));
        }

        SnakeChain {
            chunk: head.to_vec(),
            next,
        }
    }

    /// Read a chain starting at the current position of `slice`.
    ///
    /// Fails with [`CellError::SnakeTooDeep`] if the chain spans more than
    /// `max_cells` cells.
    pub fn read(slice: &mut CellSlice<'_>, max_cells: usize) -> CellResult<Self> {
        let mut chunks = vec![Self::read_chunk(slice)?];
        let mut cursor = Self::follow(slice)?;

        while let Some(cell) = cursor {
            if chunks.len() >= max_cells {
                return Err(CellError::SnakeTooDeep {
                    depth: chunks.len() + 1,
                    max: max_cells,
                });
            }
            let mut next_slice = CellSlice::new(cell);
            chunks.push(Self::read_chunk(&mut next_slice)?);
            cursor = Self::follow(&mut next_slice)?;
        }

        let mut next = None;
        while chunks.len() > 1 {
            let chunk = chunks.pop().unwrap_or_default();
            next = Some(Box::new(SnakeChain { chunk, next }));
        }
        Ok(SnakeChain {
            chunk: chunks.pop().unwrap_or_default(),
            next,
        })
    }

    fn read_chunk(slice: &mut CellSlice<'_>) -> CellResult<Vec<u8>> {
        if slice.bits_left() % 8 != 0 {
            return Err(CellError::InvalidBitLength(slice.bits_left()));
        }
        slice.load_remaining_bytes()
    }

    fn follow<'a>(slice: &mut CellSlice<'a>) -> CellResult<Option<&'a Cell>> {
        match slice.refs_left() {
            0 => Ok(None),
            1 => slice.load_ref().map(Some),
            n => Err(CellError::TooManyRefs(n)),
        }
    }

    /// Bytes held by this cell of the chain.
    pub fn chunk(&self) -> &[u8] {
        &self.chunk
    }

    /// The continuation, if any.
    pub fn next(&self) -> Option<&SnakeChain> {
        self.next.as_deref()
    }

    /// Iterate over the cells of the chain, head first.
    pub fn iter(&self) -> impl Iterator<Item = &SnakeChain> {
        std::iter::successors(Some(self), |link| link.next())
    }

    /// Number of cells the chain occupies, head included.
    pub fn cell_count(&self) -> usize {
        self.iter().count()
    }

    /// Reassemble the full byte string.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.iter().flat_map(|link| link.chunk.iter().copied()).collect()
    }

    /// Write the head chunk into `builder` and hang the continuation cells
    /// off a single reference.
    pub fn store_into(&self, builder: &mut CellBuilder) -> CellResult<()> {
        builder.store_bytes(&self.chunk)?;
        if let Some(next) = self.next() {
            builder.store_ref(Arc::new(next.build_cell()?))?;
        }
        Ok(())
    }

    /// Build this link (and everything after it) as a standalone cell.
    pub fn build_cell(&self) -> CellResult<Cell> {
        let links: Vec<&SnakeChain> = self.iter().collect();

        let mut tail: Option<Arc<Cell>> = None;
        for link in links.iter().rev() {
            let mut builder = CellBuilder::new();
            builder.store_bytes(&link.chunk)?;
            if let Some(cell) = tail.take() {
                builder.store_ref(cell)?;
            }
            tail = Some(Arc::new(builder.build()?));
        }

        match tail {
            Some(cell) => Ok(Arc::unwrap_or_clone(cell)),
            None => Ok(Cell::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_cell() {
        let chain = SnakeChain::split(b"hello", 123);
        assert_eq!(chain.cell_count(), 1);
        assert_eq!(chain.chunk(), b"hello");
        assert!(chain.next().is_none());
    }

    #[test]
    fn test_split_capacity_boundaries() {
        let data: Vec<u8> = (0..=255u8).cycle().take(123 + 127 + 1).collect();
        let chain = SnakeChain::split(&data, 123);

        let sizes: Vec<usize> = chain.iter().map(|l| l.chunk().len()).collect();
        assert_eq!(sizes, vec![123, 127, 1]);
        assert_eq!(chain.to_bytes(), data);
    }

    #[test]
    fn test_exact_fit_has_no_continuation() {
        let data = vec![b'x'; 123];
        let chain = SnakeChain::split(&data, 123);
        assert_eq!(chain.cell_count(), 1);
    }

    #[test]
    fn test_store_and_read_back() {
        let data: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();

        let mut builder = CellBuilder::new();
        builder.store_u32(0).unwrap();
        SnakeChain::split(&data, 123).store_into(&mut builder).unwrap();
        let root = builder.build().unwrap();

        assert_eq!(root.bit_len(), 32 + 123 * 8);
        assert_eq!(root.reference_count(), 1);

        let mut slice = CellSlice::new(&root);
        assert_eq!(slice.load_u32().unwrap(), 0);
        let chain = SnakeChain::read(&mut slice, 16).unwrap();
        assert_eq!(chain.to_bytes(), data);
        assert_eq!(chain, SnakeChain::split(&data, 123));
    }

    #[test]
    fn test_read_rejects_deep_chain() {
        let data = vec![7u8; 127 * 5];
        let cell = SnakeChain::split(&data, 127).build_cell().unwrap();
        let mut slice = CellSlice::new(&cell);
        assert!(matches!(
            SnakeChain::read(&mut slice, 3),
            Err(CellError::SnakeTooDeep { max: 3, .. })
        ));
    }

    #[test]
    fn test_deterministic_hash() {
        let data = vec![b'a'; 400];
        let a = SnakeChain::split(&data, 100).build_cell().unwrap();
        let b = SnakeChain::split(&data, 100).build_cell().unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.depth(), 3);
    }
}
