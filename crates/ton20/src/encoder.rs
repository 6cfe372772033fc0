//! Payload cells for TON20 operations.
//!
//! An operation travels as a text comment: a root cell with a 32-bit zero
//! op code, followed by `data:application/json,<json>` in snake format.
//!
//! ```text
//! root:  [0u32][up to 123 bytes] -> ^cont
//! cont:  [up to 127 bytes]       -> ^cont
//! ```

use std::sync::Arc;

use ton20_cell::{Cell, CellBuilder, CellSlice, SnakeChain};
use tracing::debug;

use crate::error::{Ton20Error, Ton20Result};
use crate::operation::TokenOperation;

/// Prefix of the comment text.
pub const URI_PREFIX: &str = "data:application/json,";

/// Op code of a text comment.
pub const COMMENT_OP: u32 = 0;

/// Bytes of text that fit in the root cell after the comment op code.
pub const ROOT_PAYLOAD_BYTES: usize = (ton20_cell::MAX_CELL_BITS - 32) / 8;

/// Longest chain of cells a payload may occupy, root included.
pub const MAX_PAYLOAD_CELLS: usize = 64;

/// The full comment text for `op`.
pub fn operation_text(op: &TokenOperation) -> Ton20Result<String> {
    Ok(format!("{}{}", URI_PREFIX, op.to_json()?))
}

/// Encode `op` as a payload cell.
///
/// The result depends only on `op`: equal operations give cells with equal
/// hashes.
pub fn encode_operation(op: &TokenOperation) -> Ton20Result<Arc<Cell>> {
    let text = operation_text(op)?;
    let chain = SnakeChain::split(text.as_bytes(), ROOT_PAYLOAD_BYTES);
    if chain.cell_count() > MAX_PAYLOAD_CELLS {
        return Err(Ton20Error::Config("payload too large".to_string()));
    }

    let mut builder = CellBuilder::new();
    builder.store_u32(COMMENT_OP)?;
    chain.store_into(&mut builder)?;
    let cell = builder.build()?;

    debug!(
        op = op.op_name(),
        bytes = text.len(),
        cells = chain.cell_count(),
        "encoded operation payload"
    );
    Ok(Arc::new(cell))
}

/// Read the comment text back out of a payload cell.
pub fn decode_text(cell: &Cell) -> Ton20Result<String> {
    let mut slice = CellSlice::new(cell);
    let op = slice.load_u32()?;
    if op != COMMENT_OP {
        return Err(Ton20Error::Config(format!(
            "not a text comment: op 0x{:08x}",
            op
        )));
    }
    let chain = SnakeChain::read(&mut slice, MAX_PAYLOAD_CELLS)?;
    String::from_utf8(chain.to_bytes())
        .map_err(|_| Ton20Error::Config("comment is not valid UTF-8".to_string()))
}

/// Decode a payload cell produced by [`encode_operation`].
pub fn decode_operation(cell: &Cell) -> Ton20Result<TokenOperation> {
    let text = decode_text(cell)?;
    let json = text
        .strip_prefix(URI_PREFIX)
        .ok_or_else(|| Ton20Error::Config("comment is not a TON20 operation".to_string()))?;
    TokenOperation::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Recipient;

    #[test]
    fn test_root_capacity() {
        assert_eq!(ROOT_PAYLOAD_BYTES, 123);
    }

    #[test]
    fn test_short_payload_single_cell() {
        let op = TokenOperation::mint("grum", 100_000_000_000).unwrap();
        let cell = encode_operation(&op).unwrap();
        let text = operation_text(&op).unwrap();

        assert_eq!(cell.reference_count(), 0);
        assert_eq!(cell.bit_len(), 32 + text.len() * 8);
        assert_eq!(&cell.data()[..4], &[0, 0, 0, 0]);
        assert_eq!(&cell.data()[4..], text.as_bytes());
        assert_eq!(
            text,
            r#"data:application/json,{"p":"ton-20","op":"mint","tick":"grum","amt":"100000000000"}"#
        );
    }

    #[test]
    fn test_long_payload_chains() {
        let ticker = "t".repeat(300);
        let op = TokenOperation::mint(&ticker, 1).unwrap();
        let text = operation_text(&op).unwrap();
        let cell = encode_operation(&op).unwrap();

        assert_eq!(cell.bit_len(), 32 + 123 * 8);
        assert_eq!(cell.reference_count(), 1);
        let second = cell.reference(0).unwrap();
        assert_eq!(second.bit_len(), 127 * 8);
        assert_eq!(second.reference_count(), 1);
        assert_eq!(decode_text(&cell).unwrap(), text);
    }

    #[test]
    fn test_deterministic() {
        let recipient =
            Recipient::parse("EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c").unwrap();
        let a = TokenOperation::transfer("grum", 42, recipient.clone()).unwrap();
        let b = TokenOperation::transfer("grum", 42, recipient).unwrap();
        assert_eq!(
            encode_operation(&a).unwrap().hash(),
            encode_operation(&b).unwrap().hash()
        );

        let c = TokenOperation::mint("grum", 42).unwrap();
        assert_ne!(
            encode_operation(&a).unwrap().hash(),
            encode_operation(&c).unwrap().hash()
        );
    }

    #[test]
    fn test_decode_roundtrip() {
        let op = TokenOperation::deploy("grum", 1_000_000_000_000_000, 500_000_000).unwrap();
        let cell = encode_operation(&op).unwrap();
        assert_eq!(decode_operation(&cell).unwrap(), op);
    }

    #[test]
    fn test_payload_too_large() {
        // 123 + 63 * 127 bytes is the most 64 cells can hold.
        let budget = ROOT_PAYLOAD_BYTES + (MAX_PAYLOAD_CELLS - 1) * ton20_cell::SNAKE_CELL_BYTES;
        let overhead = operation_text(&TokenOperation::mint("x", 1).unwrap())
            .unwrap()
            .len()
            - 1;

        let fits = TokenOperation::mint(&"x".repeat(budget - overhead), 1).unwrap();
        assert!(encode_operation(&fits).is_ok());

        let too_big = TokenOperation::mint(&"x".repeat(budget - overhead + 1), 1).unwrap();
        assert_eq!(
            encode_operation(&too_big).unwrap_err().to_string(),
            "payload too large"
        );
    }

    #[test]
    fn test_decode_rejects_non_comment() {
        let mut builder = CellBuilder::new();
        builder.store_u32(0x0f8a7ea5).unwrap();
        let cell = builder.build().unwrap();
        assert!(decode_operation(&cell).is_err());

        let mut builder = CellBuilder::new();
        builder.store_u32(0).unwrap();
        builder.store_bytes(b"hello").unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(
            decode_operation(&cell).unwrap_err().to_string(),
            "comment is not a TON20 operation"
        );
    }
}
