//! Huffman decoding: rebuild the tree from the header, then replay the bits.

use tracing::{debug, warn};

use crate::container::EncodedContainer;
use crate::error::{CodecError, Result};
use crate::tree::HuffmanTree;

#[derive(Debug, Default, Clone, Copy)]
pub struct HuffmanDecoder;

impl HuffmanDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Parses and decodes a serialized container.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let container = EncodedContainer::from_bytes(data).inspect_err(|e| {
            warn!(error = %e, "rejected container header");
        })?;
        self.decode(&container)
    }

    /// Decodes every meaningful bit of `container`. Nothing is returned on
    /// failure.
    pub fn decode(&self, container: &EncodedContainer) -> Result<Vec<u8>> {
        let table = container.table();
        let tree = HuffmanTree::build(table).map_err(|e| match e {
            CodecError::EmptyInput => CodecError::corrupt("container has an empty symbol table"),
            other => other,
        })?;

        let expected = table.total();
        let expected_len = usize::try_from(expected)
            .map_err(|_| CodecError::corrupt(format!("declared length {} too large", expected)))?;
        if container.bits().bit_len() < expected_len {
            warn!(
                bits = container.bits().bit_len(),
                expected_symbols = expected_len,
                "packed bits too short for declared symbol count"
            );
            return Err(CodecError::corrupt(format!(
                "{} bits cannot hold {} symbols",
                container.bits().bit_len(),
                expected_len
            )));
        }

        let mut output = Vec::with_capacity(expected_len);
        let mut cursor = container.bits().reader();
        while !cursor.is_exhausted() {
            let symbol = tree.decode(&mut cursor).inspect_err(|e| {
                warn!(decoded = output.len(), error = %e, "bitstream ended mid-symbol");
            })?;
            output.push(symbol);
            if output.len() > expected_len {
                break;
            }
        }

        if output.len() != expected_len {
            return Err(CodecError::corrupt(format!(
                "decoded {} symbols, header declares {}",
                output.len(),
                expected_len
            )));
        }

        debug!(
            output_len = output.len(),
            symbols = table.len(),
            packed_bytes = container.bits().byte_count(),
            "huffman decode complete"
        );
        Ok(output)
    }
}
