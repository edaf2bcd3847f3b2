//! Huffman encoding: frequency scan, tree build, bit packing.

use tracing::debug;

use crate::bitbuf::BitBuffer;
use crate::container::EncodedContainer;
use crate::error::{CodecError, Result};
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;

#[derive(Debug, Default, Clone, Copy)]
pub struct HuffmanEncoder;

impl HuffmanEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes `data` into a self-describing container.
    ///
    /// Output depends only on the input bytes: equal inputs give
    /// byte-identical containers.
    pub fn encode(&self, data: &[u8]) -> Result<EncodedContainer> {
        if data.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if data.len() as u64 > u32::MAX as u64 {
            return Err(CodecError::InputTooLarge {
                size: data.len(),
                limit: u32::MAX as usize,
            });
        }

        let table = FrequencyTable::build(data);
        let tree = HuffmanTree::build(&table)?;

        let estimated_bits: usize = table
            .entries()
            .iter()
            .filter_map(|&(symbol, count)| tree.code_of(symbol).map(|c| c.len() * count as usize))
            .sum();
        let mut bits = BitBuffer::with_capacity_bits(estimated_bits);
        for &b in data {
            let code = tree.code_of(b).ok_or_else(|| {
                CodecError::corrupt(format!("byte {:#04x} missing from code table", b))
            })?;
            bits.append_code(code);
        }

        debug!(
            input_len = data.len(),
            symbols = table.len(),
            max_code_len = tree.max_code_len(),
            packed_bytes = bits.byte_count(),
            free_bits = bits.free_bits(),
            "huffman encode complete"
        );

        Ok(EncodedContainer::new(tree.frequencies().clone(), bits))
    }
}
