//! huffpack: byte-oriented Huffman compression with a bit-exact container.
//!
//! Pipeline:
//! - `frequency` counts symbols in one scan
//! - `tree` builds a deterministic Huffman tree and assigns codes
//! - `bitbuf` packs codes MSB-first into a growable bit buffer
//! - `writer` and `container` serialize the frequency header and packed bits
//! - `decoder` rebuilds the same tree from the header and replays the bits
//!
//! The whole input is held in memory; there is no streaming mode.

pub mod bitbuf;
pub mod bits;
pub mod config;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod tree;
pub mod writer;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::CodecConfig;
use crate::container::EncodedContainer;
use crate::decoder::HuffmanDecoder;
use crate::encoder::HuffmanEncoder;
use crate::error::{CodecError, Result};
use crate::writer::BitStreamWriter;

pub use crate::bitbuf::BitBuffer;
pub use crate::frequency::FrequencyTable;
pub use crate::tree::{Code, HuffmanTree};

/// Serialized container plus statistics about the encode.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressedOutput {
    pub original_size: usize,
    pub compressed_size: usize,
    pub ratio: f64,
    pub entropy_bits: f64,
    pub distinct_symbols: usize,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Configured front end over the encoder and decoder.
pub struct Codec {
    config: CodecConfig,
    encoder: HuffmanEncoder,
    decoder: HuffmanDecoder,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            encoder: HuffmanEncoder::new(),
            decoder: HuffmanDecoder::new(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress `data` into a serialized container.
    pub fn compress(&self, data: &[u8]) -> Result<CompressedOutput> {
        let container = self.encode(data)?;
        let bytes = container.to_bytes()?;

        if self.config.verify_roundtrip {
            let restored = self.decoder.decode_bytes(&bytes)?;
            if restored != data {
                return Err(CodecError::corrupt("roundtrip verification failed"));
            }
        }

        Ok(CompressedOutput {
            original_size: data.len(),
            compressed_size: bytes.len(),
            ratio: bytes.len() as f64 / data.len() as f64,
            entropy_bits: Self::compute_entropy(data),
            distinct_symbols: container.table().len(),
            data: bytes,
        })
    }

    /// Decompress a serialized container.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decoder.decode_bytes(data)
    }

    /// Read `src` whole, compress it, and write the container to `dst`.
    pub fn compress_file(&self, src: &Path, dst: &Path) -> Result<CompressedOutput> {
        let data = fs::read(src)?;
        let container = self.encode(&data)?;

        let mut writer = BitStreamWriter::create(dst)?;
        container.write_to(&mut writer)?;
        let written = writer.bytes_written() as usize;
        writer.finish()?;

        debug!(src = %src.display(), dst = %dst.display(), written, "compressed file");
        Ok(CompressedOutput {
            original_size: data.len(),
            compressed_size: written,
            ratio: written as f64 / data.len() as f64,
            entropy_bits: Self::compute_entropy(&data),
            distinct_symbols: container.table().len(),
            data: Vec::new(),
        })
    }

    /// Decode the container at `src` and write the restored bytes to `dst`.
    pub fn decompress_file(&self, src: &Path, dst: &Path) -> Result<usize> {
        let data = fs::read(src)?;
        let restored = self.decompress(&data)?;

        let mut writer = BitStreamWriter::create(dst)?;
        writer.write_bytes(&restored)?;
        writer.finish()?;

        debug!(src = %src.display(), dst = %dst.display(), len = restored.len(), "decompressed file");
        Ok(restored.len())
    }

    fn encode(&self, data: &[u8]) -> Result<EncodedContainer> {
        if data.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if data.len() > self.config.max_input_size {
            return Err(CodecError::InputTooLarge {
                size: data.len(),
                limit: self.config.max_input_size,
            });
        }
        self.encoder.encode(data)
    }

    /// Shannon entropy of `data` in bits per byte.
    pub fn compute_entropy(data: &[u8]) -> f64 {
        let table = FrequencyTable::build(data);
        let len = table.total() as f64;
        if len == 0.0 {
            return 0.0;
        }
        table
            .entries()
            .iter()
            .map(|&(_, count)| {
                let p = count as f64 / len;
                -p * p.log2()
            })
            .sum()
    }
}
