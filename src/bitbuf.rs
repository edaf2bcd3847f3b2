//! Growable bit container and a bounded reader over its packed bytes.
//!
//! Bits are packed MSB-first: the first appended bit lands in the most
//! significant bit of byte 0. Unused low bits of the final byte ("free bits")
//! are always zero.

use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::bits::FixedBits;
use crate::error::{CodecError, Result};
use crate::tree::Code;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Rebuilds a buffer from its serialized parts, rejecting layouts the
    /// encoder never produces.
    pub fn from_parts(bytes: Vec<u8>, free_bits: u8) -> Result<Self> {
        if free_bits > 7 {
            return Err(CodecError::corrupt(format!(
                "free bit count {} out of range",
                free_bits
            )));
        }
        let Some(&last) = bytes.last() else {
            if free_bits != 0 {
                return Err(CodecError::corrupt("free bits declared on an empty buffer"));
            }
            return Ok(Self::new());
        };
        let padding_mask = ((1u16 << free_bits) - 1) as u8;
        if last & padding_mask != 0 {
            return Err(CodecError::corrupt("non-zero padding bits"));
        }
        let bit_len = bytes.len() * 8 - free_bits as usize;
        Ok(Self { bytes, bit_len })
    }

    pub fn append(&mut self, bit: bool) {
        let offset = (self.bit_len % 8) as u32;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last = last.with_msb_bit(offset, true);
            }
        }
        self.bit_len += 1;
    }

    pub fn append_code(&mut self, code: &Code) {
        for bit in code.iter() {
            self.append(bit);
        }
    }

    /// Number of meaningful bits.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    pub fn free_bits(&self) -> u8 {
        ((8 - self.bit_len % 8) % 8) as u8
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some(self.bytes[index / 8].msb_bit((index % 8) as u32))
    }

    pub fn reader(&self) -> BitCursor<'_> {
        BitCursor::new(&self.bytes, self.bit_len)
    }
}

/// Reads the meaningful bits of a packed buffer, never the padding.
pub struct BitCursor<'a> {
    inner: BitReader<Cursor<&'a [u8]>, BigEndian>,
    remaining: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bytes: &'a [u8], bit_len: usize) -> Self {
        Self {
            inner: BitReader::endian(Cursor::new(bytes), BigEndian),
            remaining: bit_len.min(bytes.len() * 8),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            return Err(CodecError::corrupt("bitstream exhausted mid-symbol"));
        }
        let bit = self
            .inner
            .read_bit()
            .map_err(|e| CodecError::corrupt(format!("bit read failed: {}", e)))?;
        self.remaining -= 1;
        Ok(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(buf: &mut BitBuffer, bits: &[u8]) {
        for &b in bits {
            buf.append(b == 1);
        }
    }

    #[test]
    fn test_empty_buffer() {
        let buf = BitBuffer::new();
        assert_eq!(buf.byte_count(), 0);
        assert_eq!(buf.free_bits(), 0);
        assert!(buf.to_byte_array().is_empty());
    }

    #[test]
    fn test_msb_first_packing() {
        let mut buf = BitBuffer::new();
        push_all(&mut buf, &[1, 0, 1, 1, 1]);
        assert_eq!(buf.as_bytes(), &[0b1011_1000]);
        assert_eq!(buf.free_bits(), 3);
        assert_eq!(buf.byte_count(), 1);
    }

    #[test]
    fn test_grows_one_byte_at_boundary() {
        let mut buf = BitBuffer::new();
        push_all(&mut buf, &[1; 8]);
        assert_eq!(buf.byte_count(), 1);
        assert_eq!(buf.free_bits(), 0);
        buf.append(false);
        assert_eq!(buf.byte_count(), 2);
        assert_eq!(buf.free_bits(), 7);
        assert_eq!(buf.as_bytes(), &[0xFF, 0x00]);
    }

    #[test]
    fn test_packed_size_matches_bit_count() {
        let mut buf = BitBuffer::new();
        for n in 0..100usize {
            assert_eq!(buf.byte_count() * 8 - buf.free_bits() as usize, n);
            buf.append(n % 3 == 0);
        }
    }

    #[test]
    fn test_append_code() {
        let mut buf = BitBuffer::new();
        buf.append_code(&Code::from_bits(vec![true, true, false]));
        buf.append_code(&Code::from_bits(vec![false, true]));
        assert_eq!(buf.bit_len(), 5);
        assert_eq!(buf.as_bytes(), &[0b1100_1000]);
    }

    #[test]
    fn test_cursor_stops_before_padding() {
        let mut buf = BitBuffer::new();
        push_all(&mut buf, &[1, 0, 1]);
        let mut cursor = buf.reader();
        assert!(cursor.read_bit().unwrap());
        assert!(!cursor.read_bit().unwrap());
        assert!(cursor.read_bit().unwrap());
        assert!(cursor.is_exhausted());
        assert!(matches!(cursor.read_bit(), Err(CodecError::CorruptStream(_))));
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let mut buf = BitBuffer::new();
        push_all(&mut buf, &[0, 1, 1, 0, 1, 0, 0, 1, 1, 1]);
        let rebuilt = BitBuffer::from_parts(buf.to_byte_array(), buf.free_bits()).unwrap();
        assert_eq!(rebuilt, buf);
        assert_eq!(rebuilt.get(1), Some(true));
        assert_eq!(rebuilt.get(10), None);
    }

    #[test]
    fn test_from_parts_rejects_bad_layouts() {
        assert!(BitBuffer::from_parts(vec![0x00], 8).is_err());
        assert!(BitBuffer::from_parts(vec![], 3).is_err());
        // low bit set inside the padding
        assert!(BitBuffer::from_parts(vec![0b1000_0001], 1).is_err());
        assert!(BitBuffer::from_parts(vec![0b1000_0000], 7).is_ok());
    }
}
