//! On-disk container layout.
//!
//! ```text
//! [symbol_count:u32le] { [symbol:u8][frequency:u32le] } * symbol_count
//! [packed_len:u32le][free_bits:u8][packed bytes ...]
//! ```
//!
//! Symbol/frequency pairs appear in frequency-table order, which the decoder
//! relies on to rebuild the same tree.

use std::io::Write;

use bitstream_io::{ByteRead, ByteReader, LittleEndian};

use crate::bitbuf::BitBuffer;
use crate::error::{CodecError, Result};
use crate::frequency::FrequencyTable;
use crate::writer::BitStreamWriter;

const PAIR_LEN: usize = 5;
const BITS_HEADER_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContainer {
    table: FrequencyTable,
    bits: BitBuffer,
}

impl EncodedContainer {
    pub fn new(table: FrequencyTable, bits: BitBuffer) -> Self {
        Self { table, bits }
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Number of bytes the container decodes to.
    pub fn original_len(&self) -> u64 {
        self.table.total()
    }

    pub fn serialized_len(&self) -> usize {
        4 + PAIR_LEN * self.table.len() + BITS_HEADER_LEN + self.bits.byte_count()
    }

    pub fn write_to<W: Write>(&self, writer: &mut BitStreamWriter<W>) -> Result<()> {
        writer.write_u32(self.table.len() as u32)?;
        for &(symbol, count) in self.table.entries() {
            writer.write_byte(symbol)?;
            writer.write_u32(count)?;
        }
        writer.write_bit_buffer(&self.bits)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BitStreamWriter::new(Vec::with_capacity(self.serialized_len()))?;
        self.write_to(&mut writer)?;
        writer.finish()
    }

    /// Parses a complete container. Any inconsistency in the header, a short
    /// packed-bits block or trailing data is reported as a corrupt stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(data);

        let symbol_count = reader.read_u32("symbol count")? as usize;
        if symbol_count > 256 {
            return Err(CodecError::corrupt(format!(
                "symbol count {} exceeds alphabet size",
                symbol_count
            )));
        }
        if symbol_count * PAIR_LEN > reader.remaining() {
            return Err(CodecError::corrupt(format!(
                "symbol count {} exceeds remaining {} bytes",
                symbol_count,
                reader.remaining()
            )));
        }
        let mut entries = Vec::with_capacity(symbol_count);
        for _ in 0..symbol_count {
            let symbol = reader.read_u8("symbol")?;
            let count = reader.read_u32("frequency")?;
            entries.push((symbol, count));
        }
        let table = FrequencyTable::from_entries(entries)?;

        let packed_len = reader.read_u32("packed length")? as usize;
        let free_bits = reader.read_u8("free bit count")?;
        let packed = reader.read_vec(packed_len, "packed bits")?;
        if reader.remaining() != 0 {
            return Err(CodecError::corrupt(format!(
                "{} trailing bytes after packed bits",
                reader.remaining()
            )));
        }
        let bits = BitBuffer::from_parts(packed, free_bits)?;

        Ok(Self { table, bits })
    }
}

struct FieldReader<'a> {
    inner: ByteReader<&'a [u8], LittleEndian>,
    remaining: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            inner: ByteReader::endian(data, LittleEndian),
            remaining: data.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.remaining
    }

    fn take(&mut self, len: usize, field: &str) -> Result<()> {
        if len > self.remaining {
            return Err(CodecError::corrupt(format!(
                "truncated {}: need {} bytes, {} left",
                field, len, self.remaining
            )));
        }
        self.remaining -= len;
        Ok(())
    }

    fn read_u8(&mut self, field: &str) -> Result<u8> {
        self.take(1, field)?;
        self.inner
            .read::<u8>()
            .map_err(|e| CodecError::corrupt(format!("{}: {}", field, e)))
    }

    fn read_u32(&mut self, field: &str) -> Result<u32> {
        self.take(4, field)?;
        self.inner
            .read::<u32>()
            .map_err(|e| CodecError::corrupt(format!("{}: {}", field, e)))
    }

    fn read_vec(&mut self, len: usize, field: &str) -> Result<Vec<u8>> {
        self.take(len, field)?;
        let mut buf = vec![0u8; len];
        self.inner
            .read_bytes(&mut buf)
            .map_err(|e| CodecError::corrupt(format!("{}: {}", field, e)))?;
        Ok(buf)
    }
}
