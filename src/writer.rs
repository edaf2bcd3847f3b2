//! Scoped byte-sink writer for container fields.
//!
//! Multi-byte integers are little-endian. The sink is flushed by `finish`,
//! and on drop as a last resort when a write path bails out early.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bitstream_io::{ByteWrite, ByteWriter, LittleEndian};
use tracing::debug;

use crate::bitbuf::BitBuffer;
use crate::error::{CodecError, Result};

pub struct BitStreamWriter<W: Write> {
    inner: Option<ByteWriter<W, LittleEndian>>,
    bytes_written: u64,
}

impl BitStreamWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and writes into it.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| CodecError::NotWritable(format!("{}: {}", path.display(), e)))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> BitStreamWriter<W> {
    /// Takes ownership of `sink`. A zero-length write probes it first, so a
    /// handle opened without write access is refused here.
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write(&[])
            .map_err(|e| CodecError::NotWritable(e.to_string()))?;
        Ok(Self {
            inner: Some(ByteWriter::endian(sink, LittleEndian)),
            bytes_written: 0,
        })
    }

    fn sink(&mut self) -> Result<&mut ByteWriter<W, LittleEndian>> {
        self.inner
            .as_mut()
            .ok_or_else(|| CodecError::NotWritable("writer already finished".into()))
    }

    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.sink()?.write::<u8>(b)?;
        self.bytes_written += 1;
        Ok(())
    }

    pub fn write_u32(&mut self, n: u32) -> Result<()> {
        self.sink()?.write::<u32>(n)?;
        self.bytes_written += 4;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink()?.write_bytes(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Writes `byte_count` (4 bytes), `free_bits` (1 byte), then the packed bytes.
    pub fn write_bit_buffer(&mut self, buffer: &BitBuffer) -> Result<()> {
        let byte_count = u32::try_from(buffer.byte_count()).map_err(|_| {
            CodecError::InputTooLarge {
                size: buffer.byte_count(),
                limit: u32::MAX as usize,
            }
        })?;
        self.write_u32(byte_count)?;
        self.write_byte(buffer.free_bits())?;
        self.write_bytes(buffer.as_bytes())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and hands the sink back.
    pub fn finish(mut self) -> Result<W> {
        let writer = self
            .inner
            .take()
            .ok_or_else(|| CodecError::NotWritable("writer already finished".into()))?;
        let mut sink = writer.into_writer();
        sink.flush()?;
        debug!(bytes = self.bytes_written, "bit stream writer finished");
        Ok(sink)
    }
}

impl<W: Write> Drop for BitStreamWriter<W> {
    fn drop(&mut self) {
        if let Some(writer) = self.inner.as_mut() {
            let _ = writer.writer().flush();
        }
    }
}
