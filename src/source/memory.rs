//! Memory-backed source whose window is the whole region.

use super::{ByteOrder, Capabilities, Source};
use crate::{
    Error::{Closed, EndOfData},
    Result,
};

/// Source backed by a memory region.
///
/// The window is the whole region, so `fill` and `flush` never move data and every seek is
/// a window hit. The region has a fixed size; writes past its end fail instead of growing.
#[derive(Debug)]
pub struct MemorySource {
    data: Vec<u8>,
    cursor: usize,
    order: ByteOrder,
    capabilities: Capabilities,
    closed: bool,
}

impl MemorySource {
    /// Create a new readable and writable memory source
    ///
    /// ## Arguments
    /// * 'data' - The data buffer to consume
    pub fn new(data: Vec<u8>) -> MemorySource {
        MemorySource::with_capabilities(
            data,
            Capabilities::READABLE | Capabilities::WRITABLE | Capabilities::SEEKABLE,
        )
    }

    /// Create a new memory source that rejects writes
    ///
    /// ## Arguments
    /// * 'data' - The data buffer to consume
    pub fn read_only(data: Vec<u8>) -> MemorySource {
        MemorySource::with_capabilities(data, Capabilities::READABLE | Capabilities::SEEKABLE)
    }

    fn with_capabilities(data: Vec<u8>, capabilities: Capabilities) -> MemorySource {
        MemorySource {
            data,
            cursor: 0,
            order: ByteOrder::default(),
            capabilities,
            closed: false,
        }
    }

    /// Returns the whole region, independent of the cursor.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the source and returns the region.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Closed);
        }
        Ok(())
    }
}

impl Source for MemorySource {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        self.require(Capabilities::READABLE)?;

        let count = dst.len().min(self.remaining());
        dst[..count].copy_from_slice(&self.data[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }

    fn write(&mut self, src: &[u8]) -> Result<usize> {
        self.check_open()?;
        self.require(Capabilities::WRITABLE)?;

        if !src.is_empty() && self.remaining() == 0 {
            return Err(EndOfData {
                requested: src.len(),
                available: 0,
            });
        }

        let count = src.len().min(self.remaining());
        self.data[self.cursor..self.cursor + count].copy_from_slice(&src[..count]);
        self.cursor += count;
        Ok(count)
    }

    fn request_read(&mut self, n: usize) -> Result<&[u8]> {
        self.check_open()?;
        self.require(Capabilities::READABLE)?;

        if self.remaining() < n {
            return Err(EndOfData {
                requested: n,
                available: self.remaining(),
            });
        }

        let start = self.cursor;
        self.cursor += n;
        Ok(&self.data[start..start + n])
    }

    fn request_write(&mut self, n: usize) -> Result<&mut [u8]> {
        self.check_open()?;
        self.require(Capabilities::WRITABLE)?;

        if self.remaining() < n {
            return Err(EndOfData {
                requested: n,
                available: self.remaining(),
            });
        }

        let start = self.cursor;
        self.cursor += n;
        Ok(&mut self.data[start..start + n])
    }

    fn fill(&mut self) -> Result<usize> {
        self.check_open()?;
        Ok(0)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()
    }

    fn position(&self) -> Result<u64> {
        self.check_open()?;
        Ok(self.cursor as u64)
    }

    fn size(&mut self) -> Result<u64> {
        self.check_open()?;
        Ok(self.data.len() as u64)
    }

    fn seek(&mut self, target: u64) -> Result<()> {
        self.check_open()?;

        if target > self.data.len() as u64 {
            return Err(invalid_argument!(
                "seek target {} beyond region of {} bytes",
                target,
                self.data.len()
            ));
        }

        self.cursor = target as usize;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
