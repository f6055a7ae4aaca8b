//! Buffered byte sources over heterogeneous backing stores.
//!
//! This module provides the buffering contract that every reader and writer in this crate
//! is built on. A [`crate::source::Source`] presents one fixed-capacity *window* of bytes
//! over its backing store and guarantees that a request for `n` contiguous bytes either
//! succeeds or fails cleanly, independent of whether the bytes live in memory, arrive from
//! a one-directional stream, or are paged in from a seekable file.
//!
//! # Architecture
//!
//! The module is built around a small number of components:
//!
//! - **Source contract** - the [`crate::source::Source`] trait with window requests,
//!   channel-style transfers, fill/flush and positioning
//! - **Capabilities** - a [`crate::source::Capabilities`] set fixed at construction, never
//!   discovered at call time
//! - **Memory variant** - [`crate::source::MemorySource`], the window *is* the region
//! - **Channel variants** - [`crate::source::BufferedSource`] driving a
//!   [`crate::source::Channel`] ([`crate::source::Inbound`], [`crate::source::Outbound`] or
//!   [`crate::source::Seekable`]) through a double-buffered window
//!
//! # Capability Matrix
//!
//! | variant | readable | writable | growable | seekable |
//! |---|---|---|---|---|
//! | [`MemorySource`] | yes | unless read-only | no | yes |
//! | [`BufferedSource`] over [`Inbound`] | yes | no | no | no |
//! | [`BufferedSource`] over [`Outbound`] | no | yes | yes | no |
//! | [`BufferedSource`] over [`Seekable`] | probed | probed | no | yes |
//!
//! # Window Bookkeeping
//!
//! Every source keeps `position() == base + cursor`, where `base` is the absolute offset of
//! the first window byte. A seek that lands inside `[base, base + limit)` only moves the
//! cursor; everything else flushes pending writes, repositions the backing store and
//! refills. Locally clustered access therefore never costs a syscall per seek.
//!
//! # Examples
//!
//! ```rust
//! use binbuf::source::{Capabilities, MemorySource, Source};
//!
//! let mut source = MemorySource::new(vec![0u8; 16]);
//! assert!(source.capabilities().contains(Capabilities::SEEKABLE));
//!
//! source.request_write(4)?.copy_from_slice(&[1, 2, 3, 4]);
//! source.seek(0)?;
//! assert_eq!(source.request_read(4)?, &[1, 2, 3, 4]);
//! # Ok::<(), binbuf::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Sources are single-cursor objects. Every mutating operation takes `&mut self`, so sharing
//! one source between threads requires the caller to serialize access explicitly.

mod buffered;
mod channel;
mod memory;

pub use buffered::{BufferedSource, FileSource};
pub use channel::{Channel, Inbound, Outbound, Seekable};
pub use memory::MemorySource;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::{Error::MissingCapability, Result};

/// Default window capacity of a [`BufferedSource`] in bytes.
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Smallest window a [`BufferedSource`] accepts, wide enough for any primitive value.
pub const MIN_CAPACITY: usize = 8;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Capabilities of a [`Source`], fixed when the source is constructed.
    pub struct Capabilities : u8 {
        /// Bytes can be read from the source
        const READABLE = 0x01;
        /// Bytes can be written to the source
        const WRITABLE = 0x02;
        /// Writes past the end extend the logical stream instead of failing
        const GROWABLE = 0x04;
        /// The source supports `position`, `size` and `seek`
        const SEEKABLE = 0x08;
    }
}

/// Byte order applied when decoding or encoding multi-byte values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ByteOrder {
    /// Most significant byte first (network order)
    #[default]
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}

impl ByteOrder {
    /// Returns the byte order of the platform this code runs on.
    #[must_use]
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }
}

/// Construction parameters for buffered sources.
///
/// # Examples
///
/// ```rust
/// use binbuf::source::{ByteOrder, SourceConfig};
///
/// let config = SourceConfig::default()
///     .with_capacity(64)
///     .with_byte_order(ByteOrder::LittleEndian)
///     .with_owns_backing(false);
/// assert_eq!(config.capacity, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Window capacity in bytes, raised to [`MIN_CAPACITY`] when smaller
    pub capacity: usize,
    /// Initial byte order of the source
    pub byte_order: ByteOrder,
    /// Whether `close()` releases the backing store
    pub owns_backing: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            capacity: DEFAULT_CAPACITY,
            byte_order: ByteOrder::default(),
            owns_backing: true,
        }
    }
}

impl SourceConfig {
    /// Sets the window capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the initial byte order.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Sets whether the source owns, and therefore releases, its backing store.
    #[must_use]
    pub fn with_owns_backing(mut self, owns_backing: bool) -> Self {
        self.owns_backing = owns_backing;
        self
    }
}

/// The buffering contract shared by all byte sources.
///
/// A source owns one window of bytes and a cursor inside it. Readers and writers obtain
/// contiguous byte ranges through [`Source::request_read`] and [`Source::request_write`]
/// and decode or encode values directly in place, so no intermediate copy is needed for
/// primitive access.
///
/// The trait is object safe; `Box<dyn Source>` and `&mut S` are sources as well.
pub trait Source {
    /// Returns the capability set fixed at construction.
    fn capabilities(&self) -> Capabilities;

    /// Returns the byte order used for multi-byte values.
    fn byte_order(&self) -> ByteOrder;

    /// Changes the byte order; the next primitive access uses the new order.
    fn set_byte_order(&mut self, order: ByteOrder);

    /// Returns the window capacity in bytes.
    fn capacity(&self) -> usize;

    /// Returns the number of bytes readable from the window without further I/O.
    fn remaining(&self) -> usize;

    /// Channel-style read into `dst`.
    ///
    /// Returns the number of bytes moved, `0` once the source has no more data.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-readable source, or the
    /// backing store's error.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize>;

    /// Channel-style write from `src`.
    ///
    /// Returns the number of bytes accepted, which may be less than `src.len()`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-writable source and
    /// [`crate::Error::EndOfData`] when a non-growable source cannot take a single byte.
    fn write(&mut self, src: &[u8]) -> Result<usize>;

    /// Returns exactly `n` contiguous bytes at the cursor and advances past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if `n` bytes are not available even after a
    /// refill.
    fn request_read(&mut self, n: usize) -> Result<&[u8]>;

    /// Returns exactly `n` writable contiguous bytes at the cursor, advances past them and
    /// marks them dirty.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source cannot provide `n`
    /// bytes after a flush and refill cycle.
    fn request_write(&mut self, n: usize) -> Result<&mut [u8]>;

    /// Refills the window from the backing store, returning the number of new bytes.
    ///
    /// # Errors
    /// Returns the backing store's error.
    fn fill(&mut self) -> Result<usize>;

    /// Writes pending dirty bytes to the backing store.
    ///
    /// # Errors
    /// Returns the backing store's error; the window content is undefined afterwards.
    fn flush(&mut self) -> Result<()>;

    /// Returns the absolute logical position of the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source.
    fn position(&self) -> Result<u64>;

    /// Returns the logical size of the source.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source.
    fn size(&mut self) -> Result<u64>;

    /// Moves the cursor to the absolute position `target`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source and
    /// [`crate::Error::InvalidArgument`] if `target` lies beyond `size()`.
    fn seek(&mut self, target: u64) -> Result<()>;

    /// Flushes pending data and releases the backing store if the source owns it.
    ///
    /// # Errors
    /// Returns the flush error; the backing store is released regardless.
    fn close(&mut self) -> Result<()>;

    /// Returns `true` once [`Source::close`] has been called.
    fn is_closed(&self) -> bool;

    /// Returns `true` if the source can be read.
    fn is_readable(&self) -> bool {
        self.capabilities().contains(Capabilities::READABLE)
    }

    /// Returns `true` if the source can be written.
    fn is_writable(&self) -> bool {
        self.capabilities().contains(Capabilities::WRITABLE)
    }

    /// Returns `true` if writes past the end grow the source.
    fn is_growable(&self) -> bool {
        self.capabilities().contains(Capabilities::GROWABLE)
    }

    /// Returns `true` if the source supports positioning.
    fn is_seekable(&self) -> bool {
        self.capabilities().contains(Capabilities::SEEKABLE)
    }

    /// Fails with [`crate::Error::MissingCapability`] unless all of `required` are present.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] naming the missing flags.
    fn require(&self, required: Capabilities) -> Result<()> {
        let missing = required.difference(self.capabilities());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingCapability(missing))
        }
    }
}

macro_rules! forward_source {
    () => {
        fn capabilities(&self) -> Capabilities {
            (**self).capabilities()
        }

        fn byte_order(&self) -> ByteOrder {
            (**self).byte_order()
        }

        fn set_byte_order(&mut self, order: ByteOrder) {
            (**self).set_byte_order(order);
        }

        fn capacity(&self) -> usize {
            (**self).capacity()
        }

        fn remaining(&self) -> usize {
            (**self).remaining()
        }

        fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
            (**self).read(dst)
        }

        fn write(&mut self, src: &[u8]) -> Result<usize> {
            (**self).write(src)
        }

        fn request_read(&mut self, n: usize) -> Result<&[u8]> {
            (**self).request_read(n)
        }

        fn request_write(&mut self, n: usize) -> Result<&mut [u8]> {
            (**self).request_write(n)
        }

        fn fill(&mut self) -> Result<usize> {
            (**self).fill()
        }

        fn flush(&mut self) -> Result<()> {
            (**self).flush()
        }

        fn position(&self) -> Result<u64> {
            (**self).position()
        }

        fn size(&mut self) -> Result<u64> {
            (**self).size()
        }

        fn seek(&mut self, target: u64) -> Result<()> {
            (**self).seek(target)
        }

        fn close(&mut self) -> Result<()> {
            (**self).close()
        }

        fn is_closed(&self) -> bool {
            (**self).is_closed()
        }
    };
}

impl<S: Source + ?Sized> Source for &mut S {
    forward_source!();
}

impl<S: Source + ?Sized> Source for Box<S> {
    forward_source!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn config_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert!(config.owns_backing);
    }

    #[test]
    fn require_names_missing_flags() {
        let source = MemorySource::read_only(vec![0; 4]);
        assert!(source.require(Capabilities::READABLE).is_ok());

        match source.require(Capabilities::READABLE | Capabilities::WRITABLE) {
            Err(Error::MissingCapability(missing)) => {
                assert_eq!(missing, Capabilities::WRITABLE);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn boxed_and_borrowed_sources_forward() {
        let mut memory = MemorySource::new(vec![1, 2, 3, 4]);
        {
            let mut borrowed: &mut MemorySource = &mut memory;
            assert_eq!(Source::request_read(&mut borrowed, 2).unwrap(), &[1, 2]);
        }
        assert_eq!(memory.position().unwrap(), 2);

        let mut boxed: Box<dyn Source> = Box::new(memory);
        assert!(boxed.is_seekable());
        assert_eq!(boxed.request_read(2).unwrap(), &[3, 4]);
        assert_eq!(boxed.remaining(), 0);
    }

    #[test]
    fn native_order_matches_target() {
        let probe = 1u16.to_ne_bytes();
        let expected = if probe[0] == 1 {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        assert_eq!(ByteOrder::native(), expected);
    }
}
