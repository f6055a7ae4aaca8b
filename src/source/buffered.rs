//! Double-buffered window over a [`Channel`].
//!
//! [`BufferedSource`] is the workhorse behind every stream and file based reader or writer.
//! It keeps one fixed-capacity window that mirrors the logical byte range
//! `[base, base + limit)` of the backing store, a cursor inside that window and the range
//! of window bytes that were written but not yet flushed.
//!
//! # Fill and Flush
//!
//! - **fill** flushes pending writes, moves the unread tail of the window to its start and
//!   reads from the channel until the window is full or the channel stops making progress.
//!   Seekable channels re-derive `base` from their own position, so the window can never
//!   drift from the file.
//! - **flush** writes the dirty range back (seeking first on seekable channels), clears the
//!   window and leaves the channel positioned at the logical cursor.
//!
//! While the window is clean the channel always sits at `base + limit`, which is what lets
//! both operations, and the direct transfers that bypass the window, pick up exactly where
//! the cursor stands.
//!
//! # Examples
//!
//! ```rust
//! use std::io::Cursor;
//! use binbuf::source::{BufferedSource, Seekable, Source, SourceConfig};
//!
//! let data: Vec<u8> = (0..=255).collect();
//! let channel = Seekable::new(Cursor::new(data));
//! let mut source = BufferedSource::with_config(channel, SourceConfig::default().with_capacity(16));
//!
//! source.seek(200)?;
//! assert_eq!(source.request_read(2)?, &[200, 201]);
//! source.seek(3)?;
//! assert_eq!(source.request_read(1)?, &[3]);
//! # Ok::<(), binbuf::Error>(())
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::ops::Range;
use std::path::Path;

use super::{
    ByteOrder, Capabilities, Channel, Outbound, Seekable, Source, SourceConfig, MIN_CAPACITY,
};
use crate::{
    Error::{Closed, EndOfData},
    Result,
};

/// A [`Source`] that buffers a [`Channel`] through a fixed-capacity window.
///
/// Capabilities are taken from the channel once at construction. Dropping the source
/// flushes pending writes; use [`BufferedSource::close`] to observe flush errors.
pub struct BufferedSource<C: Channel> {
    channel: Option<C>,
    window: Box<[u8]>,
    base: u64,
    cursor: usize,
    limit: usize,
    dirty: Option<Range<usize>>,
    order: ByteOrder,
    capabilities: Capabilities,
    owns_backing: bool,
    closed: bool,
}

/// A buffered source over a random access file.
pub type FileSource = BufferedSource<Seekable<File>>;

impl<C: Channel> BufferedSource<C> {
    /// Creates a buffered source with the default [`SourceConfig`].
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, SourceConfig::default())
    }

    /// Creates a buffered source with an explicit configuration.
    ///
    /// A capacity below [`MIN_CAPACITY`] is raised to it so that every primitive value fits
    /// into one window.
    pub fn with_config(channel: C, config: SourceConfig) -> Self {
        let capacity = config.capacity.max(MIN_CAPACITY);
        let capabilities = channel.capabilities();

        BufferedSource {
            channel: Some(channel),
            window: vec![0u8; capacity].into_boxed_slice(),
            base: 0,
            cursor: 0,
            limit: 0,
            dirty: None,
            order: config.byte_order,
            capabilities,
            owns_backing: config.owns_backing,
            closed: false,
        }
    }

    /// Returns `true` if bytes were written since the last successful flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Returns `true` if [`Source::close`] releases the channel.
    #[must_use]
    pub fn owns_backing(&self) -> bool {
        self.owns_backing
    }

    /// Returns a reference to the channel, `None` once an owning source was closed.
    pub fn get_ref(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    /// Flushes pending writes and hands the channel back to the caller.
    ///
    /// # Errors
    /// Returns the flush error, or [`crate::Error::Closed`] if an owning source already
    /// released its channel.
    pub fn into_inner(mut self) -> Result<C> {
        if !self.closed {
            self.flush()?;
        }
        self.closed = true;
        self.channel.take().ok_or(Closed)
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Closed);
        }
        Ok(())
    }

    fn available(&self) -> usize {
        self.limit - self.cursor
    }

    /// Makes at least `n` bytes writable at the cursor, or fails.
    fn make_room(&mut self, n: usize) -> Result<()> {
        if self.available() >= n {
            return Ok(());
        }

        self.flush()?;
        if self.is_readable() {
            self.fill()?;
        } else if self.is_seekable() {
            // Content is unknown but the extent is not; only dirty bytes are ever written.
            let size = self.size()?;
            let extent = size.saturating_sub(self.base).min(self.window.len() as u64);
            self.limit = self.limit.max(extent as usize);
        }

        if self.available() < n {
            if self.is_growable() {
                self.limit = self.window.len();
            } else {
                return Err(EndOfData {
                    requested: n,
                    available: self.available(),
                });
            }
        }
        Ok(())
    }
}

impl BufferedSource<Seekable<File>> {
    /// Opens an existing file for random access reading.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Self::with_config(Seekable::new(file), config))
    }

    /// Opens an existing file for random access reading and in-place updates.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn open_rw(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::with_config(Seekable::new(file), config))
    }
}

impl BufferedSource<Outbound<File>> {
    /// Creates, or truncates, a file and streams writes into it.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_config(Outbound::new(file), config))
    }
}

impl<C: Channel> Source for BufferedSource<C> {
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
        self.window.len()
    }

    fn remaining(&self) -> usize {
        self.available()
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        self.require(Capabilities::READABLE)?;

        if dst.is_empty() {
            return Ok(0);
        }

        if self.available() == 0 {
            if dst.len() >= self.window.len() {
                self.flush()?;
                let channel = self.channel.as_mut().ok_or(Closed)?;
                let count = channel.read(dst)?;

                self.base += (self.limit + count) as u64;
                self.cursor = 0;
                self.limit = 0;
                tracing::debug!(base = self.base, count, "direct read bypassed window");
                return Ok(count);
            }

            self.fill()?;
            if self.available() == 0 {
                return Ok(0);
            }
        }

        let count = dst.len().min(self.available());
        dst[..count].copy_from_slice(&self.window[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }

    fn write(&mut self, src: &[u8]) -> Result<usize> {
        self.check_open()?;
        self.require(Capabilities::WRITABLE)?;

        if src.is_empty() {
            return Ok(0);
        }

        if src.len() >= self.window.len() {
            self.flush()?;
            let position = self.base + self.cursor as u64;
            let seekable = self.is_seekable();
            let growable = self.is_growable();
            let channel = self.channel.as_mut().ok_or(Closed)?;

            // A fixed-size backing only accepts bytes up to its current end.
            let mut len = src.len();
            if seekable && !growable {
                let room = channel.size()?.saturating_sub(position);
                if room == 0 {
                    return Err(EndOfData {
                        requested: src.len(),
                        available: 0,
                    });
                }
                len = len.min(usize::try_from(room).unwrap_or(usize::MAX));
            }

            if seekable {
                channel.seek(position)?;
            }
            let count = channel.write(&src[..len])?;

            self.base = position + count as u64;
            self.cursor = 0;
            self.limit = 0;
            tracing::debug!(base = self.base, count, "direct write bypassed window");
            return Ok(count);
        }

        self.make_room(1)?;
        let count = src.len().min(self.available());
        self.request_write(count)?.copy_from_slice(&src[..count]);
        Ok(count)
    }

    fn request_read(&mut self, n: usize) -> Result<&[u8]> {
        self.check_open()?;
        self.require(Capabilities::READABLE)?;

        if n > self.window.len() {
            return Err(invalid_argument!(
                "request of {} bytes exceeds window capacity {}",
                n,
                self.window.len()
            ));
        }

        if self.available() < n {
            self.fill()?;
            if self.available() < n {
                return Err(EndOfData {
                    requested: n,
                    available: self.available(),
                });
            }
        }

        let start = self.cursor;
        self.cursor += n;
        Ok(&self.window[start..start + n])
    }

    fn request_write(&mut self, n: usize) -> Result<&mut [u8]> {
        self.check_open()?;
        self.require(Capabilities::WRITABLE)?;

        if n > self.window.len() {
            return Err(invalid_argument!(
                "request of {} bytes exceeds window capacity {}",
                n,
                self.window.len()
            ));
        }

        // Without read access the bytes between two dirty ranges are unknown, so a
        // disjoint write must not be merged into the pending range.
        let disjoint = match &self.dirty {
            Some(dirty) => self.cursor > dirty.end || self.cursor + n < dirty.start,
            None => false,
        };
        if disjoint && !self.is_readable() {
            self.flush()?;
        }

        self.make_room(n)?;

        let start = self.cursor;
        self.cursor += n;
        self.dirty = Some(match self.dirty.take() {
            Some(dirty) => dirty.start.min(start)..dirty.end.max(start + n),
            None => start..start + n,
        });
        Ok(&mut self.window[start..start + n])
    }

    fn fill(&mut self) -> Result<usize> {
        self.check_open()?;
        self.require(Capabilities::READABLE)?;

        if self.dirty.is_some() {
            self.flush()?;
        }

        let unread = self.available();
        self.window.copy_within(self.cursor..self.limit, 0);

        let seekable = self.is_seekable();
        let channel = self.channel.as_mut().ok_or(Closed)?;
        if seekable {
            self.base = channel.position()? - unread as u64;
        } else {
            self.base += self.cursor as u64;
        }
        self.cursor = 0;
        self.limit = unread;

        let mut obtained = 0;
        while self.limit < self.window.len() {
            let count = channel.read(&mut self.window[self.limit..])?;
            if count == 0 {
                break;
            }
            self.limit += count;
            obtained += count;
        }

        tracing::debug!(base = self.base, limit = self.limit, obtained, "filled window");
        Ok(obtained)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()?;

        if !self.is_writable() {
            return Ok(());
        }
        let Some(dirty) = self.dirty.clone() else {
            return Ok(());
        };

        let seekable = self.is_seekable();
        let channel = self.channel.as_mut().ok_or(Closed)?;
        if seekable {
            channel.seek(self.base + dirty.start as u64)?;
        }

        let mut pending = &self.window[dirty.clone()];
        while !pending.is_empty() {
            let count = channel.write(pending)?;
            if count == 0 {
                return Err(io::Error::from(io::ErrorKind::WriteZero).into());
            }
            pending = &pending[count..];
        }
        channel.flush()?;

        self.base += self.cursor as u64;
        self.cursor = 0;
        self.limit = 0;
        self.dirty = None;
        if seekable {
            channel.seek(self.base)?;
        }

        tracing::debug!(
            base = self.base,
            start = dirty.start,
            end = dirty.end,
            "flushed window"
        );
        Ok(())
    }

    fn position(&self) -> Result<u64> {
        self.check_open()?;
        self.require(Capabilities::SEEKABLE)?;
        Ok(self.base + self.cursor as u64)
    }

    fn size(&mut self) -> Result<u64> {
        self.check_open()?;
        self.require(Capabilities::SEEKABLE)?;

        let channel = self.channel.as_mut().ok_or(Closed)?;
        Ok(channel.size()?)
    }

    fn seek(&mut self, target: u64) -> Result<()> {
        self.check_open()?;
        self.require(Capabilities::SEEKABLE)?;

        if target >= self.base && target < self.base + self.limit as u64 {
            self.cursor = (target - self.base) as usize;
            tracing::trace!(target, base = self.base, "seek within window");
            return Ok(());
        }

        let size = self.size()?;
        if target > size {
            return Err(invalid_argument!(
                "seek target {} beyond size {}",
                target,
                size
            ));
        }

        self.flush()?;
        let channel = self.channel.as_mut().ok_or(Closed)?;
        channel.seek(target)?;
        self.base = target;
        self.cursor = 0;
        self.limit = 0;
        tracing::debug!(target, "seek outside window");

        if self.is_readable() {
            self.fill()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let flushed = self.flush();
        self.closed = true;
        if self.owns_backing {
            drop(self.channel.take());
        }

        tracing::debug!(owned = self.owns_backing, "closed buffered source");
        flushed
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<C: Channel> Drop for BufferedSource<C> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(%error, "failed to flush buffered source on drop");
        }
    }
}

impl<C: Channel> fmt::Debug for BufferedSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedSource")
            .field("capabilities", &self.capabilities)
            .field("order", &self.order)
            .field("base", &self.base)
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .field("capacity", &self.window.len())
            .field("dirty", &self.dirty)
            .field("closed", &self.closed)
            .finish()
    }
}
