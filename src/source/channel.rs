//! Backing stores driven by [`crate::source::BufferedSource`].
//!
//! A [`Channel`] is the raw byte pipe underneath a buffered window. Three adapters cover the
//! backing stores the crate supports:
//!
//! - [`Inbound`] - any [`std::io::Read`], a one-directional input stream
//! - [`Outbound`] - any [`std::io::Write`], a one-directional output stream
//! - [`Seekable`] - any [`std::io::Read`] + [`std::io::Write`] + [`std::io::Seek`], such as a
//!   file or an in-memory cursor
//!
//! Each adapter reports its capabilities once, at construction. [`Seekable`] discovers
//! whether the underlying handle can actually be read or written with a zero-length probe
//! so that, for example, a file opened read-only reports only
//! [`Capabilities::READABLE`] and [`Capabilities::SEEKABLE`].

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::Capabilities;

/// Raw backing store of a [`crate::source::BufferedSource`].
///
/// Operations a channel does not support return an [`io::ErrorKind::Unsupported`] error;
/// the buffered layer never calls them because it checks [`Channel::capabilities`] first.
pub trait Channel {
    /// Returns the capability set determined at construction.
    fn capabilities(&self) -> Capabilities;

    /// Reads up to `buf.len()` bytes, returning `0` at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes up to `buf.len()` bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Pushes bytes buffered by the channel itself down to the operating system.
    fn flush(&mut self) -> io::Result<()>;

    /// Moves the channel to the absolute position `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<u64>;

    /// Returns the current absolute position of the channel.
    fn position(&mut self) -> io::Result<u64>;

    /// Returns the total length of the channel.
    fn size(&mut self) -> io::Result<u64>;
}

fn unsupported(operation: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("channel does not support {operation}"),
    )
}

/// One-directional input channel over a [`Read`] implementation.
#[derive(Debug)]
pub struct Inbound<R> {
    inner: R,
}

impl<R: Read> Inbound<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Inbound { inner }
    }

    /// Returns a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Channel for Inbound<R> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::READABLE
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported("write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek(&mut self, _pos: u64) -> io::Result<u64> {
        Err(unsupported("seek"))
    }

    fn position(&mut self) -> io::Result<u64> {
        Err(unsupported("position"))
    }

    fn size(&mut self) -> io::Result<u64> {
        Err(unsupported("size"))
    }
}

/// One-directional output channel over a [`Write`] implementation.
///
/// An output stream has no end, so buffered sources over it are growable.
#[derive(Debug)]
pub struct Outbound<W> {
    inner: W,
}

impl<W: Write> Outbound<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Outbound { inner }
    }

    /// Returns a reference to the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Channel for Outbound<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::WRITABLE | Capabilities::GROWABLE
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("read"))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn seek(&mut self, _pos: u64) -> io::Result<u64> {
        Err(unsupported("seek"))
    }

    fn position(&mut self) -> io::Result<u64> {
        Err(unsupported("position"))
    }

    fn size(&mut self) -> io::Result<u64> {
        Err(unsupported("size"))
    }
}

/// Random access channel over a [`Read`] + [`Write`] + [`Seek`] implementation.
#[derive(Debug)]
pub struct Seekable<T> {
    inner: T,
    capabilities: Capabilities,
}

impl<T: Read + Write + Seek> Seekable<T> {
    /// Wraps a seekable handle, probing once whether it can be read and written.
    ///
    /// The probe issues a zero-length read and a zero-length write; neither moves the
    /// handle's position or changes its content. A handle that rejects the probe does not
    /// get the corresponding capability.
    pub fn new(mut inner: T) -> Self {
        let mut capabilities = Capabilities::SEEKABLE;
        if inner.read(&mut []).is_ok() {
            capabilities |= Capabilities::READABLE;
        }
        if inner.write(&[]).is_ok() {
            capabilities |= Capabilities::WRITABLE;
        }

        tracing::debug!(?capabilities, "probed seekable channel");
        Seekable {
            inner,
            capabilities,
        }
    }

    /// Returns a reference to the wrapped handle.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwraps the handle.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write + Seek> Channel for Seekable<T> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn seek(&mut self, pos: u64) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(pos))
    }

    fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    fn size(&mut self) -> io::Result<u64> {
        let current = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        if current != end {
            self.inner.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Cursor;

    use super::*;

    #[test]
    fn inbound_is_read_only_stream() {
        let mut channel = Inbound::new(&[1u8, 2, 3][..]);
        assert_eq!(channel.capabilities(), Capabilities::READABLE);

        let mut buf = [0u8; 8];
        assert_eq!(channel.read(&mut buf).unwrap(), 3);
        assert_eq!(
            channel.write(&[1]).unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
        assert!(channel.position().is_err());
    }

    #[test]
    fn outbound_is_growable() {
        let mut channel = Outbound::new(Vec::new());
        assert_eq!(
            channel.capabilities(),
            Capabilities::WRITABLE | Capabilities::GROWABLE
        );

        assert_eq!(channel.write(&[9, 8]).unwrap(), 2);
        assert!(channel.read(&mut [0u8; 1]).is_err());
        assert_eq!(channel.into_inner(), vec![9, 8]);
    }

    #[test]
    fn seekable_cursor_probes_both_directions() {
        let mut channel = Seekable::new(Cursor::new(vec![0u8; 10]));
        assert!(channel.capabilities().contains(
            Capabilities::READABLE | Capabilities::WRITABLE | Capabilities::SEEKABLE
        ));

        assert_eq!(channel.position().unwrap(), 0);
        channel.seek(4).unwrap();
        assert_eq!(channel.size().unwrap(), 10);
        assert_eq!(channel.position().unwrap(), 4);
    }

    #[test]
    fn seekable_read_only_file_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = OpenOptions::new().read(true).open(&path).unwrap();
        let channel = Seekable::new(file);

        assert!(channel.capabilities().contains(Capabilities::READABLE));
        assert!(!channel.capabilities().contains(Capabilities::WRITABLE));
        assert!(!channel.capabilities().contains(Capabilities::GROWABLE));
    }
}
