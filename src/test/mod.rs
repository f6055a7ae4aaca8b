use std::io::{self, Read, Write};

/// Deterministic test data, `len` bytes that wrap around every 256.
pub fn sequence(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

/// Stream that moves at most `step` bytes per call, like a pipe or a socket.
///
/// Wrapping a reader or writer in a trickle forces every fill and flush loop to iterate.
pub struct Trickle<T> {
    inner: T,
    step: usize,
}

impl<T> Trickle<T> {
    pub fn new(inner: T, step: usize) -> Self {
        Trickle { inner, step }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.step);
        self.inner.read(&mut buf[..len])
    }
}

impl<W: Write> Write for Trickle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.step);
        self.inner.write(&buf[..len])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Writer that fails every call, used to observe error propagation on flush.
pub struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
    }
}
