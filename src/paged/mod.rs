//! Random access to large files through fixed-size memory-mapped pages.
//!
//! A [`PagedFile`] splits a file into pages of `page_size` bytes and maps every one of them
//! when the file is opened. Each mapping extends `margin` bytes into the following page, so
//! any scalar of up to eight bytes that starts inside a page is fully contained in that
//! page's own mapping. Scalar access therefore resolves an offset to one page and one local
//! offset and never has to stitch values together; only bulk byte transfers loop over
//! pages.
//!
//! The overlap is shared, not copied: all pages map the same file, so a value written
//! across a page boundary through one page is immediately visible through the next.
//!
//! # Examples
//!
//! ```rust
//! use binbuf::paged::{PagedConfig, PagedFile};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("pages.bin");
//! let config = PagedConfig::default().with_page_size(4096);
//!
//! let mut file = PagedFile::create_with_config(&path, 10_000, config.clone())?;
//! file.put::<u32>(4094, 0xCAFE_BABE)?;
//! file.close()?;
//!
//! let file = PagedFile::open_with_config(&path, config.with_read_only(true))?;
//! assert_eq!(file.page_count(), 3);
//! assert_eq!(file.get::<u32>(4094)?, 0xCAFE_BABE);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Thread Safety
//!
//! Reads take `&self` and writes take `&mut self`, so a [`PagedFile`] can be shared for
//! concurrent reading but needs exclusive access for writing.

use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::{
    codec::io::{read_at, write_at, Primitive},
    source::{ByteOrder, Capabilities},
    Error::{Closed, MissingCapability},
    Result,
};

/// Default page size of a [`PagedFile`], 1 GiB.
pub const DEFAULT_PAGE_SIZE: u64 = 1 << 30;

/// Default and minimum overlap between adjacent pages, wide enough for any scalar.
pub const DEFAULT_MARGIN: u64 = 8;

/// Construction parameters for a [`PagedFile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagedConfig {
    /// Bytes covered by one page, excluding the margin
    pub page_size: u64,
    /// Bytes each page extends into the next one, at least [`DEFAULT_MARGIN`]
    pub margin: u64,
    /// Map pages read-only; writes then fail
    pub read_only: bool,
    /// Initial byte order for scalar access
    pub byte_order: ByteOrder,
}

impl Default for PagedConfig {
    fn default() -> Self {
        PagedConfig {
            page_size: DEFAULT_PAGE_SIZE,
            margin: DEFAULT_MARGIN,
            read_only: false,
            byte_order: ByteOrder::default(),
        }
    }
}

impl PagedConfig {
    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the overlap between adjacent pages.
    #[must_use]
    pub fn with_margin(mut self, margin: u64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets whether pages are mapped read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the initial byte order.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(invalid_argument!("page size must be positive"));
        }
        if self.margin < DEFAULT_MARGIN {
            return Err(invalid_argument!(
                "page margin must be at least {} bytes, got {}",
                DEFAULT_MARGIN,
                self.margin
            ));
        }
        if usize::try_from(self.page_size.saturating_add(self.margin)).is_err() {
            return Err(invalid_argument!(
                "page of {} bytes plus margin {} does not fit the address space",
                self.page_size,
                self.margin
            ));
        }
        Ok(())
    }
}

enum Page {
    ReadOnly(Mmap),
    ReadWrite(MmapMut),
}

impl Page {
    fn bytes(&self) -> &[u8] {
        match self {
            Page::ReadOnly(map) => &map[..],
            Page::ReadWrite(map) => &map[..],
        }
    }

    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match self {
            Page::ReadOnly(_) => Err(MissingCapability(Capabilities::WRITABLE)),
            Page::ReadWrite(map) => Ok(&mut map[..]),
        }
    }
}

/// A file accessed through eagerly mapped, overlapping pages.
///
/// Absolute accessors ([`PagedFile::get`], [`PagedFile::put`], [`PagedFile::get_bytes`],
/// [`PagedFile::put_bytes`]) never touch the cursor; relative accessors
/// ([`PagedFile::read`], [`PagedFile::write`], [`PagedFile::read_bytes`],
/// [`PagedFile::write_bytes`]) advance it by the number of bytes transferred.
pub struct PagedFile {
    pages: Vec<Page>,
    size: u64,
    page_size: u64,
    read_only: bool,
    order: ByteOrder,
    position: u64,
    closed: bool,
}

impl PagedFile {
    /// Opens an existing file read-write with the default [`PagedConfig`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, PagedConfig::default())
    }

    /// Opens an existing file and maps all of its pages.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for an invalid configuration and
    /// [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn open_with_config(path: impl AsRef<Path>, config: PagedConfig) -> Result<Self> {
        config.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .write(!config.read_only)
            .open(path)?;
        let size = file.metadata()?.len();
        Self::map(&file, size, &config)
    }

    /// Creates, or truncates, a file of `size` bytes and maps it read-write.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be created, sized or mapped.
    pub fn create(path: impl AsRef<Path>, size: u64) -> Result<Self> {
        Self::create_with_config(path, size, PagedConfig::default())
    }

    /// Creates, or truncates, a file of `size` bytes with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for an invalid or read-only configuration
    /// and [`crate::Error::FileError`] if the file cannot be created, sized or mapped.
    pub fn create_with_config(
        path: impl AsRef<Path>,
        size: u64,
        config: PagedConfig,
    ) -> Result<Self> {
        config.validate()?;
        if config.read_only {
            return Err(invalid_argument!("cannot create a read-only paged file"));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size)?;
        Self::map(&file, size, &config)
    }

    fn map(file: &File, size: u64, config: &PagedConfig) -> Result<Self> {
        let page_count = size.div_ceil(config.page_size);
        let mut pages = Vec::with_capacity(page_count as usize);

        for index in 0..page_count {
            let start = index * config.page_size;
            let end = start
                .saturating_add(config.page_size)
                .saturating_add(config.margin)
                .min(size);
            let mut options = MmapOptions::new();
            options.offset(start).len((end - start) as usize);

            // SAFETY: the mapping is only valid while no other process truncates the file;
            // that is a documented requirement of memory-mapped access.
            let page = if config.read_only {
                Page::ReadOnly(unsafe { options.map(file)? })
            } else {
                Page::ReadWrite(unsafe { options.map_mut(file)? })
            };
            pages.push(page);
        }

        tracing::debug!(
            size,
            page_size = config.page_size,
            margin = config.margin,
            pages = pages.len(),
            read_only = config.read_only,
            "mapped paged file"
        );

        Ok(PagedFile {
            pages,
            size,
            page_size: config.page_size,
            read_only: config.read_only,
            order: config.byte_order,
            position: 0,
            closed: false,
        })
    }

    /// Returns the size of the file in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Returns `true` if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if the pages were mapped read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the number of mapped pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the byte order used for scalar access.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Changes the byte order for all following scalar accesses.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Returns the cursor used by the relative accessors.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Moves the cursor used by the relative accessors.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `position` lies beyond the end.
    pub fn set_position(&mut self, position: u64) -> Result<()> {
        if position > self.size {
            return Err(invalid_argument!(
                "position {} beyond file size {}",
                position,
                self.size
            ));
        }
        self.position = position;
        Ok(())
    }

    /// Resolves `len` bytes at `offset` to a page index and a local offset in that page.
    fn locate(&self, offset: u64, len: usize) -> Result<(usize, usize)> {
        if self.closed {
            return Err(Closed);
        }

        let Some(end) = offset.checked_add(len as u64) else {
            return Err(out_of_bounds_error!());
        };
        if end > self.size {
            return Err(out_of_bounds_error!());
        }

        Ok((
            (offset / self.page_size) as usize,
            (offset % self.page_size) as usize,
        ))
    }

    fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or(out_of_bounds_error!())
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut Page> {
        self.pages.get_mut(index).ok_or(out_of_bounds_error!())
    }

    fn require_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(MissingCapability(Capabilities::WRITABLE));
        }
        Ok(())
    }

    /// Reads a scalar at the absolute `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the end of the file.
    pub fn get<T: Primitive>(&self, offset: u64) -> Result<T> {
        let (index, mut local) = self.locate(offset, T::WIDTH)?;
        read_at(self.page(index)?.bytes(), &mut local, self.order)
    }

    /// Writes a scalar at the absolute `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] if the value extends past the end of the file.
    pub fn put<T: Primitive>(&mut self, offset: u64, value: T) -> Result<()> {
        self.require_writable()?;
        let (index, mut local) = self.locate(offset, T::WIDTH)?;
        let order = self.order;
        write_at(self.page_mut(index)?.bytes_mut()?, &mut local, order, value)
    }

    /// Reads a byte at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_u8(&self, offset: u64) -> Result<u8> {
        self.get(offset)
    }

    /// Reads a 16-bit character code at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_char(&self, offset: u64) -> Result<u16> {
        self.get(offset)
    }

    /// Reads an `i16` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_i16(&self, offset: u64) -> Result<i16> {
        self.get(offset)
    }

    /// Reads an `i32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_i32(&self, offset: u64) -> Result<i32> {
        self.get(offset)
    }

    /// Reads an `i64` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_i64(&self, offset: u64) -> Result<i64> {
        self.get(offset)
    }

    /// Reads an `f32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_f32(&self, offset: u64) -> Result<f32> {
        self.get(offset)
    }

    /// Reads an `f64` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn get_f64(&self, offset: u64) -> Result<f64> {
        self.get(offset)
    }

    /// Writes a byte at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_u8(&mut self, offset: u64, value: u8) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes a 16-bit character code at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_char(&mut self, offset: u64, value: u16) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes an `i16` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_i16(&mut self, offset: u64, value: i16) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes an `i32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_i32(&mut self, offset: u64, value: i32) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes an `i64` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_i64(&mut self, offset: u64, value: i64) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes an `f32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_f32(&mut self, offset: u64, value: f32) -> Result<()> {
        self.put(offset, value)
    }

    /// Writes an `f64` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] past the end of the file.
    pub fn put_f64(&mut self, offset: u64, value: f64) -> Result<()> {
        self.put(offset, value)
    }

    /// Reads a scalar at the cursor and advances it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the end of the file.
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        let value = self.get(self.position)?;
        self.position += T::WIDTH as u64;
        Ok(value)
    }

    /// Writes a scalar at the cursor and advances it.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] if the value extends past the end of the file.
    pub fn write<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.put(self.position, value)?;
        self.position += T::WIDTH as u64;
        Ok(())
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`, page by page.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range extends past the end of the file.
    pub fn get_bytes(&self, offset: u64, dst: &mut [u8]) -> Result<()> {
        self.locate(offset, dst.len())?;

        let mut done = 0;
        while done < dst.len() {
            let (index, local) = self.locate(offset + done as u64, 0)?;
            let page = self.page(index)?.bytes();
            let count = (dst.len() - done).min(self.page_size as usize - local);

            dst[done..done + count].copy_from_slice(&page[local..local + count]);
            done += count;
        }
        Ok(())
    }

    /// Copies `src` into the file starting at `offset`, page by page.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] if the range extends past the end of the file.
    pub fn put_bytes(&mut self, offset: u64, src: &[u8]) -> Result<()> {
        self.require_writable()?;
        self.locate(offset, src.len())?;

        let mut done = 0;
        while done < src.len() {
            let (index, local) = self.locate(offset + done as u64, 0)?;
            let count = (src.len() - done).min(self.page_size as usize - local);
            let page = self.page_mut(index)?.bytes_mut()?;

            page[local..local + count].copy_from_slice(&src[done..done + count]);
            done += count;
        }
        Ok(())
    }

    /// Fills `dst` from the cursor and advances it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range extends past the end of the file.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.get_bytes(self.position, dst)?;
        self.position += dst.len() as u64;
        Ok(())
    }

    /// Writes `src` at the cursor and advances it.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a read-only file and
    /// [`crate::Error::OutOfBounds`] if the range extends past the end of the file.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.put_bytes(self.position, src)?;
        self.position += src.len() as u64;
        Ok(())
    }

    /// Synchronizes all read-write pages with the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if a page fails to sync.
    pub fn flush(&self) -> Result<()> {
        if self.closed {
            return Err(Closed);
        }

        for page in &self.pages {
            if let Page::ReadWrite(map) = page {
                map.flush()?;
            }
        }
        Ok(())
    }

    /// Flushes and then unmaps all pages at once. Idempotent.
    ///
    /// # Errors
    /// Returns the flush error; the pages are unmapped regardless.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let flushed = self.flush();
        self.pages.clear();
        self.closed = true;
        tracing::debug!(size = self.size, "unmapped paged file");
        flushed
    }

    /// Returns `true` once [`PagedFile::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for PagedFile {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(%error, "failed to flush paged file on drop");
        }
    }
}

impl std::fmt::Debug for PagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedFile")
            .field("size", &self.size)
            .field("page_size", &self.page_size)
            .field("pages", &self.pages.len())
            .field("read_only", &self.read_only)
            .field("order", &self.order)
            .field("position", &self.position)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::Error;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    fn small_pages() -> PagedConfig {
        PagedConfig::default().with_page_size(64)
    }

    fn fixture(data: &[u8]) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paged.bin");
        std::fs::write(&path, data).unwrap();
        (dir, path)
    }

    #[test]
    fn config_validation() {
        let (_dir, path) = fixture(&[0u8; 16]);

        let config = small_pages().with_margin(4);
        assert!(matches!(
            PagedFile::open_with_config(&path, config),
            Err(Error::InvalidArgument(_))
        ));

        let config = small_pages().with_page_size(0);
        assert!(matches!(
            PagedFile::open_with_config(&path, config),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn scalars_at_page_boundaries_match_reference() {
        let data = pattern(1000);
        let (_dir, path) = fixture(&data);
        let file = PagedFile::open_with_config(&path, small_pages().with_read_only(true)).unwrap();
        assert_eq!(file.page_count(), 16);

        for offset in 0..=(data.len() - 8) {
            let mut reference = [0u8; 8];
            reference.copy_from_slice(&data[offset..offset + 8]);
            assert_eq!(
                file.get::<u64>(offset as u64).unwrap(),
                u64::from_be_bytes(reference),
                "offset {}",
                offset
            );
        }

        let offset = 62;
        assert_eq!(
            file.get_i16(offset).unwrap(),
            i16::from_be_bytes([data[62], data[63]])
        );
        assert_eq!(
            file.get_char(127).unwrap(),
            u16::from_be_bytes([data[127], data[128]])
        );
    }

    #[test]
    fn little_endian_access() {
        let data = pattern(200);
        let (_dir, path) = fixture(&data);
        let config = small_pages().with_byte_order(ByteOrder::LittleEndian);
        let file = PagedFile::open_with_config(&path, config).unwrap();

        assert_eq!(
            file.get_i32(61).unwrap(),
            i32::from_le_bytes([data[61], data[62], data[63], data[64]])
        );
    }

    #[test]
    fn writes_across_boundary_are_visible_from_next_page() {
        let (_dir, path) = fixture(&[0u8; 256]);
        let mut file = PagedFile::open_with_config(&path, small_pages()).unwrap();

        file.put_i32(62, 0x0102_0304).unwrap();
        assert_eq!(file.get_u8(64).unwrap(), 0x03);
        assert_eq!(file.get_u8(65).unwrap(), 0x04);
        assert_eq!(file.get_i32(62).unwrap(), 0x0102_0304);

        file.put_f64(120, 2.5).unwrap();
        file.close().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[62..66], &[1, 2, 3, 4]);
        assert_eq!(&data[120..128], &2.5f64.to_be_bytes());
    }

    #[test]
    fn bulk_transfers_loop_over_pages() {
        let (_dir, path) = fixture(&[0u8; 300]);
        let mut file = PagedFile::open_with_config(&path, small_pages()).unwrap();

        let payload = pattern(200);
        file.put_bytes(50, &payload).unwrap();

        let mut back = vec![0u8; 200];
        file.get_bytes(50, &mut back).unwrap();
        assert_eq!(back, payload);

        let mut empty = [0u8; 0];
        file.get_bytes(300, &mut empty).unwrap();
        assert!(matches!(
            file.get_bytes(250, &mut back),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn relative_access_advances_cursor() {
        let (_dir, path) = fixture(&[0u8; 128]);
        let mut file = PagedFile::open_with_config(&path, small_pages()).unwrap();

        file.set_position(60).unwrap();
        file.write::<u32>(0xAABB_CCDD).unwrap();
        file.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(file.position(), 67);

        file.set_position(60).unwrap();
        assert_eq!(file.read::<u32>().unwrap(), 0xAABB_CCDD);
        let mut tail = [0u8; 3];
        file.read_bytes(&mut tail).unwrap();
        assert_eq!(tail, [1, 2, 3]);
        assert_eq!(file.get_u8(60).unwrap(), 0xAA);
        assert_eq!(file.position(), 67);

        assert!(file.set_position(129).is_err());
    }

    #[test]
    fn read_only_rejects_writes() {
        let (_dir, path) = fixture(&[0u8; 32]);
        let mut file =
            PagedFile::open_with_config(&path, small_pages().with_read_only(true)).unwrap();

        assert!(file.is_read_only());
        assert!(matches!(
            file.put_u8(0, 1),
            Err(Error::MissingCapability(Capabilities::WRITABLE))
        ));
        assert!(matches!(
            file.put_bytes(0, &[1]),
            Err(Error::MissingCapability(_))
        ));
    }

    #[test]
    fn out_of_bounds_and_closed() {
        let (_dir, path) = fixture(&[0u8; 10]);
        let mut file = PagedFile::open_with_config(&path, small_pages()).unwrap();

        assert_eq!(file.len(), 10);
        assert!(file.get::<u16>(8).is_ok());
        assert!(matches!(file.get::<u32>(8), Err(Error::OutOfBounds)));
        assert!(matches!(file.get::<u8>(u64::MAX), Err(Error::OutOfBounds)));

        file.close().unwrap();
        file.close().unwrap();
        assert!(file.is_closed());
        assert!(matches!(file.get::<u8>(0), Err(Error::Closed)));
    }

    #[test]
    fn create_sets_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("created.bin");

        let mut file = PagedFile::create_with_config(&path, 130, small_pages()).unwrap();
        assert_eq!(file.page_count(), 3);
        file.put_i64(122, -1).unwrap();
        drop(file);

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 130);
        assert!(data[122..130].iter().all(|&b| b == 0xFF));

        assert!(matches!(
            PagedFile::create_with_config(&path, 8, small_pages().with_read_only(true)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_file_has_no_pages() {
        let (_dir, path) = fixture(&[]);
        let file = PagedFile::open_with_config(&path, small_pages()).unwrap();

        assert!(file.is_empty());
        assert_eq!(file.page_count(), 0);
        assert!(matches!(file.get::<u8>(0), Err(Error::OutOfBounds)));
    }
}
