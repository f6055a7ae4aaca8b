use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use crate::{
    codec::{
        charset::{Charset, PrefixWidth},
        half::f32_to_f16_bits,
        io::Primitive,
    },
    record::Record,
    source::{
        BufferedSource, ByteOrder, Capabilities, MemorySource, Outbound, Seekable, Source,
        SourceConfig,
    },
    Error::EndOfData,
    Result,
};

/// Encodes primitive values, strings and records into a [`Source`].
///
/// The mirror image of [`crate::Reader`]: every fixed-width write requests its bytes from
/// the source window, encodes the value in place and marks the bytes dirty. Nothing
/// reaches the backing store until the window is flushed, either explicitly through
/// [`Writer::flush`] and [`Writer::close`] or implicitly when the window fills up.
///
/// # Examples
///
/// ```rust
/// use binbuf::{ByteOrder, Writer};
///
/// let mut writer = Writer::for_channel(Vec::new());
/// writer.set_byte_order(ByteOrder::LittleEndian);
/// writer.write_i32(0x1122_3344)?;
/// writer.write_string_null("CAT")?;
///
/// let bytes = writer.into_inner().into_inner()?.into_inner();
/// assert_eq!(bytes, [0x44, 0x33, 0x22, 0x11, 0x43, 0x41, 0x54, 0x00]);
/// # Ok::<(), binbuf::Error>(())
/// ```
#[derive(Debug)]
pub struct Writer<S: Source> {
    source: S,
}

impl Writer<MemorySource> {
    /// Creates a writer over a fixed-size memory region.
    ///
    /// Writes past the end of `data` fail with [`crate::Error::EndOfData`].
    pub fn for_memory(data: impl Into<Vec<u8>>) -> Self {
        Writer::new(MemorySource::new(data.into()))
    }
}

impl<W: Write> Writer<BufferedSource<Outbound<W>>> {
    /// Creates a writer over a one-directional output stream.
    pub fn for_channel(inner: W) -> Self {
        Self::for_channel_with_config(inner, SourceConfig::default())
    }

    /// Creates a writer over a one-directional output stream with an explicit configuration.
    pub fn for_channel_with_config(inner: W, config: SourceConfig) -> Self {
        Writer::new(BufferedSource::with_config(Outbound::new(inner), config))
    }
}

impl<T: Read + Write + Seek> Writer<BufferedSource<Seekable<T>>> {
    /// Creates a writer that updates a random access channel in place.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] if the channel cannot be written.
    pub fn for_seekable_channel(inner: T) -> Result<Self> {
        Self::for_seekable_channel_with_config(inner, SourceConfig::default())
    }

    /// Creates a writer that updates a random access channel with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] if the channel cannot be written.
    pub fn for_seekable_channel_with_config(inner: T, config: SourceConfig) -> Result<Self> {
        let source = BufferedSource::with_config(Seekable::new(inner), config);
        source.require(Capabilities::WRITABLE)?;
        Ok(Writer::new(source))
    }
}

impl Writer<BufferedSource<Outbound<File>>> {
    /// Creates, or truncates, a file and streams all writes into it.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be created.
    pub fn for_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::for_file_with_config(path, SourceConfig::default())
    }

    /// Creates, or truncates, a file with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be created.
    pub fn for_file_with_config(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        Ok(Writer::new(BufferedSource::create(path, config)?))
    }
}

impl<S: Source> Writer<S> {
    /// Creates a writer over an existing source.
    pub fn new(source: S) -> Self {
        Writer { source }
    }

    /// Returns a reference to the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps the source without flushing it.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Returns the byte order used for multi-byte values.
    pub fn byte_order(&self) -> ByteOrder {
        self.source.byte_order()
    }

    /// Changes the byte order for all following writes.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.source.set_byte_order(order);
    }

    /// Returns the absolute write position.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source.
    pub fn position(&self) -> Result<u64> {
        self.source.position()
    }

    /// Returns the size of the underlying data.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source.
    pub fn size(&mut self) -> Result<u64> {
        self.source.size()
    }

    /// Moves the write position to `target`, flushing first if the target is outside the
    /// window.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source and
    /// [`crate::Error::InvalidArgument`] if `target` lies beyond the end.
    pub fn seek(&mut self, target: u64) -> Result<()> {
        self.source.seek(target)
    }

    /// Writes all pending bytes to the backing store.
    ///
    /// # Errors
    /// Returns the backing store's error.
    pub fn flush(&mut self) -> Result<()> {
        self.source.flush()
    }

    /// Flushes pending bytes and closes the source.
    ///
    /// # Errors
    /// Returns the flush error.
    pub fn close(&mut self) -> Result<()> {
        self.source.close()
    }

    /// Writes any [`Primitive`] value in the current byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write<T: Primitive>(&mut self, value: T) -> Result<()> {
        let order = self.source.byte_order();
        let bytes = self.source.request_write(T::WIDTH)?;
        value.encode(bytes, order)
    }

    /// Writes a boolean as one byte, `1` or `0`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(u8::from(value))
    }

    /// Writes an `i8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write(value)
    }

    /// Writes a `u8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write(value)
    }

    /// Writes an `i16`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write(value)
    }

    /// Writes a `u16`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write(value)
    }

    /// Writes an `i32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write(value)
    }

    /// Writes a `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write(value)
    }

    /// Writes an `i64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write(value)
    }

    /// Writes a `u64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write(value)
    }

    /// Writes an `f32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write(value)
    }

    /// Writes an `f64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write(value)
    }

    /// Writes `value` as an IEEE 754 binary16, rounding to nearest even.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_half(&mut self, value: f32) -> Result<()> {
        self.write(f32_to_f16_bits(value))
    }

    /// Writes all of `src`, flushing the window as often as needed.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source fills up.
    pub fn write_all(&mut self, src: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < src.len() {
            let count = self.source.write(&src[written..])?;
            if count == 0 {
                return Err(EndOfData {
                    requested: src.len(),
                    available: written,
                });
            }
            written += count;
        }
        Ok(())
    }

    /// Writes consecutive values.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_slice<T: Primitive>(&mut self, values: &[T]) -> Result<()> {
        for value in values {
            self.write(*value)?;
        }
        Ok(())
    }

    /// Writes `count` zero bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn pad(&mut self, count: u64) -> Result<()> {
        let mut left = count;
        while left > 0 {
            let step = left.min(self.source.capacity().max(1) as u64) as usize;
            self.source.request_write(step)?.fill(0);
            left -= step as u64;
        }
        Ok(())
    }

    /// Pads with zero bytes up to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for a zero alignment and
    /// [`crate::Error::MissingCapability`] on a non-seekable source.
    pub fn align(&mut self, alignment: u64) -> Result<()> {
        if alignment == 0 {
            return Err(invalid_argument!("alignment must be positive"));
        }

        let misalignment = self.source.position()? % alignment;
        if misalignment != 0 {
            self.pad(alignment - misalignment)?;
        }
        Ok(())
    }

    /// Writes a [`Record`].
    ///
    /// # Errors
    /// Returns whatever the record's own encoding returns.
    pub fn write_record<R: Record>(&mut self, record: &R) -> Result<()> {
        record.write_to(self)
    }

    /// Writes the bytes of `text` in the default charset, without length or terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_fixed(&mut self, text: &str) -> Result<()> {
        self.write_string_fixed_with(text, Charset::default())
    }

    /// Writes the bytes of `text` in `charset`, without length or terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_fixed_with(&mut self, text: &str, charset: Charset) -> Result<()> {
        self.write_all(&charset.encode(text))
    }

    /// Writes `text` into a field of exactly `len` bytes in the default charset.
    ///
    /// Longer strings are cut at `len` bytes, shorter ones are padded with zero bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_fixed_len(&mut self, text: &str, len: usize) -> Result<()> {
        self.write_string_fixed_len_with(text, len, Charset::default())
    }

    /// Writes `text` into a field of exactly `len` bytes in `charset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_fixed_len_with(
        &mut self,
        text: &str,
        len: usize,
        charset: Charset,
    ) -> Result<()> {
        let bytes = charset.encode(text);
        let used = bytes.len().min(len);
        self.write_all(&bytes[..used])?;
        self.pad((len - used) as u64)
    }

    /// Writes `text` in the default charset followed by a zero byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_null(&mut self, text: &str) -> Result<()> {
        self.write_string_null_with(text, Charset::default())
    }

    /// Writes `text` in `charset` followed by a zero byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if a non-growable source is full.
    pub fn write_string_null_with(&mut self, text: &str, charset: Charset) -> Result<()> {
        self.write_all(&charset.encode(text))?;
        self.write_u8(0)
    }

    /// Writes `text` and its terminator into a zero padded field of exactly `limit` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the encoded string plus terminator does
    /// not fit into `limit` bytes, and [`crate::Error::EndOfData`] if a non-growable source
    /// is full.
    pub fn write_string_null_padded(&mut self, text: &str, limit: usize) -> Result<()> {
        self.write_string_null_padded_with(text, limit, Charset::default())
    }

    /// Writes `text` in `charset` and its terminator into a field of exactly `limit` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the encoded string plus terminator does
    /// not fit into `limit` bytes, and [`crate::Error::EndOfData`] if a non-growable source
    /// is full.
    pub fn write_string_null_padded_with(
        &mut self,
        text: &str,
        limit: usize,
        charset: Charset,
    ) -> Result<()> {
        let bytes = charset.encode(text);
        if bytes.len() >= limit {
            return Err(invalid_argument!(
                "string of {} bytes plus terminator does not fit into {} bytes",
                bytes.len(),
                limit
            ));
        }

        self.write_all(&bytes)?;
        self.pad((limit - bytes.len()) as u64)
    }

    /// Writes `text` in the default charset preceded by its byte length.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the length does not fit into `width`.
    pub fn write_string_prefixed(&mut self, text: &str, width: PrefixWidth) -> Result<()> {
        self.write_string_prefixed_with(text, width, Charset::default())
    }

    /// Writes `text` in `charset` preceded by its byte length.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the length does not fit into `width`.
    pub fn write_string_prefixed_with(
        &mut self,
        text: &str,
        width: PrefixWidth,
        charset: Charset,
    ) -> Result<()> {
        let bytes = charset.encode(text);
        let len = bytes.len() as u64;
        if len > width.max_len() {
            return Err(invalid_argument!(
                "string of {} bytes exceeds the {}-byte length prefix",
                len,
                width.bytes()
            ));
        }

        match width {
            PrefixWidth::U8 => self.write_u8(len as u8)?,
            PrefixWidth::U16 => self.write_u16(len as u16)?,
            PrefixWidth::U32 => self.write_u32(len as u32)?,
        }
        self.write_all(&bytes)
    }
}

impl<S: Source> Write for Writer<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.source.write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.source.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::Error;

    fn stream() -> Writer<BufferedSource<Outbound<Vec<u8>>>> {
        Writer::for_channel_with_config(Vec::new(), SourceConfig::default().with_capacity(8))
    }

    fn finish(writer: Writer<BufferedSource<Outbound<Vec<u8>>>>) -> Vec<u8> {
        writer.into_inner().into_inner().unwrap().into_inner()
    }

    #[test]
    fn primitives_land_in_order_across_flushes() {
        let mut writer = stream();
        writer.write_bool(true).unwrap();
        writer.write_i8(-1).unwrap();
        writer.write_u16(0x1234).unwrap();
        writer.write_i64(-2).unwrap();
        writer.write_f32(1.0).unwrap();
        writer.write_half(-2.0).unwrap();

        assert_eq!(
            finish(writer),
            [
                0x01, 0xFF, 0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0x3F,
                0x80, 0x00, 0x00, 0xC0, 0x00
            ]
        );
    }

    #[test]
    fn little_endian_int() {
        let mut writer = stream();
        writer.set_byte_order(ByteOrder::LittleEndian);
        writer.write_i32(0x1122_3344).unwrap();
        assert_eq!(finish(writer), [0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn string_layouts() {
        let mut writer = stream();
        writer.write_string_null("CAT").unwrap();
        writer.write_string_prefixed("HI", PrefixWidth::U8).unwrap();
        writer.write_string_fixed_len("ABCDEF", 4).unwrap();
        writer.write_string_fixed_len("Z", 3).unwrap();
        writer.write_string_null_padded("Q", 4).unwrap();
        writer.write_string_fixed("ok").unwrap();

        assert_eq!(
            finish(writer),
            b"CAT\0\x02HIABCDZ\0\0Q\0\0\0ok".to_vec()
        );
    }

    #[test]
    fn oversized_prefixed_string_is_rejected() {
        let mut writer = stream();
        let text = "x".repeat(256);
        assert!(matches!(
            writer.write_string_prefixed(&text, PrefixWidth::U8),
            Err(Error::InvalidArgument(_))
        ));
        writer.write_string_prefixed(&text, PrefixWidth::U16).unwrap();

        let bytes = finish(writer);
        assert_eq!(bytes.len(), 258);
        assert_eq!(&bytes[..2], &[0x01, 0x00]);
    }

    #[test]
    fn padded_null_string_needs_room_for_terminator() {
        let mut writer = stream();
        assert!(matches!(
            writer.write_string_null_padded("ABCD", 4),
            Err(Error::InvalidArgument(_))
        ));
        writer.write_string_null_padded("ABC", 4).unwrap();
        assert_eq!(finish(writer), b"ABC\0".to_vec());
    }

    #[test]
    fn memory_writer_is_bounded() {
        let mut writer = Writer::for_memory(vec![0u8; 6]);
        writer.write_u32(0xDEAD_BEEF).unwrap();
        assert!(matches!(
            writer.write_u32(1),
            Err(Error::EndOfData {
                requested: 4,
                available: 2
            })
        ));
        writer.write_u16(0xCAFE).unwrap();
        assert_eq!(
            writer.into_inner().into_inner(),
            [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
        );
    }

    #[test]
    fn padding_into_empty_memory_fails() {
        let mut writer = Writer::for_memory(Vec::new());
        assert!(matches!(
            writer.pad(2),
            Err(Error::EndOfData {
                requested: 1,
                available: 0
            })
        ));
        assert!(matches!(
            writer.write_string_fixed_len("", 2),
            Err(Error::EndOfData { .. })
        ));
        assert!(matches!(
            writer.write_string_null_padded("", 2),
            Err(Error::EndOfData { .. })
        ));
        writer.pad(0).unwrap();
    }

    #[test]
    fn large_write_all_bypasses_window() {
        let mut writer = stream();
        let payload: Vec<u8> = (0..100).collect();
        writer.write_u8(0xAA).unwrap();
        writer.write_all(&payload).unwrap();
        writer.write_u8(0xBB).unwrap();

        let bytes = finish(writer);
        assert_eq!(bytes.len(), 102);
        assert_eq!(bytes[0], 0xAA);
        assert_eq!(&bytes[1..101], payload.as_slice());
        assert_eq!(bytes[101], 0xBB);
    }

    #[test]
    fn seekable_writer_updates_in_place() {
        let config = SourceConfig::default().with_capacity(8);
        let mut writer =
            Writer::for_seekable_channel_with_config(Cursor::new(vec![0u8; 32]), config).unwrap();

        writer.seek(20).unwrap();
        writer.write_u32(0x0102_0304).unwrap();
        writer.seek(2).unwrap();
        writer.write_u16(0xFFFF).unwrap();
        writer.align(8).unwrap();
        assert_eq!(writer.position().unwrap(), 8);
        writer.flush().unwrap();

        let source = writer.into_inner();
        let data = source.into_inner().unwrap().into_inner().into_inner();
        assert_eq!(&data[20..24], &[1, 2, 3, 4]);
        assert_eq!(&data[2..4], &[0xFF, 0xFF]);
        assert_eq!(data.len(), 32);
    }

    #[test]
    fn seekable_writer_does_not_extend_backing() {
        let config = SourceConfig::default().with_capacity(8);
        let mut writer =
            Writer::for_seekable_channel_with_config(Cursor::new(vec![0u8; 8]), config).unwrap();

        assert!(matches!(
            writer.write_all(&[0x5A; 12]),
            Err(Error::EndOfData { .. })
        ));
        writer.flush().unwrap();

        let data = writer.into_inner().into_inner().unwrap().into_inner().into_inner();
        assert_eq!(data, vec![0x5A; 8]);
    }

    #[test]
    fn records_and_slices() {
        let mut writer = stream();
        writer.write_slice(&[1u16, 2, 3]).unwrap();
        writer.write_record(&[7u8, 8]).unwrap();
        assert_eq!(finish(writer), [0, 1, 0, 2, 0, 3, 7, 8]);
    }

    #[test]
    fn std_write_adapter() {
        let mut writer = stream();
        io::Write::write_all(&mut writer, b"hello world").unwrap();
        io::Write::flush(&mut writer).unwrap();
        assert_eq!(finish(writer), b"hello world".to_vec());
    }
}
