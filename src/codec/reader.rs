use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use crate::{
    codec::{
        charset::{Charset, PrefixWidth},
        half::f16_bits_to_f32,
        io::Primitive,
    },
    record::Record,
    source::{
        BufferedSource, ByteOrder, Capabilities, Inbound, MemorySource, Seekable, Source,
        SourceConfig,
    },
    Error::EndOfData,
    Result,
};

/// Decodes primitive values, strings and records from a [`Source`].
///
/// A reader holds exactly one source and no other state. Every fixed-width read requests
/// its bytes from the source window and decodes them in place, in the byte order the
/// source reports at that moment, so [`Reader::set_byte_order`] takes effect on the next
/// value.
///
/// # Examples
///
/// ```rust
/// use binbuf::{ByteOrder, Reader};
///
/// let mut reader = Reader::for_memory(vec![0x44, 0x33, 0x22, 0x11, 0x02, b'H', b'I']);
/// reader.set_byte_order(ByteOrder::LittleEndian);
/// assert_eq!(reader.read_i32()?, 0x1122_3344);
/// assert_eq!(reader.read_string_prefixed(binbuf::PrefixWidth::U8)?, "HI");
/// # Ok::<(), binbuf::Error>(())
/// ```
#[derive(Debug)]
pub struct Reader<S: Source> {
    source: S,
}

impl Reader<MemorySource> {
    /// Creates a reader over a read-only memory region.
    pub fn for_memory(data: impl Into<Vec<u8>>) -> Self {
        Reader::new(MemorySource::read_only(data.into()))
    }
}

impl<R: Read> Reader<BufferedSource<Inbound<R>>> {
    /// Creates a reader over a one-directional input stream.
    pub fn for_channel(inner: R) -> Self {
        Self::for_channel_with_config(inner, SourceConfig::default())
    }

    /// Creates a reader over a one-directional input stream with an explicit configuration.
    pub fn for_channel_with_config(inner: R, config: SourceConfig) -> Self {
        Reader::new(BufferedSource::with_config(Inbound::new(inner), config))
    }
}

impl<T: Read + Write + Seek> Reader<BufferedSource<Seekable<T>>> {
    /// Creates a reader over a random access channel.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] if the channel cannot be read.
    pub fn for_seekable_channel(inner: T) -> Result<Self> {
        Self::for_seekable_channel_with_config(inner, SourceConfig::default())
    }

    /// Creates a reader over a random access channel with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] if the channel cannot be read.
    pub fn for_seekable_channel_with_config(inner: T, config: SourceConfig) -> Result<Self> {
        let source = BufferedSource::with_config(Seekable::new(inner), config);
        source.require(Capabilities::READABLE)?;
        Ok(Reader::new(source))
    }
}

impl Reader<BufferedSource<Seekable<File>>> {
    /// Opens a file for random access reading.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn for_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::for_file_with_config(path, SourceConfig::default())
    }

    /// Opens a file for random access reading with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn for_file_with_config(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        Ok(Reader::new(BufferedSource::open(path, config)?))
    }
}

impl<S: Source> Reader<S> {
    /// Creates a reader over an existing source.
    pub fn new(source: S) -> Self {
        Reader { source }
    }

    /// Returns a reference to the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps the source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Returns the byte order used for multi-byte values.
    pub fn byte_order(&self) -> ByteOrder {
        self.source.byte_order()
    }

    /// Changes the byte order for all following reads.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.source.set_byte_order(order);
    }

    /// Returns the absolute read position.
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

    /// Moves the read position to `target`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingCapability`] on a non-seekable source and
    /// [`crate::Error::InvalidArgument`] if `target` lies beyond the end.
    pub fn seek(&mut self, target: u64) -> Result<()> {
        self.source.seek(target)
    }

    /// Closes the source.
    ///
    /// # Errors
    /// Returns the source's close error.
    pub fn close(&mut self) -> Result<()> {
        self.source.close()
    }

    /// Reads any [`Primitive`] value in the current byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        let order = self.source.byte_order();
        let bytes = self.source.request_read(T::WIDTH)?;
        T::decode(bytes, order)
    }

    /// Reads one byte, any non-zero value is `true`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read::<u8>()? != 0)
    }

    /// Reads an `i8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read()
    }

    /// Reads a `u8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    /// Reads an `i16`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    /// Reads a `u16`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    /// Reads an `i32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    /// Reads a `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    /// Reads an unsigned 32-bit value zero-extended into an `i64`.
    ///
    /// The result is never negative, whatever the high bit of the stored pattern.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_uint(&mut self) -> Result<i64> {
        Ok(i64::from(self.read::<u32>()?))
    }

    /// Reads an `i64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read()
    }

    /// Reads a `u64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    /// Reads an unsigned 64-bit value widened into a `u128`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_ulong(&mut self) -> Result<u128> {
        Ok(u128::from(self.read::<u64>()?))
    }

    /// Reads an `f32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    /// Reads an `f64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    /// Reads an IEEE 754 binary16 value and returns it as an `f32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_half(&mut self) -> Result<f32> {
        Ok(f16_bits_to_f32(self.read::<u16>()?))
    }

    /// Fills `dst` completely, reading through as many window refills as needed.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source ends before `dst` is full.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < dst.len() {
            let count = self.source.read(&mut dst[filled..])?;
            if count == 0 {
                return Err(EndOfData {
                    requested: dst.len(),
                    available: filled,
                });
            }
            filled += count;
        }
        Ok(())
    }

    /// Reads exactly `len` bytes into a new vector.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source ends early.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        // Grows one window at a time, so a corrupt length cannot force a huge allocation.
        let mut bytes = Vec::new();
        while bytes.len() < len {
            let start = bytes.len();
            let step = (len - start).min(self.source.capacity().max(1));
            bytes.resize(start + step, 0);

            match self.read_exact(&mut bytes[start..]) {
                Ok(()) => {}
                Err(EndOfData { available, .. }) => {
                    return Err(EndOfData {
                        requested: len,
                        available: start + available,
                    });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(bytes)
    }

    /// Fills `dst` with consecutive values.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source runs out of bytes.
    pub fn read_into<T: Primitive>(&mut self, dst: &mut [T]) -> Result<()> {
        for value in dst.iter_mut() {
            *value = self.read()?;
        }
        Ok(())
    }

    /// Consumes `count` bytes without decoding them.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if fewer than `count` bytes are left.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let mut left = count;
        while left > 0 {
            let step = left.min(self.source.capacity().max(1) as u64) as usize;
            self.source.request_read(step)?;
            left -= step as u64;
        }
        Ok(())
    }

    /// Skips forward to the next multiple of `alignment`.
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
            self.skip(alignment - misalignment)?;
        }
        Ok(())
    }

    /// Reads a [`Record`].
    ///
    /// # Errors
    /// Returns whatever the record's own decoding returns.
    pub fn read_record<R: Record>(&mut self) -> Result<R> {
        R::read_from(self)
    }

    /// Reads a fixed-size string of exactly `len` bytes in the default charset.
    ///
    /// All `len` bytes are consumed; the string ends at the first zero byte among them.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if fewer than `len` bytes are left.
    pub fn read_string_fixed(&mut self, len: usize) -> Result<String> {
        self.read_string_fixed_with(len, Charset::default())
    }

    /// Reads a fixed-size string of exactly `len` bytes in `charset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if fewer than `len` bytes are left, or
    /// [`crate::Error::Malformed`] if the bytes do not decode.
    pub fn read_string_fixed_with(&mut self, len: usize, charset: Charset) -> Result<String> {
        let mut bytes = self.read_bytes(len)?;
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }
        charset.decode(&bytes)
    }

    /// Reads a null-terminated string of at most `limit` bytes in the default charset.
    ///
    /// Reading stops after the terminator or after `limit` bytes, whichever comes first.
    /// The terminator is consumed but not returned.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for a zero `limit` and
    /// [`crate::Error::EndOfData`] if the source ends first.
    pub fn read_string_null(&mut self, limit: usize) -> Result<String> {
        self.read_string_null_with(limit, Charset::default())
    }

    /// Reads a null-terminated string of at most `limit` bytes in `charset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for a zero `limit`,
    /// [`crate::Error::EndOfData`] if the source ends first and
    /// [`crate::Error::Malformed`] if the bytes do not decode.
    pub fn read_string_null_with(&mut self, limit: usize, charset: Charset) -> Result<String> {
        let (bytes, _) = self.read_terminated(limit)?;
        charset.decode(&bytes)
    }

    /// Reads a null-terminated string from a field of exactly `limit` bytes.
    ///
    /// Like [`Reader::read_string_null`], then skips forward so that `limit` bytes are
    /// consumed in total.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for a zero `limit` and
    /// [`crate::Error::EndOfData`] if the source ends first.
    pub fn read_string_null_padded(&mut self, limit: usize) -> Result<String> {
        self.read_string_null_padded_with(limit, Charset::default())
    }

    /// Reads a null-terminated string from a field of exactly `limit` bytes in `charset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for a zero `limit`,
    /// [`crate::Error::EndOfData`] if the source ends first and
    /// [`crate::Error::Malformed`] if the bytes do not decode.
    pub fn read_string_null_padded_with(
        &mut self,
        limit: usize,
        charset: Charset,
    ) -> Result<String> {
        let (bytes, consumed) = self.read_terminated(limit)?;
        self.skip((limit - consumed) as u64)?;
        charset.decode(&bytes)
    }

    /// Reads a string preceded by an unsigned length prefix, in the default charset.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source ends first.
    pub fn read_string_prefixed(&mut self, width: PrefixWidth) -> Result<String> {
        self.read_string_prefixed_with(width, Charset::default())
    }

    /// Reads a string preceded by an unsigned length prefix, in `charset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfData`] if the source ends first, or
    /// [`crate::Error::Malformed`] if the bytes do not decode.
    pub fn read_string_prefixed_with(
        &mut self,
        width: PrefixWidth,
        charset: Charset,
    ) -> Result<String> {
        let len = match width {
            PrefixWidth::U8 => usize::from(self.read_u8()?),
            PrefixWidth::U16 => usize::from(self.read_u16()?),
            PrefixWidth::U32 => self.read_u32()? as usize,
        };

        let bytes = self.read_bytes(len)?;
        charset.decode(&bytes)
    }

    /// Reads byte by byte up to a zero byte or `limit` bytes, returning the string bytes
    /// and the number of bytes consumed.
    fn read_terminated(&mut self, limit: usize) -> Result<(Vec<u8>, usize)> {
        if limit == 0 {
            return Err(invalid_argument!("string limit must be positive"));
        }

        let mut bytes = Vec::new();
        let mut consumed = 0;
        while consumed < limit {
            let byte = self.read_u8()?;
            consumed += 1;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok((bytes, consumed))
    }
}

impl<S: Source> Read for Reader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.source.read(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::Error;

    #[test]
    fn primitives_big_endian() {
        let mut reader = Reader::for_memory(vec![
            0x01, 0xFF, 0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFE, 0x3F, 0x80, 0x00, 0x00, 0x3C, 0x00,
        ]);

        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_i8().unwrap(), -1);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert_eq!(reader.read_half().unwrap(), 1.0);
        assert!(matches!(
            reader.read_u8(),
            Err(Error::EndOfData {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn unsigned_widening_never_sign_extends() {
        let mut reader = Reader::for_memory(vec![0xFF; 12]);
        assert_eq!(reader.read_uint().unwrap(), 0xFFFF_FFFF);
        assert_eq!(reader.read_ulong().unwrap(), u128::from(u64::MAX));
    }

    #[test]
    fn byte_order_switches_mid_stream() {
        let mut reader = Reader::for_memory(vec![0x44, 0x33, 0x22, 0x11, 0x11, 0x22, 0x33, 0x44]);
        reader.set_byte_order(ByteOrder::LittleEndian);
        assert_eq!(reader.read_i32().unwrap(), 0x1122_3344);
        reader.set_byte_order(ByteOrder::BigEndian);
        assert_eq!(reader.read_i32().unwrap(), 0x1122_3344);
    }

    #[test]
    fn fixed_string_truncates_at_zero_but_consumes_all() {
        let mut reader = Reader::for_memory(b"AB\0CDxyz".to_vec());
        assert_eq!(reader.read_string_fixed(5).unwrap(), "AB");
        assert_eq!(reader.position().unwrap(), 5);
        assert_eq!(reader.read_string_fixed(3).unwrap(), "xyz");
    }

    #[test]
    fn null_string_stops_at_terminator_or_limit() {
        let mut reader = Reader::for_memory(b"CAT\0DOGS\0".to_vec());
        assert_eq!(reader.read_string_null(10).unwrap(), "CAT");
        assert_eq!(reader.position().unwrap(), 4);

        assert_eq!(reader.read_string_null(2).unwrap(), "DO");
        assert_eq!(reader.position().unwrap(), 6);

        assert!(matches!(
            reader.read_string_null(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn padded_null_string_consumes_whole_field() {
        let mut reader = Reader::for_memory(b"HI\0\xAA\xAA\xAA\x07".to_vec());
        assert_eq!(reader.read_string_null_padded(6).unwrap(), "HI");
        assert_eq!(reader.read_u8().unwrap(), 0x07);
    }

    #[test]
    fn prefixed_string_honors_byte_order() {
        let mut reader = Reader::for_memory(vec![0x02, 0x00, b'H', b'I']);
        reader.set_byte_order(ByteOrder::LittleEndian);
        assert_eq!(reader.read_string_prefixed(PrefixWidth::U16).unwrap(), "HI");

        let mut reader = Reader::for_memory(vec![0x00]);
        assert_eq!(reader.read_string_prefixed(PrefixWidth::U8).unwrap(), "");
    }

    #[test]
    fn utf8_strings_are_validated() {
        let mut reader = Reader::for_memory(vec![0x02, 0xC3, 0xA9, 0x01, 0xFF]);
        assert_eq!(
            reader
                .read_string_prefixed_with(PrefixWidth::U8, Charset::Utf8)
                .unwrap(),
            "\u{e9}"
        );
        assert!(matches!(
            reader.read_string_prefixed_with(PrefixWidth::U8, Charset::Utf8),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn channel_reader_spans_window_boundaries() {
        let data: Vec<u8> = (0..64).collect();
        let config = SourceConfig::default().with_capacity(8);
        let mut reader = Reader::for_channel_with_config(&data[..], config);

        assert_eq!(reader.read_u8().unwrap(), 0);
        assert_eq!(reader.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(reader.read_bytes(20).unwrap(), (9..29).collect::<Vec<u8>>());
        reader.skip(30).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 59);
        assert!(matches!(reader.skip(10), Err(Error::EndOfData { .. })));
        assert!(matches!(
            reader.position(),
            Err(Error::MissingCapability(Capabilities::SEEKABLE))
        ));
    }

    #[test]
    fn read_into_and_align() {
        let mut reader = Reader::for_memory(vec![0, 1, 0, 2, 0, 3, 9, 9, 0xAB]);
        let mut values = [0u16; 3];
        reader.read_into(&mut values).unwrap();
        assert_eq!(values, [1, 2, 3]);

        reader.align(4).unwrap();
        assert_eq!(reader.position().unwrap(), 8);
        reader.align(4).unwrap();
        assert_eq!(reader.position().unwrap(), 8);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert!(reader.align(0).is_err());
    }

    #[test]
    fn seekable_channel_reader() {
        let data: Vec<u8> = (0..=255).collect();
        let config = SourceConfig::default().with_capacity(16);
        let mut reader =
            Reader::for_seekable_channel_with_config(Cursor::new(data), config).unwrap();

        reader.seek(100).unwrap();
        assert_eq!(reader.read_u16().unwrap(), 0x6465);
        reader.seek(4).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 4);
        assert_eq!(reader.size().unwrap(), 256);
    }

    #[test]
    fn empty_memory_fails_instead_of_spinning() {
        let mut reader = Reader::for_memory(Vec::new());
        assert!(matches!(
            reader.skip(1),
            Err(Error::EndOfData {
                requested: 1,
                available: 0
            })
        ));
        assert!(matches!(
            reader.read_string_null_padded(4),
            Err(Error::EndOfData { .. })
        ));
        assert!(matches!(
            reader.read_bytes(3),
            Err(Error::EndOfData {
                requested: 3,
                available: 0
            })
        ));
        reader.align(4).unwrap();
        assert!(reader.read_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn corrupt_length_prefix_is_end_of_data() {
        let mut reader = Reader::for_memory(vec![0xFF; 4]);
        assert!(matches!(
            reader.read_string_prefixed(PrefixWidth::U32),
            Err(Error::EndOfData {
                requested,
                available: 0
            }) if requested == u32::MAX as usize
        ));

        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"0123456789");
        let config = SourceConfig::default().with_capacity(8);
        let mut reader = Reader::for_channel_with_config(&data[..], config);
        assert!(matches!(
            reader.read_string_prefixed(PrefixWidth::U32),
            Err(Error::EndOfData {
                requested: 32,
                available: 10
            })
        ));
    }

    #[test]
    fn std_read_adapter() {
        let mut reader = Reader::for_memory(b"hello".to_vec());
        let mut text = String::new();
        io::Read::read_to_string(&mut reader, &mut text).unwrap();
        assert_eq!(text, "hello");
    }
}
