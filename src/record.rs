//! Composite values that encode themselves through a [`Reader`] and [`Writer`].
//!
//! A [`Record`] is any type whose binary layout is a fixed sequence of primitive and
//! string fields. Implementations use only the reader and writer operations, so the same
//! record works unchanged over memory, streams, files and every byte order.
//!
//! # Examples
//!
//! ```rust
//! use binbuf::{PrefixWidth, Reader, Record, Result, Source, Writer};
//!
//! #[derive(Debug, PartialEq)]
//! struct Entry {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl Record for Entry {
//!     fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self> {
//!         Ok(Entry {
//!             id: reader.read_u32()?,
//!             name: reader.read_string_prefixed(PrefixWidth::U8)?,
//!         })
//!     }
//!
//!     fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()> {
//!         writer.write_u32(self.id)?;
//!         writer.write_string_prefixed(&self.name, PrefixWidth::U8)
//!     }
//! }
//!
//! let mut writer = Writer::for_memory(vec![0u8; 16]);
//! let entry = Entry { id: 7, name: "seven".to_string() };
//! writer.write_record(&entry)?;
//!
//! let mut reader = Reader::for_memory(writer.into_inner().into_inner());
//! assert_eq!(reader.read_record::<Entry>()?, entry);
//! # Ok::<(), binbuf::Error>(())
//! ```

use crate::{
    codec::{Reader, Writer},
    source::Source,
    Result,
};

/// A type with a fixed binary layout.
pub trait Record: Sized {
    /// Decodes one value from `reader`.
    ///
    /// # Errors
    /// Returns any error raised by the reader.
    fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self>;

    /// Encodes the value into `writer`.
    ///
    /// # Errors
    /// Returns any error raised by the writer.
    fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()>;
}

macro_rules! impl_record_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self> {
                    reader.read::<$ty>()
                }

                fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()> {
                    writer.write::<$ty>(*self)
                }
            }
        )*
    };
}

impl_record_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Record for bool {
    fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self> {
        reader.read_bool()
    }

    fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()> {
        writer.write_bool(*self)
    }
}

impl<T: Record, const N: usize> Record for [T; N] {
    fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::read_from(reader)?);
        }

        items
            .try_into()
            .map_err(|items: Vec<T>| malformed_error!("expected {} items, got {}", N, items.len()))
    }

    fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()> {
        for item in self {
            item.write_to(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codec::PrefixWidth, source::ByteOrder, Error};

    #[derive(Debug, PartialEq)]
    struct Header {
        magic: [u8; 4],
        version: u16,
        flags: bool,
        scale: f32,
        label: String,
    }

    impl Record for Header {
        fn read_from<S: Source>(reader: &mut Reader<S>) -> Result<Self> {
            Ok(Header {
                magic: reader.read_record()?,
                version: reader.read_u16()?,
                flags: reader.read_bool()?,
                scale: reader.read_f32()?,
                label: reader.read_string_prefixed(PrefixWidth::U16)?,
            })
        }

        fn write_to<S: Source>(&self, writer: &mut Writer<S>) -> Result<()> {
            writer.write_record(&self.magic)?;
            writer.write_u16(self.version)?;
            writer.write_bool(self.flags)?;
            writer.write_f32(self.scale)?;
            writer.write_string_prefixed(&self.label, PrefixWidth::U16)
        }
    }

    fn sample() -> Header {
        Header {
            magic: *b"BBUF",
            version: 3,
            flags: true,
            scale: 0.5,
            label: "layer".to_string(),
        }
    }

    #[test]
    fn record_round_trip_in_both_orders() {
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let mut writer = Writer::for_memory(vec![0u8; 32]);
            writer.set_byte_order(order);
            writer.write_record(&sample()).unwrap();
            let written = writer.position().unwrap();
            assert_eq!(written, 4 + 2 + 1 + 4 + 2 + 5);

            let mut reader = Reader::for_memory(writer.into_inner().into_inner());
            reader.set_byte_order(order);
            assert_eq!(reader.read_record::<Header>().unwrap(), sample());
        }
    }

    #[test]
    fn array_of_records() {
        let mut writer = Writer::for_memory(vec![0u8; 6]);
        writer.write_record(&[1u16, 2, 3]).unwrap();

        let mut reader = Reader::for_memory(writer.into_inner().into_inner());
        let values: [u16; 3] = reader.read_record().unwrap();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn truncated_record_fails() {
        let mut reader = Reader::for_memory(b"BBUF\x00".to_vec());
        assert!(matches!(
            reader.read_record::<Header>(),
            Err(Error::EndOfData { .. })
        ));
    }
}
