//! Byte order aware encoding and decoding of primitive values on byte slices.
//!
//! Everything the [`crate::Reader`], [`crate::Writer`] and [`crate::PagedFile`] do with
//! fixed-width numbers ends up in this module. Values are decoded from, and encoded into,
//! plain byte slices with explicit bounds checks, so the callers only need to obtain a
//! slice of the right width from their source or page.
//!
//! # Key Components
//!
//! - [`crate::codec::io::Primitive`] - Trait defining the width and byte conversions of a
//!   fixed-width value
//! - [`crate::codec::io::read_at`] - Decode a value at an offset and advance the offset
//! - [`crate::codec::io::write_at`] - Encode a value at an offset and advance the offset
//!
//! ## Supported Types
//! The [`crate::codec::io::Primitive`] trait is implemented for:
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! # Examples
//!
//! ```rust
//! use binbuf::codec::io::{read_at, write_at};
//! use binbuf::ByteOrder;
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_at(&mut data, &mut offset, ByteOrder::BigEndian, 0x0102u16)?;
//! write_at(&mut data, &mut offset, ByteOrder::LittleEndian, 0x0304_0506u32)?;
//! assert_eq!(data, [0x01, 0x02, 0x06, 0x05, 0x04, 0x03]);
//!
//! let mut offset = 2;
//! let value: u32 = read_at(&data, &mut offset, ByteOrder::LittleEndian)?;
//! assert_eq!(value, 0x0304_0506);
//! assert_eq!(offset, 6);
//! # Ok::<(), binbuf::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Both functions return [`crate::Error::OutOfBounds`] if the slice does not hold enough
//! bytes past the offset. The offset is left untouched in that case.

use crate::{source::ByteOrder, Error::OutOfBounds, Result};

/// A fixed-width value with a defined byte representation in both byte orders.
///
/// Each implementation names the byte array that holds one value (e.g. `[u8; 4]` for
/// `u32`) and converts between that array and the value.
///
/// # Examples
///
/// ```rust
/// use binbuf::codec::io::Primitive;
/// use binbuf::ByteOrder;
///
/// assert_eq!(<u32 as Primitive>::WIDTH, 4);
/// let value = u32::decode(&[0x11, 0x22, 0x33, 0x44], ByteOrder::LittleEndian)?;
/// assert_eq!(value, 0x4433_2211);
/// # Ok::<(), binbuf::Error>(())
/// ```
pub trait Primitive: Copy + Sized {
    /// Byte array holding exactly one encoded value.
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Number of bytes of one encoded value.
    const WIDTH: usize;

    /// Read Self from a byte array in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read Self from a byte array in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write Self to a byte array in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write Self to a byte array in big-endian
    fn to_be_bytes(self) -> Self::Bytes;

    /// Decodes a value from a slice of exactly [`Primitive::WIDTH`] bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `bytes` has a different length.
    fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        let Ok(array) = <Self::Bytes as TryFrom<&[u8]>>::try_from(bytes) else {
            return Err(OutOfBounds);
        };

        Ok(match order {
            ByteOrder::BigEndian => Self::from_be_bytes(array),
            ByteOrder::LittleEndian => Self::from_le_bytes(array),
        })
    }

    /// Encodes the value into a slice of exactly [`Primitive::WIDTH`] bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `dst` has a different length.
    fn encode(self, dst: &mut [u8], order: ByteOrder) -> Result<()> {
        if dst.len() != Self::WIDTH {
            return Err(OutOfBounds);
        }

        let bytes = match order {
            ByteOrder::BigEndian => self.to_be_bytes(),
            ByteOrder::LittleEndian => self.to_le_bytes(),
        };
        dst.copy_from_slice(bytes.as_ref());
        Ok(())
    }
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Safely reads a value of type `T` in the given byte order at a specific offset.
///
/// The offset is advanced by [`Primitive::WIDTH`] after a successful read.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
/// * `order` - Byte order of the encoded value
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_at<T: Primitive>(data: &[u8], offset: &mut usize, order: ByteOrder) -> Result<T> {
    let Some(end) = offset.checked_add(T::WIDTH) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let value = T::decode(&data[*offset..end], order)?;
    *offset = end;
    Ok(value)
}

/// Safely writes a value of type `T` in the given byte order at a specific offset.
///
/// The offset is advanced by [`Primitive::WIDTH`] after a successful write.
///
/// # Arguments
///
/// * `data` - The mutable byte buffer to write to
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `order` - Byte order of the encoded value
/// * `value` - The value to write
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_at<T: Primitive>(
    data: &mut [u8],
    offset: &mut usize,
    order: ByteOrder,
    value: T,
) -> Result<()> {
    let Some(end) = offset.checked_add(T::WIDTH) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    value.encode(&mut data[*offset..end], order)?;
    *offset = end;
    Ok(())
}
