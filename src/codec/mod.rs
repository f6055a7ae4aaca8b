//! Byte order aware encoding of primitives, strings and records on top of a [`Source`].
//!
//! The codec layer turns the raw window requests of a [`crate::source::Source`] into typed
//! values. It never copies bytes through an intermediate buffer for fixed-width values:
//! [`Reader`] and [`Writer`] request exactly as many bytes as the value needs and decode or
//! encode them in place.
//!
//! # Key Components
//!
//! - [`Reader`] - Typed reads, strings and records from any source
//! - [`Writer`] - Typed writes, strings and records into any source
//! - [`io::Primitive`] - Fixed-width values and their byte conversions
//! - [`half`] - IEEE 754 binary16 conversion used by the half-float accessors
//! - [`Charset`] and [`PrefixWidth`] - String encodings and length prefix widths
//!
//! # String Layouts
//!
//! | form | wire layout |
//! |---|---|
//! | fixed(len) | `len` raw bytes, the string ends at the first `0x00` |
//! | null-terminated(limit) | bytes up to the first `0x00` or `limit`, terminator consumed |
//! | null-terminated padded(limit) | as above, then skipped to exactly `limit` bytes |
//! | prefixed(width) | unsigned `width`-byte length in the current byte order, then the bytes |
//!
//! # Examples
//!
//! ```rust
//! use binbuf::{PrefixWidth, Reader, Writer};
//!
//! let mut writer = Writer::for_memory(vec![0u8; 7]);
//! writer.write_string_null("CAT")?;
//! writer.write_string_prefixed("HI", PrefixWidth::U8)?;
//!
//! let bytes = writer.into_inner().into_inner();
//! assert_eq!(bytes, [0x43, 0x41, 0x54, 0x00, 0x02, 0x48, 0x49]);
//!
//! let mut reader = Reader::for_memory(bytes);
//! assert_eq!(reader.read_string_null(10)?, "CAT");
//! assert_eq!(reader.read_string_prefixed(PrefixWidth::U8)?, "HI");
//! # Ok::<(), binbuf::Error>(())
//! ```
//!
//! [`Source`]: crate::source::Source

mod charset;
pub mod half;
pub mod io;
mod reader;
mod writer;

pub use charset::{Charset, PrefixWidth};
pub use reader::Reader;
pub use writer::Writer;
