// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'paged/mod.rs' uses mmap to map file pages into memory

//! # binbuf
//!
//! Structured binary I/O over memory, streams and files. `binbuf` reads and writes
//! fixed-layout binary data (primitive numbers in either byte order, half-precision floats,
//! fixed, null-terminated and length-prefixed strings, composite records) against any
//! backing store, hiding the differences behind one buffering contract.
//!
//! ## Features
//!
//! - **One buffering contract** - memory regions, input streams, output streams and random
//!   access files all present the same [`source::Source`] window
//! - **Capabilities fixed at construction** - readable, writable, growable and seekable are
//!   carried as data, never discovered at call time
//! - **Zero-copy primitives** - values are decoded and encoded directly inside the window
//! - **Explicit ownership** - a source only closes the backing store it owns
//! - **Paged memory maps** - files larger than one mapping through overlapping pages
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use binbuf::prelude::*;
//!
//! let mut writer = Writer::for_memory(vec![0u8; 4]);
//! writer.set_byte_order(ByteOrder::LittleEndian);
//! writer.write_i32(0x1122_3344)?;
//!
//! let bytes = writer.into_inner().into_inner();
//! assert_eq!(bytes, [0x44, 0x33, 0x22, 0x11]);
//! # Ok::<(), binbuf::Error>(())
//! ```
//!
//! ### Files
//!
//! ```rust
//! use binbuf::{PrefixWidth, Reader, Writer};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("data.bin");
//!
//! let mut writer = Writer::for_file(&path)?;
//! writer.write_u16(0xBEEF)?;
//! writer.write_string_prefixed("binbuf", PrefixWidth::U8)?;
//! writer.close()?;
//!
//! let mut reader = Reader::for_file(&path)?;
//! assert_eq!(reader.read_u16()?, 0xBEEF);
//! assert_eq!(reader.read_string_prefixed(PrefixWidth::U8)?, "binbuf");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`source`] - The buffering contract, its memory, stream and file variants
//! - [`codec`] - [`Reader`] and [`Writer`], primitive and string encodings
//! - [`record`] - The [`Record`] contract for composite values
//! - [`paged`] - [`PagedFile`], paged memory-mapped random access
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Errors surface synchronously from the
//! call that caused them and are never retried internally:
//!
//! ```rust
//! use binbuf::{Error, Reader};
//!
//! let mut reader = Reader::for_memory(vec![0x01]);
//! match reader.read_u32() {
//!     Err(Error::EndOfData { requested, .. }) => assert_eq!(requested, 4),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! ## Logging
//!
//! Window refills, flushes, seeks and page mappings are reported through `tracing` at the
//! `debug` and `trace` levels. The library never installs a subscriber.

#[macro_use]
pub(crate) mod error;

/// Shared helpers for the unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use binbuf::prelude::*;
///
/// let mut reader = Reader::for_memory(vec![0x3C, 0x00]);
/// assert_eq!(reader.read_half()?, 1.0);
/// # Ok::<(), binbuf::Error>(())
/// ```
pub mod prelude;

pub mod codec;
pub mod paged;
pub mod record;
pub mod source;

/// `binbuf` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `binbuf` Error type
///
/// The single error type for all operations in this crate.
pub use error::Error;

/// Typed readers and writers over any [`source::Source`].
pub use codec::{Charset, PrefixWidth, Reader, Writer};

/// Composite values with a fixed binary layout.
pub use record::Record;

/// Paged memory-mapped files.
pub use paged::{PagedConfig, PagedFile};

/// The buffering contract and its most common configuration types.
pub use source::{ByteOrder, Capabilities, Source, SourceConfig};
