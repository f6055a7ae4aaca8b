//! # binbuf Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the binbuf library. Import this module to get quick access to readers, writers,
//! sources and their configuration.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all binbuf operations
pub use crate::Error;

/// The result type used throughout binbuf
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Typed readers and writers
pub use crate::{Reader, Writer};

/// Composite values encoded through readers and writers
pub use crate::Record;

/// Paged memory-mapped file access
pub use crate::paged::{PagedConfig, PagedFile};

// ================================================================================================
// Sources
// ================================================================================================

/// The buffering contract and its configuration
pub use crate::source::{ByteOrder, Capabilities, Source, SourceConfig};

/// Concrete sources and channels
pub use crate::source::{
    BufferedSource, Channel, FileSource, Inbound, MemorySource, Outbound, Seekable,
};

// ================================================================================================
// Codec
// ================================================================================================

/// String encodings and length prefixes
pub use crate::codec::{Charset, PrefixWidth};

/// Fixed-width values
pub use crate::codec::io::Primitive;
