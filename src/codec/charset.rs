//! Byte encodings for strings and the widths of string length prefixes.
//!
//! [`Charset`] maps between Rust strings and the raw bytes stored on the wire. The default,
//! [`Charset::Latin1`], stores exactly one byte per character, which is what fixed-size and
//! null-terminated fields in most binary layouts assume.

use std::borrow::Cow;

use strum::{Display, EnumIter};

use crate::Result;

/// Replacement byte written for characters a single-byte charset cannot represent.
const REPLACEMENT: u8 = b'?';

/// Character encoding used by the string codecs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Charset {
    /// ISO-8859-1, one byte per character, every byte value decodes
    #[default]
    Latin1,
    /// 7-bit US-ASCII, bytes above 0x7F decode to U+FFFD
    Ascii,
    /// UTF-8, invalid sequences are rejected on decode
    Utf8,
}

impl Charset {
    /// Encodes `text` into bytes.
    ///
    /// Characters outside the range of a single-byte charset are written as `?`.
    #[must_use]
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Charset::Utf8 => Cow::Borrowed(text.as_bytes()),
            Charset::Latin1 if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Charset::Ascii if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Charset::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT))
                    .collect(),
            ),
            Charset::Ascii => Cow::Owned(
                text.chars()
                    .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT })
                    .collect(),
            ),
        }
    }

    /// Decodes `bytes` into a string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8 under
    /// [`Charset::Utf8`]. The single-byte charsets never fail.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Ascii => Ok(bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect()),
            Charset::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_string()),
                Err(error) => Err(malformed_error!(
                    "invalid UTF-8 at byte {} of {}",
                    error.valid_up_to(),
                    bytes.len()
                )),
            },
        }
    }
}

/// Width of the unsigned length prefix in front of a length-prefixed string.
///
/// The prefix is written in the byte order of the source at the time of the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PrefixWidth {
    /// 1-byte prefix, strings up to 255 bytes
    U8,
    /// 2-byte prefix, strings up to 65535 bytes
    U16,
    /// 4-byte prefix, strings up to 4294967295 bytes
    U32,
}

impl PrefixWidth {
    /// Returns the prefix width for a byte count of 1, 2 or 4.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for any other width.
    pub fn from_bytes(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(PrefixWidth::U8),
            2 => Ok(PrefixWidth::U16),
            4 => Ok(PrefixWidth::U32),
            other => Err(invalid_argument!(
                "prefix width must be 1, 2 or 4 bytes, got {}",
                other
            )),
        }
    }

    /// Number of bytes the prefix occupies.
    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            PrefixWidth::U8 => 1,
            PrefixWidth::U16 => 2,
            PrefixWidth::U32 => 4,
        }
    }

    /// Largest string length, in bytes, the prefix can express.
    #[must_use]
    pub fn max_len(self) -> u64 {
        match self {
            PrefixWidth::U8 => u64::from(u8::MAX),
            PrefixWidth::U16 => u64::from(u16::MAX),
            PrefixWidth::U32 => u64::from(u32::MAX),
        }
    }
}
