use thiserror::Error;

use crate::source::Capabilities;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! invalid_argument {
    ($msg:expr) => {
        crate::Error::InvalidArgument($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument(format!($fmt, $($arg)*))
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants follow the failure classes of the buffering layer: a read or write that could
/// not obtain its bytes, an operation the source was never capable of, a bad argument, and
/// failures of the backing store itself. None of them is retried internally; every error
/// surfaces synchronously from the call that caused it.
///
/// # Error Categories
///
/// ## Data Availability
/// - [`Error::EndOfData`] - Not enough bytes even after a refill or flush cycle
/// - [`Error::OutOfBounds`] - Absolute access past the end of a paged file
///
/// ## Programming Errors
/// - [`Error::MissingCapability`] - Read, write or positional call on an incapable source
/// - [`Error::InvalidArgument`] - Out of range seek, zero limit, oversized prefixed string
/// - [`Error::Closed`] - The source has already been closed
///
/// ## Content Errors
/// - [`Error::Malformed`] - Bytes that do not decode in the requested charset
///
/// ## I/O Errors
/// - [`Error::FileError`] - Failure reported by the file, channel or mapping underneath
///
/// # Examples
///
/// ```rust
/// use binbuf::{Error, Reader};
///
/// let mut reader = Reader::for_memory(vec![0x01, 0x02]);
/// match reader.read_i32() {
///     Err(Error::EndOfData { requested, available }) => {
///         assert_eq!(requested, 4);
///         assert_eq!(available, 2);
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A read, or a write on a non-growable source, could not obtain the required bytes.
    ///
    /// The source already attempted one refill (or flush and refill) before reporting
    /// this, so the condition is terminal for the operation.
    ///
    /// # Fields
    ///
    /// * `requested` - Number of contiguous bytes the operation needed
    /// * `available` - Number of bytes that were actually available
    #[error("End of data - requested {requested} bytes, only {available} available")]
    EndOfData {
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes available after the refill attempt
        available: usize,
    },

    /// The operation needs a capability the source does not have.
    ///
    /// Reading from a write-only channel, writing to a read-only memory region or asking a
    /// one-directional stream for its position all end up here.
    #[error("Source lacks required capability {0:?}")]
    MissingCapability(Capabilities),

    /// An argument was outside the range the operation accepts.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// The data could not be decoded.
    ///
    /// Raised for string bytes that are not valid in the selected charset. The error
    /// includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted on a paged file.
    #[error("Out of Bound access would have occurred!")]
    OutOfBounds,

    /// The source was closed before the operation was issued.
    #[error("Source has been closed")]
    Closed,

    /// Filesystem, channel or mapping failure, propagated unchanged.
    ///
    /// After such an error in the middle of a refill or flush the window content is not
    /// guaranteed to be coherent; a fresh seek is required to re-establish a known state.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        let kind = match error {
            Error::FileError(inner) => return inner,
            Error::EndOfData { .. } | Error::OutOfBounds => std::io::ErrorKind::UnexpectedEof,
            Error::MissingCapability(_) => std::io::ErrorKind::Unsupported,
            Error::InvalidArgument(_) => std::io::ErrorKind::InvalidInput,
            Error::Malformed { .. } => std::io::ErrorKind::InvalidData,
            Error::Closed => std::io::ErrorKind::NotConnected,
        };
        std::io::Error::new(kind, error)
    }
}
