//! Error type of the JPEG codec.

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_encoding::cursor::CursorError;
use snafu::{Backtrace, Snafu};

/// An error decoding or encoding a JPEG stream.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// A marker segment is malformed, truncated or out of place.
    #[snafu(display("Corrupted marker {:#04X} at offset {}: {}", marker, offset, reason))]
    CorruptedMarker {
        marker: u8,
        offset: usize,
        reason: String,
        backtrace: Backtrace,
    },
    /// The stream uses a coding process which is not implemented.
    #[snafu(display("Unsupported JPEG mode: {}", mode))]
    UnsupportedMode {
        mode: String,
        backtrace: Backtrace,
    },
    /// Restart markers or MCU counts do not agree with the frame.
    #[snafu(display("Checksum mismatch at offset {}: {}", offset, reason))]
    ChecksumMismatch {
        offset: usize,
        reason: String,
        backtrace: Backtrace,
    },
    /// No Huffman code of up to 16 bits matched the bit stream.
    #[snafu(display("Invalid Huffman code at offset {}", offset))]
    InvalidCode { offset: usize, backtrace: Backtrace },
    /// The code lengths and symbols do not form a valid prefix code.
    #[snafu(display("Invalid Huffman table: {}", reason))]
    InvalidTable { reason: String, backtrace: Backtrace },
    /// The symbol has no code in the Huffman table.
    #[snafu(display("Symbol {:#04X} has no Huffman code", symbol))]
    UnknownSymbol { symbol: u8, backtrace: Backtrace },
    /// The samples or options given to the encoder are not acceptable.
    #[snafu(display("Invalid encoder input: {}", reason))]
    InvalidInput { reason: String, backtrace: Backtrace },
    /// Could not write the encoded stream.
    #[snafu(display("Could not write JPEG stream"))]
    WriteStream { source: CursorError },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::CorruptedMarker { .. } | Error::InvalidTable { .. } => {
                ErrorKind::CorruptedMarker
            }
            Error::UnsupportedMode { .. } => ErrorKind::UnsupportedMode,
            Error::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Error::InvalidCode { .. } => ErrorKind::InvalidCode,
            Error::UnknownSymbol { .. } | Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::WriteStream { .. } => ErrorKind::Write,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
