//! Crate-level error kinds shared by the whole workspace.
//!
//! Each concrete error type in the workspace is a `snafu` enum
//! which can be classified into one [`ErrorKind`],
//! so that callers can react to a category of failure
//! without matching on every variant.

use std::fmt;

/// Enumerable classification of every public failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// a source or sink could not be opened
    Open,
    /// a read from the underlying source failed
    Read,
    /// a write to the underlying sink failed
    Write,
    /// the source ended before the requested bytes were available
    EndOfStream,
    /// the operation is not supported by the source (e.g. seeking back)
    UnsupportedOperation,
    /// malformed lengths, inconsistent structure or truncated content
    CorruptedFile,
    /// unrecognized value representation code
    UnknownVr,
    /// the transfer syntax UID is not registered or has no capable codec
    WrongTransferSyntax,
    /// sequence nesting went past the configured maximum
    DepthLimitReached,
    /// the basic offset table does not describe the frames
    CorruptedOffsetTable,
    /// the requested tag is not in the data set
    TagNotFound,
    /// the entry exists but has a different value representation
    WrongVr,
    /// the typed view is not compatible with the value representation
    TypeMismatch,
    /// another transaction holds a write checkout on the tag
    BufferLocked,
    /// a transaction is already open on the data set for this thread
    TransactionConflict,
    /// the compressed stream uses a coding mode which is not supported
    UnsupportedMode,
    /// a marker segment is malformed or out of place
    CorruptedMarker,
    /// restart markers or MCU counts are inconsistent
    ChecksumMismatch,
    /// no Huffman code matched the bit stream
    InvalidCode,
    /// input given by the caller is not acceptable
    InvalidInput,
}

impl ErrorKind {
    /// The error family of this kind.
    pub fn family(self) -> &'static str {
        use ErrorKind::*;
        match self {
            Open | Read | Write | EndOfStream | UnsupportedOperation => "StreamError",
            CorruptedFile | UnknownVr | WrongTransferSyntax | DepthLimitReached
            | CorruptedOffsetTable => "FormatError",
            TagNotFound | WrongVr | TypeMismatch | InvalidInput => "BufferError",
            BufferLocked | TransactionConflict => "TransactionError",
            UnsupportedMode | CorruptedMarker | ChecksumMismatch | InvalidCode => "CodecError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::{:?}", self.family(), self)
    }
}

/// Trait for error types which can be classified into an [`ErrorKind`].
pub trait Kind {
    /// The kind of this failure.
    fn kind(&self) -> ErrorKind;
}
