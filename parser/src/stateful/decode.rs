//! This module provides a higher level abstraction for reading DICOM data.
//!
//! A [`StatefulDecoder`] binds a data source to the element header decoder
//! of a transfer syntax and keeps track of the number of bytes read.
//! Values are read as raw bytes in little endian order,
//! swapped here when the transfer syntax is big endian.

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::header::{DataElementHeader, SequenceItemHeader};
use dcmio_core::Tag;
use dcmio_encoding::cursor::{CursorError, StreamReader};
use dcmio_encoding::decode::explicit_le::ExplicitVRLittleEndianDecoder;
use dcmio_encoding::decode::DecodeFrom;
use dcmio_encoding::swap::swap_in_place;
use dcmio_encoding::transfer_syntax::{DynDecoder, TransferSyntax};
use dcmio_encoding::Endianness;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::io::Read;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Decoding in transfer syntax {} is unsupported", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },

    #[snafu(display("Could not decode element header at position {}", position))]
    DecodeElementHeader {
        position: u64,
        #[snafu(backtrace)]
        source: dcmio_encoding::decode::Error,
    },

    #[snafu(display("Could not decode item header at position {}", position))]
    DecodeItemHeader {
        position: u64,
        #[snafu(backtrace)]
        source: dcmio_encoding::decode::Error,
    },

    #[snafu(display("Could not read value data at position {}", position))]
    ReadValueData {
        position: u64,
        #[snafu(backtrace)]
        source: CursorError,
    },

    #[snafu(display("Could not read value bytes at position {}", position))]
    ReadValue {
        position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Value of {} bytes truncated at position {} ({} bytes available)",
        len,
        position,
        available
    ))]
    TruncatedValue {
        len: u32,
        available: u64,
        position: u64,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Offset table of {} bytes at position {} is not a sequence of 32-bit offsets",
        len,
        position
    ))]
    UnalignedOffsetTable {
        len: u32,
        position: u64,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Undefined value length of element tagged {} at position {}",
        tag,
        position
    ))]
    UndefinedValueLength {
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
    },
}

impl Error {
    /// Whether the source ended right at the start of an element header,
    /// which is the regular end of a data set.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, Error::DecodeElementHeader { source, .. } if source.is_clean_eof())
    }
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedTransferSyntax { .. } => ErrorKind::WrongTransferSyntax,
            Error::DecodeElementHeader { source, .. } | Error::DecodeItemHeader { source, .. } => {
                match source.kind() {
                    // a header cut short is a truncated file
                    ErrorKind::EndOfStream => ErrorKind::CorruptedFile,
                    kind => kind,
                }
            }
            Error::ReadValueData { source, .. } => source.kind(),
            Error::ReadValue { .. } => ErrorKind::Read,
            Error::TruncatedValue { .. } | Error::UndefinedValueLength { .. } => {
                ErrorKind::CorruptedFile
            }
            Error::UnalignedOffsetTable { .. } => ErrorKind::CorruptedOffsetTable,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub trait StatefulDecode {
    /// Same as `Decode::decode_header` over the bound source.
    fn decode_header(&mut self) -> Result<DataElementHeader>;

    /// Same as `Decode::decode_item_header` over the bound source.
    fn decode_item_header(&mut self) -> Result<SequenceItemHeader>;

    /// Eagerly read the value of the element with the given header
    /// as bytes in little endian order.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O problems,
    /// or if the header has an undefined length.
    fn read_value_bytes(&mut self, header: &DataElementHeader) -> Result<Vec<u8>>;

    /// Read the following `len` bytes into a vector, as is.
    fn read_to_vec(&mut self, len: u32, vec: &mut Vec<u8>) -> Result<()>;

    /// Read the following `len` bytes as 32-bit unsigned integers
    /// in the byte order of the transfer syntax.
    fn read_u32_to_vec(&mut self, len: u32, vec: &mut Vec<u32>) -> Result<()>;

    /// Skip the following `len` bytes.
    fn skip_bytes(&mut self, len: u32) -> Result<()>;

    /// Retrieve the exact number of bytes read so far,
    /// including the base offset given at construction.
    fn position(&self) -> u64;
}

/// Alias for a dynamically resolved DICOM stateful decoder.
/// Although the data source may be known at compile time,
/// the required decoder may vary according to an object's transfer syntax.
pub type DynStatefulDecoder<S> = StatefulDecoder<DynDecoder<StreamReader<S>>, S>;

/// A stateful abstraction for the full DICOM content reading process.
/// `S` is the data source and `D` the element header decoder.
#[derive(Debug)]
pub struct StatefulDecoder<D, S> {
    from: StreamReader<S>,
    decoder: D,
    endianness: Endianness,
}

impl<S> DynStatefulDecoder<S>
where
    S: Read,
{
    /// Create a new DICOM parser for the given transfer syntax.
    ///
    /// `position` is the position of the source in the overall stream,
    /// used in error reports.
    pub fn new_with(from: S, ts: &TransferSyntax, strict_vr: bool, position: u64) -> Result<Self> {
        let decoder = ts
            .decoder_with::<StreamReader<S>>(strict_vr)
            .context(UnsupportedTransferSyntaxSnafu { uid: ts.uid() })?;
        Ok(StatefulDecoder {
            from: StreamReader::with_position(from, position),
            decoder,
            endianness: ts.endianness(),
        })
    }
}

/// Type alias for the DICOM parser of a file's meta group.
pub type FileHeaderParser<S> = StatefulDecoder<ExplicitVRLittleEndianDecoder, S>;

impl<S> FileHeaderParser<S>
where
    S: Read,
{
    /// Create a new DICOM stateful decoder for reading the file meta group,
    /// which is always in _Explicit VR Little Endian_.
    pub fn file_header_parser(from: S, position: u64) -> Self {
        StatefulDecoder {
            from: StreamReader::with_position(from, position),
            decoder: ExplicitVRLittleEndianDecoder::default(),
            endianness: Endianness::Little,
        }
    }
}

impl<D, S> StatefulDecoder<D, S>
where
    S: Read,
{
    /// Create a new DICOM stateful decoder from its parts.
    pub fn new(from: S, decoder: D, endianness: Endianness) -> Self {
        StatefulDecoder {
            from: StreamReader::new(from),
            decoder,
            endianness,
        }
    }

    /// Retrieve the underlying source.
    pub fn into_inner(self) -> S {
        self.from.into_inner()
    }
}

impl<D, S> StatefulDecode for StatefulDecoder<D, S>
where
    D: DecodeFrom<StreamReader<S>>,
    S: Read,
{
    fn decode_header(&mut self) -> Result<DataElementHeader> {
        let position = self.from.tell();
        self.decoder
            .decode_header(&mut self.from)
            .map(|(header, _)| header)
            .context(DecodeElementHeaderSnafu { position })
    }

    fn decode_item_header(&mut self) -> Result<SequenceItemHeader> {
        let position = self.from.tell();
        self.decoder
            .decode_item_header(&mut self.from)
            .context(DecodeItemHeaderSnafu { position })
    }

    fn read_value_bytes(&mut self, header: &DataElementHeader) -> Result<Vec<u8>> {
        let len = header.len.get().context(UndefinedValueLengthSnafu {
            tag: header.tag,
            position: self.from.tell(),
        })?;
        let mut value = Vec::new();
        self.read_to_vec(len, &mut value)?;
        if self.endianness == Endianness::Big {
            swap_in_place(header.vr, &mut value);
        }
        Ok(value)
    }

    fn read_to_vec(&mut self, len: u32, vec: &mut Vec<u8>) -> Result<()> {
        let position = self.from.tell();
        // lengths come from the file, so do not trust them for allocation
        let start = vec.len();
        (&mut self.from)
            .take(u64::from(len))
            .read_to_end(vec)
            .context(ReadValueSnafu { position })?;
        let available = (vec.len() - start) as u64;
        ensure!(
            available == u64::from(len),
            TruncatedValueSnafu {
                len,
                available,
                position,
            }
        );
        Ok(())
    }

    fn read_u32_to_vec(&mut self, len: u32, vec: &mut Vec<u32>) -> Result<()> {
        ensure!(
            len % 4 == 0,
            UnalignedOffsetTableSnafu {
                len,
                position: self.from.tell(),
            }
        );
        let mut bytes = Vec::new();
        self.read_to_vec(len, &mut bytes)?;
        let endianness = self.endianness;
        vec.extend(bytes.chunks_exact(4).map(|c| {
            let c = [c[0], c[1], c[2], c[3]];
            match endianness {
                Endianness::Little => u32::from_le_bytes(c),
                Endianness::Big => u32::from_be_bytes(c),
            }
        }));
        Ok(())
    }

    fn skip_bytes(&mut self, len: u32) -> Result<()> {
        let position = self.from.tell();
        self.from
            .skip(u64::from(len))
            .context(ReadValueDataSnafu { position })
    }

    #[inline]
    fn position(&self) -> u64 {
        self.from.tell()
    }
}

impl<S: ?Sized> StatefulDecode for &mut S
where
    S: StatefulDecode,
{
    fn decode_header(&mut self) -> Result<DataElementHeader> {
        (**self).decode_header()
    }

    fn decode_item_header(&mut self) -> Result<SequenceItemHeader> {
        (**self).decode_item_header()
    }

    fn read_value_bytes(&mut self, header: &DataElementHeader) -> Result<Vec<u8>> {
        (**self).read_value_bytes(header)
    }

    fn read_to_vec(&mut self, len: u32, vec: &mut Vec<u8>) -> Result<()> {
        (**self).read_to_vec(len, vec)
    }

    fn read_u32_to_vec(&mut self, len: u32, vec: &mut Vec<u32>) -> Result<()> {
        (**self).read_u32_to_vec(len, vec)
    }

    fn skip_bytes(&mut self, len: u32) -> Result<()> {
        (**self).skip_bytes(len)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}
