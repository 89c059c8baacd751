//! This module contains all DICOM data element decoding logic.

use self::basic::BasicDecoder;
use self::explicit_le::ExplicitVRLittleEndianDecoder;
use self::implicit_le::{ImplicitVRLittleEndianDecoder, StandardImplicitVRLittleEndianDecoder};
use byteordered::Endianness;
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::header::{
    DataElementHeader, Length, SequenceItemHeader, SequenceItemHeaderError,
};
use dcmio_core::vr::LengthField;
use dcmio_core::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{self, Read};

pub mod basic;
pub mod explicit_be;
pub mod explicit_le;
pub mod implicit_le;

/// Module-level error type:
/// for errors which may occur while decoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the beginning (tag) of the header"))]
    ReadHeaderTag {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },
    #[snafu(display("Failed to read the item header"))]
    ReadItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's item length field"))]
    ReadItemLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's tag field"))]
    ReadTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's reserved bytes"))]
    ReadReserved {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's element length field"))]
    ReadLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's value representation"))]
    ReadVr {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Bad sequence item header"))]
    BadSequenceHeader { source: SequenceItemHeaderError },
    #[snafu(display(
        "Unknown value representation {:?} in element {}",
        String::from_utf8_lossy(code),
        tag
    ))]
    UnknownVr {
        tag: Tag,
        code: [u8; 2],
        backtrace: Backtrace,
    },
}

impl Error {
    fn io_source(&self) -> Option<&io::Error> {
        match self {
            Error::ReadHeaderTag { source, .. }
            | Error::ReadItemHeader { source, .. }
            | Error::ReadItemLength { source, .. }
            | Error::ReadTag { source, .. }
            | Error::ReadReserved { source, .. }
            | Error::ReadLength { source, .. }
            | Error::ReadVr { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the source ended right at the start of a header,
    /// which is the regular end of a data set.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, Error::ReadHeaderTag { source, .. } if source.kind() == io::ErrorKind::UnexpectedEof)
    }
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::BadSequenceHeader { .. } => ErrorKind::CorruptedFile,
            Error::UnknownVr { .. } => ErrorKind::UnknownVr,
            e => match e.io_source() {
                Some(io) if io.kind() == io::ErrorKind::UnexpectedEof => ErrorKind::EndOfStream,
                _ => ErrorKind::Read,
            },
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/** Obtain the default data element decoder.
 * According to the standard, data elements are encoded in Implicit
 * VR Little Endian by default.
 */
pub fn default_reader() -> StandardImplicitVRLittleEndianDecoder {
    ImplicitVRLittleEndianDecoder::default()
}

/** Obtain a data element decoder for reading the data elements in a DICOM
 * file's Meta information. According to the standard, these are always
 * encoded in Explicit VR Little Endian.
 */
pub fn file_header_decoder() -> ExplicitVRLittleEndianDecoder {
    ExplicitVRLittleEndianDecoder::default()
}

/** Type trait for reading and decoding basic data values from a data source.
 *
 * This trait aims to provide methods for reading binary numbers based on the
 * source's endianness. Unlike `Decode`, this trait is not object safe.
 * However, it doesn't have to because there are, and only will be, two
 * possible implementations (`LittleEndianBasicDecoder` and
 * `BigEndianBasicDecoder`).
 */
pub trait BasicDecode {
    /// Retrieve the source's endianness, as expected by this decoder.
    fn endianness(&self) -> Endianness;

    /// Decode an unsigned short value from the given source.
    fn decode_us<S>(&self, source: S) -> io::Result<u16>
    where
        S: Read;

    /// Decode an unsigned long value from the given source.
    fn decode_ul<S>(&self, source: S) -> io::Result<u32>
    where
        S: Read;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, mut source: S) -> io::Result<Tag>
    where
        S: Read,
    {
        let g = self.decode_us(&mut source)?;
        let e = self.decode_us(source)?;
        Ok(Tag(g, e))
    }
}

/** Type trait for reading and decoding DICOM data elements.
 *
 * The specific behaviour of decoding, even when abstracted from the original source,
 * may depend on the transfer syntax.
 */
pub trait Decode {
    /** Fetch and decode the next data element header from the given source.
     * This method returns only the header of the element. At the end of this operation, the source
     * will be pointing at the element's value data, which should be read or skipped as necessary.
     *
     * Decoding an item or sequence delimiter is considered valid, and so should be properly handled
     * by the decoder. The value representation in this case should be `UN`.
     *
     * Returns the expected header and the exact number of bytes read from the source.
     */
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read;

    /** Fetch and decode the next sequence item head from the given source. It is a separate method
     * because value representation is always implicit when reading item headers and delimiters.
     */
    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read;
}

impl<'a, T: ?Sized> Decode for &'a T
where
    T: Decode,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        (**self).decode_header(source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        (**self).decode_item_header(source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        (**self).decode_tag(source)
    }
}

/** Type trait for reading and decoding DICOM data elements from a specific source
 * reader type. Unlike `Decode`, this trait is object safe.
 */
pub trait DecodeFrom<S: ?Sized + Read> {
    /// Fetch and decode the next data element header from the given source.
    /// See [`Decode::decode_header`].
    fn decode_header(&self, source: &mut S) -> Result<(DataElementHeader, usize)>;

    /// Fetch and decode the next sequence item head from the given source.
    fn decode_item_header(&self, source: &mut S) -> Result<SequenceItemHeader>;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag(&self, source: &mut S) -> Result<Tag>;

    /// The byte order of binary values decoded by this decoder.
    fn endianness(&self) -> Endianness;
}

impl<S: ?Sized, T: ?Sized> DecodeFrom<S> for Box<T>
where
    S: Read,
    T: DecodeFrom<S>,
{
    fn decode_header(&self, source: &mut S) -> Result<(DataElementHeader, usize)> {
        (**self).decode_header(source)
    }

    fn decode_item_header(&self, source: &mut S) -> Result<SequenceItemHeader> {
        (**self).decode_item_header(source)
    }

    fn decode_tag(&self, source: &mut S) -> Result<Tag> {
        (**self).decode_tag(source)
    }

    fn endianness(&self) -> Endianness {
        (**self).endianness()
    }
}

/// Shared explicit VR header decoding, for either byte order.
///
/// An unrecognized VR code is read as `UN`
/// (with a 32-bit length field) unless `strict` is set.
fn decode_explicit_header<S, B>(
    basic: B,
    strict: bool,
    mut source: &mut S,
) -> Result<(DataElementHeader, usize)>
where
    S: ?Sized + Read,
    B: BasicDecode,
{
    // retrieve tag
    let tag = basic.decode_tag(&mut source).context(ReadHeaderTagSnafu)?;

    if tag.group() == 0xFFFE {
        // item delimiters do not have VR or reserved field
        let len = basic.decode_ul(&mut source).context(ReadItemLengthSnafu)?;
        return Ok((DataElementHeader::new(tag, VR::UN, Length(len)), 8));
    }

    // retrieve explicit VR
    let mut code = [0u8; 2];
    source.read_exact(&mut code).context(ReadVrSnafu)?;
    let vr = match VR::from_binary(code) {
        Some(vr) => vr,
        None if strict => return UnknownVrSnafu { tag, code }.fail(),
        None => {
            tracing::warn!(
                "Unknown VR {:?} in element {}, reading as UN",
                String::from_utf8_lossy(&code),
                tag
            );
            VR::UN
        }
    };

    // PS3.5 7.1.2: the length field width depends on the VR
    match vr.info().length_field(true) {
        LengthField::Short => {
            let len = basic.decode_us(&mut source).context(ReadLengthSnafu)?;
            Ok((DataElementHeader::new(tag, vr, Length(u32::from(len))), 8))
        }
        LengthField::Long => {
            // 2 reserved bytes, then 4 bytes for data length
            let mut reserved = [0u8; 2];
            source.read_exact(&mut reserved).context(ReadReservedSnafu)?;
            let len = basic.decode_ul(&mut source).context(ReadLengthSnafu)?;
            Ok((DataElementHeader::new(tag, vr, Length(len)), 12))
        }
    }
}

/// Shared item header decoding, for any transfer syntax.
fn decode_item_header_with<S>(basic: BasicDecoder, source: &mut S) -> Result<SequenceItemHeader>
where
    S: ?Sized + Read,
{
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf).context(ReadItemHeaderSnafu)?;
    let mut slice = &buf[..];
    let tag = basic.decode_tag(&mut slice).context(ReadItemHeaderSnafu)?;
    let len = basic.decode_ul(&mut slice).context(ReadItemHeaderSnafu)?;
    SequenceItemHeader::new(tag, Length(len)).context(BadSequenceHeaderSnafu)
}
