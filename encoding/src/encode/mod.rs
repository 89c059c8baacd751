//! This module contains all DICOM data element encoding logic.
//!
//! Encoders only write headers, item markers and offset tables,
//! plus value bytes as held by an element buffer
//! (little endian, swapped here when the transfer syntax is big endian).

use crate::swap::swap_in_place;
use byteordered::byteorder::ByteOrder;
use byteordered::Endianness;
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::header::{tags, DataElementHeader, HasLength, Header};
use dcmio_core::vr::LengthField;
use dcmio_core::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::fmt;
use std::io::{self, Write};
use std::marker::PhantomData;

pub mod basic;
pub mod explicit_be;
pub mod explicit_le;
pub mod implicit_le;

pub use self::basic::BasicEncoder;
pub use self::explicit_be::ExplicitVRBigEndianEncoder;
pub use self::explicit_le::ExplicitVRLittleEndianEncoder;
pub use self::implicit_le::ImplicitVRLittleEndianEncoder;

/// Module-level error type:
/// for errors which may occur while encoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to write tag"))]
    WriteTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write element header"))]
    WriteHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write item header"))]
    WriteItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write item delimiter"))]
    WriteItemDelimiter {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write sequence delimiter"))]
    WriteSequenceDelimiter {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write value of {} element", vr))]
    WriteValue {
        vr: VR,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write pixel data offset table"))]
    WriteOffsetTable {
        backtrace: Backtrace,
        source: io::Error,
    },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Write
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type trait for an encoder of basic data properties.
/// Unlike `Encode` (and similar to `BasicDecode`), this trait is not object
/// safe because it's better to just provide a dynamic implementation.
pub trait BasicEncode {
    /// Retrieve the encoder's endianness.
    fn endianness(&self) -> Endianness;

    /// Encode an unsigned short value to the given writer.
    fn encode_us<W>(&self, to: W, value: u16) -> io::Result<()>
    where
        W: Write;

    /// Encode an unsigned long value to the given writer.
    fn encode_ul<W>(&self, to: W, value: u32) -> io::Result<()>
    where
        W: Write;

    /// Encode a DICOM attribute tag to the given writer.
    fn encode_tag<W>(&self, mut to: W, tag: Tag) -> io::Result<()>
    where
        W: Write,
    {
        self.encode_us(&mut to, tag.group())?;
        self.encode_us(to, tag.element())
    }
}

/// Type trait for a data element encoder.
pub trait Encode {
    /// Encode and write an element tag.
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write;

    /// Encode and write a data element header to the given destination.
    /// Returns the number of bytes effectively written on success.
    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write;

    /// Encode and write a DICOM sequence item header to the given destination.
    /* Although item element headers are always a tag and length sequence regardless of TS,
    the encoding of the length is unknown at this level. So no default impl. */
    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write;

    /// Encode and write a DICOM sequence item delimiter to the given destination.
    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// Encode and write a DICOM sequence delimiter to the given destination.
    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// Write the value bytes of an element,
    /// given in little endian as held by an element buffer.
    /// Returns the number of bytes written.
    fn encode_value<W>(&self, to: W, vr: VR, data: &[u8]) -> Result<usize>
    where
        W: Write;

    /// Encode and write a basic offset table (without its item header).
    /// Returns the number of bytes written.
    fn encode_offset_table<W>(&self, to: W, offset_table: &[u32]) -> Result<usize>
    where
        W: Write;
}

impl<T: ?Sized> Encode for &T
where
    T: Encode,
{
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_tag(to, tag)
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        (**self).encode_element_header(to, de)
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_item_header(to, len)
    }

    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_item_delimiter(to)
    }

    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_sequence_delimiter(to)
    }

    fn encode_value<W>(&self, to: W, vr: VR, data: &[u8]) -> Result<usize>
    where
        W: Write,
    {
        (**self).encode_value(to, vr, data)
    }

    fn encode_offset_table<W>(&self, to: W, offset_table: &[u32]) -> Result<usize>
    where
        W: Write,
    {
        (**self).encode_offset_table(to, offset_table)
    }
}

/// Type trait for a data element encoder to a single known writer type `W`.
/// Unlike `Encode`, this trait is object safe.
pub trait EncodeTo<W: ?Sized> {
    /// Encode and write an element tag.
    fn encode_tag(&self, to: &mut W, tag: Tag) -> Result<()>
    where
        W: Write;

    /// Encode and write a data element header to the given destination.
    /// Returns the number of bytes effectively written on success.
    fn encode_element_header(&self, to: &mut W, de: DataElementHeader) -> Result<usize>
    where
        W: Write;

    /// Encode and write a DICOM sequence item header to the given destination.
    fn encode_item_header(&self, to: &mut W, len: u32) -> Result<()>
    where
        W: Write;

    /// Encode and write a DICOM sequence item delimiter to the given destination.
    fn encode_item_delimiter(&self, to: &mut W) -> Result<()>
    where
        W: Write;

    /// Encode and write a DICOM sequence delimiter to the given destination.
    fn encode_sequence_delimiter(&self, to: &mut W) -> Result<()>
    where
        W: Write;

    /// Write the little endian value bytes of an element.
    fn encode_value(&self, to: &mut W, vr: VR, data: &[u8]) -> Result<usize>
    where
        W: Write;

    /// Encode and write a basic offset table.
    fn encode_offset_table(&self, to: &mut W, offset_table: &[u32]) -> Result<usize>
    where
        W: Write;

    /// The byte order of the transfer syntax.
    fn endianness(&self) -> Endianness;
}

/// A type binding of an encoder to a target writer.
pub struct EncoderFor<T, W: ?Sized> {
    inner: T,
    phantom: PhantomData<W>,
}

impl<T, W: ?Sized> EncoderFor<T, W> {
    /// Bind the given encoder to a writer type.
    pub fn new(inner: T) -> Self {
        EncoderFor {
            inner,
            phantom: PhantomData,
        }
    }
}

impl<T: fmt::Debug, W: ?Sized> fmt::Debug for EncoderFor<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EncoderFor")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T, W: ?Sized> Default for EncoderFor<T, W>
where
    T: Default,
{
    fn default() -> Self {
        EncoderFor::new(T::default())
    }
}

impl<T, W: ?Sized> EncodeTo<W> for EncoderFor<T, W>
where
    T: Encode + BasicEncode,
    W: Write,
{
    fn encode_tag(&self, to: &mut W, tag: Tag) -> Result<()> {
        Encode::encode_tag(&self.inner, to, tag)
    }

    fn encode_element_header(&self, to: &mut W, de: DataElementHeader) -> Result<usize> {
        self.inner.encode_element_header(to, de)
    }

    fn encode_item_header(&self, to: &mut W, len: u32) -> Result<()> {
        self.inner.encode_item_header(to, len)
    }

    fn encode_item_delimiter(&self, to: &mut W) -> Result<()> {
        self.inner.encode_item_delimiter(to)
    }

    fn encode_sequence_delimiter(&self, to: &mut W) -> Result<()> {
        self.inner.encode_sequence_delimiter(to)
    }

    fn encode_value(&self, to: &mut W, vr: VR, data: &[u8]) -> Result<usize> {
        self.inner.encode_value(to, vr, data)
    }

    fn encode_offset_table(&self, to: &mut W, offset_table: &[u32]) -> Result<usize> {
        self.inner.encode_offset_table(to, offset_table)
    }

    fn endianness(&self) -> Endianness {
        BasicEncode::endianness(&self.inner)
    }
}

impl<W: ?Sized, T: ?Sized> EncodeTo<W> for Box<T>
where
    T: EncodeTo<W>,
    W: Write,
{
    fn encode_tag(&self, to: &mut W, tag: Tag) -> Result<()> {
        (**self).encode_tag(to, tag)
    }

    fn encode_element_header(&self, to: &mut W, de: DataElementHeader) -> Result<usize> {
        (**self).encode_element_header(to, de)
    }

    fn encode_item_header(&self, to: &mut W, len: u32) -> Result<()> {
        (**self).encode_item_header(to, len)
    }

    fn encode_item_delimiter(&self, to: &mut W) -> Result<()> {
        (**self).encode_item_delimiter(to)
    }

    fn encode_sequence_delimiter(&self, to: &mut W) -> Result<()> {
        (**self).encode_sequence_delimiter(to)
    }

    fn encode_value(&self, to: &mut W, vr: VR, data: &[u8]) -> Result<usize> {
        (**self).encode_value(to, vr, data)
    }

    fn encode_offset_table(&self, to: &mut W, offset_table: &[u32]) -> Result<usize> {
        (**self).encode_offset_table(to, offset_table)
    }

    fn endianness(&self) -> Endianness {
        (**self).endianness()
    }
}

/// Shared explicit VR header encoding, for either byte order.
fn encode_explicit_header<B, W>(mut to: W, de: DataElementHeader) -> Result<usize>
where
    B: ByteOrder,
    W: Write,
{
    if de.tag().group() == 0xFFFE {
        // item related headers do not have a VR field
        return encode_implicit_header::<B, W>(to, de);
    }
    let vr_bytes = de.vr().to_bytes();
    match de.vr().info().length_field(true) {
        // PS3.5 7.1.2: 16-bit length field right after the VR
        LengthField::Short => {
            let mut buf = [0u8; 8];
            B::write_u16(&mut buf[0..], de.tag().group());
            B::write_u16(&mut buf[2..], de.tag().element());
            buf[4] = vr_bytes[0];
            buf[5] = vr_bytes[1];
            B::write_u16(&mut buf[6..], de.length().0 as u16);
            to.write_all(&buf).context(WriteHeaderSnafu)?;
            Ok(8)
        }
        // 2 reserved bytes set to zero, then a 32-bit length
        LengthField::Long => {
            let mut buf = [0u8; 12];
            B::write_u16(&mut buf[0..], de.tag().group());
            B::write_u16(&mut buf[2..], de.tag().element());
            buf[4] = vr_bytes[0];
            buf[5] = vr_bytes[1];
            // buf[6..8] is kept zero'd
            B::write_u32(&mut buf[8..], de.length().0);
            to.write_all(&buf).context(WriteHeaderSnafu)?;
            Ok(12)
        }
    }
}

/// Implicit VR header encoding: tag and 32-bit length.
fn encode_implicit_header<B, W>(mut to: W, de: DataElementHeader) -> Result<usize>
where
    B: ByteOrder,
    W: Write,
{
    let mut buf = [0u8; 8];
    B::write_u16(&mut buf[0..], de.tag().group());
    B::write_u16(&mut buf[2..], de.tag().element());
    B::write_u32(&mut buf[4..], de.length().0);
    to.write_all(&buf).context(WriteHeaderSnafu)?;
    Ok(8)
}

fn encode_tag_with<B, W>(mut to: W, tag: Tag) -> Result<()>
where
    B: ByteOrder,
    W: Write,
{
    let mut buf = [0u8; 4];
    B::write_u16(&mut buf[..], tag.group());
    B::write_u16(&mut buf[2..], tag.element());
    to.write_all(&buf).context(WriteTagSnafu)
}

fn encode_item_marker<B, W>(mut to: W, tag: Tag, len: u32) -> io::Result<()>
where
    B: ByteOrder,
    W: Write,
{
    let mut buf = [0u8; 8];
    B::write_u16(&mut buf, tag.group());
    B::write_u16(&mut buf[2..], tag.element());
    B::write_u32(&mut buf[4..], len);
    to.write_all(&buf)
}

fn encode_item_header_with<B, W>(to: W, len: u32) -> Result<()>
where
    B: ByteOrder,
    W: Write,
{
    encode_item_marker::<B, W>(to, tags::ITEM, len).context(WriteItemHeaderSnafu)
}

fn encode_item_delimiter_with<B, W>(to: W) -> Result<()>
where
    B: ByteOrder,
    W: Write,
{
    encode_item_marker::<B, W>(to, tags::ITEM_DELIMITATION_ITEM, 0)
        .context(WriteItemDelimiterSnafu)
}

fn encode_sequence_delimiter_with<B, W>(to: W) -> Result<()>
where
    B: ByteOrder,
    W: Write,
{
    encode_item_marker::<B, W>(to, tags::SEQUENCE_DELIMITATION_ITEM, 0)
        .context(WriteSequenceDelimiterSnafu)
}

fn encode_offset_table_with<B, W>(mut to: W, offset_table: &[u32]) -> Result<usize>
where
    B: ByteOrder,
    W: Write,
{
    let mut buf = vec![0u8; offset_table.len() * 4];
    B::write_u32_into(offset_table, &mut buf);
    to.write_all(&buf).context(WriteOffsetTableSnafu)?;
    Ok(buf.len())
}

/// Write little endian value bytes in the given byte order.
fn encode_value_in<W>(mut to: W, endianness: Endianness, vr: VR, data: &[u8]) -> Result<usize>
where
    W: Write,
{
    if endianness == Endianness::Big && vr.swap_unit() > 1 {
        let mut swapped = data.to_vec();
        swap_in_place(vr, &mut swapped);
        to.write_all(&swapped).context(WriteValueSnafu { vr })?;
    } else {
        to.write_all(data).context(WriteValueSnafu { vr })?;
    }
    Ok(data.len())
}
