//! Explicit VR Big Endian syntax transfer implementation

use crate::encode::basic::BigEndianBasicEncoder;
use crate::encode::{
    encode_explicit_header, encode_item_delimiter_with, encode_item_header_with, encode_offset_table_with,
    encode_sequence_delimiter_with, encode_tag_with, encode_value_in, BasicEncode, Encode, Result,
};
use byteordered::byteorder::BigEndian;
use byteordered::Endianness;
use dcmio_core::header::DataElementHeader;
use dcmio_core::{Tag, VR};
use std::io::{self, Write};

/// A concrete encoder for the transfer syntax ExplicitVRBigEndianEncoder
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRBigEndianEncoder {
    basic: BigEndianBasicEncoder,
}

impl BasicEncode for ExplicitVRBigEndianEncoder {
    fn endianness(&self) -> Endianness {
        Endianness::Big
    }

    fn encode_us<S>(&self, to: S, value: u16) -> io::Result<()>
    where
        S: Write,
    {
        self.basic.encode_us(to, value)
    }

    fn encode_ul<S>(&self, to: S, value: u32) -> io::Result<()>
    where
        S: Write,
    {
        self.basic.encode_ul(to, value)
    }
}

impl Encode for ExplicitVRBigEndianEncoder {
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        encode_tag_with::<BigEndian, W>(to, tag)
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        encode_explicit_header::<BigEndian, W>(to, de)
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        encode_item_header_with::<BigEndian, W>(to, len)
    }

    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        encode_item_delimiter_with::<BigEndian, W>(to)
    }

    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        encode_sequence_delimiter_with::<BigEndian, W>(to)
    }

    fn encode_value<W>(&self, to: W, vr: VR, data: &[u8]) -> Result<usize>
    where
        W: Write,
    {
        encode_value_in(to, Endianness::Big, vr, data)
    }

    fn encode_offset_table<W>(&self, to: W, offset_table: &[u32]) -> Result<usize>
    where
        W: Write,
    {
        encode_offset_table_with::<BigEndian, W>(to, offset_table)
    }
}
