//! Implicit VR Little Endian syntax transfer implementation

use crate::encode::basic::LittleEndianBasicEncoder;
use crate::encode::{
    encode_implicit_header, encode_item_delimiter_with, encode_item_header_with, encode_offset_table_with,
    encode_sequence_delimiter_with, encode_tag_with, encode_value_in, BasicEncode, Encode, Result,
};
use byteordered::byteorder::LittleEndian;
use byteordered::Endianness;
use dcmio_core::header::DataElementHeader;
use dcmio_core::{Tag, VR};
use std::io::{self, Write};

/// A concrete encoder for the transfer syntax ImplicitVRLittleEndianEncoder
#[derive(Debug, Default, Clone)]
pub struct ImplicitVRLittleEndianEncoder {
    basic: LittleEndianBasicEncoder,
}

impl BasicEncode for ImplicitVRLittleEndianEncoder {
    fn endianness(&self) -> Endianness {
        Endianness::Little
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

impl Encode for ImplicitVRLittleEndianEncoder {
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        encode_tag_with::<LittleEndian, W>(to, tag)
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        encode_implicit_header::<LittleEndian, W>(to, de)
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        encode_item_header_with::<LittleEndian, W>(to, len)
    }

    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        encode_item_delimiter_with::<LittleEndian, W>(to)
    }

    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        encode_sequence_delimiter_with::<LittleEndian, W>(to)
    }

    fn encode_value<W>(&self, to: W, vr: VR, data: &[u8]) -> Result<usize>
    where
        W: Write,
    {
        encode_value_in(to, Endianness::Little, vr, data)
    }

    fn encode_offset_table<W>(&self, to: W, offset_table: &[u32]) -> Result<usize>
    where
        W: Write,
    {
        encode_offset_table_with::<LittleEndian, W>(to, offset_table)
    }
}

#[cfg(test)]
mod tests {
    use super::ImplicitVRLittleEndianEncoder;
    use crate::encode::Encode;
    use dcmio_core::header::{DataElementHeader, Length};
    use dcmio_core::{Tag, VR};

    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x08, 0x00, 0x60, 0x00,     // (0008,0060) Modality
            0x02, 0x00, 0x00, 0x00, // Length: 2
                b'M', b'R',
        0xFE, 0xFF, 0x00, 0xE0,     // item
            0x0A, 0x00, 0x00, 0x00, // Length: 10
    ];

    #[test]
    fn encode_implicit_vr_le() {
        let enc = ImplicitVRLittleEndianEncoder::default();
        let mut out = Vec::new();
        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0008, 0x0060), VR::CS, Length(2)),
            )
            .unwrap();
        assert_eq!(n, 8);
        enc.encode_value(&mut out, VR::CS, b"MR").unwrap();
        enc.encode_item_header(&mut out, 10).unwrap();
        assert_eq!(out, RAW);
    }
}
