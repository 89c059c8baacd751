//! Explicit VR Little Endian syntax transfer implementation

use crate::encode::basic::LittleEndianBasicEncoder;
use crate::encode::{
    encode_explicit_header, encode_item_delimiter_with, encode_item_header_with, encode_offset_table_with,
    encode_sequence_delimiter_with, encode_tag_with, encode_value_in, BasicEncode, Encode, Result,
};
use byteordered::byteorder::LittleEndian;
use byteordered::Endianness;
use dcmio_core::header::DataElementHeader;
use dcmio_core::{Tag, VR};
use std::io::{self, Write};

/// A concrete encoder for the transfer syntax ExplicitVRLittleEndianEncoder
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRLittleEndianEncoder {
    basic: LittleEndianBasicEncoder,
}

impl BasicEncode for ExplicitVRLittleEndianEncoder {
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

impl Encode for ExplicitVRLittleEndianEncoder {
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
        encode_explicit_header::<LittleEndian, W>(to, de)
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
    use super::ExplicitVRLittleEndianEncoder;
    use crate::encode::Encode;
    use dcmio_core::header::{DataElementHeader, Length};
    use dcmio_core::{Tag, VR};

    // manually crafting some DICOM data elements
    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x02, 0x00, 0x10, 0x00,     // (0002,0010) (LE) Transfer Syntax UID
            b'U', b'I',             // VR: UI (UID)
            0x14, 0x00,             // Length: 20 bytes (LE)
                // UID: 1.2.840.10008.1.2.1 (ExplicitVRLittleEndian)
                b'1', b'.', b'2', b'.', b'8', b'4', b'0', b'.', b'1', b'0', b'0', b'0', b'8', b'.',
                b'1', b'.', b'2', b'.', b'1',
                0x00,               // Padding to make length even
        0x08, 0x00, 0x1B, 0x04,     // (0008,041B) (LE) RecordKey
            b'O', b'B',             // VR: OB (Other Byte)
            0x00, 0x00,             // Reserved, always 0
            0x02, 0x00, 0x00, 0x00, // Length: 2 bytes (LE)
                0x12, 0x34,
        0x08, 0x00, 0x18, 0x11,     // (0008,1118) (LE) sequence
            b'S', b'Q',             // VR: SQ
            0x00, 0x00,             // Reserved, always 0
            0xFF, 0xFF, 0xFF, 0xFF, // Length: undefined
        0xFE, 0xFF, 0x00, 0xE0,     // item
            0xFF, 0xFF, 0xFF, 0xFF, // Length: undefined
        0xFE, 0xFF, 0x0D, 0xE0,     // item delimiter
            0x00, 0x00, 0x00, 0x00,
        0xFE, 0xFF, 0xDD, 0xE0,     // sequence delimiter
            0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn encode_explicit_vr_le() {
        let enc = ExplicitVRLittleEndianEncoder::default();
        let mut out = Vec::new();

        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0002, 0x0010), VR::UI, Length(20)),
            )
            .unwrap();
        assert_eq!(n, 8);
        enc.encode_value(&mut out, VR::UI, b"1.2.840.10008.1.2.1\0")
            .unwrap();

        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0008, 0x041B), VR::OB, Length(2)),
            )
            .unwrap();
        assert_eq!(n, 12);
        enc.encode_value(&mut out, VR::OB, &[0x12, 0x34]).unwrap();

        enc.encode_element_header(
            &mut out,
            DataElementHeader::new(Tag(0x0008, 0x1118), VR::SQ, Length::UNDEFINED),
        )
        .unwrap();
        enc.encode_item_header(&mut out, Length::UNDEFINED.0).unwrap();
        enc.encode_item_delimiter(&mut out).unwrap();
        enc.encode_sequence_delimiter(&mut out).unwrap();

        assert_eq!(out, RAW);
    }

    #[test]
    fn encode_offset_table() {
        let enc = ExplicitVRLittleEndianEncoder::default();
        let mut out = Vec::new();
        let n = enc.encode_offset_table(&mut out, &[0, 0x0102]).unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, [0, 0, 0, 0, 0x02, 0x01, 0, 0]);
    }
}
