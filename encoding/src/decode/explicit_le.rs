//! Explicit VR Little Endian syntax transfer implementation

use crate::decode::basic::{BasicDecoder, LittleEndianBasicDecoder};
use crate::decode::{
    decode_explicit_header, decode_item_header_with, BasicDecode, Decode, DecodeFrom,
    ReadTagSnafu, Result,
};
use byteordered::Endianness;
use dcmio_core::header::{DataElementHeader, SequenceItemHeader};
use dcmio_core::Tag;
use snafu::ResultExt;
use std::io::Read;

/// A data element decoder for the Explicit VR Little Endian transfer syntax.
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRLittleEndianDecoder {
    basic: LittleEndianBasicDecoder,
    strict: bool,
}

impl ExplicitVRLittleEndianDecoder {
    /// A decoder which fails on unknown VR codes
    /// instead of reading them as `UN`.
    pub fn strict() -> Self {
        ExplicitVRLittleEndianDecoder {
            basic: LittleEndianBasicDecoder,
            strict: true,
        }
    }
}

impl Decode for ExplicitVRLittleEndianDecoder {
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        decode_explicit_header(self.basic, self.strict, source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        decode_item_header_with(BasicDecoder::LE(self.basic), source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        self.basic.decode_tag(source).context(ReadTagSnafu)
    }
}

impl<S: ?Sized> DecodeFrom<S> for ExplicitVRLittleEndianDecoder
where
    S: Read,
{
    #[inline]
    fn decode_header(&self, source: &mut S) -> Result<(DataElementHeader, usize)> {
        Decode::decode_header(self, source)
    }

    #[inline]
    fn decode_item_header(&self, source: &mut S) -> Result<SequenceItemHeader> {
        Decode::decode_item_header(self, source)
    }

    #[inline]
    fn decode_tag(&self, source: &mut S) -> Result<Tag> {
        Decode::decode_tag(self, source)
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }
}

#[cfg(test)]
mod tests {
    use super::ExplicitVRLittleEndianDecoder;
    use crate::decode::Decode;
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_core::header::{HasLength, Header, Length, SequenceItemHeader};
    use dcmio_core::{Tag, VR};
    use std::io::Read;

    // manually crafting some DICOM data elements
    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x02, 0x00, 0x02, 0x00,     // (0002,0002) (LE) Media Storage SOP Class UID
            b'U', b'I',             // VR: UI (UID)
            0x1A, 0x00,             // Length: 26 bytes (LE)
                // UID: 1.2.840.10008.5.1.4.1.1.1
                b'1', b'.', b'2', b'.', b'8', b'4', b'0', b'.', b'1', b'0', b'0', b'0', b'8', b'.',
                b'5', b'.', b'1', b'.', b'4', b'.', b'1', b'.', b'1', b'.', b'1',
                0x00,               // Padding to make length even
        0x08, 0x00, 0x1B, 0x04,     // (0008,041B) (LE) RecordKey
            b'O', b'B',             // VR: OB (Other Byte)
            0x00, 0x00,             // Reserved, always 0
            0x02, 0x00, 0x00, 0x00, // Length: 2 bytes (LE)
                0x12, 0x34,
        0x72, 0x00, 0x82, 0x00,     // (0072,0082) (LE) SelectorSVValue
            b'S', b'V',             // VR: SV (Signed Very long)
            0x00, 0x00,             // Reserved, always 0
            0x08, 0x00, 0x00, 0x00, // Length: 8 bytes (LE)
                0x4E, 0xF3, 0x30, 0xA6, 0x4B, 0x9B, 0xB6, 0x01,
        0x09, 0x00, 0x10, 0x10,     // (0009,1010) (LE) private element
            b'X', b'X',             // VR: unknown
            0x00, 0x00,             // Reserved
            0x02, 0x00, 0x00, 0x00, // Length: 2 bytes (LE)
                0xAB, 0xCD,
    ];

    #[test]
    fn decode_explicit_vr_le_headers() {
        let dec = ExplicitVRLittleEndianDecoder::default();
        let mut cursor = RAW;

        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.tag(), Tag(0x0002, 0x0002));
        assert_eq!(elem.vr(), VR::UI);
        assert_eq!(elem.length(), Length(26));
        assert_eq!(bytes_read, 8);
        let mut value = [0u8; 26];
        cursor.read_exact(&mut value).unwrap();

        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.tag(), Tag(0x0008, 0x041B));
        assert_eq!(elem.vr(), VR::OB);
        assert_eq!(elem.length(), Length(2));
        assert_eq!(bytes_read, 12);
        cursor = &cursor[2..];

        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.vr(), VR::SV);
        assert_eq!(elem.length(), Length(8));
        assert_eq!(bytes_read, 12);
        cursor = &cursor[8..];

        // unknown VR read as UN with a 32-bit length
        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.tag(), Tag(0x0009, 0x1010));
        assert_eq!(elem.vr(), VR::UN);
        assert_eq!(elem.length(), Length(2));
        assert_eq!(bytes_read, 12);
    }

    #[test]
    fn strict_decoder_rejects_unknown_vr() {
        let dec = ExplicitVRLittleEndianDecoder::strict();
        let mut cursor = &RAW[RAW.len() - 14..];
        let err = dec.decode_header(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownVr);
    }

    #[rustfmt::skip]
    const RAW_SEQUENCE_ITEMS: &[u8] = &[
        0x08, 0x00, 0x3F, 0x10, // (0008,103F) SeriesDescriptionCodeSequence
            b'S', b'Q',         // VR: SQ
            0x00, 0x00,         // Reserved
            0xFF, 0xFF, 0xFF, 0xFF, // Length: undefined
        0xFE, 0xFF, 0x00, 0xE0, // item begin
            0x14, 0x00, 0x00, 0x00, // item length: 20
        0xFE, 0xFF, 0x0D, 0xE0, // item end
            0x00, 0x00, 0x00, 0x00,
        0xFE, 0xFF, 0xDD, 0xE0, // sequence end
            0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn decode_items() {
        let dec = ExplicitVRLittleEndianDecoder::default();
        let mut cursor = RAW_SEQUENCE_ITEMS;
        {
            let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
            assert_eq!(elem.tag(), Tag(0x0008, 0x103F));
            assert_eq!(elem.vr(), VR::SQ);
            assert!(elem.length().is_undefined());
            assert_eq!(bytes_read, 12);
        }
        {
            let elem = dec.decode_item_header(&mut cursor).unwrap();
            assert!(elem.is_item());
            assert_eq!(elem, SequenceItemHeader::Item { len: Length(20) });
        }
        {
            let elem = dec.decode_item_header(&mut cursor).unwrap();
            assert!(elem.is_item_delimiter());
            assert_eq!(elem, SequenceItemHeader::ItemDelimiter);
        }
        {
            // delimiters can also be read through `decode_header`
            let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
            assert!(elem.is_sequence_delimiter());
            assert_eq!(bytes_read, 8);
        }
    }
}
