//! Explicit VR Big Endian syntax transfer implementation.

use crate::decode::basic::{BasicDecoder, BigEndianBasicDecoder};
use crate::decode::{
    decode_explicit_header, decode_item_header_with, BasicDecode, Decode, DecodeFrom,
    ReadTagSnafu, Result,
};
use byteordered::Endianness;
use dcmio_core::header::{DataElementHeader, SequenceItemHeader};
use dcmio_core::Tag;
use snafu::ResultExt;
use std::io::Read;

/// A data element decoder for the Explicit VR Big Endian transfer syntax.
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRBigEndianDecoder {
    basic: BigEndianBasicDecoder,
    strict: bool,
}

impl ExplicitVRBigEndianDecoder {
    /// A decoder which fails on unknown VR codes
    /// instead of reading them as `UN`.
    pub fn strict() -> Self {
        ExplicitVRBigEndianDecoder {
            basic: BigEndianBasicDecoder,
            strict: true,
        }
    }
}

impl Decode for ExplicitVRBigEndianDecoder {
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
        decode_item_header_with(BasicDecoder::BE(self.basic), source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        self.basic.decode_tag(source).context(ReadTagSnafu)
    }
}

impl<S: ?Sized> DecodeFrom<S> for ExplicitVRBigEndianDecoder
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
        Endianness::Big
    }
}

#[cfg(test)]
mod tests {
    use super::ExplicitVRBigEndianDecoder;
    use crate::decode::Decode;
    use dcmio_core::header::{HasLength, Header, Length, SequenceItemHeader};
    use dcmio_core::{Tag, VR};

    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x00, 0x28, 0x00, 0x10,     // (0028,0010) (BE) Rows
            b'U', b'S',             // VR: US
            0x00, 0x02,             // Length: 2 bytes (BE)
                0x02, 0x00,         // 512 (BE)
        0x7F, 0xE0, 0x00, 0x10,     // (7FE0,0010) (BE) Pixel Data
            b'O', b'W',             // VR: OW
            0x00, 0x00,             // Reserved
            0x00, 0x00, 0x00, 0x04, // Length: 4 bytes (BE)
                0x00, 0x01, 0x00, 0x02,
        0xFF, 0xFE, 0xE0, 0x00,     // item begin (BE)
            0x00, 0x00, 0x00, 0x10, // item length: 16
    ];

    #[test]
    fn decode_explicit_vr_be_headers() {
        let dec = ExplicitVRBigEndianDecoder::default();
        let mut cursor = RAW;

        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.tag(), Tag(0x0028, 0x0010));
        assert_eq!(elem.vr(), VR::US);
        assert_eq!(elem.length(), Length(2));
        assert_eq!(bytes_read, 8);
        cursor = &cursor[2..];

        let (elem, bytes_read) = dec.decode_header(&mut cursor).unwrap();
        assert_eq!(elem.tag(), Tag(0x7FE0, 0x0010));
        assert_eq!(elem.vr(), VR::OW);
        assert_eq!(elem.length(), Length(4));
        assert_eq!(bytes_read, 12);
        cursor = &cursor[4..];

        let item = dec.decode_item_header(&mut cursor).unwrap();
        assert_eq!(item, SequenceItemHeader::Item { len: Length(16) });
    }
}
