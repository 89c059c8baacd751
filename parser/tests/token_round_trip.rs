//! Data set tokens written and read back in each native transfer syntax.

use dcmio_core::{DataElementHeader, Length, Tag, VR};
use dcmio_parser::dataset::{DataSetReader, DataSetWriter, DataToken};
use dcmio_transfer_syntax_registry::entries::uids;
use dcmio_transfer_syntax_registry::lookup;
use rstest::rstest;

fn header(tag: Tag, vr: VR, len: u32) -> DataToken {
    DataToken::ElementHeader(DataElementHeader::new(tag, vr, Length(len)))
}

fn body() -> Vec<DataToken> {
    vec![
        header(Tag(0x0008, 0x0016), VR::UI, 26),
        DataToken::PrimitiveValue(b"1.2.840.10008.5.1.4.1.1.7\0".to_vec()),
        // ReferencedImageSequence
        DataToken::SequenceStart {
            tag: Tag(0x0008, 0x1140),
            len: Length::UNDEFINED,
        },
        DataToken::ItemStart {
            len: Length::UNDEFINED,
        },
        header(Tag(0x0008, 0x1155), VR::UI, 8),
        DataToken::PrimitiveValue(b"1.2.3.4\0".to_vec()),
        DataToken::ItemEnd,
        DataToken::SequenceEnd,
        header(Tag(0x0010, 0x0010), VR::PN, 8),
        DataToken::PrimitiveValue(b"Doe^Jane".to_vec()),
        header(Tag(0x0028, 0x0010), VR::US, 2),
        DataToken::PrimitiveValue(vec![0x00, 0x02]),
        header(Tag(0x0028, 0x0030), VR::DS, 8),
        DataToken::PrimitiveValue(b"0.5\\0.5 ".to_vec()),
    ]
}

#[rstest]
#[case(uids::IMPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_BIG_ENDIAN)]
fn tokens_survive_a_round_trip(#[case] uid: &str) {
    let ts = lookup(uid).unwrap();
    let tokens = body();

    let mut out = Vec::new();
    let mut writer = DataSetWriter::with_ts(&mut out, &ts).unwrap();
    writer.write_sequence(tokens.clone()).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let reader = DataSetReader::new_with_ts(&out[..], &ts).unwrap();
    let read: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(read, tokens);
}

#[test]
fn big_endian_swaps_binary_values() {
    let ts = lookup(uids::EXPLICIT_VR_BIG_ENDIAN).unwrap();
    let mut out = Vec::new();
    let mut writer = DataSetWriter::with_ts(&mut out, &ts).unwrap();
    writer
        .write_sequence(vec![
            header(Tag(0x0028, 0x0010), VR::US, 2),
            DataToken::PrimitiveValue(vec![0x00, 0x02]),
        ])
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    #[rustfmt::skip]
    let expected: &[u8] = &[
        // (0028,0010) US 2
        0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02,
        // 512 in big endian
        0x02, 0x00,
    ];
    assert_eq!(out, expected);
}

#[test]
fn encapsulated_pixel_data_round_trip() {
    let ts = lookup(uids::RLE_LOSSLESS).unwrap();
    let tokens = vec![
        DataToken::PixelSequenceStart { vr: VR::OB },
        DataToken::ItemStart { len: Length(8) },
        DataToken::OffsetTable(vec![0, 12]),
        DataToken::ItemEnd,
        DataToken::ItemStart { len: Length(4) },
        DataToken::ItemValue(vec![1, 2, 3, 4]),
        DataToken::ItemEnd,
        DataToken::ItemStart { len: Length(6) },
        DataToken::ItemValue(vec![5, 6, 7, 8, 9, 10]),
        DataToken::ItemEnd,
        DataToken::SequenceEnd,
    ];

    let mut out = Vec::new();
    let mut writer = DataSetWriter::with_ts(&mut out, &ts).unwrap();
    writer.write_sequence(tokens.clone()).unwrap();
    writer.flush().unwrap();
    drop(writer);

    // header, offset table item, two fragment items, sequence delimiter
    assert_eq!(out.len(), 12 + (8 + 8) + (8 + 4) + (8 + 6) + 8);

    let reader = DataSetReader::new_with_ts(&out[..], &ts).unwrap();
    let read: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(read, tokens);
}
