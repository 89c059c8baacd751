use std::fs::File;
use std::io::{BufReader, Read};

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::{DataSet, ElementBuffer, Length, PixelFragments, VR};
use dcmio_dictionary_std::{tags, uids};
use dcmio_encoding::adapters::EncodeOptions;
use dcmio_object::{
    from_reader, open_file, write_data_set, FileDicomObject, FileMetaTableBuilder, OpenFileOptions, ReadPreamble,
    SequenceLength, WriteOptions,
};
use dcmio_transfer_syntax_registry::{entries, lookup};
use rstest::rstest;

fn item(value: u16) -> DataSet {
    let mut item = DataSet::new();
    item.put(ElementBuffer::from_strs(
        tags::REFERENCED_SOP_CLASS_UID,
        VR::UI,
        &[uids::SECONDARY_CAPTURE_IMAGE_STORAGE],
    ));
    item.put(ElementBuffer::from_strs(
        tags::REFERENCED_SOP_INSTANCE_UID,
        VR::UI,
        &[format!("1.2.3.{}", value)],
    ));
    item
}

fn sample_object(ts: &str) -> FileDicomObject {
    let mut obj = DataSet::new();
    obj.put(ElementBuffer::from_strs(
        tags::SOP_CLASS_UID,
        VR::UI,
        &[uids::SECONDARY_CAPTURE_IMAGE_STORAGE],
    ));
    obj.put(ElementBuffer::from_strs(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        &["1.2.3.4"],
    ));
    obj.put(ElementBuffer::from_strs(
        tags::PATIENT_NAME,
        VR::PN,
        &["Doe^Jane"],
    ));
    obj.put(ElementBuffer::from_u16s(tags::ROWS, VR::US, &[16]));
    obj.put(ElementBuffer::from_u16s(tags::COLUMNS, VR::US, &[16]));
    obj.put(ElementBuffer::from_u16s(tags::BITS_ALLOCATED, VR::US, &[8]));
    obj.put(ElementBuffer::from_u16s(tags::BITS_STORED, VR::US, &[8]));
    obj.put(ElementBuffer::from_u16s(tags::SAMPLES_PER_PIXEL, VR::US, &[1]));

    // a sequence with a nested sequence in its second item
    let mut nested = item(4);
    nested.put_sequence(tags::CONTENT_SEQUENCE, vec![item(9)]);
    obj.put_sequence(tags::REFERENCED_IMAGE_SEQUENCE, vec![item(1), nested]);

    obj.put(ElementBuffer::new(tags::PIXEL_DATA, VR::OB, gradient()));

    FileDicomObject::from_data_set(obj, FileMetaTableBuilder::new().transfer_syntax(ts)).unwrap()
}

fn gradient() -> Vec<u8> {
    (0..16u32)
        .flat_map(|y| (0..16u32).map(move |x| ((x + y) * 8) as u8))
        .collect()
}

#[rstest]
#[case(entries::uids::IMPLICIT_VR_LITTLE_ENDIAN)]
#[case(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)]
#[case(entries::uids::EXPLICIT_VR_BIG_ENDIAN)]
fn round_trip_native_transfer_syntaxes(#[case] ts: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.dcm");

    let obj = sample_object(ts);
    obj.write_to_file(&path).unwrap();

    let read = open_file(&path).unwrap();
    assert_eq!(read.meta().transfer_syntax(), ts);
    assert_eq!(read.meta().media_storage_sop_instance_uid, "1.2.3.4");
    // padding is stripped on read
    assert_eq!(read.string(tags::SOP_INSTANCE_UID).unwrap(), "1.2.3.4");
    assert_eq!(read.element(tags::SOP_INSTANCE_UID).unwrap().len(), 8);
    assert_eq!(read.string(tags::PATIENT_NAME).unwrap(), "Doe^Jane");
    assert_eq!(read.uint(tags::ROWS).unwrap(), 16);

    let items = read.sequence(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1].string(tags::REFERENCED_SOP_INSTANCE_UID).unwrap(),
        "1.2.3.4"
    );
    let nested = items[1].sequence(tags::CONTENT_SEQUENCE).unwrap();
    assert_eq!(
        nested[0].string(tags::REFERENCED_SOP_INSTANCE_UID).unwrap(),
        "1.2.3.9"
    );
    assert_eq!(read.depth(), 2);

    assert_eq!(read.decode_frame(0).unwrap().data, gradient());
    assert_eq!(read.tags().collect::<Vec<_>>(), obj.tags().collect::<Vec<_>>());

    // implicit VR reads pixel data back with its dictionary VR
    let mut expected = obj.into_inner();
    if ts == entries::uids::IMPLICIT_VR_LITTLE_ENDIAN {
        expected.put(ElementBuffer::new(tags::PIXEL_DATA, VR::OW, gradient()));
    }
    assert_eq!(read.into_inner(), expected);
}

#[test]
fn explicit_sequence_lengths() {
    let obj = sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
    let mut undefined = Vec::new();
    obj.write_all(&mut undefined).unwrap();
    let mut explicit = Vec::new();
    obj.write_all_with_options(
        &mut explicit,
        WriteOptions::new().sequence_length(SequenceLength::Explicit),
    )
    .unwrap();

    // without 3 item delimiters and 2 sequence delimiters
    assert_eq!(undefined.len() - explicit.len(), 5 * 8);

    let read = dcmio_object::from_reader(&explicit[..]).unwrap();
    let items = read.sequence(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].string(tags::REFERENCED_SOP_CLASS_UID).unwrap(),
        uids::SECONDARY_CAPTURE_IMAGE_STORAGE
    );
    let nested = items[1].sequence(tags::CONTENT_SEQUENCE).unwrap();
    assert_eq!(nested.len(), 1);
}

#[test]
fn depth_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.dcm");
    sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .write_to_file(&path)
        .unwrap();

    let err = OpenFileOptions::new()
        .max_depth(1)
        .open_file(&path)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthLimitReached);

    let obj = OpenFileOptions::new().max_depth(2).open_file(&path).unwrap();
    assert_eq!(obj.depth(), 2);
}

#[test]
fn read_until_pixel_data() {
    let mut bytes = Vec::new();
    sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .write_all(&mut bytes)
        .unwrap();

    let obj = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .from_reader(&bytes[..])
        .unwrap();
    assert!(obj.contains(tags::PATIENT_NAME));
    assert!(!obj.contains(tags::PIXEL_DATA));
}

#[rstest]
#[case(ReadPreamble::Auto, true, true)]
#[case(ReadPreamble::Auto, false, true)]
#[case(ReadPreamble::Always, true, true)]
#[case(ReadPreamble::Always, false, false)]
#[case(ReadPreamble::Never, false, true)]
#[case(ReadPreamble::Never, true, false)]
fn preamble_options(
    #[case] option: ReadPreamble,
    #[case] write_preamble: bool,
    #[case] ok: bool,
) {
    let mut bytes = Vec::new();
    sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .write_all_with_options(&mut bytes, WriteOptions::new().write_preamble(write_preamble))
        .unwrap();

    let result = OpenFileOptions::new()
        .read_preamble(option)
        .from_reader(&bytes[..]);
    match result {
        Ok(obj) => {
            assert!(ok);
            assert_eq!(obj.string(tags::PATIENT_NAME).unwrap(), "Doe^Jane");
        }
        Err(e) => assert!(!ok, "unexpected error: {}", e),
    }
}

#[rstest]
#[case(entries::uids::IMPLICIT_VR_LITTLE_ENDIAN)]
#[case(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)]
#[case(entries::uids::EXPLICIT_VR_BIG_ENDIAN)]
fn data_set_without_file_meta_group(#[case] ts: &str) {
    let obj = sample_object(ts);
    let mut bytes = Vec::new();
    write_data_set(
        &mut bytes,
        &obj,
        &lookup(ts).unwrap(),
        SequenceLength::Undefined,
    )
    .unwrap();

    let read = from_reader(&bytes[..]).unwrap();
    assert_eq!(read.meta().transfer_syntax(), ts);
    assert_eq!(
        read.meta().media_storage_sop_class_uid,
        uids::SECONDARY_CAPTURE_IMAGE_STORAGE
    );
    assert_eq!(read.meta().media_storage_sop_instance_uid, "1.2.3.4");
    assert_eq!(read.string(tags::PATIENT_NAME).unwrap(), "Doe^Jane");
    assert_eq!(read.sequence(tags::REFERENCED_IMAGE_SEQUENCE).unwrap().len(), 2);
    assert_eq!(read.decode_frame(0).unwrap().data, gradient());

    // without magic code, the first element must be in group 0002 or 0008
    let mut bytes = Vec::new();
    let mut patient = DataSet::new();
    patient.put(ElementBuffer::from_strs(tags::PATIENT_NAME, VR::PN, &["Doe^Jane"]));
    write_data_set(
        &mut bytes,
        &patient,
        &lookup(ts).unwrap(),
        SequenceLength::Undefined,
    )
    .unwrap();
    let err = from_reader(&bytes[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    let err = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Never)
        .from_reader(&bytes[..])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedFile);
}

#[test]
fn implicit_vr_takes_the_dictionary_vr() {
    let ts = lookup(entries::uids::IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
    let mut obj = DataSet::new();
    obj.put(ElementBuffer::from_f64s(tags::DIFFUSION_B_VALUE, VR::FD, &[1000.]));
    obj.put(ElementBuffer::from_u32s(tags::TEMPORAL_POSITION_INDEX, VR::UL, &[3]));
    obj.put(ElementBuffer::from_u16s(tags::SMALLEST_IMAGE_PIXEL_VALUE, VR::US, &[0]));
    // not in the dictionary
    obj.put(ElementBuffer::from_u32s(dcmio_core::Tag(0x0029, 0x1010), VR::UL, &[7]));

    let mut bytes = Vec::new();
    write_data_set(&mut bytes, &obj, &ts, SequenceLength::Undefined).unwrap();
    let read = dcmio_object::read_data_set(&bytes[..], &ts, Default::default()).unwrap();

    let b_value = read.element(tags::DIFFUSION_B_VALUE).unwrap();
    assert_eq!(b_value.vr(), VR::FD);
    assert_eq!(b_value.to_f64s().unwrap(), [1000.]);
    assert_eq!(read.element(tags::TEMPORAL_POSITION_INDEX).unwrap().vr(), VR::UL);
    assert_eq!(read.element(tags::SMALLEST_IMAGE_PIXEL_VALUE).unwrap().vr(), VR::US);
    let unknown = read.element(dcmio_core::Tag(0x0029, 0x1010)).unwrap();
    assert_eq!(unknown.vr(), VR::UN);
    assert_eq!(unknown.bytes(), &[7, 0, 0, 0]);
}

#[test]
fn offset_table_with_two_frames() {
    let frag0: Vec<u8> = (0..120).map(|x| x as u8).collect();
    let frag1: Vec<u8> = (0..95).map(|x| x as u8).collect();
    let mut obj = sample_object("1.2.840.10008.1.2.4.999");
    obj.put(ElementBuffer::from_strs(
        tags::NUMBER_OF_FRAMES,
        VR::IS,
        &["2"],
    ));
    // the second item starts after the 8-byte header of the first one
    obj.put_fragments(
        tags::PIXEL_DATA,
        PixelFragments::new(VR::OB, vec![0, 128], vec![frag0.clone(), frag1.clone()]),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragments.dcm");
    obj.write_to_file(&path).unwrap();

    let read = open_file(&path).unwrap();
    let fragments = read.fragments(tags::PIXEL_DATA).unwrap();
    assert_eq!(fragments.basic_offset_table(), &[0, 128]);
    // odd fragment padded on write
    assert_eq!(fragments.fragments()[1].len(), 96);
    assert_eq!(fragments.frame_table(2).unwrap().entries(), &[120]);
    assert_eq!(&fragments.frame(0, 2).unwrap()[..], &frag0[..]);
    assert_eq!(&fragments.frame(1, 2).unwrap()[..95], &frag1[..]);
}

#[test]
fn unknown_transfer_syntax_keeps_tags() {
    let mut obj = sample_object("1.2.840.10008.1.2.4.999");
    obj.put_fragments(
        tags::PIXEL_DATA,
        PixelFragments::new(VR::OB, vec![], vec![vec![0xFF, 0xD8, 0xFF, 0xD9]]),
    );
    let mut bytes = Vec::new();
    obj.write_all(&mut bytes).unwrap();

    let read = dcmio_object::from_reader(&bytes[..]).unwrap();
    assert_eq!(read.string(tags::PATIENT_NAME).unwrap(), "Doe^Jane");
    assert_eq!(read.sequence(tags::REFERENCED_IMAGE_SEQUENCE).unwrap().len(), 2);

    let err = read.decode_frame(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongTransferSyntax);

    // strict reading refuses the file
    let err = OpenFileOptions::new()
        .strict_transfer_syntax(true)
        .from_reader(&bytes[..])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongTransferSyntax);
}

#[rstest]
#[case(entries::jpeg_lossless_first_order_prediction(), 0)]
#[case(entries::jpeg_lossless_non_hierarchical(), 0)]
#[case(entries::rle_lossless(), 0)]
#[case(entries::jpeg_baseline(), 12)]
fn encapsulated_file_round_trip(
    #[case] ts: dcmio_encoding::TransferSyntax,
    #[case] tolerance: i16,
) {
    let mut obj = sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
    obj.encode_pixel_data(&ts, &EncodeOptions::new().quality(95))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encapsulated.dcm");
    obj.write_to_file(&path).unwrap();

    let read = open_file(&path).unwrap();
    assert_eq!(read.meta().transfer_syntax(), ts.uid());
    let frame = read.decode_frame(0).unwrap();
    assert_eq!((frame.rows, frame.columns), (16, 16));
    assert_eq!(frame.data.len(), 256);
    for (a, b) in frame.data.iter().zip(gradient()) {
        assert!(
            (i16::from(*a) - i16::from(b)).abs() <= tolerance,
            "{} vs {}",
            a,
            b
        );
    }
}

#[test]
fn file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.dcm");
    sample_object(entries::uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .write_to_file(&path)
        .unwrap();

    let mut bytes = Vec::new();
    BufReader::new(File::open(&path).unwrap())
        .read_to_end(&mut bytes)
        .unwrap();
    assert!(bytes[..128].iter().all(|&b| b == 0));
    assert_eq!(&bytes[128..132], b"DICM");
    // (0002,0000) UL 4
    assert_eq!(&bytes[132..140], &[0x02, 0x00, 0x00, 0x00, b'U', b'L', 4, 0]);

    let group_length = u32::from_le_bytes([bytes[140], bytes[141], bytes[142], bytes[143]]);
    let obj = open_file(&path).unwrap();
    assert_eq!(obj.meta().information_group_length, group_length);
    assert!(Length(group_length).is_defined());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_file(dir.path().join("nope.dcm")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Open);
}
