//! Lookup and registration through the global registry.

use dcmio_core::{ErrorKind, Kind};
use dcmio_encoding::transfer_syntax::{Codec, Endianness, TransferSyntax};
use dcmio_transfer_syntax_registry::entries::uids;
use dcmio_transfer_syntax_registry::{get_registry, lookup, register};
use rstest::rstest;
use std::thread;

#[rstest]
#[case(uids::IMPLICIT_VR_LITTLE_ENDIAN, Endianness::Little, false)]
#[case(uids::EXPLICIT_VR_LITTLE_ENDIAN, Endianness::Little, true)]
#[case(uids::EXPLICIT_VR_BIG_ENDIAN, Endianness::Big, true)]
fn native_syntaxes_are_fully_supported(
    #[case] uid: &str,
    #[case] endianness: Endianness,
    #[case] explicit_vr: bool,
) {
    let ts = lookup(uid).unwrap();
    assert_eq!(ts.uid(), uid);
    assert_eq!(ts.endianness(), endianness);
    assert_eq!(ts.is_explicit_vr(), explicit_vr);
    assert!(ts.is_codec_free());
    assert!(ts.fully_supported());
}

#[rstest]
#[case(uids::JPEG_BASELINE)]
#[case(uids::JPEG_EXTENDED)]
#[case(uids::JPEG_LOSSLESS_NON_HIERARCHICAL)]
#[case(uids::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION)]
#[case(uids::RLE_LOSSLESS)]
fn encapsulated_syntaxes_have_both_adapters(#[case] uid: &str) {
    let ts = lookup(uid).unwrap();
    assert!(ts.is_encapsulated_pixel_data());
    assert!(ts.pixel_data_reader().is_some());
    assert!(ts.pixel_data_writer().is_some());
    assert!(ts.fully_supported());
}

#[rstest]
#[case(uids::JPEG_LS_LOSSLESS)]
#[case(uids::JPEG_2000)]
fn stubs_are_known_without_codec(#[case] uid: &str) {
    let ts = lookup(uid).unwrap();
    assert!(ts.unsupported_pixel_encapsulation());
    // data sets can still be read
    assert!(ts.decoder().is_some());
}

#[test]
fn deflated_is_known_but_unsupported() {
    let ts = lookup(uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
    assert!(ts.unsupported());
    assert!(ts.decoder().is_none());
}

#[test]
fn unknown_uid() {
    let err = lookup("1.2.3.4.5.6.7").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongTransferSyntax);
}

#[test]
fn concurrent_lookup_and_registration() {
    const PRIVATE: &str = "1.2.826.0.1.3680043.9.7771.1";

    thread::scope(|s| {
        s.spawn(|| {
            register(TransferSyntax::new(
                PRIVATE,
                "Private Explicit VR Little Endian",
                Endianness::Little,
                true,
                Codec::None,
            ));
        });
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    let ts = get_registry()
                        .get(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                        .unwrap();
                    assert!(ts.is_explicit_vr());
                    // either absent or complete
                    if let Some(ts) = get_registry().get(PRIVATE) {
                        assert_eq!(ts.name(), "Private Explicit VR Little Endian");
                    }
                }
            });
        }
    });

    assert!(lookup(PRIVATE).unwrap().is_codec_free());
}
