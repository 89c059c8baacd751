//! Pixel data adapters reached through their transfer syntax.

use dcmio_core::{ErrorKind, Kind};
use dcmio_encoding::adapters::{EncodeOptions, FrameInfo, PixelDataReader, PixelDataWriter};
use dcmio_transfer_syntax_registry::entries::uids;
use dcmio_transfer_syntax_registry::lookup;

fn gradient(info: &FrameInfo) -> Vec<u8> {
    let (rows, cols) = (usize::from(info.rows), usize::from(info.columns));
    let spp = usize::from(info.samples_per_pixel);
    let max = (1u32 << info.bits_stored) - 1;
    let mut out = Vec::with_capacity(info.frame_len());
    for y in 0..rows {
        for x in 0..cols {
            for c in 0..spp {
                let v = ((x + y + c * 3) as u32 * max / (rows + cols + spp * 3) as u32) as u16;
                if info.bits_allocated == 8 {
                    out.push(v as u8);
                } else {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
    }
    out
}

fn round_trip(uid: &str, info: &FrameInfo, native: &[u8], options: &EncodeOptions) -> Vec<u8> {
    let ts = lookup(uid).unwrap();
    let mut encoded = Vec::new();
    ts.pixel_data_writer()
        .unwrap()
        .encode_frame(info, native, options, &mut encoded)
        .unwrap();
    let mut decoded = Vec::new();
    ts.pixel_data_reader()
        .unwrap()
        .decode_frame(info, &encoded, &mut decoded)
        .unwrap();
    decoded
}

#[test]
fn jpeg_lossless_is_exact() {
    let info = FrameInfo::new(24, 20, 1, 16).with_bits_stored(12);
    let native = gradient(&info);
    for uid in [
        uids::JPEG_LOSSLESS_NON_HIERARCHICAL,
        uids::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION,
    ] {
        let decoded = round_trip(uid, &info, &native, &EncodeOptions::new());
        assert_eq!(decoded, native, "{}", uid);
    }
}

#[test]
fn jpeg_baseline_is_close() {
    let info = FrameInfo::new(16, 16, 3, 8);
    let native = gradient(&info);
    let decoded = round_trip(
        uids::JPEG_BASELINE,
        &info,
        &native,
        &EncodeOptions::new().quality(95),
    );
    assert_eq!(decoded.len(), native.len());
    for (a, b) in decoded.iter().zip(&native) {
        assert!(a.abs_diff(*b) <= 16, "{} vs {}", a, b);
    }
}

#[test]
fn jpeg_extended_with_restart_intervals() {
    let info = FrameInfo::new(16, 24, 1, 16).with_bits_stored(12);
    let native = gradient(&info);
    let decoded = round_trip(
        uids::JPEG_EXTENDED,
        &info,
        &native,
        &EncodeOptions::new().quality(95).restart_interval(2),
    );
    for (a, b) in decoded.chunks_exact(2).zip(native.chunks_exact(2)) {
        let a = u16::from_le_bytes([a[0], a[1]]);
        let b = u16::from_le_bytes([b[0], b[1]]);
        assert!(a.abs_diff(b) <= 256, "{} vs {}", a, b);
    }
}

#[test]
fn rle_is_exact() {
    let rgb = FrameInfo::new(7, 9, 3, 8);
    let native = gradient(&rgb);
    assert_eq!(
        round_trip(uids::RLE_LOSSLESS, &rgb, &native, &EncodeOptions::new()),
        native
    );

    let mono = FrameInfo::new(5, 11, 1, 16);
    let native = gradient(&mono);
    assert_eq!(
        round_trip(uids::RLE_LOSSLESS, &mono, &native, &EncodeOptions::new()),
        native
    );
}

#[test]
fn baseline_rejects_16_bit_allocation() {
    let ts = lookup(uids::JPEG_BASELINE).unwrap();
    let info = FrameInfo::new(2, 2, 1, 16);
    let err = ts
        .pixel_data_writer()
        .unwrap()
        .encode_frame(&info, &[0; 8], &EncodeOptions::new(), &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
}

#[test]
fn jpeg_frame_size_is_checked_before_decoding() {
    #[rustfmt::skip]
    let jpeg: &[u8] = &[
        // SOI
        0xFF, 0xD8,
        // SOF0: 8 bits, 65535 x 65535, one component
        0xFF, 0xC0, 0x00, 0x0B, 0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
        0x01, 0x11, 0x00,
        // EOI
        0xFF, 0xD9,
    ];
    let ts = lookup(uids::JPEG_BASELINE).unwrap();
    let info = FrameInfo::new(4, 4, 1, 8);
    let mut out = Vec::new();
    let err = ts
        .pixel_data_reader()
        .unwrap()
        .decode_frame(&info, jpeg, &mut out)
        .unwrap_err();
    // the size mismatch is reported, not the missing scan
    assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    assert!(out.is_empty());
}
