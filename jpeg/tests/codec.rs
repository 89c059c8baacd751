//! Encoding and decoding whole images.

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_jpeg::{decode, encode, Decoder, ImageInfo, JpegEncodeOptions, Process};
use rstest::rstest;

/// Deterministic noise, so that every difference category shows up.
fn noise(len: usize, max: u16, seed: u32) -> Vec<u16> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            ((state >> 8) % (u32::from(max) + 1)) as u16
        })
        .collect()
}

fn gradient(info: &ImageInfo) -> Vec<u16> {
    let max = u32::from(info.max_sample());
    let (w, h) = (u32::from(info.width), u32::from(info.height));
    let mut samples = Vec::with_capacity(info.data_len());
    for y in 0..h {
        for x in 0..w {
            for c in 0..u32::from(info.components) {
                samples.push(((x * 3 + y * 2 + c * 20) * max / (3 * w + 2 * h + 60)) as u16);
            }
        }
    }
    samples
}

fn to_bytes(info: &ImageInfo, samples: &[u16]) -> Vec<u8> {
    if info.bytes_per_sample() == 2 {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    } else {
        samples.iter().map(|&s| s as u8).collect()
    }
}

fn info(width: u16, height: u16, components: u8, precision: u8) -> ImageInfo {
    ImageInfo {
        width,
        height,
        components,
        precision,
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(5)]
#[case(6)]
#[case(7)]
fn lossless_is_exact_for_every_predictor(#[case] predictor: u8) {
    let info = info(23, 17, 1, 16);
    let samples = noise(23 * 17, u16::MAX, u32::from(predictor));
    let data = to_bytes(&info, &samples);
    let options = JpegEncodeOptions {
        predictor,
        ..Default::default()
    };
    let jpeg = encode(&info, &data, Process::Lossless, &options).unwrap();
    let image = decode(&jpeg).unwrap();
    assert_eq!(image.info, info);
    assert_eq!(image.data, data);
}

#[rstest]
#[case(info(16, 16, 1, 8))]
#[case(info(7, 5, 3, 8))]
#[case(info(31, 9, 1, 12))]
#[case(info(12, 12, 3, 2))]
fn lossless_round_trip(#[case] info: ImageInfo) {
    let samples = noise(info.data_len() / info.bytes_per_sample(), info.max_sample(), 7);
    let data = to_bytes(&info, &samples);
    let options = JpegEncodeOptions {
        predictor: 4,
        restart_interval: 5,
        ..Default::default()
    };
    let jpeg = encode(&info, &data, Process::Lossless, &options).unwrap();
    let image = decode(&jpeg).unwrap();
    assert_eq!(image.data, data);
}

#[test]
fn lossless_point_transform_drops_low_bits() {
    let info = info(10, 10, 1, 12);
    let samples = noise(100, info.max_sample(), 3);
    let data = to_bytes(&info, &samples);
    let options = JpegEncodeOptions {
        predictor: 6,
        point_transform: 2,
        ..Default::default()
    };
    let jpeg = encode(&info, &data, Process::Lossless, &options).unwrap();
    let image = decode(&jpeg).unwrap();
    for (i, &s) in samples.iter().enumerate() {
        assert_eq!(image.sample(i % 10, i / 10, 0), s & !0b11);
    }
}

#[rstest]
#[case(info(40, 24, 1, 8), Process::Baseline, false)]
#[case(info(33, 21, 3, 8), Process::Baseline, true)]
#[case(info(16, 16, 1, 8), Process::Extended, false)]
#[case(info(19, 11, 1, 12), Process::Extended, false)]
fn lossy_stays_close(#[case] info: ImageInfo, #[case] process: Process, #[case] optimize: bool) {
    let samples = gradient(&info);
    let data = to_bytes(&info, &samples);
    let options = JpegEncodeOptions {
        quality: 95,
        optimize_huffman: optimize,
        ..Default::default()
    };
    let jpeg = encode(&info, &data, process, &options).unwrap();
    let image = decode(&jpeg).unwrap();
    assert_eq!(image.info, info);

    // tolerance relative to the sample range
    let tolerance = i32::from(info.max_sample()) / 16;
    let width = usize::from(info.width);
    let components = usize::from(info.components);
    for (i, &expected) in samples.iter().enumerate() {
        let pixel = i / components;
        let actual = image.sample(pixel % width, pixel / width, i % components);
        let error = (i32::from(actual) - i32::from(expected)).abs();
        assert!(
            error <= tolerance,
            "sample {} decoded as {}, expected {}",
            i,
            actual,
            expected
        );
    }
}

#[test]
fn restart_intervals_decode() {
    let info = info(64, 24, 3, 8);
    let data = to_bytes(&info, &gradient(&info));
    let plain = decode(&encode(&info, &data, Process::Baseline, &Default::default()).unwrap())
        .unwrap();
    let options = JpegEncodeOptions {
        restart_interval: 3,
        ..Default::default()
    };
    let with_restarts = decode(&encode(&info, &data, Process::Baseline, &options).unwrap()).unwrap();
    assert_eq!(plain, with_restarts);
}

#[test]
fn wrong_restart_marker_is_detected() {
    let info = info(32, 8, 1, 8);
    let data = to_bytes(&info, &gradient(&info));
    let options = JpegEncodeOptions {
        restart_interval: 1,
        ..Default::default()
    };
    let mut jpeg = encode(&info, &data, Process::Baseline, &options).unwrap();
    let at = jpeg
        .windows(2)
        .position(|w| w == [0xFF, 0xD0])
        .expect("restart marker");
    jpeg[at + 1] = 0xD3;
    let err = decode(&jpeg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
}

#[test]
fn truncated_scan_is_detected() {
    let info = info(32, 32, 1, 8);
    let samples = noise(32 * 32, 255, 11);
    let data = to_bytes(&info, &samples);
    let jpeg = encode(&info, &data, Process::Lossless, &Default::default()).unwrap();
    let cut = &jpeg[..jpeg.len() - 200];
    let err = decode(cut).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
}

#[test]
fn header_can_be_read_alone() {
    let info = info(50, 20, 3, 8);
    let data = to_bytes(&info, &gradient(&info));
    let jpeg = encode(&info, &data, Process::Extended, &Default::default()).unwrap();
    assert_eq!(Decoder::new(&jpeg).read_info().unwrap(), info);
}

#[rstest]
#[case(0xC2)]
#[case(0xC9)]
#[case(0xC5)]
fn other_processes_are_unsupported(#[case] sof: u8) {
    let stream = [
        0xFF, 0xD8, // SOI
        0xFF, sof, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00, //
        0xFF, 0xD9,
    ];
    let err = decode(&stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
}

#[test]
fn garbage_is_not_a_jpeg_stream() {
    let err = decode(&[0x00, 0x01, 0x02, 0x03]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedMarker);
    // SOI alone
    let err = decode(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedMarker);
}
