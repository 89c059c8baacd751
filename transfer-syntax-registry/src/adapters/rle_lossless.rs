//! Support for RLE Lossless image decoding and encoding.
//!
//! Each frame starts with a 64-byte header:
//! the number of segments followed by 15 segment offsets,
//! all as little endian 32-bit integers.
//! Every segment holds one byte plane of one sample,
//! most significant byte first,
//! compressed with the PackBits scheme.
use byteordered::byteorder::{ByteOrder, LittleEndian};

use dcmio_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, FrameInfo,
    PixelDataReader, PixelDataWriter,
};
use dcmio_encoding::snafu::prelude::*;
use tracing::warn;

const HEADER_LEN: usize = 64;
const MAX_SEGMENTS: usize = 15;

/// Pixel data adapter for the RLE Lossless transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RleLosslessAdapter;

fn segment_count(samples_per_pixel: usize, bytes_per_sample: usize) -> Option<usize> {
    let count = samples_per_pixel * bytes_per_sample;
    (count > 0 && count <= MAX_SEGMENTS).then_some(count)
}

/// Pixel data decoder for RLE Lossless (UID `1.2.840.10008.1.2.5`)
impl PixelDataReader for RleLosslessAdapter {
    fn decode_frame(&self, info: &FrameInfo, src: &[u8], dst: &mut Vec<u8>) -> DecodeResult<()> {
        ensure!(
            matches!(info.bits_allocated, 8 | 16 | 32),
            decode_error::UnsupportedSnafu {
                reason: format!("BitsAllocated of {}", info.bits_allocated),
            }
        );
        let spp = usize::from(info.samples_per_pixel);
        let bps = info.bytes_per_sample();
        let Some(expected_segments) = segment_count(spp, bps) else {
            return decode_error::UnsupportedSnafu {
                reason: format!("{} samples of {} bytes", spp, bps),
            }
            .fail();
        };
        if src.len() < HEADER_LEN {
            whatever!("RLE header truncated to {} bytes", src.len());
        }

        let count = LittleEndian::read_u32(&src[0..4]) as usize;
        if count != expected_segments {
            whatever!(
                "RLE frame has {} segments, expected {}",
                count,
                expected_segments
            );
        }
        let mut offsets = [0usize; MAX_SEGMENTS + 1];
        for (i, offset) in offsets.iter_mut().take(count).enumerate() {
            *offset = LittleEndian::read_u32(&src[4 + i * 4..8 + i * 4]) as usize;
        }
        offsets[count] = src.len();
        for (i, window) in offsets[..=count].windows(2).enumerate() {
            if window[0] < HEADER_LEN || window[0] > window[1] {
                whatever!("invalid offset {} of RLE segment {}", window[0], i);
            }
        }

        let pixels = usize::from(info.rows) * usize::from(info.columns);
        let base = dst.len();
        dst.resize(base + info.frame_len(), 0);
        for sample in 0..spp {
            for byte in 0..bps {
                let segment = sample * bps + byte;
                let plane = unpack_bits(&src[offsets[segment]..offsets[segment + 1]], pixels)?;
                if plane.len() < pixels {
                    whatever!(
                        "RLE segment {} decodes to {} bytes, expected {}",
                        segment,
                        plane.len(),
                        pixels
                    );
                }
                // native samples are little endian
                let lane = bps - 1 - byte;
                for (p, value) in plane.into_iter().enumerate() {
                    dst[base + (p * spp + sample) * bps + lane] = value;
                }
            }
        }
        Ok(())
    }
}

impl PixelDataWriter for RleLosslessAdapter {
    fn encode_frame(
        &self,
        info: &FrameInfo,
        src: &[u8],
        _options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        ensure!(
            src.len() == info.frame_len(),
            encode_error::FrameLengthSnafu {
                actual: src.len(),
                expected: info.frame_len(),
            }
        );
        ensure!(
            matches!(info.bits_allocated, 8 | 16 | 32),
            encode_error::UnsupportedSnafu {
                reason: format!("BitsAllocated of {}", info.bits_allocated),
            }
        );
        let spp = usize::from(info.samples_per_pixel);
        let bps = info.bytes_per_sample();
        let Some(count) = segment_count(spp, bps) else {
            return encode_error::UnsupportedSnafu {
                reason: format!("{} samples of {} bytes", spp, bps),
            }
            .fail();
        };
        let columns = usize::from(info.columns);
        let pixels = usize::from(info.rows) * columns;

        let start = dst.len();
        dst.resize(start + HEADER_LEN, 0);
        LittleEndian::write_u32(&mut dst[start..start + 4], count as u32);

        let mut plane = Vec::with_capacity(pixels);
        for sample in 0..spp {
            for byte in 0..bps {
                let segment = sample * bps + byte;
                let offset = dst.len() - start;
                let Ok(offset) = u32::try_from(offset) else {
                    whatever!("RLE segment offset {} out of range", offset);
                };
                LittleEndian::write_u32(
                    &mut dst[start + 4 + segment * 4..start + 8 + segment * 4],
                    offset,
                );

                let lane = bps - 1 - byte;
                plane.clear();
                plane.extend((0..pixels).map(|p| src[(p * spp + sample) * bps + lane]));
                // runs never cross row boundaries
                for row in plane.chunks(columns.max(1)) {
                    pack_bits(row, dst);
                }
                if (dst.len() - start) % 2 == 1 {
                    dst.push(0);
                }
            }
        }
        Ok(())
    }
}

/// Decode a PackBits segment, stopping once `expected` bytes are produced.
fn unpack_bits(segment: &[u8], expected: usize) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    let mut i = 0;
    while i < segment.len() && out.len() < expected {
        let header = segment[i] as i8;
        i += 1;
        match header {
            0..=127 => {
                let n = header as usize + 1;
                let Some(literal) = segment.get(i..i + n) else {
                    whatever!("RLE literal run of {} bytes truncated", n);
                };
                out.extend_from_slice(literal);
                i += n;
            }
            -127..=-1 => {
                let n = (1 - i32::from(header)) as usize;
                let Some(&value) = segment.get(i) else {
                    whatever!("RLE replicate run truncated");
                };
                out.resize(out.len() + n, value);
                i += 1;
            }
            // -128 is a no-op
            _ => {}
        }
    }
    if out.len() > expected {
        warn!(
            "RLE segment decodes to {} bytes, keeping {}",
            out.len(),
            expected
        );
        out.truncate(expected);
    }
    Ok(out)
}

/// Append the PackBits encoding of `data` to `out`.
fn pack_bits(data: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < data.len() {
        let value = data[i];
        let run = data[i..]
            .iter()
            .take(128)
            .take_while(|&&b| b == value)
            .count();
        if run >= 2 {
            out.push((1 - run as i32) as u8);
            out.push(value);
            i += run;
            continue;
        }
        // literal run, until the next pair of equal bytes
        let start = i;
        while i < data.len() && i - start < 128 {
            if i + 1 < data.len() && data[i] == data[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&data[start..i]);
    }
}
