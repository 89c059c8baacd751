//! Support for JPEG image decoding and encoding.

use dcmio_core::error::Kind;
use dcmio_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, FrameInfo,
    PixelDataReader, PixelDataWriter,
};
use dcmio_encoding::snafu::prelude::*;
use dcmio_encoding::snafu::IntoError;
use dcmio_jpeg::{Decoder, ImageInfo, JpegEncodeOptions, Process};
use std::borrow::Cow;

/// Pixel data adapter for JPEG-based transfer syntaxes.
///
/// Any baseline, extended or lossless stream can be decoded;
/// encoding uses the process the adapter was created for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegAdapter {
    process: Process,
    predictor: u8,
}

impl JpegAdapter {
    /// Adapter encoding with the baseline process.
    pub const fn baseline() -> Self {
        JpegAdapter {
            process: Process::Baseline,
            predictor: 1,
        }
    }

    /// Adapter encoding with the extended sequential process.
    pub const fn extended() -> Self {
        JpegAdapter {
            process: Process::Extended,
            predictor: 1,
        }
    }

    /// Adapter encoding with the lossless process
    /// and the given predictor selection value.
    pub const fn lossless(predictor: u8) -> Self {
        JpegAdapter {
            process: Process::Lossless,
            predictor,
        }
    }

    pub fn process(&self) -> Process {
        self.process
    }
}

impl PixelDataReader for JpegAdapter {
    /// Decode a single JPEG stream holding one frame.
    fn decode_frame(&self, info: &FrameInfo, src: &[u8], dst: &mut Vec<u8>) -> DecodeResult<()> {
        ensure!(
            info.bits_allocated == 8 || info.bits_allocated == 16,
            decode_error::UnsupportedSnafu {
                reason: format!("BitsAllocated of {}", info.bits_allocated),
            }
        );

        let codec_error =
            |e: dcmio_jpeg::Error| decode_error::CodecSnafu { kind: e.kind() }.into_error(Box::new(e));

        // the frame header is checked against the image attributes
        // before any sample buffer is allocated
        let jpeg = Decoder::new(src).read_info().map_err(codec_error)?;
        if usize::from(jpeg.width) != usize::from(info.columns)
            || usize::from(jpeg.height) != usize::from(info.rows)
            || u16::from(jpeg.components) != info.samples_per_pixel
        {
            whatever!(
                "JPEG frame is {}x{} with {} components, expected {}x{} with {}",
                jpeg.width,
                jpeg.height,
                jpeg.components,
                info.columns,
                info.rows,
                info.samples_per_pixel
            );
        }

        let image = Decoder::new(src).decode().map_err(codec_error)?;
        let jpeg = &image.info;

        dst.reserve(info.frame_len());
        match (jpeg.bytes_per_sample(), info.bits_allocated) {
            (1, 8) => dst.extend_from_slice(&image.data),
            (1, 16) => {
                for &b in &image.data {
                    dst.extend_from_slice(&u16::from(b).to_le_bytes());
                }
            }
            (2, 16) => {
                if info.pixel_representation == 1 && info.bits_stored < 16 {
                    // restore the sign bits dropped on encoding
                    let shift = 16 - info.bits_stored;
                    for pair in image.data.chunks_exact(2) {
                        let v = u16::from_le_bytes([pair[0], pair[1]]);
                        let signed = ((v << shift) as i16) >> shift;
                        dst.extend_from_slice(&signed.to_le_bytes());
                    }
                } else {
                    dst.extend_from_slice(&image.data);
                }
            }
            (_, bits) => {
                return decode_error::UnsupportedSnafu {
                    reason: format!(
                        "{}-bit JPEG samples in {}-bit allocation",
                        jpeg.precision, bits
                    ),
                }
                .fail();
            }
        }
        Ok(())
    }
}

impl PixelDataWriter for JpegAdapter {
    fn encode_frame(
        &self,
        info: &FrameInfo,
        src: &[u8],
        options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        ensure!(
            src.len() == info.frame_len(),
            encode_error::FrameLengthSnafu {
                actual: src.len(),
                expected: info.frame_len(),
            }
        );
        let precision = match (self.process, info.bits_allocated) {
            (Process::Baseline, 8) | (Process::Extended, 8) => 8,
            (Process::Extended, 16) if info.bits_stored <= 12 => 12,
            (Process::Lossless, 8) | (Process::Lossless, 16) if info.bits_stored >= 2 => {
                info.bits_stored.min(info.bits_allocated)
            }
            (process, bits) => {
                return encode_error::UnsupportedSnafu {
                    reason: format!(
                        "{} bits allocated, {} bits stored for {:?} JPEG",
                        bits, info.bits_stored, process
                    ),
                }
                .fail();
            }
        };
        ensure!(
            (1..=4).contains(&info.samples_per_pixel),
            encode_error::UnsupportedSnafu {
                reason: format!("{} samples per pixel", info.samples_per_pixel),
            }
        );

        let image_info = ImageInfo {
            width: info.columns,
            height: info.rows,
            components: info.samples_per_pixel as u8,
            precision: precision as u8,
        };
        let samples = native_samples(info, &image_info, src)?;

        let jpeg_options = JpegEncodeOptions {
            quality: options.quality.unwrap_or(90).clamp(1, 100),
            restart_interval: options.restart_interval.unwrap_or(0),
            optimize_huffman: options.effort.map_or(false, |effort| effort > 50),
            predictor: self.predictor,
            ..Default::default()
        };
        let stream = dcmio_jpeg::encode(&image_info, &samples, self.process, &jpeg_options)
            .map_err(|e| encode_error::CodecSnafu { kind: e.kind() }.into_error(Box::new(e)))?;
        dst.extend_from_slice(&stream);
        Ok(())
    }
}

/// Convert native frame bytes to the sample layout of the JPEG codec:
/// one byte per sample up to 8 bits, two bytes otherwise,
/// keeping only the stored bits.
fn native_samples<'a>(
    info: &FrameInfo,
    image: &ImageInfo,
    src: &'a [u8],
) -> EncodeResult<Cow<'a, [u8]>> {
    if info.bits_allocated == 8 {
        return Ok(Cow::Borrowed(src));
    }
    let mask = image.max_sample();
    if image.bytes_per_sample() == 2 {
        if mask == u16::MAX {
            return Ok(Cow::Borrowed(src));
        }
        let data = src
            .chunks_exact(2)
            .flat_map(|p| (u16::from_le_bytes([p[0], p[1]]) & mask).to_le_bytes())
            .collect();
        return Ok(Cow::Owned(data));
    }
    // 16 bits allocated, at most 8 bits stored
    let mut data = Vec::with_capacity(src.len() / 2);
    for p in src.chunks_exact(2) {
        let v = u16::from_le_bytes([p[0], p[1]]) & mask;
        data.push(v as u8);
    }
    Ok(Cow::Owned(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::error::ErrorKind;

    fn ramp(info: &FrameInfo) -> Vec<u8> {
        let n = info.frame_len() / info.bytes_per_sample();
        match info.bits_allocated {
            8 => (0..n).map(|i| (i % 200) as u8).collect(),
            _ => (0..n)
                .flat_map(|i| ((i * 13 % 4096) as u16).to_le_bytes())
                .collect(),
        }
    }

    #[test]
    fn lossless_16_bit_allocation() {
        let info = FrameInfo::new(12, 10, 1, 16).with_bits_stored(12);
        let native = ramp(&info);
        let adapter = JpegAdapter::lossless(1);
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&info, &native, &EncodeOptions::new(), &mut encoded)
            .unwrap();
        let mut decoded = Vec::new();
        adapter.decode_frame(&info, &encoded, &mut decoded).unwrap();
        assert_eq!(decoded, native);
    }

    #[test]
    fn eight_bit_streams_widen_to_16_bit_allocation() {
        let info8 = FrameInfo::new(8, 8, 1, 8);
        let native = ramp(&info8);
        let adapter = JpegAdapter::lossless(1);
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&info8, &native, &EncodeOptions::new(), &mut encoded)
            .unwrap();

        let info16 = FrameInfo::new(8, 8, 1, 16).with_bits_stored(8);
        let mut decoded = Vec::new();
        adapter.decode_frame(&info16, &encoded, &mut decoded).unwrap();
        assert_eq!(decoded.len(), 128);
        assert_eq!(decoded[2 * 5], native[5]);
        assert_eq!(decoded[2 * 5 + 1], 0);
    }

    #[test]
    fn signed_samples_keep_their_sign() {
        let mut info = FrameInfo::new(2, 2, 1, 16).with_bits_stored(12);
        info.pixel_representation = 1;
        let values: [i16; 4] = [-2048, -1, 0, 2047];
        let native: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let adapter = JpegAdapter::lossless(1);
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&info, &native, &EncodeOptions::new(), &mut encoded)
            .unwrap();
        let mut decoded = Vec::new();
        adapter.decode_frame(&info, &encoded, &mut decoded).unwrap();
        assert_eq!(decoded, native);
    }

    #[test]
    fn mismatched_dimensions_are_reported() {
        let info = FrameInfo::new(8, 8, 1, 8);
        let adapter = JpegAdapter::baseline();
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&info, &ramp(&info), &EncodeOptions::new(), &mut encoded)
            .unwrap();
        let mut decoded = Vec::new();
        let err = adapter
            .decode_frame(&FrameInfo::new(8, 9, 1, 8), &encoded, &mut decoded)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    }

    #[test]
    fn codec_errors_keep_their_kind() {
        let info = FrameInfo::new(8, 8, 1, 8);
        let mut decoded = Vec::new();
        let err = JpegAdapter::baseline()
            .decode_frame(&info, &[0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x02], &mut decoded)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);

        let err = JpegAdapter::baseline()
            .encode_frame(&info, &[0; 10], &EncodeOptions::new(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
