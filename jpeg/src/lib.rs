//! A Huffman-coded JPEG codec, written for the needs of DICOM pixel data.
//!
//! Supported coding processes:
//!
//! - baseline sequential DCT (process 1, 8-bit samples);
//! - extended sequential DCT (processes 2 and 4, 8 or 12-bit samples);
//! - lossless sequential with selectable predictor
//!   (processes 14 and 14 with selection value 1, 2 to 16-bit samples).
//!
//! Progressive, hierarchical and arithmetic-coded streams
//! are recognized and rejected.
//!
//! Decoded samples are interleaved by pixel, rows from top to bottom.
//! Samples of up to 8 bits take one byte each,
//! wider samples take two bytes in little endian.
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    unused_qualifications,
    unused_import_braces,
    missing_debug_implementations
)]

pub mod dct;
pub mod decoder;
pub mod encoder;
mod entropy;
pub mod error;
pub mod huffman;
mod lossless;
pub mod marker;
pub mod quant;

pub use decoder::{decode, Decoder};
pub use encoder::{encode, Encoder, JpegEncodeOptions, Process};
pub use error::{Error, Result};
pub use huffman::HuffmanTable;

/// Dimensions and sample format of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// number of columns
    pub width: u16,
    /// number of rows
    pub height: u16,
    /// number of color components
    pub components: u8,
    /// bits per sample
    pub precision: u8,
}

impl ImageInfo {
    /// Bytes taken by one sample in the interleaved layout.
    pub fn bytes_per_sample(&self) -> usize {
        if self.precision > 8 {
            2
        } else {
            1
        }
    }

    /// The largest sample value.
    pub fn max_sample(&self) -> u16 {
        ((1u32 << self.precision) - 1) as u16
    }

    /// Length in bytes of the whole interleaved image.
    pub fn data_len(&self) -> usize {
        usize::from(self.width)
            * usize::from(self.height)
            * usize::from(self.components)
            * self.bytes_per_sample()
    }
}

/// An image and its interleaved samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub info: ImageInfo,
    pub data: Vec<u8>,
}

impl Image {
    /// The sample of component `c` at column `x` and row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside of the image.
    pub fn sample(&self, x: usize, y: usize, c: usize) -> u16 {
        let info = &self.info;
        let index = (y * usize::from(info.width) + x) * usize::from(info.components) + c;
        read_sample(&self.data, index, info.bytes_per_sample() == 2)
    }
}

/// Read sample `index` of an interleaved buffer.
#[inline]
pub(crate) fn read_sample(data: &[u8], index: usize, wide: bool) -> u16 {
    if wide {
        u16::from_le_bytes([data[index * 2], data[index * 2 + 1]])
    } else {
        u16::from(data[index])
    }
}

#[inline]
pub(crate) fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}
