//! Core module for building pixel data adapters.
//!
//! Transfer syntaxes which define an encapsulated pixel data encoding
//! provide implementations of [`PixelDataReader`] and [`PixelDataWriter`]
//! working one frame at a time.
//! Frame bytes are resolved from the fragments by the caller,
//! together with a [`FrameInfo`] describing the image.

use dcmio_core::error::{ErrorKind, Kind};
use snafu::Snafu;

/// The possible error conditions when decoding (reading) pixel data.
///
/// Implementers of transfer syntaxes
/// are recommended to choose the most fitting error variant
/// for the tested condition.
/// When no suitable variant is available,
/// the [`Custom`](DecodeError::Custom) variant may be used.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum DecodeError {
    /// A custom error occurred when decoding,
    /// reported as a dynamic error value with a message.
    ///
    /// The [`whatever!`](snafu::whatever) macro can be used
    /// to easily create an error of this kind.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The codec failed on the compressed stream.
    #[snafu(display("{}", source))]
    Codec {
        /// classification of the codec failure
        kind: ErrorKind,
        /// the codec error
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The image description is not supported by this adapter.
    #[snafu(display("Unsupported image: {}", reason))]
    Unsupported {
        /// what is not supported
        reason: String,
    },
}

impl Kind for DecodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Custom { .. } => ErrorKind::CorruptedFile,
            DecodeError::Codec { kind, .. } => *kind,
            DecodeError::Unsupported { .. } => ErrorKind::UnsupportedMode,
        }
    }
}

/// The possible error conditions when encoding (writing) pixel data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum EncodeError {
    /// A custom error when encoding fails.
    /// Read the `message` and the underlying `source`
    /// for more details.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The codec rejected the samples or options.
    #[snafu(display("{}", source))]
    Codec {
        /// classification of the codec failure
        kind: ErrorKind,
        /// the codec error
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The frame does not hold as many bytes as the image description requires.
    #[snafu(display("Frame has {} bytes, expected {}", actual, expected))]
    FrameLength {
        /// bytes given
        actual: usize,
        /// bytes required
        expected: usize,
    },

    /// The image description is not supported by this adapter.
    #[snafu(display("Unsupported image: {}", reason))]
    Unsupported {
        /// what is not supported
        reason: String,
    },
}

impl Kind for EncodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::Custom { .. } => ErrorKind::InvalidInput,
            EncodeError::Codec { kind, .. } => *kind,
            EncodeError::FrameLength { .. } => ErrorKind::InvalidInput,
            EncodeError::Unsupported { .. } => ErrorKind::UnsupportedMode,
        }
    }
}

/// The result of decoding (reading) pixel data
pub type DecodeResult<T, E = DecodeError> = Result<T, E>;

/// The result of encoding (writing) pixel data
pub type EncodeResult<T, E = EncodeError> = Result<T, E>;

/// The image properties needed to decode or encode one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// _Rows_
    pub rows: u16,
    /// _Columns_
    pub columns: u16,
    /// _Samples per Pixel_
    pub samples_per_pixel: u16,
    /// _Bits Allocated_
    pub bits_allocated: u16,
    /// _Bits Stored_
    pub bits_stored: u16,
    /// _Pixel Representation_: 0 for unsigned, 1 for signed samples
    pub pixel_representation: u16,
}

impl FrameInfo {
    /// Describe an unsigned image with all allocated bits stored.
    pub fn new(rows: u16, columns: u16, samples_per_pixel: u16, bits_allocated: u16) -> Self {
        FrameInfo {
            rows,
            columns,
            samples_per_pixel,
            bits_allocated,
            bits_stored: bits_allocated,
            pixel_representation: 0,
        }
    }

    /// Set the number of bits stored per sample.
    pub fn with_bits_stored(mut self, bits_stored: u16) -> Self {
        self.bits_stored = bits_stored;
        self
    }

    /// Number of bytes per sample in native form.
    pub fn bytes_per_sample(&self) -> usize {
        (usize::from(self.bits_allocated) + 7) / 8
    }

    /// Number of bytes of one native (uncompressed) frame.
    pub fn frame_len(&self) -> usize {
        usize::from(self.rows)
            * usize::from(self.columns)
            * usize::from(self.samples_per_pixel)
            * self.bytes_per_sample()
    }
}

/// Custom options when encoding pixel data into an encapsulated form.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct EncodeOptions {
    /// The quality of the output image as a number between 0 and 100,
    /// where 100 is the best quality that the encapsulated form can achieve
    /// and smaller values represent smaller data size
    /// with an increasingly higher error.
    /// It is ignored if the transfer syntax only supports lossless compression.
    ///
    /// If this option is not specified,
    /// the output quality is decided automatically by the underlying adapter.
    pub quality: Option<u8>,

    /// The amount of effort that the encoder may take to encode the pixel data,
    /// as a number between 0 and 100.
    /// If supported, higher values result in better compression,
    /// at the expense of more processing time.
    pub effort: Option<u8>,

    /// Insert restart markers every this many MCUs, if supported.
    pub restart_interval: Option<u16>,
}

impl EncodeOptions {
    /// Options with every setting left to the adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output quality.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the encoding effort.
    pub fn effort(mut self, effort: u8) -> Self {
        self.effort = Some(effort);
        self
    }

    /// Set the restart interval.
    pub fn restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = Some(interval);
        self
    }
}

/// Trait object responsible for decoding
/// pixel data based on the transfer syntax.
///
/// A transfer syntax with support for decoding encapsulated pixel data
/// would implement this trait.
pub trait PixelDataReader: Send + Sync {
    /// Decode the bytes of one compressed frame
    /// into native pixel data as a byte stream in little endian,
    /// appending these bytes to the given vector `dst`.
    ///
    /// For 3-channel images,
    /// the output has each pixel contiguous in memory
    /// (planar configuration of 0).
    fn decode_frame(&self, info: &FrameInfo, src: &[u8], dst: &mut Vec<u8>) -> DecodeResult<()>;
}

/// Trait object responsible for encoding
/// pixel data based on a certain transfer syntax.
pub trait PixelDataWriter: Send + Sync {
    /// Encode one native frame (little endian samples, interleaved)
    /// into the format supported by this adapter,
    /// appending the bytes of a single fragment value to `dst`.
    fn encode_frame(
        &self,
        info: &FrameInfo,
        src: &[u8],
        options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::{whatever, ResultExt};

    fn failing_decode(data: &[u8]) -> DecodeResult<u8> {
        match data.first() {
            Some(b) => Ok(*b),
            None => whatever!("empty frame"),
        }
    }

    #[test]
    fn frame_info_lengths() {
        let info = FrameInfo::new(4, 3, 3, 8);
        assert_eq!(info.bytes_per_sample(), 1);
        assert_eq!(info.frame_len(), 36);
        let info = FrameInfo::new(2, 2, 1, 16).with_bits_stored(12);
        assert_eq!(info.bits_stored, 12);
        assert_eq!(info.frame_len(), 8);
    }

    #[test]
    fn extreme_bits_allocated_do_not_overflow() {
        assert_eq!(FrameInfo::new(1, 1, 1, u16::MAX).bytes_per_sample(), 8192);
        assert_eq!(FrameInfo::new(1, 1, 1, 12).bytes_per_sample(), 2);
        assert_eq!(FrameInfo::new(1, 1, 1, 1).bytes_per_sample(), 1);
    }

    #[test]
    fn custom_errors_have_a_kind() {
        let err = failing_decode(&[]).unwrap_err();
        assert_eq!(err.to_string(), "empty frame");
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "bad marker");
        let err = Err::<(), _>(io)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
            .context(decode_error::CodecSnafu {
                kind: ErrorKind::CorruptedMarker,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedMarker);
    }
}
