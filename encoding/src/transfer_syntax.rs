//! Module containing the DICOM Transfer Syntax data structure and related methods.
//! Similar to the DcmCodec in DCMTK, the `TransferSyntax` contains all of the necessary
//! algorithms for decoding and encoding DICOM data in a certain transfer syntax.
//!
//! This crate does not host specific transfer syntaxes. Instead, they are created in
//! other crates and registered in the global transfer syntax registry, which implements
//! [`TransferSyntaxIndex`]. For more
//! information, please see the `dcmio-transfer-syntax-registry` crate.

use crate::adapters::{PixelDataReader, PixelDataWriter};
use crate::decode::basic::BasicDecoder;
use crate::decode::explicit_be::ExplicitVRBigEndianDecoder;
use crate::decode::explicit_le::ExplicitVRLittleEndianDecoder;
use crate::decode::implicit_le::ImplicitVRLittleEndianDecoder;
use crate::decode::DecodeFrom;
use crate::encode::{
    EncodeTo, EncoderFor, ExplicitVRBigEndianEncoder, ExplicitVRLittleEndianEncoder,
    ImplicitVRLittleEndianEncoder,
};
use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

pub use byteordered::Endianness;

/// A decoder with its type erased.
pub type DynDecoder<S> = Box<dyn DecodeFrom<S>>;

/// An encoder with its type erased.
pub type DynEncoder<'w, W> = Box<dyn EncodeTo<W> + 'w>;

/// Alias type for a shared, dynamically dispatched pixel data reader.
pub type DynPixelDataReader = Arc<dyn PixelDataReader>;

/// Alias type for a shared, dynamically dispatched pixel data writer.
pub type DynPixelDataWriter = Arc<dyn PixelDataWriter>;

/// A DICOM transfer syntax specifier.
///
/// Cloning is cheap: pixel data adapters are shared.
#[derive(Debug, Clone)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: Cow<'static, str>,
    /// The name of the transfer syntax.
    name: Cow<'static, str>,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// The transfer syntax' requirements and implemented capabilities.
    codec: Codec,
}

/// Trait for containers of transfer syntax specifiers.
///
/// Types implementing this trait are held responsible for populating
/// themselves with a set of transfer syntaxes, which can be fully supported,
/// partially supported, or not supported. Usually, only one implementation
/// of this trait is used for the entire program.
pub trait TransferSyntaxIndex {
    /// Obtain a DICOM transfer syntax by its respective UID.
    ///
    /// Implementations of this method should be robust to the possible
    /// presence of a trailing null characters (`\0`) in `uid`.
    fn get(&self, uid: &str) -> Option<TransferSyntax>;
}

impl<T: ?Sized> TransferSyntaxIndex for &T
where
    T: TransferSyntaxIndex,
{
    fn get(&self, uid: &str) -> Option<TransferSyntax> {
        (**self).get(uid)
    }
}

/// A description and possible implementation regarding
/// the encoding and decoding requirements of a transfer syntax.
/// This is also used as a means to describe whether pixel data is encapsulated
/// and whether this implementation supports it.
#[derive(Clone)]
pub enum Codec {
    /// No codec is given, nor is it required.
    None,
    /// Custom encoding and decoding of the entire data set is required, but
    /// not supported. This could be used by a stub of
    /// _Deflated Explicit VR Little Endian_, for example.
    Unsupported,
    /// Pixel data is encapsulated.
    /// Either adapter may be absent, in which case the data set can
    /// still be read and written, with pixel data in its encapsulated form.
    EncapsulatedPixelData(Option<DynPixelDataReader>, Option<DynPixelDataWriter>),
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Codec::None => f.write_str("Codec::None"),
            Codec::Unsupported => f.write_str("Codec::Unsupported"),
            Codec::EncapsulatedPixelData(r, w) => write!(
                f,
                "Codec::EncapsulatedPixelData({}, {})",
                if r.is_some() { "reader" } else { "-" },
                if w.is_some() { "writer" } else { "-" }
            ),
        }
    }
}

impl TransferSyntax {
    /** Create a new transfer syntax descriptor.
     *
     * Note that only transfer syntax implementors are expected to construct
     * TS descriptors from scratch. For a practical usage of transfer syntaxes,
     * one should look up an existing transfer syntax registry by UID.
     */
    pub const fn new(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
        codec: Codec,
    ) -> Self {
        TransferSyntax {
            uid: Cow::Borrowed(uid),
            name: Cow::Borrowed(name),
            byte_order,
            explicit_vr,
            codec,
        }
    }

    /// Describe a transfer syntax only known by its UID,
    /// to be read as explicit VR little endian with encapsulated pixel data
    /// and no pixel data codec.
    pub fn unknown_encapsulated(uid: &str) -> Self {
        TransferSyntax {
            uid: Cow::Owned(uid.trim_end_matches(|c: char| c == '\0' || c == ' ').to_string()),
            name: Cow::Borrowed("Unknown (encapsulated)"),
            byte_order: Endianness::Little,
            explicit_vr: true,
            codec: Codec::EncapsulatedPixelData(None, None),
        }
    }

    /// Obtain this transfer syntax' unique identifier.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Obtain the name of this transfer syntax.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Obtain this transfer syntax' expected endianness.
    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    /// Whether value representations are explicit in element headers.
    pub const fn is_explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Obtain this transfer syntax' codec specification.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Replace the codec specification.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Check whether this transfer syntax specifier provides a complete
    /// implementation.
    pub fn fully_supported(&self) -> bool {
        match &self.codec {
            Codec::None => true,
            Codec::Unsupported => false,
            Codec::EncapsulatedPixelData(r, w) => r.is_some() && w.is_some(),
        }
    }

    /// Check whether no codecs are required for this transfer syntax,
    /// meaning that a complete implementation is available
    /// and no pixel data conversion is required.
    pub fn is_codec_free(&self) -> bool {
        matches!(self.codec, Codec::None)
    }

    /// Check whether reading and writing of data sets is unsupported.
    /// If this is `true`, encoding and decoding will not be available.
    pub fn unsupported(&self) -> bool {
        matches!(self.codec, Codec::Unsupported)
    }

    /// Whether pixel data in this transfer syntax is encapsulated.
    pub fn is_encapsulated_pixel_data(&self) -> bool {
        matches!(self.codec, Codec::EncapsulatedPixelData(..))
    }

    /// Check whether decoding the pixel data is unsupported.
    /// If this is `true`, encoding and decoding of the data set will still
    /// be possible, but the pixel data will only be available in its
    /// encapsulated form.
    pub fn unsupported_pixel_encapsulation(&self) -> bool {
        matches!(
            self.codec,
            Codec::Unsupported | Codec::EncapsulatedPixelData(None, _)
        )
    }

    /// The pixel data reader of this transfer syntax, if any.
    pub fn pixel_data_reader(&self) -> Option<&DynPixelDataReader> {
        match &self.codec {
            Codec::EncapsulatedPixelData(r, _) => r.as_ref(),
            _ => None,
        }
    }

    /// The pixel data writer of this transfer syntax, if any.
    pub fn pixel_data_writer(&self) -> Option<&DynPixelDataWriter> {
        match &self.codec {
            Codec::EncapsulatedPixelData(_, w) => w.as_ref(),
            _ => None,
        }
    }

    /// Retrieve the appropriate data element decoder for this transfer syntax.
    /// Can yield none if decoding is not supported.
    ///
    /// The resulting decoder does not consider pixel data encapsulation or
    /// data set compression rules. This means that the consumer of this method
    /// needs to adapt the reader before using the decoder.
    pub fn decoder<'s>(&self) -> Option<DynDecoder<dyn Read + 's>> {
        self.decoder_for()
    }

    /// Retrieve the appropriate data element decoder for this transfer syntax
    /// and given reader type (this method is not object safe).
    /// Can yield none if decoding is not supported.
    pub fn decoder_for<S>(&self) -> Option<DynDecoder<S>>
    where
        S: ?Sized + Read,
    {
        self.decoder_with(false)
    }

    /// Retrieve a data element decoder which, for explicit VR syntaxes,
    /// fails on unknown VR codes instead of reading them as `UN`.
    pub fn decoder_with<S>(&self, strict_vr: bool) -> Option<DynDecoder<S>>
    where
        S: ?Sized + Read,
    {
        if self.unsupported() {
            return None;
        }
        match (self.byte_order, self.explicit_vr) {
            (Endianness::Little, false) => {
                Some(Box::new(ImplicitVRLittleEndianDecoder::default()))
            }
            (Endianness::Little, true) if strict_vr => {
                Some(Box::new(ExplicitVRLittleEndianDecoder::strict()))
            }
            (Endianness::Little, true) => {
                Some(Box::new(ExplicitVRLittleEndianDecoder::default()))
            }
            (Endianness::Big, true) if strict_vr => {
                Some(Box::new(ExplicitVRBigEndianDecoder::strict()))
            }
            (Endianness::Big, true) => Some(Box::new(ExplicitVRBigEndianDecoder::default())),
            _ => None,
        }
    }

    /// Retrieve the appropriate data element encoder for this transfer syntax.
    /// Can yield none if encoding is not supported. The resulting encoder does not
    /// consider pixel data encapsulation or data set compression rules.
    pub fn encoder<'w>(&self) -> Option<DynEncoder<'w, dyn Write + 'w>> {
        self.encoder_for()
    }

    /// Retrieve the appropriate data element encoder for this transfer syntax
    /// and the given writer type (this method is not object safe).
    /// Can yield none if encoding is not supported. The resulting encoder does not
    /// consider pixel data encapsulation or data set compression rules.
    pub fn encoder_for<'w, W: 'w>(&self) -> Option<DynEncoder<'w, W>>
    where
        W: ?Sized + Write,
    {
        if self.unsupported() {
            return None;
        }
        match (self.byte_order, self.explicit_vr) {
            (Endianness::Little, false) => Some(Box::new(EncoderFor::new(
                ImplicitVRLittleEndianEncoder::default(),
            ))),
            (Endianness::Little, true) => Some(Box::new(EncoderFor::new(
                ExplicitVRLittleEndianEncoder::default(),
            ))),
            (Endianness::Big, true) => Some(Box::new(EncoderFor::new(
                ExplicitVRBigEndianEncoder::default(),
            ))),
            _ => None,
        }
    }

    /// Obtain a dynamic basic decoder, based on this transfer syntax' expected endianness.
    pub fn basic_decoder(&self) -> BasicDecoder {
        BasicDecoder::from(self.endianness())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPLICIT_VR_BE: TransferSyntax = TransferSyntax::new(
        "1.2.840.10008.1.2.2",
        "Explicit VR Big Endian",
        Endianness::Big,
        true,
        Codec::None,
    );

    #[test]
    fn codec_free_syntax_has_coders() {
        assert!(EXPLICIT_VR_BE.is_codec_free());
        assert!(EXPLICIT_VR_BE.fully_supported());
        let decoder = EXPLICIT_VR_BE.decoder().unwrap();
        assert_eq!(
            DecodeFrom::<dyn Read>::endianness(&decoder),
            Endianness::Big
        );
        let encoder = EXPLICIT_VR_BE.encoder().unwrap();
        assert_eq!(
            EncodeTo::<dyn Write>::endianness(&encoder),
            Endianness::Big
        );
    }

    #[test]
    fn unknown_syntax_is_encapsulated_without_codec() {
        let ts = TransferSyntax::unknown_encapsulated("1.2.3.4.5\0");
        assert_eq!(ts.uid(), "1.2.3.4.5");
        assert!(ts.is_encapsulated_pixel_data());
        assert!(ts.unsupported_pixel_encapsulation());
        assert!(ts.pixel_data_reader().is_none());
        assert!(ts.decoder().is_some());
    }

    #[test]
    fn unsupported_syntax_has_no_coders() {
        let ts = EXPLICIT_VR_BE.clone().with_codec(Codec::Unsupported);
        assert!(ts.decoder().is_none());
        assert!(ts.encoder().is_none());
    }
}
