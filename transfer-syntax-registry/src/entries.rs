//! The transfer syntax specifiers known to the registry.
//!
//! - **Fully implemented** means that the registry
//!   provides built-in support for reading and writing data sets,
//!   as well as for encoding and decoding encapsulated pixel data,
//!   if applicable.
//! - **Stub descriptors** serve to provide information about
//!   the transfer syntax.
//!   Data sets with encapsulated pixel data can still be read and written,
//!   but their frames cannot be decoded or encoded.
//!
//! Specifiers with pixel data adapters are built by functions,
//! the others are constants.

use crate::create_ts_stub;
use dcmio_encoding::transfer_syntax::{Codec, Endianness, TransferSyntax as Ts};

#[cfg(feature = "jpeg")]
use crate::adapters::jpeg::JpegAdapter;
#[cfg(feature = "rle")]
use crate::adapters::rle_lossless::RleLosslessAdapter;
#[cfg(any(feature = "jpeg", feature = "rle"))]
use dcmio_encoding::transfer_syntax::{DynPixelDataReader, DynPixelDataWriter};
#[cfg(any(feature = "jpeg", feature = "rle"))]
use std::sync::Arc;

/// Transfer syntax UIDs.
pub mod uids {
    /// Implicit VR Little Endian
    pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
    /// Explicit VR Little Endian
    pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
    /// Deflated Explicit VR Little Endian
    pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
    /// Explicit VR Big Endian
    pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
    /// JPEG Baseline (Process 1)
    pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
    /// JPEG Extended (Process 2 & 4)
    pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";
    /// JPEG Lossless, Non-Hierarchical (Process 14)
    pub const JPEG_LOSSLESS_NON_HIERARCHICAL: &str = "1.2.840.10008.1.2.4.57";
    /// JPEG Lossless, Non-Hierarchical, First-Order Prediction
    pub const JPEG_LOSSLESS_FIRST_ORDER_PREDICTION: &str = "1.2.840.10008.1.2.4.70";
    /// JPEG-LS Lossless Image Compression
    pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";
    /// JPEG-LS Lossy (Near-Lossless) Image Compression
    pub const JPEG_LS_LOSSY: &str = "1.2.840.10008.1.2.4.81";
    /// JPEG 2000 Image Compression (Lossless Only)
    pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";
    /// JPEG 2000 Image Compression
    pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";
    /// RLE Lossless
    pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";
}

// -- the three base transfer syntaxes, fully supported --

/// **Fully implemented:** Implicit VR Little Endian: Default Transfer Syntax for DICOM
pub const IMPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    uids::IMPLICIT_VR_LITTLE_ENDIAN,
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
    Codec::None,
);

/// **Fully implemented:** Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    uids::EXPLICIT_VR_LITTLE_ENDIAN,
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::None,
);

/// **Fully implemented:** Explicit VR Big Endian
pub const EXPLICIT_VR_BIG_ENDIAN: Ts = Ts::new(
    uids::EXPLICIT_VR_BIG_ENDIAN,
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
    Codec::None,
);

// -- JPEG encoded pixel data --

/// Create a transfer syntax with JPEG encapsulated pixel data
#[cfg(feature = "jpeg")]
fn create_ts_jpeg(uid: &'static str, name: &'static str, adapter: JpegAdapter) -> Ts {
    let adapter = Arc::new(adapter);
    let reader: DynPixelDataReader = adapter.clone();
    let writer: DynPixelDataWriter = adapter;
    Ts::new(
        uid,
        name,
        Endianness::Little,
        true,
        Codec::EncapsulatedPixelData(Some(reader), Some(writer)),
    )
}

/// **Fully implemented:** JPEG Baseline (Process 1):
/// Default Transfer Syntax for Lossy JPEG 8 Bit Image Compression
#[cfg(feature = "jpeg")]
pub fn jpeg_baseline() -> Ts {
    create_ts_jpeg(
        uids::JPEG_BASELINE,
        "JPEG Baseline (Process 1)",
        JpegAdapter::baseline(),
    )
}
/// **Stub descriptor:** JPEG Baseline (Process 1)
#[cfg(not(feature = "jpeg"))]
pub fn jpeg_baseline() -> Ts {
    create_ts_stub(uids::JPEG_BASELINE, "JPEG Baseline (Process 1)")
}

/// **Fully implemented:** JPEG Extended (Process 2 & 4):
/// Default Transfer Syntax for Lossy JPEG 12 Bit Image Compression (Process 4 only)
#[cfg(feature = "jpeg")]
pub fn jpeg_extended() -> Ts {
    create_ts_jpeg(
        uids::JPEG_EXTENDED,
        "JPEG Extended (Process 2 & 4)",
        JpegAdapter::extended(),
    )
}
/// **Stub descriptor:** JPEG Extended (Process 2 & 4)
#[cfg(not(feature = "jpeg"))]
pub fn jpeg_extended() -> Ts {
    create_ts_stub(uids::JPEG_EXTENDED, "JPEG Extended (Process 2 & 4)")
}

/// **Fully implemented:** JPEG Lossless, Non-Hierarchical (Process 14)
#[cfg(feature = "jpeg")]
pub fn jpeg_lossless_non_hierarchical() -> Ts {
    create_ts_jpeg(
        uids::JPEG_LOSSLESS_NON_HIERARCHICAL,
        "JPEG Lossless, Non-Hierarchical (Process 14)",
        JpegAdapter::lossless(1),
    )
}
/// **Stub descriptor:** JPEG Lossless, Non-Hierarchical (Process 14)
#[cfg(not(feature = "jpeg"))]
pub fn jpeg_lossless_non_hierarchical() -> Ts {
    create_ts_stub(
        uids::JPEG_LOSSLESS_NON_HIERARCHICAL,
        "JPEG Lossless, Non-Hierarchical (Process 14)",
    )
}

/// **Fully implemented:** JPEG Lossless, Non-Hierarchical, First-Order Prediction
/// (Process 14 [Selection Value 1]):
/// Default Transfer Syntax for Lossless JPEG Image Compression
#[cfg(feature = "jpeg")]
pub fn jpeg_lossless_first_order_prediction() -> Ts {
    create_ts_jpeg(
        uids::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION,
        "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
        JpegAdapter::lossless(1),
    )
}
/// **Stub descriptor:** JPEG Lossless, Non-Hierarchical, First-Order Prediction
#[cfg(not(feature = "jpeg"))]
pub fn jpeg_lossless_first_order_prediction() -> Ts {
    create_ts_stub(
        uids::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION,
        "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
    )
}

// -- RLE --

/// **Fully implemented:** RLE Lossless
#[cfg(feature = "rle")]
pub fn rle_lossless() -> Ts {
    let reader: DynPixelDataReader = Arc::new(RleLosslessAdapter);
    let writer: DynPixelDataWriter = Arc::new(RleLosslessAdapter);
    Ts::new(
        uids::RLE_LOSSLESS,
        "RLE Lossless",
        Endianness::Little,
        true,
        Codec::EncapsulatedPixelData(Some(reader), Some(writer)),
    )
}
/// **Stub descriptor:** RLE Lossless
#[cfg(not(feature = "rle"))]
pub fn rle_lossless() -> Ts {
    create_ts_stub(uids::RLE_LOSSLESS, "RLE Lossless")
}

// --- stub transfer syntaxes, known but not supported ---

/// **Stub descriptor:** Deflated Explicit VR Little Endian
///
/// The whole data set is compressed, so it cannot be read at all.
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    "Deflated Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::Unsupported,
);

/// **Stub descriptor:** JPEG-LS Lossless Image Compression
pub const JPEG_LS_LOSSLESS_IMAGE_COMPRESSION: Ts = create_ts_stub(
    uids::JPEG_LS_LOSSLESS,
    "JPEG-LS Lossless Image Compression",
);

/// **Stub descriptor:** JPEG-LS Lossy (Near-Lossless) Image Compression
pub const JPEG_LS_LOSSY_IMAGE_COMPRESSION: Ts = create_ts_stub(
    uids::JPEG_LS_LOSSY,
    "JPEG-LS Lossy (Near-Lossless) Image Compression",
);

/// **Stub descriptor:** JPEG 2000 Image Compression (Lossless Only)
pub const JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY: Ts = create_ts_stub(
    uids::JPEG_2000_LOSSLESS,
    "JPEG 2000 Image Compression (Lossless Only)",
);

/// **Stub descriptor:** JPEG 2000 Image Compression
pub const JPEG_2000_IMAGE_COMPRESSION: Ts =
    create_ts_stub(uids::JPEG_2000, "JPEG 2000 Image Compression");

/// All built-in transfer syntax specifiers.
pub fn all() -> Vec<Ts> {
    vec![
        IMPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_BIG_ENDIAN,
        jpeg_baseline(),
        jpeg_extended(),
        jpeg_lossless_non_hierarchical(),
        jpeg_lossless_first_order_prediction(),
        rle_lossless(),
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
        JPEG_LS_LOSSY_IMAGE_COMPRESSION,
        JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY,
        JPEG_2000_IMAGE_COMPRESSION,
    ]
}
