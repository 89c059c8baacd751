//! Root module for pixel data adapters.
//!
//! - [`jpeg`](jpeg) provides JPEG decoding and encoding
//!   (baseline, extended and lossless)
//!   through the native `dcmio-jpeg` codec.
//!   Requires the `jpeg` feature,
//!   enabled by default.
//! - [`rle_lossless`](rle_lossless) provides native RLE lossless
//!   decoding and encoding.
//!   Requires the `rle` feature,
//!   enabled by default.
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "rle")]
pub mod rle_lossless;

/// **Note:** This module is a stub.
/// Enable the `jpeg` feature to use this module.
#[cfg(not(feature = "jpeg"))]
pub mod jpeg {}

/// **Note:** This module is a stub.
/// Enable the `rle` feature to use this module.
#[cfg(not(feature = "rle"))]
pub mod rle_lossless {}
