#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! DICOM encoding and decoding primitives.
//!
//! This crate provides interfaces and data structures for reading and writing
//! data in accordance to the DICOM standard:
//!
//! - [`cursor`] holds the byte and bit level stream cursors;
//! - [`decode`] and [`encode`] hold the element header codecs
//!   of each uncompressed transfer syntax;
//! - [`transfer_syntax`] hosts the concept of transfer syntax specifier,
//!   which can be used to produce DICOM encoders and decoders at run-time;
//! - [`adapters`] defines the pixel data codec traits
//!   implemented for encapsulated transfer syntaxes.
//!
//! For the time being, all APIs are based on synchronous I/O.

pub mod adapters;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod swap;
pub mod transfer_syntax;

pub use adapters::{FrameInfo, PixelDataReader, PixelDataWriter};
pub use byteordered::Endianness;
pub use cursor::{BitReader, BitWriter, SliceCursor, StreamReader, StreamWriter};
pub use decode::Decode;
pub use encode::Encode;
pub use transfer_syntax::{Codec, TransferSyntax, TransferSyntaxIndex};

// public dependency re-export
pub use snafu;
