#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! This crate works on top of DICOM encoding primitives
//! to read and write DICOM data sets as streams of tokens.
//!
//! - [`stateful`] provides the stateful decoder and encoder,
//!   which keep track of the stream position,
//!   read and pad value data, and swap bytes when in big endian.
//! - [`dataset`] builds on them to express a data set as a sequence of
//!   [`DataToken`]s: element headers, values, sequence and item markers,
//!   and encapsulated pixel data fragments.
//!
//! For the time being, all APIs are based on synchronous I/O.

pub mod dataset;
pub mod stateful;

pub use dataset::{DataSetReader, DataSetReaderOptions, DataSetWriter, DataToken};
pub use stateful::decode::{DynStatefulDecoder, StatefulDecode, StatefulDecoder};
pub use stateful::encode::{DynStatefulEncoder, StatefulEncoder};
