#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of dcmio containing the in-memory data model
//! for DICOM content.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] comprises various data types for DICOM element headers,
//!   including common definitions for DICOM tags and value representations.
//! - [`vr`] is the registry of static value representation properties.
//! - [`buffer`] holds [`ElementBuffer`],
//!   one element's raw bytes with lazily cached typed views.
//! - [`dataset`] is the data set tree of elements, sequences
//!   and encapsulated pixel data.
//! - [`transaction`] provides copy-on-write transactional access
//!   to a data set shared between threads.
//! - [`fragments`] models encapsulated pixel data and its offset table.
//! - [`dictionary`] describes common behavior of DICOM data dictionaries.
//! - [`charset`] maps specific character sets onto text codecs.
//! - [`error`] contains the error classification shared by all crates.

pub mod buffer;
pub mod charset;
pub mod dataset;
pub mod dictionary;
pub mod error;
pub mod fragments;
pub mod header;
pub mod transaction;
pub mod vr;

pub use buffer::ElementBuffer;
pub use dataset::{DataSet, Entry};
pub use dictionary::DataDictionary;
pub use error::{ErrorKind, Kind};
pub use fragments::{OffsetTable, PixelFragments};
pub use header::{DataElementHeader, Length, Tag, VR};
pub use transaction::{SharedDataSet, Transaction};

// re-export crates that are part of the public API
pub use chrono;
pub use smallvec;
