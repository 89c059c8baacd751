//! This crate implements the standard DICOM attribute dictionary
//! and related constants.
//!
//! - [`data_element`]: a run-time dictionary of DICOM attributes,
//!   used when reading implicit VR content
//!   to recover each element's value representation.
//!   Group length and private creator elements are recognized generically.
//! - [`tags`] maps attribute aliases to DICOM tags at compile time.
//! - [`uids`] holds transfer syntax and SOP class unique identifiers.
//!
//! The records are collected from [DICOM PS3.6].
//! The dictionary is provided as a singleton
//! behind a unit type for efficiency and ease of use.
//!
//! [DICOM PS3.6]: https://dicom.nema.org/medical/dicom/current/output/chtml/part06/ps3.6.html
pub mod data_element;
pub mod tags;
pub mod uids;

pub use data_element::{StandardDataDictionary, StandardDataDictionaryRegistry};
