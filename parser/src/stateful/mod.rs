//! Stateful decoding and encoding of DICOM content:
//! a data source or target bound to the codec of a transfer syntax.
pub mod decode;
pub mod encode;
