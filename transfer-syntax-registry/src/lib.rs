//! This crate contains the DICOM transfer syntax registry.
//!
//! The transfer syntax registry maps a DICOM UID of a transfer syntax into the
//! respective transfer syntax specifier,
//! which tells how to decode and encode data sets
//! and which codec handles encapsulated pixel data.
//!
//! A process-wide registry is available through [`get_registry`],
//! pre-populated with the transfer syntaxes in [`entries`].
//! More transfer syntaxes can be [registered](register) at run time,
//! replacing any previous specifier with the same UID.
//! Specifiers already handed out are not affected by later registrations.
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

pub mod adapters;
pub mod entries;

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_encoding::transfer_syntax::{Codec, Endianness, TransferSyntax, TransferSyntaxIndex};
use lazy_static::lazy_static;
use snafu::{Backtrace, OptionExt, Snafu};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// An error from the transfer syntax registry.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// No transfer syntax is registered with the UID.
    #[snafu(display("Unknown transfer syntax `{}`", uid))]
    WrongTransferSyntax { uid: String, backtrace: Backtrace },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::WrongTransferSyntax { .. } => ErrorKind::WrongTransferSyntax,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A registry of DICOM transfer syntaxes, indexed by UID.
///
/// The registry can be shared across threads:
/// lookups take a read lock and return a cheap clone of the specifier.
pub struct TransferSyntaxRegistry {
    m: RwLock<HashMap<String, TransferSyntax>>,
}

impl fmt::Debug for TransferSyntaxRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let m = self.m.read().unwrap_or_else(PoisonError::into_inner);
        let entries: HashMap<&str, &str> = m
            .iter()
            .map(|(uid, ts)| (uid.as_str(), ts.name()))
            .collect();
        f.debug_struct("TransferSyntaxRegistry")
            .field("m", &entries)
            .finish()
    }
}

impl Default for TransferSyntaxRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl TransferSyntaxRegistry {
    /// Create a registry with no transfer syntaxes.
    pub fn empty() -> Self {
        TransferSyntaxRegistry {
            m: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with all built-in transfer syntaxes.
    pub fn with_builtin() -> Self {
        let registry = Self::empty();
        for ts in entries::all() {
            registry.register(ts);
        }
        registry
    }

    /// Obtain a transfer syntax by UID.
    /// Trailing null or space padding in `uid` is ignored.
    pub fn get(&self, uid: &str) -> Option<TransferSyntax> {
        let m = self.m.read().unwrap_or_else(PoisonError::into_inner);
        m.get(trim_uid(uid)).cloned()
    }

    /// Obtain a transfer syntax by UID,
    /// failing if it is not registered.
    pub fn lookup(&self, uid: &str) -> Result<TransferSyntax> {
        self.get(uid).context(WrongTransferSyntaxSnafu {
            uid: trim_uid(uid),
        })
    }

    /// Register the given transfer syntax,
    /// replacing and returning any previous one with the same UID.
    pub fn register(&self, ts: TransferSyntax) -> Option<TransferSyntax> {
        let uid = trim_uid(ts.uid()).to_string();
        debug!("Registering transfer syntax {} ({})", uid, ts.name());
        let mut m = self.m.write().unwrap_or_else(PoisonError::into_inner);
        m.insert(uid, ts)
    }

    /// The UIDs of all registered transfer syntaxes, in no particular order.
    pub fn uids(&self) -> Vec<String> {
        let m = self.m.read().unwrap_or_else(PoisonError::into_inner);
        m.keys().cloned().collect()
    }

    /// The number of registered transfer syntaxes.
    pub fn len(&self) -> usize {
        self.m.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no transfer syntax is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistry {
    fn get(&self, uid: &str) -> Option<TransferSyntax> {
        TransferSyntaxRegistry::get(self, uid)
    }
}

fn trim_uid(uid: &str) -> &str {
    uid.trim_end_matches(|c: char| c == '\0' || c == ' ')
}

lazy_static! {
    static ref REGISTRY: TransferSyntaxRegistry = TransferSyntaxRegistry::with_builtin();
}

/// Retrieve the default transfer syntax.
pub fn default() -> TransferSyntax {
    entries::IMPLICIT_VR_LITTLE_ENDIAN
}

/// Retrieve the global transfer syntax registry.
pub fn get_registry() -> &'static TransferSyntaxRegistry {
    &REGISTRY
}

/// Obtain a transfer syntax from the global registry,
/// failing if it is not registered.
pub fn lookup(uid: &str) -> Result<TransferSyntax> {
    REGISTRY.lookup(uid)
}

/// Register a transfer syntax in the global registry,
/// replacing and returning any previous one with the same UID.
pub fn register(ts: TransferSyntax) -> Option<TransferSyntax> {
    REGISTRY.register(ts)
}

/// create a TS with an unsupported pixel encapsulation
pub(crate) const fn create_ts_stub(uid: &'static str, name: &'static str) -> TransferSyntax {
    TransferSyntax::new(
        uid,
        name,
        Endianness::Little,
        true,
        Codec::EncapsulatedPixelData(None, None),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::uids;

    #[test]
    fn padded_uids_are_found() {
        let registry = TransferSyntaxRegistry::with_builtin();
        let ts = registry.get("1.2.840.10008.1.2.1\0").unwrap();
        assert_eq!(ts.uid(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
        assert!(registry.get("1.2.840.10008.1.2.2 ").is_some());
    }

    #[test]
    fn unknown_uids_fail_lookup() {
        let registry = TransferSyntaxRegistry::empty();
        assert!(registry.is_empty());
        let err = registry.lookup("1.2.3.4\0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongTransferSyntax);
        assert!(err.to_string().contains("`1.2.3.4`"));
    }

    #[test]
    fn register_replaces_only_its_uid() {
        let registry = TransferSyntaxRegistry::with_builtin();
        let count = registry.len();
        let before = registry.get(uids::JPEG_2000).unwrap();
        assert!(before.unsupported_pixel_encapsulation());

        let replaced = registry.register(
            TransferSyntax::new(
                uids::JPEG_2000,
                "JPEG 2000 (custom)",
                Endianness::Little,
                true,
                Codec::EncapsulatedPixelData(None, None),
            ),
        );
        assert_eq!(replaced.unwrap().name(), "JPEG 2000 Image Compression");
        assert_eq!(registry.len(), count);
        assert_eq!(registry.get(uids::JPEG_2000).unwrap().name(), "JPEG 2000 (custom)");
        // specifiers obtained earlier are untouched
        assert_eq!(before.name(), "JPEG 2000 Image Compression");
        assert!(registry.get(uids::RLE_LOSSLESS).is_some());
    }
}
