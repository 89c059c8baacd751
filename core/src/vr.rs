//! Static registry of value representation encoding rules.
//!
//! Every [`VR`] maps to one [`VrInfo`] record,
//! describing how values of that representation are laid out.
//! The registry is immutable and shared by the whole process.

use crate::header::VR;
use snafu::{Backtrace, Snafu};

/// An unrecognized two-character value representation code.
#[derive(Debug, Snafu)]
#[snafu(display("Unknown value representation {:?}", String::from_utf8_lossy(code)))]
pub struct UnknownVrError {
    /// the offending code
    pub code: [u8; 2],
    backtrace: Backtrace,
}

/// The broad category of a value representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Binary numbers with a fixed unit size (US, SL, FD, OW, ...)
    Numeric,
    /// Character strings, possibly multi-valued (CS, LO, UI, DS, ...)
    Text,
    /// Dates, times and date-times (DA, TM, DT)
    DateTime,
    /// Opaque byte streams (OB, UN)
    Binary,
    /// Attribute tags (AT)
    Tag,
    /// Sequence of items (SQ)
    Sequence,
}

/// The width of the length field in an element header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LengthField {
    /// 2-byte length, no reserved bytes (8-byte explicit VR header)
    Short,
    /// 2 reserved bytes and a 4-byte length (12-byte explicit VR header)
    Long,
}

/// Encoding rules of one value representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VrInfo {
    /// the value representation described
    pub vr: VR,
    /// broad category
    pub kind: ValueKind,
    /// length field width in explicit VR transfer syntaxes
    pub explicit_length: LengthField,
    /// size in bytes of one value unit, for binary numbers
    pub unit_size: Option<u8>,
    /// whether the value is text subject to the specific character set
    pub charset_sensitive: bool,
    /// whether multiple values are separated by backslashes
    pub multi_valued: bool,
    /// byte used to pad values to an even length
    pub padding: u8,
    /// maximum length of a single value, if bounded
    pub max_length: Option<u32>,
}

impl VrInfo {
    /// The length field width for this VR
    /// when encoded in explicit or implicit VR.
    ///
    /// Implicit VR headers always carry a 4-byte length.
    #[inline]
    pub fn length_field(&self, explicit_vr: bool) -> LengthField {
        if explicit_vr {
            self.explicit_length
        } else {
            LengthField::Long
        }
    }

    /// Size of a full element header with this VR, in bytes.
    #[inline]
    pub fn header_len(&self, explicit_vr: bool) -> u32 {
        match self.length_field(explicit_vr) {
            LengthField::Short => 8,
            LengthField::Long if explicit_vr => 12,
            LengthField::Long => 8,
        }
    }

    /// Whether values of this VR are binary numbers with a fixed unit size.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.unit_size.is_some() && self.kind != ValueKind::Binary
    }
}

const fn info(
    vr: VR,
    kind: ValueKind,
    explicit_length: LengthField,
    unit_size: Option<u8>,
    charset_sensitive: bool,
    multi_valued: bool,
    padding: u8,
    max_length: Option<u32>,
) -> VrInfo {
    VrInfo {
        vr,
        kind,
        explicit_length,
        unit_size,
        charset_sensitive,
        multi_valued,
        padding,
        max_length,
    }
}

use LengthField::{Long, Short};
use ValueKind::*;

/// The registry, in the same order as [`VR::ALL`].
static REGISTRY: [VrInfo; 34] = [
    info(VR::AE, Text, Short, None, false, true, b' ', Some(16)),
    info(VR::AS, Text, Short, None, false, true, b' ', Some(4)),
    info(VR::AT, Tag, Short, Some(4), false, false, 0, None),
    info(VR::CS, Text, Short, None, false, true, b' ', Some(16)),
    info(VR::DA, DateTime, Short, None, false, true, b' ', Some(8)),
    info(VR::DS, Text, Short, None, false, true, b' ', Some(16)),
    info(VR::DT, DateTime, Short, None, false, true, b' ', Some(26)),
    info(VR::FL, Numeric, Short, Some(4), false, false, 0, None),
    info(VR::FD, Numeric, Short, Some(8), false, false, 0, None),
    info(VR::IS, Text, Short, None, false, true, b' ', Some(12)),
    info(VR::LO, Text, Short, None, true, true, b' ', Some(64)),
    info(VR::LT, Text, Short, None, true, false, b' ', Some(10240)),
    info(VR::OB, Binary, Long, Some(1), false, false, 0, None),
    info(VR::OD, Numeric, Long, Some(8), false, false, 0, None),
    info(VR::OF, Numeric, Long, Some(4), false, false, 0, None),
    info(VR::OL, Numeric, Long, Some(4), false, false, 0, None),
    info(VR::OV, Numeric, Long, Some(8), false, false, 0, None),
    info(VR::OW, Numeric, Long, Some(2), false, false, 0, None),
    info(VR::PN, Text, Short, None, true, true, b' ', Some(324)),
    info(VR::SH, Text, Short, None, true, true, b' ', Some(16)),
    info(VR::SL, Numeric, Short, Some(4), false, false, 0, None),
    info(VR::SQ, Sequence, Long, None, false, false, 0, None),
    info(VR::SS, Numeric, Short, Some(2), false, false, 0, None),
    info(VR::ST, Text, Short, None, true, false, b' ', Some(1024)),
    info(VR::SV, Numeric, Long, Some(8), false, false, 0, None),
    info(VR::TM, DateTime, Short, None, false, true, b' ', Some(14)),
    info(VR::UC, Text, Long, None, true, true, b' ', None),
    info(VR::UI, Text, Short, None, false, true, 0, Some(64)),
    info(VR::UL, Numeric, Short, Some(4), false, false, 0, None),
    info(VR::UN, Binary, Long, Some(1), false, false, 0, None),
    info(VR::UR, Text, Long, None, false, false, b' ', None),
    info(VR::US, Numeric, Short, Some(2), false, false, 0, None),
    info(VR::UT, Text, Long, None, true, false, b' ', None),
    info(VR::UV, Numeric, Long, Some(8), false, false, 0, None),
];

/// Look up the encoding rules of a value representation.
#[inline]
pub fn info_of(vr: VR) -> &'static VrInfo {
    // the registry follows the declaration order of `VR`
    &REGISTRY[vr as usize]
}

/// Look up the encoding rules for a raw two-byte VR code,
/// as found in an explicit VR element header.
pub fn lookup(code: [u8; 2]) -> Result<&'static VrInfo, UnknownVrError> {
    match VR::from_binary(code) {
        Some(vr) => Ok(info_of(vr)),
        None => UnknownVrSnafu { code }.fail(),
    }
}

impl VR {
    /// The encoding rules of this value representation.
    #[inline]
    pub fn info(self) -> &'static VrInfo {
        info_of(self)
    }

    /// The broad category of this value representation.
    #[inline]
    pub fn kind(self) -> ValueKind {
        self.info().kind
    }

    /// The byte used to pad values of this VR to an even length.
    #[inline]
    pub fn padding(self) -> u8 {
        self.info().padding
    }

    /// Size of one binary unit for byte swapping purposes.
    /// Text and opaque byte VRs return 1.
    #[inline]
    pub fn swap_unit(self) -> usize {
        match self {
            VR::AT => 2,
            VR::OB | VR::UN => 1,
            _ => self.info().unit_size.map(usize::from).unwrap_or(1),
        }
    }
}
