//! The element buffer: one data element's raw bytes
//! plus lazily computed typed views.
//!
//! Binary numbers are always kept in little endian byte order,
//! regardless of the transfer syntax they were read from.
//! Values are kept at an even length,
//! padded with the value representation's padding byte.
//!
//! Typed views are computed on first access and cached
//! until the value is replaced:
//!
//! ```
//! # use dcmio_core::{ElementBuffer, Tag, VR};
//! let buf = ElementBuffer::new(Tag(0x0008, 0x0018), VR::UI, b"1.2.3.4\0".to_vec());
//! assert_eq!(buf.string().unwrap(), "1.2.3.4");
//! ```

use crate::charset::{SpecificCharacterSet, TextCodec};
use crate::error::{ErrorKind, Kind};
use crate::header::{Tag, VR};
use crate::vr::ValueKind;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::fmt;

/// Small vector type for multi-valued views.
pub type C<T> = SmallVec<[T; 2]>;

/// An error type for element buffer and data set access.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum BufferError {
    /// No element with this tag
    #[snafu(display("No such data element {}", tag))]
    TagNotFound { tag: Tag, backtrace: Backtrace },
    /// The entry exists but is of a different kind
    #[snafu(display("Element {} is {}, expected {}", tag, vr, expected))]
    WrongVr {
        tag: Tag,
        vr: VR,
        expected: &'static str,
        backtrace: Backtrace,
    },
    /// The requested view does not apply to this value representation
    #[snafu(display("Cannot view {} element {} as {}", vr, tag, requested))]
    TypeMismatch {
        tag: Tag,
        vr: VR,
        requested: &'static str,
        backtrace: Backtrace,
    },
    /// The value bytes do not form values of the expected type
    #[snafu(display("Invalid {} value {:?} in element {}", vr, value, tag))]
    ParseValue {
        tag: Tag,
        vr: VR,
        value: String,
        backtrace: Backtrace,
    },
    /// Text could not be decoded with the element's character set
    #[snafu(display("Could not decode text of element {}", tag))]
    DecodeText {
        tag: Tag,
        source: crate::charset::DecodeTextError,
    },
}

impl Kind for BufferError {
    fn kind(&self) -> ErrorKind {
        match self {
            BufferError::TagNotFound { .. } => ErrorKind::TagNotFound,
            BufferError::WrongVr { .. } => ErrorKind::WrongVr,
            BufferError::TypeMismatch { .. }
            | BufferError::ParseValue { .. }
            | BufferError::DecodeText { .. } => ErrorKind::TypeMismatch,
        }
    }
}

impl BufferError {
    /// Build a `TagNotFound` error for the given tag.
    pub fn tag_not_found(tag: Tag) -> Self {
        TagNotFoundSnafu { tag }.build()
    }
}

/// Result type for element buffer and data set access.
pub type Result<T, E = BufferError> = std::result::Result<T, E>;

/// Typed view over binary numeric values.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericView {
    /// US, OW
    U16(C<u16>),
    /// SS
    I16(C<i16>),
    /// UL, OL
    U32(C<u32>),
    /// SL
    I32(C<i32>),
    /// UV, OV
    U64(C<u64>),
    /// SV
    I64(C<i64>),
    /// FL, OF
    F32(C<f32>),
    /// FD, OD
    F64(C<f64>),
    /// AT
    Tags(C<Tag>),
}

impl NumericView {
    /// Number of values in the view.
    pub fn len(&self) -> usize {
        match self {
            NumericView::U16(v) => v.len(),
            NumericView::I16(v) => v.len(),
            NumericView::U32(v) => v.len(),
            NumericView::I32(v) => v.len(),
            NumericView::U64(v) => v.len(),
            NumericView::I64(v) => v.len(),
            NumericView::F32(v) => v.len(),
            NumericView::F64(v) => v.len(),
            NumericView::Tags(v) => v.len(),
        }
    }

    /// Whether the view has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert all values to `f64`.
    /// Attribute tags are not numbers and yield `None`.
    pub fn to_f64s(&self) -> Option<Vec<f64>> {
        Some(match self {
            NumericView::U16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            NumericView::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            NumericView::U32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            NumericView::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            NumericView::U64(v) => v.iter().map(|&x| x as f64).collect(),
            NumericView::I64(v) => v.iter().map(|&x| x as f64).collect(),
            NumericView::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            NumericView::F64(v) => v.to_vec(),
            NumericView::Tags(_) => return None,
        })
    }

    /// Retrieve the first value as an integer, if it is an integer.
    pub fn first_int(&self) -> Option<i64> {
        match self {
            NumericView::U16(v) => v.first().map(|&x| i64::from(x)),
            NumericView::I16(v) => v.first().map(|&x| i64::from(x)),
            NumericView::U32(v) => v.first().map(|&x| i64::from(x)),
            NumericView::I32(v) => v.first().map(|&x| i64::from(x)),
            NumericView::U64(v) => v.first().and_then(|&x| i64::try_from(x).ok()),
            NumericView::I64(v) => v.first().copied(),
            _ => None,
        }
    }
}

/// A date-time value with an optional UTC offset suffix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DicomDateTime {
    /// the local date and time
    pub datetime: NaiveDateTime,
    /// the UTC offset, if one was given
    pub offset: Option<FixedOffset>,
}

/// Typed view over date and time values.
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeView {
    /// DA
    Dates(C<NaiveDate>),
    /// TM
    Times(C<NaiveTime>),
    /// DT
    DateTimes(C<DicomDateTime>),
}

/// A single data element's value in raw form,
/// with cached typed views.
#[derive(Clone)]
pub struct ElementBuffer {
    tag: Tag,
    vr: VR,
    data: Vec<u8>,
    charset: SpecificCharacterSet,
    numbers: OnceCell<NumericView>,
    strings: OnceCell<C<String>>,
    dates: OnceCell<DateTimeView>,
    dirty: bool,
    version: u64,
}

impl fmt::Debug for ElementBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ElementBuffer")
            .field("tag", &self.tag)
            .field("vr", &self.vr)
            .field("len", &self.data.len())
            .field("dirty", &self.dirty)
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for ElementBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.vr == other.vr && self.data == other.data
    }
}

fn pad_even(vr: VR, data: &mut Vec<u8>) {
    if data.len() % 2 == 1 {
        data.push(vr.padding());
    }
}

impl ElementBuffer {
    /// Create a buffer from raw bytes in little endian order.
    /// An odd-length value is padded to an even length.
    pub fn new(tag: Tag, vr: VR, mut data: Vec<u8>) -> Self {
        pad_even(vr, &mut data);
        ElementBuffer {
            tag,
            vr,
            data,
            charset: SpecificCharacterSet::Default,
            numbers: OnceCell::new(),
            strings: OnceCell::new(),
            dates: OnceCell::new(),
            dirty: false,
            version: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty(tag: Tag, vr: VR) -> Self {
        ElementBuffer::new(tag, vr, Vec::new())
    }

    /// Create a text buffer from one or more string values,
    /// joined with backslashes.
    ///
    /// Non-ASCII text is stored as UTF-8
    /// and the buffer is marked with the ISO_IR 192 character set.
    pub fn from_strs<S: AsRef<str>>(tag: Tag, vr: VR, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("\\");
        let charset = if joined.is_ascii() {
            SpecificCharacterSet::Default
        } else {
            SpecificCharacterSet::IsoIr192
        };
        ElementBuffer::new(tag, vr, joined.into_bytes()).with_charset(charset)
    }

    /// Create a buffer of unsigned 16-bit numbers (US, OW).
    pub fn from_u16s(tag: Tag, vr: VR, values: &[u16]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        ElementBuffer::new(tag, vr, data)
    }

    /// Create a buffer of unsigned 32-bit numbers (UL, OL).
    pub fn from_u32s(tag: Tag, vr: VR, values: &[u32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        ElementBuffer::new(tag, vr, data)
    }

    /// Create a buffer of double precision floats (FD, OD).
    pub fn from_f64s(tag: Tag, vr: VR, values: &[f64]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        ElementBuffer::new(tag, vr, data)
    }

    /// Set the character set used to decode text views.
    pub fn with_charset(mut self, charset: SpecificCharacterSet) -> Self {
        self.set_charset(charset);
        self
    }

    /// Set the character set used to decode text views,
    /// dropping cached text.
    pub fn set_charset(&mut self, charset: SpecificCharacterSet) {
        if self.charset != charset {
            self.charset = charset;
            self.strings = OnceCell::new();
        }
    }

    /// The element's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The element's value representation.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The character set assumed for text views.
    #[inline]
    pub fn charset(&self) -> SpecificCharacterSet {
        self.charset
    }

    /// The raw value bytes (binary numbers in little endian).
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, keeping only its bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The value length in bytes (always even).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the value is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the value was replaced since the last commit.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of committed writes applied to this element.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the value bytes.
    ///
    /// The new value is padded to an even length,
    /// cached views are invalidated
    /// and the buffer is flagged as dirty.
    pub fn set_value(&mut self, mut data: Vec<u8>) {
        pad_even(self.vr, &mut data);
        self.data = data;
        self.invalidate();
        self.dirty = true;
    }

    /// Replace the value with one or more strings.
    pub fn set_strs<S: AsRef<str>>(&mut self, values: &[S]) {
        let fresh = ElementBuffer::from_strs(self.tag, self.vr, values);
        self.charset = fresh.charset;
        self.set_value(fresh.data);
    }

    fn invalidate(&mut self) {
        self.numbers = OnceCell::new();
        self.strings = OnceCell::new();
        self.dates = OnceCell::new();
    }

    /// Record the buffer as committed.
    pub(crate) fn mark_committed(&mut self) {
        self.dirty = false;
        self.version += 1;
    }

    fn mismatch<T>(&self, requested: &'static str) -> Result<T> {
        TypeMismatchSnafu {
            tag: self.tag,
            vr: self.vr,
            requested,
        }
        .fail()
    }

    fn parse_error<T>(&self, value: impl Into<String>) -> Result<T> {
        ParseValueSnafu {
            tag: self.tag,
            vr: self.vr,
            value: value.into(),
        }
        .fail()
    }

    /// The numeric view of a binary number element
    /// (US, SS, UL, SL, UV, SV, FL, FD, OW, OL, OV, OF, OD, AT).
    ///
    /// Computed on first access and cached.
    pub fn numbers(&self) -> Result<&NumericView> {
        self.numbers.get_or_try_init(|| self.compute_numbers())
    }

    fn compute_numbers(&self) -> Result<NumericView> {
        let unit = match self.vr.info().unit_size {
            Some(u) if matches!(self.vr.kind(), ValueKind::Numeric | ValueKind::Tag) => {
                usize::from(u)
            }
            _ => return self.mismatch("numbers"),
        };
        if self.data.len() % unit != 0 {
            return self.parse_error(format!(
                "{} bytes, not a multiple of {}",
                self.data.len(),
                unit
            ));
        }
        let chunks = self.data.chunks_exact(unit);
        // chunk sizes are guaranteed by `chunks_exact`
        macro_rules! collect {
            ($t: ty, $n: literal) => {
                chunks
                    .map(|c| {
                        let mut b = [0u8; $n];
                        b.copy_from_slice(c);
                        <$t>::from_le_bytes(b)
                    })
                    .collect()
            };
        }
        Ok(match self.vr {
            VR::US | VR::OW => NumericView::U16(collect!(u16, 2)),
            VR::SS => NumericView::I16(collect!(i16, 2)),
            VR::UL | VR::OL => NumericView::U32(collect!(u32, 4)),
            VR::SL => NumericView::I32(collect!(i32, 4)),
            VR::UV | VR::OV => NumericView::U64(collect!(u64, 8)),
            VR::SV => NumericView::I64(collect!(i64, 8)),
            VR::FL | VR::OF => NumericView::F32(collect!(f32, 4)),
            VR::FD | VR::OD => NumericView::F64(collect!(f64, 8)),
            VR::AT => NumericView::Tags(
                chunks
                    .map(|c| Tag(u16::from_le_bytes([c[0], c[1]]), u16::from_le_bytes([c[2], c[3]])))
                    .collect(),
            ),
            _ => return self.mismatch("numbers"),
        })
    }

    /// The string view of a text or date/time element.
    ///
    /// Multi-valued representations are split on backslashes.
    /// Trailing padding (spaces and NUL) is stripped from each value,
    /// and leading spaces too except for free text (LT, ST, UT, UR, PN).
    ///
    /// Computed on first access and cached.
    pub fn strings(&self) -> Result<&[String]> {
        self.strings
            .get_or_try_init(|| self.compute_strings(&self.charset))
            .map(|v| v.as_slice())
    }

    /// The first string value, or an empty string if there is none.
    pub fn string(&self) -> Result<&str> {
        Ok(self.strings()?.first().map(|s| s.as_str()).unwrap_or(""))
    }

    /// Decode the string values with a different character set.
    ///
    /// The result is not cached.
    pub fn strings_with(&self, codec: &dyn TextCodec) -> Result<Vec<String>> {
        self.compute_strings(codec).map(|v| v.into_vec())
    }

    fn compute_strings(&self, codec: &dyn TextCodec) -> Result<C<String>> {
        let info = self.vr.info();
        if !matches!(info.kind, ValueKind::Text | ValueKind::DateTime) {
            return self.mismatch("strings");
        }
        let text = codec
            .decode(&self.data)
            .context(DecodeTextSnafu { tag: self.tag })?;
        let keep_leading = matches!(self.vr, VR::LT | VR::ST | VR::UT | VR::UR | VR::PN);
        let clean = |s: &str| {
            let s = s.trim_end_matches(&[' ', '\0'][..]);
            if keep_leading {
                s.to_string()
            } else {
                s.trim_start_matches(' ').to_string()
            }
        };
        if text.is_empty() {
            return Ok(C::new());
        }
        if info.multi_valued {
            Ok(text.split('\\').map(clean).collect())
        } else {
            Ok(std::iter::once(clean(&text)).collect())
        }
    }

    /// The date/time view of a DA, TM or DT element.
    ///
    /// Legacy separators (`.` in dates, `:` in times) are accepted,
    /// missing time components are zero,
    /// missing date components of a DT are the first month or day.
    ///
    /// Computed on first access and cached.
    pub fn dates(&self) -> Result<&DateTimeView> {
        self.dates.get_or_try_init(|| self.compute_dates())
    }

    fn compute_dates(&self) -> Result<DateTimeView> {
        match self.vr {
            VR::DA => {
                let mut out = C::new();
                for s in self.strings()? {
                    out.push(parse_date(s).context(ParseValueSnafu {
                        tag: self.tag,
                        vr: self.vr,
                        value: s.as_str(),
                    })?);
                }
                Ok(DateTimeView::Dates(out))
            }
            VR::TM => {
                let mut out = C::new();
                for s in self.strings()? {
                    out.push(parse_time(s).context(ParseValueSnafu {
                        tag: self.tag,
                        vr: self.vr,
                        value: s.as_str(),
                    })?);
                }
                Ok(DateTimeView::Times(out))
            }
            VR::DT => {
                let mut out = C::new();
                for s in self.strings()? {
                    out.push(parse_datetime(s).context(ParseValueSnafu {
                        tag: self.tag,
                        vr: self.vr,
                        value: s.as_str(),
                    })?);
                }
                Ok(DateTimeView::DateTimes(out))
            }
            _ => self.mismatch("dates"),
        }
    }

    /// Interpret the first value as an unsigned integer.
    ///
    /// Works on binary integers and on integer strings (IS).
    pub fn to_u32(&self) -> Result<u32> {
        let value = self.to_i64()?;
        match u32::try_from(value) {
            Ok(v) => Ok(v),
            Err(_) => self.parse_error(value.to_string()),
        }
    }

    /// Interpret the first value as a signed integer.
    ///
    /// Works on binary integers and on integer or decimal strings (IS, DS).
    pub fn to_i64(&self) -> Result<i64> {
        match self.vr {
            VR::IS | VR::DS => {
                let s = self.string()?;
                match s.parse::<i64>() {
                    Ok(v) => Ok(v),
                    Err(_) => self.parse_error(s),
                }
            }
            _ => {
                let view = self.numbers()?;
                match view.first_int() {
                    Some(v) => Ok(v),
                    None if view.is_empty() => self.parse_error(""),
                    None => self.mismatch("integer"),
                }
            }
        }
    }

    /// Interpret all values as floating point numbers.
    ///
    /// Works on binary numbers and on numeric strings (IS, DS).
    pub fn to_f64s(&self) -> Result<Vec<f64>> {
        match self.vr {
            VR::IS | VR::DS => self
                .strings()?
                .iter()
                .map(|s| match s.parse::<f64>() {
                    Ok(v) => Ok(v),
                    Err(_) => self.parse_error(s.as_str()),
                })
                .collect(),
            _ => match self.numbers()?.to_f64s() {
                Some(v) => Ok(v),
                None => self.mismatch("floats"),
            },
        }
    }
}

/// Macro for implementing typed slice getters over the numeric view.
macro_rules! impl_numeric_getters {
    ($($name: ident, $variant: ident, $ret: ty);* $(;)?) => {
        impl ElementBuffer {
            $(
                #[doc = concat!("Retrieve the values as a slice of `", stringify!($ret), "`.")]
                pub fn $name(&self) -> Result<&[$ret]> {
                    match self.numbers()? {
                        NumericView::$variant(v) => Ok(v.as_slice()),
                        _ => self.mismatch(stringify!($ret)),
                    }
                }
            )*
        }
    };
}

impl_numeric_getters! {
    uint16_slice, U16, u16;
    int16_slice, I16, i16;
    uint32_slice, U32, u32;
    int32_slice, I32, i32;
    uint64_slice, U64, u64;
    int64_slice, I64, i64;
    float32_slice, F32, f32;
    float64_slice, F64, f64;
    tag_slice, Tags, Tag;
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if !s.is_ascii() {
        return None;
    }
    let s: String = s.chars().filter(|&c| c != '.').collect();
    if s.len() != 8 {
        return None;
    }
    NaiveDate::from_ymd_opt(digits(&s[0..4])? as i32, digits(&s[4..6])?, digits(&s[6..8])?)
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    if !s.is_ascii() {
        return None;
    }
    let s: String = s.chars().filter(|&c| c != ':').collect();
    let (hms, frac) = match s.find('.') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s.as_str(), None),
    };
    if hms.len() < 2 || hms.len() > 6 || hms.len() % 2 == 1 {
        return None;
    }
    let hour = digits(&hms[0..2])?;
    let minute = if hms.len() >= 4 { digits(&hms[2..4])? } else { 0 };
    let second = if hms.len() >= 6 { digits(&hms[4..6])? } else { 0 };
    let micro = match frac {
        Some(f) if !f.is_empty() && f.len() <= 6 => digits(f)? * 10u32.pow(6 - f.len() as u32),
        Some(_) => return None,
        None => 0,
    };
    NaiveTime::from_hms_micro_opt(hour, minute, second, micro)
}

fn parse_datetime(s: &str) -> Option<DicomDateTime> {
    if !s.is_ascii() {
        return None;
    }
    let (body, offset) = match s.find(&['+', '-'][..]) {
        Some(i) => {
            let z = &s[i + 1..];
            if z.len() != 4 {
                return None;
            }
            let secs = (digits(&z[0..2])? * 3600 + digits(&z[2..4])? * 60) as i32;
            let offset = if s.as_bytes()[i] == b'+' {
                FixedOffset::east_opt(secs)
            } else {
                FixedOffset::west_opt(secs)
            };
            (&s[..i], Some(offset?))
        }
        None => (s, None),
    };
    let (date_part, time_part) = if body.len() > 8 {
        (&body[..8], &body[8..])
    } else {
        (body, "")
    };
    if date_part.len() < 4 || date_part.len() % 2 == 1 {
        return None;
    }
    let year = digits(&date_part[0..4])? as i32;
    let month = if date_part.len() >= 6 { digits(&date_part[4..6])? } else { 1 };
    let day = if date_part.len() >= 8 { digits(&date_part[6..8])? } else { 1 };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = if time_part.is_empty() {
        NaiveTime::from_hms_opt(0, 0, 0)?
    } else {
        parse_time(time_part)?
    };
    Some(DicomDateTime {
        datetime: date.and_time(time),
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn ui_value_strips_trailing_null() {
        let buf = ElementBuffer::new(Tag(0x0008, 0x0018), VR::UI, b"1.2.3.4\0".to_vec());
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.strings().unwrap(), &["1.2.3.4".to_string()]);
        assert_eq!(buf.string().unwrap(), "1.2.3.4");
    }

    #[test]
    fn odd_values_are_padded() {
        let buf = ElementBuffer::new(Tag(0x0010, 0x0010), VR::PN, b"DOE^J".to_vec());
        assert_eq!(buf.bytes(), b"DOE^J ");
        let buf = ElementBuffer::new(Tag(0x0008, 0x0016), VR::UI, b"1.2.3".to_vec());
        assert_eq!(buf.bytes(), b"1.2.3\0");
    }

    #[test]
    fn multi_valued_strings() {
        let buf = ElementBuffer::new(
            Tag(0x0008, 0x0008),
            VR::CS,
            b"ORIGINAL\\PRIMARY\\AXIAL ".to_vec(),
        );
        assert_eq!(buf.strings().unwrap(), &["ORIGINAL", "PRIMARY", "AXIAL"]);

        // free text is not split
        let buf = ElementBuffer::new(Tag(0x0020, 0x4000), VR::LT, b"  a\\b ".to_vec());
        assert_eq!(buf.strings().unwrap(), &["  a\\b"]);
    }

    #[test]
    fn views_are_cached() {
        let buf = ElementBuffer::from_u16s(Tag(0x0028, 0x0010), VR::US, &[512, 256]);
        let first = buf.numbers().unwrap();
        let second = buf.numbers().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(buf.uint16_slice().unwrap(), &[512, 256]);

        let buf = ElementBuffer::from_strs(Tag(0x0008, 0x0060), VR::CS, &["CT"]);
        let a = buf.strings().unwrap();
        let b = buf.strings().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn set_value_invalidates_views_and_marks_dirty() {
        let mut buf = ElementBuffer::from_u16s(Tag(0x0028, 0x0010), VR::US, &[512]);
        assert!(!buf.is_dirty());
        assert_eq!(buf.uint16_slice().unwrap(), &[512]);
        buf.set_value(vec![0x00, 0x01]);
        assert!(buf.is_dirty());
        assert_eq!(buf.uint16_slice().unwrap(), &[256]);
    }

    #[test]
    fn incompatible_views_fail_with_type_mismatch() {
        let buf = ElementBuffer::from_strs(Tag(0x0010, 0x0010), VR::PN, &["DOE^JOHN"]);
        let e = buf.numbers().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::TypeMismatch);
        let buf = ElementBuffer::from_u16s(Tag(0x0028, 0x0010), VR::US, &[1]);
        assert_eq!(buf.strings().unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(buf.dates().unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(buf.float32_slice().unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn numeric_views_per_vr() {
        let buf = ElementBuffer::from_f64s(Tag(0x0018, 0x9087), VR::FD, &[1.5, -2.0]);
        assert_eq!(buf.float64_slice().unwrap(), &[1.5, -2.0]);
        let buf = ElementBuffer::new(Tag(0x0028, 0x0106), VR::SS, vec![0xFF, 0xFF]);
        assert_eq!(buf.int16_slice().unwrap(), &[-1]);
        assert_eq!(buf.to_i64().unwrap(), -1);
        let buf = ElementBuffer::new(
            Tag(0x0028, 0x0009),
            VR::AT,
            vec![0x18, 0x00, 0x63, 0x10],
        );
        assert_eq!(buf.tag_slice().unwrap(), &[Tag(0x0018, 0x1063)]);
    }

    #[test]
    fn integer_strings() {
        let buf = ElementBuffer::from_strs(Tag(0x0028, 0x0008), VR::IS, &["12"]);
        assert_eq!(buf.to_u32().unwrap(), 12);
        let buf = ElementBuffer::from_strs(Tag(0x0028, 0x1050), VR::DS, &["40.5", "-7"]);
        assert_eq!(buf.to_f64s().unwrap(), vec![40.5, -7.0]);
    }

    #[test]
    fn dates_and_times() {
        let buf = ElementBuffer::from_strs(Tag(0x0008, 0x0020), VR::DA, &["20111225", "1999.01.02"]);
        assert_eq!(
            buf.dates().unwrap(),
            &DateTimeView::Dates(
                [
                    NaiveDate::from_ymd_opt(2011, 12, 25).unwrap(),
                    NaiveDate::from_ymd_opt(1999, 1, 2).unwrap()
                ]
                .into_iter()
                .collect()
            )
        );

        let buf = ElementBuffer::from_strs(Tag(0x0008, 0x0030), VR::TM, &["1030", "235959.5"]);
        assert_eq!(
            buf.dates().unwrap(),
            &DateTimeView::Times(
                [
                    NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
                    NaiveTime::from_hms_micro_opt(23, 59, 59, 500_000).unwrap()
                ]
                .into_iter()
                .collect()
            )
        );

        let buf = ElementBuffer::from_strs(Tag(0x0008, 0x002A), VR::DT, &["20200102030405+0100"]);
        match buf.dates().unwrap() {
            DateTimeView::DateTimes(v) => {
                assert_eq!(
                    v[0].datetime,
                    NaiveDate::from_ymd_opt(2020, 1, 2)
                        .unwrap()
                        .and_hms_opt(3, 4, 5)
                        .unwrap()
                );
                assert_eq!(v[0].offset, FixedOffset::east_opt(3600));
            }
            other => panic!("unexpected view {:?}", other),
        }

        let bad = ElementBuffer::from_strs(Tag(0x0008, 0x0020), VR::DA, &["2011-12"]);
        assert_eq!(bad.dates().unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[rstest]
    #[case(VR::DA, b"123\xE9567 ")]
    #[case(VR::TM, b"10\xE930")]
    #[case(VR::DT, b"2020\xE90102+01\xE9")]
    fn non_ascii_dates_are_rejected(#[case] vr: VR, #[case] value: &[u8]) {
        let buf = ElementBuffer::new(Tag(0x0008, 0x0020), vr, value.to_vec());
        let err = buf.dates().unwrap_err();
        assert!(matches!(err, BufferError::ParseValue { .. }), "{:?}", err);
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn non_ascii_text_uses_utf8() {
        let buf = ElementBuffer::from_strs(Tag(0x0010, 0x0010), VR::PN, &["Gómez^Ana"]);
        assert_eq!(buf.charset(), SpecificCharacterSet::IsoIr192);
        assert_eq!(buf.string().unwrap(), "Gómez^Ana");
    }

    #[test]
    fn equality_ignores_caches_and_flags() {
        let a = ElementBuffer::from_u16s(Tag(0x0028, 0x0010), VR::US, &[4]);
        let mut b = a.clone();
        let _ = a.numbers();
        b.set_value(vec![4, 0]);
        assert_eq!(a, b);
    }
}
