//! Text decoding and encoding according to the specific character set.
//!
//! Conversion tables are provided by the `encoding` crate;
//! this module only maps Specific Character Set (0008,0005) defined terms
//! onto them.

use encoding::all::{ISO_8859_1, ISO_8859_2, ISO_8859_5, UTF_8};
use encoding::{DecoderTrap, EncoderTrap, Encoding, RawDecoder, StringWriter};
use snafu::{Backtrace, Snafu};
use std::borrow::Cow;
use std::fmt::Debug;

/// An error type for text encoding issues.
#[derive(Debug, Snafu)]
#[snafu(display("Could not encode text as {}: {}", charset, message))]
pub struct EncodeTextError {
    /// name of the character set
    pub charset: &'static str,
    /// The error message in plain text.
    pub message: Cow<'static, str>,
    backtrace: Backtrace,
}

/// An error type for text decoding issues.
#[derive(Debug, Snafu)]
#[snafu(display("Could not decode text as {}: {}", charset, message))]
pub struct DecodeTextError {
    /// name of the character set
    pub charset: &'static str,
    /// The error message in plain text.
    pub message: Cow<'static, str>,
    backtrace: Backtrace,
}

/// A character set converter:
/// `bytes, declared charset -> text` and the inverse.
pub trait TextCodec: Debug {
    /// The defined term of the character set, as written in
    /// Specific Character Set (0008,0005).
    fn name(&self) -> &'static str;

    /// Decode the given bytes as a single string.
    /// The result may contain backslashes separating multiple values.
    fn decode(&self, text: &[u8]) -> Result<String, DecodeTextError>;

    /// Encode a text value into bytes.
    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeTextError>;
}

/// The character sets recognized by this library.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[non_exhaustive]
pub enum SpecificCharacterSet {
    /// **ISO-IR 6**: the default character repertoire.
    #[default]
    Default,
    /// **ISO-IR 100** (ISO-8859-1): Latin alphabet no. 1
    IsoIr100,
    /// **ISO-IR 101** (ISO-8859-2): Latin alphabet no. 2
    IsoIr101,
    /// **ISO-IR 144** (ISO-8859-5): Latin/Cyrillic
    IsoIr144,
    /// **ISO-IR 192**: Unicode in UTF-8
    IsoIr192,
}

impl SpecificCharacterSet {
    /// Obtain the character set identified by the given defined term,
    /// as found in Specific Character Set (0008,0005).
    ///
    /// ```
    /// # use dcmio_core::charset::SpecificCharacterSet;
    /// assert_eq!(
    ///     SpecificCharacterSet::from_code("ISO_IR 192"),
    ///     Some(SpecificCharacterSet::IsoIr192),
    /// );
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        use SpecificCharacterSet::*;
        match code.trim_end_matches(&[' ', '\0'][..]) {
            "" | "ISO_IR 6" | "ISO 2022 IR 6" => Some(Default),
            "ISO_IR 100" | "ISO 2022 IR 100" => Some(IsoIr100),
            "ISO_IR 101" | "ISO 2022 IR 101" => Some(IsoIr101),
            "ISO_IR 144" | "ISO 2022 IR 144" => Some(IsoIr144),
            "ISO_IR 192" => Some(IsoIr192),
            _ => None,
        }
    }

    fn table(self) -> &'static dyn Encoding {
        use SpecificCharacterSet::*;
        match self {
            // ISO-8859-1 is a superset of the default repertoire
            Default | IsoIr100 => ISO_8859_1,
            IsoIr101 => ISO_8859_2,
            IsoIr144 => ISO_8859_5,
            IsoIr192 => UTF_8,
        }
    }
}

/// Replace undecodable bytes with an octal escape (`\ooo`).
fn decode_text_trap(
    _decoder: &mut dyn RawDecoder,
    input: &[u8],
    output: &mut dyn StringWriter,
) -> bool {
    let c = input[0];
    output.write_char('\\');
    output.write_char((((c & 0o300) >> 6) + b'0') as char);
    output.write_char((((c & 0o070) >> 3) + b'0') as char);
    output.write_char(((c & 0o007) + b'0') as char);
    true
}

impl TextCodec for SpecificCharacterSet {
    fn name(&self) -> &'static str {
        use SpecificCharacterSet::*;
        match self {
            Default => "ISO_IR 6",
            IsoIr100 => "ISO_IR 100",
            IsoIr101 => "ISO_IR 101",
            IsoIr144 => "ISO_IR 144",
            IsoIr192 => "ISO_IR 192",
        }
    }

    fn decode(&self, text: &[u8]) -> Result<String, DecodeTextError> {
        self.table()
            .decode(text, DecoderTrap::Call(decode_text_trap))
            .map_err(|message| {
                DecodeTextSnafu {
                    charset: self.name(),
                    message,
                }
                .build()
            })
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeTextError> {
        self.table()
            .encode(text, EncoderTrap::Strict)
            .map_err(|message| {
                EncodeTextSnafu {
                    charset: self.name(),
                    message,
                }
                .build()
            })
    }
}
