//! A writer of DICOM data set tokens.
//!
//! The [`DataSetWriter`] is the counterpart of the data set reader:
//! it consumes [`DataToken`]s and prints them in a transfer syntax,
//! writing sequence and item delimiters only where lengths are undefined.
use crate::dataset::{DataToken, SeqTokenType};
use crate::stateful::encode::{DynStatefulEncoder, Error as EncoderError, StatefulEncoder};
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::header::tags;
use dcmio_core::{DataElementHeader, Length, VR};
use dcmio_encoding::encode::EncodeTo;
use dcmio_encoding::transfer_syntax::{DynEncoder, TransferSyntax};
use dcmio_encoding::StreamWriter;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Unsupported transfer syntax for encoding
    #[snafu(display("Could not create an encoder"))]
    CreateEncoder {
        #[snafu(backtrace)]
        source: EncoderError,
    },
    #[snafu(display("Unexpected token {}", token))]
    UnexpectedToken {
        token: Box<DataToken>,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not encode token"))]
    Encode {
        #[snafu(backtrace)]
        source: EncoderError,
    },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::CreateEncoder { source } | Error::Encode { source } => source.kind(),
            Error::UnexpectedToken { .. } => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A token representing a sequence or item start.
#[derive(Debug)]
struct SeqToken {
    /// Whether it is the start of a sequence or the start of an item.
    typ: SeqTokenType,
    /// The length of the value, as indicated by the starting element,
    /// can be unknown.
    len: Length,
    /// Whether this token belongs to encapsulated pixel data.
    pixel_data: bool,
}

/// A stateful device for printing a DICOM data set in sequential order.
/// This is analogous to the `DataSetReader` type for converting data
/// set tokens to bytes.
#[derive(Debug)]
pub struct DataSetWriter<W, E> {
    printer: StatefulEncoder<W, E>,
    seq_tokens: Vec<SeqToken>,
    last_header: Option<DataElementHeader>,
    /// a pixel data item header not yet written,
    /// as its length depends on the value which follows
    pending_fragment: bool,
}

impl<'w, W: 'w> DataSetWriter<W, DynEncoder<'w, StreamWriter<W>>>
where
    W: Write,
{
    /// Create a data set writer for the given transfer syntax.
    pub fn with_ts(to: W, ts: &TransferSyntax) -> Result<Self> {
        let printer = DynStatefulEncoder::from_transfer_syntax(to, ts).context(CreateEncoderSnafu)?;
        Ok(DataSetWriter::new(printer))
    }
}

impl<W, E> DataSetWriter<W, E> {
    pub fn new(printer: StatefulEncoder<W, E>) -> Self {
        DataSetWriter {
            printer,
            seq_tokens: Vec::new(),
            last_header: None,
            pending_fragment: false,
        }
    }
}

impl<W, E> DataSetWriter<W, E>
where
    W: Write,
    E: EncodeTo<StreamWriter<W>>,
{
    /// Feed the given sequence of tokens which are part of the same data set.
    pub fn write_sequence<I>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = DataToken>,
    {
        for token in tokens {
            self.write(token)?;
        }

        Ok(())
    }

    /// Feed the given data set token for writing the data set.
    pub fn write(&mut self, token: DataToken) -> Result<()> {
        // explicit length sequences or items should not print
        // the respective delimiter
        match token {
            DataToken::ElementHeader(header) => {
                if self.last_header.is_some() {
                    return UnexpectedTokenSnafu { token }.fail();
                }
                // the header is printed along with the value,
                // once the padded length is known
                self.last_header = Some(header);
                Ok(())
            }
            DataToken::PrimitiveValue(value) => match self.last_header.take() {
                Some(header) => self
                    .printer
                    .encode_element(header.tag, header.vr, &value)
                    .context(EncodeSnafu),
                None => UnexpectedTokenSnafu {
                    token: DataToken::PrimitiveValue(value),
                }
                .fail(),
            },
            DataToken::SequenceStart { tag, len } => {
                self.seq_tokens.push(SeqToken {
                    typ: SeqTokenType::Sequence,
                    len,
                    pixel_data: false,
                });
                self.printer
                    .encode_element_header(DataElementHeader::new(tag, VR::SQ, len))
                    .context(EncodeSnafu)
            }
            DataToken::PixelSequenceStart { vr } => {
                self.seq_tokens.push(SeqToken {
                    typ: SeqTokenType::Sequence,
                    len: Length::UNDEFINED,
                    pixel_data: true,
                });
                self.printer
                    .encode_element_header(DataElementHeader::new(
                        tags::PIXEL_DATA,
                        vr,
                        Length::UNDEFINED,
                    ))
                    .context(EncodeSnafu)
            }
            DataToken::ItemStart { len } => {
                let pixel_data = self.seq_tokens.last().map_or(false, |t| t.pixel_data);
                self.seq_tokens.push(SeqToken {
                    typ: SeqTokenType::Item,
                    len,
                    pixel_data,
                });
                if pixel_data {
                    self.pending_fragment = true;
                    Ok(())
                } else {
                    self.printer
                        .encode_item_header(len.0)
                        .context(EncodeSnafu)
                }
            }
            DataToken::OffsetTable(ref table) if self.pending_fragment => {
                self.pending_fragment = false;
                self.printer.encode_offset_table(table).context(EncodeSnafu)
            }
            DataToken::ItemValue(ref data) if self.pending_fragment => {
                self.pending_fragment = false;
                self.printer.encode_fragment(data).context(EncodeSnafu)
            }
            DataToken::ItemEnd => {
                let Some(SeqToken {
                    typ: SeqTokenType::Item,
                    len,
                    pixel_data,
                }) = self.seq_tokens.pop()
                else {
                    return UnexpectedTokenSnafu { token }.fail();
                };
                if pixel_data {
                    if self.pending_fragment {
                        // item without value
                        self.pending_fragment = false;
                        self.printer.encode_item_header(0).context(EncodeSnafu)?;
                    }
                    Ok(())
                } else if len.is_undefined() {
                    self.printer.encode_item_delimiter().context(EncodeSnafu)
                } else {
                    Ok(())
                }
            }
            DataToken::SequenceEnd => {
                let Some(SeqToken {
                    typ: SeqTokenType::Sequence,
                    len,
                    ..
                }) = self.seq_tokens.pop()
                else {
                    return UnexpectedTokenSnafu { token }.fail();
                };
                if len.is_undefined() {
                    self.printer
                        .encode_sequence_delimiter()
                        .context(EncodeSnafu)
                } else {
                    Ok(())
                }
            }
            token @ (DataToken::OffsetTable(_) | DataToken::ItemValue(_)) => {
                UnexpectedTokenSnafu { token }.fail()
            }
        }
    }

    /// Flush the inner writer.
    pub fn flush(&mut self) -> Result<()> {
        self.printer.flush().context(EncodeSnafu)
    }

    /// Retrieve the number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.printer.bytes_written()
    }

    /// Retrieve the underlying writer.
    pub fn into_inner(self) -> W {
        self.printer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::DataSetWriter;
    use crate::dataset::DataToken;
    use crate::stateful::encode::StatefulEncoder;
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_core::header::{DataElementHeader, Length};
    use dcmio_core::{Tag, VR};
    use dcmio_encoding::encode::{explicit_le::ExplicitVRLittleEndianEncoder, EncoderFor};

    fn write_tokens(tokens: Vec<DataToken>) -> Vec<u8> {
        let mut raw_out: Vec<u8> = vec![];
        let printer = StatefulEncoder::new(
            &mut raw_out,
            EncoderFor::new(ExplicitVRLittleEndianEncoder::default()),
        );
        let mut dset_writer = DataSetWriter::new(printer);

        dset_writer.write_sequence(tokens).unwrap();
        drop(dset_writer);
        raw_out
    }

    #[test]
    fn write_sequence_explicit() {
        let tokens = vec![
            DataToken::SequenceStart {
                tag: Tag(0x0018, 0x6011),
                len: Length(46),
            },
            DataToken::ItemStart { len: Length(20) },
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6012),
                vr: VR::US,
                len: Length(2),
            }),
            DataToken::PrimitiveValue(vec![0x01, 0x00]),
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6014),
                vr: VR::US,
                len: Length(2),
            }),
            DataToken::PrimitiveValue(vec![0x02, 0x00]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(10) },
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6012),
                vr: VR::US,
                len: Length(2),
            }),
            DataToken::PrimitiveValue(vec![0x04, 0x00]),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0020, 0x4000),
                vr: VR::LT,
                len: Length(4),
            }),
            DataToken::PrimitiveValue(b"TEST".to_vec()),
        ];

        #[rustfmt::skip]
        static GROUND_TRUTH: &[u8] = &[
            0x18, 0x00, 0x11, 0x60, // sequence tag: (0018,6011) SequenceOfUltrasoundRegions
            b'S', b'Q', // VR
            0x00, 0x00, // reserved
            0x2e, 0x00, 0x00, 0x00, // length: 28 + 18 = 46 (#= 2)
            // -- 12 --
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x14, 0x00, 0x00, 0x00, // item length: 20 (#= 2)
            // -- 20 --
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x01, 0x00, // (0018,6012) RegionSpatialFormat, len = 2, value = 1
            // -- 30 --
            0x18, 0x00, 0x14, 0x60, b'U', b'S', 0x02, 0x00, 0x02, 0x00, // (0018,6014) RegionDataType, len = 2, value = 2
            // -- 40 --
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x0a, 0x00, 0x00, 0x00, // item length: 10 (#= 1)
            // -- 48 --
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x04, 0x00, // (0018,6012) RegionSpatialFormat, len = 2, value = 4
            // -- 58 --
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x04, 0x00, // (0020,4000) ImageComments, len = 4
            b'T', b'E', b'S', b'T', // value = "TEST"
        ];

        assert_eq!(write_tokens(tokens), GROUND_TRUTH);
    }

    #[test]
    fn write_sequence_undefined_length() {
        let tokens = vec![
            DataToken::SequenceStart {
                tag: Tag(0x0018, 0x6011),
                len: Length::UNDEFINED,
            },
            DataToken::ItemStart {
                len: Length::UNDEFINED,
            },
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6012),
                vr: VR::US,
                len: Length(2),
            }),
            DataToken::PrimitiveValue(vec![0x01, 0x00]),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];

        #[rustfmt::skip]
        static GROUND_TRUTH: &[u8] = &[
            0x18, 0x00, 0x11, 0x60, b'S', b'Q', 0x00, 0x00,
            0xff, 0xff, 0xff, 0xff, // length: undefined
            0xfe, 0xff, 0x00, 0xe0,
            0xff, 0xff, 0xff, 0xff, // item length: undefined
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x01, 0x00,
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00, // item end
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
        ];

        assert_eq!(write_tokens(tokens), GROUND_TRUTH);
    }

    #[test]
    fn write_element_with_odd_value_is_padded() {
        let tokens = vec![
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0008, 0x0018),
                vr: VR::UI,
                len: Length(7),
            }),
            DataToken::PrimitiveValue(b"1.2.3.4".to_vec()),
        ];

        #[rustfmt::skip]
        static GROUND_TRUTH: &[u8] = &[
            0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x08, 0x00,
            b'1', b'.', b'2', b'.', b'3', b'.', b'4', 0x00,
        ];

        assert_eq!(write_tokens(tokens), GROUND_TRUTH);
    }

    #[test]
    fn write_encapsulated_pixeldata() {
        let tokens = vec![
            DataToken::PixelSequenceStart { vr: VR::OB },
            DataToken::ItemStart { len: Length(8) },
            DataToken::OffsetTable(vec![0, 12]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(4) },
            DataToken::ItemValue(vec![0x99, 0x88, 0x77, 0x66]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(2) },
            DataToken::ItemValue(vec![0x55]),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];

        #[rustfmt::skip]
        static GROUND_TRUTH: &[u8] = &[
            0xe0, 0x7f, 0x10, 0x00, b'O', b'B', 0x00, 0x00,
            0xff, 0xff, 0xff, 0xff, // length: undefined
            0xfe, 0xff, 0x00, 0xe0, 0x08, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x0c, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0x00, 0xe0, 0x04, 0x00, 0x00, 0x00,
            0x99, 0x88, 0x77, 0x66,
            0xfe, 0xff, 0x00, 0xe0, 0x02, 0x00, 0x00, 0x00,
            0x55, 0x00, // fragment padded to even length
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00,
        ];

        assert_eq!(write_tokens(tokens), GROUND_TRUTH);
    }

    #[test]
    fn write_empty_offset_table_item() {
        let tokens = vec![
            DataToken::PixelSequenceStart { vr: VR::OB },
            DataToken::ItemStart { len: Length(0) },
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];

        #[rustfmt::skip]
        static GROUND_TRUTH: &[u8] = &[
            0xe0, 0x7f, 0x10, 0x00, b'O', b'B', 0x00, 0x00,
            0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0x00, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00,
        ];

        assert_eq!(write_tokens(tokens), GROUND_TRUTH);
    }

    #[test]
    fn value_without_header_is_rejected() {
        let mut raw_out: Vec<u8> = vec![];
        let printer = StatefulEncoder::new(
            &mut raw_out,
            EncoderFor::new(ExplicitVRLittleEndianEncoder::default()),
        );
        let mut dset_writer = DataSetWriter::new(printer);
        let err = dset_writer
            .write(DataToken::PrimitiveValue(vec![1, 2]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = dset_writer.write(DataToken::SequenceEnd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
