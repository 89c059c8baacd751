//! This module contains a mid-level abstraction for reading DICOM content
//! sequentially.
//!
//! The rest of the crate is used to obtain DICOM element headers and values.
//! At this level, headers and values are treated as tokens which can be used
//! to form a syntax tree of a full data set.
use crate::stateful::decode::{DynStatefulDecoder, Error as DecoderError, StatefulDecode};
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::header::{tags, DataElementHeader, Header, Length, SequenceItemHeader};
use dcmio_core::{Tag, VR};
use dcmio_encoding::transfer_syntax::TransferSyntax;
use smallvec::SmallVec;
use snafu::{Backtrace, ResultExt, Snafu};
use std::cmp::Ordering;
use std::io::Read;
use std::iter::Iterator;

use super::{DataToken, SeqTokenType};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not create decoder"))]
    CreateDecoder {
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display("Could not read item header"))]
    ReadItemHeader {
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display("Could not read element header"))]
    ReadHeader {
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display("Could not read {} value bytes for element tagged {}", len, tag))]
    ReadValue {
        len: u32,
        tag: Tag,
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display("Could not read {} bytes for item value", len))]
    ReadItemValue {
        len: u32,
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display(
        "Inconsistent sequence end: expected end at {} bytes but read {}",
        end_of_sequence,
        bytes_read
    ))]
    InconsistentSequenceEnd {
        end_of_sequence: u64,
        bytes_read: u64,
        backtrace: Backtrace,
    },
    #[snafu(display(
        "Unexpected item tag {} while reading element header at position {}",
        tag,
        position
    ))]
    UnexpectedItemTag {
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
    },
    #[snafu(display("Undefined pixel data item length at position {}", position))]
    UndefinedItemLength { position: u64, backtrace: Backtrace },
    #[snafu(display(
        "Sequence {} at position {} reaches depth {}, beyond the limit of {}",
        tag,
        position,
        depth,
        max_depth
    ))]
    DepthLimitReached {
        tag: Tag,
        depth: u32,
        max_depth: u32,
        position: u64,
        backtrace: Backtrace,
    },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::CreateDecoder { source }
            | Error::ReadItemHeader { source }
            | Error::ReadHeader { source }
            | Error::ReadValue { source, .. }
            | Error::ReadItemValue { source, .. } => source.kind(),
            Error::InconsistentSequenceEnd { .. }
            | Error::UnexpectedItemTag { .. }
            | Error::UndefinedItemLength { .. } => ErrorKind::CorruptedFile,
            Error::DepthLimitReached { .. } => ErrorKind::DepthLimitReached,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A reader-specific token representing a sequence or item start.
#[derive(Debug, Copy, Clone, PartialEq)]
struct SeqToken {
    /// Whether it is the start of a sequence or the start of an item.
    typ: SeqTokenType,
    /// The length of the value, as indicated by the starting element,
    /// can be unknown.
    len: Length,
    /// Whether this sequence token is part of an encapsulated pixel data.
    pixel_data: bool,
    /// The number of bytes the parser has read until it reached the
    /// beginning of the sequence or item value data.
    base_offset: u64,
}

/// The default limit of sequence nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// The set of options for the data set reader.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct DataSetReaderOptions {
    /// the maximum sequence nesting depth,
    /// where items of a top level sequence are at depth 1
    pub max_depth: u32,
    /// whether unknown VR codes are an error
    /// instead of being read as `UN`
    pub strict_vr: bool,
    /// the position of the reader as received at building time
    pub base_offset: u64,
}

impl Default for DataSetReaderOptions {
    fn default() -> Self {
        DataSetReaderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_vr: false,
            base_offset: 0,
        }
    }
}

impl DataSetReaderOptions {
    /// Replace the maximum sequence nesting depth.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
    /// Replace the unknown VR policy.
    pub fn strict_vr(mut self, strict_vr: bool) -> Self {
        self.strict_vr = strict_vr;
        self
    }
    /// Replace the base reader offset of the options.
    pub fn base_offset(mut self, base_offset: u64) -> Self {
        self.base_offset = base_offset;
        self
    }
}

/// A higher-level reader for retrieving structure in a DICOM data set from an
/// arbitrary data source.
#[derive(Debug)]
pub struct DataSetReader<S> {
    /// the stateful decoder
    parser: S,
    /// the options of this reader
    options: DataSetReaderOptions,
    /// whether the reader is expecting an item header next (or a sequence delimiter)
    in_sequence: bool,
    /// whether the reader is expecting the first item value of a pixel sequence next
    /// (offset table)
    offset_table_next: bool,
    /// whether a check for a sequence or item delimitation is pending
    delimiter_check_pending: bool,
    /// a stack of delimiters
    seq_delimiters: SmallVec<[SeqToken; 8]>,
    /// fuse the iteration process if true
    hard_break: bool,
    /// last decoded header
    last_header: Option<DataElementHeader>,
}

impl<R> DataSetReader<DynStatefulDecoder<R>>
where
    R: Read,
{
    /// Create a new data set reader over the given source,
    /// encoded in the given transfer syntax.
    #[inline]
    pub fn new_with_ts(source: R, ts: &TransferSyntax) -> Result<Self> {
        Self::new_with_ts_options(source, ts, Default::default())
    }

    /// Create a new data set reader with the given options.
    pub fn new_with_ts_options(
        source: R,
        ts: &TransferSyntax,
        options: DataSetReaderOptions,
    ) -> Result<Self> {
        let parser =
            DynStatefulDecoder::new_with(source, ts, options.strict_vr, options.base_offset)
                .context(CreateDecoderSnafu)?;
        Ok(DataSetReader::new(parser, options))
    }
}

impl<S> DataSetReader<S> {
    /// Create a new iterator with the given stateful decoder and options.
    pub fn new(decoder: S, options: DataSetReaderOptions) -> Self {
        DataSetReader {
            parser: decoder,
            options,
            seq_delimiters: SmallVec::new(),
            delimiter_check_pending: false,
            offset_table_next: false,
            in_sequence: false,
            hard_break: false,
            last_header: None,
        }
    }

    /// Retrieve the inner stateful decoder.
    pub fn into_decoder(self) -> S {
        self.parser
    }
}

impl<S> Iterator for DataSetReader<S>
where
    S: StatefulDecode,
{
    type Item = Result<DataToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.hard_break {
            return None;
        }
        let out = self.next_token();
        if let Some(Err(_)) = out {
            self.hard_break = true;
        }
        out
    }
}

impl<S> DataSetReader<S>
where
    S: StatefulDecode,
{
    /// The current position of the underlying decoder.
    pub fn position(&self) -> u64 {
        self.parser.position()
    }

    /// The current sequence nesting depth.
    fn depth(&self) -> u32 {
        self.seq_delimiters
            .iter()
            .filter(|t| t.typ == SeqTokenType::Sequence && !t.pixel_data)
            .count() as u32
    }

    fn next_token(&mut self) -> Option<Result<DataToken>> {
        // item or sequence delimitation logic for explicit lengths
        if self.delimiter_check_pending {
            match self.update_seq_delimiters() {
                Err(e) => return Some(Err(e)),
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => { /* no-op */ }
            }
        }

        if self.in_sequence {
            // at sequence level, expecting item header
            let pixel_data = self.seq_delimiters.last().map_or(false, |t| t.pixel_data);
            match self.parser.decode_item_header() {
                Ok(SequenceItemHeader::Item { len }) => {
                    // entered a new item
                    self.in_sequence = false;
                    self.push_sequence_token(SeqTokenType::Item, len, pixel_data);
                    // items can be empty
                    if len == Length(0) && !pixel_data {
                        self.delimiter_check_pending = true;
                    }
                    Some(Ok(DataToken::ItemStart { len }))
                }
                Ok(SequenceItemHeader::ItemDelimiter) => {
                    // closed an item
                    self.seq_delimiters.pop();
                    self.in_sequence = true;
                    // sequences can end after an item delimiter
                    self.delimiter_check_pending = true;
                    Some(Ok(DataToken::ItemEnd))
                }
                Ok(SequenceItemHeader::SequenceDelimiter) => {
                    // closed a sequence
                    self.seq_delimiters.pop();
                    self.in_sequence = false;
                    // items can end after a nested sequence ends
                    self.delimiter_check_pending = true;
                    Some(Ok(DataToken::SequenceEnd))
                }
                Err(e) => Some(Err(e).context(ReadItemHeaderSnafu)),
            }
        } else if let Some(&SeqToken {
            typ: SeqTokenType::Item,
            pixel_data: true,
            len,
            ..
        }) = self.seq_delimiters.last()
        {
            let Some(len) = len.get() else {
                return Some(
                    UndefinedItemLengthSnafu {
                        position: self.parser.position(),
                    }
                    .fail(),
                );
            };

            // need to pop item delimiter on the next iteration
            self.delimiter_check_pending = true;

            if self.offset_table_next {
                self.offset_table_next = false;
                let mut offset_table = Vec::with_capacity(len as usize / 4);
                Some(
                    match self.parser.read_u32_to_vec(len, &mut offset_table) {
                        Ok(()) => Ok(DataToken::OffsetTable(offset_table)),
                        Err(e) => Err(e).context(ReadItemValueSnafu { len }),
                    },
                )
            } else {
                let mut value = Vec::new();
                Some(
                    match self.parser.read_to_vec(len, &mut value) {
                        Ok(()) => Ok(DataToken::ItemValue(value)),
                        Err(e) => Err(e).context(ReadItemValueSnafu { len }),
                    },
                )
            }
        } else if let Some(header) = self.last_header.take() {
            if header.is_encapsulated_pixeldata() {
                self.push_sequence_token(SeqTokenType::Sequence, Length::UNDEFINED, true);

                // encapsulated pixel data, expecting offset table
                match self.parser.decode_item_header() {
                    Ok(SequenceItemHeader::Item { len }) => {
                        // entered the offset table item
                        self.in_sequence = false;
                        self.offset_table_next = true;
                        self.push_sequence_token(SeqTokenType::Item, len, true);
                        Some(Ok(DataToken::ItemStart { len }))
                    }
                    Ok(SequenceItemHeader::SequenceDelimiter) => {
                        // empty pixel data
                        self.seq_delimiters.pop();
                        self.in_sequence = false;
                        self.delimiter_check_pending = true;
                        Some(Ok(DataToken::SequenceEnd))
                    }
                    Ok(item) => Some(
                        UnexpectedItemTagSnafu {
                            tag: item.tag(),
                            position: self.parser.position(),
                        }
                        .fail(),
                    ),
                    Err(e) => Some(Err(e).context(ReadItemHeaderSnafu)),
                }
            } else {
                // a plain element header was read, so a value is expected
                let value = match self.parser.read_value_bytes(&header) {
                    Ok(v) => v,
                    Err(e) => {
                        return Some(Err(e).context(ReadValueSnafu {
                            len: header.len.0,
                            tag: header.tag,
                        }))
                    }
                };

                // sequences can end after this token
                self.delimiter_check_pending = true;

                Some(Ok(DataToken::PrimitiveValue(value)))
            }
        } else {
            // a data element header or item delimiter is expected
            match self.parser.decode_header() {
                Ok(DataElementHeader {
                    tag,
                    vr: VR::SQ,
                    len,
                }) => self.enter_sequence(tag, len),
                Ok(DataElementHeader {
                    tag: tags::ITEM_DELIMITATION_ITEM,
                    ..
                }) if !self.in_undefined_item() => {
                    // ignore delimiter, we are not in an item of undefined length
                    tracing::warn!(
                        "Item delimitation item outside of an item in position {}",
                        self.parser.position()
                    );
                    // return a new token by calling the method again
                    self.next_token()
                }
                Ok(DataElementHeader {
                    tag: tags::ITEM_DELIMITATION_ITEM,
                    ..
                }) => {
                    self.in_sequence = true;
                    // pop item delimiter
                    self.seq_delimiters.pop();
                    // sequences can end after this token
                    self.delimiter_check_pending = true;
                    Some(Ok(DataToken::ItemEnd))
                }
                Ok(DataElementHeader {
                    tag: tags::SEQUENCE_DELIMITATION_ITEM,
                    ..
                }) if self.seq_delimiters.is_empty() => {
                    tracing::warn!(
                        "Sequence delimitation item outside of a sequence in position {}",
                        self.parser.position()
                    );
                    self.next_token()
                }
                Ok(DataElementHeader { tag, .. }) if tag.group() == 0xFFFE => Some(
                    UnexpectedItemTagSnafu {
                        tag,
                        position: self.parser.position(),
                    }
                    .fail(),
                ),
                Ok(header) if header.is_encapsulated_pixeldata() => {
                    // encapsulated pixel data conditions:
                    // expect a sequence of pixel data fragments

                    // save it for the next step
                    self.last_header = Some(header);
                    Some(Ok(DataToken::PixelSequenceStart { vr: header.vr }))
                }
                Ok(header) if header.len.is_undefined() => {
                    // treat other undefined length elements
                    // as data set sequences,
                    // discarding the VR in the process
                    tracing::debug!(
                        "Element {} ({}) of undefined length read as a sequence",
                        header.tag,
                        header.vr
                    );
                    self.enter_sequence(header.tag, header.len)
                }
                Ok(header) => {
                    if header.len.0 % 2 == 1 {
                        tracing::warn!(
                            "Element {} has odd length {} in position {}",
                            header.tag,
                            header.len.0,
                            self.parser.position()
                        );
                    }
                    // save it for the next step
                    self.last_header = Some(header);
                    Some(Ok(DataToken::ElementHeader(header)))
                }
                Err(e) if e.is_clean_eof() => {
                    // Note: if the source ended while trying to read
                    // an element tag, then we assume that
                    // the end of a DICOM object was reached gracefully.
                    if !self.seq_delimiters.is_empty() {
                        tracing::warn!(
                            "Data set ended with {} open sequences or items",
                            self.seq_delimiters.len()
                        );
                    }
                    self.hard_break = true;
                    None
                }
                Err(e) => Some(Err(e).context(ReadHeaderSnafu)),
            }
        }
    }

    fn enter_sequence(&mut self, tag: Tag, len: Length) -> Option<Result<DataToken>> {
        let depth = self.depth() + 1;
        if depth > self.options.max_depth {
            return Some(
                DepthLimitReachedSnafu {
                    tag,
                    depth,
                    max_depth: self.options.max_depth,
                    position: self.parser.position(),
                }
                .fail(),
            );
        }

        self.in_sequence = true;
        self.push_sequence_token(SeqTokenType::Sequence, len, false);

        // sequences can end right after they start
        if len == Length(0) {
            self.delimiter_check_pending = true;
        }

        Some(Ok(DataToken::SequenceStart { tag, len }))
    }

    /// Whether the innermost open token is an item of undefined length.
    fn in_undefined_item(&self) -> bool {
        matches!(
            self.seq_delimiters.last(),
            Some(SeqToken {
                typ: SeqTokenType::Item,
                len,
                ..
            }) if len.is_undefined()
        )
    }

    fn update_seq_delimiters(&mut self) -> Result<Option<DataToken>> {
        if let Some(sd) = self.seq_delimiters.last() {
            if let Some(len) = sd.len.get() {
                let end_of_sequence = sd.base_offset + u64::from(len);
                let bytes_read = self.parser.position();
                match end_of_sequence.cmp(&bytes_read) {
                    Ordering::Equal => {
                        // end of delimiter, as indicated by the element's length
                        let token = match sd.typ {
                            SeqTokenType::Sequence => {
                                self.in_sequence = false;
                                DataToken::SequenceEnd
                            }
                            SeqTokenType::Item => {
                                self.in_sequence = true;
                                DataToken::ItemEnd
                            }
                        };
                        self.seq_delimiters.pop();
                        return Ok(Some(token));
                    }
                    Ordering::Less => {
                        return InconsistentSequenceEndSnafu {
                            end_of_sequence,
                            bytes_read,
                        }
                        .fail();
                    }
                    Ordering::Greater => {} // continue normally
                }
            }
        }
        self.delimiter_check_pending = false;
        Ok(None)
    }

    #[inline]
    fn push_sequence_token(&mut self, typ: SeqTokenType, len: Length, pixel_data: bool) {
        self.seq_delimiters.push(SeqToken {
            typ,
            pixel_data,
            len,
            base_offset: self.parser.position(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSetReader, DataSetReaderOptions, DataToken, StatefulDecode};
    use crate::stateful::decode::StatefulDecoder;
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_core::header::{DataElementHeader, Length};
    use dcmio_core::{Tag, VR};
    use dcmio_encoding::decode::{
        explicit_le::ExplicitVRLittleEndianDecoder, implicit_le::ImplicitVRLittleEndianDecoder,
    };
    use dcmio_encoding::Endianness;

    fn validate_dataset_reader_implicit_vr<I>(data: &[u8], ground_truth: I)
    where
        I: IntoIterator<Item = DataToken>,
    {
        let parser = StatefulDecoder::new(
            data,
            ImplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );

        validate_dataset_reader(data, parser, ground_truth)
    }

    fn validate_dataset_reader_explicit_vr<I>(data: &[u8], ground_truth: I)
    where
        I: IntoIterator<Item = DataToken>,
    {
        let parser = StatefulDecoder::new(
            data,
            ExplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );

        validate_dataset_reader(data, parser, ground_truth)
    }

    fn validate_dataset_reader<I, D>(data: &[u8], parser: D, ground_truth: I)
    where
        I: IntoIterator<Item = DataToken>,
        D: StatefulDecode,
    {
        let mut dset_reader = DataSetReader::new(parser, Default::default());

        let iter = &mut dset_reader;
        let ground_truth = ground_truth.into_iter();

        for gt_token in ground_truth {
            let token = iter
                .next()
                .expect("expecting more tokens from reader")
                .expect("should fetch the next token without an error");
            assert_eq!(
                token, gt_token,
                "Got token {:2?} ; but expected {:2?}",
                token, gt_token
            );
        }

        let extra: Vec<_> = iter.collect();
        assert_eq!(
            extra.len(), // we have already read all of them
            0,
            "extraneous tokens remaining: {:?}",
            extra,
        );
        assert_eq!(
            dset_reader.position(),
            data.len() as u64,
            "Decoder position did not match end of data",
        );
    }

    fn us(value: u16) -> DataToken {
        DataToken::PrimitiveValue(value.to_le_bytes().to_vec())
    }

    #[test]
    fn read_sequence_explicit() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
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

        let ground_truth = vec![
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
            us(1),
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6014),
                vr: VR::US,
                len: Length(2),
            }),
            us(2),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(10) },
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0018, 0x6012),
                vr: VR::US,
                len: Length(2),
            }),
            us(4),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0020, 0x4000),
                vr: VR::LT,
                len: Length(4),
            }),
            DataToken::PrimitiveValue(b"TEST".to_vec()),
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    #[test]
    fn read_empty_sequence_explicit() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x18, 0x22, // (0008,2218) AnatomicRegionSequence
            b'S', b'Q',             // VR: SQ
            0x00, 0x00,             // Reserved
            0x00, 0x00, 0x00, 0x00, // Length: 0
        ];

        let ground_truth = vec![
            DataToken::SequenceStart {
                tag: Tag(0x0008, 0x2218),
                len: Length(0),
            },
            DataToken::SequenceEnd,
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    /// Gracefully ignore a stray item end tag in the data set.
    #[test]
    fn ignore_trailing_item_delimitation_item() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x04, 0x00, // (0020,4000) ImageComments, len = 4
            b'T', b'E', b'S', b'T', // value = "TEST"
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00, // item end
        ];

        let ground_truth = vec![
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0020, 0x4000),
                vr: VR::LT,
                len: Length(4),
            }),
            DataToken::PrimitiveValue(b"TEST".to_vec()),
            // no item end
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    #[test]
    fn read_sequence_undefined_length() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x18, 0x00, 0x11, 0x60, // sequence tag: (0018,6011) SequenceOfUltrasoundRegions
            b'S', b'Q', // VR
            0x00, 0x00, // reserved
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 12 --
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0xff, 0xff, 0xff, 0xff, // item length: undefined
            // -- 20 --
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x01, 0x00, // (0018,6012) RegionSpatialFormat, len = 2, value = 1
            // -- 30 --
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00, // item end
            // -- 38 --
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
            // -- 46 --
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x04, 0x00, // (0020,4000) ImageComments, len = 4
            b'T', b'E', b'S', b'T', // value = "TEST"
        ];

        let ground_truth = vec![
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
            us(1),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
            DataToken::ElementHeader(DataElementHeader {
                tag: Tag(0x0020, 0x4000),
                vr: VR::LT,
                len: Length(4),
            }),
            DataToken::PrimitiveValue(b"TEST".to_vec()),
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    #[test]
    fn read_implicit_len_sequence_implicit_vr_unknown() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x33, 0x55, 0x33, 0x55, // sequence tag: (5533,5533) «private, unknown attribute»
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 8 --
            0xfe, 0xff, 0x00, 0xe0, // item begin
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 16 --
            0xfe, 0xff, 0x0d, 0xe0, // item end
            0x00, 0x00, 0x00, 0x00, // length is always zero
            // -- 24 --
            0xfe, 0xff, 0xdd, 0xe0,
            0x00, 0x00, 0x00, 0x00, // sequence end
            // -- 32 --
        ];

        let ground_truth = vec![
            DataToken::SequenceStart {
                tag: Tag(0x5533, 0x5533),
                len: Length::UNDEFINED,
            },
            DataToken::ItemStart {
                len: Length::UNDEFINED,
            },
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];

        validate_dataset_reader_implicit_vr(DATA, ground_truth);
    }

    #[test]
    fn read_encapsulated_pixeldata() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xe0, 0x7f, 0x10, 0x00, // (7FE0,0010) PixelData
            b'O', b'B', // VR
            0x00, 0x00, // reserved
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 12 -- Basic offset table
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x08, 0x00, 0x00, 0x00, // item length: 8
            0x00, 0x00, 0x00, 0x00, // first frame at 0
            0x0c, 0x00, 0x00, 0x00, // second frame at 12
            // -- 28 -- First fragment
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x04, 0x00, 0x00, 0x00, // item length: 4
            0x99, 0x88, 0x77, 0x66,
            // -- 40 -- Second fragment
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x02, 0x00, 0x00, 0x00, // item length: 2
            0x55, 0x44,
            // -- 50 -- End of pixel data
            0xfe, 0xff, 0xdd, 0xe0, // sequence end tag
            0x00, 0x00, 0x00, 0x00,
            // -- 58 -- padding
            0xfc, 0xff, 0xfc, 0xff, // (fffc,fffc) DataSetTrailingPadding
            b'O', b'B', // VR
            0x00, 0x00, // reserved
            0x08, 0x00, 0x00, 0x00, // length: 8
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let ground_truth = vec![
            DataToken::PixelSequenceStart { vr: VR::OB },
            DataToken::ItemStart { len: Length(8) },
            DataToken::OffsetTable(vec![0, 12]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(4) },
            DataToken::ItemValue(vec![0x99, 0x88, 0x77, 0x66]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(2) },
            DataToken::ItemValue(vec![0x55, 0x44]),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
            DataToken::ElementHeader(DataElementHeader::new(
                Tag(0xFFFC, 0xFFFC),
                VR::OB,
                Length(8),
            )),
            DataToken::PrimitiveValue(vec![0; 8]),
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    #[test]
    fn read_encapsulated_pixeldata_with_empty_offset_table() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xe0, 0x7f, 0x10, 0x00, // (7FE0,0010) PixelData
            b'O', b'B', // VR
            0x00, 0x00, // reserved
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 12 -- Basic offset table
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x00, 0x00, 0x00, 0x00, // item length: 0
            // -- 20 -- First fragment
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x04, 0x00, 0x00, 0x00, // item length: 4
            0x99, 0x88, 0x77, 0x66,
            // -- 32 -- End of pixel data
            0xfe, 0xff, 0xdd, 0xe0, // sequence end tag
            0x00, 0x00, 0x00, 0x00,
        ];

        let ground_truth = vec![
            DataToken::PixelSequenceStart { vr: VR::OB },
            DataToken::ItemStart { len: Length(0) },
            DataToken::OffsetTable(vec![]),
            DataToken::ItemEnd,
            DataToken::ItemStart { len: Length(4) },
            DataToken::ItemValue(vec![0x99, 0x88, 0x77, 0x66]),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];

        validate_dataset_reader_explicit_vr(DATA, ground_truth);
    }

    #[test]
    fn offset_table_not_made_of_whole_offsets() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xe0, 0x7f, 0x10, 0x00, // (7FE0,0010) PixelData
            b'O', b'B', // VR
            0x00, 0x00, // reserved
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 12 -- Basic offset table
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0x06, 0x00, 0x00, 0x00, // item length: 6
            0x00, 0x00, 0x00, 0x00,
            0x0c, 0x00,
            // -- 26 -- End of pixel data
            0xfe, 0xff, 0xdd, 0xe0, // sequence end tag
            0x00, 0x00, 0x00, 0x00,
        ];
        let parser = StatefulDecoder::new(
            DATA,
            ExplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );
        let reader = DataSetReader::new(parser, Default::default());
        let err = reader
            .filter_map(|token| token.err())
            .next()
            .expect("should fail");
        assert_eq!(err.kind(), ErrorKind::CorruptedOffsetTable);
    }

    /// Build `levels` nested sequences of undefined length, each with one item.
    fn nested_sequences(levels: usize) -> Vec<u8> {
        let mut data = Vec::new();
        for _ in 0..levels {
            // (0040,A730) ContentSequence, SQ, undefined length
            data.extend_from_slice(&[0x40, 0x00, 0x30, 0xA7, b'S', b'Q', 0, 0]);
            data.extend_from_slice(&[0xFF; 4]);
            // item of undefined length
            data.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF]);
        }
        for _ in 0..levels {
            data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0, 0, 0, 0]);
            data.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0, 0, 0, 0]);
        }
        data
    }

    #[test]
    fn depth_limit_is_enforced() {
        let data = nested_sequences(3);

        let parser = StatefulDecoder::new(
            &data[..],
            ExplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );
        let reader = DataSetReader::new(parser, DataSetReaderOptions::default().max_depth(3));
        let tokens: Result<Vec<_>, _> = reader.collect();
        assert_eq!(tokens.unwrap().len(), 12);

        let parser = StatefulDecoder::new(
            &data[..],
            ExplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );
        let mut reader = DataSetReader::new(parser, DataSetReaderOptions::default().max_depth(2));
        let err = reader
            .by_ref()
            .find_map(|token| token.err())
            .expect("depth limit should be reached");
        assert_eq!(err.kind(), ErrorKind::DepthLimitReached);
        // the reader is fused after an error
        assert!(reader.next().is_none());
    }

    #[test]
    fn inconsistent_sequence_length() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x18, 0x00, 0x11, 0x60, b'S', b'Q', 0x00, 0x00,
            0x08, 0x00, 0x00, 0x00, // length: 8, but the item takes 18
            0xfe, 0xff, 0x00, 0xe0,
            0x0a, 0x00, 0x00, 0x00, // item length: 10
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x01, 0x00,
        ];
        let parser = StatefulDecoder::new(
            DATA,
            ExplicitVRLittleEndianDecoder::default(),
            Endianness::Little,
        );
        let reader = DataSetReader::new(parser, Default::default());
        let err = reader
            .filter_map(|token| token.err())
            .next()
            .expect("should fail");
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    }
}
