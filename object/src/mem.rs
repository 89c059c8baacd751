//! This module builds in-memory data sets from data set token streams,
//! and contains the reading procedure of whole DICOM files.

use smallvec::SmallVec;
use snafu::{ensure, OptionExt, ResultExt};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

use crate::file::OpenFileOptions;
use crate::meta::{self, FileMetaTable, FileStart};
use crate::tokens::{DataSetTokens, SequenceLength};
use crate::{
    CreateParserSnafu, CreatePrinterSnafu, FileDicomObject, MissingElementValueSnafu,
    OpenFileSnafu, ParseMetaDataSetSnafu, PrematureEndSnafu, PrintDataSetSnafu, ReadError,
    ReadTokenSnafu, ReadUnsupportedTransferSyntaxSnafu, UnexpectedTokenSnafu, WriteError,
};
use dcmio_core::charset::SpecificCharacterSet;
use dcmio_core::{DataSet, ElementBuffer, PixelFragments, Tag, VR};
use dcmio_dictionary_std::tags;
use dcmio_encoding::transfer_syntax::TransferSyntaxIndex;
use dcmio_encoding::TransferSyntax;
use dcmio_parser::dataset::{
    read::Error as ParserError, DataSetReader, DataSetReaderOptions, DataSetWriter, DataToken,
};

type ParserResult<T> = std::result::Result<T, ParserError>;

/// Size of the file meta group length element, which is not counted
/// in the group length itself.
const GROUP_LENGTH_ELEMENT_LEN: u64 = 12;

/// Read a data set encoded in the given transfer syntax,
/// without preamble or file meta group, until the end of the source.
pub fn read_data_set<R>(
    from: R,
    ts: &TransferSyntax,
    options: DataSetReaderOptions,
) -> Result<DataSet, ReadError>
where
    R: Read,
{
    let mut dataset =
        DataSetReader::new_with_ts_options(from, ts, options).context(CreateParserSnafu)?;
    build_data_set(&mut dataset, false, None, SpecificCharacterSet::default())
}

/// Write a data set in the given transfer syntax,
/// without preamble or file meta group.
pub fn write_data_set<W>(
    to: W,
    obj: &DataSet,
    ts: &TransferSyntax,
    sequence_length: SequenceLength,
) -> Result<(), WriteError>
where
    W: Write,
{
    let mut dset_writer = DataSetWriter::with_ts(to, ts).context(CreatePrinterSnafu)?;
    dset_writer
        .write_sequence(DataSetTokens::new(
            obj,
            sequence_length,
            ts.is_explicit_vr(),
        ))
        .context(PrintDataSetSnafu)?;
    dset_writer.flush().context(PrintDataSetSnafu)
}

pub(crate) fn open_file_with_options<T>(
    path: &Path,
    options: OpenFileOptions<T>,
) -> Result<FileDicomObject, ReadError>
where
    T: TransferSyntaxIndex,
{
    let file = File::open(path).context(OpenFileSnafu { filename: path })?;
    from_reader_with_options(file, options)
}

pub(crate) fn from_reader_with_options<R, T>(
    src: R,
    options: OpenFileOptions<T>,
) -> Result<FileDicomObject, ReadError>
where
    R: Read,
    T: TransferSyntaxIndex,
{
    let mut src = BufReader::new(src);
    let (start, head) =
        meta::read_file_start(&mut src, options.read_preamble).context(ParseMetaDataSetSnafu)?;
    let mut file = Cursor::new(head).chain(src);

    // read metadata header
    let (meta, ts_uid, position) = match start {
        FileStart::MetaGroup(offset) => {
            let meta =
                FileMetaTable::read_group(&mut file, offset).context(ParseMetaDataSetSnafu)?;
            let position =
                offset + GROUP_LENGTH_ELEMENT_LEN + u64::from(meta.information_group_length);
            let ts_uid = meta.transfer_syntax().to_string();
            (Some(meta), ts_uid, position)
        }
        FileStart::DataSet(uid) => {
            tracing::warn!("No file meta group found, reading data set as {}", uid);
            (None, uid.to_string(), 0)
        }
    };

    let ts = resolve_transfer_syntax(
        &options.ts_index,
        &ts_uid,
        options.strict_transfer_syntax,
    )?;
    ensure!(
        !ts.unsupported(),
        ReadUnsupportedTransferSyntaxSnafu { uid: ts.uid() }
    );

    // read rest of data according to metadata, feed it to object
    let reader_options = DataSetReaderOptions::default()
        .max_depth(options.max_depth)
        .base_offset(position);
    let mut dataset =
        DataSetReader::new_with_ts_options(file, &ts, reader_options).context(CreateParserSnafu)?;
    let obj = build_data_set(
        &mut dataset,
        false,
        options.read_until,
        SpecificCharacterSet::default(),
    )?;
    let meta = match meta {
        Some(meta) => meta,
        None => FileMetaTable::for_data_set(&ts_uid, &obj).context(ParseMetaDataSetSnafu)?,
    };
    Ok(FileDicomObject::new(meta, obj))
}

/// Find the transfer syntax of a file.
///
/// Unless `strict`, UIDs absent from the index are read
/// as explicit VR little endian with encapsulated pixel data.
fn resolve_transfer_syntax<T>(
    index: &T,
    uid: &str,
    strict: bool,
) -> Result<TransferSyntax, ReadError>
where
    T: TransferSyntaxIndex,
{
    match index.get(uid) {
        Some(ts) => Ok(ts),
        None if strict => ReadUnsupportedTransferSyntaxSnafu { uid }.fail(),
        None => {
            tracing::warn!(
                "Unknown transfer syntax `{}`, reading as explicit VR little endian",
                uid
            );
            Ok(TransferSyntax::unknown_encapsulated(uid))
        }
    }
}

/// Build a data set by consuming a data set parser.
///
/// Text elements are decoded with the last _Specific Character Set_ seen,
/// starting with `charset`.
pub(crate) fn build_data_set<I>(
    dataset: &mut I,
    in_item: bool,
    read_until: Option<Tag>,
    mut charset: SpecificCharacterSet,
) -> Result<DataSet, ReadError>
where
    I: ?Sized + Iterator<Item = ParserResult<DataToken>>,
{
    let mut obj = DataSet::new();
    // perform a structured parsing of incoming tokens
    while let Some(token) = dataset.next() {
        match token.context(ReadTokenSnafu)? {
            DataToken::PixelSequenceStart { vr } => {
                // stop reading if reached `read_until` tag
                if read_until.map(|t| t <= tags::PIXEL_DATA).unwrap_or(false) {
                    break;
                }
                let fragments = build_encapsulated_data(&mut *dataset, vr)?;
                obj.put_fragments(tags::PIXEL_DATA, fragments);
            }
            DataToken::ElementHeader(header) => {
                // stop reading if reached `read_until` tag
                if read_until.map(|t| t <= header.tag).unwrap_or(false) {
                    break;
                }

                // fetch respective value, place it in the entries
                let next_token = dataset.next().context(MissingElementValueSnafu)?;
                let value = match next_token.context(ReadTokenSnafu)? {
                    DataToken::PrimitiveValue(v) => v,
                    token => {
                        return UnexpectedTokenSnafu {
                            token: Box::new(token),
                        }
                        .fail();
                    }
                };
                let elem = ElementBuffer::new(header.tag, header.vr, value);
                if header.tag == tags::SPECIFIC_CHARACTER_SET {
                    charset = charset_of(&elem).unwrap_or(charset);
                }
                obj.put(elem.with_charset(charset));
            }
            DataToken::SequenceStart { tag, .. } => {
                // stop reading if reached `read_until` tag
                if read_until.map(|t| t <= tag).unwrap_or(false) {
                    break;
                }

                let items = build_sequence(&mut *dataset, charset)?;
                obj.put_sequence(tag, items);
            }
            DataToken::ItemEnd if in_item => {
                // end of item, leave now
                return Ok(obj);
            }
            token => {
                return UnexpectedTokenSnafu {
                    token: Box::new(token),
                }
                .fail()
            }
        }
    }

    ensure!(!in_item, PrematureEndSnafu);
    Ok(obj)
}

fn charset_of(elem: &ElementBuffer) -> Option<SpecificCharacterSet> {
    let codes = elem.strings().ok()?;
    // the first value is the default repertoire when code extensions are used
    let code = codes.iter().rev().find(|c| !c.is_empty()).map(String::as_str);
    let charset = SpecificCharacterSet::from_code(code.unwrap_or(""));
    if charset.is_none() {
        tracing::warn!("Unsupported character set {:?}, keeping the current one", codes);
    }
    charset
}

/// Build an encapsulated pixel data value by collecting
/// the offset table and all fragments.
fn build_encapsulated_data<I>(dataset: &mut I, vr: VR) -> Result<PixelFragments, ReadError>
where
    I: ?Sized + Iterator<Item = ParserResult<DataToken>>,
{
    let mut offset_table: Option<Vec<u32>> = None;
    let mut fragments: SmallVec<[Vec<u8>; 2]> = SmallVec::new();

    for token in dataset {
        match token.context(ReadTokenSnafu)? {
            DataToken::OffsetTable(table) => {
                offset_table = Some(table);
            }
            DataToken::ItemValue(data) => {
                fragments.push(data);
            }
            DataToken::ItemEnd => {
                // at the end of the first item ensure the presence of
                // an empty offset_table here, so that the next items
                // are seen as compressed fragments
                if offset_table.is_none() {
                    offset_table = Some(Vec::new())
                }
            }
            DataToken::ItemStart { .. } => { /* no-op */ }
            DataToken::SequenceEnd => {
                // end of pixel data
                return Ok(PixelFragments::new(
                    vr,
                    offset_table.unwrap_or_default(),
                    fragments,
                ));
            }
            // the following variants are unexpected
            token @ DataToken::ElementHeader(_)
            | token @ DataToken::PixelSequenceStart { .. }
            | token @ DataToken::SequenceStart { .. }
            | token @ DataToken::PrimitiveValue(_) => {
                return UnexpectedTokenSnafu {
                    token: Box::new(token),
                }
                .fail();
            }
        }
    }

    PrematureEndSnafu.fail()
}

/// Build the items of a sequence by consuming a data set parser.
fn build_sequence<I>(
    dataset: &mut I,
    charset: SpecificCharacterSet,
) -> Result<Vec<DataSet>, ReadError>
where
    I: ?Sized + Iterator<Item = ParserResult<DataToken>>,
{
    let mut items = Vec::new();
    while let Some(token) = dataset.next() {
        match token.context(ReadTokenSnafu)? {
            DataToken::ItemStart { .. } => {
                items.push(build_data_set(&mut *dataset, true, None, charset)?);
            }
            DataToken::SequenceEnd => {
                return Ok(items);
            }
            token => {
                return UnexpectedTokenSnafu {
                    token: Box::new(token),
                }
                .fail()
            }
        };
    }

    // iterator fully consumed without a sequence delimiter
    PrematureEndSnafu.fail()
}

#[cfg(test)]
mod tests {
    use super::{build_data_set, read_data_set, write_data_set, ParserError};
    use crate::tokens::SequenceLength;
    use dcmio_core::charset::SpecificCharacterSet;
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_core::{DataElementHeader, DataSet, ElementBuffer, Length, Tag, VR};
    use dcmio_dictionary_std::tags;
    use dcmio_parser::dataset::DataToken;
    use dcmio_parser::DataSetReaderOptions;
    use dcmio_transfer_syntax_registry::entries;

    fn header(tag: Tag, vr: VR, len: u32) -> DataToken {
        DataToken::ElementHeader(DataElementHeader::new(tag, vr, Length(len)))
    }

    #[test]
    fn build_data_set_with_nested_items() {
        let tokens = vec![
            header(tags::SPECIFIC_CHARACTER_SET, VR::CS, 10),
            DataToken::PrimitiveValue(b"ISO_IR 192".to_vec()),
            DataToken::SequenceStart {
                tag: Tag(0x0018, 0x6011),
                len: Length::UNDEFINED,
            },
            DataToken::ItemStart {
                len: Length::UNDEFINED,
            },
            header(Tag(0x0010, 0x0010), VR::PN, 6),
            DataToken::PrimitiveValue("Zoë^A".as_bytes().to_vec()),
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];
        let mut tokens = tokens.into_iter().map(Ok::<_, ParserError>);
        let obj = build_data_set(&mut tokens, false, None, SpecificCharacterSet::default())
            .unwrap();

        let items = obj.sequence(Tag(0x0018, 0x6011)).unwrap();
        assert_eq!(items.len(), 1);
        // the item inherits the character set of its parent
        assert_eq!(items[0].string(Tag(0x0010, 0x0010)).unwrap(), "Zoë^A");
        assert_eq!(obj.charset(), SpecificCharacterSet::IsoIr192);
    }

    #[test]
    fn build_data_set_until_tag() {
        let tokens = vec![
            header(tags::ROWS, VR::US, 2),
            DataToken::PrimitiveValue(vec![2, 0]),
            DataToken::PixelSequenceStart { vr: VR::OB },
            DataToken::ItemStart { len: Length(0) },
            DataToken::ItemEnd,
            DataToken::SequenceEnd,
        ];
        let mut tokens = tokens.into_iter().map(Ok::<_, ParserError>);
        let obj = build_data_set(
            &mut tokens,
            false,
            Some(tags::PIXEL_DATA),
            SpecificCharacterSet::default(),
        )
        .unwrap();
        assert_eq!(obj.len(), 1);
        assert!(!obj.contains(tags::PIXEL_DATA));
    }

    #[test]
    fn unterminated_item_is_premature_end() {
        let tokens = vec![
            DataToken::SequenceStart {
                tag: Tag(0x0018, 0x6011),
                len: Length::UNDEFINED,
            },
            DataToken::ItemStart {
                len: Length::UNDEFINED,
            },
            header(tags::ROWS, VR::US, 2),
            DataToken::PrimitiveValue(vec![2, 0]),
        ];
        let mut tokens = tokens.into_iter().map(Ok::<_, ParserError>);
        let err = build_data_set(&mut tokens, false, None, SpecificCharacterSet::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    }

    #[test]
    fn data_set_through_implicit_vr() {
        let mut obj = DataSet::new();
        obj.put(ElementBuffer::from_u16s(tags::ROWS, VR::US, &[512]));
        obj.put(ElementBuffer::from_strs(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            &["1.2.3.4"],
        ));
        let ts = entries::IMPLICIT_VR_LITTLE_ENDIAN;

        let mut out = Vec::new();
        write_data_set(&mut out, &obj, &ts, SequenceLength::Undefined).unwrap();
        // UI padded with a trailing null
        assert_eq!(out.len(), 8 + 8 + 8 + 2);
        assert_eq!(out[8 + 7], 0);

        let read = read_data_set(&out[..], &ts, DataSetReaderOptions::default()).unwrap();
        assert_eq!(read.uint(tags::ROWS).unwrap(), 512);
        assert_eq!(read.string(tags::SOP_INSTANCE_UID).unwrap(), "1.2.3.4");
        assert_eq!(read.element(tags::SOP_INSTANCE_UID).unwrap().vr(), VR::UI);
    }
}
