//! Module containing data structures and readers of DICOM file meta information tables.
use crate::file::ReadPreamble;
use crate::tokens::{DataSetTokens, SequenceLength};
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmio_core::buffer::BufferError;
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::{DataElementHeader, DataSet, ElementBuffer, Length, Tag, VR};
use dcmio_dictionary_std::tags;
use dcmio_parser::dataset::{write as dataset_write, DataSetWriter};
use dcmio_parser::stateful::decode::{self, FileHeaderParser, StatefulDecode};
use dcmio_parser::stateful::encode::FileHeaderEncoder;
use dcmio_transfer_syntax_registry::entries::uids;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::io::{Read, Write};

const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

/// Size of the file preamble.
pub const PREAMBLE_LEN: usize = 128;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The 128-byte preamble could not be read from the source.
    #[snafu(display("Could not read the file preamble"))]
    ReadPreambleBytes {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The file meta group parser could not read
    /// the magic code `DICM` from its source.
    #[snafu(display("Could not start reading DICOM data"))]
    ReadMagicCode {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Invalid DICOM data, detected from checking the `DICM` code.
    #[snafu(display("Invalid DICOM data: magic code not found"))]
    NotDicom { backtrace: Backtrace },

    /// An issue occurred while decoding the next data element
    /// in the file meta data set.
    #[snafu(display("Could not decode data element"))]
    DecodeElement {
        #[snafu(backtrace)]
        source: decode::Error,
    },

    /// The file meta group parser could not fetch
    /// the value of a data element from its source.
    #[snafu(display("Could not read value of data element tagged {}", tag))]
    ReadValueData {
        tag: Tag,
        #[snafu(backtrace)]
        source: decode::Error,
    },

    /// The file meta group parser could not decode
    /// the text in one of its data elements.
    #[snafu(display("Could not decode text in {}", tag))]
    DecodeText { tag: Tag, source: BufferError },

    /// A data element with an unexpected tag was retrieved:
    /// the parser was expecting another tag first,
    /// or at least one that is part of the the file meta group.
    #[snafu(display("Unexpected data element tagged {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },

    /// A required file meta data element is missing.
    #[snafu(display("Missing data element `{}`", alias))]
    MissingElement {
        alias: &'static str,
        backtrace: Backtrace,
    },

    /// The value length of a data elements in the file meta group
    /// was unexpected.
    #[snafu(display("Unexpected length {} for data element tagged {}", length, tag))]
    UnexpectedDataValueLength {
        tag: Tag,
        length: Length,
        backtrace: Backtrace,
    },

    /// The value length of a data element is undefined,
    /// but knowing the length is required in its context.
    #[snafu(display("Undefined value length for data element tagged {}", tag))]
    UndefinedValueLength { tag: Tag, backtrace: Backtrace },

    /// The file meta group data set could not be written.
    #[snafu(display("Could not write file meta group data set"))]
    WriteSet {
        #[snafu(backtrace)]
        source: dataset_write::Error,
    },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::ReadPreambleBytes { source, .. } | Error::ReadMagicCode { source, .. } => {
                if source.kind() == std::io::ErrorKind::UnexpectedEof {
                    ErrorKind::EndOfStream
                } else {
                    ErrorKind::Read
                }
            }
            Error::DecodeElement { source } | Error::ReadValueData { source, .. } => source.kind(),
            Error::DecodeText { source, .. } => source.kind(),
            Error::WriteSet { source } => source.kind(),
            Error::NotDicom { .. }
            | Error::UnexpectedTag { .. }
            | Error::MissingElement { .. }
            | Error::UnexpectedDataValueLength { .. }
            | Error::UndefinedValueLength { .. } => ErrorKind::CorruptedFile,
        }
    }
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// DICOM File Meta Information Table.
///
/// This data type contains the relevant parts of the file meta information table, as
/// specified in [1].
/// Text values are held without their trailing padding.
///
/// [1]: http://dicom.nema.org/medical/dicom/current/output/chtml/part06/chapter_7.html
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaTable {
    /// File Meta Information Group Length
    pub information_group_length: u32,
    /// File Meta Information Version
    pub information_version: [u8; 2],
    /// Media Storage SOP Class UID
    pub media_storage_sop_class_uid: String,
    /// Media Storage SOP Instance UID
    pub media_storage_sop_instance_uid: String,
    /// Transfer Syntax UID
    pub transfer_syntax: String,
    /// Implementation Class UID
    pub implementation_class_uid: String,

    /// Implementation Version Name
    pub implementation_version_name: Option<String>,
    /// Source Application Entity Title
    pub source_application_entity_title: Option<String>,
    /// Sending Application Entity Title
    pub sending_application_entity_title: Option<String>,
    /// Receiving Application Entity Title
    pub receiving_application_entity_title: Option<String>,
    /// Private Information Creator UID
    pub private_information_creator_uid: Option<String>,
    /// Private Information
    pub private_information: Option<Vec<u8>>,
}

/// Read the value of a text element of the file meta group.
fn read_text(header: &DataElementHeader, value: Vec<u8>) -> Result<String> {
    ElementBuffer::new(header.tag, header.vr, value)
        .string()
        .map(str::to_string)
        .context(DecodeTextSnafu { tag: header.tag })
}

/// Where the data of a DICOM source begins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum FileStart {
    /// The file meta group begins at this offset,
    /// right after the magic code if there is one.
    MetaGroup(u64),
    /// There is no file meta group:
    /// the main data set begins right away, in the given transfer syntax.
    DataSet(&'static str),
}

/// Length of the head of a source inspected by [`read_file_start`].
const HEAD_LEN: usize = PREAMBLE_LEN + 4;

/// Read the head of a source and find where its data begins.
///
/// The preamble and magic code are consumed according to `option`.
/// In [`ReadPreamble::Auto`] mode, a source with no magic code
/// is accepted if it starts with a group 0002 or 0008 data element,
/// in which case its encoding is guessed from that element.
///
/// Returns the bytes read beyond the preamble and magic code
/// alongside the start position.
pub(crate) fn read_file_start<R: Read>(
    file: &mut R,
    option: ReadPreamble,
) -> Result<(FileStart, Vec<u8>)> {
    let mut head = Vec::with_capacity(HEAD_LEN);
    (&mut *file)
        .take(HEAD_LEN as u64)
        .read_to_end(&mut head)
        .context(ReadMagicCodeSnafu)?;
    if option == ReadPreamble::Always && head.len() < HEAD_LEN {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
            .context(ReadPreambleBytesSnafu);
    }
    if head.len() < 4 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
            .context(ReadMagicCodeSnafu);
    }

    let magic_at = |offset: usize| head.get(offset..offset + 4) == Some(&DICM_MAGIC_CODE[..]);
    let start = match option {
        ReadPreamble::Never => {
            ensure!(magic_at(0), NotDicomSnafu);
            FileStart::MetaGroup(4)
        }
        ReadPreamble::Always => {
            ensure!(magic_at(PREAMBLE_LEN), NotDicomSnafu);
            FileStart::MetaGroup(HEAD_LEN as u64)
        }
        ReadPreamble::Auto if magic_at(0) => FileStart::MetaGroup(4),
        ReadPreamble::Auto if magic_at(PREAMBLE_LEN) => FileStart::MetaGroup(HEAD_LEN as u64),
        ReadPreamble::Auto => guess_file_start(&head).context(NotDicomSnafu)?,
    };
    let rest = match start {
        FileStart::MetaGroup(offset) => head.split_off(offset as usize),
        FileStart::DataSet(_) => head,
    };
    Ok((start, rest))
}

/// Guess how a source without magic code is encoded
/// from the header of its first data element.
fn guess_file_start(head: &[u8]) -> Option<FileStart> {
    let header = head.get(..8)?;
    let (group, big_endian) = match *header {
        [g @ (0x02 | 0x08), 0x00, _, 0x00, ..] => (g, false),
        [0x00, g @ (0x02 | 0x08), 0x00, _, ..] => (g, true),
        _ => return None,
    };
    let explicit_vr = VR::from_binary([header[4], header[5]]).is_some();

    if group == 0x02 {
        // the file meta group is always explicit VR little endian
        return (explicit_vr && !big_endian).then_some(FileStart::MetaGroup(0));
    }
    let uid = match (explicit_vr, big_endian) {
        (false, false) => uids::IMPLICIT_VR_LITTLE_ENDIAN,
        (true, false) => uids::EXPLICIT_VR_LITTLE_ENDIAN,
        (true, true) => uids::EXPLICIT_VR_BIG_ENDIAN,
        (false, true) => return None,
    };
    Some(FileStart::DataSet(uid))
}

impl FileMetaTable {
    /// Read the magic code `DICM` followed by the file meta group.
    pub fn from_reader<R: Read>(mut file: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic).context(ReadMagicCodeSnafu)?;
        ensure!(magic == DICM_MAGIC_CODE, NotDicomSnafu);
        FileMetaTable::read_group(file, 4)
    }

    /// Make up the file meta table of a data set read without one,
    /// taking the SOP class and instance UIDs from the data set.
    pub(crate) fn for_data_set(transfer_syntax: &str, obj: &DataSet) -> Result<Self> {
        let uid = |tag| obj.string(tag).map(str::to_string).unwrap_or_default();
        FileMetaTableBuilder::new()
            .transfer_syntax(transfer_syntax)
            .media_storage_sop_class_uid(uid(tags::SOP_CLASS_UID))
            .media_storage_sop_instance_uid(uid(tags::SOP_INSTANCE_UID))
            .build()
    }

    /// Read the file meta group alone.
    /// `position` is the number of bytes read from the source so far.
    pub(crate) fn read_group<S: Read>(file: S, position: u64) -> Result<Self> {
        let mut parser = FileHeaderParser::file_header_parser(file, position);

        let group_length: u32 = {
            let header = parser.decode_header().context(DecodeElementSnafu)?;
            ensure!(
                header.tag == tags::FILE_META_INFORMATION_GROUP_LENGTH,
                UnexpectedTagSnafu { tag: header.tag }
            );
            ensure!(
                header.len == Length(4),
                UnexpectedDataValueLengthSnafu {
                    tag: header.tag,
                    length: header.len,
                }
            );
            let value = parser
                .read_value_bytes(&header)
                .context(ReadValueDataSnafu { tag: header.tag })?;
            LittleEndian::read_u32(&value)
        };

        let start = parser.position();
        let mut builder = FileMetaTableBuilder::new().group_length(group_length);

        while parser.position() - start < u64::from(group_length) {
            let header = parser.decode_header().context(DecodeElementSnafu)?;
            ensure!(
                header.len.is_defined(),
                UndefinedValueLengthSnafu { tag: header.tag }
            );
            ensure!(
                header.tag.group() == 0x0002,
                UnexpectedTagSnafu { tag: header.tag }
            );
            let value = parser
                .read_value_bytes(&header)
                .context(ReadValueDataSnafu { tag: header.tag })?;

            builder = match header.tag {
                tags::FILE_META_INFORMATION_VERSION => {
                    ensure!(
                        value.len() == 2,
                        UnexpectedDataValueLengthSnafu {
                            tag: header.tag,
                            length: header.len,
                        }
                    );
                    builder.information_version([value[0], value[1]])
                }
                tags::MEDIA_STORAGE_SOP_CLASS_UID => {
                    builder.media_storage_sop_class_uid(read_text(&header, value)?)
                }
                tags::MEDIA_STORAGE_SOP_INSTANCE_UID => {
                    builder.media_storage_sop_instance_uid(read_text(&header, value)?)
                }
                tags::TRANSFER_SYNTAX_UID => builder.transfer_syntax(read_text(&header, value)?),
                tags::IMPLEMENTATION_CLASS_UID => {
                    builder.implementation_class_uid(read_text(&header, value)?)
                }
                tags::IMPLEMENTATION_VERSION_NAME => {
                    builder.implementation_version_name(read_text(&header, value)?)
                }
                tags::SOURCE_APPLICATION_ENTITY_TITLE => {
                    builder.source_application_entity_title(read_text(&header, value)?)
                }
                Tag(0x0002, 0x0017) => {
                    builder.sending_application_entity_title(read_text(&header, value)?)
                }
                Tag(0x0002, 0x0018) => {
                    builder.receiving_application_entity_title(read_text(&header, value)?)
                }
                tags::PRIVATE_INFORMATION_CREATOR_UID => {
                    builder.private_information_creator_uid(read_text(&header, value)?)
                }
                tags::PRIVATE_INFORMATION => builder.private_information(value),
                tag => {
                    tracing::debug!("Ignoring file meta element {} ({})", tag, header.vr);
                    builder
                }
            }
        }

        builder.build()
    }

    /// The transfer syntax UID, without padding.
    pub fn transfer_syntax(&self) -> &str {
        trim_uid(&self.transfer_syntax)
    }

    /// Collect the elements of the file meta group,
    /// starting with a group length recomputed from the other elements.
    pub fn to_element_iter(&self) -> impl Iterator<Item = ElementBuffer> {
        let elems = self.elements_without_length();
        let group_length = group_length_of(&elems);
        std::iter::once(ElementBuffer::from_u32s(
            tags::FILE_META_INFORMATION_GROUP_LENGTH,
            VR::UL,
            &[group_length],
        ))
        .chain(elems)
    }

    /// Recompute the group length from the current values of the table.
    pub fn update_information_group_length(&mut self) {
        self.information_group_length = group_length_of(&self.elements_without_length());
    }

    fn elements_without_length(&self) -> Vec<ElementBuffer> {
        let mut elems = vec![
            ElementBuffer::new(
                tags::FILE_META_INFORMATION_VERSION,
                VR::OB,
                self.information_version.to_vec(),
            ),
            ElementBuffer::from_strs(
                tags::MEDIA_STORAGE_SOP_CLASS_UID,
                VR::UI,
                &[&self.media_storage_sop_class_uid],
            ),
            ElementBuffer::from_strs(
                tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
                VR::UI,
                &[&self.media_storage_sop_instance_uid],
            ),
            ElementBuffer::from_strs(tags::TRANSFER_SYNTAX_UID, VR::UI, &[&self.transfer_syntax]),
            ElementBuffer::from_strs(
                tags::IMPLEMENTATION_CLASS_UID,
                VR::UI,
                &[&self.implementation_class_uid],
            ),
        ];
        let optional = [
            (
                tags::IMPLEMENTATION_VERSION_NAME,
                VR::SH,
                &self.implementation_version_name,
            ),
            (
                tags::SOURCE_APPLICATION_ENTITY_TITLE,
                VR::AE,
                &self.source_application_entity_title,
            ),
            (
                Tag(0x0002, 0x0017),
                VR::AE,
                &self.sending_application_entity_title,
            ),
            (
                Tag(0x0002, 0x0018),
                VR::AE,
                &self.receiving_application_entity_title,
            ),
            (
                tags::PRIVATE_INFORMATION_CREATOR_UID,
                VR::UI,
                &self.private_information_creator_uid,
            ),
        ];
        for (tag, vr, value) in optional {
            if let Some(v) = value {
                elems.push(ElementBuffer::from_strs(tag, vr, &[v]));
            }
        }
        if let Some(v) = &self.private_information {
            elems.push(ElementBuffer::new(
                tags::PRIVATE_INFORMATION,
                VR::OB,
                v.clone(),
            ));
        }
        elems
    }

    /// Write the file meta group, with a recomputed group length,
    /// in _Explicit VR Little Endian_.
    /// The preamble and magic code are not included.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let meta: DataSet = self.to_element_iter().collect();
        let mut dset = DataSetWriter::new(FileHeaderEncoder::file_header_encoder(writer));
        dset.write_sequence(DataSetTokens::new(&meta, SequenceLength::Undefined, true))
            .context(WriteSetSnafu)?;
        dset.flush().context(WriteSetSnafu)
    }
}

/// The encoded size of the given group elements in explicit VR.
fn group_length_of(elems: &[ElementBuffer]) -> u32 {
    elems
        .iter()
        .map(|e| e.vr().info().header_len(true) + e.len() as u32)
        .sum()
}

fn trim_uid(uid: &str) -> &str {
    uid.trim_end_matches(|c: char| c == '\0' || c == ' ')
}

/// A builder for DICOM meta information tables.
#[derive(Debug, Default, Clone)]
pub struct FileMetaTableBuilder {
    /// File Meta Information Group Length (UL)
    information_group_length: Option<u32>,
    /// File Meta Information Version (OB)
    information_version: Option<[u8; 2]>,
    /// Media Storage SOP Class UID (UI)
    pub(crate) media_storage_sop_class_uid: Option<String>,
    /// Media Storage SOP Instance UID (UI)
    pub(crate) media_storage_sop_instance_uid: Option<String>,
    /// Transfer Syntax UID (UI)
    transfer_syntax: Option<String>,
    /// Implementation Class UID (UI)
    implementation_class_uid: Option<String>,

    /// Implementation Version Name (SH)
    implementation_version_name: Option<String>,
    /// Source Application Entity Title (AE)
    source_application_entity_title: Option<String>,
    /// Sending Application Entity Title (AE)
    sending_application_entity_title: Option<String>,
    /// Receiving Application Entity Title (AE)
    receiving_application_entity_title: Option<String>,
    /// Private Information Creator UID (UI)
    private_information_creator_uid: Option<String>,
    /// Private Information (OB)
    private_information: Option<Vec<u8>>,
}

/// Strip the padding of a UID.
fn uid<T: Into<String>>(value: T) -> String {
    let mut s = value.into();
    s.truncate(trim_uid(&s).len());
    s
}

impl FileMetaTableBuilder {
    /// Create a new, empty builder.
    pub fn new() -> FileMetaTableBuilder {
        FileMetaTableBuilder::default()
    }

    /// Define the meta information group length.
    pub fn group_length(mut self, value: u32) -> FileMetaTableBuilder {
        self.information_group_length = Some(value);
        self
    }

    /// Define the meta information version.
    pub fn information_version(mut self, value: [u8; 2]) -> FileMetaTableBuilder {
        self.information_version = Some(value);
        self
    }

    /// Define the media storage SOP class UID.
    pub fn media_storage_sop_class_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.media_storage_sop_class_uid = Some(uid(value));
        self
    }

    /// Define the media storage SOP instance UID.
    pub fn media_storage_sop_instance_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.media_storage_sop_instance_uid = Some(uid(value));
        self
    }

    /// Define the transfer syntax UID.
    pub fn transfer_syntax<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.transfer_syntax = Some(uid(value));
        self
    }

    /// Define the implementation class UID.
    pub fn implementation_class_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.implementation_class_uid = Some(uid(value));
        self
    }

    /// Define the implementation version name.
    pub fn implementation_version_name<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.implementation_version_name = Some(value.into());
        self
    }

    /// Define the source application entity title.
    pub fn source_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.source_application_entity_title = Some(value.into());
        self
    }

    /// Define the sending application entity title.
    pub fn sending_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.sending_application_entity_title = Some(value.into());
        self
    }

    /// Define the receiving application entity title.
    pub fn receiving_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.receiving_application_entity_title = Some(value.into());
        self
    }

    /// Define the private information creator UID.
    pub fn private_information_creator_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.private_information_creator_uid = Some(uid(value));
        self
    }

    /// Define the private information as a vector of bytes.
    pub fn private_information<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<Vec<u8>>,
    {
        self.private_information = Some(value.into());
        self
    }

    /// Build the table.
    ///
    /// The implementation class UID defaults to the one of this library.
    /// Without an explicit group length, it is computed from the other elements.
    pub fn build(self) -> Result<FileMetaTable> {
        // a missing information version is assumed to be (00H, 01H)
        let information_version = self.information_version.unwrap_or([0, 1]);
        let media_storage_sop_class_uid =
            self.media_storage_sop_class_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPClassUID",
                })?;
        let media_storage_sop_instance_uid =
            self.media_storage_sop_instance_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPInstanceUID",
                })?;
        let transfer_syntax = self.transfer_syntax.context(MissingElementSnafu {
            alias: "TransferSyntax",
        })?;
        let implementation_class_uid = self
            .implementation_class_uid
            .unwrap_or_else(|| crate::IMPLEMENTATION_CLASS_UID.to_string());

        let mut table = FileMetaTable {
            information_group_length: 0,
            information_version,
            media_storage_sop_class_uid,
            media_storage_sop_instance_uid,
            transfer_syntax,
            implementation_class_uid,
            implementation_version_name: self.implementation_version_name,
            source_application_entity_title: self.source_application_entity_title,
            sending_application_entity_title: self.sending_application_entity_title,
            receiving_application_entity_title: self.receiving_application_entity_title,
            private_information_creator_uid: self.private_information_creator_uid,
            private_information: self.private_information,
        };
        match self.information_group_length {
            Some(len) => table.information_group_length = len,
            None => table.update_information_group_length(),
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::{read_file_start, FileMetaTable, FileMetaTableBuilder, FileStart};
    use crate::file::ReadPreamble;
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_transfer_syntax_registry::entries::uids;
    use rstest::rstest;

    #[rustfmt::skip]
    const TEST_META_1: &[u8] = &[
        // magic code
        b'D', b'I', b'C', b'M',
        // File Meta Information Group Length: (0000,0002) ; UL ; 4 ; 200
        0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00, 0xc8, 0x00, 0x00, 0x00,
        // File Meta Information Version: (0002, 0001) ; OB ; 2 ; [0x00, 0x01]
        0x02, 0x00, 0x01, 0x00, b'O', b'B', 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01,
        // Media Storage SOP Class UID (0002, 0002) ; UI ; 26 ; "1.2.840.10008.5.1.4.1.1.1\0" (ComputedRadiographyImageStorage)
        0x02, 0x00, 0x02, 0x00, b'U', b'I', 0x1a, 0x00, 0x31, 0x2e, 0x32, 0x2e, 0x38, 0x34, 0x30,
        0x2e, 0x31, 0x30, 0x30, 0x30, 0x38, 0x2e, 0x35, 0x2e, 0x31, 0x2e, 0x34, 0x2e, 0x31, 0x2e,
        0x31, 0x2e, 0x31, 0x00,
        // Media Storage SOP Instance UID (0002, 0003) ; UI ; 56 ; "1.2.3.4.5.12345678.1234567890.1234567.123456789.1234567\0"
        0x02, 0x00, 0x03, 0x00, b'U', b'I', 0x38, 0x00, 0x31, 0x2e, 0x32, 0x2e, 0x33, 0x2e, 0x34,
        0x2e, 0x35, 0x2e, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x2e, 0x31, 0x32, 0x33,
        0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x30, 0x2e, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
        0x2e, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x2e, 0x31, 0x32, 0x33, 0x34,
        0x35, 0x36, 0x37, 0x00,
        // Transfer Syntax UID (0002, 0010) ; UI ; 20 ; "1.2.840.10008.1.2.1\0" (LittleEndianExplicit)
        0x02, 0x00, 0x10, 0x00, b'U', b'I', 0x14, 0x00, 0x31, 0x2e, 0x32, 0x2e, 0x38, 0x34, 0x30,
        0x2e, 0x31, 0x30, 0x30, 0x30, 0x38, 0x2e, 0x31, 0x2e, 0x32, 0x2e, 0x31, 0x00,
        // Implementation Class UID (0002, 0012) ; UI ; 20 ; "1.2.345.6.7890.1.234"
        0x02, 0x00, 0x12, 0x00, b'U', b'I', 0x14, 0x00, 0x31, 0x2e, 0x32, 0x2e, 0x33, 0x34, 0x35,
        0x2e, 0x36, 0x2e, 0x37, 0x38, 0x39, 0x30, 0x2e, 0x31, 0x2e, 0x32, 0x33, 0x34,
        // optional elements:

        // Implementation Version Name (0002,0013) ; SH ; "DCMIO_TEST_0001"
        0x02, 0x00, 0x13, 0x00, b'S', b'H', 0x10, 0x00, b'D', b'C', b'M', b'I', b'O', b'_', b'T',
        b'E', b'S', b'T', b'_', b'0', b'0', b'0', b'1', 0x20,
        // Source Application Entity Title (0002, 0016) ; AE ; 0 (no data)
        0x02, 0x00, 0x16, 0x00, b'A', b'E', 0x00, 0x00,
    ];

    fn ground_truth() -> FileMetaTable {
        FileMetaTable {
            information_group_length: 200,
            information_version: [0u8, 1u8],
            media_storage_sop_class_uid: "1.2.840.10008.5.1.4.1.1.1".to_owned(),
            media_storage_sop_instance_uid:
                "1.2.3.4.5.12345678.1234567890.1234567.123456789.1234567".to_owned(),
            transfer_syntax: "1.2.840.10008.1.2.1".to_owned(),
            implementation_class_uid: "1.2.345.6.7890.1.234".to_owned(),
            implementation_version_name: Some("DCMIO_TEST_0001".to_owned()),
            source_application_entity_title: Some("".to_owned()),
            sending_application_entity_title: None,
            receiving_application_entity_title: None,
            private_information_creator_uid: None,
            private_information: None,
        }
    }

    #[test]
    fn read_meta_table_from_reader() {
        let mut source = TEST_META_1;

        let table = FileMetaTable::from_reader(&mut source).unwrap();

        assert_eq!(table.information_group_length, 200);
        assert_eq!(table.transfer_syntax(), "1.2.840.10008.1.2.1");
        assert_eq!(table, ground_truth());
        // the whole group was consumed
        assert!(source.is_empty());
    }

    #[test]
    fn create_meta_table_with_builder() {
        let table = FileMetaTableBuilder::new()
            .information_version([0, 1])
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.1")
            .media_storage_sop_instance_uid(
                "1.2.3.4.5.12345678.1234567890.1234567.123456789.1234567\0",
            )
            .transfer_syntax("1.2.840.10008.1.2.1")
            .implementation_class_uid("1.2.345.6.7890.1.234")
            .implementation_version_name("DCMIO_TEST_0001")
            .source_application_entity_title("")
            .build()
            .unwrap();

        assert_eq!(table, ground_truth());
    }

    #[test]
    fn write_meta_table_recomputes_group_length() {
        let mut table = ground_truth();
        table.information_group_length = 0;

        let mut out = Vec::new();
        table.write(&mut out).unwrap();
        assert_eq!(out, &TEST_META_1[4..]);
    }

    #[test]
    fn builder_requires_transfer_syntax() {
        let err = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .media_storage_sop_instance_uid("2.25.1")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    }

    #[test]
    fn preamble_detection() {
        let mut with_preamble = vec![0u8; 128];
        with_preamble.extend_from_slice(TEST_META_1);

        let mut source = &with_preamble[..];
        let (start, rest) = read_file_start(&mut source, ReadPreamble::Auto).unwrap();
        assert_eq!(start, FileStart::MetaGroup(132));
        assert_eq!(rest, &TEST_META_1[4..132]);

        let mut source = TEST_META_1;
        let (start, rest) = read_file_start(&mut source, ReadPreamble::Auto).unwrap();
        assert_eq!(start, FileStart::MetaGroup(4));
        assert_eq!(rest.len(), 128);

        let mut source = TEST_META_1;
        let err = read_file_start(&mut source, ReadPreamble::Always).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);

        let mut source = &with_preamble[..];
        let err = read_file_start(&mut source, ReadPreamble::Never).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);

        let mut source: &[u8] = b"DI";
        let err = read_file_start(&mut source, ReadPreamble::Auto).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndOfStream);
    }

    #[rstest]
    // (0008,0016) implicit VR, length 26
    #[case(&[0x08, 0x00, 0x16, 0x00, 0x1a, 0x00, 0x00, 0x00], Some(FileStart::DataSet(uids::IMPLICIT_VR_LITTLE_ENDIAN)))]
    // (0008,0016) UI, length 26
    #[case(&[0x08, 0x00, 0x16, 0x00, b'U', b'I', 0x1a, 0x00], Some(FileStart::DataSet(uids::EXPLICIT_VR_LITTLE_ENDIAN)))]
    // (0008,0016) UI, length 26, big endian
    #[case(&[0x00, 0x08, 0x00, 0x16, b'U', b'I', 0x00, 0x1a], Some(FileStart::DataSet(uids::EXPLICIT_VR_BIG_ENDIAN)))]
    // (0002,0000) UL, length 4
    #[case(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00], Some(FileStart::MetaGroup(0)))]
    // (0010,0010) is not accepted at the start
    #[case(&[0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x08, 0x00], None)]
    // implicit VR big endian is not a thing
    #[case(&[0x00, 0x08, 0x00, 0x16, 0x00, 0x00, 0x00, 0x1a], None)]
    fn data_without_magic_code(#[case] first_header: &[u8], #[case] expected: Option<FileStart>) {
        let mut head = first_header.to_vec();
        head.extend_from_slice(&[0; 26]);

        let mut source = &head[..];
        match (read_file_start(&mut source, ReadPreamble::Auto), expected) {
            (Ok((start, rest)), Some(expected)) => {
                assert_eq!(start, expected);
                assert_eq!(rest, head);
            }
            (Err(e), None) => assert_eq!(e.kind(), ErrorKind::CorruptedFile),
            (got, expected) => panic!("got {:?}, expected {:?}", got, expected),
        }

        // only the automatic mode looks for data without magic code
        let mut source = &head[..];
        assert!(read_file_start(&mut source, ReadPreamble::Never).is_err());
    }
}
