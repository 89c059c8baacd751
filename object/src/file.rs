use dcmio_core::Tag;
use dcmio_encoding::transfer_syntax::TransferSyntaxIndex;
use dcmio_parser::dataset::read::DEFAULT_MAX_DEPTH;
use dcmio_transfer_syntax_registry::{get_registry, TransferSyntaxRegistry};

use crate::tokens::SequenceLength;
use crate::{FileDicomObject, ReadError};
use std::io::Read;
use std::path::Path;

/// Create a DICOM object by reading from a byte source.
///
/// The preamble is detected automatically:
/// the source may start with either the preamble or the magic code.
/// A source with neither is read if it starts with a data element
/// of group 0002 or 0008, guessing its transfer syntax from that element.
pub fn from_reader<F>(file: F) -> Result<FileDicomObject, ReadError>
where
    F: Read,
{
    OpenFileOptions::new().from_reader(file)
}

/// Create a DICOM object by reading from a file.
///
/// The 128-byte preamble is detected automatically.
pub fn open_file<P>(path: P) -> Result<FileDicomObject, ReadError>
where
    P: AsRef<Path>,
{
    OpenFileOptions::new().open_file(path)
}

/// A builder type for opening a DICOM file with additional options.
///
/// # Example
///
/// Create a `OpenFileOptions`,
/// call adaptor methods in a chain,
/// and finish the operation with [`.open_file()`](OpenFileOptions::open_file).
///
/// ```no_run
/// # use dcmio_object::OpenFileOptions;
/// let file = OpenFileOptions::new()
///     .read_until(dcmio_dictionary_std::tags::PIXEL_DATA)
///     .max_depth(8)
///     .open_file("path/to/file.dcm")?;
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OpenFileOptions<T = &'static TransferSyntaxRegistry> {
    pub(crate) ts_index: T,
    pub(crate) read_until: Option<Tag>,
    pub(crate) read_preamble: ReadPreamble,
    pub(crate) max_depth: u32,
    pub(crate) strict_transfer_syntax: bool,
}

impl Default for OpenFileOptions {
    fn default() -> Self {
        OpenFileOptions {
            ts_index: get_registry(),
            read_until: None,
            read_preamble: ReadPreamble::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            strict_transfer_syntax: false,
        }
    }
}

impl OpenFileOptions {
    pub fn new() -> Self {
        OpenFileOptions::default()
    }
}

impl<T> OpenFileOptions<T> {
    /// Set the operation to read only until the given tag is found.
    ///
    /// The reading process ends immediately after this tag,
    /// or any other tag that is next in the standard DICOM tag ordering,
    /// is found in the object's root data set.
    /// An element with the exact tag will be excluded from the output.
    pub fn read_until(mut self, tag: Tag) -> Self {
        self.read_until = Some(tag);
        self
    }

    /// Set the operation to read all elements of the data set to the end.
    ///
    /// This is the default behavior.
    pub fn read_all(mut self) -> Self {
        self.read_until = None;
        self
    }

    /// Set whether to read the 128-byte DICOM file preamble.
    pub fn read_preamble(mut self, option: ReadPreamble) -> Self {
        self.read_preamble = option;
        self
    }

    /// Set the maximum sequence nesting depth.
    /// Files going deeper fail with a depth limit error.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set whether a transfer syntax unknown to the index
    /// is an error.
    ///
    /// By default, such files are read as explicit VR little endian
    /// with encapsulated pixel data.
    pub fn strict_transfer_syntax(mut self, strict: bool) -> Self {
        self.strict_transfer_syntax = strict;
        self
    }

    /// Set the transfer syntax index to use when reading the file.
    pub fn transfer_syntax_index<Tr>(self, ts_index: Tr) -> OpenFileOptions<Tr>
    where
        Tr: TransferSyntaxIndex,
    {
        OpenFileOptions {
            ts_index,
            read_until: self.read_until,
            read_preamble: self.read_preamble,
            max_depth: self.max_depth,
            strict_transfer_syntax: self.strict_transfer_syntax,
        }
    }

    /// Open the file at the given path.
    pub fn open_file<P>(self, path: P) -> Result<FileDicomObject, ReadError>
    where
        P: AsRef<Path>,
        T: TransferSyntaxIndex,
    {
        crate::mem::open_file_with_options(path.as_ref(), self)
    }

    /// Obtain a DICOM object by reading from a byte source.
    pub fn from_reader<R>(self, from: R) -> Result<FileDicomObject, ReadError>
    where
        R: Read,
        T: TransferSyntaxIndex,
    {
        crate::mem::from_reader_with_options(from, self)
    }
}

/// An enumerate of supported options for
/// whether to read the 128-byte DICOM file preamble.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ReadPreamble {
    /// Read the preamble if the source does not start with
    /// the magic code `DICM`.
    /// If there is no magic code at all, try reading the source
    /// as a bare data set or file meta group.
    #[default]
    Auto,
    /// Never read the preamble,
    /// thus assuming that the original source does not have it.
    Never,
    /// Always read the preamble first,
    /// thus assuming that the original source always has it.
    Always,
}

/// Options for writing a DICOM file.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
    /// how to encode the length of sequences and items
    pub sequence_length: SequenceLength,
    /// whether to write the 128-byte preamble
    pub write_preamble: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            sequence_length: SequenceLength::Undefined,
            write_preamble: true,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        WriteOptions::default()
    }

    /// Set how to encode the length of sequences and items.
    pub fn sequence_length(mut self, sequence_length: SequenceLength) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    /// Set whether to write the 128-byte preamble (zeros).
    pub fn write_preamble(mut self, write_preamble: bool) -> Self {
        self.write_preamble = write_preamble;
        self
    }
}
