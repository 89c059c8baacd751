#![allow(clippy::derive_partial_eq_without_eq)]
//! This crate reads and writes DICOM files
//! as in-memory data sets with a file meta information table.
//!
//! Loading a DICOM file can be done with ease via the function [`open_file`].
//! For additional file reading options, use [`OpenFileOptions`].
//! New files can be made from any [`DataSet`]
//! with [`FileDicomObject::from_data_set`].
//!
//! # Examples
//!
//! Read an object and fetch some attributes:
//!
//! ```no_run
//! use dcmio_dictionary_std::tags;
//! use dcmio_object::open_file;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let obj = open_file("0001.dcm")?;
//!
//! let patient_name = obj.string(tags::PATIENT_NAME)?;
//! let rows = obj.uint(tags::ROWS)?;
//! # Ok(())
//! # }
//! ```
//!
//! The pixel data and following elements can be ignored
//! by using [`OpenFileOptions`]:
//!
//! ```no_run
//! use dcmio_object::OpenFileOptions;
//!
//! let obj = OpenFileOptions::new()
//!     .read_until(dcmio_dictionary_std::tags::PIXEL_DATA)
//!     .open_file("0002.dcm")?;
//! # Result::<(), dcmio_object::ReadError>::Ok(())
//! ```
//!
//! Frames are decoded one at a time
//! by the codec of the file's transfer syntax:
//!
//! ```no_run
//! # use dcmio_object::open_file;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let obj = open_file("0003.dcm")?;
//! for (i, frame) in obj.decode_frames().into_iter().enumerate() {
//!     match frame {
//!         Ok(frame) => println!("frame #{}: {} bytes", i, frame.data.len()),
//!         Err(e) => eprintln!("frame #{}: {}", i, e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
pub mod file;
pub mod mem;
pub mod meta;
pub mod pixeldata;
pub mod tokens;

pub use crate::file::{from_reader, open_file, OpenFileOptions, ReadPreamble, WriteOptions};
pub use crate::mem::{read_data_set, write_data_set};
pub use crate::meta::{FileMetaTable, FileMetaTableBuilder};
pub use crate::pixeldata::{DecodedFrame, PixelDecodeError, PixelEncodeError};
pub use crate::tokens::{DataSetTokens, SequenceLength};
pub use dcmio_core::{DataSet, ElementBuffer, Entry, PixelFragments, Tag, VR};
pub use dcmio_dictionary_std as dictionary_std;
pub use dcmio_encoding::TransferSyntax;
pub use dcmio_parser::dataset::DataToken;

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_dictionary_std::tags;
use dcmio_encoding::transfer_syntax::TransferSyntaxIndex;
use dcmio_transfer_syntax_registry::get_registry;
use snafu::{Backtrace, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The current implementation class UID of this library.
///
/// Generated as per the standard, part 5, section B.2.
///
/// This UID is subject to changes in future versions.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.262311939812345186640371305637460911037";

/// The current implementation version name of this library.
///
/// This name is subject to changes in future versions.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DCMIO 0.1";

/// An error which may occur when loading a DICOM object
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("Could not open file '{}'", filename.display()))]
    OpenFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not parse meta group data set"))]
    ParseMetaDataSet {
        #[snafu(backtrace)]
        source: crate::meta::Error,
    },
    #[snafu(display("Could not create data set parser"))]
    CreateParser {
        #[snafu(backtrace)]
        source: dcmio_parser::dataset::read::Error,
    },
    #[snafu(display("Could not read data set token"))]
    ReadToken {
        #[snafu(backtrace)]
        source: dcmio_parser::dataset::read::Error,
    },
    #[snafu(display("Missing element value after header token"))]
    MissingElementValue { backtrace: Backtrace },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    ReadUnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    #[snafu(display("Unexpected token {}", token))]
    UnexpectedToken {
        token: Box<DataToken>,
        backtrace: Backtrace,
    },
    #[snafu(display("Premature data set end"))]
    PrematureEnd { backtrace: Backtrace },
}

impl Kind for ReadError {
    fn kind(&self) -> ErrorKind {
        match self {
            ReadError::OpenFile { .. } => ErrorKind::Open,
            ReadError::ParseMetaDataSet { source } => source.kind(),
            ReadError::CreateParser { source } | ReadError::ReadToken { source } => source.kind(),
            ReadError::ReadUnsupportedTransferSyntax { .. } => ErrorKind::WrongTransferSyntax,
            ReadError::MissingElementValue { .. }
            | ReadError::UnexpectedToken { .. }
            | ReadError::PrematureEnd { .. } => ErrorKind::CorruptedFile,
        }
    }
}

/// An error which may occur when writing a DICOM object
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    #[snafu(display("Could not write to file '{}'", filename.display()))]
    WriteFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write object preamble"))]
    WritePreamble {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write magic code"))]
    WriteMagicCode {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not create data set printer"))]
    CreatePrinter {
        #[snafu(backtrace)]
        source: dcmio_parser::dataset::write::Error,
    },
    #[snafu(display("Could not print meta group data set"))]
    PrintMetaDataSet {
        #[snafu(backtrace)]
        source: crate::meta::Error,
    },
    #[snafu(display("Could not print data set"))]
    PrintDataSet {
        #[snafu(backtrace)]
        source: dcmio_parser::dataset::write::Error,
    },
    #[snafu(display("Transfer syntax `{}` cannot be written", uid))]
    WriteUnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
}

impl Kind for WriteError {
    fn kind(&self) -> ErrorKind {
        match self {
            WriteError::WriteFile { .. }
            | WriteError::WritePreamble { .. }
            | WriteError::WriteMagicCode { .. } => ErrorKind::Write,
            WriteError::CreatePrinter { source } | WriteError::PrintDataSet { source } => {
                source.kind()
            }
            WriteError::PrintMetaDataSet { source } => source.kind(),
            WriteError::WriteUnsupportedTransferSyntax { .. } => ErrorKind::WrongTransferSyntax,
        }
    }
}

/// An error which may occur when attaching a file meta table to a data set.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WithMetaError {
    /// Could not build file meta table
    BuildMetaTable {
        #[snafu(backtrace)]
        source: crate::meta::Error,
    },
    /// Could not read the SOP identifiers of the data set
    PrepareMetaTable {
        source: dcmio_core::buffer::BufferError,
        backtrace: Backtrace,
    },
}

impl Kind for WithMetaError {
    fn kind(&self) -> ErrorKind {
        match self {
            WithMetaError::BuildMetaTable { source } => source.kind(),
            WithMetaError::PrepareMetaTable { source, .. } => source.kind(),
        }
    }
}

/// A root DICOM object retrieved from a standard DICOM file,
/// containing additional information from the file meta group
/// in a separate table value.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDicomObject {
    meta: FileMetaTable,
    obj: DataSet,
}

impl FileDicomObject {
    /// Create a file object from its parts.
    pub fn new(meta: FileMetaTable, obj: DataSet) -> Self {
        FileDicomObject { meta, obj }
    }

    /// Attach a file meta table to the given data set.
    ///
    /// The media storage SOP class and instance UIDs are taken from
    /// _SOP Class UID_ and _SOP Instance UID_ when not set in the builder.
    pub fn from_data_set(
        obj: DataSet,
        mut meta: FileMetaTableBuilder,
    ) -> Result<Self, WithMetaError> {
        if meta.media_storage_sop_class_uid.is_none() {
            if let Ok(uid) = obj.string(tags::SOP_CLASS_UID) {
                meta = meta.media_storage_sop_class_uid(uid);
            }
        }
        if meta.media_storage_sop_instance_uid.is_none() {
            let uid = obj
                .string(tags::SOP_INSTANCE_UID)
                .context(PrepareMetaTableSnafu)?;
            meta = meta.media_storage_sop_instance_uid(uid);
        }

        Ok(FileDicomObject {
            meta: meta.build().context(BuildMetaTableSnafu)?,
            obj,
        })
    }

    /// Retrieve the processed meta header table.
    pub fn meta(&self) -> &FileMetaTable {
        &self.meta
    }

    /// Retrieve a mutable reference to the processed meta header table.
    ///
    /// Considerable care should be taken when modifying this table,
    /// as it may influence object reading and writing operations.
    pub fn meta_mut(&mut self) -> &mut FileMetaTable {
        &mut self.meta
    }

    /// Retrieve the inner data set, discarding the meta table.
    pub fn into_inner(self) -> DataSet {
        self.obj
    }

    /// Write the entire object as a DICOM file
    /// into the given file path.
    /// Preamble, magic code, and file meta group will be included
    /// before the inner object.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        self.write_to_file_with_options(path, WriteOptions::default())
    }

    /// Write the entire object as a DICOM file
    /// into the given file path, with the given options.
    pub fn write_to_file_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: WriteOptions,
    ) -> Result<(), WriteError> {
        let path = path.as_ref();
        let file = File::create(path).context(WriteFileSnafu { filename: path })?;
        let mut to = BufWriter::new(file);
        self.write_all_with_options(&mut to, options)?;
        to.flush().context(WriteFileSnafu { filename: path })
    }

    /// Write the entire object as a DICOM file
    /// into the given writer.
    /// Preamble, magic code, and file meta group will be included
    /// before the inner object.
    pub fn write_all<W: Write>(&self, to: W) -> Result<(), WriteError> {
        self.write_all_with_options(to, WriteOptions::default())
    }

    /// Write the entire object as a DICOM file
    /// into the given writer, with the given options.
    pub fn write_all_with_options<W: Write>(
        &self,
        to: W,
        options: WriteOptions,
    ) -> Result<(), WriteError> {
        let mut to = BufWriter::new(to);

        if options.write_preamble {
            to.write_all(&[0_u8; meta::PREAMBLE_LEN][..])
                .context(WritePreambleSnafu)?;
        }

        // write magic sequence
        to.write_all(b"DICM").context(WriteMagicCodeSnafu)?;

        // write meta group
        self.meta.write(&mut to).context(PrintMetaDataSetSnafu)?;

        self.write_dataset_impl(to, options.sequence_length)
    }

    /// Write the file meta group set into the given writer.
    ///
    /// This is equivalent to `self.meta().write(to)`.
    pub fn write_meta<W: Write>(&self, to: W) -> Result<(), WriteError> {
        self.meta.write(to).context(PrintMetaDataSetSnafu)
    }

    /// Write the inner data set into the given writer,
    /// without preamble, magic code, nor file meta group.
    ///
    /// The transfer syntax is selected from the file meta table.
    pub fn write_dataset<W: Write>(&self, to: W) -> Result<(), WriteError> {
        self.write_dataset_impl(BufWriter::new(to), SequenceLength::default())
    }

    fn write_dataset_impl<W: Write>(
        &self,
        to: W,
        sequence_length: SequenceLength,
    ) -> Result<(), WriteError> {
        let ts = self.write_transfer_syntax()?;
        write_data_set(to, &self.obj, &ts, sequence_length)
    }

    /// Resolve the transfer syntax to write the data set in.
    fn write_transfer_syntax(&self) -> Result<TransferSyntax, WriteError> {
        let uid = self.meta.transfer_syntax();
        let ts = match get_registry().get(uid) {
            Some(ts) => ts,
            None => {
                tracing::warn!(
                    "Unknown transfer syntax `{}`, writing as explicit VR little endian",
                    uid
                );
                TransferSyntax::unknown_encapsulated(uid)
            }
        };
        snafu::ensure!(
            !ts.unsupported(),
            WriteUnsupportedTransferSyntaxSnafu { uid }
        );
        Ok(ts)
    }
}

impl ::std::ops::Deref for FileDicomObject {
    type Target = DataSet;

    fn deref(&self) -> &Self::Target {
        &self.obj
    }
}

impl ::std::ops::DerefMut for FileDicomObject {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.obj
    }
}
