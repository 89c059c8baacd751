//! Module holding a stateful DICOM data encoding abstraction.
//!
//! The [`StatefulEncoder`] writes element headers, item markers and values
//! while applying the necessary padding to conform to DICOM encoding rules.

use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::{DataElementHeader, Length, Tag, VR};
use dcmio_encoding::cursor::{CursorError, StreamWriter};
use dcmio_encoding::encode::explicit_le::ExplicitVRLittleEndianEncoder;
use dcmio_encoding::encode::{EncodeTo, EncoderFor};
use dcmio_encoding::transfer_syntax::{DynEncoder, TransferSyntax};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Encoding in transfer syntax {} is unsupported", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },

    #[snafu(display("Failed to encode a data piece at position {}", position))]
    EncodeData {
        position: u64,
        #[snafu(backtrace)]
        source: dcmio_encoding::encode::Error,
    },

    #[snafu(display("Could not write value data at position {}", position))]
    WriteValueData {
        position: u64,
        #[snafu(backtrace)]
        source: CursorError,
    },

    #[snafu(display("Value of element {} is too long ({} bytes)", tag, len))]
    ValueTooLong {
        tag: Tag,
        len: usize,
        backtrace: Backtrace,
    },
}

impl Kind for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedTransferSyntax { .. } => ErrorKind::WrongTransferSyntax,
            Error::EncodeData { source, .. } => source.kind(),
            Error::WriteValueData { source, .. } => source.kind(),
            Error::ValueTooLong { .. } => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Also called a printer, this encoder type provides a stateful mid-level
/// abstraction for writing DICOM content.
/// Unlike `Encode`, the stateful encoder keeps track
/// of how many bytes were written.
/// `W` is the write target and `E` is the encoder.
#[derive(Debug)]
pub struct StatefulEncoder<W, E> {
    to: StreamWriter<W>,
    encoder: E,
}

pub type DynStatefulEncoder<'w, W> = StatefulEncoder<W, DynEncoder<'w, StreamWriter<W>>>;

impl<W, E> StatefulEncoder<W, E>
where
    W: Write,
{
    pub fn new(to: W, encoder: E) -> Self {
        StatefulEncoder {
            to: StreamWriter::new(to),
            encoder,
        }
    }

    /// Retrieve the underlying writer.
    pub fn into_inner(self) -> W {
        self.to.into_inner()
    }
}

impl<'w, W: 'w> DynStatefulEncoder<'w, W>
where
    W: Write,
{
    /// Create a new stateful encoder for the given transfer syntax.
    pub fn from_transfer_syntax(to: W, ts: &TransferSyntax) -> Result<Self> {
        let encoder = ts
            .encoder_for::<StreamWriter<W>>()
            .context(UnsupportedTransferSyntaxSnafu { uid: ts.uid() })?;
        Ok(StatefulEncoder::new(to, encoder))
    }
}

/// Type alias for the encoder of a file's meta group.
pub type FileHeaderEncoder<W> =
    StatefulEncoder<W, EncoderFor<ExplicitVRLittleEndianEncoder, StreamWriter<W>>>;

impl<W> FileHeaderEncoder<W>
where
    W: Write,
{
    /// Create a stateful encoder for the file meta group,
    /// which is always in _Explicit VR Little Endian_.
    pub fn file_header_encoder(to: W) -> Self {
        StatefulEncoder::new(to, EncoderFor::new(ExplicitVRLittleEndianEncoder::default()))
    }
}

impl<W, E> StatefulEncoder<W, E>
where
    W: Write,
    E: EncodeTo<StreamWriter<W>>,
{
    /// Encode and write a data element header.
    pub fn encode_element_header(&mut self, de: DataElementHeader) -> Result<()> {
        let position = self.to.tell();
        self.encoder
            .encode_element_header(&mut self.to, de)
            .context(EncodeDataSnafu { position })?;
        Ok(())
    }

    /// Encode and write an item header with the given length.
    pub fn encode_item_header(&mut self, len: u32) -> Result<()> {
        let position = self.to.tell();
        self.encoder
            .encode_item_header(&mut self.to, len)
            .context(EncodeDataSnafu { position })
    }

    /// Encode and write an item delimiter.
    pub fn encode_item_delimiter(&mut self) -> Result<()> {
        let position = self.to.tell();
        self.encoder
            .encode_item_delimiter(&mut self.to)
            .context(EncodeDataSnafu { position })
    }

    /// Encode and write a sequence delimiter.
    pub fn encode_sequence_delimiter(&mut self) -> Result<()> {
        let position = self.to.tell();
        self.encoder
            .encode_sequence_delimiter(&mut self.to)
            .context(EncodeDataSnafu { position })
    }

    /// Encode and write a whole primitive element:
    /// its header with the padded value length, then the value.
    pub fn encode_element(&mut self, tag: Tag, vr: VR, value: &[u8]) -> Result<()> {
        let padded_len = value.len() + value.len() % 2;
        let len = u32::try_from(padded_len)
            .ok()
            .filter(|&len| Length(len).is_defined())
            .context(ValueTooLongSnafu {
                tag,
                len: value.len(),
            })?;
        self.encode_element_header(DataElementHeader::new(tag, vr, Length(len)))?;
        self.write_value(vr, value)
    }

    /// Write the little endian bytes of a value,
    /// padded to an even length with the VR's padding byte.
    pub fn write_value(&mut self, vr: VR, value: &[u8]) -> Result<()> {
        let position = self.to.tell();
        self.encoder
            .encode_value(&mut self.to, vr, value)
            .context(EncodeDataSnafu { position })?;
        if value.len() % 2 == 1 {
            tracing::debug!("Padding odd length value at position {}", position);
            self.write_raw(&[vr.padding()])?;
        }
        Ok(())
    }

    /// Write an encapsulated pixel data fragment item.
    pub fn encode_fragment(&mut self, fragment: &[u8]) -> Result<()> {
        let padded_len = fragment.len() + fragment.len() % 2;
        let len = u32::try_from(padded_len)
            .ok()
            .filter(|&len| Length(len).is_defined())
            .context(ValueTooLongSnafu {
                tag: Tag(0xFFFE, 0xE000),
                len: fragment.len(),
            })?;
        self.encode_item_header(len)?;
        self.write_raw(fragment)?;
        if fragment.len() % 2 == 1 {
            self.write_raw(&[0])?;
        }
        Ok(())
    }

    /// Write a basic offset table item, header included.
    pub fn encode_offset_table(&mut self, table: &[u32]) -> Result<()> {
        self.encode_item_header(table.len() as u32 * 4)?;
        let position = self.to.tell();
        self.encoder
            .encode_offset_table(&mut self.to, table)
            .context(EncodeDataSnafu { position })?;
        Ok(())
    }

    /// Write bytes as they are.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let position = self.to.tell();
        self.to
            .write_bytes(bytes)
            .context(WriteValueDataSnafu { position })
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        let position = self.to.tell();
        self.to.flush_all().context(WriteValueDataSnafu { position })
    }

    /// Retrieve the number of bytes written so far by this encoder.
    pub fn bytes_written(&self) -> u64 {
        self.to.tell()
    }
}
