//! Per-frame decoding and encoding of the pixel data of a DICOM file.
//!
//! Native pixel data is sliced into frames of the size given by the image
//! attributes. Encapsulated pixel data is resolved into frames through its
//! offset table and passed to the pixel data reader of the file's transfer
//! syntax. A frame that cannot be decoded never invalidates the rest of the
//! object.
use crate::FileDicomObject;
use dcmio_core::buffer::BufferError;
use dcmio_core::error::{ErrorKind, Kind};
use dcmio_core::fragments::FragmentsError;
use dcmio_core::{DataSet, ElementBuffer, Entry, PixelFragments, Tag};
use dcmio_dictionary_std::tags;
use dcmio_encoding::adapters::{DecodeError, EncodeError, EncodeOptions};
use dcmio_encoding::transfer_syntax::TransferSyntaxIndex;
use dcmio_encoding::{FrameInfo, TransferSyntax};
use dcmio_transfer_syntax_registry::get_registry;
use snafu::{ensure, Backtrace, IntoError, OptionExt, ResultExt, Snafu};

/// One frame of native pixel data.
///
/// Samples are in little endian, with the samples of each pixel contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub data: Vec<u8>,
}

impl DecodedFrame {
    fn new(info: &FrameInfo, data: Vec<u8>) -> Self {
        DecodedFrame {
            rows: info.rows,
            columns: info.columns,
            samples_per_pixel: info.samples_per_pixel,
            bits_allocated: info.bits_allocated,
            data,
        }
    }
}

/// An error which may occur when decoding a frame of pixel data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PixelDecodeError {
    #[snafu(display("Missing or invalid attribute `{}`", name))]
    MissingAttribute {
        name: &'static str,
        source: BufferError,
    },
    #[snafu(display("Unsupported value {} of attribute `{}`", value, name))]
    InvalidAttribute {
        name: &'static str,
        value: u32,
        backtrace: Backtrace,
    },
    #[snafu(display("Unknown transfer syntax `{}`", uid))]
    UnknownTransferSyntax { uid: String, backtrace: Backtrace },
    #[snafu(display("No pixel data decoder for transfer syntax `{}`", uid))]
    NoCodec { uid: String, backtrace: Backtrace },
    #[snafu(display("Could not resolve frame from pixel data fragments"))]
    Fragments { source: FragmentsError },
    #[snafu(display("Could not decode frame #{}", index))]
    Decode { index: u32, source: DecodeError },
    #[snafu(display(
        "Frame #{} is out of the {} bytes of native pixel data",
        index,
        available
    ))]
    NativeFrame {
        index: u32,
        available: usize,
        backtrace: Backtrace,
    },
}

impl Kind for PixelDecodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            PixelDecodeError::MissingAttribute { source, .. } => source.kind(),
            PixelDecodeError::InvalidAttribute { .. } => ErrorKind::CorruptedFile,
            PixelDecodeError::UnknownTransferSyntax { .. }
            | PixelDecodeError::NoCodec { .. } => ErrorKind::WrongTransferSyntax,
            PixelDecodeError::Fragments { source } => source.kind(),
            PixelDecodeError::Decode { source, .. } => source.kind(),
            PixelDecodeError::NativeFrame { .. } => ErrorKind::CorruptedFile,
        }
    }
}

/// An error which may occur when encapsulating native pixel data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PixelEncodeError {
    #[snafu(display("Could not read native frames"))]
    ReadFrames {
        #[snafu(backtrace)]
        source: PixelDecodeError,
    },
    #[snafu(display("Pixel data is already encapsulated"))]
    NotNative { backtrace: Backtrace },
    #[snafu(display("No pixel data encoder for transfer syntax `{}`", uid))]
    NoEncoder { uid: String, backtrace: Backtrace },
    #[snafu(display("Could not encode frame #{}", index))]
    Encode { index: u32, source: EncodeError },
}

impl Kind for PixelEncodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            PixelEncodeError::ReadFrames { source } => source.kind(),
            PixelEncodeError::NotNative { .. } => ErrorKind::UnsupportedOperation,
            PixelEncodeError::NoEncoder { .. } => ErrorKind::WrongTransferSyntax,
            PixelEncodeError::Encode { source, .. } => source.kind(),
        }
    }
}

fn attribute(obj: &DataSet, tag: Tag, name: &'static str) -> Result<u16, PixelDecodeError> {
    let value = obj.uint(tag).context(MissingAttributeSnafu { name })?;
    u16::try_from(value).ok().context(InvalidAttributeSnafu { name, value })
}

fn ensure_attribute(
    valid: bool,
    name: &'static str,
    value: u16,
) -> Result<(), PixelDecodeError> {
    ensure!(
        valid,
        InvalidAttributeSnafu {
            name,
            value: u32::from(value)
        }
    );
    Ok(())
}

fn attribute_or(
    obj: &DataSet,
    tag: Tag,
    name: &'static str,
    default: u16,
) -> Result<u16, PixelDecodeError> {
    if obj.contains(tag) {
        attribute(obj, tag, name)
    } else {
        Ok(default)
    }
}

fn native_frame(
    info: &FrameInfo,
    index: u32,
    frames: u32,
    e: &ElementBuffer,
) -> Result<DecodedFrame, PixelDecodeError> {
    let frame_len = info.frame_len();
    let data = (index as usize)
        .checked_mul(frame_len)
        .and_then(|start| e.bytes().get(start..start.checked_add(frame_len)?))
        .filter(|_| index < frames)
        .context(NativeFrameSnafu {
            index,
            available: e.len(),
        })?;
    Ok(DecodedFrame::new(info, data.to_vec()))
}

fn missing_pixel_data() -> PixelDecodeError {
    MissingAttributeSnafu { name: "PixelData" }
        .into_error(BufferError::tag_not_found(tags::PIXEL_DATA))
}

impl FileDicomObject {
    /// Collect the image attributes needed to decode a frame.
    pub fn frame_info(&self) -> Result<FrameInfo, PixelDecodeError> {
        let rows = attribute(self, tags::ROWS, "Rows")?;
        let columns = attribute(self, tags::COLUMNS, "Columns")?;
        let samples_per_pixel = attribute_or(self, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel", 1)?;
        let bits_allocated = attribute(self, tags::BITS_ALLOCATED, "BitsAllocated")?;
        let bits_stored = attribute_or(self, tags::BITS_STORED, "BitsStored", bits_allocated)?;
        let pixel_representation =
            attribute_or(self, tags::PIXEL_REPRESENTATION, "PixelRepresentation", 0)?;

        ensure_attribute(rows > 0, "Rows", rows)?;
        ensure_attribute(columns > 0, "Columns", columns)?;
        ensure_attribute(
            (1..=4).contains(&samples_per_pixel),
            "SamplesPerPixel",
            samples_per_pixel,
        )?;
        ensure_attribute(
            matches!(bits_allocated, 8 | 16 | 32 | 64),
            "BitsAllocated",
            bits_allocated,
        )?;
        ensure_attribute(
            bits_stored > 0 && bits_stored <= bits_allocated,
            "BitsStored",
            bits_stored,
        )?;
        ensure_attribute(
            pixel_representation <= 1,
            "PixelRepresentation",
            pixel_representation,
        )?;

        let mut info = FrameInfo::new(rows, columns, samples_per_pixel, bits_allocated)
            .with_bits_stored(bits_stored);
        info.pixel_representation = pixel_representation;
        Ok(info)
    }

    /// The number of frames in the pixel data, 1 if not specified.
    pub fn number_of_frames(&self) -> u32 {
        self.uint(tags::NUMBER_OF_FRAMES).unwrap_or(1).max(1)
    }

    /// Decode the frame at the given index
    /// with the codecs of the global transfer syntax registry.
    pub fn decode_frame(&self, index: u32) -> Result<DecodedFrame, PixelDecodeError> {
        self.decode_frame_with(index, get_registry())
    }

    /// Decode the frame at the given index
    /// with the codecs of the given transfer syntax index.
    pub fn decode_frame_with<T>(
        &self,
        index: u32,
        ts_index: T,
    ) -> Result<DecodedFrame, PixelDecodeError>
    where
        T: TransferSyntaxIndex,
    {
        let info = self.frame_info()?;
        let frames = self.number_of_frames();

        match self.entry(tags::PIXEL_DATA) {
            Some(Entry::Fragments(_, fragments)) => {
                let src = fragments.frame(index, frames).context(FragmentsSnafu)?;
                self.decode_fragment(&info, index, &src, &ts_index)
            }
            Some(Entry::Element(e)) => native_frame(&info, index, frames, e),
            Some(Entry::Sequence(_)) | None => Err(missing_pixel_data()),
        }
    }

    /// Decode every frame of the pixel data
    /// with the codecs of the global transfer syntax registry.
    ///
    /// Frames are decoded independently:
    /// a failure is reported in place of the frame and decoding carries on.
    pub fn decode_frames(&self) -> Vec<Result<DecodedFrame, PixelDecodeError>> {
        self.decode_frames_with(get_registry())
    }

    /// Decode every frame of the pixel data
    /// with the codecs of the given transfer syntax index.
    ///
    /// The frame offset table is resolved once.
    /// When the frames cannot be located at all
    /// (missing attributes, a corrupted offset table),
    /// the output holds that single error.
    /// Native frames past the end of the pixel data
    /// are reported by one error after the last complete frame.
    pub fn decode_frames_with<T>(
        &self,
        ts_index: T,
    ) -> Vec<Result<DecodedFrame, PixelDecodeError>>
    where
        T: TransferSyntaxIndex,
    {
        let frames = self.number_of_frames();
        let results = match self.frame_info() {
            Err(e) => vec![Err(e)],
            Ok(info) => match self.entry(tags::PIXEL_DATA) {
                Some(Entry::Fragments(_, fragments)) => {
                    match fragments.frames(frames).context(FragmentsSnafu) {
                        Ok(sources) => sources
                            .iter()
                            .zip(0..)
                            .map(|(src, index)| {
                                self.decode_fragment(&info, index, src, &ts_index)
                            })
                            .collect(),
                        Err(e) => vec![Err(e)],
                    }
                }
                Some(Entry::Element(e)) => {
                    // frame_info guarantees a non-empty frame
                    let complete = (e.len() / info.frame_len()).min(frames as usize) as u32;
                    let mut out: Vec<_> = (0..complete)
                        .map(|index| native_frame(&info, index, frames, e))
                        .collect();
                    if complete < frames {
                        out.push(native_frame(&info, complete, frames, e));
                    }
                    out
                }
                Some(Entry::Sequence(_)) | None => vec![Err(missing_pixel_data())],
            },
        };
        for (index, frame) in results.iter().enumerate() {
            if let Err(e) = frame {
                tracing::warn!("Could not decode frame #{}: {}", index, e);
            }
        }
        results
    }

    fn decode_fragment<T>(
        &self,
        info: &FrameInfo,
        index: u32,
        src: &[u8],
        ts_index: &T,
    ) -> Result<DecodedFrame, PixelDecodeError>
    where
        T: TransferSyntaxIndex,
    {
        let uid = self.meta().transfer_syntax();
        let ts = ts_index
            .get(uid)
            .context(UnknownTransferSyntaxSnafu { uid })?;
        let reader = ts.pixel_data_reader().context(NoCodecSnafu { uid })?;
        let mut data = Vec::new();
        reader
            .decode_frame(info, src, &mut data)
            .context(DecodeSnafu { index })?;
        Ok(DecodedFrame::new(info, data))
    }

    /// Encapsulate native pixel data with the pixel data writer
    /// of the given transfer syntax, which becomes the file's transfer syntax.
    pub fn encode_pixel_data(
        &mut self,
        ts: &TransferSyntax,
        options: &EncodeOptions,
    ) -> Result<(), PixelEncodeError> {
        ensure!(
            matches!(self.entry(tags::PIXEL_DATA), Some(Entry::Element(_))),
            NotNativeSnafu
        );
        let writer = ts
            .pixel_data_writer()
            .context(NoEncoderSnafu { uid: ts.uid() })?;

        let info = self.frame_info().context(ReadFramesSnafu)?;
        let mut encoded = Vec::new();
        for index in 0..self.number_of_frames() {
            let frame = self.decode_frame(index).context(ReadFramesSnafu)?;
            let mut out = Vec::new();
            writer
                .encode_frame(&info, &frame.data, options, &mut out)
                .context(EncodeSnafu { index })?;
            encoded.push(out);
        }

        tracing::debug!(
            "Encapsulated {} frames in transfer syntax {}",
            encoded.len(),
            ts.uid()
        );
        self.put_fragments(tags::PIXEL_DATA, PixelFragments::from_frames(encoded, None));
        let meta = self.meta_mut();
        meta.transfer_syntax = ts.uid().to_string();
        meta.update_information_group_length();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PixelDecodeError;
    use crate::{FileDicomObject, FileMetaTableBuilder};
    use dcmio_core::error::{ErrorKind, Kind};
    use dcmio_core::{DataSet, ElementBuffer, PixelFragments, Tag, VR};
    use dcmio_dictionary_std::{tags, uids};
    use dcmio_encoding::adapters::EncodeOptions;
    use dcmio_transfer_syntax_registry::entries;
    use rstest::rstest;

    fn image(frames: u32, ts: &str) -> FileDicomObject {
        let mut obj = DataSet::new();
        obj.put(ElementBuffer::from_strs(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            &["2.25.7"],
        ));
        obj.put(ElementBuffer::from_u16s(tags::ROWS, VR::US, &[2]));
        obj.put(ElementBuffer::from_u16s(tags::COLUMNS, VR::US, &[3]));
        obj.put(ElementBuffer::from_u16s(tags::BITS_ALLOCATED, VR::US, &[8]));
        obj.put(ElementBuffer::from_strs(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            &[frames.to_string()],
        ));
        let pixels: Vec<u8> = (0..6 * frames as u8).collect();
        obj.put(ElementBuffer::new(tags::PIXEL_DATA, VR::OB, pixels));
        FileDicomObject::from_data_set(
            obj,
            FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .transfer_syntax(ts),
        )
        .unwrap()
    }

    #[test]
    fn native_frames_are_sliced() {
        let obj = image(2, entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
        assert_eq!(obj.number_of_frames(), 2);

        let frame = obj.decode_frame(1).unwrap();
        assert_eq!((frame.rows, frame.columns), (2, 3));
        assert_eq!(frame.samples_per_pixel, 1);
        assert_eq!(frame.data, vec![6, 7, 8, 9, 10, 11]);

        let err = obj.decode_frame(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
    }

    #[test]
    fn missing_rows() {
        let mut obj = image(1, entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
        obj.remove(tags::ROWS);
        let err = obj.decode_frame(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TagNotFound);
    }

    #[test]
    fn frames_without_codec_fail_one_by_one() {
        let mut obj = image(2, "1.2.3.4.5.6.7");
        obj.put_fragments(
            tags::PIXEL_DATA,
            PixelFragments::new(VR::OB, vec![], vec![vec![1, 2], vec![3, 4]]),
        );

        let frames = obj.decode_frames();
        assert_eq!(frames.len(), 2);
        for frame in frames {
            assert_eq!(frame.unwrap_err().kind(), ErrorKind::WrongTransferSyntax);
        }
        // the rest of the object is intact
        assert_eq!(obj.uint(tags::ROWS).unwrap(), 2);
    }

    #[test]
    fn encapsulate_with_rle() {
        let mut obj = image(3, entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
        let ts = entries::rle_lossless();
        obj.encode_pixel_data(&ts, &EncodeOptions::new()).unwrap();

        assert_eq!(obj.meta().transfer_syntax(), ts.uid());
        let fragments = obj.fragments(tags::PIXEL_DATA).unwrap();
        assert_eq!(fragments.fragments().len(), 3);
        assert_eq!(fragments.basic_offset_table().len(), 3);

        for (index, frame) in obj.decode_frames().into_iter().enumerate() {
            let expected: Vec<u8> = (index as u8 * 6..index as u8 * 6 + 6).collect();
            assert_eq!(frame.unwrap().data, expected);
        }

        // cannot encapsulate twice
        let err = obj
            .encode_pixel_data(&ts, &EncodeOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[rstest]
    #[case(tags::BITS_ALLOCATED, ElementBuffer::from_u16s(tags::BITS_ALLOCATED, VR::US, &[0xFFFF]))]
    #[case(tags::BITS_ALLOCATED, ElementBuffer::from_u16s(tags::BITS_ALLOCATED, VR::US, &[12]))]
    #[case(tags::ROWS, ElementBuffer::from_u16s(tags::ROWS, VR::US, &[0]))]
    #[case(tags::ROWS, ElementBuffer::from_u32s(tags::ROWS, VR::UL, &[70_000]))]
    #[case(tags::SAMPLES_PER_PIXEL, ElementBuffer::from_u16s(tags::SAMPLES_PER_PIXEL, VR::US, &[9]))]
    fn invalid_image_attributes(#[case] tag: Tag, #[case] value: ElementBuffer) {
        let mut obj = image(1, entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
        obj.put(value);
        let err = obj.decode_frame(0).unwrap_err();
        assert!(
            matches!(err, PixelDecodeError::InvalidAttribute { .. }),
            "{}: {:?}",
            tag,
            err
        );
        assert_eq!(err.kind(), ErrorKind::CorruptedFile);
        assert_eq!(obj.decode_frames().len(), 1);
    }

    #[test]
    fn declared_frames_are_bounded_by_the_data() {
        let mut obj = image(2, entries::uids::EXPLICIT_VR_LITTLE_ENDIAN);
        obj.put(ElementBuffer::from_strs(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            &["2000000000"],
        ));
        let frames = obj.decode_frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].as_ref().unwrap().data, vec![6, 7, 8, 9, 10, 11]);
        assert_eq!(
            frames[2].as_ref().unwrap_err().kind(),
            ErrorKind::CorruptedFile
        );

        obj.put_fragments(
            tags::PIXEL_DATA,
            PixelFragments::new(VR::OB, vec![], vec![vec![1, 2], vec![3, 4]]),
        );
        let frames = obj.decode_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_ref().unwrap_err().kind(),
            ErrorKind::CorruptedOffsetTable
        );
    }
}
