//! Tag constants and the attribute table of the standard dictionary.
//!
//! Repeating groups (such as overlays, `60xx`)
//! are recorded with the `xx` portion zeroed.
//! Attributes which are either US or SS depending on the pixel representation
//! are recorded as US.

use dcmio_core::dictionary::{DictionaryEntryRef, Multiplicity, Multiplicity::*};
use dcmio_core::header::{Tag, VR};

/// FileMetaInformationGroupLength (0002,0000) UL
pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
/// FileMetaInformationVersion (0002,0001) OB
pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
/// MediaStorageSOPClassUID (0002,0002) UI
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
/// MediaStorageSOPInstanceUID (0002,0003) UI
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
/// TransferSyntaxUID (0002,0010) UI
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
/// ImplementationClassUID (0002,0012) UI
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
/// ImplementationVersionName (0002,0013) SH
pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);
/// SourceApplicationEntityTitle (0002,0016) AE
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);
/// PrivateInformationCreatorUID (0002,0100) UI
pub const PRIVATE_INFORMATION_CREATOR_UID: Tag = Tag(0x0002, 0x0100);
/// PrivateInformation (0002,0102) OB
pub const PRIVATE_INFORMATION: Tag = Tag(0x0002, 0x0102);
/// SpecificCharacterSet (0008,0005) CS
pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
/// ImageType (0008,0008) CS
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
/// InstanceCreationDate (0008,0012) DA
pub const INSTANCE_CREATION_DATE: Tag = Tag(0x0008, 0x0012);
/// InstanceCreationTime (0008,0013) TM
pub const INSTANCE_CREATION_TIME: Tag = Tag(0x0008, 0x0013);
/// SOPClassUID (0008,0016) UI
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
/// SOPInstanceUID (0008,0018) UI
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
/// StudyDate (0008,0020) DA
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
/// SeriesDate (0008,0021) DA
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
/// AcquisitionDate (0008,0022) DA
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
/// ContentDate (0008,0023) DA
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
/// AcquisitionDateTime (0008,002A) DT
pub const ACQUISITION_DATE_TIME: Tag = Tag(0x0008, 0x002A);
/// StudyTime (0008,0030) TM
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
/// SeriesTime (0008,0031) TM
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
/// AcquisitionTime (0008,0032) TM
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
/// ContentTime (0008,0033) TM
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
/// AccessionNumber (0008,0050) SH
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
/// Modality (0008,0060) CS
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
/// ConversionType (0008,0064) CS
pub const CONVERSION_TYPE: Tag = Tag(0x0008, 0x0064);
/// Manufacturer (0008,0070) LO
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
/// InstitutionName (0008,0080) LO
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
/// ReferringPhysicianName (0008,0090) PN
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
/// CodeValue (0008,0100) SH
pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
/// CodingSchemeDesignator (0008,0102) SH
pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
/// CodeMeaning (0008,0104) LO
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
/// StationName (0008,1010) SH
pub const STATION_NAME: Tag = Tag(0x0008, 0x1010);
/// StudyDescription (0008,1030) LO
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
/// SeriesDescription (0008,103E) LO
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
/// InstitutionalDepartmentName (0008,1040) LO
pub const INSTITUTIONAL_DEPARTMENT_NAME: Tag = Tag(0x0008, 0x1040);
/// OperatorsName (0008,1070) PN
pub const OPERATORS_NAME: Tag = Tag(0x0008, 0x1070);
/// ManufacturerModelName (0008,1090) LO
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
/// ReferencedImageSequence (0008,1140) SQ
pub const REFERENCED_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x1140);
/// ReferencedSOPClassUID (0008,1150) UI
pub const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
/// ReferencedSOPInstanceUID (0008,1155) UI
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
/// DerivationDescription (0008,2111) ST
pub const DERIVATION_DESCRIPTION: Tag = Tag(0x0008, 0x2111);
/// PatientName (0010,0010) PN
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
/// PatientID (0010,0020) LO
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
/// PatientBirthDate (0010,0030) DA
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
/// PatientSex (0010,0040) CS
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
/// PatientAge (0010,1010) AS
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);
/// PatientSize (0010,1020) DS
pub const PATIENT_SIZE: Tag = Tag(0x0010, 0x1020);
/// PatientWeight (0010,1030) DS
pub const PATIENT_WEIGHT: Tag = Tag(0x0010, 0x1030);
/// BodyPartExamined (0018,0015) CS
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
/// ScanningSequence (0018,0020) CS
pub const SCANNING_SEQUENCE: Tag = Tag(0x0018, 0x0020);
/// SequenceVariant (0018,0021) CS
pub const SEQUENCE_VARIANT: Tag = Tag(0x0018, 0x0021);
/// ScanOptions (0018,0022) CS
pub const SCAN_OPTIONS: Tag = Tag(0x0018, 0x0022);
/// MRAcquisitionType (0018,0023) CS
pub const MR_ACQUISITION_TYPE: Tag = Tag(0x0018, 0x0023);
/// SliceThickness (0018,0050) DS
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
/// KVP (0018,0060) DS
pub const KVP: Tag = Tag(0x0018, 0x0060);
/// RepetitionTime (0018,0080) DS
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
/// EchoTime (0018,0081) DS
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);
/// NumberOfAverages (0018,0083) DS
pub const NUMBER_OF_AVERAGES: Tag = Tag(0x0018, 0x0083);
/// ImagingFrequency (0018,0084) DS
pub const IMAGING_FREQUENCY: Tag = Tag(0x0018, 0x0084);
/// ImagedNucleus (0018,0085) SH
pub const IMAGED_NUCLEUS: Tag = Tag(0x0018, 0x0085);
/// EchoNumbers (0018,0086) IS
pub const ECHO_NUMBERS: Tag = Tag(0x0018, 0x0086);
/// MagneticFieldStrength (0018,0087) DS
pub const MAGNETIC_FIELD_STRENGTH: Tag = Tag(0x0018, 0x0087);
/// SpacingBetweenSlices (0018,0088) DS
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
/// NumberOfPhaseEncodingSteps (0018,0089) IS
pub const NUMBER_OF_PHASE_ENCODING_STEPS: Tag = Tag(0x0018, 0x0089);
/// EchoTrainLength (0018,0091) IS
pub const ECHO_TRAIN_LENGTH: Tag = Tag(0x0018, 0x0091);
/// PercentSampling (0018,0093) DS
pub const PERCENT_SAMPLING: Tag = Tag(0x0018, 0x0093);
/// PercentPhaseFieldOfView (0018,0094) DS
pub const PERCENT_PHASE_FIELD_OF_VIEW: Tag = Tag(0x0018, 0x0094);
/// PixelBandwidth (0018,0095) DS
pub const PIXEL_BANDWIDTH: Tag = Tag(0x0018, 0x0095);
/// DeviceSerialNumber (0018,1000) LO
pub const DEVICE_SERIAL_NUMBER: Tag = Tag(0x0018, 0x1000);
/// SoftwareVersions (0018,1020) LO
pub const SOFTWARE_VERSIONS: Tag = Tag(0x0018, 0x1020);
/// ProtocolName (0018,1030) LO
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);
/// TriggerTime (0018,1060) DS
pub const TRIGGER_TIME: Tag = Tag(0x0018, 0x1060);
/// FrameTime (0018,1063) DS
pub const FRAME_TIME: Tag = Tag(0x0018, 0x1063);
/// ExposureTime (0018,1150) IS
pub const EXPOSURE_TIME: Tag = Tag(0x0018, 0x1150);
/// XRayTubeCurrent (0018,1151) IS
pub const X_RAY_TUBE_CURRENT: Tag = Tag(0x0018, 0x1151);
/// Exposure (0018,1152) IS
pub const EXPOSURE: Tag = Tag(0x0018, 0x1152);
/// ReceiveCoilName (0018,1250) SH
pub const RECEIVE_COIL_NAME: Tag = Tag(0x0018, 0x1250);
/// TransmitCoilName (0018,1251) SH
pub const TRANSMIT_COIL_NAME: Tag = Tag(0x0018, 0x1251);
/// InPlanePhaseEncodingDirection (0018,1312) CS
pub const IN_PLANE_PHASE_ENCODING_DIRECTION: Tag = Tag(0x0018, 0x1312);
/// FlipAngle (0018,1314) DS
pub const FLIP_ANGLE: Tag = Tag(0x0018, 0x1314);
/// SAR (0018,1316) DS
pub const SAR: Tag = Tag(0x0018, 0x1316);
/// dBdt (0018,1318) DS
pub const DB_DT: Tag = Tag(0x0018, 0x1318);
/// PatientPosition (0018,5100) CS
pub const PATIENT_POSITION: Tag = Tag(0x0018, 0x5100);
/// SequenceOfUltrasoundRegions (0018,6011) SQ
pub const SEQUENCE_OF_ULTRASOUND_REGIONS: Tag = Tag(0x0018, 0x6011);
/// AcquisitionDuration (0018,9073) FD
pub const ACQUISITION_DURATION: Tag = Tag(0x0018, 0x9073);
/// DiffusionBValue (0018,9087) FD
pub const DIFFUSION_B_VALUE: Tag = Tag(0x0018, 0x9087);
/// DiffusionGradientOrientation (0018,9089) FD
pub const DIFFUSION_GRADIENT_ORIENTATION: Tag = Tag(0x0018, 0x9089);
/// StudyInstanceUID (0020,000D) UI
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
/// SeriesInstanceUID (0020,000E) UI
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
/// StudyID (0020,0010) SH
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
/// SeriesNumber (0020,0011) IS
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
/// AcquisitionNumber (0020,0012) IS
pub const ACQUISITION_NUMBER: Tag = Tag(0x0020, 0x0012);
/// InstanceNumber (0020,0013) IS
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
/// PatientOrientation (0020,0020) CS
pub const PATIENT_ORIENTATION: Tag = Tag(0x0020, 0x0020);
/// ImagePositionPatient (0020,0032) DS
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
/// ImageOrientationPatient (0020,0037) DS
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
/// FrameOfReferenceUID (0020,0052) UI
pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
/// TemporalPositionIdentifier (0020,0100) IS
pub const TEMPORAL_POSITION_IDENTIFIER: Tag = Tag(0x0020, 0x0100);
/// NumberOfTemporalPositions (0020,0105) IS
pub const NUMBER_OF_TEMPORAL_POSITIONS: Tag = Tag(0x0020, 0x0105);
/// TemporalResolution (0020,0110) DS
pub const TEMPORAL_RESOLUTION: Tag = Tag(0x0020, 0x0110);
/// PositionReferenceIndicator (0020,1040) LO
pub const POSITION_REFERENCE_INDICATOR: Tag = Tag(0x0020, 0x1040);
/// SliceLocation (0020,1041) DS
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
/// ImageComments (0020,4000) LT
pub const IMAGE_COMMENTS: Tag = Tag(0x0020, 0x4000);
/// TemporalPositionIndex (0020,9128) UL
pub const TEMPORAL_POSITION_INDEX: Tag = Tag(0x0020, 0x9128);
/// SamplesPerPixel (0028,0002) US
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// PhotometricInterpretation (0028,0004) CS
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// PlanarConfiguration (0028,0006) US
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
/// NumberOfFrames (0028,0008) IS
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// FrameIncrementPointer (0028,0009) AT
pub const FRAME_INCREMENT_POINTER: Tag = Tag(0x0028, 0x0009);
/// Rows (0028,0010) US
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011) US
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// PixelSpacing (0028,0030) DS
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
/// BitsAllocated (0028,0100) US
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// BitsStored (0028,0101) US
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// HighBit (0028,0102) US
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
/// PixelRepresentation (0028,0103) US
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
/// SmallestImagePixelValue (0028,0106) US or SS
pub const SMALLEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0106);
/// LargestImagePixelValue (0028,0107) US or SS
pub const LARGEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0107);
/// PixelPaddingValue (0028,0120) US
pub const PIXEL_PADDING_VALUE: Tag = Tag(0x0028, 0x0120);
/// WindowCenter (0028,1050) DS
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
/// WindowWidth (0028,1051) DS
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
/// RescaleIntercept (0028,1052) DS
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
/// RescaleSlope (0028,1053) DS
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
/// RescaleType (0028,1054) LO
pub const RESCALE_TYPE: Tag = Tag(0x0028, 0x1054);
/// LossyImageCompression (0028,2110) CS
pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);
/// LossyImageCompressionRatio (0028,2112) DS
pub const LOSSY_IMAGE_COMPRESSION_RATIO: Tag = Tag(0x0028, 0x2112);
/// LossyImageCompressionMethod (0028,2114) CS
pub const LOSSY_IMAGE_COMPRESSION_METHOD: Tag = Tag(0x0028, 0x2114);
/// VOILUTSequence (0028,3010) SQ
pub const VOILUT_SEQUENCE: Tag = Tag(0x0028, 0x3010);
/// ValueType (0040,A040) CS
pub const VALUE_TYPE: Tag = Tag(0x0040, 0xA040);
/// ConceptNameCodeSequence (0040,A043) SQ
pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA043);
/// TextValue (0040,A160) UT
pub const TEXT_VALUE: Tag = Tag(0x0040, 0xA160);
/// ContentSequence (0040,A730) SQ
pub const CONTENT_SEQUENCE: Tag = Tag(0x0040, 0xA730);
/// RadiopharmaceuticalInformationSequence (0054,0016) SQ
pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
/// FrameReferenceTime (0054,1300) DS
pub const FRAME_REFERENCE_TIME: Tag = Tag(0x0054, 0x1300);
/// ImageIndex (0054,1330) US
pub const IMAGE_INDEX: Tag = Tag(0x0054, 0x1330);
/// DoseUnits (3004,0002) CS
pub const DOSE_UNITS: Tag = Tag(0x3004, 0x0002);
/// DoseType (3004,0004) CS
pub const DOSE_TYPE: Tag = Tag(0x3004, 0x0004);
/// DoseSummationType (3004,000A) CS
pub const DOSE_SUMMATION_TYPE: Tag = Tag(0x3004, 0x000A);
/// GridFrameOffsetVector (3004,000C) DS
pub const GRID_FRAME_OFFSET_VECTOR: Tag = Tag(0x3004, 0x000C);
/// DoseGridScaling (3004,000E) DS
pub const DOSE_GRID_SCALING: Tag = Tag(0x3004, 0x000E);
/// StructureSetROISequence (3006,0020) SQ
pub const STRUCTURE_SET_ROI_SEQUENCE: Tag = Tag(0x3006, 0x0020);
/// ROINumber (3006,0022) IS
pub const ROI_NUMBER: Tag = Tag(0x3006, 0x0022);
/// ROIName (3006,0026) LO
pub const ROI_NAME: Tag = Tag(0x3006, 0x0026);
/// ROIContourSequence (3006,0039) SQ
pub const ROI_CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0039);
/// ContourSequence (3006,0040) SQ
pub const CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0040);
/// ContourData (3006,0050) DS
pub const CONTOUR_DATA: Tag = Tag(0x3006, 0x0050);
/// ReferencedROINumber (3006,0084) IS
pub const REFERENCED_ROI_NUMBER: Tag = Tag(0x3006, 0x0084);
/// RTPlanLabel (300A,0002) SH
pub const RT_PLAN_LABEL: Tag = Tag(0x300A, 0x0002);
/// RTPlanName (300A,0003) LO
pub const RT_PLAN_NAME: Tag = Tag(0x300A, 0x0003);
/// RTPlanDescription (300A,0004) ST
pub const RT_PLAN_DESCRIPTION: Tag = Tag(0x300A, 0x0004);
/// RTPlanDate (300A,0006) DA
pub const RT_PLAN_DATE: Tag = Tag(0x300A, 0x0006);
/// RTPlanTime (300A,0007) TM
pub const RT_PLAN_TIME: Tag = Tag(0x300A, 0x0007);
/// RTPlanGeometry (300A,000C) CS
pub const RT_PLAN_GEOMETRY: Tag = Tag(0x300A, 0x000C);
/// OverlayRows (6000,0010) US
pub const OVERLAY_ROWS: Tag = Tag(0x6000, 0x0010);
/// OverlayColumns (6000,0011) US
pub const OVERLAY_COLUMNS: Tag = Tag(0x6000, 0x0011);
/// OverlayData (6000,3000) OW
pub const OVERLAY_DATA: Tag = Tag(0x6000, 0x3000);
/// FloatPixelData (7FE0,0008) OF
pub const FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0008);
/// DoubleFloatPixelData (7FE0,0009) OD
pub const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0009);
/// PixelData (7FE0,0010) OW
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

const fn e(tag: Tag, alias: &'static str, vr: VR, vm: Multiplicity) -> DictionaryEntryRef<'static> {
    DictionaryEntryRef {
        tag,
        alias,
        vr,
        vm,
    }
}

/// All attributes known to the standard dictionary.
#[rustfmt::skip]
pub(crate) static ENTRIES: &[DictionaryEntryRef<'static>] = &[
    e(FILE_META_INFORMATION_GROUP_LENGTH, "FileMetaInformationGroupLength", VR::UL, Exact(1)),
    e(FILE_META_INFORMATION_VERSION, "FileMetaInformationVersion", VR::OB, Exact(1)),
    e(MEDIA_STORAGE_SOP_CLASS_UID, "MediaStorageSOPClassUID", VR::UI, Exact(1)),
    e(MEDIA_STORAGE_SOP_INSTANCE_UID, "MediaStorageSOPInstanceUID", VR::UI, Exact(1)),
    e(TRANSFER_SYNTAX_UID, "TransferSyntaxUID", VR::UI, Exact(1)),
    e(IMPLEMENTATION_CLASS_UID, "ImplementationClassUID", VR::UI, Exact(1)),
    e(IMPLEMENTATION_VERSION_NAME, "ImplementationVersionName", VR::SH, Exact(1)),
    e(SOURCE_APPLICATION_ENTITY_TITLE, "SourceApplicationEntityTitle", VR::AE, Exact(1)),
    e(PRIVATE_INFORMATION_CREATOR_UID, "PrivateInformationCreatorUID", VR::UI, Exact(1)),
    e(PRIVATE_INFORMATION, "PrivateInformation", VR::OB, Exact(1)),
    e(SPECIFIC_CHARACTER_SET, "SpecificCharacterSet", VR::CS, Unbounded { min: 1, step: 1 }),
    e(IMAGE_TYPE, "ImageType", VR::CS, Unbounded { min: 2, step: 1 }),
    e(INSTANCE_CREATION_DATE, "InstanceCreationDate", VR::DA, Exact(1)),
    e(INSTANCE_CREATION_TIME, "InstanceCreationTime", VR::TM, Exact(1)),
    e(SOP_CLASS_UID, "SOPClassUID", VR::UI, Exact(1)),
    e(SOP_INSTANCE_UID, "SOPInstanceUID", VR::UI, Exact(1)),
    e(STUDY_DATE, "StudyDate", VR::DA, Exact(1)),
    e(SERIES_DATE, "SeriesDate", VR::DA, Exact(1)),
    e(ACQUISITION_DATE, "AcquisitionDate", VR::DA, Exact(1)),
    e(CONTENT_DATE, "ContentDate", VR::DA, Exact(1)),
    e(ACQUISITION_DATE_TIME, "AcquisitionDateTime", VR::DT, Exact(1)),
    e(STUDY_TIME, "StudyTime", VR::TM, Exact(1)),
    e(SERIES_TIME, "SeriesTime", VR::TM, Exact(1)),
    e(ACQUISITION_TIME, "AcquisitionTime", VR::TM, Exact(1)),
    e(CONTENT_TIME, "ContentTime", VR::TM, Exact(1)),
    e(ACCESSION_NUMBER, "AccessionNumber", VR::SH, Exact(1)),
    e(MODALITY, "Modality", VR::CS, Exact(1)),
    e(CONVERSION_TYPE, "ConversionType", VR::CS, Exact(1)),
    e(MANUFACTURER, "Manufacturer", VR::LO, Exact(1)),
    e(INSTITUTION_NAME, "InstitutionName", VR::LO, Exact(1)),
    e(REFERRING_PHYSICIAN_NAME, "ReferringPhysicianName", VR::PN, Exact(1)),
    e(CODE_VALUE, "CodeValue", VR::SH, Exact(1)),
    e(CODING_SCHEME_DESIGNATOR, "CodingSchemeDesignator", VR::SH, Exact(1)),
    e(CODE_MEANING, "CodeMeaning", VR::LO, Exact(1)),
    e(STATION_NAME, "StationName", VR::SH, Exact(1)),
    e(STUDY_DESCRIPTION, "StudyDescription", VR::LO, Exact(1)),
    e(SERIES_DESCRIPTION, "SeriesDescription", VR::LO, Exact(1)),
    e(INSTITUTIONAL_DEPARTMENT_NAME, "InstitutionalDepartmentName", VR::LO, Exact(1)),
    e(OPERATORS_NAME, "OperatorsName", VR::PN, Unbounded { min: 1, step: 1 }),
    e(MANUFACTURER_MODEL_NAME, "ManufacturerModelName", VR::LO, Exact(1)),
    e(REFERENCED_IMAGE_SEQUENCE, "ReferencedImageSequence", VR::SQ, Exact(1)),
    e(REFERENCED_SOP_CLASS_UID, "ReferencedSOPClassUID", VR::UI, Exact(1)),
    e(REFERENCED_SOP_INSTANCE_UID, "ReferencedSOPInstanceUID", VR::UI, Exact(1)),
    e(DERIVATION_DESCRIPTION, "DerivationDescription", VR::ST, Exact(1)),
    e(PATIENT_NAME, "PatientName", VR::PN, Exact(1)),
    e(PATIENT_ID, "PatientID", VR::LO, Exact(1)),
    e(PATIENT_BIRTH_DATE, "PatientBirthDate", VR::DA, Exact(1)),
    e(PATIENT_SEX, "PatientSex", VR::CS, Exact(1)),
    e(PATIENT_AGE, "PatientAge", VR::AS, Exact(1)),
    e(PATIENT_SIZE, "PatientSize", VR::DS, Exact(1)),
    e(PATIENT_WEIGHT, "PatientWeight", VR::DS, Exact(1)),
    e(BODY_PART_EXAMINED, "BodyPartExamined", VR::CS, Exact(1)),
    e(SCANNING_SEQUENCE, "ScanningSequence", VR::CS, Unbounded { min: 1, step: 1 }),
    e(SEQUENCE_VARIANT, "SequenceVariant", VR::CS, Unbounded { min: 1, step: 1 }),
    e(SCAN_OPTIONS, "ScanOptions", VR::CS, Unbounded { min: 1, step: 1 }),
    e(MR_ACQUISITION_TYPE, "MRAcquisitionType", VR::CS, Exact(1)),
    e(SLICE_THICKNESS, "SliceThickness", VR::DS, Exact(1)),
    e(KVP, "KVP", VR::DS, Exact(1)),
    e(REPETITION_TIME, "RepetitionTime", VR::DS, Exact(1)),
    e(ECHO_TIME, "EchoTime", VR::DS, Exact(1)),
    e(NUMBER_OF_AVERAGES, "NumberOfAverages", VR::DS, Exact(1)),
    e(IMAGING_FREQUENCY, "ImagingFrequency", VR::DS, Exact(1)),
    e(IMAGED_NUCLEUS, "ImagedNucleus", VR::SH, Exact(1)),
    e(ECHO_NUMBERS, "EchoNumbers", VR::IS, Unbounded { min: 1, step: 1 }),
    e(MAGNETIC_FIELD_STRENGTH, "MagneticFieldStrength", VR::DS, Exact(1)),
    e(SPACING_BETWEEN_SLICES, "SpacingBetweenSlices", VR::DS, Exact(1)),
    e(NUMBER_OF_PHASE_ENCODING_STEPS, "NumberOfPhaseEncodingSteps", VR::IS, Exact(1)),
    e(ECHO_TRAIN_LENGTH, "EchoTrainLength", VR::IS, Exact(1)),
    e(PERCENT_SAMPLING, "PercentSampling", VR::DS, Exact(1)),
    e(PERCENT_PHASE_FIELD_OF_VIEW, "PercentPhaseFieldOfView", VR::DS, Exact(1)),
    e(PIXEL_BANDWIDTH, "PixelBandwidth", VR::DS, Exact(1)),
    e(DEVICE_SERIAL_NUMBER, "DeviceSerialNumber", VR::LO, Exact(1)),
    e(SOFTWARE_VERSIONS, "SoftwareVersions", VR::LO, Unbounded { min: 1, step: 1 }),
    e(PROTOCOL_NAME, "ProtocolName", VR::LO, Exact(1)),
    e(TRIGGER_TIME, "TriggerTime", VR::DS, Exact(1)),
    e(FRAME_TIME, "FrameTime", VR::DS, Exact(1)),
    e(EXPOSURE_TIME, "ExposureTime", VR::IS, Exact(1)),
    e(X_RAY_TUBE_CURRENT, "XRayTubeCurrent", VR::IS, Exact(1)),
    e(EXPOSURE, "Exposure", VR::IS, Exact(1)),
    e(RECEIVE_COIL_NAME, "ReceiveCoilName", VR::SH, Exact(1)),
    e(TRANSMIT_COIL_NAME, "TransmitCoilName", VR::SH, Exact(1)),
    e(IN_PLANE_PHASE_ENCODING_DIRECTION, "InPlanePhaseEncodingDirection", VR::CS, Exact(1)),
    e(FLIP_ANGLE, "FlipAngle", VR::DS, Exact(1)),
    e(SAR, "SAR", VR::DS, Exact(1)),
    e(DB_DT, "dBdt", VR::DS, Exact(1)),
    e(PATIENT_POSITION, "PatientPosition", VR::CS, Exact(1)),
    e(SEQUENCE_OF_ULTRASOUND_REGIONS, "SequenceOfUltrasoundRegions", VR::SQ, Exact(1)),
    e(ACQUISITION_DURATION, "AcquisitionDuration", VR::FD, Exact(1)),
    e(DIFFUSION_B_VALUE, "DiffusionBValue", VR::FD, Exact(1)),
    e(DIFFUSION_GRADIENT_ORIENTATION, "DiffusionGradientOrientation", VR::FD, Exact(3)),
    e(STUDY_INSTANCE_UID, "StudyInstanceUID", VR::UI, Exact(1)),
    e(SERIES_INSTANCE_UID, "SeriesInstanceUID", VR::UI, Exact(1)),
    e(STUDY_ID, "StudyID", VR::SH, Exact(1)),
    e(SERIES_NUMBER, "SeriesNumber", VR::IS, Exact(1)),
    e(ACQUISITION_NUMBER, "AcquisitionNumber", VR::IS, Exact(1)),
    e(INSTANCE_NUMBER, "InstanceNumber", VR::IS, Exact(1)),
    e(PATIENT_ORIENTATION, "PatientOrientation", VR::CS, Exact(2)),
    e(IMAGE_POSITION_PATIENT, "ImagePositionPatient", VR::DS, Exact(3)),
    e(IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient", VR::DS, Exact(6)),
    e(FRAME_OF_REFERENCE_UID, "FrameOfReferenceUID", VR::UI, Exact(1)),
    e(TEMPORAL_POSITION_IDENTIFIER, "TemporalPositionIdentifier", VR::IS, Exact(1)),
    e(NUMBER_OF_TEMPORAL_POSITIONS, "NumberOfTemporalPositions", VR::IS, Exact(1)),
    e(TEMPORAL_RESOLUTION, "TemporalResolution", VR::DS, Exact(1)),
    e(POSITION_REFERENCE_INDICATOR, "PositionReferenceIndicator", VR::LO, Exact(1)),
    e(SLICE_LOCATION, "SliceLocation", VR::DS, Exact(1)),
    e(IMAGE_COMMENTS, "ImageComments", VR::LT, Exact(1)),
    e(TEMPORAL_POSITION_INDEX, "TemporalPositionIndex", VR::UL, Exact(1)),
    e(SAMPLES_PER_PIXEL, "SamplesPerPixel", VR::US, Exact(1)),
    e(PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", VR::CS, Exact(1)),
    e(PLANAR_CONFIGURATION, "PlanarConfiguration", VR::US, Exact(1)),
    e(NUMBER_OF_FRAMES, "NumberOfFrames", VR::IS, Exact(1)),
    e(FRAME_INCREMENT_POINTER, "FrameIncrementPointer", VR::AT, Unbounded { min: 1, step: 1 }),
    e(ROWS, "Rows", VR::US, Exact(1)),
    e(COLUMNS, "Columns", VR::US, Exact(1)),
    e(PIXEL_SPACING, "PixelSpacing", VR::DS, Exact(2)),
    e(BITS_ALLOCATED, "BitsAllocated", VR::US, Exact(1)),
    e(BITS_STORED, "BitsStored", VR::US, Exact(1)),
    e(HIGH_BIT, "HighBit", VR::US, Exact(1)),
    e(PIXEL_REPRESENTATION, "PixelRepresentation", VR::US, Exact(1)),
    e(SMALLEST_IMAGE_PIXEL_VALUE, "SmallestImagePixelValue", VR::US, Exact(1)),
    e(LARGEST_IMAGE_PIXEL_VALUE, "LargestImagePixelValue", VR::US, Exact(1)),
    e(PIXEL_PADDING_VALUE, "PixelPaddingValue", VR::US, Exact(1)),
    e(WINDOW_CENTER, "WindowCenter", VR::DS, Unbounded { min: 1, step: 1 }),
    e(WINDOW_WIDTH, "WindowWidth", VR::DS, Unbounded { min: 1, step: 1 }),
    e(RESCALE_INTERCEPT, "RescaleIntercept", VR::DS, Exact(1)),
    e(RESCALE_SLOPE, "RescaleSlope", VR::DS, Exact(1)),
    e(RESCALE_TYPE, "RescaleType", VR::LO, Exact(1)),
    e(LOSSY_IMAGE_COMPRESSION, "LossyImageCompression", VR::CS, Exact(1)),
    e(LOSSY_IMAGE_COMPRESSION_RATIO, "LossyImageCompressionRatio", VR::DS, Unbounded { min: 1, step: 1 }),
    e(LOSSY_IMAGE_COMPRESSION_METHOD, "LossyImageCompressionMethod", VR::CS, Unbounded { min: 1, step: 1 }),
    e(VOILUT_SEQUENCE, "VOILUTSequence", VR::SQ, Exact(1)),
    e(VALUE_TYPE, "ValueType", VR::CS, Exact(1)),
    e(CONCEPT_NAME_CODE_SEQUENCE, "ConceptNameCodeSequence", VR::SQ, Exact(1)),
    e(TEXT_VALUE, "TextValue", VR::UT, Exact(1)),
    e(CONTENT_SEQUENCE, "ContentSequence", VR::SQ, Exact(1)),
    e(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, "RadiopharmaceuticalInformationSequence", VR::SQ, Exact(1)),
    e(FRAME_REFERENCE_TIME, "FrameReferenceTime", VR::DS, Exact(1)),
    e(IMAGE_INDEX, "ImageIndex", VR::US, Exact(1)),
    e(DOSE_UNITS, "DoseUnits", VR::CS, Exact(1)),
    e(DOSE_TYPE, "DoseType", VR::CS, Exact(1)),
    e(DOSE_SUMMATION_TYPE, "DoseSummationType", VR::CS, Exact(1)),
    e(GRID_FRAME_OFFSET_VECTOR, "GridFrameOffsetVector", VR::DS, Unbounded { min: 2, step: 1 }),
    e(DOSE_GRID_SCALING, "DoseGridScaling", VR::DS, Exact(1)),
    e(STRUCTURE_SET_ROI_SEQUENCE, "StructureSetROISequence", VR::SQ, Exact(1)),
    e(ROI_NUMBER, "ROINumber", VR::IS, Exact(1)),
    e(ROI_NAME, "ROIName", VR::LO, Exact(1)),
    e(ROI_CONTOUR_SEQUENCE, "ROIContourSequence", VR::SQ, Exact(1)),
    e(CONTOUR_SEQUENCE, "ContourSequence", VR::SQ, Exact(1)),
    e(CONTOUR_DATA, "ContourData", VR::DS, Unbounded { min: 3, step: 3 }),
    e(REFERENCED_ROI_NUMBER, "ReferencedROINumber", VR::IS, Exact(1)),
    e(RT_PLAN_LABEL, "RTPlanLabel", VR::SH, Exact(1)),
    e(RT_PLAN_NAME, "RTPlanName", VR::LO, Exact(1)),
    e(RT_PLAN_DESCRIPTION, "RTPlanDescription", VR::ST, Exact(1)),
    e(RT_PLAN_DATE, "RTPlanDate", VR::DA, Exact(1)),
    e(RT_PLAN_TIME, "RTPlanTime", VR::TM, Exact(1)),
    e(RT_PLAN_GEOMETRY, "RTPlanGeometry", VR::CS, Exact(1)),
    e(OVERLAY_ROWS, "OverlayRows", VR::US, Exact(1)),
    e(OVERLAY_COLUMNS, "OverlayColumns", VR::US, Exact(1)),
    e(OVERLAY_DATA, "OverlayData", VR::OW, Exact(1)),
    e(FLOAT_PIXEL_DATA, "FloatPixelData", VR::OF, Exact(1)),
    e(DOUBLE_FLOAT_PIXEL_DATA, "DoubleFloatPixelData", VR::OD, Exact(1)),
    e(PIXEL_DATA, "PixelData", VR::OW, Exact(1)),
];
