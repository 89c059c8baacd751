//! JPEG marker codes (ITU-T T.81 Table B.1).
//!
//! Every marker is written as `FF` followed by the code.

/// Start of frame, baseline DCT
pub const SOF0: u8 = 0xC0;
/// Start of frame, extended sequential DCT
pub const SOF1: u8 = 0xC1;
/// Start of frame, progressive DCT
pub const SOF2: u8 = 0xC2;
/// Start of frame, lossless (sequential)
pub const SOF3: u8 = 0xC3;
/// Define Huffman tables
pub const DHT: u8 = 0xC4;
/// Define arithmetic coding conditioning
pub const DAC: u8 = 0xCC;
/// First restart marker; the eight markers are `RST0..=RST7`
pub const RST0: u8 = 0xD0;
/// Last restart marker
pub const RST7: u8 = 0xD7;
/// Start of image
pub const SOI: u8 = 0xD8;
/// End of image
pub const EOI: u8 = 0xD9;
/// Start of scan
pub const SOS: u8 = 0xDA;
/// Define quantization tables
pub const DQT: u8 = 0xDB;
/// Define number of lines
pub const DNL: u8 = 0xDC;
/// Define restart interval
pub const DRI: u8 = 0xDD;
/// Define hierarchical progression
pub const DHP: u8 = 0xDE;
/// Expand reference components
pub const EXP: u8 = 0xDF;
/// First application segment
pub const APP0: u8 = 0xE0;
/// Last application segment
pub const APP15: u8 = 0xEF;
/// Comment
pub const COM: u8 = 0xFE;

/// Whether the marker is one of the restart markers.
#[inline]
pub fn is_rst(marker: u8) -> bool {
    (RST0..=RST7).contains(&marker)
}

/// Whether the marker starts a frame of any coding process.
#[inline]
pub fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && marker != DHT && marker != DAC && marker != 0xC8
}

/// Whether the marker is an application segment or a comment.
#[inline]
pub fn is_skippable(marker: u8) -> bool {
    (APP0..=APP15).contains(&marker) || marker == COM
}

/// A human readable name of the coding process started by an SOF marker.
pub fn process_name(sof: u8) -> &'static str {
    match sof {
        SOF0 => "baseline DCT",
        SOF1 => "extended sequential DCT",
        SOF2 => "progressive DCT",
        SOF3 => "lossless",
        0xC5 => "differential sequential DCT (hierarchical)",
        0xC6 => "differential progressive DCT (hierarchical)",
        0xC7 => "differential lossless (hierarchical)",
        0xC9 => "extended sequential DCT, arithmetic coding",
        0xCA => "progressive DCT, arithmetic coding",
        0xCB => "lossless, arithmetic coding",
        0xCD => "differential sequential DCT, arithmetic coding",
        0xCE => "differential progressive DCT, arithmetic coding",
        0xCF => "differential lossless, arithmetic coding",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_classes() {
        assert!(is_rst(0xD3));
        assert!(!is_rst(SOI));
        assert!(is_sof(SOF0));
        assert!(is_sof(SOF3));
        assert!(is_sof(0xCF));
        assert!(!is_sof(DHT));
        assert!(!is_sof(DAC));
        assert!(is_skippable(0xE1));
        assert!(is_skippable(COM));
        assert!(!is_skippable(DQT));
    }
}
