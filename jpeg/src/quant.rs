//! Quantization tables and the zig-zag coefficient order.

/// Natural (row-major) index of each coefficient in zig-zag order.
#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Luminance quantization table of ITU-T T.81 Table K.1, in natural order.
#[rustfmt::skip]
pub const STD_LUMINANCE: [u16; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Chrominance quantization table of ITU-T T.81 Table K.2, in natural order.
#[rustfmt::skip]
pub const STD_CHROMINANCE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Scale a base table to a quality factor from 1 (worst) to 100 (best),
/// as done by the IJG library.
/// Entries are clamped to `1..=max`
/// (255 when the table must fit in 8-bit DQT entries).
pub fn scaled(base: &[u16; 64], quality: u8, max: u16) -> [u16; 64] {
    let quality = u32::from(quality.clamp(1, 100));
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    };
    let mut table = [0u16; 64];
    for (q, &b) in table.iter_mut().zip(base) {
        let v = (u32::from(b) * scale + 50) / 100;
        *q = v.clamp(1, u32::from(max)) as u16;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &i in &ZIGZAG {
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert_eq!(ZIGZAG[2], 8);
        assert_eq!(ZIGZAG[63], 63);
    }

    #[test]
    fn quality_scaling() {
        assert_eq!(scaled(&STD_LUMINANCE, 50, 255), STD_LUMINANCE);
        assert!(scaled(&STD_LUMINANCE, 100, 255).iter().all(|&q| q == 1));
        // quality 1 saturates 8-bit entries
        let worst = scaled(&STD_LUMINANCE, 1, 255);
        assert!(worst.iter().all(|&q| q == 255));
        let worst16 = scaled(&STD_LUMINANCE, 1, 32767);
        assert_eq!(worst16[0], 800);
        assert_eq!(scaled(&STD_CHROMINANCE, 75, 255)[0], 9);
    }
}
