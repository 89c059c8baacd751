//! Magnitude categories and extra bits of Huffman-coded values
//! (ITU-T T.81 F.1.2.1 and H.1.2.2).

/// Number of bits needed for the magnitude of `value`.
#[inline]
pub fn category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// The extra bits appended after the category code:
/// the value itself if positive, its one's complement otherwise.
#[inline]
pub fn extra_bits(value: i32, category: u8) -> u32 {
    if value < 0 {
        (value - 1) as u32 & ((1u32 << category) - 1)
    } else {
        value as u32
    }
}

/// Recover a value from its category and extra bits.
#[inline]
pub fn extend(bits: u32, category: u8) -> i32 {
    if category == 0 {
        return 0;
    }
    let bits = bits as i32;
    if bits < 1 << (category - 1) {
        bits - (1 << category) + 1
    } else {
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(-1, 1)]
    #[case(3, 2)]
    #[case(-4, 3)]
    #[case(255, 8)]
    #[case(-2047, 11)]
    #[case(32767, 15)]
    fn categories_and_extension(#[case] value: i32, #[case] cat: u8) {
        assert_eq!(category(value), cat);
        assert_eq!(extend(extra_bits(value, cat), cat), value);
    }
}
