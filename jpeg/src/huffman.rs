//! Canonical Huffman tables as used by JPEG (ITU-T T.81 Annex C and F.2.2.3).
//!
//! A table is defined by the number of codes of each length (1 to 16 bits)
//! and the list of symbols in order of increasing code length.
//! Codes are assigned canonically from these two lists.

use crate::error::{
    InvalidCodeSnafu, InvalidTableSnafu, Result, UnknownSymbolSnafu, WriteStreamSnafu,
};
use dcmio_encoding::cursor::{BitReader, BitWriter};
use snafu::{ensure, ResultExt};
use std::io::Write;

/// Maximum code length allowed by JPEG.
pub const MAX_CODE_LENGTH: usize = 16;

/// A canonical Huffman code table.
#[derive(Debug, Clone, PartialEq)]
pub struct HuffmanTable {
    counts: [u8; 16],
    symbols: Vec<u8>,
    /// largest code of each length, or -1 (index = length)
    maxcode: [i32; MAX_CODE_LENGTH + 1],
    /// smallest code of each length (index = length)
    mincode: [i32; MAX_CODE_LENGTH + 1],
    /// index in `symbols` of the first symbol of each length
    valptr: [usize; MAX_CODE_LENGTH + 1],
    /// (code, length) by symbol; a length of 0 means no code
    codes: [(u16, u8); 256],
}

impl HuffmanTable {
    /// Build the canonical code for the given code length counts
    /// (`counts[i]` codes of `i + 1` bits) and symbols.
    ///
    /// Fails with `InvalidTable` if the number of symbols
    /// does not match the counts, a symbol is repeated,
    /// or the counts do not describe a prefix code.
    pub fn new(counts: [u8; 16], symbols: &[u8]) -> Result<Self> {
        let total: usize = counts.iter().map(|&c| usize::from(c)).sum();
        ensure!(
            total == symbols.len(),
            InvalidTableSnafu {
                reason: format!("{} codes declared, {} symbols given", total, symbols.len()),
            }
        );
        ensure!(
            total <= 256,
            InvalidTableSnafu {
                reason: format!("{} codes declared", total),
            }
        );

        let mut maxcode = [-1i32; MAX_CODE_LENGTH + 1];
        let mut mincode = [0i32; MAX_CODE_LENGTH + 1];
        let mut valptr = [0usize; MAX_CODE_LENGTH + 1];
        let mut codes = [(0u16, 0u8); 256];

        let mut code = 0u32;
        let mut k = 0usize;
        for len in 1..=MAX_CODE_LENGTH {
            let n = usize::from(counts[len - 1]);
            ensure!(
                code + n as u32 <= 1 << len,
                InvalidTableSnafu {
                    reason: format!("too many codes of length {}", len),
                }
            );
            if n > 0 {
                valptr[len] = k;
                mincode[len] = code as i32;
                for &symbol in &symbols[k..k + n] {
                    ensure!(
                        codes[usize::from(symbol)].1 == 0,
                        InvalidTableSnafu {
                            reason: format!("symbol {:#04X} repeated", symbol),
                        }
                    );
                    codes[usize::from(symbol)] = (code as u16, len as u8);
                    code += 1;
                }
                maxcode[len] = code as i32 - 1;
                k += n;
            }
            code <<= 1;
        }

        Ok(HuffmanTable {
            counts,
            symbols: symbols.to_vec(),
            maxcode,
            mincode,
            valptr,
            codes,
        })
    }

    /// The number of codes of each length, from 1 to 16 bits.
    pub fn counts(&self) -> &[u8; 16] {
        &self.counts
    }

    /// The symbols in order of increasing code length.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// The code and code length assigned to a symbol.
    pub fn code_of(&self, symbol: u8) -> Option<(u16, u8)> {
        match self.codes[usize::from(symbol)] {
            (_, 0) => None,
            c => Some(c),
        }
    }

    /// Read one symbol, walking the canonical code bit by bit.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8> {
        let mut code = 0i32;
        for len in 1..=MAX_CODE_LENGTH {
            code = (code << 1) | reader.read_bit() as i32;
            if code <= self.maxcode[len] {
                let index = self.valptr[len] + (code - self.mincode[len]) as usize;
                return Ok(self.symbols[index]);
            }
        }
        InvalidCodeSnafu {
            offset: reader.position(),
        }
        .fail()
    }

    /// Write the code of one symbol.
    pub fn encode<W: Write>(&self, symbol: u8, writer: &mut BitWriter<W>) -> Result<()> {
        let (code, len) = self.codes[usize::from(symbol)];
        ensure!(len > 0, UnknownSymbolSnafu { symbol });
        writer
            .write_bits(u32::from(code), len)
            .context(WriteStreamSnafu)
    }

    /// Build an optimal table for the given symbol frequencies,
    /// with code lengths limited to 16 bits
    /// (ITU-T T.81 Annex K.2).
    ///
    /// One code point is reserved so that no code consists only of 1-bits.
    /// Symbols of frequency 0 get no code.
    /// If no symbol has a frequency, symbol 0 is given a code.
    pub fn optimal(frequencies: &[u64; 256]) -> Result<Self> {
        // index 256 is the reserved code point
        let mut freq = [0u64; 257];
        freq[..256].copy_from_slice(frequencies);
        if freq[..256].iter().all(|&f| f == 0) {
            freq[0] = 1;
        }
        freq[256] = 1;

        let mut codesize = [0usize; 257];
        let mut others = [-1i32; 257];

        loop {
            // smallest frequency, ties going to the largest symbol
            let mut c1 = -1i32;
            let mut v = u64::MAX;
            for (i, &f) in freq.iter().enumerate() {
                if f > 0 && f <= v {
                    v = f;
                    c1 = i as i32;
                }
            }
            // next smallest
            let mut c2 = -1i32;
            let mut v = u64::MAX;
            for (i, &f) in freq.iter().enumerate() {
                if f > 0 && f <= v && i as i32 != c1 {
                    v = f;
                    c2 = i as i32;
                }
            }
            if c2 < 0 {
                break;
            }
            let (mut c1, mut c2) = (c1 as usize, c2 as usize);

            freq[c1] += freq[c2];
            freq[c2] = 0;

            codesize[c1] += 1;
            while others[c1] >= 0 {
                c1 = others[c1] as usize;
                codesize[c1] += 1;
            }
            others[c1] = c2 as i32;

            codesize[c2] += 1;
            while others[c2] >= 0 {
                c2 = others[c2] as usize;
                codesize[c2] += 1;
            }
        }

        let mut bits = [0usize; 33];
        for &size in codesize.iter().filter(|&&s| s > 0) {
            ensure!(
                size <= 32,
                InvalidTableSnafu {
                    reason: "code length overflow",
                }
            );
            bits[size] += 1;
        }

        // limit code lengths to 16 bits
        for i in (MAX_CODE_LENGTH + 1..=32).rev() {
            while bits[i] > 0 {
                let mut j = i - 2;
                while bits[j] == 0 {
                    j -= 1;
                }
                bits[i] -= 2;
                bits[i - 1] += 1;
                bits[j + 1] += 2;
                bits[j] -= 1;
            }
        }

        // drop the reserved code point, which has the longest code
        let mut i = MAX_CODE_LENGTH;
        while bits[i] == 0 {
            i -= 1;
        }
        bits[i] -= 1;

        let mut counts = [0u8; 16];
        for (len, count) in counts.iter_mut().enumerate() {
            *count = bits[len + 1] as u8;
        }

        let mut symbols = Vec::with_capacity(256);
        for size in 1..=32 {
            for (symbol, &s) in codesize[..256].iter().enumerate() {
                if s == size {
                    symbols.push(symbol as u8);
                }
            }
        }

        HuffmanTable::new(counts, &symbols)
    }

    /// Standard luminance DC table (ITU-T T.81 Table K.3).
    pub fn std_dc_luminance() -> Self {
        Self::standard(STD_DC_LUMINANCE_COUNTS, &STD_DC_SYMBOLS)
    }

    /// Standard chrominance DC table (ITU-T T.81 Table K.4).
    pub fn std_dc_chrominance() -> Self {
        Self::standard(STD_DC_CHROMINANCE_COUNTS, &STD_DC_SYMBOLS)
    }

    /// Standard luminance AC table (ITU-T T.81 Table K.5).
    pub fn std_ac_luminance() -> Self {
        Self::standard(STD_AC_LUMINANCE_COUNTS, &STD_AC_LUMINANCE_SYMBOLS)
    }

    /// Standard chrominance AC table (ITU-T T.81 Table K.6).
    pub fn std_ac_chrominance() -> Self {
        Self::standard(STD_AC_CHROMINANCE_COUNTS, &STD_AC_CHROMINANCE_SYMBOLS)
    }

    fn standard(counts: [u8; 16], symbols: &[u8]) -> Self {
        match HuffmanTable::new(counts, symbols) {
            Ok(table) => table,
            Err(e) => unreachable!("standard Huffman table is invalid: {}", e),
        }
    }
}

const STD_DC_LUMINANCE_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const STD_DC_CHROMINANCE_COUNTS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const STD_DC_SYMBOLS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const STD_AC_LUMINANCE_COUNTS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D];
#[rustfmt::skip]
const STD_AC_LUMINANCE_SYMBOLS: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
    0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
    0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

const STD_AC_CHROMINANCE_COUNTS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
#[rustfmt::skip]
const STD_AC_CHROMINANCE_SYMBOLS: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33, 0x52, 0xF0,
    0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34, 0xE1, 0x25, 0xF1, 0x17, 0x18, 0x19, 0x1A, 0x26,
    0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5,
    0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
    0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA,
    0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];
