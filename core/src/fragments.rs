//! Encapsulated pixel data: fragments and frame offset tables.
//!
//! In a file, encapsulated pixel data is a list of items.
//! The first one is the basic offset table,
//! holding the position of each frame's first fragment item
//! relative to the first fragment item (so item headers count),
//! and the remaining items are the compressed fragments.
//!
//! Frame resolution works over the *payload*,
//! the concatenation of all fragment bytes without item headers.
//! An [`OffsetTable`] for `N` frames holds the `N-1` payload offsets
//! at which frames `1..N` start.

use smallvec::SmallVec;
use snafu::{ensure, Backtrace, Snafu};
use std::borrow::Cow;
use std::ops::Range;

use crate::error::{ErrorKind, Kind};
use crate::header::VR;

/// Size of a fragment item header (tag and length).
const ITEM_HEADER_LEN: u64 = 8;

/// Failure to attribute fragments to frames.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum FragmentsError {
    /// The offset table does not describe the frames.
    #[snafu(display("Corrupted offset table: {}", reason))]
    CorruptedOffsetTable {
        reason: String,
        backtrace: Backtrace,
    },
    /// The requested frame does not exist.
    #[snafu(display("Frame #{} out of bounds ({} frames)", index, frames))]
    FrameOutOfBounds {
        index: u32,
        frames: u32,
        backtrace: Backtrace,
    },
}

impl Kind for FragmentsError {
    fn kind(&self) -> ErrorKind {
        match self {
            FragmentsError::CorruptedOffsetTable { .. } => ErrorKind::CorruptedOffsetTable,
            FragmentsError::FrameOutOfBounds { .. } => ErrorKind::InvalidInput,
        }
    }
}

type Result<T, E = FragmentsError> = std::result::Result<T, E>;

/// Frame boundaries within the fragment payload.
///
/// For `N` frames the table has exactly `N-1` strictly increasing entries.
/// Frame `i` covers `[offset[i-1] (0 if i = 0), offset[i] or end of payload)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffsetTable {
    entries: Vec<u32>,
}

impl OffsetTable {
    /// Create a table from the payload offsets of frames `1..N`.
    pub fn new(entries: Vec<u32>) -> Self {
        OffsetTable { entries }
    }

    /// The payload offsets of frames `1..N`.
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// The number of frames described by this table.
    pub fn frame_count(&self) -> u32 {
        self.entries.len() as u32 + 1
    }

    /// Check that the table describes `frames` frames
    /// within a payload of `payload_len` bytes.
    pub fn validate(&self, frames: u32, payload_len: u64) -> Result<()> {
        ensure!(
            frames > 0 && self.entries.len() as u64 == u64::from(frames) - 1,
            CorruptedOffsetTableSnafu {
                reason: format!(
                    "{} entries for {} frames",
                    self.entries.len(),
                    frames
                ),
            }
        );
        let mut last = 0u64;
        for &e in &self.entries {
            let e = u64::from(e);
            ensure!(
                e > last && e < payload_len,
                CorruptedOffsetTableSnafu {
                    reason: format!(
                        "offset {} is not after {} and within {} payload bytes",
                        e, last, payload_len
                    ),
                }
            );
            last = e;
        }
        Ok(())
    }

    /// The payload byte range of frame `index`.
    pub fn frame_range(&self, index: u32, payload_len: u64) -> Result<Range<u64>> {
        let frames = self.frame_count();
        ensure!(index < frames, FrameOutOfBoundsSnafu { index, frames });
        self.validate(frames, payload_len)?;
        let i = index as usize;
        let start = if i == 0 { 0 } else { u64::from(self.entries[i - 1]) };
        let end = self
            .entries
            .get(i)
            .map(|&e| u64::from(e))
            .unwrap_or(payload_len);
        Ok(start..end)
    }
}

/// The value of an encapsulated pixel data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFragments {
    vr: VR,
    basic_offset_table: SmallVec<[u32; 2]>,
    fragments: SmallVec<[Vec<u8>; 2]>,
}

impl PixelFragments {
    /// Create encapsulated pixel data from its parts, as found in a file.
    pub fn new<T, F>(vr: VR, basic_offset_table: T, fragments: F) -> Self
    where
        T: Into<SmallVec<[u32; 2]>>,
        F: Into<SmallVec<[Vec<u8>; 2]>>,
    {
        PixelFragments {
            vr,
            basic_offset_table: basic_offset_table.into(),
            fragments: fragments.into(),
        }
    }

    /// Encapsulate a list of encoded frames.
    ///
    /// Each frame is padded to an even length
    /// and split into fragments of at most `fragment_size` bytes
    /// (`None` for one fragment per frame).
    /// The basic offset table is filled in.
    pub fn from_frames<I>(frames: I, fragment_size: Option<u32>) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let fragment_size = fragment_size
            .map(|s| (s.max(2) & !1) as usize)
            .unwrap_or(usize::MAX);
        let mut bot = SmallVec::new();
        let mut fragments = SmallVec::new();
        let mut position = 0u64;
        for mut frame in frames {
            if frame.len() % 2 == 1 {
                frame.push(0);
            }
            bot.push(position as u32);
            if frame.len() <= fragment_size {
                position += ITEM_HEADER_LEN + frame.len() as u64;
                fragments.push(frame);
            } else {
                for chunk in frame.chunks(fragment_size) {
                    position += ITEM_HEADER_LEN + chunk.len() as u64;
                    fragments.push(chunk.to_vec());
                }
            }
        }
        PixelFragments {
            vr: VR::OB,
            basic_offset_table: bot,
            fragments,
        }
    }

    /// The element's value representation (OB or OW).
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The basic offset table as stored in the file:
    /// item-relative positions of each frame's first fragment.
    pub fn basic_offset_table(&self) -> &[u32] {
        &self.basic_offset_table
    }

    /// The compressed fragments, in order.
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Total number of payload bytes.
    pub fn payload_len(&self) -> u64 {
        self.fragments.iter().map(|f| f.len() as u64).sum()
    }

    /// Derive the frame offset table for `frames` frames.
    ///
    /// With a basic offset table, its `N` entries must start at 0
    /// and point at fragment item boundaries.
    /// Without one, fragments are mapped one to one onto frames,
    /// or all form a single frame.
    pub fn frame_table(&self, frames: u32) -> Result<OffsetTable> {
        ensure!(
            frames > 0,
            CorruptedOffsetTableSnafu {
                reason: "no frames declared"
            }
        );

        if self.basic_offset_table.is_empty() {
            if frames == 1 {
                return Ok(OffsetTable::default());
            }
            ensure!(
                self.fragments.len() as u64 == u64::from(frames),
                CorruptedOffsetTableSnafu {
                    reason: format!(
                        "empty offset table, {} fragments for {} frames",
                        self.fragments.len(),
                        frames
                    ),
                }
            );
            let mut entries = Vec::with_capacity(frames as usize - 1);
            let mut payload = 0u64;
            for f in &self.fragments[..self.fragments.len() - 1] {
                payload += f.len() as u64;
                entries.push(payload as u32);
            }
            let table = OffsetTable::new(entries);
            table.validate(frames, self.payload_len())?;
            return Ok(table);
        }

        ensure!(
            self.basic_offset_table.len() as u64 == u64::from(frames),
            CorruptedOffsetTableSnafu {
                reason: format!(
                    "{} offsets for {} frames",
                    self.basic_offset_table.len(),
                    frames
                ),
            }
        );
        ensure!(
            self.basic_offset_table[0] == 0,
            CorruptedOffsetTableSnafu {
                reason: format!("first offset is {}", self.basic_offset_table[0]),
            }
        );

        // map each item-relative offset onto a payload offset
        let mut entries = Vec::with_capacity(frames as usize - 1);
        let mut item_pos = 0u64;
        let mut payload_pos = 0u64;
        let mut fragments = self.fragments.iter();
        for &offset in &self.basic_offset_table[1..] {
            let offset = u64::from(offset);
            while item_pos < offset {
                match fragments.next() {
                    Some(f) => {
                        item_pos += ITEM_HEADER_LEN + f.len() as u64;
                        payload_pos += f.len() as u64;
                    }
                    None => break,
                }
            }
            ensure!(
                item_pos == offset,
                CorruptedOffsetTableSnafu {
                    reason: format!("offset {} is not at a fragment boundary", offset),
                }
            );
            entries.push(payload_pos as u32);
        }
        let table = OffsetTable::new(entries);
        table.validate(frames, self.payload_len())?;
        Ok(table)
    }

    /// Retrieve the bytes of frame `index` out of `frames`.
    ///
    /// A frame held by a single fragment is borrowed;
    /// a frame spanning several fragments is gathered into a new buffer.
    pub fn frame(&self, index: u32, frames: u32) -> Result<Cow<'_, [u8]>> {
        ensure!(index < frames, FrameOutOfBoundsSnafu { index, frames });
        let table = self.frame_table(frames)?;
        let range = table.frame_range(index, self.payload_len())?;
        Ok(PayloadCursor::default().take(&self.fragments, range))
    }

    /// Retrieve the bytes of all `frames` frames,
    /// resolving the offset table once.
    pub fn frames(&self, frames: u32) -> Result<Vec<Cow<'_, [u8]>>> {
        let table = self.frame_table(frames)?;
        let payload_len = self.payload_len();
        let mut cursor = PayloadCursor::default();
        let mut start = 0u64;
        let mut out = Vec::with_capacity(table.entries().len() + 1);
        for end in table
            .entries()
            .iter()
            .map(|&e| u64::from(e))
            .chain(std::iter::once(payload_len))
        {
            out.push(cursor.take(&self.fragments, start..end));
            start = end;
        }
        Ok(out)
    }
}

/// Position in the fragment list, moving forward over increasing ranges.
#[derive(Debug, Default)]
struct PayloadCursor {
    fragment: usize,
    /// payload offset of `fragment`
    pos: u64,
}

impl PayloadCursor {
    fn take<'a>(&mut self, fragments: &'a [Vec<u8>], range: Range<u64>) -> Cow<'a, [u8]> {
        let mut pieces: SmallVec<[&[u8]; 2]> = SmallVec::new();
        while let Some(f) = fragments.get(self.fragment) {
            let f_start = self.pos;
            let f_end = f_start + f.len() as u64;
            if f_start >= range.end {
                break;
            }
            if f_end > range.start {
                let from = range.start.saturating_sub(f_start) as usize;
                let to = (range.end.min(f_end) - f_start) as usize;
                pieces.push(&f[from..to]);
            }
            if f_end > range.end {
                // the next range starts inside this fragment
                break;
            }
            self.fragment += 1;
            self.pos = f_end;
        }
        match pieces.len() {
            0 => Cow::Borrowed(&[][..]),
            1 => Cow::Borrowed(pieces[0]),
            _ => Cow::Owned(pieces.concat()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_frames_by_payload_offsets() {
        let table = OffsetTable::new(vec![120]);
        assert_eq!(table.frame_count(), 2);
        assert_eq!(table.frame_range(0, 215).unwrap(), 0..120);
        assert_eq!(table.frame_range(1, 215).unwrap(), 120..215);
    }

    #[test]
    fn two_fragments_two_frames() {
        let frag0: Vec<u8> = (0..120).map(|x| x as u8).collect();
        let frag1: Vec<u8> = (0..95).map(|x| 200 - x as u8).collect();
        // the second fragment item starts after 8 + 120 bytes
        let pixels = PixelFragments::new(VR::OB, vec![0, 128], vec![frag0.clone(), frag1.clone()]);
        let table = pixels.frame_table(2).unwrap();
        assert_eq!(table.entries(), &[120]);
        assert_eq!(&*pixels.frame(0, 2).unwrap(), &frag0[..]);
        assert_eq!(&*pixels.frame(1, 2).unwrap(), &frag1[..]);

        // same result without a basic offset table
        let pixels = PixelFragments::new(VR::OB, vec![], vec![frag0.clone(), frag1.clone()]);
        assert_eq!(pixels.frame_table(2).unwrap().entries(), &[120]);
        assert_eq!(&*pixels.frame(1, 2).unwrap(), &frag1[..]);
    }

    #[test]
    fn frame_spanning_fragments_is_gathered() {
        let pixels = PixelFragments::new(
            VR::OB,
            vec![0, 24],
            vec![vec![1; 4], vec![2; 4], vec![3; 6]],
        );
        let frame0 = pixels.frame(0, 2).unwrap();
        assert!(matches!(frame0, Cow::Owned(_)));
        assert_eq!(&*frame0, &[1, 1, 1, 1, 2, 2, 2, 2]);
        assert!(matches!(pixels.frame(1, 2).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn single_frame_in_many_fragments() {
        let pixels = PixelFragments::new(VR::OB, vec![], vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(&*pixels.frame(0, 1).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn corrupted_tables_are_rejected() {
        let frags = vec![vec![0; 10], vec![0; 10]];
        // wrong entry count
        let pixels = PixelFragments::new(VR::OB, vec![0], frags.clone());
        assert_eq!(
            pixels.frame_table(2).unwrap_err().kind(),
            ErrorKind::CorruptedOffsetTable
        );
        // not on a boundary
        let pixels = PixelFragments::new(VR::OB, vec![0, 12], frags.clone());
        assert_eq!(
            pixels.frame_table(2).unwrap_err().kind(),
            ErrorKind::CorruptedOffsetTable
        );
        // not strictly increasing
        let table = OffsetTable::new(vec![10, 10]);
        assert!(table.validate(3, 30).is_err());
        // fragments cannot be attributed
        let pixels = PixelFragments::new(VR::OB, vec![], frags);
        assert!(pixels.frame_table(3).is_err());
    }

    #[test]
    fn encapsulate_frames() {
        let pixels = PixelFragments::from_frames(vec![vec![9; 5], vec![8; 10]], Some(4));
        assert_eq!(pixels.fragments().len(), 2 + 3);
        assert_eq!(pixels.fragments()[1], vec![9, 0]);
        // 2 fragment items of 4 and 2 bytes precede the second frame
        assert_eq!(pixels.basic_offset_table(), &[0, 8 + 4 + 8 + 2]);
        assert_eq!(&*pixels.frame(0, 2).unwrap(), &[9, 9, 9, 9, 9, 0]);
        assert_eq!(&*pixels.frame(1, 2).unwrap(), &[8; 10][..]);
    }

    #[test]
    fn all_frames_in_one_pass() {
        let frags = vec![vec![1, 2, 3, 4], vec![5, 6], vec![7, 8, 9, 10]];
        // second frame starts at the third item
        let pixels = PixelFragments::new(VR::OB, vec![0, 8 + 4 + 8 + 2], frags.clone());
        let frames = pixels.frames(2).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&*frames[0], &[1, 2, 3, 4, 5, 6]);
        assert!(matches!(frames[1], Cow::Borrowed(_)));
        assert_eq!(&*frames[1], &[7, 8, 9, 10]);

        let pixels = PixelFragments::new(VR::OB, vec![], frags);
        let frames = pixels.frames(3).unwrap();
        let expected: Vec<&[u8]> = vec![&[1, 2, 3, 4], &[5, 6], &[7, 8, 9, 10]];
        assert_eq!(frames, expected);

        assert_eq!(
            pixels.frames(5).unwrap_err().kind(),
            ErrorKind::CorruptedOffsetTable
        );
    }
}
