//! Conversion of in-memory data sets into data set tokens.
use dcmio_core::dataset::Sequence;
use dcmio_core::{DataElementHeader, DataSet, ElementBuffer, Entry, Length, PixelFragments, VR};
use dcmio_parser::dataset::DataToken;
use std::collections::VecDeque;
use std::fmt;

/// Size of an item or delimiter header.
const ITEM_HEADER_LEN: u64 = 8;

/// How to write the length of sequences and their items.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum SequenceLength {
    /// Undefined length, closed with delimitation items.
    #[default]
    Undefined,
    /// Explicit length, computed from the encoded size of the content.
    Explicit,
}

/// A stream of tokens from a DICOM data set.
pub struct DataSetTokens<'a> {
    /// tokens of the last expanded entry, in order
    tokens_pending: VecDeque<DataToken>,
    /// the entries of the data set in order
    entries: Box<dyn Iterator<Item = &'a Entry> + 'a>,
    sequence_length: SequenceLength,
    explicit_vr: bool,
}

impl fmt::Debug for DataSetTokens<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DataSetTokens")
            .field("tokens_pending", &self.tokens_pending)
            .field("sequence_length", &self.sequence_length)
            .field("explicit_vr", &self.explicit_vr)
            .finish_non_exhaustive()
    }
}

impl<'a> DataSetTokens<'a> {
    /// Create a token stream over the given data set.
    ///
    /// `explicit_vr` is only used to compute explicit sequence lengths.
    pub fn new(data_set: &'a DataSet, sequence_length: SequenceLength, explicit_vr: bool) -> Self {
        DataSetTokens {
            tokens_pending: VecDeque::new(),
            entries: Box::new(data_set.iter()),
            sequence_length,
            explicit_vr,
        }
    }

    fn expand_entry(&mut self, entry: &Entry) {
        let mut out = Vec::new();
        entry_tokens(entry, self.sequence_length, self.explicit_vr, &mut out);
        self.tokens_pending.extend(out);
    }
}

impl<'a> Iterator for DataSetTokens<'a> {
    type Item = DataToken;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.tokens_pending.pop_front() {
            return Some(token);
        }

        let entry = self.entries.next()?;
        self.expand_entry(entry);
        self.tokens_pending.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // 2 tokens per element left at least
        (
            self.tokens_pending.len() + self.entries.size_hint().0 * 2,
            None,
        )
    }
}

fn entry_tokens(
    entry: &Entry,
    sequence_length: SequenceLength,
    explicit_vr: bool,
    out: &mut Vec<DataToken>,
) {
    match entry {
        Entry::Element(e) => element_tokens(e, out),
        Entry::Sequence(seq) => sequence_tokens(seq, sequence_length, explicit_vr, out),
        Entry::Fragments(_, fragments) => fragment_tokens(fragments, out),
    }
}

fn element_tokens(e: &ElementBuffer, out: &mut Vec<DataToken>) {
    out.push(DataToken::ElementHeader(DataElementHeader::new(
        e.tag(),
        e.vr(),
        Length(e.len() as u32),
    )));
    out.push(DataToken::PrimitiveValue(e.bytes().to_vec()));
}

fn sequence_tokens(
    seq: &Sequence,
    sequence_length: SequenceLength,
    explicit_vr: bool,
    out: &mut Vec<DataToken>,
) {
    let len = match sequence_length {
        SequenceLength::Undefined => Length::UNDEFINED,
        SequenceLength::Explicit => to_length(sequence_value_len(seq.items(), explicit_vr)),
    };
    out.push(DataToken::SequenceStart {
        tag: seq.tag(),
        len,
    });
    for item in seq.items() {
        let item_len = match sequence_length {
            SequenceLength::Undefined => Length::UNDEFINED,
            SequenceLength::Explicit => to_length(data_set_len(item, explicit_vr)),
        };
        out.push(DataToken::ItemStart { len: item_len });
        for entry in item.iter() {
            entry_tokens(entry, sequence_length, explicit_vr, out);
        }
        out.push(DataToken::ItemEnd);
    }
    out.push(DataToken::SequenceEnd);
}

fn fragment_tokens(fragments: &PixelFragments, out: &mut Vec<DataToken>) {
    out.push(DataToken::PixelSequenceStart {
        vr: fragments.vr(),
    });
    let table = fragments.basic_offset_table();
    out.push(DataToken::ItemStart {
        len: Length(table.len() as u32 * 4),
    });
    out.push(DataToken::OffsetTable(table.to_vec()));
    out.push(DataToken::ItemEnd);
    for fragment in fragments.fragments() {
        out.push(DataToken::ItemStart {
            len: Length(padded(fragment.len() as u64) as u32),
        });
        out.push(DataToken::ItemValue(fragment.clone()));
        out.push(DataToken::ItemEnd);
    }
    out.push(DataToken::SequenceEnd);
}

/// A length which does not fit the length field is left undefined.
fn to_length(len: u64) -> Length {
    match u32::try_from(len) {
        Ok(len) if Length(len).is_defined() => Length(len),
        _ => Length::UNDEFINED,
    }
}

#[inline]
fn padded(len: u64) -> u64 {
    len + len % 2
}

/// The number of bytes of a data set encoded with explicit sequence lengths.
pub(crate) fn data_set_len(data_set: &DataSet, explicit_vr: bool) -> u64 {
    data_set.iter().map(|e| entry_len(e, explicit_vr)).sum()
}

fn sequence_value_len(items: &[DataSet], explicit_vr: bool) -> u64 {
    items
        .iter()
        .map(|item| ITEM_HEADER_LEN + data_set_len(item, explicit_vr))
        .sum()
}

fn entry_len(entry: &Entry, explicit_vr: bool) -> u64 {
    let header_len = u64::from(entry.vr().info().header_len(explicit_vr));
    match entry {
        Entry::Element(e) => header_len + padded(e.len() as u64),
        Entry::Sequence(seq) => {
            u64::from(VR::SQ.info().header_len(explicit_vr))
                + sequence_value_len(seq.items(), explicit_vr)
        }
        Entry::Fragments(_, fragments) => {
            // encapsulated pixel data is always of undefined length
            header_len
                + ITEM_HEADER_LEN
                + fragments.basic_offset_table().len() as u64 * 4
                + fragments
                    .fragments()
                    .iter()
                    .map(|f| ITEM_HEADER_LEN + padded(f.len() as u64))
                    .sum::<u64>()
                + ITEM_HEADER_LEN
        }
    }
}
