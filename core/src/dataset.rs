//! The in-memory DICOM data set: an ordered map from tag to entry,
//! where an entry is a primitive element buffer,
//! a sequence of nested data sets,
//! or encapsulated pixel data.

use crate::buffer::{ElementBuffer, Result, TagNotFoundSnafu, WrongVrSnafu};
use crate::charset::SpecificCharacterSet;
use crate::fragments::PixelFragments;
use crate::header::{tags, GroupNumber, Tag, VR};
use std::collections::btree_map::{self, BTreeMap};
use std::ops::RangeInclusive;

/// A data set entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A primitive value held in an element buffer.
    Element(ElementBuffer),
    /// A sequence (SQ) of nested data sets.
    Sequence(Sequence),
    /// Encapsulated pixel data.
    Fragments(Tag, PixelFragments),
}

impl Entry {
    /// The entry's tag.
    pub fn tag(&self) -> Tag {
        match self {
            Entry::Element(e) => e.tag(),
            Entry::Sequence(s) => s.tag,
            Entry::Fragments(tag, _) => *tag,
        }
    }

    /// The entry's value representation.
    pub fn vr(&self) -> VR {
        match self {
            Entry::Element(e) => e.vr(),
            Entry::Sequence(_) => VR::SQ,
            Entry::Fragments(_, f) => f.vr(),
        }
    }
}

impl From<ElementBuffer> for Entry {
    fn from(e: ElementBuffer) -> Self {
        Entry::Element(e)
    }
}

/// A sequence element: a list of nested data sets (items).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    tag: Tag,
    items: Vec<DataSet>,
}

impl Sequence {
    /// Create a sequence with the given items.
    pub fn new(tag: Tag, items: Vec<DataSet>) -> Self {
        Sequence { tag, items }
    }

    /// The sequence's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The sequence items.
    pub fn items(&self) -> &[DataSet] {
        &self.items
    }

    /// Mutable access to the sequence items.
    pub fn items_mut(&mut self) -> &mut Vec<DataSet> {
        &mut self.items
    }
}

/// A DICOM data set.
///
/// Tags are unique and iterate in ascending (group, element) order.
/// Inserting an entry with an existing tag replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    entries: BTreeMap<Tag, Entry>,
}

impl DataSet {
    /// Create an empty data set.
    pub fn new() -> Self {
        DataSet::default()
    }

    /// The number of entries at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the data set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with the given tag exists.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Retrieve any entry by tag.
    pub fn entry(&self, tag: Tag) -> Option<&Entry> {
        self.entries.get(&tag)
    }

    /// Retrieve a primitive element by tag.
    ///
    /// Fails with `TagNotFound` if absent,
    /// or `WrongVr` if the tag holds a sequence or pixel fragments.
    pub fn element(&self, tag: Tag) -> Result<&ElementBuffer> {
        match self.entries.get(&tag) {
            Some(Entry::Element(e)) => Ok(e),
            Some(other) => WrongVrSnafu {
                tag,
                vr: other.vr(),
                expected: "a primitive element",
            }
            .fail(),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Retrieve a primitive element by tag for modification.
    pub fn element_mut(&mut self, tag: Tag) -> Result<&mut ElementBuffer> {
        match self.entries.get_mut(&tag) {
            Some(Entry::Element(e)) => Ok(e),
            Some(other) => WrongVrSnafu {
                tag,
                vr: other.vr(),
                expected: "a primitive element",
            }
            .fail(),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Retrieve the items of a sequence element.
    ///
    /// Fails with `WrongVr` if the tag is not a sequence.
    pub fn sequence(&self, tag: Tag) -> Result<&[DataSet]> {
        match self.entries.get(&tag) {
            Some(Entry::Sequence(s)) => Ok(&s.items),
            Some(other) => WrongVrSnafu {
                tag,
                vr: other.vr(),
                expected: "a sequence",
            }
            .fail(),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Retrieve the items of a sequence element for modification.
    pub fn sequence_mut(&mut self, tag: Tag) -> Result<&mut Vec<DataSet>> {
        match self.entries.get_mut(&tag) {
            Some(Entry::Sequence(s)) => Ok(&mut s.items),
            Some(other) => WrongVrSnafu {
                tag,
                vr: other.vr(),
                expected: "a sequence",
            }
            .fail(),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Retrieve the encapsulated pixel data under the given tag.
    pub fn fragments(&self, tag: Tag) -> Result<&PixelFragments> {
        match self.entries.get(&tag) {
            Some(Entry::Fragments(_, f)) => Ok(f),
            Some(other) => WrongVrSnafu {
                tag,
                vr: other.vr(),
                expected: "encapsulated pixel data",
            }
            .fail(),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Insert an entry, returning the one previously under the same tag.
    pub fn put_entry(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.tag(), entry)
    }

    /// Insert a primitive element,
    /// returning the entry previously under the same tag.
    pub fn put(&mut self, element: ElementBuffer) -> Option<Entry> {
        self.put_entry(Entry::Element(element))
    }

    /// Create or replace a primitive element from raw bytes.
    pub fn set_element(&mut self, tag: Tag, vr: VR, bytes: Vec<u8>) -> Option<Entry> {
        self.put(ElementBuffer::new(tag, vr, bytes))
    }

    /// Create or replace a sequence element.
    pub fn put_sequence(&mut self, tag: Tag, items: Vec<DataSet>) -> Option<Entry> {
        self.put_entry(Entry::Sequence(Sequence::new(tag, items)))
    }

    /// Create or replace encapsulated pixel data.
    pub fn put_fragments(&mut self, tag: Tag, fragments: PixelFragments) -> Option<Entry> {
        self.put_entry(Entry::Fragments(tag, fragments))
    }

    /// Remove an entry, returning it if it existed.
    pub fn remove(&mut self, tag: Tag) -> Option<Entry> {
        self.entries.remove(&tag)
    }

    /// Remove an entry, failing with `TagNotFound` if it did not exist.
    pub fn take(&mut self, tag: Tag) -> Result<Entry> {
        match self.entries.remove(&tag) {
            Some(e) => Ok(e),
            None => TagNotFoundSnafu { tag }.fail(),
        }
    }

    /// Iterate over all entries in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.values()
    }

    /// Iterate over the tags in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.keys().copied()
    }

    /// The entries of one group, in ascending order.
    pub fn group(&self, group: GroupNumber) -> DataGroup<'_> {
        DataGroup {
            group,
            range: self.entries.range(group_range(group)),
        }
    }

    /// Iterate over groups in ascending order.
    pub fn groups(&self) -> Groups<'_> {
        Groups {
            dataset: self,
            next: self.entries.keys().next().map(|t| t.group()),
        }
    }

    /// The deepest sequence nesting level in this data set
    /// (0 if there are no sequences).
    pub fn depth(&self) -> u32 {
        self.entries
            .values()
            .filter_map(|e| match e {
                Entry::Sequence(s) => {
                    Some(1 + s.items.iter().map(DataSet::depth).max().unwrap_or(0))
                }
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// The first value of an element as an unsigned integer.
    pub fn uint(&self, tag: Tag) -> Result<u32> {
        self.element(tag)?.to_u32()
    }

    /// The first value of a text element.
    pub fn string(&self, tag: Tag) -> Result<&str> {
        self.element(tag)?.string()
    }

    /// The character set declared by Specific Character Set (0008,0005),
    /// or the default character set when absent or not recognized.
    pub fn charset(&self) -> SpecificCharacterSet {
        self.element(tags::SPECIFIC_CHARACTER_SET)
            .ok()
            .and_then(|e| e.string().ok().and_then(SpecificCharacterSet::from_code))
            .unwrap_or_default()
    }
}

fn group_range(group: GroupNumber) -> RangeInclusive<Tag> {
    Tag(group, 0x0000)..=Tag(group, 0xFFFF)
}

/// The entries of a data set sharing one group number.
#[derive(Debug, Clone)]
pub struct DataGroup<'a> {
    group: GroupNumber,
    range: btree_map::Range<'a, Tag, Entry>,
}

impl<'a> DataGroup<'a> {
    /// The group number.
    pub fn group(&self) -> GroupNumber {
        self.group
    }
}

impl<'a> Iterator for DataGroup<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|(_, e)| e)
    }
}

/// Iterator over the groups of a data set.
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    dataset: &'a DataSet,
    next: Option<GroupNumber>,
}

impl<'a> Iterator for Groups<'a> {
    type Item = DataGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.next?;
        self.next = match group.checked_add(1) {
            Some(g) => self
                .dataset
                .entries
                .range(Tag(g, 0)..)
                .next()
                .map(|(t, _)| t.group()),
            None => None,
        };
        Some(self.dataset.group(group))
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Entry;
    type IntoIter = btree_map::Values<'a, Tag, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

impl IntoIterator for DataSet {
    type Item = Entry;
    type IntoIter = btree_map::IntoValues<Tag, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl Extend<Entry> for DataSet {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for e in iter {
            self.put_entry(e);
        }
    }
}

impl Extend<ElementBuffer> for DataSet {
    fn extend<I: IntoIterator<Item = ElementBuffer>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(Entry::Element))
    }
}

impl FromIterator<Entry> for DataSet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut ds = DataSet::new();
        ds.extend(iter);
        ds
    }
}

impl FromIterator<ElementBuffer> for DataSet {
    fn from_iter<I: IntoIterator<Item = ElementBuffer>>(iter: I) -> Self {
        iter.into_iter().map(Entry::Element).collect()
    }
}
