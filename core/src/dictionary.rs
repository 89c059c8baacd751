//! The DICOM data dictionary collaborator interface.
//!
//! A data dictionary translates tags to attribute information
//! (typical value representation, value multiplicity and alias) and vice versa.
//! Decoding implicit VR content relies on one to recover
//! the value representation of each element.

use crate::header::{Tag, VR};
use std::fmt::Debug;

/// Type trait for a dictionary of DICOM attributes.
///
/// The methods herein have no generic parameters, so as to enable being
/// used as a trait object.
pub trait DataDictionary: Debug {
    /// The type of the dictionary entry.
    type Entry: DictionaryEntry;

    /// Fetch an entry by its usual alias (e.g. "PatientName" or "SOPInstanceUID").
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;

    /// Fetch an entry by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Fetch the typical value representation of an attribute,
    /// falling back to the properties of the tag itself
    /// when the dictionary does not know it:
    /// item-related tags have no VR (`UN`)
    /// and group length elements are `UL`.
    fn vr_of(&self, tag: Tag) -> VR {
        match self.by_tag(tag) {
            Some(entry) => entry.vr(),
            None if tag.is_group_length() => VR::UL,
            None => VR::UN,
        }
    }
}

/// Value multiplicity of an attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// exactly `n` values
    Exact(u32),
    /// between `min` and `max` values (inclusive)
    Range(u32, u32),
    /// at least `min` values, in multiples of `step`
    Unbounded {
        /// minimum number of values
        min: u32,
        /// the number of values must be a multiple of this
        step: u32,
    },
}

/// The dictionary entry data type, representing a DICOM attribute.
pub trait DictionaryEntry {
    /// The attribute tag.
    fn tag(&self) -> Tag;
    /// The alias of the attribute, with no spaces, usually in UpperCamelCase.
    fn alias(&self) -> &str;
    /// The _typical_ value representation of the attribute.
    fn vr(&self) -> VR;
    /// The value multiplicity of the attribute.
    fn vm(&self) -> Multiplicity;
}

/// A data type for a dictionary entry with a string slice for its alias.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DictionaryEntryRef<'a> {
    /// The attribute tag
    pub tag: Tag,
    /// The alias of the attribute, with no spaces, usually in UpperCamelCase
    pub alias: &'a str,
    /// The _typical_ value representation of the attribute
    pub vr: VR,
    /// The value multiplicity
    pub vm: Multiplicity,
}

impl<'a> DictionaryEntry for DictionaryEntryRef<'a> {
    fn tag(&self) -> Tag {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias
    }
    fn vr(&self) -> VR {
        self.vr
    }
    fn vm(&self) -> Multiplicity {
        self.vm
    }
}

/// An empty dictionary, which does not know any attribute.
///
/// Implicit VR content read with it will have every element
/// as `UN` (or `UL` for group lengths).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StubDataDictionary;

impl DataDictionary for StubDataDictionary {
    type Entry = DictionaryEntryRef<'static>;

    fn by_name(&self, _: &str) -> Option<&DictionaryEntryRef<'static>> {
        None
    }

    fn by_tag(&self, _: Tag) -> Option<&DictionaryEntryRef<'static>> {
        None
    }
}

impl<D: DataDictionary + ?Sized> DataDictionary for &D {
    type Entry = D::Entry;

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        (**self).by_name(name)
    }

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        (**self).by_tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_dictionary_falls_back() {
        let dict = StubDataDictionary;
        assert_eq!(dict.vr_of(Tag(0x0010, 0x0010)), VR::UN);
        assert_eq!(dict.vr_of(Tag(0x0010, 0x0000)), VR::UL);
    }
}
