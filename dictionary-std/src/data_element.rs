use crate::tags::ENTRIES;
use dcmio_core::dictionary::{DataDictionary, DictionaryEntryRef, Multiplicity};
use dcmio_core::header::Tag;
use dcmio_core::VR;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static DICT: Lazy<StandardDataDictionaryRegistry> = Lazy::new(init_dictionary);

/// Retrieve a singleton instance of the standard dictionary registry.
///
/// Note that one does not generally have to call this.
/// The unit type [`StandardDataDictionary`]
/// already provides a lazy loaded singleton implementing the necessary traits.
#[inline]
pub fn registry() -> &'static StandardDataDictionaryRegistry {
    &DICT
}

/// The data struct actually containing the standard dictionary.
#[derive(Debug)]
pub struct StandardDataDictionaryRegistry {
    /// mapping: name → entry
    by_name: HashMap<&'static str, &'static DictionaryEntryRef<'static>>,
    /// mapping: tag → entry
    by_tag: HashMap<Tag, &'static DictionaryEntryRef<'static>>,
    /// repeating elements of the form (ggxx, eeee). The `xx` portion is zeroed.
    repeating_ggxx: HashSet<Tag>,
}

impl StandardDataDictionaryRegistry {
    fn new() -> StandardDataDictionaryRegistry {
        StandardDataDictionaryRegistry {
            by_name: HashMap::with_capacity(ENTRIES.len()),
            by_tag: HashMap::with_capacity(ENTRIES.len()),
            repeating_ggxx: HashSet::new(),
        }
    }

    /// record the given dictionary entry reference
    fn index(&mut self, entry: &'static DictionaryEntryRef<'static>) -> &mut Self {
        self.by_name.insert(entry.alias, entry);
        self.by_tag.insert(entry.tag, entry);
        if is_repeating_group(entry.tag.group()) {
            self.repeating_ggxx.insert(entry.tag);
        }
        self
    }

    /// The number of attributes indexed.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Curve (50xx) and overlay (60xx) groups repeat over even `xx`.
fn is_repeating_group(group: u16) -> bool {
    matches!(group & 0xFF00, 0x5000 | 0x6000)
}

/// Generic Group Length dictionary entry.
static GROUP_LENGTH_ENTRY: DictionaryEntryRef<'static> = DictionaryEntryRef {
    tag: Tag(0x0000, 0x0000),
    alias: "GenericGroupLength",
    vr: VR::UL,
    vm: Multiplicity::Exact(1),
};

/// Generic Private Creator dictionary entry.
static PRIVATE_CREATOR_ENTRY: DictionaryEntryRef<'static> = DictionaryEntryRef {
    tag: Tag(0x0009, 0x0010),
    alias: "PrivateCreator",
    vr: VR::LO,
    vm: Multiplicity::Exact(1),
};

/// A data element dictionary which consults
/// the library's global DICOM attribute registry.
///
/// This is the type which would generally be used
/// whenever a data element dictionary is needed,
/// such as when reading implicit VR content.
///
/// The dictionary index is automatically initialized upon the first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn indexed_tag(tag: Tag) -> Option<&'static DictionaryEntryRef<'static>> {
        let r = registry();

        r.by_tag
            .get(&tag)
            .or_else(|| {
                // check tags repeating in different groups
                let group_trimmed = Tag(tag.0 & 0xFF00, tag.1);
                if r.repeating_ggxx.contains(&group_trimmed) {
                    return r.by_tag.get(&group_trimmed);
                }
                None
            })
            .copied()
            .or_else(|| {
                // check for private creator
                if tag.0 & 1 == 1 && (0x0010..=0x00FF).contains(&tag.1) {
                    return Some(&PRIVATE_CREATOR_ENTRY);
                }
                // check for group length
                if tag.element() == 0x0000 {
                    return Some(&GROUP_LENGTH_ENTRY);
                }

                None
            })
    }
}

impl DataDictionary for StandardDataDictionary {
    type Entry = DictionaryEntryRef<'static>;

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        registry().by_name.get(name).copied()
    }

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        StandardDataDictionary::indexed_tag(tag)
    }
}

fn init_dictionary() -> StandardDataDictionaryRegistry {
    let mut d = StandardDataDictionaryRegistry::new();
    for entry in ENTRIES {
        d.index(entry);
    }
    tracing::trace!("standard dictionary indexed {} attributes", d.len());
    d
}

#[cfg(test)]
mod tests {
    use super::StandardDataDictionary;
    use crate::tags;
    use dcmio_core::dictionary::{DataDictionary, DictionaryEntry, Multiplicity};
    use dcmio_core::header::{Tag, VR};

    #[test]
    fn smoke_test() {
        let dict = StandardDataDictionary;

        let e = dict.by_name("PatientName").unwrap();
        assert_eq!(e.tag(), Tag(0x0010, 0x0010));
        assert_eq!(e.vr(), VR::PN);

        let e = dict.by_tag(tags::MODALITY).unwrap();
        assert_eq!(e.alias(), "Modality");
        assert_eq!(e.vr(), VR::CS);

        let e = dict.by_tag(tags::IMAGE_ORIENTATION_PATIENT).unwrap();
        assert_eq!(e.vm(), Multiplicity::Exact(6));

        assert_eq!(dict.vr_of(tags::PIXEL_DATA), VR::OW);
        assert_eq!(dict.vr_of(Tag(0x0009, 0x1001)), VR::UN);
    }

    #[test]
    fn repeating_overlay_groups() {
        let dict = StandardDataDictionary;
        let e = dict.by_tag(Tag(0x6002, 0x0010)).unwrap();
        assert_eq!(e.alias(), "OverlayRows");
        assert!(dict.by_tag(Tag(0x6102, 0x0010)).is_none());
    }

    #[test]
    fn group_length_and_private_creator() {
        let dict = StandardDataDictionary;
        assert_eq!(
            dict.by_tag(tags::FILE_META_INFORMATION_GROUP_LENGTH)
                .unwrap()
                .alias(),
            "FileMetaInformationGroupLength"
        );
        assert_eq!(
            dict.by_tag(Tag(0x7FE0, 0x0000)).unwrap().alias(),
            "GenericGroupLength"
        );
        assert_eq!(dict.vr_of(Tag(0x0009, 0x0010)), VR::LO);
        assert_eq!(dict.vr_of(Tag(0x00ED, 0x00FF)), VR::LO);
    }

    #[test]
    fn acquisition_and_rt_attributes() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.vr_of(tags::DIFFUSION_B_VALUE), VR::FD);
        assert_eq!(dict.vr_of(tags::SMALLEST_IMAGE_PIXEL_VALUE), VR::US);
        assert_eq!(dict.vr_of(tags::TEMPORAL_POSITION_INDEX), VR::UL);
        assert_eq!(dict.vr_of(tags::ROI_CONTOUR_SEQUENCE), VR::SQ);
        assert_eq!(
            dict.by_name("ContourData").unwrap().vm(),
            Multiplicity::Unbounded { min: 3, step: 3 }
        );
        assert_eq!(dict.by_name("dBdt").unwrap().tag(), Tag(0x0018, 0x1318));
    }

    #[test]
    fn tags_and_names_are_unique() {
        let names: std::collections::HashSet<_> =
            crate::tags::ENTRIES.iter().map(|e| e.alias).collect();
        assert_eq!(names.len(), crate::tags::ENTRIES.len());
        assert_eq!(super::registry().len(), crate::tags::ENTRIES.len());
    }
}
