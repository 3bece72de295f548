use crate::IdentifierSet;
use memchr::memmem::Finder;
use std::collections::BTreeMap;

/// Identifiers grouped by byte length.
///
/// A name is only tested against identifiers no longer than itself; each
/// test stops at the first occurrence, but every identifier is still tried.
pub(crate) struct Bucket {
    by_length: BTreeMap<usize, Vec<(usize, Finder<'static>)>>,
}
impl Bucket {
    pub(crate) fn new(identifiers: &IdentifierSet) -> Self {
        let mut by_length: BTreeMap<usize, Vec<_>> = BTreeMap::new();
        for (index, identifier) in identifiers.iter().enumerate() {
            let needle = identifier.as_str().as_bytes();
            by_length.entry(needle.len()).or_default().push((index, Finder::new(needle).into_owned()));
        }
        Self { by_length }
    }

    pub(crate) fn find(&self, name: &str, hits: &mut Vec<usize>) {
        let haystack = name.as_bytes();
        for bucket in self.by_length.range(..=haystack.len()).map(|(_, bucket)| bucket) {
            hits.extend(bucket.iter().filter(|(_, finder)| finder.find(haystack).is_some()).map(|(index, _)| *index));
        }
    }
}
