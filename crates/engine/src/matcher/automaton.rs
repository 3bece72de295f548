use crate::IdentifierSet;
use aho_corasick::{AhoCorasick, BuildError, MatchKind};

/// One automaton over every identifier, fed each name in a single pass.
pub(crate) struct Automaton {
    automaton: AhoCorasick,
}
impl Automaton {
    pub(crate) fn new(identifiers: &IdentifierSet) -> Result<Self, BuildError> {
        // Overlapping search needs standard semantics: a shorter identifier
        // inside a longer one must still be reported.
        let automaton =
            AhoCorasick::builder().match_kind(MatchKind::Standard).build(identifiers.iter().map(|i| i.as_str()))?;
        Ok(Self { automaton })
    }

    pub(crate) fn find(&self, name: &str, hits: &mut Vec<usize>) {
        hits.extend(self.automaton.find_overlapping_iter(name).map(|m| m.pattern().as_usize()));
    }
}
