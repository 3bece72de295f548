use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An opaque, case-sensitive case identifier.
///
/// Always non-empty and trimmed; otherwise kept verbatim, so `00123` stays
/// `00123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);
impl Identifier {
    /// Trims `raw`, returning `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordered, de-duplicated identifiers for one run.
///
/// The first occurrence of a value wins and input order is otherwise kept, so
/// outcomes are reported in the order the operator listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    identifiers: Vec<Identifier>,
}
impl IdentifierSet {
    /// Normalizes raw values: trims each, drops blanks and repeats.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();
        let mut repeated = 0usize;
        for value in raw {
            let Some(identifier) = Identifier::new(value.as_ref()) else {
                continue;
            };
            if seen.insert(identifier.clone()) {
                identifiers.push(identifier);
            } else {
                repeated += 1;
            }
        }
        if repeated > 0 {
            tracing::info!(repeated, kept = identifiers.len(), "Dropped repeated identifiers");
        }
        Self { identifiers }
    }

    /// Keeps only the first `limit` identifiers, if a limit is given.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit
            && limit < self.identifiers.len()
        {
            tracing::info!(limit, total = self.identifiers.len(), "Limiting identifiers");
            self.identifiers.truncate(limit);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.identifiers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Identifier> {
        self.identifiers.get(index)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.identifiers.iter().any(|i| i.as_str() == value)
    }
}
impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;
    fn into_iter(self) -> Self::IntoIter {
        self.identifiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn values(set: &IdentifierSet) -> Vec<&str> {
        set.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn test_repeated_input_keeps_first_occurrence() {
        let set = IdentifierSet::from_raw(["00123", "00123", "00456"]);
        assert_eq!(values(&set), vec!["00123", "00456"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let set = IdentifierSet::from_raw(["300", "100", "200", "100"]);
        assert_eq!(values(&set), vec!["300", "100", "200"]);
    }

    #[rstest]
    #[case("  00123 ", Some("00123"))]
    #[case("\t007\n", Some("007"))]
    #[case("AbC-9", Some("AbC-9"))]
    #[case("   ", None)]
    #[case("", None)]
    fn test_identifier_new(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(Identifier::new(raw).as_ref().map(Identifier::as_str), expected);
    }

    #[test]
    fn test_trimmed_values_collapse() {
        let set = IdentifierSet::from_raw([" 42", "42 ", "", "  "]);
        assert_eq!(values(&set), vec!["42"]);
    }

    #[test]
    fn test_case_sensitive() {
        let set = IdentifierSet::from_raw(["abc", "ABC"]);
        assert_eq!(set.len(), 2);
    }

    #[rstest]
    #[case(None, 3)]
    #[case(Some(2), 2)]
    #[case(Some(10), 3)]
    fn test_limit(#[case] limit: Option<usize>, #[case] expected: usize) {
        let set = IdentifierSet::from_raw(["a", "b", "c"]).limit(limit);
        assert_eq!(set.len(), expected);
        assert_eq!(set.get(0).map(Identifier::as_str), Some("a"));
    }
}
