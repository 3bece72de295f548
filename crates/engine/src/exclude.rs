use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use globset::{GlobBuilder, GlobMatcher};

struct Pattern {
    raw: String,
    lowered: String,
    glob: GlobMatcher,
}

/// Folder-name exclusion patterns.
///
/// A name is excluded when, ignoring case, it matches a pattern as a
/// whole-name glob (`*`, `?`, `[...]`) **or** contains the pattern as a plain
/// substring. The first pattern that applies wins.
#[derive(Default)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}
impl ExclusionFilter {
    /// Compiles `patterns`. Surrounding whitespace is ignored and blank
    /// patterns are dropped.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            let raw = pattern.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(raw)
                .case_insensitive(true)
                .build()
                .or_raise(|| ErrorKind::Pattern(raw.to_string()))?
                .compile_matcher();
            compiled.push(Pattern { raw: raw.to_string(), lowered: raw.to_lowercase(), glob });
        }
        Ok(Self { patterns: compiled })
    }

    /// Returns the first pattern excluding `name`, if any.
    pub fn matches(&self, name: &str) -> Option<&str> {
        if self.patterns.is_empty() {
            return None;
        }
        let lowered = name.to_lowercase();
        self.patterns
            .iter()
            .find(|p| p.glob.is_match(name) || lowered.contains(&p.lowered))
            .map(|p| p.raw.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Case_00123_OLD", Some("*_old"))]
    #[case("backup of Case_1", Some("backup*"))]
    #[case("Case_1_TEMP_copy", Some("temp"))]
    #[case("Case_A1", Some("case_?1"))]
    #[case("Case_00123", None)]
    fn test_matches(#[case] name: &str, #[case] expected: Option<&str>) {
        let filter = ExclusionFilter::new(["*_old", "backup*", "temp", "case_?1"]).unwrap();
        assert_eq!(filter.matches(name), expected);
    }

    #[test]
    fn test_first_pattern_wins() {
        let filter = ExclusionFilter::new(["arch", "*archive*"]).unwrap();
        assert_eq!(filter.matches("ARCHIVE_123"), Some("arch"));
    }

    #[test]
    fn test_glob_matches_whole_name_only() {
        let filter = ExclusionFilter::new(["x?z"]).unwrap();
        assert_eq!(filter.matches("xyz"), Some("x?z"));
        assert_eq!(filter.matches("axyzb"), None);
    }

    #[test]
    fn test_blank_patterns_dropped() {
        let filter = ExclusionFilter::new(["", "  ", " tmp "]).unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.matches("my_TMP"), Some("tmp"));
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.matches("anything"), None);
    }

    #[test]
    fn test_invalid_glob() {
        let err = ExclusionFilter::new(["[unclosed"]).err().unwrap();
        assert!(matches!(&*err, ErrorKind::Pattern(p) if p == "[unclosed"));
    }
}
