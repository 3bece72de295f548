use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Substring matching algorithm used to pair identifiers with folder names.
///
/// Both variants produce identical results; the choice is a performance knob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    /// Identifiers bucketed by length, tested per folder name.
    #[default]
    Bucket,
    /// Single multi-pattern automaton streamed over each folder name.
    #[serde(alias = "aho")]
    Automaton,
}
impl MatcherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Automaton => "automaton",
        }
    }
}
impl FromStr for MatcherKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "bucket" => Self::Bucket,
            "automaton" | "aho" | "aho-corasick" => Self::Automaton,
            _ => exn::bail!(ErrorKind::UnknownValue { field: "matcher", value: s.to_string() }),
        })
    }
}
impl Display for MatcherKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// What happens to an identifier that matched more than one folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Move every match into `_DUPLICATES/<identifier>/` for manual review.
    #[default]
    Quarantine,
    /// Leave every match in place and report it.
    Skip,
    /// Move every match to the flat destination as if each matched alone.
    MoveAll,
}
impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quarantine => "quarantine",
            Self::Skip => "skip",
            Self::MoveAll => "move-all",
        }
    }
}
impl FromStr for DuplicatePolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "quarantine" => Self::Quarantine,
            "skip" => Self::Skip,
            "move-all" | "moveall" | "move_all" => Self::MoveAll,
            _ => exn::bail!(ErrorKind::UnknownValue { field: "duplicate policy", value: s.to_string() }),
        })
    }
}
impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// What happens when the computed destination is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Append the first free `_1`, `_2`, ... suffix.
    #[default]
    Rename,
    /// Leave the source in place and report the collision.
    Skip,
}
impl CollisionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Skip => "skip",
        }
    }
}
impl FromStr for CollisionPolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "rename" => Self::Rename,
            "skip" => Self::Skip,
            _ => exn::bail!(ErrorKind::UnknownValue { field: "collision policy", value: s.to_string() }),
        })
    }
}
impl Display for CollisionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bucket", MatcherKind::Bucket)]
    #[case("automaton", MatcherKind::Automaton)]
    #[case("aho", MatcherKind::Automaton)]
    #[case(" AHO-Corasick ", MatcherKind::Automaton)]
    fn test_matcher_from_str(#[case] input: &str, #[case] expected: MatcherKind) {
        assert_eq!(input.parse::<MatcherKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("quarantine", DuplicatePolicy::Quarantine)]
    #[case("skip", DuplicatePolicy::Skip)]
    #[case("move-all", DuplicatePolicy::MoveAll)]
    #[case("MOVE_ALL", DuplicatePolicy::MoveAll)]
    fn test_duplicate_policy_from_str(#[case] input: &str, #[case] expected: DuplicatePolicy) {
        assert_eq!(input.parse::<DuplicatePolicy>().unwrap(), expected);
    }

    #[rstest]
    #[case("rename", CollisionPolicy::Rename)]
    #[case("Skip", CollisionPolicy::Skip)]
    fn test_collision_policy_from_str(#[case] input: &str, #[case] expected: CollisionPolicy) {
        assert_eq!(input.parse::<CollisionPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_values() {
        let err = "fuzzy".parse::<MatcherKind>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownValue { field: "matcher", .. }));
        assert!("overwrite".parse::<CollisionPolicy>().is_err());
        assert!("merge".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(MatcherKind::default(), MatcherKind::Bucket);
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Quarantine);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Rename);
    }

    #[test]
    fn test_display_round_trips_names() {
        assert_eq!(DuplicatePolicy::MoveAll.to_string(), "move-all");
        assert_eq!(MatcherKind::Automaton.to_string(), "automaton");
    }
}
