//! Layered run configuration.
//!
//! A [`Config`] is assembled by [`figment`] from, in increasing priority:
//!
//! 1. compiled defaults,
//! 2. `config.{toml,yaml,json}` in the platform configuration directory,
//! 3. an explicitly requested configuration file,
//! 4. `CASEMOVER_*` environment variables,
//! 5. whatever the caller merges on top (command-line flags).
//!
//! The resulting value is passed explicitly into every engine component; nothing
//! reads configuration from ambient state.

pub mod error;
mod policy;

pub use crate::policy::{CollisionPolicy, DuplicatePolicy, MatcherKind};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides, e.g. `CASEMOVER_DUPLICATES=skip`.
pub const ENV_PREFIX: &str = "CASEMOVER_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substring matching algorithm.
    pub matcher: MatcherKind,
    /// Handling of identifiers with more than one matching folder.
    pub duplicates: DuplicatePolicy,
    /// Handling of occupied destination paths.
    pub on_collision: CollisionPolicy,
    /// Folder-name exclusion patterns (glob or plain substring, case-insensitive).
    pub exclude: Vec<String>,
    /// Compute and report every decision without touching the filesystem.
    pub dry_run: bool,
    /// Keep only the first N scanned folders. Diagnostics only.
    pub max_folders: Option<usize>,
    /// Stop planning after N move operations.
    pub max_moves: Option<usize>,
    /// Keep only the first N identifiers.
    pub identifier_limit: Option<usize>,
    /// Number of moves allowed in flight at once.
    pub concurrency: usize,
    /// Whether the first row of the identifier list is a header.
    pub identifiers_have_header: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherKind::default(),
            duplicates: DuplicatePolicy::default(),
            on_collision: CollisionPolicy::default(),
            exclude: Vec::new(),
            dry_run: false,
            max_folders: None,
            max_moves: None,
            identifier_limit: None,
            concurrency: 1,
            identifiers_have_header: false,
        }
    }
}

impl Config {
    /// Builds the layered [`Figment`] without extracting it, so callers can
    /// merge their own highest-priority provider (command-line flags) on top.
    ///
    /// A missing platform configuration file is silently skipped; a missing
    /// `explicit` file is an error.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = Self::config_dir() {
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extracts and validates a [`Config`] from an assembled [`Figment`].
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Invalid(e.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "Configuration resolved");
        Ok(config)
    }

    /// Convenience for [`figment`](Self::figment) followed by
    /// [`from_figment`](Self::from_figment) with no extra layers.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(explicit)?)
    }

    /// Rejects values that deserialize cleanly but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            exn::bail!(ErrorKind::Validation { field: "concurrency", reason: "must be at least 1" });
        }
        if self.max_folders == Some(0) {
            exn::bail!(ErrorKind::Validation { field: "max_folders", reason: "must be at least 1 when set" });
        }
        if self.max_moves == Some(0) {
            exn::bail!(ErrorKind::Validation { field: "max_moves", reason: "must be at least 1 when set" });
        }
        if self.identifier_limit == Some(0) {
            exn::bail!(ErrorKind::Validation { field: "identifier_limit", reason: "must be at least 1 when set" });
        }
        if self.exclude.iter().any(|p| p.trim().is_empty()) {
            exn::bail!(ErrorKind::Validation { field: "exclude", reason: "patterns must not be empty" });
        }
        Ok(())
    }

    /// Platform configuration directory, e.g. `~/.config/casemover` on Linux.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "casemover").map(|dirs| dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 1);
        assert!(!config.dry_run);
        assert!(config.exclude.is_empty());
    }

    #[rstest]
    #[case(Config { concurrency: 0, ..Config::default() }, "concurrency")]
    #[case(Config { max_folders: Some(0), ..Config::default() }, "max_folders")]
    #[case(Config { max_moves: Some(0), ..Config::default() }, "max_moves")]
    #[case(Config { identifier_limit: Some(0), ..Config::default() }, "identifier_limit")]
    #[case(Config { exclude: vec!["  ".to_string()], ..Config::default() }, "exclude")]
    fn test_validation_rejects(#[case] config: Config, #[case] expected: &str) {
        let err = config.validate().unwrap_err();
        match &*err {
            ErrorKind::Validation { field, .. } => assert_eq!(*field, expected),
            other => panic!("unexpected error kind: {other}"),
        }
    }

    #[test]
    fn test_explicit_file_missing() {
        let err = Config::figment(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_explicit_file_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "dry_run = true").unwrap();
        let err = Config::figment(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "run.toml",
                r#"
                duplicates = "skip"
                on_collision = "skip"
                exclude = ["*.bak", "temp"]
                concurrency = 4
                "#,
            )?;
            jail.set_env("CASEMOVER_DRY_RUN", "true");
            jail.set_env("CASEMOVER_CONCURRENCY", "2");
            let config = Config::load(Some(Path::new("run.toml"))).unwrap();
            assert_eq!(config.duplicates, DuplicatePolicy::Skip);
            assert_eq!(config.on_collision, CollisionPolicy::Skip);
            assert_eq!(config.exclude, vec!["*.bak".to_string(), "temp".to_string()]);
            // Environment wins over the file.
            assert_eq!(config.concurrency, 2);
            assert!(config.dry_run);
            // Untouched fields keep their defaults.
            assert_eq!(config.matcher, MatcherKind::Bucket);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_in_file() {
        Jail::expect_with(|jail| {
            jail.create_file("run.toml", r#"duplicates = "merge""#)?;
            let err = Config::load(Some(Path::new("run.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_caller_layer_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("CASEMOVER_MATCHER", "bucket");
            let figment = Config::figment(None)
                .unwrap()
                .merge(Serialized::defaults(Config { matcher: MatcherKind::Automaton, ..Config::default() }));
            let config = Config::from_figment(&figment).unwrap();
            assert_eq!(config.matcher, MatcherKind::Automaton);
            Ok(())
        });
    }
}
