use casemover_config::{CollisionPolicy, DuplicatePolicy, MatcherKind};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "casemover", version, about = "Relocate case folders matched by identifier")]
pub struct Cli {
    /// More log output: `-v` for info, `-vv` for debug. `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match identifiers against folder names and move the matches.
    Run(RunArgs),
    /// List folders quarantined under a destination, oldest first.
    Duplicates {
        /// Destination root of earlier runs.
        destination: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// CSV or text file whose first column holds the identifiers.
    pub identifiers: PathBuf,
    /// Root of the tree to search.
    pub source: PathBuf,
    /// Directory matched folders are moved into.
    pub destination: PathBuf,
    /// Configuration file (toml, yaml or json).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where to write the CSV report. Defaults to `report_<timestamp>.csv`.
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Skip folders recorded as moved in this earlier report.
    #[arg(long, value_name = "REPORT")]
    pub resume: Option<PathBuf>,
    /// Do not ask for confirmation before moving.
    #[arg(short, long)]
    pub yes: bool,
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Flags that override configuration. Only flags actually given are
/// serialized, so everything else falls through to lower layers.
#[derive(Debug, Default, Args, Serialize)]
pub struct Overrides {
    /// Report what would happen without touching the filesystem.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    /// Matching algorithm: bucket or automaton.
    #[arg(long, value_parser = policy::<MatcherKind>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matcher: Option<MatcherKind>,
    /// Identifiers matching several folders: quarantine, skip or move-all.
    #[arg(long, value_parser = policy::<DuplicatePolicy>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicatePolicy>,
    /// Occupied destination names: rename or skip.
    #[arg(long, value_parser = policy::<CollisionPolicy>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_collision: Option<CollisionPolicy>,
    /// Folder names to leave alone (glob or substring, case-insensitive). Repeatable.
    #[arg(long, value_name = "PATTERN")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Scan at most this many folders.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_folders: Option<usize>,
    /// Plan at most this many move operations.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_moves: Option<usize>,
    /// Process only the first N identifiers.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_limit: Option<usize>,
    /// Moves allowed in flight at once.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// The identifier list starts with a header row.
    #[arg(long = "header")]
    #[serde(rename = "identifiers_have_header", skip_serializing_if = "std::ops::Not::not")]
    pub header: bool,
}

fn policy<T>(raw: &str) -> Result<T, String>
where
    T: FromStr<Err = casemover_config::error::Error>,
{
    raw.parse::<T>().map_err(|e| (*e).to_string())
}
