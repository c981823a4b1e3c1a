//! CLI argument parsing using clap.
//!
//! Contains the Cli struct, Commands enum, and per-command argument structs.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// WARNO replay scanner
#[derive(Parser, Debug)]
#[command(
    name = "warno-replays",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scan, cache and watch WARNO replay files",
    long_about = "Extract two-player network matches from WARNO replays, cache the results \
                  and rescan when new replays appear.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log scan summaries and watch activity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default settings file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings and the cache location
    Config,

    /// Scan save directories and print matches as JSON
    Scan(ScanArgs),

    /// Extract a single replay, bypassing the cache
    Extract {
        /// Replay file
        file: PathBuf,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Scan, then rescan whenever a new replay appears
    Watch(WatchArgs),

    /// List local player ids and the names they played under
    Players(PlayersArgs),
}

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Save directories (defaults to `scan.directories`)
    pub dirs: Vec<PathBuf>,

    /// Parse every file and leave the cache untouched
    #[arg(long)]
    pub no_cache: bool,

    /// Keep only matches recorded by this player id (repeatable)
    #[arg(long = "player", value_name = "ID")]
    pub players: Vec<String>,

    /// Keep only matches created on or after DATE (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_since)]
    pub since: Option<DateTime<FixedOffset>>,

    /// Keep only matches created on or before DATE (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_until)]
    pub until: Option<DateTime<FixedOffset>>,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Save directories (defaults to `scan.directories`)
    pub dirs: Vec<PathBuf>,

    /// Parse every file and leave the cache untouched
    #[arg(long)]
    pub no_cache: bool,

    /// Quiet period before a new replay is scanned (overrides config)
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct PlayersArgs {
    /// Save directories (defaults to `scan.directories`)
    pub dirs: Vec<PathBuf>,

    /// Parse every file and leave the cache untouched
    #[arg(long)]
    pub no_cache: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Parse `--since`: a calendar date means local midnight.
pub fn parse_since(value: &str) -> Result<DateTime<FixedOffset>, String> {
    parse_date_bound(value, (0, 0, 0))
}

/// Parse `--until`: a calendar date means the last second of that local day.
///
/// `createdAt` has whole-second precision, so this keeps the whole day.
pub fn parse_until(value: &str) -> Result<DateTime<FixedOffset>, String> {
    parse_date_bound(value, (23, 59, 59))
}

fn parse_date_bound(value: &str, (h, m, s): (u32, u32, u32)) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got `{value}`"))?;
    let local_time = date.and_hms_opt(h, m, s).ok_or("invalid date")?;

    Local
        .from_local_datetime(&local_time)
        .earliest()
        .map(|local| local.fixed_offset())
        .ok_or_else(|| format!("no local {local_time} on {date}"))
}
