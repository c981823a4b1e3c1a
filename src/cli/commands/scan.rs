//! Scan command - print the filtered match list.

use anyhow::Context;

use crate::Settings;
use crate::cli::args::ScanArgs;
use crate::dataset::{RecordFilter, sort_newest_first};
use crate::types::MatchRecord;

use super::{build_scanner, resolve_dirs};

/// Run scan command.
pub fn run_scan(args: &ScanArgs, settings: &Settings) -> anyhow::Result<()> {
    let records = collect(args, settings)?;
    let json = if args.compact {
        serde_json::to_string(&records)
    } else {
        serde_json::to_string_pretty(&records)
    }
    .context("failed to serialize records")?;

    println!("{json}");
    Ok(())
}

/// Scan, filter and sort newest-first.
pub fn collect(args: &ScanArgs, settings: &Settings) -> anyhow::Result<Vec<MatchRecord>> {
    let dirs = resolve_dirs(&args.dirs, settings)?;
    let report = build_scanner(settings, args.no_cache).scan(&dirs);

    let mut filter = RecordFilter::default().with_player_ids(args.players.iter().cloned());
    if let Some(since) = args.since {
        filter = filter.with_since(since);
    }
    if let Some(until) = args.until {
        filter = filter.with_until(until);
    }
    let mut records = filter.apply(report.into_records());
    sort_newest_first(&mut records);
    Ok(records)
}
