//! Watch command - rescan as new replays arrive.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::Settings;
use crate::cli::args::WatchArgs;
use crate::notifications::{NotificationBroadcaster, ReplayEvent};
use crate::scan::{ScanStats, Scanner, discover::has_extension};
use crate::watcher::{Debouncer, WatchService};

use super::{build_scanner, resolve_dirs};

/// How often settled paths are checked for.
const TICK: Duration = Duration::from_millis(100);

/// Run watch command until Ctrl-C.
pub async fn run_watch(args: &WatchArgs, settings: &Settings) -> anyhow::Result<()> {
    let dirs = resolve_dirs(&args.dirs, settings)?;
    let scanner = build_scanner(settings, args.no_cache);
    let extension = scanner.config().extension.clone();

    // Watch before the first pass so replays written during it still arrive
    let (service, mut events) = start_watches(&dirs, settings)?;

    let stats = scan_pass(&scanner, &dirs).await?;
    print_pass("initial scan", &stats);

    eprintln!(
        "Watching {} directories. Press Ctrl-C to stop.",
        service.watched_paths().len()
    );

    let mut debouncer = Debouncer::new(args.debounce_ms.unwrap_or(settings.watch.debounce_ms));
    let mut rescan_all = false;
    let mut tick = tokio::time::interval(TICK);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            received = events.recv() => match received {
                Ok(ReplayEvent::FileAdded { path }) => {
                    if has_extension(&path, &extension) {
                        debouncer.record(path);
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("[cli] missed {n} watch events, rescanning");
                    rescan_all = true;
                }
                Err(RecvError::Closed) => break,
            },

            _ = tick.tick() => {
                if !debouncer.has_pending() && !rescan_all {
                    continue;
                }
                let ready = debouncer.take_ready();
                if ready.is_empty() && !rescan_all {
                    continue;
                }
                rescan_all = false;

                for path in &ready {
                    crate::log_event!("cli", "new replay", "{}", path.display());
                }
                let stats = scan_pass(&scanner, &dirs).await?;
                print_pass(&format!("{} new replays", ready.len()), &stats);
            }
        }
    }

    service.shutdown().await;
    eprintln!("Stopped watching.");
    Ok(())
}

/// Register every directory and subscribe to its events.
fn start_watches(
    dirs: &[PathBuf],
    settings: &Settings,
) -> anyhow::Result<(WatchService, broadcast::Receiver<ReplayEvent>)> {
    let broadcaster = NotificationBroadcaster::new(settings.watch.channel_capacity);
    let service = WatchService::new(broadcaster).with_channel_capacity(settings.watch.channel_capacity);
    let events = service.subscribe();

    for dir in dirs {
        if let Err(e) = service.watch(dir) {
            tracing::warn!("[cli] not watching {}: {e}", dir.display());
        }
    }
    if service.watched_paths().is_empty() {
        bail!("None of the given directories could be watched.");
    }
    Ok((service, events))
}

/// Run a blocking scan off the async runtime.
async fn scan_pass(scanner: &Scanner, dirs: &[PathBuf]) -> anyhow::Result<ScanStats> {
    let scanner = scanner.clone();
    let dirs = dirs.to_vec();
    let report = tokio::task::spawn_blocking(move || scanner.scan(&dirs))
        .await
        .context("scan task failed")?;
    Ok(report.stats().clone())
}

fn print_pass(label: &str, stats: &ScanStats) {
    println!(
        "{label}: {} matches from {} replays ({} cached, {} parsed, {} failed) in {:?}",
        stats.records, stats.files_dispatched, stats.cache_hits, stats.files_parsed, stats.failed, stats.elapsed
    );
}
