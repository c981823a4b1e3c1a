mod common;

use std::collections::HashSet;

use tempfile::TempDir;
use warno_replays::{CacheStore, FileOutcome, ScanConfig, Scanner};

const MATCHES: usize = 250;
const REJECTS: usize = 150;
const BROKEN: usize = 100;
const TOTAL: usize = MATCHES + REJECTS + BROKEN;

fn populate(dir: &TempDir) {
    for i in 0..MATCHES {
        let id = i.to_string();
        common::write(dir.path(), &format!("match_{i:03}.rpl3"), &common::ranked_replay(&id, "P"));
    }
    for i in 0..REJECTS {
        common::write(dir.path(), &format!("skirmish_{i:03}.rpl3"), "offline skirmish");
    }
    for i in 0..BROKEN {
        common::write(dir.path(), &format!("broken_{i:03}.rpl3"), &common::malformed_replay());
    }
}

fn assert_complete(scanner: &Scanner, dir: &TempDir) {
    let report = scanner.scan(&[dir.path()]);
    let stats = report.stats();

    assert_eq!(stats.files_dispatched, TOTAL);
    assert_eq!(report.outcomes().len(), TOTAL);
    assert_eq!(stats.records + stats.rejected + stats.failed, TOTAL);
    assert_eq!(stats.records, MATCHES);
    assert_eq!(stats.rejected, REJECTS);
    assert_eq!(stats.failed, BROKEN);

    let failed = report
        .outcomes()
        .values()
        .filter(|o| matches!(o, FileOutcome::Failed(_)))
        .count();
    assert_eq!(failed, BROKEN);

    let ids: HashSet<String> = report
        .into_records()
        .into_iter()
        .map(|r| r.warno.local_player_eugen_id)
        .collect();
    assert_eq!(ids.len(), MATCHES, "every match exactly once");
}

#[test]
fn test_every_file_yields_one_outcome() {
    let dir = TempDir::new().unwrap();
    populate(&dir);

    for workers in [1, 3, 8, 32] {
        let scanner = Scanner::new(
            ScanConfig::default()
                .with_workers(workers)
                .with_queue_size(4),
        );
        for _ in 0..3 {
            assert_complete(&scanner, &dir);
        }
    }
}

#[test]
fn test_every_file_yields_one_outcome_with_cache() {
    let dir = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    populate(&dir);

    let store = CacheStore::open(cache.path()).unwrap();
    let scanner = Scanner::new(ScanConfig::default().with_workers(8)).with_cache(store);

    assert_complete(&scanner, &dir);
    assert_complete(&scanner, &dir);

    let warm = scanner.scan(&[dir.path()]);
    // Malformed replays are never cached
    assert_eq!(warm.stats().cache_hits, MATCHES + REJECTS);
    assert_eq!(warm.stats().files_parsed, BROKEN);
}
