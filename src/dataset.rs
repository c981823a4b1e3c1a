//! Queries over a scanned record set.
//!
//! A scan returns records in no particular order. Everything here works on
//! plain slices so callers can combine scans from several directories
//! before querying.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::types::MatchRecord;

/// Newest first by `createdAt`, ties by `key`.
pub fn sort_newest_first(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// Narrow a record set to selected local players and a date range.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Local player ids to keep. Empty keeps everyone.
    pub player_ids: Vec<String>,
    /// Keep records created at or after this instant.
    pub since: Option<DateTime<FixedOffset>>,
    /// Keep records created at or before this instant.
    pub until: Option<DateTime<FixedOffset>>,
}

impl RecordFilter {
    pub fn with_player_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_since(mut self, since: DateTime<FixedOffset>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<FixedOffset>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        let player_ok = self.player_ids.is_empty()
            || self
                .player_ids
                .iter()
                .any(|id| *id == record.warno.local_player_eugen_id);
        let date_ok = self.since.is_none_or(|since| record.created_at >= since)
            && self.until.is_none_or(|until| record.created_at <= until);
        player_ok && date_ok
    }

    pub fn apply(&self, records: Vec<MatchRecord>) -> Vec<MatchRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// A local player id with every name it was recorded under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAlias {
    /// Names joined by `", "`.
    pub label: String,
    /// The player's stable user id.
    pub value: String,
    /// How many records the id appears in as the local player.
    pub matches: usize,
}

/// Group records by local player id.
///
/// Output is sorted by id; names within a label are deduplicated and sorted.
pub fn local_player_aliases(records: &[MatchRecord]) -> Vec<PlayerAlias> {
    let mut by_id: BTreeMap<&str, (BTreeSet<&str>, usize)> = BTreeMap::new();

    for record in records {
        let Some(player) = record.local_player() else {
            crate::debug_event!(
                "dataset",
                "missing local player",
                "{} has no slot {}",
                record.key,
                record.warno.local_player_key
            );
            continue;
        };

        let (names, count) = by_id.entry(player.player_user_id.as_str()).or_default();
        names.insert(player.player_name.as_str());
        *count += 1;
    }

    by_id
        .into_iter()
        .map(|(id, (names, matches))| PlayerAlias {
            label: names.into_iter().collect::<Vec<_>>().join(", "),
            value: id.to_string(),
            matches,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameConfig, GameRecord, MatchResult, ParticipantRecord};
    use indexmap::IndexMap;
    use std::path::PathBuf;

    fn record(key: &str, created_at: &str, local_id: &str, local_name: &str) -> MatchRecord {
        let mut players = IndexMap::new();
        players.insert(
            "player_1".to_string(),
            ParticipantRecord {
                player_user_id: local_id.to_string(),
                player_name: local_name.to_string(),
                ..Default::default()
            },
        );
        players.insert(
            "player_2".to_string(),
            ParticipantRecord {
                player_user_id: "enemy".to_string(),
                player_name: "Enemy".to_string(),
                ..Default::default()
            },
        );

        MatchRecord {
            file_name: key.to_string(),
            file_path: PathBuf::from("/saves").join(key),
            key: key.to_string(),
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
            warno: GameRecord {
                game: GameConfig::default(),
                local_player_eugen_id: local_id.to_string(),
                local_player_key: "player_1".to_string(),
                players,
                player_count: 2,
                result: MatchResult::default(),
            },
        }
    }

    #[test]
    fn test_sort_newest_first_breaks_ties_by_key() {
        let mut records = vec![
            record("b.rpl3", "2025-03-16T10:00:00Z", "1", "A"),
            record("old.rpl3", "2025-01-01T10:00:00Z", "1", "A"),
            record("a.rpl3", "2025-03-16T10:00:00Z", "1", "A"),
            // Same instant as the first two, written in another offset
            record("c.rpl3", "2025-03-16T11:00:00+01:00", "1", "A"),
            record("new.rpl3", "2025-04-01T10:00:00Z", "1", "A"),
        ];

        sort_newest_first(&mut records);

        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["new.rpl3", "a.rpl3", "b.rpl3", "c.rpl3", "old.rpl3"]);
    }

    #[test]
    fn test_filter_by_player_and_date() {
        let records = vec![
            record("a.rpl3", "2025-03-01T00:00:00Z", "1", "A"),
            record("b.rpl3", "2025-03-10T00:00:00Z", "2", "B"),
            record("c.rpl3", "2025-03-20T00:00:00Z", "1", "A"),
        ];

        let everyone = RecordFilter::default().apply(records.clone());
        assert_eq!(everyone.len(), 3);

        let player_one = RecordFilter::default().with_player_ids(["1"]).apply(records.clone());
        assert_eq!(player_one.len(), 2);

        let since = DateTime::parse_from_rfc3339("2025-03-10T00:00:00Z").unwrap();
        let recent = RecordFilter::default().with_since(since).apply(records.clone());
        let keys: Vec<_> = recent.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b.rpl3", "c.rpl3"]);

        let both = RecordFilter::default()
            .with_player_ids(["1", "3"])
            .with_since(since)
            .apply(records);
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].key, "c.rpl3");
    }

    #[test]
    fn test_bounded_range_keeps_both_edges() {
        let from = DateTime::parse_from_rfc3339("2025-03-10T00:00:00Z").unwrap();
        let to = DateTime::parse_from_rfc3339("2025-03-20T00:00:00Z").unwrap();
        let records = vec![
            record("before.rpl3", "2025-03-09T23:59:59Z", "1", "A"),
            record("start.rpl3", "2025-03-10T00:00:00Z", "1", "A"),
            record("middle.rpl3", "2025-03-15T12:00:00Z", "1", "A"),
            // Same instant as `to`, in another offset
            record("end.rpl3", "2025-03-20T01:00:00+01:00", "1", "A"),
            record("after.rpl3", "2025-03-20T00:00:01Z", "1", "A"),
        ];

        let ranged = RecordFilter::default()
            .with_since(from)
            .with_until(to)
            .apply(records.clone());
        let keys: Vec<_> = ranged.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["start.rpl3", "middle.rpl3", "end.rpl3"]);

        let open_start = RecordFilter::default().with_until(from).apply(records);
        let keys: Vec<_> = open_start.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["before.rpl3", "start.rpl3"]);
    }

    #[test]
    fn test_local_player_aliases_merge_names() {
        let mut orphan = record("d.rpl3", "2025-03-04T00:00:00Z", "9", "Ghost");
        orphan.warno.local_player_key = "player_7".to_string();

        let records = vec![
            record("a.rpl3", "2025-03-01T00:00:00Z", "20", "Zulu"),
            record("b.rpl3", "2025-03-02T00:00:00Z", "10", "Alpha"),
            record("c.rpl3", "2025-03-03T00:00:00Z", "20", "Yankee"),
            record("e.rpl3", "2025-03-05T00:00:00Z", "20", "Zulu"),
            orphan,
        ];

        let aliases = local_player_aliases(&records);
        assert_eq!(
            aliases,
            vec![
                PlayerAlias {
                    label: "Alpha".to_string(),
                    value: "10".to_string(),
                    matches: 1,
                },
                PlayerAlias {
                    label: "Yankee, Zulu".to_string(),
                    value: "20".to_string(),
                    matches: 3,
                },
            ]
        );
    }
}
