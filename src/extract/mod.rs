//! Turning raw replay content into a [`MatchRecord`].
//!
//! The result is three-way:
//! - `Ok(Extraction::Record)` for a qualifying match,
//! - `Ok(Extraction::Rejected)` for a readable replay that is not a
//!   two-player network match (cached as a negative),
//! - `Err(ExtractError)` for content that could not be decoded (never
//!   cached, so a later release can recover it).

mod error;
pub mod fragments;
pub mod participants;

pub use error::{ExtractError, ExtractResult, RejectReason};
pub use fragments::{Fragments, normalize, passes_prefilter};
pub use participants::{ResolvedSlots, Slot};

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Local, Timelike};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::{GameConfig, GameRecord, MatchRecord, MatchResult};
use fragments::{GAME_FRAGMENT, RESULT_FRAGMENT};

/// Keys whose presence in `game` marks a server-hosted session.
const HOSTED_MARKERS: [&str; 2] = ["WithHost", "ServerName"];
const INGAME_PLAYER_ID: &str = "ingamePlayerId";

/// Outcome of a successful extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(Box<MatchRecord>),
    Rejected(RejectReason),
}

impl Extraction {
    pub fn into_record(self) -> Option<MatchRecord> {
        match self {
            Extraction::Record(record) => Some(*record),
            Extraction::Rejected(_) => None,
        }
    }
}

/// File metadata the record is built from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Modification time in the local offset, truncated to whole seconds so a
    /// fresh record and its cached copy compare equal.
    fn created_at(&self) -> DateTime<FixedOffset> {
        let local: DateTime<Local> = self.modified.into();
        let local = local.with_nanosecond(0).unwrap_or(local);
        local.fixed_offset()
    }
}

/// Extract a record from replay content.
pub fn extract(raw: &str, source: &SourceFile) -> ExtractResult<Extraction> {
    let normalized = normalize(raw);

    if !passes_prefilter(&normalized) {
        return Ok(Extraction::Rejected(prefilter_reason(&normalized)));
    }

    let Fragments { game, result } = fragments::locate(&normalized)?;

    let settings = object_field(&game, GAME_FRAGMENT, GAME_FRAGMENT)?;
    if let Some(reason) = check_lobby(settings) {
        return Ok(Extraction::Rejected(reason));
    }

    let ingame_player_id = ingame_player_id(&game)?;
    let resolved = participants::resolve_sides(participants::collect_slots(&game)?);
    let local = resolved.local(ingame_player_id)?;
    let local_player_eugen_id = local.player.player_user_id.clone();
    let local_player_key = local.key.clone();

    let game_config = GameConfig::deserialize(Value::Object(settings.clone())).map_err(|e| {
        ExtractError::UnexpectedShape {
            fragment: GAME_FRAGMENT,
            reason: e.to_string(),
        }
    })?;

    let match_result = match result.get(RESULT_FRAGMENT) {
        Some(value) => MatchResult::deserialize(value).map_err(|e| {
            ExtractError::UnexpectedShape {
                fragment: RESULT_FRAGMENT,
                reason: e.to_string(),
            }
        })?,
        None => {
            return Err(ExtractError::UnexpectedShape {
                fragment: RESULT_FRAGMENT,
                reason: "missing `result` key".to_string(),
            });
        }
    };

    let player_count = resolved.len();
    let players: IndexMap<_, _> = resolved
        .into_iter_all()
        .map(|slot| (slot.key, slot.player))
        .collect();

    let file_name = source.file_name();

    Ok(Extraction::Record(Box::new(MatchRecord {
        key: file_name.clone(),
        file_name,
        file_path: source.path.clone(),
        created_at: source.created_at(),
        warno: GameRecord {
            game: game_config,
            local_player_eugen_id,
            local_player_key,
            players,
            player_count,
            result: match_result,
        },
    })))
}

/// One-off extraction straight from disk, bypassing any cache.
pub fn extract_file(path: &Path) -> ExtractResult<Extraction> {
    let read_err = |source| ExtractError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(read_err)?;
    let bytes = std::fs::read(path).map_err(read_err)?;
    let content = String::from_utf8_lossy(&bytes);

    extract(&content, &SourceFile::new(path, modified))
}

fn prefilter_reason(normalized: &str) -> RejectReason {
    if !normalized.contains(fragments::TWO_PLAYER_MARKER) {
        RejectReason::NotTwoPlayer
    } else {
        RejectReason::NotNetworkMode
    }
}

/// Confirm the decoded lobby settings, not just the literal markers.
fn check_lobby(settings: &Map<String, Value>) -> Option<RejectReason> {
    if HOSTED_MARKERS.iter().any(|key| settings.contains_key(*key)) {
        return Some(RejectReason::Hosted);
    }

    let (Some(max_players), Some(network_mode)) =
        (settings.get("NbMaxPlayer"), settings.get("IsNetworkMode"))
    else {
        return Some(RejectReason::MissingModeFields);
    };

    if max_players.as_str() != Some("2") {
        return Some(RejectReason::NotTwoPlayer);
    }
    if network_mode.as_str() != Some("1") {
        return Some(RejectReason::NotNetworkMode);
    }

    None
}

fn object_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    fragment: &'static str,
) -> ExtractResult<&'a Map<String, Value>> {
    match map.get(key) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(ExtractError::UnexpectedShape {
            fragment,
            reason: format!("`{key}` is not an object"),
        }),
        None => Err(ExtractError::UnexpectedShape {
            fragment,
            reason: format!("missing `{key}` key"),
        }),
    }
}

fn ingame_player_id(game: &Map<String, Value>) -> ExtractResult<usize> {
    game.get(INGAME_PLAYER_ID)
        .and_then(Value::as_u64)
        .and_then(|id| usize::try_from(id).ok())
        .ok_or_else(|| ExtractError::UnexpectedShape {
            fragment: GAME_FRAGMENT,
            reason: format!("`{INGAME_PLAYER_ID}` is missing or not a non-negative integer"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source() -> SourceFile {
        SourceFile::new(
            "/saves/replay_2025-03-16_13-40-49.rpl3",
            SystemTime::UNIX_EPOCH + Duration::from_millis(1_742_132_449_750),
        )
    }

    fn replay(game: &str, players: &str, ingame_player_id: u32) -> String {
        format!(
            "RPL3\u{0}header\n{{\"game\":{{{game}}},{players},\"ingame\nPlayerId\":{ingame_player_id}}}\n\
             garbage\n{{\"result\":{{\"Duration\":\"812\",\"Victory\":\"4\"}}}}trailer"
        )
    }

    const RANKED: &str = r#""Map":"_2x3_Gorlitz","NbMaxPlayer":"2","IsNetworkMode":"1","GameMode":"1","Seed":"77""#;
    const TWO_PLAYERS: &str = r#""player_1":{"PlayerName":"Alpha","PlayerUserId":"100","PlayerAlliance":"0","PlayerElo":1500},"player_2":{"PlayerName":"Bravo","PlayerUserId":"200","PlayerAlliance":"1","PlayerElo":"1600.2"}"#;

    #[test]
    fn test_extracts_two_player_network_match() {
        let content = replay(RANKED, TWO_PLAYERS, 1);
        let record = extract(&content, &source())
            .unwrap()
            .into_record()
            .expect("should be a record");

        assert_eq!(record.file_name, "replay_2025-03-16_13-40-49.rpl3");
        assert_eq!(record.key, record.file_name);
        assert_eq!(
            record.file_path,
            PathBuf::from("/saves/replay_2025-03-16_13-40-49.rpl3")
        );
        assert_eq!(record.created_at.nanosecond(), 0);
        assert_eq!(record.created_at.timestamp(), 1_742_132_449);

        let warno = &record.warno;
        assert_eq!(warno.game.map, "_2x3_Gorlitz");
        assert_eq!(warno.game.extra.get("GameMode"), None);
        assert_eq!(warno.game.game_mode, "1");
        assert_eq!(warno.result.duration, "812");
        assert_eq!(warno.result.victory, "4");
        assert_eq!(warno.player_count, 2);
        assert_eq!(warno.local_player_key, "player_2");
        assert_eq!(warno.local_player_eugen_id, "200");
        assert_eq!(warno.players["player_1"].player_elo, "1500");
        assert_eq!(record.local_player().unwrap().player_name, "Bravo");
    }

    #[test]
    fn test_local_player_index_zero() {
        let content = replay(RANKED, TWO_PLAYERS, 0);
        let record = extract(&content, &source()).unwrap().into_record().unwrap();
        assert_eq!(record.warno.local_player_key, "player_1");
        assert_eq!(record.warno.local_player_eugen_id, "100");
    }

    #[test]
    fn test_prefilter_rejections() {
        let four = RANKED.replace(r#""NbMaxPlayer":"2""#, r#""NbMaxPlayer":"4""#);
        let content = replay(&four, TWO_PLAYERS, 0);
        assert_eq!(
            extract(&content, &source()).unwrap(),
            Extraction::Rejected(RejectReason::NotTwoPlayer)
        );

        let skirmish = RANKED.replace(r#""IsNetworkMode":"1""#, r#""IsNetworkMode":"0""#);
        let content = replay(&skirmish, TWO_PLAYERS, 0);
        assert_eq!(
            extract(&content, &source()).unwrap(),
            Extraction::Rejected(RejectReason::NotNetworkMode)
        );

        assert_eq!(
            extract("not a replay at all", &source()).unwrap(),
            Extraction::Rejected(RejectReason::NotTwoPlayer)
        );
    }

    #[test]
    fn test_markers_outside_game_object_are_not_enough() {
        // The literal appears after the fragments but the lobby says otherwise.
        let game = r#""Map":"M","NbMaxPlayer":"10","IsNetworkMode":"1""#;
        let content = format!(
            "{} \"NbMaxPlayer\":\"2\"",
            replay(game, TWO_PLAYERS, 0)
        );
        assert_eq!(
            extract(&content, &source()).unwrap(),
            Extraction::Rejected(RejectReason::NotTwoPlayer)
        );
    }

    #[test]
    fn test_hosted_sessions_are_rejected() {
        for marker in HOSTED_MARKERS {
            let game = format!(r#"{RANKED},"{marker}":"yes""#);
            let content = replay(&game, TWO_PLAYERS, 0);
            assert_eq!(
                extract(&content, &source()).unwrap(),
                Extraction::Rejected(RejectReason::Hosted),
                "marker {marker}"
            );
        }
    }

    #[test]
    fn test_missing_mode_fields_is_a_rejection() {
        // Markers live outside the game object, so the prefilter passes.
        let content = format!(
            r#""NbMaxPlayer":"2""IsNetworkMode":"1"{}"#,
            replay(r#""Map":"M""#, TWO_PLAYERS, 0)
        );
        assert_eq!(
            extract(&content, &source()).unwrap(),
            Extraction::Rejected(RejectReason::MissingModeFields)
        );
    }

    #[test]
    fn test_out_of_range_player_index_is_malformed() {
        let content = replay(RANKED, TWO_PLAYERS, 5);
        let err = extract(&content, &source()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::LocalPlayerOutOfRange {
                index: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_missing_result_fragment_is_malformed() {
        let content = format!(
            r#"{{"game":{{{RANKED}}},{TWO_PLAYERS},"ingamePlayerId":0}}"#
        );
        let err = extract(&content, &source()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::FragmentNotFound { fragment: "result" }
        ));
    }

    #[test]
    fn test_four_slot_lobby_resolves_local_player() {
        let players = concat!(
            r#""player_4":{"PlayerName":"D","PlayerUserId":"4","PlayerAlliance":"1"},"#,
            r#""player_1":{"PlayerName":"A","PlayerUserId":"1","PlayerAlliance":"0"},"#,
            r#""player_3":{"PlayerName":"C","PlayerUserId":"3","PlayerAlliance":"1"},"#,
            r#""player_2":{"PlayerName":"B","PlayerUserId":"2","PlayerAlliance":"0"}"#
        );
        let content = replay(RANKED, players, 2);
        let record = extract(&content, &source()).unwrap().into_record().unwrap();

        let keys: Vec<&str> = record.warno.players.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["player_1", "player_2", "player_3", "player_4"]);
        assert_eq!(record.warno.player_count, 4);
        assert_eq!(record.warno.local_player_key, "player_3");
        assert_eq!(record.warno.local_player_eugen_id, "3");
    }

    #[test]
    fn test_extract_file_reads_metadata() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("replay_a.rpl3");
        std::fs::write(&path, replay(RANKED, TWO_PLAYERS, 0)).unwrap();

        let record = extract_file(&path).unwrap().into_record().unwrap();
        assert_eq!(record.file_name, "replay_a.rpl3");
        assert_eq!(record.file_path, path);

        let missing = extract_file(&temp.path().join("missing.rpl3")).unwrap_err();
        assert!(matches!(missing, ExtractError::FileRead { .. }));
    }
}
