//! Canonical match record types.
//!
//! These are the values handed to consumers and persisted inside cache
//! entries. Field names are part of the external JSON contract and must not
//! drift between releases.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One parsed two-player network match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Base name of the replay file.
    pub file_name: String,
    /// Absolute path of the replay file.
    pub file_path: PathBuf,
    /// Stable dataset key, derived from the file name.
    pub key: String,
    /// File modification time, not a timestamp from the replay content.
    #[serde(with = "rfc3339_seconds")]
    pub created_at: DateTime<FixedOffset>,
    pub warno: GameRecord,
}

impl MatchRecord {
    /// The participant the replay was recorded by.
    pub fn local_player(&self) -> Option<&ParticipantRecord> {
        self.warno.players.get(&self.warno.local_player_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game: GameConfig,
    pub local_player_eugen_id: String,
    pub local_player_key: String,
    /// Every lobby slot keyed by its original `player_N` key, in resolved
    /// order. Four-slot lobbies keep all four; `player_count` is this length.
    pub players: IndexMap<String, ParticipantRecord>,
    pub player_count: usize,
    pub result: MatchResult,
}

/// Lobby settings from the replay's `game` object.
///
/// Well-known keys are typed; anything else lands in `extra` as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameConfig {
    #[serde(default, deserialize_with = "opaque_string")]
    pub combat_rule: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub deployment_mode: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub game_mode: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub game_type: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub income_rate: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub init_money: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub is_network_mode: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub map: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub mod_list: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub mod_tag_list: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub nb_max_player: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub private: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub score_limit: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub seed: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub time_limit: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub unique_session_id: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub version: String,
    /// Remaining settings. Scalars become text the same way as the typed
    /// fields; nested values are kept as compact JSON text.
    #[serde(flatten, deserialize_with = "opaque_string_map")]
    pub extra: BTreeMap<String, String>,
}

/// Outcome block from the replay's `result` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchResult {
    #[serde(default, deserialize_with = "opaque_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub victory: String,
}

/// One lobby slot.
///
/// Rank, level and ELO are not reliably numeric in the source, so every
/// field is kept as an opaque string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParticipantRecord {
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_alliance: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_avatar: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_deck_content: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_elo: String,
    #[serde(rename = "PlayerIALevel", default, deserialize_with = "opaque_string")]
    pub player_ia_level: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_income_rate: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_is_entered_in_lobby: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_level: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_name: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_rank: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_ready: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_score_limit: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_skin_index_used: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub player_user_id: String,
}

/// Accept strings, numbers, booleans and null, keeping them as text.
fn opaque_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {other}"
        ))),
    }
}

/// Map form of [`opaque_string`]. Values that are not scalars are written
/// back out as JSON text instead of failing.
fn opaque_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

/// RFC 3339 with whole seconds, `Z` for a zero offset.
mod rfc3339_seconds {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}
