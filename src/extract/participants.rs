//! Player slot collection and side resolution.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{ExtractError, ExtractResult};
use crate::types::ParticipantRecord;

const SLOT_PREFIX: &str = "player_";

/// A lobby slot with its original key.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub key: String,
    pub index: u32,
    pub player: ParticipantRecord,
}

/// Slots after alliance resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSlots {
    /// Alliance `0` slots then alliance `1` slots, each by slot index.
    pub ordered: Vec<Slot>,
    /// Slots with any other alliance value, by slot index.
    pub unaligned: Vec<Slot>,
}

impl ResolvedSlots {
    pub fn len(&self) -> usize {
        self.ordered.len() + self.unaligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty() && self.unaligned.is_empty()
    }

    /// The slot the in-game player index points at.
    pub fn local(&self, ingame_player_id: usize) -> ExtractResult<&Slot> {
        self.ordered
            .get(ingame_player_id)
            .ok_or(ExtractError::LocalPlayerOutOfRange {
                index: ingame_player_id,
                available: self.ordered.len(),
            })
    }

    /// All slots in output order.
    pub fn into_iter_all(self) -> impl Iterator<Item = Slot> {
        self.ordered.into_iter().chain(self.unaligned)
    }
}

/// Numeric suffix of a `player_N` key.
pub fn slot_index(key: &str) -> Option<u32> {
    key.strip_prefix(SLOT_PREFIX)?.parse().ok()
}

/// Collect every `player_N` entry of the game fragment.
pub fn collect_slots(game_fragment: &Map<String, Value>) -> ExtractResult<Vec<Slot>> {
    let mut slots = Vec::new();

    for (key, value) in game_fragment {
        let Some(index) = slot_index(key) else {
            continue;
        };

        let player = ParticipantRecord::deserialize(value).map_err(|source| {
            ExtractError::InvalidSlot {
                slot: key.clone(),
                source,
            }
        })?;

        slots.push(Slot {
            key: key.clone(),
            index,
            player,
        });
    }

    Ok(slots)
}

/// Sort by slot index, then group by alliance.
///
/// With a four-slot lobby the slot keys arrive in arbitrary order, so the
/// index sort is what makes the alliance groups deterministic.
pub fn resolve_sides(mut slots: Vec<Slot>) -> ResolvedSlots {
    slots.sort_by_key(|slot| slot.index);

    let mut alliance_zero = Vec::new();
    let mut alliance_one = Vec::new();
    let mut unaligned = Vec::new();

    for slot in slots {
        match slot.player.player_alliance.as_str() {
            "0" => alliance_zero.push(slot),
            "1" => alliance_one.push(slot),
            _ => unaligned.push(slot),
        }
    }

    alliance_zero.extend(alliance_one);

    ResolvedSlots {
        ordered: alliance_zero,
        unaligned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_slot_index() {
        assert_eq!(slot_index("player_4"), Some(4));
        assert_eq!(slot_index("player_12"), Some(12));
        assert_eq!(slot_index("player_"), None);
        assert_eq!(slot_index("player_x"), None);
        assert_eq!(slot_index("ingamePlayerId"), None);
    }

    #[test]
    fn test_collect_ignores_non_slot_keys() {
        let game = fragment(json!({
            "game": { "Map": "M" },
            "player_2": { "PlayerName": "b", "PlayerAlliance": "1" },
            "player_1": { "PlayerName": "a", "PlayerAlliance": "0" },
            "ingamePlayerId": 0
        }));

        let slots = collect_slots(&game).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().any(|s| s.key == "player_1" && s.index == 1));
    }

    #[test]
    fn test_collect_rejects_non_object_slot() {
        let game = fragment(json!({ "player_1": "oops" }));
        let err = collect_slots(&game).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSlot { ref slot, .. } if slot == "player_1"));
    }

    #[test]
    fn test_four_slots_resolve_by_alliance_then_index() {
        // Keys deliberately scrambled; alliance {0,0,1,1}.
        let game = fragment(json!({
            "player_4": { "PlayerName": "d", "PlayerAlliance": "1" },
            "player_1": { "PlayerName": "a", "PlayerAlliance": "1" },
            "player_3": { "PlayerName": "c", "PlayerAlliance": "0" },
            "player_2": { "PlayerName": "b", "PlayerAlliance": "0" }
        }));

        let resolved = resolve_sides(collect_slots(&game).unwrap());
        let keys: Vec<&str> = resolved.ordered.iter().map(|s| s.key.as_str()).collect();

        assert_eq!(keys, vec!["player_2", "player_3", "player_1", "player_4"]);
        assert!(resolved.unaligned.is_empty());

        let split = resolved
            .ordered
            .iter()
            .position(|s| s.player.player_alliance == "1")
            .unwrap();
        assert!(resolved.ordered[..split].iter().all(|s| s.player.player_alliance == "0"));
        assert!(resolved.ordered[split..].iter().all(|s| s.player.player_alliance == "1"));
    }

    #[test]
    fn test_numeric_suffix_sort_is_not_lexical() {
        let game = fragment(json!({
            "player_10": { "PlayerAlliance": "0" },
            "player_9": { "PlayerAlliance": "0" }
        }));

        let resolved = resolve_sides(collect_slots(&game).unwrap());
        assert_eq!(resolved.ordered[0].key, "player_9");
        assert_eq!(resolved.ordered[1].key, "player_10");
    }

    #[test]
    fn test_unaligned_slots_are_kept_separately() {
        let game = fragment(json!({
            "player_1": { "PlayerAlliance": "0" },
            "player_2": { "PlayerAlliance": "-1" },
            "player_3": { "PlayerAlliance": "1" }
        }));

        let resolved = resolve_sides(collect_slots(&game).unwrap());
        assert_eq!(resolved.ordered.len(), 2);
        assert_eq!(resolved.unaligned.len(), 1);
        assert_eq!(resolved.unaligned[0].key, "player_2");
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_local_player_by_index() {
        let game = fragment(json!({
            "player_1": { "PlayerName": "A", "PlayerUserId": "100", "PlayerAlliance": "0" },
            "player_2": { "PlayerName": "B", "PlayerUserId": "200", "PlayerAlliance": "1" }
        }));

        let resolved = resolve_sides(collect_slots(&game).unwrap());
        let local = resolved.local(1).unwrap();
        assert_eq!(local.key, "player_2");
        assert_eq!(local.player.player_user_id, "200");

        let err = resolved.local(2).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::LocalPlayerOutOfRange {
                index: 2,
                available: 2
            }
        ));
    }
}
