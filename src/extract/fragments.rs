//! Locating the embedded JSON objects inside a replay container.
//!
//! Replays are not JSON documents. The client writes a binary-ish container
//! with two JSON objects somewhere inside it, wrapped across lines at
//! arbitrary points. Extraction runs in two phases so the expensive part
//! only happens for likely candidates:
//!
//! 1. [`passes_prefilter`] - plain substring checks.
//! 2. [`locate`] - anchor-bounded regex matches, then JSON decoding.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::error::{ExtractError, ExtractResult};

pub(crate) const TWO_PLAYER_MARKER: &str = r#""NbMaxPlayer":"2""#;
pub(crate) const NETWORK_MODE_MARKER: &str = r#""IsNetworkMode":"1""#;

pub(crate) const GAME_FRAGMENT: &str = "game";
pub(crate) const RESULT_FRAGMENT: &str = "result";

static GAME_PATTERN: OnceLock<Regex> = OnceLock::new();
static RESULT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn game_pattern() -> &'static Regex {
    GAME_PATTERN.get_or_init(|| {
        Regex::new(r#"\{"game":.*?"ingamePlayerId":\d+\}"#).expect("game pattern is valid")
    })
}

fn result_pattern() -> &'static Regex {
    RESULT_PATTERN
        .get_or_init(|| Regex::new(r#"\{"result":.*?\}\}"#).expect("result pattern is valid"))
}

/// Strip line breaks the client inserts in the middle of JSON tokens.
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if raw.contains(['\n', '\r']) {
        Cow::Owned(raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect())
    } else {
        Cow::Borrowed(raw)
    }
}

/// Cheap literal check run before any pattern matching.
pub fn passes_prefilter(normalized: &str) -> bool {
    normalized.contains(TWO_PLAYER_MARKER) && normalized.contains(NETWORK_MODE_MARKER)
}

/// The two decoded JSON objects of a replay.
#[derive(Debug, Clone)]
pub struct Fragments {
    /// Object starting at `{"game":`, including the `player_N` slots.
    pub game: Map<String, Value>,
    /// Object starting at `{"result":`.
    pub result: Map<String, Value>,
}

/// Find and decode both fragments in normalized content.
pub fn locate(normalized: &str) -> ExtractResult<Fragments> {
    let game = decode(game_pattern(), normalized, GAME_FRAGMENT)?;
    let result = decode(result_pattern(), normalized, RESULT_FRAGMENT)?;
    Ok(Fragments { game, result })
}

fn decode(
    pattern: &Regex,
    haystack: &str,
    fragment: &'static str,
) -> ExtractResult<Map<String, Value>> {
    let found = pattern
        .find(haystack)
        .ok_or(ExtractError::FragmentNotFound { fragment })?;

    match serde_json::from_str::<Value>(found.as_str()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractError::UnexpectedShape {
            fragment,
            reason: "not a JSON object".to_string(),
        }),
        Err(source) => Err(ExtractError::FragmentDecode { fragment, source }),
    }
}
