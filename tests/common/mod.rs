//! Replay fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const RANKED_LOBBY: &str =
    r#""Map":"_2x3_Gorlitz","NbMaxPlayer":"2","IsNetworkMode":"1","GameMode":"1","Version":"1.2.3""#;

/// A replay container around the two JSON fragments, with line breaks in the
/// middle of tokens the way the client writes them.
pub fn replay_with(lobby: &str, local_id: &str, local_name: &str, ingame_player_id: u32) -> String {
    format!(
        concat!(
            "RPL3\u{0}\u{1}header-bytes\n",
            r#"{{"game":{{{lobby}}},"#,
            r#""player_1":{{"PlayerAlliance":"0","PlayerName":"{name}","PlayerUserId":"{id}","PlayerElo":1512.5}},"#,
            "\n",
            r#""player_2":{{"PlayerAlliance":"1","PlayerName":"Opponent","PlayerUserId":"900","PlayerElo":"1490"}},"#,
            r#""ingame"#,
            "\r\n",
            r#"PlayerId":{index}}}"#,
            "\u{2}padding\n",
            r#"{{"result":{{"Duration":"1234","Victory":"3"}}}}"#,
            "trailer"
        ),
        lobby = lobby,
        name = local_name,
        id = local_id,
        index = ingame_player_id,
    )
}

/// A qualifying match recorded by `local_id`.
pub fn ranked_replay(local_id: &str, local_name: &str) -> String {
    replay_with(RANKED_LOBBY, local_id, local_name, 0)
}

/// Content that passes the literal pre-filter but has no decodable fragments.
pub fn malformed_replay() -> String {
    r#"junk "NbMaxPlayer":"2" more junk "IsNetworkMode":"1" {"game":{"#.to_string()
}

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
