//! Error and rejection types for record extraction.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content that should have yielded a record but could not be decoded.
///
/// These are never cached as negatives: a later release that understands the
/// content better gets another chance at the file.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no `{fragment}` fragment found")]
    FragmentNotFound { fragment: &'static str },

    #[error("`{fragment}` fragment is not valid JSON: {source}")]
    FragmentDecode {
        fragment: &'static str,
        source: serde_json::Error,
    },

    #[error("`{fragment}` fragment has an unexpected shape: {reason}")]
    UnexpectedShape {
        fragment: &'static str,
        reason: String,
    },

    #[error("invalid player slot {slot}: {source}")]
    InvalidSlot {
        slot: String,
        source: serde_json::Error,
    },

    #[error("in-game player index {index} out of range for {available} resolved players")]
    LocalPlayerOutOfRange { index: usize, available: usize },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Why a readable replay was confirmed not to be a qualifying match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Lobby is not a two-player lobby.
    NotTwoPlayer,
    /// Not an online match.
    NotNetworkMode,
    /// Server-hosted session.
    Hosted,
    /// Player-count or network-mode fields are absent.
    MissingModeFields,
    /// Rejected by an earlier scan; the reason was not persisted.
    PreviouslyRejected,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotTwoPlayer => "not a two-player lobby",
            RejectReason::NotNetworkMode => "not a network match",
            RejectReason::Hosted => "server-hosted session",
            RejectReason::MissingModeFields => "player count or network mode missing",
            RejectReason::PreviouslyRejected => "rejected by a previous scan",
        };
        f.write_str(text)
    }
}
