//! JSON export surface.
//!
//! # Responsibility
//! - Serialize the current member list verbatim into the external
//!   `{ "members": [...], "exportedAt": <epoch-ms> }` document.
//! - Parse such documents back into member lists without loss.
//!
//! # Invariants
//! - Every member field round-trips: relationship ids, positions,
//!   pinned flags, and opaque passthrough fields.

use crate::model::member::{now_epoch_ms, Member};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from export serialization and parsing.
#[derive(Debug)]
pub enum ExportError {
    /// Member list could not be serialized.
    Serialize(serde_json::Error),
    /// Document is not a valid export.
    Parse(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize export: {err}"),
            Self::Parse(err) => write!(f, "invalid export document: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Exported snapshot of one family graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeExport {
    /// Member list in store order.
    pub members: Vec<Member>,
    /// Export creation time, epoch milliseconds.
    pub exported_at: i64,
}

impl TreeExport {
    /// Snapshots the given member list with the current timestamp.
    pub fn new(members: &[Member]) -> Self {
        Self {
            members: members.to_vec(),
            exported_at: now_epoch_ms(),
        }
    }

    /// Serializes the export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(ExportError::Serialize)
    }

    /// Parses an export document.
    pub fn from_json(document: &str) -> Result<Self, ExportError> {
        serde_json::from_str(document).map_err(ExportError::Parse)
    }
}
