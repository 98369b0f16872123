//! Save-file metadata records
//!
//! The store passes these through to the file screens untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A save file (world `Level.sav` or a per-player `.sav`) known to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SaveFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            extra: serde_json::Map::new(),
        }
    }
}

/// A world save discovered in the Xbox / Game Pass container store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepassSave {
    pub save_id: String,
    #[serde(default)]
    pub world_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
