//! User-facing application settings.
//!
//! The store only carries these; persisting them is the settings screen's job.

use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "en".to_string()
}

/// Settings synced between the client and the save service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// UI language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Any settings this client does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            extra: serde_json::Map::new(),
        }
    }
}
