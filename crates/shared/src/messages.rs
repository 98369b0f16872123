//! WebSocket message types for client/save-service communication
//!
//! ## Versioning Policy
//!
//! - New message types can be added at the end (forward compatible)
//! - Renaming a type's wire name is a breaking change
//! - Unknown types deserialize to `MessageType::Unknown` so older clients keep working

use std::collections::HashMap;

use palkeeper_domain::{Pal, PalId, Player, PlayerId};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

// =============================================================================
// Message Types
// =============================================================================

/// Every message kind the save service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    AddPal,
    ClonePal,
    DeletePals,
    DownloadSaveFile,
    Error,
    GetPlayers,
    GetPalDetails,
    LoadSaveFile,
    LoadZipFile,
    ProgressMessage,
    SyncAppState,
    UpdateSaveFile,
    /// Unknown type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddPal => "add_pal",
            Self::ClonePal => "clone_pal",
            Self::DeletePals => "delete_pals",
            Self::DownloadSaveFile => "download_save_file",
            Self::Error => "error",
            Self::GetPlayers => "get_players",
            Self::GetPalDetails => "get_pal_details",
            Self::LoadSaveFile => "load_save_file",
            Self::LoadZipFile => "load_zip_file",
            Self::ProgressMessage => "progress_message",
            Self::SyncAppState => "sync_app_state",
            Self::UpdateSaveFile => "update_save_file",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// A message in either direction: `{ "type": ..., "data"?: ... }`
///
/// `data` is left as raw JSON; its shape is decided by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Message {
    pub fn new(kind: MessageType, data: serde_json::Value) -> Self {
        Self {
            kind,
            data: Some(data),
        }
    }

    /// A message that carries no data (e.g. `get_players`)
    pub fn request(kind: MessageType) -> Self {
        Self { kind, data: None }
    }

    /// Build the commit message for a delta
    pub fn update_save_file(payload: &UpdateSaveFileData) -> Result<Self, ProtocolError> {
        let data = serde_json::to_value(payload).map_err(|source| ProtocolError::Serialize {
            kind: MessageType::UpdateSaveFile,
            source,
        })?;
        Ok(Self::new(MessageType::UpdateSaveFile, data))
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self::new(
            MessageType::ProgressMessage,
            serde_json::Value::String(text.into()),
        )
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageType::Error, serde_json::Value::String(text.into()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|source| ProtocolError::Serialize {
            kind: self.kind,
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Deserialize)
    }

    /// Human-readable text carried by progress and error messages.
    ///
    /// Accepts either a bare string or an object with a `message` field;
    /// anything else is rendered as its JSON text.
    pub fn text(&self) -> Option<String> {
        match self.data.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => match map.get("message") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                _ => Some(serde_json::Value::Object(map.clone()).to_string()),
            },
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// Update Save File Payload
// =============================================================================

/// The delta sent on commit: only entities that changed, keyed by id.
///
/// Absent keys are omitted from the wire entirely; a message is never built
/// when both would be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSaveFileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_pals: Option<HashMap<PalId, Pal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_players: Option<HashMap<PlayerId, Player>>,
}

impl UpdateSaveFileData {
    /// Materialize swept entries in order; a later entry for the same id
    /// replaces an earlier one.
    pub fn from_entries(pals: Vec<(PalId, Pal)>, players: Vec<(PlayerId, Player)>) -> Self {
        Self {
            modified_pals: (!pals.is_empty()).then(|| pals.into_iter().collect()),
            modified_players: (!players.is_empty()).then(|| players.into_iter().collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modified_pals.is_none() && self.modified_players.is_none()
    }

    pub fn pal_count(&self) -> usize {
        self.modified_pals.as_ref().map_or(0, HashMap::len)
    }

    pub fn player_count(&self) -> usize {
        self.modified_players.as_ref().map_or(0, HashMap::len)
    }

    pub fn pal_ids(&self) -> impl Iterator<Item = PalId> + '_ {
        self.modified_pals.iter().flat_map(|pals| pals.keys().copied())
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.modified_players
            .iter()
            .flat_map(|players| players.keys().copied())
    }

    /// Entity kinds present, in payload order
    pub fn entity_kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::with_capacity(2);
        if self.modified_pals.is_some() {
            kinds.push("pals");
        }
        if self.modified_players.is_some() {
            kinds.push("players");
        }
        kinds
    }

    /// Status line shown while the service applies this delta
    pub fn progress_text(&self) -> String {
        format!("Updating modified {}", self.entity_kinds().join(" and "))
    }
}

// =============================================================================
// Inbound Messages
// =============================================================================

/// What the client does with a message pushed back by the service
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Free-text status update
    Progress(String),
    /// The service failed to process a request
    Error(String),
    /// The service applied the last `update_save_file`
    SaveAcknowledged,
    /// Anything else, for the screen that requested it
    Other(Message),
}

impl From<Message> for InboundMessage {
    fn from(message: Message) -> Self {
        match message.kind {
            MessageType::ProgressMessage => Self::Progress(message.text().unwrap_or_default()),
            MessageType::Error => Self::Error(
                message
                    .text()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            MessageType::UpdateSaveFile => Self::SaveAcknowledged,
            MessageType::Unknown => {
                tracing::warn!("Received message with unknown type, passing through");
                Self::Other(message)
            }
            _ => Self::Other(message),
        }
    }
}
