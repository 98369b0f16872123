//! Pal entity - a captured creature owned by a player or assigned to a base

use serde::{Deserialize, Serialize};

use crate::value_objects::EntryState;
use crate::{PalId, PlayerId};

/// A pal as loaded from the save file
///
/// Only the fields the editor touches are modelled; everything else the save
/// service sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pal {
    pub instance_id: PalId,
    /// Player that owns this pal (None for wild or base-only pals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<PlayerId>,
    /// Species code (e.g. "SheepBall")
    #[serde(default)]
    pub character_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub hp: u64,
    #[serde(default)]
    pub max_hp: u64,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default)]
    pub is_lucky: bool,
    #[serde(default, skip_serializing_if = "EntryState::is_none")]
    pub state: EntryState,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Pal {
    pub fn new(instance_id: PalId, character_id: impl Into<String>) -> Self {
        Self {
            instance_id,
            owner_uid: None,
            character_id: character_id.into(),
            nickname: None,
            level: 1,
            exp: 0,
            hp: 0,
            max_hp: 0,
            is_boss: false,
            is_lucky: false,
            state: EntryState::None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_owner(mut self, owner_uid: PlayerId) -> Self {
        self.owner_uid = Some(owner_uid);
        self
    }

    pub fn is_modified(&self) -> bool {
        self.state.is_modified()
    }
}
