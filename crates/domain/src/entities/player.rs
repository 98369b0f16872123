//! Player entity - a character slot in the world save, with its owned pals

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::Pal;
use crate::value_objects::EntryState;
use crate::{GuildId, PalId, PlayerId};

/// A player as loaded from the save file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub uid: PlayerId,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub hp: u64,
    #[serde(default)]
    pub max_hp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// Owned pals. Optional so a commit payload can leave it out entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pals: Option<HashMap<PalId, Pal>>,
    #[serde(default, skip_serializing_if = "EntryState::is_none")]
    pub state: EntryState,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Player {
    pub fn new(uid: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            uid,
            nickname: nickname.into(),
            level: 1,
            exp: 0,
            hp: 0,
            max_hp: 0,
            guild_id: None,
            pals: None,
            state: EntryState::None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.state.is_modified()
    }

    /// Copy of this player with the nested pal collection stripped.
    ///
    /// Pals are reported separately in a commit, never embedded in the player.
    pub fn without_pals(&self) -> Self {
        Self {
            pals: None,
            ..self.clone()
        }
    }

    pub fn pal(&self, id: &PalId) -> Option<&Pal> {
        self.pals.as_ref().and_then(|pals| pals.get(id))
    }

    pub fn pal_mut(&mut self, id: &PalId) -> Option<&mut Pal> {
        self.pals.as_mut().and_then(|pals| pals.get_mut(id))
    }

    /// Add (or replace) an owned pal, stamping its owner
    pub fn insert_pal(&mut self, pal: Pal) {
        let pal = pal.with_owner(self.uid);
        self.pals
            .get_or_insert_with(HashMap::new)
            .insert(pal.instance_id, pal);
    }

    pub fn pal_count(&self) -> usize {
        self.pals.as_ref().map_or(0, HashMap::len)
    }
}
