//! Guild and base containers - traversed to discover base-assigned pals

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::Pal;
use crate::{BaseId, GuildId, PalId, PlayerId};

/// A guild and the bases it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_player_uid: Option<PlayerId>,
    #[serde(default)]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub bases: HashMap<BaseId, Base>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A base camp and the pals working there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: BaseId,
    #[serde(default)]
    pub pals: HashMap<PalId, Pal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Guild {
    pub fn new(id: GuildId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            admin_player_uid: None,
            players: Vec::new(),
            bases: HashMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn insert_base(&mut self, base: Base) {
        self.bases.insert(base.id, base);
    }

    /// Every pal across every base of this guild
    pub fn pals_mut(&mut self) -> impl Iterator<Item = &mut Pal> {
        self.bases
            .values_mut()
            .flat_map(|base| base.pals.values_mut())
    }
}

impl Base {
    pub fn new(id: BaseId) -> Self {
        Self {
            id,
            pals: HashMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn insert_pal(&mut self, pal: Pal) {
        self.pals.insert(pal.instance_id, pal);
    }
}
