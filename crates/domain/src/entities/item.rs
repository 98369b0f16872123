//! Inventory slot contents, used by the editor's copy/paste clipboard

use serde::{Deserialize, Serialize};

/// One slot of an item container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContainerSlot {
    pub slot_index: u32,
    pub static_id: String,
    #[serde(default)]
    pub count: u32,
    /// Durability and similar per-instance data, opaque to the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_item: Option<serde_json::Value>,
}
