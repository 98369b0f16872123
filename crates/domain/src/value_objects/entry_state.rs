//! Lifecycle tag carried by every editable save-file entity.

use serde::{Deserialize, Serialize};

/// Whether an entity changed since the save file was last persisted.
///
/// Anything other than [`EntryState::None`] means the entity is pending a
/// commit. `None` is never written to the wire; entities in a commit payload
/// carry no `state` field at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    #[default]
    None,
    Modified,
    Added,
    Deleted,
}

impl EntryState {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, Self::Modified)
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Modified => write!(f, "modified"),
            Self::Added => write!(f, "added"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}
