//! Palkeeper Domain - the editable model of a loaded world save.
//!
//! Players own pals, guilds own bases, bases host pals. Every editable entity
//! carries an [`EntryState`] lifecycle tag that the client store sweeps when
//! it commits changes back to the save service.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{Base, GamepassSave, Guild, ItemContainerSlot, Pal, Player, SaveFile};
pub use error::DomainError;
pub use ids::{BaseId, GuildId, PalId, PlayerId};
pub use value_objects::{AppSettings, EntryState};
