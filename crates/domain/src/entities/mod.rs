//! Domain entities - Save-file objects with identity

mod guild;
mod item;
mod pal;
mod player;
mod save_file;

pub use guild::{Base, Guild};
pub use item::ItemContainerSlot;
pub use pal::Pal;
pub use player::Player;
pub use save_file::{GamepassSave, SaveFile};
