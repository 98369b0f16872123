//! Value objects - Immutable objects defined by their attributes

mod entry_state;
mod settings;

pub use entry_state::EntryState;
pub use settings::AppSettings;
