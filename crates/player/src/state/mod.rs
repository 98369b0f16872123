//! Client-side state: the loaded save, the user's selection, and pending
//! change tracking.

mod app_state;
mod delta;

pub use app_state::{AppState, CommitOutcome};
