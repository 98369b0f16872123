//! Palkeeper client crate.
//!
//! Holds the editor's state store, the ports it drives, and the in-process
//! save channel. Screens and the transport to the save service live outside
//! this crate and plug in through `ports::outbound`.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod runner;
pub mod state;

pub use application::StoreError;
pub use config::ClientConfig;
pub use infrastructure::CommandBus;
pub use state::{AppState, CommitOutcome};
