//! Store error types
//!
//! Errors that can occur while the store talks to its collaborators. Nothing
//! here covers remote failures: those arrive later as `error` messages.

use palkeeper_domain::DomainError;
use palkeeper_shared::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup or validation failure on a loaded entity
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The outgoing message could not be encoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Switching to the loading view failed
    #[error("Navigation failed: {0}")]
    Navigation(anyhow::Error),

    /// The save channel refused the message
    #[error("Failed to send message: {0}")]
    Channel(anyhow::Error),
}
