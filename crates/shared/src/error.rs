//! Errors raised while encoding or decoding protocol messages.

use thiserror::Error;

use crate::messages::MessageType;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A payload could not be turned into JSON
    #[error("Failed to serialize {kind} message: {source}")]
    Serialize {
        kind: MessageType,
        #[source]
        source: serde_json::Error,
    },

    /// Incoming text was not a valid message envelope
    #[error("Failed to parse message: {0}")]
    Deserialize(#[source] serde_json::Error),
}
