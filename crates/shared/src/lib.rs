//! Palkeeper Protocol - messages exchanged between the editor client and the
//! save-processing service.
//!
//! Every message is a `{ "type": ..., "data"?: ... }` envelope. The client
//! builds `update_save_file` with a typed payload and recognizes the
//! `progress_message` and `error` pushes; every other kind travels as opaque
//! JSON between the service and whichever screen asked for it.
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, thiserror and tracing
//! 2. **No business logic** - Envelope, payloads, and their serialization
//! 3. **Forward compatible** - Unknown message types decode to `MessageType::Unknown`

pub mod error;
pub mod messages;

pub use error::ProtocolError;
pub use messages::{InboundMessage, Message, MessageType, UpdateSaveFileData};
