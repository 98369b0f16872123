//! Save Channel Port - Outbound port for the save-service connection
//!
//! This port abstracts the message channel to the save-processing service.
//! Delivery, framing and retries belong to the implementation.

use palkeeper_shared::Message;

/// Fire-and-forget channel plus an observable status slot
///
/// NOTE: This trait is intentionally **object-safe** so the store can hold an
/// `Arc<dyn SaveChannelPort>` without depending on concrete transport types.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SaveChannelPort: Send + Sync {
    /// Queue a serialized message for delivery. Returns once queued.
    fn send(&self, message: &str) -> anyhow::Result<()>;

    /// Replace the message shown as current status (last write wins)
    fn set_message(&self, message: Message);

    /// Current status message, if any
    fn message(&self) -> Option<Message>;
}
