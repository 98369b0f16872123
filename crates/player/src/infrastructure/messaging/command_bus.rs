//! Command Bus for sending messages to the save service.
//!
//! The bus is the in-process end of the save channel: the store queues
//! serialized messages on it and the transport task drains the receiver.
//! It also owns the status slot that both sides update.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use palkeeper_shared::{Message, MessageType, ProtocolError};
use tokio::sync::mpsc;

use crate::ports::outbound::SaveChannelPort;

/// Command bus for sending messages to the save service.
///
/// This is a concrete struct that can be cloned and shared. The store holds
/// it as an `Arc<dyn SaveChannelPort>`.
#[derive(Clone)]
pub struct CommandBus {
    tx: mpsc::Sender<String>,
    message: Arc<Mutex<Option<Message>>>,
}

impl CommandBus {
    /// Create a new CommandBus with the given channel sender.
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            tx,
            message: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a bus together with the receiver the transport drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Shared handle to the status slot (for the transport side)
    pub fn message_slot(&self) -> Arc<Mutex<Option<Message>>> {
        Arc::clone(&self.message)
    }

    /// Decode text pushed by the service.
    ///
    /// Progress and error messages also replace the status slot; the decoded
    /// message is returned either way for the store to handle.
    pub fn receive(&self, text: &str) -> Result<Message, ProtocolError> {
        let message = Message::from_json(text)?;
        if matches!(
            message.kind,
            MessageType::ProgressMessage | MessageType::Error
        ) {
            self.set_message(message.clone());
        }
        tracing::debug!(kind = %message.kind, "Received message");
        Ok(message)
    }
}

impl SaveChannelPort for CommandBus {
    /// Fire-and-forget. Returns immediately after queueing the message.
    fn send(&self, message: &str) -> Result<()> {
        self.tx
            .try_send(message.to_string())
            .map_err(|e| anyhow::anyhow!("CommandBus send failed: {}", e))
    }

    fn set_message(&self, message: Message) {
        let mut slot = self.message.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(message);
    }

    fn message(&self) -> Option<Message> {
        self.message
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
