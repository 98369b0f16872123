//! Startup wiring for the client.
//!
//! The UI shell calls [`init_logging`] once, then [`build`] with its own
//! navigation and notification adapters. It keeps the returned receiver and
//! hands it to whatever transport talks to the save service.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;
use crate::infrastructure::CommandBus;
use crate::ports::outbound::{NavigationPort, NotificationPort};
use crate::state::AppState;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this twice is harmless.
pub fn init_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Everything the shell needs to drive the editor
pub struct ClientRuntime {
    pub state: AppState,
    pub command_bus: CommandBus,
    /// Serialized messages queued for the save service
    pub outbound: mpsc::Receiver<String>,
}

pub fn build(
    config: &ClientConfig,
    navigation: Arc<dyn NavigationPort>,
    notifications: Arc<dyn NotificationPort>,
) -> ClientRuntime {
    let (command_bus, outbound) = CommandBus::channel(config.command_buffer);
    let channel = Arc::new(command_bus.clone());
    let state = AppState::new(channel, navigation, notifications);

    tracing::info!(
        command_buffer = config.command_buffer,
        "Palkeeper client ready"
    );

    ClientRuntime {
        state,
        command_bus,
        outbound,
    }
}
