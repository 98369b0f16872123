//! Process configuration for the client.

use std::env;

/// Default capacity of the outbound command queue
pub const DEFAULT_COMMAND_BUFFER: usize = 64;
/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "palkeeper_player=debug";

const COMMAND_BUFFER_VAR: &str = "PALKEEPER_COMMAND_BUFFER";
const LOG_FILTER_VAR: &str = "PALKEEPER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Capacity of the `CommandBus` queue
    pub command_buffer: usize,
    /// Fallback `EnvFilter` directive
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command_buffer: DEFAULT_COMMAND_BUFFER,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables (after `.env`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take defaults; an unparsable
    /// buffer size falls back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let command_buffer = match lookup(COMMAND_BUFFER_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = DEFAULT_COMMAND_BUFFER,
                        "{} must be a positive integer, using default",
                        COMMAND_BUFFER_VAR
                    );
                    defaults.command_buffer
                }
            },
            None => defaults.command_buffer,
        };

        let log_filter = lookup(LOG_FILTER_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.log_filter);

        Self {
            command_buffer,
            log_filter,
        }
    }
}
