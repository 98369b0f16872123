//! Outbound ports - Interfaces for external collaborators
//!
//! These ports define the contracts that infrastructure adapters and the UI
//! shell must implement, allowing the state store to drive navigation,
//! notifications, and the save channel without depending on concrete
//! implementations.

pub mod navigation_port;
pub mod notification_port;
pub mod save_channel_port;

pub use navigation_port::{NavigationPort, Route};
pub use notification_port::{NotificationLevel, NotificationPort};
pub use save_channel_port::SaveChannelPort;

// Re-export mock types when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use navigation_port::MockNavigationPort;
#[cfg(any(test, feature = "testing"))]
pub use notification_port::MockNotificationPort;
#[cfg(any(test, feature = "testing"))]
pub use save_channel_port::MockSaveChannelPort;
