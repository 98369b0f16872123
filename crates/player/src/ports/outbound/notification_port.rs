//! Notification Port - Toast-style notices shown to the user

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait NotificationPort: Send + Sync {
    fn notify(&self, message: &str, level: NotificationLevel);
}
