//! Navigation Port - Switches the UI between screens
//!
//! The store only ever navigates to the blocking loading screen before a
//! commit, but the route set mirrors the whole client.

use async_trait::async_trait;

/// Top-level screens of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    /// Blocking view shown while the save service works
    Loading,
    Edit,
    File,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Loading => "/loading",
            Route::Edit => "/edit",
            Route::File => "/file",
            Route::Settings => "/settings",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Port for screen navigation
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NavigationPort: Send + Sync {
    /// Navigate to `route`, resolving once the view has switched
    async fn goto(&self, route: Route) -> anyhow::Result<()>;
}
