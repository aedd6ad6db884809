//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::{ProjectStore, UserStore};
use crate::services::{AuthService, PasswordService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
    passwords: PasswordService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `users` - User record store
    /// * `projects` - Project record store
    /// * `passwords` - Password hasher
    #[must_use]
    pub fn new(
        config: WebConfig,
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                projects,
                passwords,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get a reference to the project store.
    #[must_use]
    pub fn projects(&self) -> &dyn ProjectStore {
        self.inner.projects.as_ref()
    }

    /// Authentication service over this state's user store and hasher.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), &self.inner.passwords)
    }
}
