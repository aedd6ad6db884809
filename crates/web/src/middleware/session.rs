//! Session middleware configuration.
//!
//! Sessions live server-side; the browser only holds an opaque id cookie.
//! Production uses the `PostgreSQL` store from `tower-sessions-sqlx-store`,
//! tests use `tower_sessions::MemoryStore`.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::{SECONDS_PER_DAY, WebConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cf_session";

/// Create the session layer over any session store.
///
/// # Arguments
///
/// * `store` - Backing session store
/// * `config` - Site configuration (for cookie security and expiry)
#[must_use]
pub fn create_session_layer<S: SessionStore>(store: S, config: &WebConfig) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.session_ttl_days.saturating_mul(SECONDS_PER_DAY),
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
