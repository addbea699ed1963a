//! Session middleware configuration.
//!
//! Browser sessions live in an in-process `moka` store that evicts records
//! once their inactivity expiry passes. They only carry the order-session id,
//! so losing them on restart just starts visitors over with an empty cart.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;
use crate::services::sessions::MAX_SESSIONS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "presto_session";

/// Create the session store, bounded like the order-session registry.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(MAX_SESSIONS))
}

/// Create the session layer.
///
/// The cookie and its store record expire after the same idle time as the
/// order sessions they point at.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");
    let idle_seconds = i64::try_from(config.session_idle.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
