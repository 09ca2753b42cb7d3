//! Session middleware configuration.
//!
//! The session cookie carries only the shopper key; carts live in the
//! [`SessionRegistry`](crate::session::SessionRegistry).

use tower_sessions::cookie::{SameSite, time};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bramble_session";

/// Keys for values stored in the session.
pub mod session_keys {
    /// Opaque key identifying the shopper's cart session.
    pub const SHOPPER_KEY: &str = "shopper_key";
}

/// Create the session layer over a session store.
///
/// The server uses `tower_sessions_sqlx_store::PostgresStore`; the
/// `tower_sessions.session` table is created by migration.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let idle_seconds = i64::try_from(config.sessions.idle_timeout.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(idle_seconds)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
