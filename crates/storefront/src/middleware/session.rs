//! Login sessions.
//!
//! The session holds the [`CurrentUser`](crate::models::CurrentUser) written
//! at signup or login. Rows live in `tower_sessions.session`, which the
//! migrations create.

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "chaldal_session";

/// A session idle for this long is dropped.
const IDLE_TIMEOUT: Duration = Duration::days(7);

/// Session layer backed by the storefront database.
///
/// The cookie is `Secure` only when the public base URL is https, so the
/// frontend dev server can log in over plain http.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(IDLE_TIMEOUT))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
