//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The trade-in
//! wizard lives in the session, so its lifetime bounds how long a seller
//! can sit on an open quote. The session cookie is signed with a key
//! derived from `STOREFRONT_SESSION_SECRET`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "refit_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store and a signed cookie.
///
/// The sessions table must be created via migration before first use.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());

    // Secure cookies whenever the public URL is HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

/// Derive the cookie signing key from the configured session secret.
///
/// `Key::derive_from` panics below 32 bytes of input; config validation
/// enforces that minimum before the layer is built.
fn signing_key(secret: &SecretString) -> Key {
    Key::derive_from(secret.expose_secret().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_deterministic_per_secret() {
        let secret = SecretString::from("kY8vN3qR7tW2xZ5cF9hJ4mP6sU1aD0gL");
        let a = signing_key(&secret);
        let b = signing_key(&secret);
        assert_eq!(a.master(), b.master());

        let other = SecretString::from("zQ4wE8rT2yU6iO0pA3sD7fG1hJ5kL9xC");
        assert_ne!(signing_key(&secret).master(), signing_key(&other).master());
    }

    #[test]
    fn test_signing_key_accepts_minimum_length_secret() {
        // Config validation guarantees at least 32 chars; the shortest
        // accepted secret must not panic the key derivation.
        let minimum = SecretString::from("a".repeat(32));
        let _ = signing_key(&minimum);
    }
}
