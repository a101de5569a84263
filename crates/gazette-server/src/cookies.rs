//! Session cookie helpers.
//!
//! The cookie only carries the opaque session id, encrypted by the
//! [`PrivateCookieJar`]. Token material never leaves the server.

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use gazette_types::SessionId;
use time::Duration;

use crate::config::ServerConfig;

/// Create the session cookie for a freshly created session.
pub fn session_cookie(config: &ServerConfig, session_id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), session_id.as_str().to_string()))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(config.session_ttl.num_seconds()))
        .build()
}

/// Create the removal cookie for the session.
pub fn clear_session_cookie(config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Session id carried by the request, if the cookie decrypts.
pub fn session_id(jar: &PrivateCookieJar, config: &ServerConfig) -> Option<SessionId> {
    jar.get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
        .map(SessionId::from_cookie)
}
