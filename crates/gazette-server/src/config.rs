//! Server configuration.

use std::net::SocketAddr;

use chrono::Duration;
use gazette_types::config_defaults;

/// Path the browser lands on after the callback, with or without an error tag.
pub const DEFAULT_HOME_PATH: &str = "/";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,

    /// Idle lifetime of a session; also the cookie max-age.
    pub session_ttl: Duration,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Redirect target after the callback.
    pub home_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], config_defaults::DEFAULT_PORT)),
            cookie_name: config_defaults::SESSION_COOKIE_NAME.to_string(),
            secure_cookies: false,
            session_ttl: Duration::seconds(config_defaults::SESSION_TTL_SECS as i64),
            cors_origins: Vec::new(),
            home_path: DEFAULT_HOME_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Set the session lifetime used for the cookie max-age.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    /// Redirect target carrying an error tag, e.g. `/?error=invalid_code`.
    pub fn home_with_error(&self, tag: &str) -> String {
        format!("{}?error={}", self.home_path, tag)
    }
}
