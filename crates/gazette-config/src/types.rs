//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]      # bind address, cookies, outbound timeout
//! [provider]    # OAuth client credentials and endpoint overrides
//! [session]     # session lifetime and capacity
//! [logging]     # log file output
//! ```

use std::path::PathBuf;

use gazette_types::config_defaults as defaults;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. a project-local
/// override holding only `[server]`) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazetteConfig {
    /// HTTP server settings.
    pub server: Option<ServerConfig>,

    /// Identity provider (OAuth client) settings.
    pub provider: Option<ProviderConfig>,

    /// Session store settings.
    pub session: Option<SessionConfig>,

    /// Log output settings.
    pub logging: Option<LoggingConfig>,
}

impl GazetteConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: GazetteConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.provider.is_some() {
            self.provider = other.provider;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server section, or defaults when absent.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Provider section, or defaults when absent.
    pub fn provider(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }

    /// Session section, or defaults when absent.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Logging section, or defaults when absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Copy of this config with credentials replaced by a marker, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(ref mut provider) = copy.provider
            && provider.client_secret.is_some()
        {
            provider.client_secret = Some("<redacted>".to_string());
        }
        copy
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Public base URL of the app; used to derive the default redirect URI.
    pub base_url: Option<String>,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Timeout in seconds for every outbound call to the provider.
    pub request_timeout_secs: u64,
    /// CORS allowed origins (empty = no CORS layer).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::DEFAULT_PORT,
            bind: defaults::DEFAULT_BIND.to_string(),
            base_url: None,
            secure_cookies: false,
            cookie_name: defaults::SESSION_COOKIE_NAME.to_string(),
            request_timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Base URL the app is reachable at.
    pub fn public_base_url(&self) -> String {
        match self.base_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: [&str; 4] = [
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-read-recently-played",
];

/// Identity provider section.
///
/// Credentials are normally supplied through the environment; see
/// [`crate::secrets`] for the resolution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// OAuth client identifier.
    pub client_id: Option<String>,
    /// OAuth client secret (prefer the env var).
    pub client_secret: Option<String>,
    /// Callback URI registered with the provider.
    pub redirect_uri: Option<String>,
    /// Requested scopes.
    pub scopes: Vec<String>,
    /// Authorization endpoint override.
    pub authorize_url: Option<String>,
    /// Token endpoint override.
    pub token_url: Option<String>,
    /// Web API base URL override.
    pub api_base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            authorize_url: None,
            token_url: None,
            api_base_url: None,
        }
    }
}

impl ProviderConfig {
    /// Whether the config file carries the client secret in plaintext.
    pub fn has_plaintext_secret(&self) -> bool {
        self.client_secret
            .as_ref()
            .is_some_and(|secret| !secret.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle lifetime of a session in seconds.
    pub ttl_secs: u64,
    /// Maximum number of sessions kept before LRU eviction.
    pub max_sessions: usize,
    /// Interval in seconds between sweeps of expired sessions.
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::SESSION_TTL_SECS,
            max_sessions: defaults::MAX_SESSIONS,
            cleanup_interval_secs: defaults::SESSION_CLEANUP_INTERVAL_SECS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write JSON logs to a daily rolling file in addition to the console.
    pub file: bool,
    /// Directory for log files (defaults to `<config dir>/logs`).
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            dir: None,
        }
    }
}
