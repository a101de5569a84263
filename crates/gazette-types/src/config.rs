//! Defaults shared between the config crate and the components it configures.

/// Default configuration values.
pub mod defaults {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 5000;

    /// Default bind address.
    pub const DEFAULT_BIND: &str = "127.0.0.1";

    /// Seconds before expiry at which an access token is treated as stale.
    pub const REFRESH_BUFFER_SECS: i64 = 5 * 60;

    /// Timeout applied to every outbound call to the provider.
    pub const HTTP_TIMEOUT_SECS: u64 = 10;

    /// Idle lifetime of a session (24 hours).
    pub const SESSION_TTL_SECS: u64 = 24 * 60 * 60;

    /// Maximum number of live sessions kept in memory.
    pub const MAX_SESSIONS: usize = 10_000;

    /// Interval between sweeps of expired sessions.
    pub const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

    /// Name of the session cookie.
    pub const SESSION_COOKIE_NAME: &str = "gazette_session";
}
