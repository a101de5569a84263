//! Configuration for the session store.

use chrono::Duration;
use gazette_types::config_defaults as defaults;

/// Configuration for [`crate::MemorySessionStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of sessions kept before LRU eviction.
    pub max_sessions: usize,

    /// Idle lifetime; `None` disables expiry.
    pub ttl: Option<Duration>,

    /// Interval for the background sweep of expired sessions.
    pub cleanup_interval: std::time::Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: defaults::MAX_SESSIONS,
            ttl: i64::try_from(defaults::SESSION_TTL_SECS)
                .ok()
                .and_then(Duration::try_seconds),
            cleanup_interval: std::time::Duration::from_secs(
                defaults::SESSION_CLEANUP_INTERVAL_SECS,
            ),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the idle TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sessions never expire by time.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: std::time::Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.max_sessions, 10_000);
        assert_eq!(config.ttl, Some(Duration::hours(24)));
        assert_eq!(config.cleanup_interval, std::time::Duration::from_secs(3600));
    }

    #[test]
    fn test_builders() {
        let config = StoreConfig::new()
            .with_max_sessions(5)
            .with_ttl(Duration::minutes(1))
            .with_cleanup_interval(std::time::Duration::from_secs(5));
        assert_eq!(config.max_sessions, 5);
        assert_eq!(config.ttl, Some(Duration::minutes(1)));
        assert!(config.without_ttl().ttl.is_none());
    }
}
