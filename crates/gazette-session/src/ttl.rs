//! TTL tracking for session expiration.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use gazette_types::SessionId;

/// Tracks last access times for idle expiry.
///
/// Times are passed in rather than read, so the owner decides which clock
/// applies.
#[derive(Debug)]
pub struct TtlTracker {
    access_times: HashMap<SessionId, DateTime<Utc>>,
    ttl: Option<Duration>,
}

impl TtlTracker {
    /// Create a tracker; `None` means sessions never expire.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            access_times: HashMap::new(),
            ttl,
        }
    }

    /// Record an access (resets the idle timer).
    pub fn touch(&mut self, id: &SessionId, now: DateTime<Utc>) {
        self.access_times.insert(id.clone(), now);
    }

    /// Whether the session has been idle longer than the TTL.
    ///
    /// An untracked session counts as expired.
    pub fn is_expired(&self, id: &SessionId, now: DateTime<Utc>) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) => match self.access_times.get(id) {
                None => true,
                Some(last) => now - *last > ttl,
            },
        }
    }

    pub fn remove(&mut self, id: &SessionId) {
        self.access_times.remove(id);
    }

    /// Remove all expired entries and return their ids.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<SessionId> {
        let Some(ttl) = self.ttl else {
            return Vec::new();
        };
        let expired: Vec<SessionId> = self
            .access_times
            .iter()
            .filter(|(_, last)| now - **last > ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.access_times.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.access_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.access_times.is_empty()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
