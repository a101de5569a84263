//! The session entity.

use chrono::{DateTime, Utc};
use gazette_types::{PrincipalId, SessionId};

/// Links a client credential to a principal.
///
/// `principal_id` is a lookup key only; the principal may have been removed
/// from the directory while the session still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub principal_id: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    /// Start a session for `principal_id` with a fresh id.
    pub fn new(principal_id: PrincipalId, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            principal_id,
            created_at: now,
            last_seen: now,
        }
    }
}
