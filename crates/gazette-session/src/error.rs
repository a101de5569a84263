//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No session with this id.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Session has been idle longer than the TTL.
    #[error("Session expired: {0}")]
    Expired(String),

    /// Backing store failure.
    #[error("Session store error: {0}")]
    Store(String),
}

impl Error {
    /// Whether the session is simply absent (unknown or expired).
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Expired(_))
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
