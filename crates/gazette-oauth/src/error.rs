//! Error types for the OAuth flow and principal storage.

use gazette_types::PrincipalId;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur in the OAuth flow.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The identity provider rejected a token request, or could not be reached.
    ///
    /// `detail` may contain the provider's response body; it is meant for logs
    /// and must not be shown to end users.
    #[error("{operation} failed (status {status:?}): {detail}")]
    UpstreamAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    /// No principal with this id exists in the directory.
    #[error("Principal not found: {0}")]
    PrincipalNotFound(PrincipalId),

    /// A principal already exists for this provider subject.
    #[error("Principal already exists for provider id {0}")]
    Conflict(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl OAuthError {
    /// Build an [`OAuthError::UpstreamAuth`].
    pub fn upstream(
        operation: &'static str,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        OAuthError::UpstreamAuth {
            operation,
            status,
            detail: detail.into(),
        }
    }

    /// Whether this error came from the identity provider.
    pub fn is_upstream(&self) -> bool {
        matches!(self, OAuthError::UpstreamAuth { .. })
    }
}
