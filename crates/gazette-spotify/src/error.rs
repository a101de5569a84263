//! Fetch error types.

/// Errors from Web API calls.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The API answered with a non-success status, or could not be reached.
    ///
    /// `detail` may carry the response body and is for logs only.
    #[error("{endpoint} failed (status {status:?}): {detail}")]
    UpstreamData {
        endpoint: &'static str,
        status: Option<u16>,
        detail: String,
    },

    /// The payload does not have the expected shape.
    #[error("Invalid {0}")]
    Validation(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub(crate) fn upstream(
        endpoint: &'static str,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        FetchError::UpstreamData {
            endpoint,
            status,
            detail: detail.into(),
        }
    }

    /// HTTP status returned by the API, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::UpstreamData { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
