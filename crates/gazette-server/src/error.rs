//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gazette_oauth::OAuthError;
use gazette_spotify::FetchError;
use serde::Serialize;
use thiserror::Error;

/// Server error type.
///
/// The `Display` output carries upstream detail and is only logged. Clients
/// get a fixed message per variant, except `NotFound` which names the
/// missing resource.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No usable session, or the token could not be kept fresh.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The identity provider failed outside the access guard.
    #[error("Upstream auth error: {0}")]
    UpstreamAuth(String),

    /// The provider's Web API failed.
    #[error("Upstream data error: {0}")]
    UpstreamData(String),

    /// The provider answered with an unexpected payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<OAuthError> for ServerError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::UpstreamAuth { .. } => ServerError::UpstreamAuth(e.to_string()),
            OAuthError::PrincipalNotFound(id) => {
                ServerError::Unauthenticated(format!("principal {} not found", id))
            }
            OAuthError::Config(msg) => ServerError::Config(msg),
            OAuthError::Conflict(_) | OAuthError::InvalidRequest(_) => {
                ServerError::Internal(e.to_string())
            }
        }
    }
}

impl From<FetchError> for ServerError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::UpstreamData { .. } => ServerError::UpstreamData(e.to_string()),
            FetchError::Validation(msg) => ServerError::Validation(msg),
            FetchError::Config(msg) => ServerError::Config(msg),
        }
    }
}

impl From<gazette_session::Error> for ServerError {
    fn from(e: gazette_session::Error) -> Self {
        if e.is_missing() {
            ServerError::Unauthenticated(e.to_string())
        } else {
            ServerError::Internal(e.to_string())
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ServerError {
    /// Status and code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ServerError::UpstreamAuth(_) => (StatusCode::BAD_GATEWAY, "upstream_auth_error"),
            ServerError::UpstreamData(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ServerError::Validation(_) => (StatusCode::BAD_GATEWAY, "invalid_upstream_data"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        }
    }

    /// Message safe to return to the browser.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Unauthenticated(_) => "Not authenticated".to_string(),
            ServerError::UpstreamAuth(_) => "Authentication with the provider failed".to_string(),
            ServerError::UpstreamData(_) | ServerError::Validation(_) => {
                "Failed to fetch data from the provider".to_string()
            }
            ServerError::NotFound(what) => what.clone(),
            ServerError::Internal(_) | ServerError::Config(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = self.to_string();

        match &self {
            ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::UpstreamAuth(_)
            | ServerError::UpstreamData(_)
            | ServerError::Validation(_) => {
                tracing::error!(status = %status, code, error = %detail, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %detail, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
