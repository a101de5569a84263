//! Access guard for the data endpoints.
//!
//! Resolves the session cookie to a session, the session to a principal, and
//! the principal to an access token that stays valid for at least the refresh
//! buffer. Handlers behind the guard read the [`AccessGrant`] and the
//! [`Session`] from request extensions.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use gazette_oauth::{GuardState, OAuthError};
use gazette_session::Session;
use tracing::debug;

use crate::cookies;
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Session named by the request cookie, if it is still live.
///
/// Unknown and expired sessions read as `None`; only store failures error.
pub async fn current_session(state: &AppState, jar: &PrivateCookieJar) -> Result<Option<Session>> {
    let Some(id) = cookies::session_id(jar, &state.config) else {
        return Ok(None);
    };

    match state.sessions.get(&id).await {
        Ok(session) => Ok(Some(session)),
        Err(e) if e.is_missing() => {
            debug!(error = %e, "Session cookie names no live session");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Guard middleware.
///
/// Every rejection is `401` with a generic body, whatever the guard state.
/// Admitted requests get the session cookie re-issued, so its max-age
/// slides with the store's idle TTL.
pub async fn access_guard(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let Some(session) = current_session(&state, &jar).await? else {
        debug!(state = %GuardState::NoSession, "Access guard");
        return Err(ServerError::Unauthenticated("no live session".to_string()));
    };

    let grant = state
        .tokens
        .ensure_fresh(&session.principal_id)
        .await
        .map_err(|e| match e {
            OAuthError::UpstreamAuth { .. } => {
                ServerError::Unauthenticated(format!("token refresh rejected: {}", e))
            }
            other => ServerError::from(other),
        })?;

    let cookie = cookies::session_cookie(&state.config, &session.id);
    request.extensions_mut().insert(session);
    request.extensions_mut().insert(grant);

    let response = next.run(request).await;
    Ok((jar.add(cookie), response).into_response())
}
