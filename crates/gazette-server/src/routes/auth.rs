//! Login, callback, session status and logout.

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use gazette_oauth::LoginProfile;
use gazette_session::Session;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::auth::current_session;
use crate::cookies;
use crate::error::{Result, ServerError};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Response for `GET /api/login`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Provider consent URL to send the browser to.
    pub login_url: String,
}

/// Query parameters the provider appends to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    /// Echoed state token. Not checked.
    pub state: Option<String>,
}

/// Response for `GET /api/session`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub is_authenticated: bool,
}

/// Response for `POST /api/logout`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/login`
pub async fn login_handler(State(state): State<AppState>) -> Result<Json<LoginResponse>> {
    let request = state.oauth.authorization_request()?;
    debug!("Authorization URL issued");
    Ok(Json(LoginResponse {
        login_url: request.url,
    }))
}

/// `GET /api/callback`
///
/// Always answers with a redirect. Failures carry a generic error tag; the
/// detail only goes to the log.
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> std::result::Result<(PrivateCookieJar, Redirect), Redirect> {
    let config = &state.config;

    if let Some(reason) = params.error.as_deref() {
        warn!(reason, "Provider reported an authorization error");
        return Err(Redirect::to(&config.home_with_error("access_denied")));
    }

    let Some(code) = params.code.as_deref().filter(|code| !code.is_empty()) else {
        warn!("Callback without an authorization code");
        return Err(Redirect::to(&config.home_with_error("invalid_code")));
    };

    let session = match complete_callback(&state, code).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Callback failed");
            return Err(Redirect::to(&config.home_with_error("callback_failed")));
        }
    };

    // A second login from the same browser replaces its old session.
    if let Some(previous) = cookies::session_id(&jar, config)
        && previous != session.id
        && let Err(e) = state.sessions.delete(&previous).await
    {
        warn!(error = %e, "Failed to drop the previous session");
    }

    info!(principal_id = %session.principal_id, "Login complete");
    let jar = jar.add(cookies::session_cookie(config, &session.id));
    Ok((jar, Redirect::to(&config.home_path)))
}

/// Exchange the code, learn who logged in, upsert them and open a session.
async fn complete_callback(state: &AppState, code: &str) -> Result<Session> {
    let grant = state.tokens.exchange_code(code).await?;
    let profile = state.spotify.profile(&grant.access_token).await?;
    let snapshot = serde_json::to_value(&profile)
        .map_err(|e| ServerError::Internal(format!("profile snapshot: {}", e)))?;

    let principal = state
        .tokens
        .complete_login(
            LoginProfile {
                provider_id: profile.id.clone(),
                display_name: Some(profile.display_name.clone()),
                snapshot: Some(snapshot),
            },
            grant,
        )
        .await?;

    Ok(state.sessions.create(principal.id).await?)
}

/// `GET /api/session`
pub async fn session_status_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<Json<SessionStatusResponse>> {
    let session = current_session(&state, &jar).await?;
    Ok(Json(SessionStatusResponse {
        is_authenticated: session.is_some(),
    }))
}

/// `POST /api/logout`
///
/// Destroys the session only; the principal and its tokens stay stored.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<LogoutResponse>)> {
    if let Some(id) = cookies::session_id(&jar, &state.config) {
        let existed = state.sessions.delete(&id).await?;
        debug!(existed, "Session destroyed");
    }

    let jar = jar.remove(cookies::clear_session_cookie(&state.config));
    Ok((
        jar,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}
