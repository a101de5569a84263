//! Guarded data endpoints.
//!
//! Every handler here runs behind [`crate::auth::access_guard`] and reads the
//! fresh token from the [`AccessGrant`] extension.

use axum::{Extension, Json, extract::State};
use gazette_digest::Newspaper;
use gazette_oauth::AccessGrant;
use gazette_spotify::{Artist, RecentTrack, Track};
use serde_json::Value;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// `GET /api/user`: the profile snapshot stored at login.
pub async fn user_handler(
    State(state): State<AppState>,
    Extension(grant): Extension<AccessGrant>,
) -> Result<Json<Value>> {
    let principal = state
        .directory()
        .get(&grant.principal_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    principal
        .profile_snapshot
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("User profile not found".to_string()))
}

/// `GET /api/top-tracks`
pub async fn top_tracks_handler(
    State(state): State<AppState>,
    Extension(grant): Extension<AccessGrant>,
) -> Result<Json<Vec<Track>>> {
    Ok(Json(state.spotify.top_tracks(&grant.access_token).await?))
}

/// `GET /api/recently-played`
pub async fn recently_played_handler(
    State(state): State<AppState>,
    Extension(grant): Extension<AccessGrant>,
) -> Result<Json<Vec<RecentTrack>>> {
    Ok(Json(state.spotify.recently_played(&grant.access_token).await?))
}

/// `GET /api/top-artists`
pub async fn top_artists_handler(
    State(state): State<AppState>,
    Extension(grant): Extension<AccessGrant>,
) -> Result<Json<Vec<Artist>>> {
    Ok(Json(state.spotify.top_artists(&grant.access_token).await?))
}

/// `GET /api/newspaper-data`: profile, top tracks and top artists plus the
/// derived genres, mood and stats.
pub async fn newspaper_handler(
    State(state): State<AppState>,
    Extension(grant): Extension<AccessGrant>,
) -> Result<Json<Newspaper>> {
    let token = grant.access_token.as_str();
    let user = state.spotify.profile(token).await?;
    let tracks = state.spotify.top_tracks(token).await?;
    let artists = state.spotify.top_artists(token).await?;

    let now = state.clock().now();
    let paper = Newspaper::assemble(user, tracks, artists, now, &mut state.rng());
    tracing::debug!(
        principal_id = %grant.principal_id,
        mood = %paper.mood,
        genres = paper.genres.len(),
        "Newspaper assembled"
    );
    Ok(Json(paper))
}
