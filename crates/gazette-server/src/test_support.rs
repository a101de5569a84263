//! Fixtures for the in-crate router tests.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum_extra::extract::PrivateCookieJar;
use chrono::{Duration, TimeZone, Utc};
use gazette_oauth::{
    InMemoryDirectory, LoginProfile, MockIdentityProvider, OAuthConfig, TokenGrant, TokenManager,
};
use gazette_session::{MemorySessionStore, Session, StoreConfig};
use gazette_spotify::SpotifyClient;
use gazette_types::{ManualClock, SessionId};
use serde_json::json;

use crate::config::ServerConfig;
use crate::cookies;
use crate::state::AppState;

/// Nothing listens here; requests to it fail fast.
const UNROUTABLE_API: &str = "http://127.0.0.1:9/v1";

pub struct TestState {
    pub state: AppState,
    pub provider: Arc<MockIdentityProvider>,
    pub directory: Arc<InMemoryDirectory>,
    pub clock: Arc<ManualClock>,
}

impl TestState {
    pub fn new() -> Self {
        Self::with_api(UNROUTABLE_API)
    }

    pub fn with_api(api_base_url: &str) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let provider = Arc::new(MockIdentityProvider::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let tokens = TokenManager::new(provider.clone(), directory.clone(), clock.clone());
        let sessions = Arc::new(MemorySessionStore::new(
            StoreConfig::default().with_ttl(Duration::hours(24)),
            clock.clone(),
        ));
        let spotify = SpotifyClient::new(api_base_url, StdDuration::from_secs(2)).unwrap();
        let oauth = OAuthConfig::new("client-1", "secret-1", "http://localhost:5000/api/callback");

        let state = AppState::new(ServerConfig::default(), oauth, tokens, sessions, spotify)
            .with_rng_seed(7);

        Self {
            state,
            provider,
            directory,
            clock,
        }
    }

    /// Record a login for `provider_id` and open a session for it.
    pub async fn login(&self, provider_id: &str, access_token: &str, expires_in: u64) -> Session {
        let grant = TokenGrant::new(access_token, expires_in)
            .with_refresh_token(format!("refresh-{}", provider_id));
        let profile = LoginProfile {
            provider_id: provider_id.to_string(),
            display_name: Some(provider_id.to_uppercase()),
            snapshot: Some(json!({ "id": provider_id, "display_name": provider_id.to_uppercase() })),
        };
        let principal = self
            .state
            .tokens
            .complete_login(profile, grant)
            .await
            .unwrap();
        self.state.sessions.create(principal.id).await.unwrap()
    }
}

/// `Cookie` header value carrying the encrypted session id.
pub fn cookie_header(state: &AppState, session_id: &SessionId) -> String {
    let jar = PrivateCookieJar::new(state.cookie_key.clone())
        .add(cookies::session_cookie(&state.config, session_id));
    let response = jar.into_response();
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
