//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use gazette_oauth::{OAuthConfig, SharedDirectory, TokenManager};
use gazette_session::SharedSessionStore;
use gazette_spotify::SpotifyClient;
use gazette_types::SharedClock;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Client settings used to build authorization URLs.
    pub oauth: Arc<OAuthConfig>,

    /// Login upsert and refresh-before-use.
    pub tokens: Arc<TokenManager>,

    /// Live sessions.
    pub sessions: SharedSessionStore,

    /// Provider Web API client.
    pub spotify: SpotifyClient,

    /// Key encrypting the session cookie.
    pub cookie_key: Key,

    /// Fixed seed for the newspaper stats; `None` draws from the OS.
    pub rng_seed: Option<u64>,
}

impl AppState {
    /// Create a new application state with an ephemeral cookie key.
    pub fn new(
        config: ServerConfig,
        oauth: OAuthConfig,
        tokens: TokenManager,
        sessions: SharedSessionStore,
        spotify: SpotifyClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            oauth: Arc::new(oauth),
            tokens: Arc::new(tokens),
            sessions,
            spotify,
            cookie_key: Key::generate(),
            rng_seed: None,
        }
    }

    /// Use a persistent cookie key so sessions survive restarts.
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.cookie_key = key;
        self
    }

    /// Make the newspaper stats reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn directory(&self) -> &SharedDirectory {
        self.tokens.directory()
    }

    pub fn clock(&self) -> &SharedClock {
        self.tokens.clock()
    }

    /// Random source for one request.
    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
