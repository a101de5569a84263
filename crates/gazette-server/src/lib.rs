//! HTTP API server for Gazette.
//!
//! Serves the login flow and the data endpoints the newspaper front end
//! reads from. Browsers authenticate with an encrypted session cookie; the
//! provider tokens stay on the server.
//!
//! # Routes
//!
//! - `GET /health`
//! - `GET /api/login`, `GET /api/callback`, `GET /api/session`, `POST /api/logout`
//! - Guarded: `GET /api/user`, `/api/top-tracks`, `/api/recently-played`,
//!   `/api/top-artists`, `/api/newspaper-data`
//!
//! # Example
//!
//! ```ignore
//! use gazette_server::{AppState, Server, ServerConfig};
//!
//! let state = AppState::new(config, oauth, tokens, sessions, spotify)
//!     .with_cookie_key(key);
//! Server::from_state(state).run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use auth::{access_guard, current_session};
pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The Gazette HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(routes::health_routes())
            .nest("/api", self.api_routes());

        let router = match self.cors_layer() {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Routes under `/api`.
    ///
    /// Only the data routes sit behind the access guard.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        let guarded = Router::new()
            .route("/user", get(routes::user_handler))
            .route("/top-tracks", get(routes::top_tracks_handler))
            .route("/recently-played", get(routes::recently_played_handler))
            .route("/top-artists", get(routes::top_artists_handler))
            .route("/newspaper-data", get(routes::newspaper_handler))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::access_guard,
            ));

        Router::new()
            .route("/login", get(routes::login_handler))
            .route("/callback", get(routes::callback_handler))
            .route("/session", get(routes::session_status_handler))
            .route("/logout", post(routes::logout_handler))
            .merge(guarded)
    }

    /// CORS for the configured origins; credentials are allowed so the
    /// session cookie reaches the API from the front end's origin.
    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        )
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
