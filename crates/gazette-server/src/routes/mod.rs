//! API routes.

pub mod auth;
pub mod data;
pub mod health;

pub use auth::{
    CallbackParams, LoginResponse, LogoutResponse, SessionStatusResponse, callback_handler,
    login_handler, logout_handler, session_status_handler,
};
pub use data::{
    newspaper_handler, recently_played_handler, top_artists_handler, top_tracks_handler,
    user_handler,
};
pub use health::health_routes;
