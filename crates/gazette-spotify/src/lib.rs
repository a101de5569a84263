//! Spotify Web API client.
//!
//! Fetches the data behind a Gazette front page: the user's profile, top
//! tracks, top artists and recently played tracks. Responses are validated
//! and flattened into the shapes the presentation layer consumes.
//!
//! The client never decides whether a token is fresh; callers pass the
//! access token handed out by the access guard.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_BASE_URL, SpotifyClient};
pub use error::{FetchError, Result};
pub use types::{Artist, Image, RecentTrack, Track, UserProfile};
