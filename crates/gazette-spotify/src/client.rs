//! Web API client implementation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{FetchError, Result};
use crate::types::{
    Artist, Paging, RawArtist, RawPlay, RawProfile, RawTrack, RecentTrack, Track, UserProfile,
};

/// Default Web API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of items requested from the top/recent endpoints.
const PAGE_LIMIT: &str = "10";

/// Window for the top tracks and artists.
const TIME_RANGE: &str = "medium_term";

/// Spotify Web API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SpotifyClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Parse and normalize base URL so joins keep the version segment
        let mut base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("gazette/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Client for the public Spotify API with the default timeout.
    pub fn spotify() -> Result<Self> {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /me`
    pub async fn profile(&self, access_token: &str) -> Result<UserProfile> {
        let raw: RawProfile = self.get("profile", "me", &[], access_token).await?;
        UserProfile::try_from(raw)
    }

    /// `GET /me/top/tracks`
    pub async fn top_tracks(&self, access_token: &str) -> Result<Vec<Track>> {
        let page: Paging<RawTrack> = self
            .get(
                "top tracks",
                "me/top/tracks",
                &[("time_range", TIME_RANGE), ("limit", PAGE_LIMIT)],
                access_token,
            )
            .await?;
        page.items.into_iter().map(Track::try_from).collect()
    }

    /// `GET /me/top/artists`
    pub async fn top_artists(&self, access_token: &str) -> Result<Vec<Artist>> {
        let page: Paging<RawArtist> = self
            .get(
                "top artists",
                "me/top/artists",
                &[("time_range", TIME_RANGE), ("limit", PAGE_LIMIT)],
                access_token,
            )
            .await?;
        Ok(page.items.into_iter().map(Artist::from).collect())
    }

    /// `GET /me/player/recently-played`
    pub async fn recently_played(&self, access_token: &str) -> Result<Vec<RecentTrack>> {
        let page: Paging<RawPlay> = self
            .get(
                "recently played",
                "me/player/recently-played",
                &[("limit", PAGE_LIMIT)],
                access_token,
            )
            .await?;
        page.items.into_iter().map(RecentTrack::try_from).collect()
    }

    /// Make an authenticated GET and decode the body.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Config(format!("invalid path {}: {}", path, e)))?;

        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                FetchError::upstream(endpoint, None, detail)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status = status.as_u16(), "Web API request failed");
            return Err(FetchError::upstream(endpoint, Some(status.as_u16()), body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::upstream(endpoint, None, format!("reading body: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| FetchError::Validation(format!("{} payload: {}", endpoint, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SpotifyClient {
        SpotifyClient::new(&format!("{}/v1", server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_base_url_normalized() {
        let client = SpotifyClient::new("https://api.example.com/v1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
        assert!(SpotifyClient::new("not a url", DEFAULT_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn test_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "reader",
                "display_name": "Daily Reader",
                "images": [{ "url": "https://img/1", "height": 64 }],
                "product": "premium"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).profile("tok").await.unwrap();
        assert_eq!(profile.id, "reader");
        assert_eq!(profile.display_name, "Daily Reader");
        assert_eq!(profile.images.unwrap()[0].url, "https://img/1");
    }

    #[tokio::test]
    async fn test_top_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/top/tracks"))
            .and(query_param("time_range", "medium_term"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "t1",
                    "name": "Headline",
                    "artists": [{ "name": "Press Band" }],
                    "album": { "name": "Extra", "images": [] },
                    "popularity": 55
                }]
            })))
            .mount(&server)
            .await;

        let tracks = client_for(&server).top_tracks("tok").await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Press Band");
        assert_eq!(tracks[0].album.as_deref(), Some("Extra"));
        assert!(tracks[0].image_url.is_none());
    }

    #[tokio::test]
    async fn test_top_artists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/top/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "a1",
                    "name": "Columnist",
                    "images": [{ "url": "https://img/a1" }],
                    "genres": ["indie pop", "dream pop"],
                    "popularity": 62
                }]
            })))
            .mount(&server)
            .await;

        let artists = client_for(&server).top_artists("tok").await.unwrap();
        assert_eq!(artists[0].genres, vec!["indie pop", "dream pop"]);
        assert_eq!(artists[0].image_url.as_deref(), Some("https://img/a1"));
    }

    #[tokio::test]
    async fn test_recently_played() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/recently-played"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "track": { "id": "t9", "name": "Late Edition", "artists": [{ "name": "Night Desk" }] },
                    "played_at": "2026-04-01T22:10:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let recent = client_for(&server).recently_played("tok").await.unwrap();
        assert_eq!(recent[0].artist, "Night Desk");
        assert_eq!(recent[0].played_at, "2026-04-01T22:10:00Z");
    }

    #[tokio::test]
    async fn test_error_status_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/top/tracks"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server).top_tracks("tok").await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        match err {
            FetchError::UpstreamData { endpoint, detail, .. } => {
                assert_eq!(endpoint, "top tracks");
                assert_eq!(detail, "slow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/top/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
            .mount(&server)
            .await;

        let err = client_for(&server).top_artists("tok").await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({ "id": "x", "display_name": "y" })),
            )
            .mount(&server)
            .await;

        let client =
            SpotifyClient::new(&format!("{}/v1", server.uri()), Duration::from_millis(50)).unwrap();
        let err = client.profile("tok").await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamData { status: None, .. }));
    }
}
