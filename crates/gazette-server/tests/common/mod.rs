//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{Client, StatusCode, redirect};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gazette_oauth::{InMemoryDirectory, MockIdentityProvider, OAuthConfig, TokenGrant, TokenManager};
use gazette_server::{AppState, Server, ServerConfig};
use gazette_session::{MemorySessionStore, StoreConfig};
use gazette_spotify::SpotifyClient;
use gazette_types::ManualClock;

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client that does not follow redirects.
    pub client: Client,
    /// Scripted identity provider.
    pub provider: Arc<MockIdentityProvider>,
    /// Principal records.
    pub directory: Arc<InMemoryDirectory>,
    /// Clock shared by the token manager and the session store.
    pub clock: Arc<ManualClock>,
    /// Stand-in for the provider's Web API.
    pub api: MockServer,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with_provider(MockIdentityProvider::new()).await
    }

    /// Start a new test server around a prepared identity provider.
    pub async fn start_with_provider(provider: MockIdentityProvider) -> Result<Self> {
        let addr = find_available_port().await?;
        let api = MockServer::start().await;

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 7, 30, 0).unwrap(),
        ));
        let provider = Arc::new(provider);
        let directory = Arc::new(InMemoryDirectory::new());
        let tokens = TokenManager::new(provider.clone(), directory.clone(), clock.clone());
        let sessions = Arc::new(MemorySessionStore::new(
            StoreConfig::default().with_ttl(chrono::Duration::hours(24)),
            clock.clone(),
        ));
        let spotify = SpotifyClient::new(&format!("{}/v1", api.uri()), Duration::from_secs(2))?;
        let oauth = OAuthConfig::new(
            "test-client",
            "test-secret",
            format!("http://{}/api/callback", addr),
        );

        let config = ServerConfig::new().with_bind_address(addr);
        let state = AppState::new(config, oauth, tokens, sessions, spotify).with_rng_seed(11);

        // Start server in background
        let server = Server::from_state(state);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            provider,
            directory,
            clock,
            api,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET with an optional session cookie.
    pub fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url(), path));
        match cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// POST with an optional session cookie.
    pub fn post(&self, path: &str, cookie: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url(), path));
        match cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// Serve a profile for `provider_id` to requests bearing `access_token`.
    pub async fn mount_profile(&self, provider_id: &str, access_token: &str, display_name: &str) {
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", format!("Bearer {}", access_token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": provider_id,
                "display_name": display_name,
                "country": "GB",
                "product": "premium"
            })))
            .mount(&self.api)
            .await;
    }

    /// Run the whole callback for `provider_id` and return the session cookie.
    pub async fn login(&self, provider_id: &str, access_token: &str, expires_in: u64) -> Result<String> {
        self.provider.push_exchange_grant(
            TokenGrant::new(access_token, expires_in)
                .with_refresh_token(format!("refresh-{}", provider_id)),
        );
        self.mount_profile(provider_id, access_token, &provider_id.to_uppercase())
            .await;

        let resp = self
            .get(&format!("/api/callback?code=code-{}&state=xyz", access_token), None)
            .send()
            .await?;
        anyhow::ensure!(
            resp.status() == StatusCode::SEE_OTHER,
            "unexpected status {}",
            resp.status()
        );
        anyhow::ensure!(
            location(&resp) == Some("/"),
            "unexpected redirect {:?}",
            location(&resp)
        );

        session_cookie(&resp).ok_or_else(|| anyhow::anyhow!("callback set no session cookie"))
    }

    /// `isAuthenticated` as reported by `/api/session`.
    pub async fn is_authenticated(&self, cookie: Option<&str>) -> Result<bool> {
        let body: serde_json::Value = self.get("/api/session", cookie).send().await?.json().await?;
        body["isAuthenticated"]
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("missing isAuthenticated"))
    }
}

/// Redirect target of a response.
pub fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

/// `name=value` part of the session `Set-Cookie` header.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("gazette_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
