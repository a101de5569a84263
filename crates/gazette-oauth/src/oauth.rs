//! OAuth 2.0 authorization-code flow against the Spotify accounts service.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use url::Url;

use crate::error::{OAuthError, Result};
use crate::provider::IdentityProvider;

/// Default authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Length of the anti-forgery state token.
pub const STATE_LEN: usize = 16;

/// Default timeout for token endpoint calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth client configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OAuthConfig {
    /// Create a config for the Spotify accounts service.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![
                "user-read-private".to_string(),
                "user-read-email".to_string(),
                "user-top-read".to_string(),
                "user-read-recently-played".to_string(),
            ],
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Override the authorization endpoint.
    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set the timeout for token endpoint calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the endpoints and redirect URI parse as absolute URLs.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("redirect_uri", &self.redirect_uri),
        ] {
            Url::parse(value).map_err(|e| OAuthError::Config(format!("{}: {}", field, e)))?;
        }
        if self.client_id.is_empty() {
            return Err(OAuthError::Config("client_id is empty".to_string()));
        }
        Ok(())
    }

    /// Build the URL that starts the provider's consent flow.
    ///
    /// A fresh state token is generated on every call. It is returned with
    /// the URL but is not stored or checked on callback.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest> {
        let state = generate_state();
        let url = build_authorization_url(self, &state)?;
        Ok(AuthorizationRequest { url, state })
    }
}

/// Authorization URL plus the state token embedded in it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Generate a random alphanumeric state string for CSRF protection.
///
/// Characters are drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

/// Build the authorization URL for the OAuth flow.
pub fn build_authorization_url(config: &OAuthConfig, state: &str) -> Result<String> {
    let scope = config.scopes.join(" ");
    let params = [
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("scope", scope.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("state", state),
    ];

    let url = Url::parse_with_params(&config.authorize_url, params)
        .map_err(|e| OAuthError::Config(format!("authorize_url: {}", e)))?;
    Ok(url.into())
}

/// Token endpoint response.
///
/// `refresh_token` is absent on most refresh responses; it is only present
/// when the provider rotates it.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("rotated_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

impl TokenGrant {
    /// Grant without a rotated refresh token.
    pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: Some("Bearer".to_string()),
            scope: None,
            expires_in,
            refresh_token: None,
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

/// Identity provider speaking OAuth 2.0 over HTTP.
///
/// Both grants authenticate with HTTP Basic client credentials and send a
/// form-encoded body. Every call is bounded by [`OAuthConfig::timeout`].
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl HttpIdentityProvider {
    /// Create a provider client from a validated config.
    pub fn new(config: OAuthConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Use a custom HTTP client (for connection pool reuse).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// The config this provider was built from.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    async fn token_request(
        &self,
        operation: &'static str,
        params: &[(&str, &str)],
    ) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| OAuthError::upstream(operation, None, describe_transport_error(&e)))?;

        let response = ensure_success(response, operation).await?;

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| OAuthError::upstream(operation, None, format!("invalid body: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        if code.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "authorization code is empty".to_string(),
            ));
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let grant = self.token_request("token exchange", &params).await?;

        if grant.refresh_token.as_deref().is_none_or(str::is_empty) {
            return Err(OAuthError::upstream(
                "token exchange",
                None,
                "response carried no refresh_token",
            ));
        }

        tracing::debug!(expires_in = grant.expires_in, "Authorization code exchanged");
        Ok(grant)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let grant = self.token_request("token refresh", &params).await?;

        tracing::debug!(
            expires_in = grant.expires_in,
            rotated = grant.refresh_token.is_some(),
            "Access token refreshed"
        );
        Ok(grant)
    }
}

/// Checks HTTP status; returns the response on success or an error carrying the body.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(OAuthError::upstream(operation, Some(status), body))
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        format!("request failed: {}", e)
    }
}
