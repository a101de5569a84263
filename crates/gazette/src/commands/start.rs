//! Start command - launches the Gazette server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use axum_extra::extract::cookie::Key;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use clap::Args;
use tracing::{info, warn};

use gazette_config::{ResolvedProvider, ServerConfig as ServerSection, SessionConfig};
use gazette_oauth::{HttpIdentityProvider, InMemoryDirectory, OAuthConfig, TokenManager};
use gazette_server::{AppState, Server, ServerConfig};
use gazette_session::{MemorySessionStore, StoreConfig};
use gazette_spotify::{DEFAULT_API_BASE_URL, SpotifyClient};
use gazette_types::SystemClock;

use super::Context;

/// Minimum decoded length of the cookie key.
const MIN_COOKIE_KEY_BYTES: usize = 64;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Base64 key for encrypting the session cookie (64+ bytes decoded)
    #[arg(long, env = "GAZETTE_COOKIE_KEY", hide_env_values = true)]
    pub cookie_key: Option<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    for warning in &ctx.loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let config = &ctx.loaded.config;
    let mut server_section = config.server();
    if let Some(port) = args.port {
        server_section.port = port;
    }
    if let Some(bind) = args.bind {
        server_section.bind = bind;
    }
    let session_section = config.session();

    let provider = config
        .provider()
        .resolve(&server_section)
        .context("provider credentials are not configured")?;
    info!(
        client_id_source = %provider.client_id.source,
        client_secret_source = %provider.client_secret.source,
        redirect_uri = %provider.redirect_uri.value,
        "Provider credentials resolved"
    );

    // ── Build components ────────────────────────────────────────────────

    let timeout = Duration::from_secs(server_section.request_timeout_secs);
    let oauth = oauth_config(&provider, timeout);
    oauth.validate()?;

    let clock = SystemClock::shared();
    let identity = Arc::new(HttpIdentityProvider::new(oauth.clone())?);
    let directory = Arc::new(InMemoryDirectory::new());
    let tokens = TokenManager::new(identity, directory, clock.clone());

    let sessions = Arc::new(MemorySessionStore::new(
        store_config(&session_section),
        clock,
    ));
    let _cleanup = sessions.spawn_cleanup();

    let api_base_url = provider
        .api_base_url
        .as_deref()
        .unwrap_or(DEFAULT_API_BASE_URL);
    let spotify = SpotifyClient::new(api_base_url, timeout)?;

    let http_config = http_config(&server_section, &session_section)?;
    let addr = http_config.bind_address;
    let cookie_key = cookie_key(args.cookie_key.as_deref())?;

    let state = AppState::new(http_config, oauth, tokens, sessions, spotify)
        .with_cookie_key(cookie_key);

    // ── Serve ───────────────────────────────────────────────────────────

    println!("Gazette listening on http://{}", addr);
    if ctx.verbose {
        println!("  callback: {}", provider.redirect_uri.value);
        println!("  public:   {}", server_section.public_base_url());
    }

    Server::from_state(state).run().await?;
    Ok(())
}

fn oauth_config(provider: &ResolvedProvider, timeout: Duration) -> OAuthConfig {
    let mut oauth = OAuthConfig::new(
        provider.client_id.value.clone(),
        provider.client_secret.value.clone(),
        provider.redirect_uri.value.clone(),
    )
    .with_scopes(provider.scopes.clone())
    .with_timeout(timeout);

    if let Some(ref url) = provider.authorize_url {
        oauth = oauth.with_authorize_url(url.clone());
    }
    if let Some(ref url) = provider.token_url {
        oauth = oauth.with_token_url(url.clone());
    }
    oauth
}

fn store_config(section: &SessionConfig) -> StoreConfig {
    StoreConfig::new()
        .with_max_sessions(section.max_sessions)
        .with_ttl(session_ttl(section))
        .with_cleanup_interval(Duration::from_secs(section.cleanup_interval_secs))
}

fn session_ttl(section: &SessionConfig) -> chrono::Duration {
    i64::try_from(section.ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

fn http_config(server: &ServerSection, session: &SessionConfig) -> Result<ServerConfig> {
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", server.bind, server.port))?;

    Ok(ServerConfig::new()
        .with_bind_address(addr)
        .with_cookie_name(server.cookie_name.clone())
        .with_secure_cookies(server.secure_cookies)
        .with_session_ttl(session_ttl(session))
        .with_cors_origins(server.cors_origins.clone()))
}

/// Decode a configured cookie key, or generate one for this process.
fn cookie_key(encoded: Option<&str>) -> Result<Key> {
    let Some(encoded) = encoded.map(str::trim).filter(|s| !s.is_empty()) else {
        warn!("GAZETTE_COOKIE_KEY not set; sessions will not survive a restart");
        return Ok(Key::generate());
    };

    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .context("GAZETTE_COOKIE_KEY is not valid base64")?;

    if bytes.len() < MIN_COOKIE_KEY_BYTES {
        anyhow::bail!(
            "GAZETTE_COOKIE_KEY must decode to at least {} bytes (got {})",
            MIN_COOKIE_KEY_BYTES,
            bytes.len()
        );
    }

    Ok(Key::from(bytes.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_config::{ResolvedSecret, SecretSource};

    fn secret(value: &str) -> ResolvedSecret {
        ResolvedSecret {
            value: value.to_string(),
            source: SecretSource::ConfigFile,
        }
    }

    #[test]
    fn test_cookie_key_length_checked() {
        let short = STANDARD.encode([7u8; 32]);
        assert!(cookie_key(Some(&short)).is_err());
        assert!(cookie_key(Some("not base64!")).is_err());

        let long = STANDARD.encode([7u8; 64]);
        assert!(cookie_key(Some(&long)).is_ok());
        assert!(cookie_key(None).is_ok());
    }

    #[test]
    fn test_http_config_from_sections() {
        let mut server = ServerSection::default();
        server.port = 8088;
        server.secure_cookies = true;
        server.cookie_name = "paper".to_string();
        let session = SessionConfig {
            ttl_secs: 3600,
            ..SessionConfig::default()
        };

        let http = http_config(&server, &session).unwrap();
        assert_eq!(http.bind_address.to_string(), "127.0.0.1:8088");
        assert!(http.secure_cookies);
        assert_eq!(http.cookie_name, "paper");
        assert_eq!(http.session_ttl, chrono::Duration::hours(1));
    }

    #[test]
    fn test_bad_bind_address() {
        let mut server = ServerSection::default();
        server.bind = "not an address".to_string();
        assert!(http_config(&server, &SessionConfig::default()).is_err());
    }

    #[test]
    fn test_oauth_config_overrides() {
        let provider = ResolvedProvider {
            client_id: secret("id"),
            client_secret: secret("shh"),
            redirect_uri: secret("http://localhost:5000/api/callback"),
            scopes: vec!["user-top-read".to_string()],
            authorize_url: Some("http://auth.test/authorize".to_string()),
            token_url: None,
            api_base_url: None,
        };

        let oauth = oauth_config(&provider, Duration::from_secs(3));
        assert_eq!(oauth.authorize_url, "http://auth.test/authorize");
        assert_eq!(oauth.token_url, gazette_oauth::oauth::DEFAULT_TOKEN_URL);
        assert_eq!(oauth.scopes, vec!["user-top-read"]);
        assert_eq!(oauth.timeout, Duration::from_secs(3));
    }
}
