//! OAuth client credential resolution.
//!
//! Resolution order for each credential:
//! 1. Environment variable
//! 2. Config file (plaintext, warned about during loading)
//!
//! The redirect URI additionally falls back to `<base_url>/api/callback`.

use crate::{ConfigError, ProviderConfig, Result, ServerConfig};

/// Env var holding the OAuth client id.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";

/// Env var holding the OAuth client secret.
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Env var holding the redirect URI.
pub const REDIRECT_URI_ENV: &str = "SPOTIFY_REDIRECT_URI";

/// Path of the OAuth callback route, appended to the base URL.
const CALLBACK_PATH: &str = "/api/callback";

/// A credential value with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a credential was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file.
    ConfigFile,
    /// Derived from other settings.
    Derived,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file"),
            SecretSource::Derived => write!(f, "derived"),
        }
    }
}

/// Provider settings with every required credential present.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub client_id: ResolvedSecret,
    pub client_secret: ResolvedSecret,
    pub redirect_uri: ResolvedSecret,
    pub scopes: Vec<String>,
    pub authorize_url: Option<String>,
    pub token_url: Option<String>,
    pub api_base_url: Option<String>,
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("client_id", &self.client_id.value)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.value)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl ProviderConfig {
    /// Resolve credentials from the process environment and this section.
    pub fn resolve(&self, server: &ServerConfig) -> Result<ResolvedProvider> {
        self.resolve_with(server, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` in place of the process environment.
    pub fn resolve_with<F>(&self, server: &ServerConfig, lookup: F) -> Result<ResolvedProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = resolve_one(&lookup, CLIENT_ID_ENV, self.client_id.as_deref())
            .ok_or_else(|| missing("client_id", CLIENT_ID_ENV))?;
        let client_secret = resolve_one(&lookup, CLIENT_SECRET_ENV, self.client_secret.as_deref())
            .ok_or_else(|| missing("client_secret", CLIENT_SECRET_ENV))?;
        let redirect_uri = resolve_one(&lookup, REDIRECT_URI_ENV, self.redirect_uri.as_deref())
            .unwrap_or_else(|| ResolvedSecret {
                value: format!("{}{}", server.public_base_url(), CALLBACK_PATH),
                source: SecretSource::Derived,
            });

        if self.scopes.is_empty() {
            return Err(ConfigError::Invalid {
                field: "scopes".to_string(),
                reason: "at least one scope is required".to_string(),
            });
        }

        Ok(ResolvedProvider {
            client_id,
            client_secret,
            redirect_uri,
            scopes: self.scopes.clone(),
            authorize_url: self.authorize_url.clone(),
            token_url: self.token_url.clone(),
            api_base_url: self.api_base_url.clone(),
        })
    }
}

fn resolve_one<F>(lookup: &F, env_var: &str, config_value: Option<&str>) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

fn missing(field: &str, env_var: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
        env_var: env_var.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_wins_over_config() {
        let provider = ProviderConfig {
            client_id: Some("from-file".to_string()),
            client_secret: Some("file-secret".to_string()),
            ..Default::default()
        };
        let resolved = provider
            .resolve_with(
                &ServerConfig::default(),
                env(&[(CLIENT_ID_ENV, "from-env")]),
            )
            .unwrap();

        assert_eq!(resolved.client_id.value, "from-env");
        assert_eq!(
            resolved.client_id.source,
            SecretSource::EnvVar(CLIENT_ID_ENV.to_string())
        );
        assert_eq!(resolved.client_secret.value, "file-secret");
        assert_eq!(resolved.client_secret.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_redirect_uri_derived_from_base_url() {
        let provider = ProviderConfig::default();
        let server = ServerConfig {
            base_url: Some("https://paper.example.com".to_string()),
            ..Default::default()
        };
        let resolved = provider
            .resolve_with(
                &server,
                env(&[(CLIENT_ID_ENV, "id"), (CLIENT_SECRET_ENV, "secret")]),
            )
            .unwrap();

        assert_eq!(
            resolved.redirect_uri.value,
            "https://paper.example.com/api/callback"
        );
        assert_eq!(resolved.redirect_uri.source, SecretSource::Derived);
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let provider = ProviderConfig::default();
        let err = provider
            .resolve_with(&ServerConfig::default(), env(&[(CLIENT_ID_ENV, "id")]))
            .unwrap_err();
        match err {
            ConfigError::MissingField { field, env_var } => {
                assert_eq!(field, "client_secret");
                assert_eq!(env_var, CLIENT_SECRET_ENV);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let provider = ProviderConfig {
            client_id: Some("file-id".to_string()),
            ..Default::default()
        };
        let resolved = provider
            .resolve_with(
                &ServerConfig::default(),
                env(&[(CLIENT_ID_ENV, ""), (CLIENT_SECRET_ENV, "s")]),
            )
            .unwrap();
        assert_eq!(resolved.client_id.value, "file-id");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let provider = ProviderConfig::default();
        let resolved = provider
            .resolve_with(
                &ServerConfig::default(),
                env(&[(CLIENT_ID_ENV, "id"), (CLIENT_SECRET_ENV, "topsecret")]),
            )
            .unwrap();
        let shown = format!("{:?}", resolved);
        assert!(!shown.contains("topsecret"));
    }

    #[test]
    fn test_empty_scopes_rejected() {
        let provider = ProviderConfig {
            scopes: Vec::new(),
            ..Default::default()
        };
        let result = provider.resolve_with(
            &ServerConfig::default(),
            env(&[(CLIENT_ID_ENV, "id"), (CLIENT_SECRET_ENV, "s")]),
        );
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
