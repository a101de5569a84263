//! Principal records and the user directory.
//!
//! A [`Principal`] is one authenticated end user. The directory indexes
//! principals by internal id and by provider subject id, and replaces whole
//! records on update so readers never observe a token from one write paired
//! with an expiry from another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gazette_types::PrincipalId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{OAuthError, Result};
use crate::oauth::TokenGrant;

// ============================================================================
// TokenSet
// ============================================================================

/// The token triple stored for a principal.
///
/// Always written as a unit: `expires_at` describes `access_token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenSet {
    /// Build a token set from a provider grant received at `now`.
    ///
    /// When the grant carries no refresh token, `previous_refresh` is kept.
    pub fn from_grant(
        grant: &TokenGrant,
        previous_refresh: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if grant.access_token.is_empty() {
            return Err(OAuthError::upstream(
                "token grant",
                None,
                "empty access_token",
            ));
        }

        let refresh_token = match grant.refresh_token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => previous_refresh
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    OAuthError::upstream("token grant", None, "no refresh_token available")
                })?,
        };

        let expires_at = i64::try_from(grant.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                OAuthError::upstream(
                    "token grant",
                    None,
                    format!("expires_in out of range: {}", grant.expires_in),
                )
            })?;

        Ok(Self {
            access_token: grant.access_token.clone(),
            refresh_token,
            expires_at,
        })
    }

    /// Whether both tokens are present.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

// ============================================================================
// Principal
// ============================================================================

/// An authenticated end user.
#[derive(Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub provider_id: String,
    pub display_name: Option<String>,
    pub tokens: TokenSet,
    /// Last fetched provider profile.
    pub profile_snapshot: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("provider_id", &self.provider_id)
            .field("display_name", &self.display_name)
            .field("tokens", &self.tokens)
            .field("has_profile", &self.profile_snapshot.is_some())
            .finish_non_exhaustive()
    }
}

/// Fields for a principal that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub provider_id: String,
    pub display_name: Option<String>,
    pub tokens: TokenSet,
    pub profile_snapshot: Option<serde_json::Value>,
}

impl NewPrincipal {
    /// Assign an id and timestamps.
    pub fn into_principal(self, now: DateTime<Utc>) -> Principal {
        Principal {
            id: PrincipalId::new(),
            provider_id: self.provider_id,
            display_name: self.display_name,
            tokens: self.tokens,
            profile_snapshot: self.profile_snapshot,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// UserDirectory Trait
// ============================================================================

/// Store of principal records.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Look up by internal id.
    async fn get(&self, id: &PrincipalId) -> Result<Option<Principal>>;

    /// Look up by provider subject id.
    async fn get_by_provider_id(&self, provider_id: &str) -> Result<Option<Principal>>;

    /// Insert a new principal.
    ///
    /// Fails with [`OAuthError::Conflict`] when the provider id is taken.
    async fn create(&self, principal: Principal) -> Result<Principal>;

    /// Replace an existing record.
    ///
    /// Fails with [`OAuthError::PrincipalNotFound`] for an unknown id. The
    /// provider id of a record never changes.
    async fn update(&self, principal: Principal) -> Result<Principal>;
}

/// Shared directory handle.
pub type SharedDirectory = Arc<dyn UserDirectory>;

// ============================================================================
// InMemoryDirectory
// ============================================================================

#[derive(Debug, Default)]
struct DirectoryInner {
    by_id: HashMap<PrincipalId, Principal>,
    by_provider: HashMap<String, PrincipalId>,
}

/// In-memory [`UserDirectory`].
///
/// Both indexes sit behind one lock, so a create is visible through both at
/// once.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<DirectoryInner>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get(&self, id: &PrincipalId) -> Result<Option<Principal>> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }

    async fn get_by_provider_id(&self, provider_id: &str) -> Result<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_provider
            .get(provider_id)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn create(&self, principal: Principal) -> Result<Principal> {
        if !principal.tokens.is_complete() {
            return Err(OAuthError::InvalidRequest(
                "principal tokens must not be empty".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        if inner.by_provider.contains_key(&principal.provider_id) {
            return Err(OAuthError::Conflict(principal.provider_id));
        }

        inner
            .by_provider
            .insert(principal.provider_id.clone(), principal.id);
        inner.by_id.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn update(&self, principal: Principal) -> Result<Principal> {
        if !principal.tokens.is_complete() {
            return Err(OAuthError::InvalidRequest(
                "principal tokens must not be empty".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        let existing = inner
            .by_id
            .get_mut(&principal.id)
            .ok_or(OAuthError::PrincipalNotFound(principal.id))?;

        if existing.provider_id != principal.provider_id {
            return Err(OAuthError::InvalidRequest(format!(
                "provider id of principal {} cannot change",
                principal.id
            )));
        }

        *existing = principal.clone();
        Ok(principal)
    }
}
