//! Token lifecycle for authenticated principals.
//!
//! [`TokenManager`] is the single place that hands out provider access
//! tokens. Every guarded request goes through [`TokenManager::ensure_fresh`],
//! which refreshes a token that expires within the refresh buffer before
//! returning it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gazette_types::{PrincipalId, SharedClock, config_defaults};
use parking_lot::Mutex;

use crate::directory::{NewPrincipal, Principal, SharedDirectory, TokenSet};
use crate::error::{OAuthError, Result};
use crate::oauth::TokenGrant;
use crate::provider::SharedIdentityProvider;

// ============================================================================
// Guard states
// ============================================================================

/// States of the access guard.
///
/// `NoSession` and `SessionNoPrincipal` are decided by the caller that owns
/// the session store; the manager reports the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    NoSession,
    SessionNoPrincipal,
    PrincipalValidToken,
    PrincipalExpiringToken,
    PrincipalRefreshed,
    Rejected,
}

impl GuardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardState::NoSession => "no_session",
            GuardState::SessionNoPrincipal => "session_no_principal",
            GuardState::PrincipalValidToken => "principal_valid_token",
            GuardState::PrincipalExpiringToken => "principal_expiring_token",
            GuardState::PrincipalRefreshed => "principal_refreshed",
            GuardState::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// AccessGrant / LoginProfile
// ============================================================================

/// A usable access token for one principal.
#[derive(Clone)]
pub struct AccessGrant {
    pub principal_id: PrincipalId,
    pub provider_id: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Whether this request performed a refresh.
    pub refreshed: bool,
}

impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("principal_id", &self.principal_id)
            .field("provider_id", &self.provider_id)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("refreshed", &self.refreshed)
            .finish()
    }
}

impl AccessGrant {
    fn from_principal(principal: &Principal, refreshed: bool) -> Self {
        Self {
            principal_id: principal.id,
            provider_id: principal.provider_id.clone(),
            access_token: principal.tokens.access_token.clone(),
            expires_at: principal.tokens.expires_at,
            refreshed,
        }
    }
}

/// Identity facts learned from the provider during login.
#[derive(Debug, Clone)]
pub struct LoginProfile {
    pub provider_id: String,
    pub display_name: Option<String>,
    pub snapshot: Option<serde_json::Value>,
}

// ============================================================================
// TokenManager
// ============================================================================

/// Per-principal refresh locks, shared with in-flight refresh tasks.
type RefreshLocks = Arc<Mutex<HashMap<PrincipalId, Arc<tokio::sync::Mutex<()>>>>>;

/// Owns the token state of every principal.
#[derive(Debug)]
pub struct TokenManager {
    provider: SharedIdentityProvider,
    directory: SharedDirectory,
    clock: SharedClock,
    refresh_buffer: Duration,
    refresh_locks: RefreshLocks,
}

impl TokenManager {
    /// Create a manager with the default five minute refresh buffer.
    pub fn new(
        provider: SharedIdentityProvider,
        directory: SharedDirectory,
        clock: SharedClock,
    ) -> Self {
        Self {
            provider,
            directory,
            clock,
            refresh_buffer: Duration::seconds(config_defaults::REFRESH_BUFFER_SECS),
            refresh_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Override the refresh buffer.
    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = buffer;
        self
    }

    pub fn directory(&self) -> &SharedDirectory {
        &self.directory
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn refresh_buffer(&self) -> Duration {
        self.refresh_buffer
    }

    /// A token is usable only while its expiry is strictly after `now + buffer`.
    pub fn is_token_stale(&self, tokens: &TokenSet, now: DateTime<Utc>) -> bool {
        is_stale(tokens, now, self.refresh_buffer)
    }

    /// Exchange an authorization code. Never retried.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.provider.exchange_code(code).await
    }

    /// Record a successful login.
    ///
    /// Creates the principal for an unknown provider id, otherwise replaces
    /// the stored tokens (and profile, when given) of the existing one.
    pub async fn complete_login(&self, profile: LoginProfile, grant: TokenGrant) -> Result<Principal> {
        if let Some(existing) = self.directory.get_by_provider_id(&profile.provider_id).await? {
            return self.apply_login(existing, profile, &grant).await;
        }

        let now = self.clock.now();
        let tokens = TokenSet::from_grant(&grant, None, now)?;
        let new = NewPrincipal {
            provider_id: profile.provider_id.clone(),
            display_name: profile.display_name.clone(),
            tokens,
            profile_snapshot: profile.snapshot.clone(),
        };

        match self.directory.create(new.into_principal(now)).await {
            Ok(principal) => {
                tracing::info!(
                    principal_id = %principal.id,
                    provider_id = %principal.provider_id,
                    "Principal created"
                );
                Ok(principal)
            }
            Err(OAuthError::Conflict(_)) => {
                // Another login for the same subject won the create.
                let existing = self
                    .directory
                    .get_by_provider_id(&profile.provider_id)
                    .await?
                    .ok_or_else(|| OAuthError::Conflict(profile.provider_id.clone()))?;
                self.apply_login(existing, profile, &grant).await
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_login(
        &self,
        mut principal: Principal,
        profile: LoginProfile,
        grant: &TokenGrant,
    ) -> Result<Principal> {
        let now = self.clock.now();
        principal.tokens = TokenSet::from_grant(grant, Some(&principal.tokens.refresh_token), now)?;
        if profile.display_name.is_some() {
            principal.display_name = profile.display_name;
        }
        if profile.snapshot.is_some() {
            principal.profile_snapshot = profile.snapshot;
        }
        principal.updated_at = now;

        let principal = self.directory.update(principal).await?;
        tracing::info!(
            principal_id = %principal.id,
            provider_id = %principal.provider_id,
            "Principal tokens replaced on login"
        );
        Ok(principal)
    }

    /// Return a token that stays valid for at least the refresh buffer.
    ///
    /// Refreshes at most once and never retries. On failure the stored record
    /// is left exactly as it was. The refresh and its write run on their own
    /// task, so dropping the caller cannot lose a grant the provider already
    /// issued.
    pub async fn ensure_fresh(&self, id: &PrincipalId) -> Result<AccessGrant> {
        let principal = load(&self.directory, id).await?;

        if !self.is_token_stale(&principal.tokens, self.clock.now()) {
            tracing::debug!(principal_id = %id, state = %GuardState::PrincipalValidToken, "Access guard");
            return Ok(AccessGrant::from_principal(&principal, false));
        }

        tracing::debug!(principal_id = %id, state = %GuardState::PrincipalExpiringToken, "Access guard");

        let refresher = self.refresher();
        let id = *id;
        tokio::spawn(async move { refresher.refresh(id).await })
            .await
            .map_err(|e| OAuthError::InvalidRequest(format!("refresh task failed: {}", e)))?
    }

    fn refresher(&self) -> Refresher {
        Refresher {
            provider: Arc::clone(&self.provider),
            directory: Arc::clone(&self.directory),
            clock: Arc::clone(&self.clock),
            refresh_buffer: self.refresh_buffer,
            locks: Arc::clone(&self.refresh_locks),
        }
    }

    #[cfg(test)]
    fn pending_refresh_locks(&self) -> usize {
        self.refresh_locks.lock().len()
    }
}

fn is_stale(tokens: &TokenSet, now: DateTime<Utc>, buffer: Duration) -> bool {
    tokens.expires_at <= now + buffer
}

async fn load(directory: &SharedDirectory, id: &PrincipalId) -> Result<Principal> {
    match directory.get(id).await? {
        Some(principal) => Ok(principal),
        None => {
            tracing::debug!(principal_id = %id, state = %GuardState::SessionNoPrincipal, "Access guard");
            Err(OAuthError::PrincipalNotFound(*id))
        }
    }
}

// ============================================================================
// Refresh task
// ============================================================================

/// Owned handles for one refresh, movable onto a spawned task.
struct Refresher {
    provider: SharedIdentityProvider,
    directory: SharedDirectory,
    clock: SharedClock,
    refresh_buffer: Duration,
    locks: RefreshLocks,
}

impl Refresher {
    async fn refresh(self, id: PrincipalId) -> Result<AccessGrant> {
        let lease = RefreshLease::acquire(&self.locks, id);
        let _guard = lease.lock.lock().await;

        // Re-read: a refresh may have finished while this request waited.
        let principal = load(&self.directory, &id).await?;
        if !is_stale(&principal.tokens, self.clock.now(), self.refresh_buffer) {
            tracing::debug!(
                principal_id = %id,
                state = %GuardState::PrincipalValidToken,
                "Token refreshed by a concurrent request"
            );
            return Ok(AccessGrant::from_principal(&principal, false));
        }

        let grant = match self
            .provider
            .refresh_token(&principal.tokens.refresh_token)
            .await
        {
            Ok(grant) => grant,
            Err(e) => {
                tracing::warn!(principal_id = %id, state = %GuardState::Rejected, error = %e, "Token refresh failed");
                return Err(e);
            }
        };

        let now = self.clock.now();
        let tokens = match TokenSet::from_grant(&grant, Some(&principal.tokens.refresh_token), now) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(principal_id = %id, state = %GuardState::Rejected, error = %e, "Refresh response unusable");
                return Err(e);
            }
        };

        let updated = Principal {
            tokens,
            updated_at: now,
            ..principal
        };
        let updated = self.directory.update(updated).await?;

        tracing::info!(
            principal_id = %id,
            state = %GuardState::PrincipalRefreshed,
            expires_at = %updated.tokens.expires_at,
            "Access token refreshed"
        );
        Ok(AccessGrant::from_principal(&updated, true))
    }
}

/// One holder of a principal's refresh lock.
///
/// The map entry is removed when the last holder drops, however the holder
/// exits.
struct RefreshLease {
    locks: RefreshLocks,
    id: PrincipalId,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl RefreshLease {
    fn acquire(locks: &RefreshLocks, id: PrincipalId) -> Self {
        let lock = Arc::clone(locks.lock().entry(id).or_default());
        Self {
            locks: Arc::clone(locks),
            id,
            lock,
        }
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // Held only by the map and this lease: nobody is waiting.
        if locks
            .get(&self.id)
            .is_some_and(|l| Arc::strong_count(l) == 2)
        {
            locks.remove(&self.id);
        }
    }
}
