//! Session storage.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use gazette_types::{PrincipalId, SessionId, SharedClock};
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::ttl::TtlTracker;

/// Store of live sessions, separate from the principal directory.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Start a new session for a principal.
    async fn create(&self, principal_id: PrincipalId) -> Result<Session>;

    /// Fetch a live session and mark it as used.
    ///
    /// Returns [`Error::NotFound`] or [`Error::Expired`] when there is no
    /// usable session under `id`.
    async fn get(&self, id: &SessionId) -> Result<Session>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, id: &SessionId) -> Result<bool>;

    /// Drop every expired session, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize>;
}

/// Shared session store handle.
pub type SharedSessionStore = Arc<dyn SessionStore>;

struct StoreInner {
    lru: LruCache<SessionId, Session>,
    ttl: TtlTracker,
}

/// In-memory [`SessionStore`] with LRU eviction and idle TTL.
pub struct MemorySessionStore {
    inner: RwLock<StoreInner>,
    config: StoreConfig,
    clock: SharedClock,
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MemorySessionStore {
    pub fn new(config: StoreConfig, clock: SharedClock) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);

        let inner = StoreInner {
            lru: LruCache::new(cap),
            ttl: TtlTracker::new(config.ttl),
        };

        Self {
            inner: RwLock::new(inner),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Run [`SessionStore::purge_expired`] every `cleanup_interval`.
    pub fn spawn_cleanup(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let period = store.config.cleanup_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Ok(count) = store.purge_expired().await
                    && count > 0
                {
                    debug!(count, "Session sweep removed expired sessions");
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, principal_id: PrincipalId) -> Result<Session> {
        let now = self.clock.now();
        let session = Session::new(principal_id, now);

        let mut inner = self.inner.write().await;
        if let Some((evicted, _)) = inner.lru.push(session.id.clone(), session.clone())
            && evicted != session.id
        {
            debug!(session_id = %evicted, "Evicting least recently used session");
            inner.ttl.remove(&evicted);
        }
        inner.ttl.touch(&session.id, now);

        trace!(principal_id = %principal_id, size = inner.lru.len(), "Session created");
        Ok(session)
    }

    async fn get(&self, id: &SessionId) -> Result<Session> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        if !inner.lru.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }

        if inner.ttl.is_expired(id, now) {
            debug!("Session expired, removing");
            inner.lru.pop(id);
            inner.ttl.remove(id);
            return Err(Error::Expired(id.to_string()));
        }

        let session = match inner.lru.get_mut(id) {
            Some(session) => {
                session.last_seen = now;
                session.clone()
            }
            None => return Err(Error::NotFound(id.to_string())),
        };
        inner.ttl.touch(id, now);
        Ok(session)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        inner.ttl.remove(id);
        Ok(inner.lru.pop(id).is_some())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.drain_expired(now);
        let mut count = 0;
        for id in expired {
            if inner.lru.pop(&id).is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}
