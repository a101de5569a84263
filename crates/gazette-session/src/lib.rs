//! Server-side sessions for Gazette.
//!
//! A [`Session`] ties a browser (through an opaque id carried in a cookie)
//! to a principal. Sessions live in a [`SessionStore`]; the shipped
//! [`MemorySessionStore`] bounds memory with LRU eviction and drops sessions
//! that have been idle longer than the configured TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! use gazette_session::{MemorySessionStore, StoreConfig};
//!
//! let store = MemorySessionStore::new(
//!     StoreConfig::default().with_ttl(chrono::Duration::hours(24)),
//!     SystemClock::shared(),
//! );
//! let session = store.create(principal_id).await?;
//! ```

mod config;
mod error;
mod session;
mod store;
mod ttl;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use session::Session;
pub use store::{MemorySessionStore, SessionStore, SharedSessionStore};
pub use ttl::TtlTracker;
