//! Shared types for the Gazette service.
//!
//! Identifiers and the clock port live here so that the OAuth, session and
//! server crates can agree on them without depending on each other.

pub mod clock;
pub mod config;
pub mod ids;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::defaults as config_defaults;
pub use ids::{PrincipalId, SessionId};
