//! OAuth 2.0 authorization-code flow and token lifecycle for Gazette.
//!
//! # Components
//!
//! - [`oauth`] - state generation, authorization URL, code exchange and refresh over HTTP
//! - [`provider`] - the [`IdentityProvider`] seam (plus a scripted mock behind `testing`)
//! - [`directory`] - principal records and the [`UserDirectory`] store
//! - [`token_manager`] - login upsert and refresh-before-use for every guarded request

pub mod directory;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod token_manager;

pub use directory::{
    InMemoryDirectory, NewPrincipal, Principal, SharedDirectory, TokenSet, UserDirectory,
};
pub use error::{OAuthError, Result};
pub use oauth::{AuthorizationRequest, HttpIdentityProvider, OAuthConfig, TokenGrant};
pub use provider::{IdentityProvider, SharedIdentityProvider};
pub use token_manager::{AccessGrant, GuardState, LoginProfile, TokenManager};

#[cfg(any(test, feature = "testing"))]
pub use provider::mock::{MockIdentityProvider, MockReply};
