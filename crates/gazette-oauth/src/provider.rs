//! Identity provider abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::oauth::TokenGrant;

/// The OAuth token endpoint, seen from the token lifecycle.
///
/// Implementations must bound every call with a timeout and report the
/// timeout as [`crate::OAuthError::UpstreamAuth`].
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Exchange a one-time authorization code for a token pair.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Obtain a new access token with a stored refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant>;
}

/// Shared identity provider handle.
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;

#[cfg(any(test, feature = "testing"))]
pub mod mock {
    //! Scripted identity provider for tests.

    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::IdentityProvider;
    use crate::error::{OAuthError, Result};
    use crate::oauth::TokenGrant;

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Grant(TokenGrant),
        Fail { status: u16, detail: String },
    }

    impl MockReply {
        fn into_result(self, operation: &'static str) -> Result<TokenGrant> {
            match self {
                MockReply::Grant(grant) => Ok(grant),
                MockReply::Fail { status, detail } => {
                    Err(OAuthError::upstream(operation, Some(status), detail))
                }
            }
        }
    }

    /// Identity provider that replays queued replies and records its calls.
    ///
    /// An empty queue answers with a 500 failure.
    #[derive(Debug, Default)]
    pub struct MockIdentityProvider {
        exchange_replies: Mutex<VecDeque<MockReply>>,
        refresh_replies: Mutex<VecDeque<MockReply>>,
        exchanged_codes: Mutex<Vec<String>>,
        refreshed_tokens: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockIdentityProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Sleep this long inside every call.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn push_exchange(&self, reply: MockReply) {
            self.exchange_replies.lock().push_back(reply);
        }

        pub fn push_refresh(&self, reply: MockReply) {
            self.refresh_replies.lock().push_back(reply);
        }

        /// Queue a successful exchange.
        pub fn push_exchange_grant(&self, grant: TokenGrant) {
            self.push_exchange(MockReply::Grant(grant));
        }

        /// Queue a successful refresh.
        pub fn push_refresh_grant(&self, grant: TokenGrant) {
            self.push_refresh(MockReply::Grant(grant));
        }

        pub fn exchanged_codes(&self) -> Vec<String> {
            self.exchanged_codes.lock().clone()
        }

        pub fn refreshed_tokens(&self) -> Vec<String> {
            self.refreshed_tokens.lock().clone()
        }

        pub fn exchange_calls(&self) -> usize {
            self.exchanged_codes.lock().len()
        }

        pub fn refresh_calls(&self) -> usize {
            self.refreshed_tokens.lock().len()
        }

        async fn pause(&self) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn exhausted() -> MockReply {
        MockReply::Fail {
            status: 500,
            detail: "no scripted reply".to_string(),
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
            self.exchanged_codes.lock().push(code.to_string());
            let reply = self
                .exchange_replies
                .lock()
                .pop_front()
                .unwrap_or_else(exhausted);
            self.pause().await;
            reply.into_result("token exchange")
        }

        async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
            self.refreshed_tokens.lock().push(refresh_token.to_string());
            let reply = self
                .refresh_replies
                .lock()
                .pop_front()
                .unwrap_or_else(exhausted);
            self.pause().await;
            reply.into_result("token refresh")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_replies_in_order() {
            let provider = MockIdentityProvider::new();
            provider.push_refresh_grant(TokenGrant::new("a", 60));
            provider.push_refresh(MockReply::Fail {
                status: 400,
                detail: "invalid_grant".to_string(),
            });

            assert_eq!(provider.refresh_token("r").await.unwrap().access_token, "a");
            assert!(provider.refresh_token("r").await.unwrap_err().is_upstream());
            // queue exhausted
            assert!(provider.refresh_token("r").await.is_err());
            assert_eq!(provider.refresh_calls(), 3);
            assert_eq!(provider.exchange_calls(), 0);
        }
    }
}
