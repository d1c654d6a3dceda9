//! Mock social authentication.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use ward_core::effects::{AuthError, SocialAuthEffects};
use ward_core::{SocialCredential, SocialProvider, TokenId};

/// Scriptable social-auth handler.
///
/// Defaults: `authenticate` succeeds with a deterministic credential for the
/// requested provider; no token is expired.
#[derive(Debug, Default)]
pub struct MockSocialAuth {
    responses: Mutex<VecDeque<Result<SocialCredential, AuthError>>>,
    expired: Mutex<HashSet<String>>,
}

impl MockSocialAuth {
    /// Handler with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// The credential `authenticate` returns by default.
    pub fn default_credential(provider: SocialProvider) -> SocialCredential {
        SocialCredential {
            token: TokenId {
                value: format!("token-{}", provider.display_name().to_lowercase()),
                provider,
            },
            email: "user@example.com".to_owned(),
        }
    }

    /// Enqueue the outcome of the next `authenticate` call.
    pub fn push_response(&self, response: Result<SocialCredential, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Mark a token value as expired.
    pub fn mark_expired(&self, token_value: impl Into<String>) {
        self.expired.lock().unwrap().insert(token_value.into());
    }
}

#[async_trait]
impl SocialAuthEffects for MockSocialAuth {
    async fn authenticate(
        &self,
        provider: SocialProvider,
    ) -> Result<SocialCredential, AuthError> {
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(Self::default_credential(provider)),
        }
    }

    async fn is_expired(&self, token: &TokenId) -> Result<bool, AuthError> {
        Ok(self.expired.lock().unwrap().contains(&token.value))
    }
}
