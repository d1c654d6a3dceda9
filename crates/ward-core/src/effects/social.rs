//! Social authentication effect.

use crate::types::{SocialCredential, SocialProvider, TokenId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Social authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum AuthError {
    /// The user dismissed the provider's sign-in sheet.
    #[error("authentication cancelled")]
    Cancelled,

    /// The provider rejected or failed the sign-in.
    #[error("authentication failed: {message}")]
    Failed {
        /// Provider-reported reason.
        message: String,
    },
}

/// Sign-in against a social identity provider.
#[async_trait]
pub trait SocialAuthEffects: Send + Sync {
    /// Run the provider's sign-in and return the issued credential plus the
    /// account email.
    async fn authenticate(&self, provider: SocialProvider)
        -> Result<SocialCredential, AuthError>;

    /// Whether a previously issued credential is past its validity window.
    async fn is_expired(&self, token: &TokenId) -> Result<bool, AuthError>;
}
