//! Distributed-key service effect.
//!
//! Reconstructing an account's private key requires any two of
//! {device share, custom share, social-derived share}; the sign-in methods
//! below are the supported pairings. Failures carry the backend's numeric
//! code (`crate::codes::key_service`), which the flows branch on.

use crate::types::{CustomShare, DeviceShare, RestoredWallet, SignupArtifacts, TokenId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error raised by the distributed-key backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("key service error {code} ({name}): {message}")]
pub struct KeyServiceError {
    /// Backend error name.
    pub name: String,
    /// Numeric code; see `crate::codes::key_service` for the consumed values.
    pub code: i64,
    /// Human-readable detail.
    pub message: String,
}

impl KeyServiceError {
    /// Build an error with the given code.
    pub fn new(code: i64, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code,
            message: message.into(),
        }
    }
}

/// Signup and key-reconstruction operations.
#[async_trait]
pub trait KeyServiceEffects: Send + Sync {
    /// Silent signup: create key material for a fresh social credential.
    async fn sign_up(&self, token: &TokenId) -> Result<SignupArtifacts, KeyServiceError>;

    /// Reconstruct with the social-derived share plus a device share.
    async fn sign_in_with_device_share(
        &self,
        token: &TokenId,
        device_share: &DeviceShare,
    ) -> Result<RestoredWallet, KeyServiceError>;

    /// Reconstruct with the social-derived share plus a custom share.
    async fn sign_in_with_custom_share(
        &self,
        token: &TokenId,
        custom_share: &CustomShare,
    ) -> Result<RestoredWallet, KeyServiceError>;

    /// Reconstruct with a device share plus a custom share, no social step.
    async fn sign_in_with_shares(
        &self,
        device_share: &DeviceShare,
        custom_share: &CustomShare,
    ) -> Result<RestoredWallet, KeyServiceError>;
}
