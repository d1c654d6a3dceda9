//! Local wallet derivation.
//!
//! Deriving an account from a recovery phrase is pure local computation, but
//! it still suspends the flow (key stretching is slow), so it is modeled as
//! an effect like any remote call.

use crate::types::{RecoveryPhrase, RestoredWallet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Derivation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum DerivationError {
    /// The phrase failed checksum or wordlist validation.
    #[error("invalid recovery phrase: {message}")]
    InvalidPhrase {
        /// Validation detail.
        message: String,
    },

    /// The derivation path could not be parsed.
    #[error("invalid derivation path: {message}")]
    InvalidPath {
        /// Validation detail.
        message: String,
    },
}

/// Account derivation from locally held secrets.
#[async_trait]
pub trait WalletDerivationEffects: Send + Sync {
    /// Derive the account for `phrase` at `derivation_path`.
    async fn derive(
        &self,
        phrase: &RecoveryPhrase,
        derivation_path: &str,
    ) -> Result<RestoredWallet, DerivationError>;
}
