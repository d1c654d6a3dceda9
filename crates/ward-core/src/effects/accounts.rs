//! Local credential enumeration.

use crate::types::LocalAccount;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Enumeration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum AccountsError {
    /// The local credential store could not be read.
    #[error("credential store unavailable: {message}")]
    Storage {
        /// Platform-reported reason.
        message: String,
    },
}

/// Access to locally stored, directly restorable accounts.
#[async_trait]
pub trait LocalAccountsEffects: Send + Sync {
    /// All accounts stored on this device.
    async fn list_local_accounts(&self) -> Result<Vec<LocalAccount>, AccountsError>;
}
