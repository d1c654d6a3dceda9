//! Mock local credential store.

use async_trait::async_trait;
use ward_core::effects::{AccountsError, LocalAccountsEffects};
use ward_core::LocalAccount;

/// Store with a fixed account list.
#[derive(Debug, Clone, Default)]
pub struct MockLocalAccounts {
    accounts: Vec<LocalAccount>,
}

impl MockLocalAccounts {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the given accounts.
    pub fn with_accounts(accounts: Vec<LocalAccount>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl LocalAccountsEffects for MockLocalAccounts {
    async fn list_local_accounts(&self) -> Result<Vec<LocalAccount>, AccountsError> {
        Ok(self.accounts.clone())
    }
}
