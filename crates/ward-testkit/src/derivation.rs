//! Mock wallet derivation.

use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use ward_core::effects::{DerivationError, WalletDerivationEffects};
use ward_core::{EthAddress, PrivateKey, RecoveryPhrase, RestoredWallet};

/// Derivation handler that hashes the phrase and path into a stable wallet.
///
/// The same (phrase, path) pair always derives the same account, and
/// different pairs derive different accounts, which is all the flow tests
/// need.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDerivation;

impl MockDerivation {
    /// Create a mock derivation handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WalletDerivationEffects for MockDerivation {
    async fn derive(
        &self,
        phrase: &RecoveryPhrase,
        derivation_path: &str,
    ) -> Result<RestoredWallet, DerivationError> {
        if phrase.as_str().trim().is_empty() {
            return Err(DerivationError::InvalidPhrase {
                message: "empty phrase".to_owned(),
            });
        }
        let mut hasher = Keccak256::new();
        hasher.update(phrase.as_str().as_bytes());
        hasher.update(b"/");
        hasher.update(derivation_path.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        Ok(RestoredWallet {
            private_key: PrivateKey::from_bytes(digest),
            eth_address: EthAddress::new(format!("0x{}", hex::encode(&digest[12..]))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_inputs_derive_same_wallet() {
        let derivation = MockDerivation::new();
        let phrase = RecoveryPhrase::new("abandon ability able");
        let a = derivation.derive(&phrase, "m/44'/60'/0'/0/0").await.unwrap();
        let b = derivation.derive(&phrase, "m/44'/60'/0'/0/0").await.unwrap();
        let c = derivation.derive(&phrase, "m/44'/60'/0'/0/1").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
