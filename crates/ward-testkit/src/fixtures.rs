//! Deterministic domain fixtures.
//!
//! Key material comes from a seeded ChaCha20 stream, so every test run sees
//! byte-identical artifacts.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use ward_core::{
    CustomShare, DeviceShare, EncryptedMetadata, EthAddress, LocalAccount, PrivateKey,
    RecoveryPhrase, RequestSigner, RestoredWallet, SignupArtifacts,
};

fn seeded_bytes(seed: u64) -> [u8; 32] {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Deterministic signup artifacts, as the key service would return them.
pub fn signup_artifacts() -> SignupArtifacts {
    SignupArtifacts {
        private_key: PrivateKey::from_bytes(seeded_bytes(1)),
        eth_address: EthAddress::new(format!("0x{}", hex::encode(&seeded_bytes(2)[..20]))),
        device_share: DeviceShare::new(hex::encode(seeded_bytes(3))),
        custom_share: CustomShare::new(hex::encode(seeded_bytes(4))),
        metadata: EncryptedMetadata::new(seeded_bytes(5).to_vec()),
    }
}

/// Deterministic reconstructed wallet.
pub fn restored_wallet() -> RestoredWallet {
    RestoredWallet {
        private_key: PrivateKey::from_bytes(seeded_bytes(6)),
        eth_address: EthAddress::new(format!("0x{}", hex::encode(&seeded_bytes(7)[..20]))),
    }
}

/// Deterministic device share, distinct from the signup one.
pub fn device_share() -> DeviceShare {
    DeviceShare::new(hex::encode(seeded_bytes(8)))
}

/// Deterministic custom share, distinct from the signup one.
pub fn custom_share() -> CustomShare {
    CustomShare::new(hex::encode(seeded_bytes(9)))
}

/// Ephemeral request-signing identity for restore paths.
pub fn ephemeral_signer() -> RequestSigner {
    RequestSigner::new(
        PrivateKey::from_bytes(seeded_bytes(10)),
        EthAddress::new(format!("0x{}", hex::encode(&seeded_bytes(11)[..20]))),
    )
}

/// A locally stored account for keychain-picker tests.
pub fn local_account(name: &str) -> LocalAccount {
    LocalAccount {
        name: Some(name.to_owned()),
        recovery_phrase: RecoveryPhrase::new(format!("seed words for {name}")),
        derivation_path: "m/44'/60'/0'/0/0".to_owned(),
    }
}
