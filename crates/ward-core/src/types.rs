//! Domain value types shared by every flow.
//!
//! All of these are immutable value snapshots: states embed them, snapshots
//! serialize them, and transitions produce new values rather than mutating in
//! place. Secret material (`PrivateKey`, `RecoveryPhrase`, `Pincode`) is
//! zeroized on drop and redacted from `Debug` output.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Social identity providers accepted for sign-in and key reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    /// Sign in with Apple.
    Apple,
    /// Sign in with Google.
    Google,
}

impl SocialProvider {
    /// Human-readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SocialProvider::Apple => "Apple",
            SocialProvider::Google => "Google",
        }
    }
}

/// Opaque credential produced by social authentication and consumed by the
/// distributed-key service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId {
    /// Opaque credential value as issued by the provider.
    pub value: String,
    /// Provider that issued the credential.
    pub provider: SocialProvider,
}

/// Result of a completed social authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialCredential {
    /// The issued credential.
    pub token: TokenId,
    /// Email address the provider reported for the account.
    pub email: String,
}

/// A phone number exactly as entered by the user.
///
/// No client-side validation: format errors are the gateway's call
/// (`codes::gateway::INVALID_PHONE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Wrap a raw phone number string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery channel for one-time passcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    /// Text message.
    Sms,
    /// Voice call.
    Call,
}

impl OtpChannel {
    /// Wire name of the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpChannel::Sms => "sms",
            OtpChannel::Call => "call",
        }
    }
}

/// Key-reconstruction fragment held only on the local device.
///
/// Device shares never leave the device; they are combined locally with a
/// second share to reconstruct the account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceShare(String);

impl DeviceShare {
    /// Wrap an encoded device share.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded share.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Key-reconstruction fragment held by the phone-verification backend,
/// released only after OTP confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomShare(String);

impl CustomShare {
    /// Wrap an encoded custom share.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded share.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Encrypted key metadata payload produced at signup and echoed back to the
/// key service during reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedMetadata(Vec<u8>);

impl EncryptedMetadata {
    /// Wrap an encrypted metadata blob.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw ciphertext.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A secp256k1 account private key.
///
/// Redacted from `Debug` output and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A checksummed Ethereum-style account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EthAddress(String);

impl EthAddress {
    /// Wrap an address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the distributed-key service returns from a successful signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupArtifacts {
    /// Reconstructed account private key.
    pub private_key: PrivateKey,
    /// Account address derived by the key service.
    pub eth_address: EthAddress,
    /// Share to be kept on this device only.
    pub device_share: DeviceShare,
    /// Share to be deposited with the phone-verification backend.
    pub custom_share: CustomShare,
    /// Encrypted key metadata payload.
    pub metadata: EncryptedMetadata,
}

/// A reconstructed account, as returned by any sign-in path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoredWallet {
    /// Reconstructed account private key.
    pub private_key: PrivateKey,
    /// Account address.
    pub eth_address: EthAddress,
}

/// A device-local pincode.
///
/// Redacted from `Debug` output and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Wrap a pincode string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The pincode digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Pincode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pincode(..)")
    }
}

impl Drop for Pincode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A BIP-39 style recovery phrase.
///
/// Redacted from `Debug` output and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecoveryPhrase(String);

impl RecoveryPhrase {
    /// Wrap a recovery phrase.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The phrase words.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecoveryPhrase(..)")
    }
}

impl Drop for RecoveryPhrase {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A locally stored account usable for direct restoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    /// Optional display name the user gave the account.
    pub name: Option<String>,
    /// Stored recovery phrase.
    pub recovery_phrase: RecoveryPhrase,
    /// Derivation path the account was created with.
    pub derivation_path: String,
}

/// Terminal artifact of a successful create-wallet run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingWallet {
    /// Account private key.
    pub private_key: PrivateKey,
    /// Account address.
    pub eth_address: EthAddress,
    /// Share kept on this device.
    pub device_share: DeviceShare,
    /// Pincode chosen during security setup.
    pub pincode: Pincode,
    /// Whether the user enabled biometric unlock.
    pub biometric_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_types_redact_debug_output() {
        let key = PrivateKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{key:?}"), "PrivateKey(..)");
        let pin = Pincode::new("4242");
        assert_eq!(format!("{pin:?}"), "Pincode(..)");
        let phrase = RecoveryPhrase::new("abandon abandon about");
        assert_eq!(format!("{phrase:?}"), "RecoveryPhrase(..)");
    }

    #[test]
    fn private_key_round_trips_through_serde() {
        let key = PrivateKey::from_bytes([9u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        let back: PrivateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }
}
