//! Core domain model for the Ward onboarding and restoration flows.
//!
//! This crate defines **what** the flows talk about, not how anything is
//! executed: value types for credentials, key shares, and wallets; the
//! numeric error-code tables consumed by the orchestration layer; canonical
//! request signing for the phone gateway; and the effect trait definitions
//! the flows are parameterized by. Handlers for these traits live in
//! `ward-effects` (production) and `ward-testkit` (deterministic mocks).

pub mod codes;
pub mod effects;
pub mod signing;
pub mod time;
pub mod types;

pub use signing::{CanonicalPayload, RequestSigner, SignedRequest, SigningError};
pub use time::UnixMillis;
pub use types::{
    CustomShare, DeviceShare, EncryptedMetadata, EthAddress, LocalAccount, OnboardingWallet,
    OtpChannel, Pincode, PhoneNumber, PrivateKey, RecoveryPhrase, RestoredWallet, SignupArtifacts,
    SocialCredential, SocialProvider, TokenId,
};
