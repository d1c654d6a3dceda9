//! Wallet onboarding and restoration flows.
//!
//! Two composite orchestrators — [`create::CreateWalletFlow`] and
//! [`restore::RestoreWalletFlow`] — drive the multi-factor funnel: social
//! sign-in, distributed-key reconstruction, phone-OTP verification, and
//! pincode/biometric security setup. Each composite embeds independently
//! defined leaf flows and advances them through the
//! [`ward_engine`] combinator; the leaf flows own their own state and event
//! sets and can be driven and tested in isolation.
//!
//! Every state across every flow serializes to a resumable snapshot, and
//! every state exposes derived `step`/`continuable` progress metadata.

pub mod create;
pub mod phone_binding;
pub mod policy;
pub mod restore;
pub mod restore_custom;
pub mod restore_local;
pub mod restore_social;
pub mod security_setup;
pub mod social_sign_in;

pub use create::{CreateWalletEffects, CreateWalletEvent, CreateWalletFlow, CreateWalletState};
pub use policy::{BlockReason, BlockWindow, PolicyConfig, ResendCounter};
pub use restore::{
    RestoreWalletEffects, RestoreWalletEvent, RestoreWalletFlow, RestoreWalletState,
};
