//! Effect trait definitions — the provider contracts the flows consume.
//!
//! This module defines **what** capabilities a flow needs to execute a
//! transition; handlers define **how**. The flows hold no provider state:
//! they call these traits, await the result, and fold it into the next state
//! value. Every trait here is object-safe and `Send + Sync` so bundles can
//! carry `Arc<dyn …>` handlers across await points.
//!
//! Handler homes:
//! - Production/OS handlers: `ward-effects` (system clock, biometric probe).
//! - Network-backed handlers (social auth, key service, phone gateway) are
//!   integration code owned by the embedding application.
//! - Deterministic mocks for all of the above: `ward-testkit`.

pub mod accounts;
pub mod biometric;
pub mod derivation;
pub mod gateway;
pub mod keyservice;
pub mod social;
pub mod time;

pub use accounts::{AccountsError, LocalAccountsEffects};
pub use biometric::{BiometricEffects, BiometricError};
pub use derivation::{DerivationError, WalletDerivationEffects};
pub use gateway::{
    ConfirmOtpPayload, ConfirmedPhone, GatewayError, PhoneGatewayEffects, RegisterPhonePayload,
};
pub use keyservice::{KeyServiceEffects, KeyServiceError};
pub use social::{AuthError, SocialAuthEffects};
pub use time::{PhysicalTimeEffects, TimeError};
