//! Production effect handlers.
//!
//! Stateless handlers for the effect traits that have OS-level
//! implementations. Network-backed handlers (social auth, key service,
//! phone gateway) are integration code owned by the embedding application;
//! deterministic mocks for everything live in `ward-testkit`.

pub mod biometric;
pub mod clock;

pub use biometric::NoHardwareBiometric;
pub use clock::SystemClock;
