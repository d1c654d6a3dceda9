//! Deterministic test infrastructure for the Ward flows.
//!
//! Every effect trait has a mock here with predictable defaults and
//! per-call scriptable outcomes: tests enqueue `Ok`/coded-error results and
//! the mock replays them in order, falling back to its deterministic
//! default once the queue is empty. The clock is advanced manually.
//!
//! Blocking `std::sync::Mutex` is used throughout: this is test
//! infrastructure driven from single-threaded contexts where lock
//! contention is not a concern and the synchronous API keeps tests clear.

pub mod accounts;
pub mod biometric;
pub mod clock;
pub mod derivation;
pub mod fixtures;
pub mod gateway;
pub mod keyservice;
pub mod social;

pub use accounts::MockLocalAccounts;
pub use biometric::MockBiometric;
pub use clock::{ManualClock, TEST_EPOCH};
pub use derivation::MockDerivation;
pub use gateway::MockPhoneGateway;
pub use keyservice::MockKeyService;
pub use social::MockSocialAuth;
