//! Wall-clock time primitives.
//!
//! Flows never read the system clock directly; they ask a
//! [`PhysicalTimeEffects`](crate::effects::time::PhysicalTimeEffects) handler
//! for the current [`UnixMillis`] and store deadlines as plain values. Block
//! windows and resend cooldowns are evaluated at the moment an event arrives,
//! never by a background timer.

use serde::{Deserialize, Serialize};

/// A wall-clock instant as milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixMillis(u64);

impl UnixMillis {
    /// Construct from epoch milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Construct from epoch seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    /// Epoch milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// This instant advanced by `secs` seconds.
    pub const fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs * 1_000))
    }

    /// True when `self` is strictly later than `deadline`.
    pub const fn is_after(self, deadline: UnixMillis) -> bool {
        self.0 > deadline.0
    }
}

impl std::fmt::Display for UnixMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_comparison_is_strict() {
        let deadline = UnixMillis::from_secs(100);
        assert!(!UnixMillis::from_secs(100).is_after(deadline));
        assert!(UnixMillis::from_millis(100_001).is_after(deadline));
    }

    #[test]
    fn addition_saturates() {
        let t = UnixMillis::from_millis(u64::MAX - 10);
        assert_eq!(t.saturating_add_secs(5), UnixMillis::from_millis(u64::MAX));
    }
}
