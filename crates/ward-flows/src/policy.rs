//! OTP resend backoff and phase lockout policy.
//!
//! One ladder of wait intervals governs resend cadence; exhausting it, or a
//! remote rate-limit code, locks the phase for a fixed window. Lockouts are
//! plain timestamps evaluated when the retry event arrives — no background
//! timer ever fires a transition.

use serde::{Deserialize, Serialize};
use ward_core::UnixMillis;

/// Wait intervals between OTP resends, in seconds, indexed by attempt.
pub const RESEND_LADDER: [u64; 5] = [30, 40, 60, 90, 120];

/// Fixed phase lockout duration, in seconds.
pub const BLOCK_DURATION_SECS: u64 = 600;

/// Tunable backoff/lockout parameters with protocol defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Resend wait ladder in seconds; indices beyond the end reuse the last
    /// value.
    pub resend_ladder: Vec<u64>,
    /// Lockout duration in seconds.
    pub block_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            resend_ladder: RESEND_LADDER.to_vec(),
            block_secs: BLOCK_DURATION_SECS,
        }
    }
}

impl PolicyConfig {
    /// Wait interval for the given resend attempt.
    pub fn resend_interval_secs(&self, attempt: u32) -> u64 {
        let ladder = &self.resend_ladder;
        ladder
            .get(attempt as usize)
            .or_else(|| ladder.last())
            .copied()
            .unwrap_or(0)
    }

    /// Number of resends after which the phase blocks unconditionally.
    pub fn resend_cap(&self) -> u32 {
        self.resend_ladder.len() as u32
    }
}

/// Cadence tracker for repeated OTP dispatch within one enter-OTP sojourn.
///
/// `attempt` is monotonically non-decreasing and capped; `until` is the
/// advisory end of the current wait interval for UI countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendCounter {
    /// Resends performed so far in this sojourn.
    pub attempt: u32,
    /// Advisory end of the current wait interval.
    pub until: UnixMillis,
}

impl ResendCounter {
    /// Counter for a freshly dispatched OTP.
    pub fn first(now: UnixMillis, config: &PolicyConfig) -> Self {
        Self {
            attempt: 0,
            until: now.saturating_add_secs(config.resend_interval_secs(0)),
        }
    }

    /// Counter after one more resend.
    pub fn bumped(&self, now: UnixMillis, config: &PolicyConfig) -> Self {
        let attempt = self.attempt + 1;
        Self {
            attempt,
            until: now.saturating_add_secs(config.resend_interval_secs(attempt)),
        }
    }

    /// True when the next resend would reach the cap and must block instead
    /// of dispatching.
    pub fn next_resend_blocks(&self, config: &PolicyConfig) -> bool {
        self.attempt + 1 >= config.resend_cap()
    }
}

/// Which phase a lockout applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockReason {
    /// Lockout tripped while requesting an OTP dispatch.
    BlockEnterPhoneNumber,
    /// Lockout tripped while confirming or resending an OTP.
    BlockEnterOtp,
}

impl BlockReason {
    /// Stable name for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::BlockEnterPhoneNumber => "blockEnterPhoneNumber",
            BlockReason::BlockEnterOtp => "blockEnterOtp",
        }
    }
}

/// A timed phase lockout.
///
/// Re-entry is guarded at event arrival: the phase's retry event is only
/// accepted strictly after `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWindow {
    /// Instant the lockout ends.
    pub until: UnixMillis,
    /// Phase the lockout applies to.
    pub reason: BlockReason,
}

impl BlockWindow {
    /// Open a lockout starting now.
    pub fn starting(now: UnixMillis, reason: BlockReason, config: &PolicyConfig) -> Self {
        Self {
            until: now.saturating_add_secs(config.block_secs),
            reason,
        }
    }

    /// True once the lockout has passed, strictly.
    pub fn expired(&self, now: UnixMillis) -> bool {
        now.is_after(self.until)
    }
}
