//! Manually advanced clock.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use ward_core::effects::{PhysicalTimeEffects, TimeError};
use ward_core::UnixMillis;

/// Fixed start instant for deterministic tests: 2022-01-01 00:00:00 UTC.
pub const TEST_EPOCH: UnixMillis = UnixMillis::from_millis(1_640_995_200_000);

/// Clock that only moves when a test advances it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<UnixMillis>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Clock starting at [`TEST_EPOCH`].
    pub fn new() -> Self {
        Self::at(TEST_EPOCH)
    }

    /// Clock starting at the given instant.
    pub fn at(start: UnixMillis) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Current reading.
    pub fn reading(&self) -> UnixMillis {
        *self.now.lock().unwrap()
    }

    /// Move the clock forward.
    pub fn advance_secs(&self, secs: u64) {
        let mut now = self.now.lock().unwrap();
        *now = now.saturating_add_secs(secs);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: UnixMillis) {
        *self.now.lock().unwrap() = instant;
    }
}

#[async_trait]
impl PhysicalTimeEffects for ManualClock {
    async fn now(&self) -> Result<UnixMillis, TimeError> {
        Ok(self.reading())
    }
}
