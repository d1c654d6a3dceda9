//! System-time clock handler.

use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};
use ward_core::effects::{PhysicalTimeEffects, TimeError};
use ward_core::UnixMillis;

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a system clock handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for SystemClock {
    async fn now(&self) -> Result<UnixMillis, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimeError::Unavailable {
                message: e.to_string(),
            })?;
        Ok(UnixMillis::from_millis(elapsed.as_millis() as u64))
    }
}
