//! Wall-clock effect.
//!
//! Block windows and resend cooldowns are gated on the clock reading taken
//! when an event arrives, so the clock is an effect like any other — tests
//! substitute a manually advanced handler.

use crate::time::UnixMillis;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Clock failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The platform clock could not be read.
    #[error("clock unavailable: {message}")]
    Unavailable {
        /// Reason the reading failed.
        message: String,
    },
}

/// Wall-clock reads.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    async fn now(&self) -> Result<UnixMillis, TimeError>;
}
