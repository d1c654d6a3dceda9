//! Biometric availability probe.
//!
//! Consumed once, when the security-setup phase computes its initial state:
//! devices without biometric hardware skip the protection-level choice and
//! go straight to pincode creation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Probe failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum BiometricError {
    /// The platform API could not be queried.
    #[error("biometric probe failed: {message}")]
    Probe {
        /// Platform-reported reason.
        message: String,
    },
}

/// Platform biometric capability checks.
#[async_trait]
pub trait BiometricEffects: Send + Sync {
    /// Whether the device has usable biometric hardware.
    async fn is_biometric_available(&self) -> Result<bool, BiometricError>;
}
