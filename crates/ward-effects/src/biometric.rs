//! Fallback biometric handler for platforms without biometric hardware.
//!
//! Null-object handler: reports "not available" so flows skip the
//! protection-level choice. Use it on servers, CI, and headless systems;
//! platform integrations provide the real probe.

use async_trait::async_trait;
use ward_core::effects::{BiometricEffects, BiometricError};

/// Biometric probe that always reports no usable hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHardwareBiometric;

impl NoHardwareBiometric {
    /// Create a fallback biometric handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BiometricEffects for NoHardwareBiometric {
    async fn is_biometric_available(&self) -> Result<bool, BiometricError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_probe_reports_unavailable() {
        let probe = NoHardwareBiometric::new();
        assert!(!probe.is_biometric_available().await.unwrap());
    }
}
