//! Mock biometric probe.

use async_trait::async_trait;
use ward_core::effects::{BiometricEffects, BiometricError};

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct MockBiometric {
    available: bool,
}

impl MockBiometric {
    /// Probe reporting the given capability.
    pub fn available(available: bool) -> Self {
        Self { available }
    }
}

#[async_trait]
impl BiometricEffects for MockBiometric {
    async fn is_biometric_available(&self) -> Result<bool, BiometricError> {
        Ok(self.available)
    }
}
