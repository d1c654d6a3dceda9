//! Security-setup leaf flow.
//!
//! Chooses a protection level (skipped on devices without biometric
//! hardware), creates a pincode, and confirms it. The confirm transition
//! verifies the confirmed pincode against the created one; a mismatch
//! re-enters pincode creation rather than raising an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::effects::BiometricEffects;
use ward_core::Pincode;
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the security-setup flow needs.
#[derive(Clone)]
pub struct SecuritySetupEffects {
    /// Platform biometric probe.
    pub biometric: Arc<dyn BiometricEffects>,
}

/// Security-setup states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SecuritySetupState {
    /// Choosing between biometric and pincode-only protection.
    SetProtectionLevel,
    /// Waiting for a new pincode.
    CreatePincode,
    /// Waiting for the pincode to be entered again.
    ConfirmPincode {
        /// The pincode created in the previous step.
        pincode: Pincode,
    },
    /// Terminal.
    Finish(SecuritySetupFinish),
}

/// Security-setup outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum SecuritySetupFinish {
    /// Protection configured.
    Success {
        /// The confirmed pincode.
        pincode: Pincode,
        /// Whether biometric unlock was enabled.
        biometric_enabled: bool,
    },
}

/// Security-setup events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum SecuritySetupEvent {
    /// Proceed to pincode creation.
    CreatePincode,
    /// Submit a newly created pincode.
    ConfirmPincode {
        /// The created pincode.
        pincode: Pincode,
    },
    /// Re-enter the pincode and finish.
    SetPincode {
        /// The re-entered pincode; must equal the created one.
        pincode: Pincode,
        /// Whether to enable biometric unlock.
        biometric_enabled: bool,
    },
    /// Return to pincode creation.
    Back,
}

impl FlowState for SecuritySetupState {
    fn name(&self) -> &'static str {
        match self {
            SecuritySetupState::SetProtectionLevel => "setProtectionLevel",
            SecuritySetupState::CreatePincode => "createPincode",
            SecuritySetupState::ConfirmPincode { .. } => "confirmPincode",
            SecuritySetupState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            SecuritySetupState::SetProtectionLevel => 0,
            SecuritySetupState::CreatePincode => 1,
            SecuritySetupState::ConfirmPincode { .. } => 2,
            SecuritySetupState::Finish(_) => 3,
        }
    }

    fn continuable(&self) -> bool {
        true
    }

    fn is_terminal(&self) -> bool {
        matches!(self, SecuritySetupState::Finish(_))
    }
}

impl FlowEvent for SecuritySetupEvent {
    fn name(&self) -> &'static str {
        match self {
            SecuritySetupEvent::CreatePincode => "createPincode",
            SecuritySetupEvent::ConfirmPincode { .. } => "confirmPincode",
            SecuritySetupEvent::SetPincode { .. } => "setPincode",
            SecuritySetupEvent::Back => "back",
        }
    }
}

/// The security-setup leaf flow.
#[derive(Debug, Clone, Default)]
pub struct SecuritySetupFlow;

impl SecuritySetupFlow {
    /// Entry state, computed from the device's biometric capability: devices
    /// without hardware skip the protection-level choice.
    pub async fn initial_state(
        &self,
        effects: &SecuritySetupEffects,
    ) -> FlowResult<SecuritySetupState> {
        if effects.biometric.is_biometric_available().await? {
            Ok(SecuritySetupState::SetProtectionLevel)
        } else {
            Ok(SecuritySetupState::CreatePincode)
        }
    }
}

#[async_trait]
impl Flow for SecuritySetupFlow {
    type State = SecuritySetupState;
    type Event = SecuritySetupEvent;
    type Effects = SecuritySetupEffects;
    type Finish = SecuritySetupFinish;

    async fn transition(
        &self,
        state: &SecuritySetupState,
        event: SecuritySetupEvent,
        _effects: &SecuritySetupEffects,
    ) -> FlowResult<SecuritySetupState> {
        match (state, &event) {
            (SecuritySetupState::SetProtectionLevel, SecuritySetupEvent::CreatePincode) => {
                Ok(SecuritySetupState::CreatePincode)
            }
            (SecuritySetupState::CreatePincode, SecuritySetupEvent::ConfirmPincode { pincode }) => {
                Ok(SecuritySetupState::ConfirmPincode {
                    pincode: pincode.clone(),
                })
            }
            (
                SecuritySetupState::ConfirmPincode { pincode: created },
                SecuritySetupEvent::SetPincode {
                    pincode,
                    biometric_enabled,
                },
            ) => {
                if pincode != created {
                    tracing::debug!("pincode confirmation mismatch, re-entering creation");
                    return Ok(SecuritySetupState::CreatePincode);
                }
                Ok(SecuritySetupState::Finish(SecuritySetupFinish::Success {
                    pincode: pincode.clone(),
                    biometric_enabled: *biometric_enabled,
                }))
            }
            (SecuritySetupState::ConfirmPincode { .. }, SecuritySetupEvent::Back) => {
                Ok(SecuritySetupState::CreatePincode)
            }
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: SecuritySetupState) -> Result<SecuritySetupFinish, SecuritySetupState> {
        match state {
            SecuritySetupState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use ward_engine::FlowError;
    use ward_testkit::MockBiometric;

    fn fx(available: bool) -> SecuritySetupEffects {
        SecuritySetupEffects {
            biometric: Arc::new(MockBiometric::available(available)),
        }
    }

    #[tokio::test]
    async fn test_initial_state_skips_protection_choice_without_hardware() {
        let flow = SecuritySetupFlow;
        assert_eq!(
            flow.initial_state(&fx(false)).await.unwrap(),
            SecuritySetupState::CreatePincode
        );
        assert_eq!(
            flow.initial_state(&fx(true)).await.unwrap(),
            SecuritySetupState::SetProtectionLevel
        );
    }

    #[tokio::test]
    async fn test_matching_confirmation_finishes() {
        let flow = SecuritySetupFlow;
        let state = SecuritySetupState::ConfirmPincode {
            pincode: Pincode::new("4242"),
        };
        let next = flow
            .transition(
                &state,
                SecuritySetupEvent::SetPincode {
                    pincode: Pincode::new("4242"),
                    biometric_enabled: true,
                },
                &fx(true),
            )
            .await
            .unwrap();
        assert_matches!(
            next,
            SecuritySetupState::Finish(SecuritySetupFinish::Success {
                biometric_enabled: true,
                ..
            })
        );
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_reenters_creation() {
        let flow = SecuritySetupFlow;
        let state = SecuritySetupState::ConfirmPincode {
            pincode: Pincode::new("4242"),
        };
        let next = flow
            .transition(
                &state,
                SecuritySetupEvent::SetPincode {
                    pincode: Pincode::new("9999"),
                    biometric_enabled: false,
                },
                &fx(false),
            )
            .await
            .unwrap();
        assert_eq!(next, SecuritySetupState::CreatePincode);
    }

    #[tokio::test]
    async fn test_confirming_before_creating_is_invalid() {
        let flow = SecuritySetupFlow;
        let error = flow
            .transition(
                &SecuritySetupState::SetProtectionLevel,
                SecuritySetupEvent::SetPincode {
                    pincode: Pincode::new("4242"),
                    biometric_enabled: false,
                },
                &fx(true),
            )
            .await
            .unwrap_err();
        assert_matches!(
            error,
            FlowError::InvalidEvent {
                state: "setProtectionLevel",
                event: "setPincode"
            }
        );
    }
}
