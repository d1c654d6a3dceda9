//! Phone-binding leaf flow for wallet creation.
//!
//! Binds a phone number to the freshly created wallet: signed OTP dispatch,
//! confirmation, resend cadence per the backoff ladder, and a timed lockout
//! on rate-limiting or ladder exhaustion. Signature and server-internal
//! gateway codes propagate as fatal; only the rate-limit code is absorbed.

use crate::policy::{BlockReason, BlockWindow, PolicyConfig, ResendCounter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::codes;
use ward_core::effects::{
    ConfirmOtpPayload, PhoneGatewayEffects, PhysicalTimeEffects, RegisterPhonePayload,
};
use ward_core::{OtpChannel, PhoneNumber, RequestSigner, UnixMillis};
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the binding flow needs, plus the identity that signs its
/// gateway requests.
#[derive(Clone)]
pub struct PhoneBindingEffects {
    /// Phone-verification gateway client.
    pub gateway: Arc<dyn PhoneGatewayEffects>,
    /// Wall clock for counters and lockouts.
    pub clock: Arc<dyn PhysicalTimeEffects>,
    /// Wallet identity signing every request.
    pub signer: RequestSigner,
}

/// Binding states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum PhoneBindingState {
    /// Waiting for a phone number.
    EnterPhoneNumber {
        /// Number preserved from an earlier visit, if any.
        phone: Option<PhoneNumber>,
    },
    /// OTP dispatched; waiting for the code.
    EnterOtp {
        /// Number the OTP went to.
        phone: PhoneNumber,
        /// Channel it was dispatched on.
        channel: OtpChannel,
        /// Resend cadence within this sojourn.
        counter: ResendCounter,
    },
    /// Phase locked out.
    Block {
        /// The lockout.
        window: BlockWindow,
        /// Number to prefill on re-entry.
        phone: PhoneNumber,
    },
    /// Terminal.
    Finish(PhoneBindingFinish),
}

/// Binding outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum PhoneBindingFinish {
    /// The number is confirmed and bound.
    Bound {
        /// The confirmed number.
        phone: PhoneNumber,
    },
}

/// Binding events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum PhoneBindingEvent {
    /// Dispatch an OTP to the given number.
    EnterPhoneNumber {
        /// Number to bind.
        phone: PhoneNumber,
        /// Delivery channel.
        channel: OtpChannel,
    },
    /// Confirm the dispatched OTP.
    EnterOtp {
        /// The code the user entered.
        code: String,
    },
    /// Dispatch the OTP again.
    ResendOtp,
    /// Return to number entry, preserving the entered number.
    Back,
    /// Re-enter the phase after a lockout has passed.
    Retry,
}

impl FlowState for PhoneBindingState {
    fn name(&self) -> &'static str {
        match self {
            PhoneBindingState::EnterPhoneNumber { .. } => "enterPhoneNumber",
            PhoneBindingState::EnterOtp { .. } => "enterOtp",
            PhoneBindingState::Block { .. } => "block",
            PhoneBindingState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            PhoneBindingState::EnterPhoneNumber { .. } => 0,
            PhoneBindingState::EnterOtp { .. } => 1,
            PhoneBindingState::Block { .. } => 2,
            PhoneBindingState::Finish(_) => 3,
        }
    }

    fn continuable(&self) -> bool {
        // A dispatched OTP does not survive a restart; resuming mid-sojourn
        // restarts the phase at number entry instead.
        !matches!(self, PhoneBindingState::EnterOtp { .. })
    }

    fn is_terminal(&self) -> bool {
        matches!(self, PhoneBindingState::Finish(_))
    }
}

impl FlowEvent for PhoneBindingEvent {
    fn name(&self) -> &'static str {
        match self {
            PhoneBindingEvent::EnterPhoneNumber { .. } => "enterPhoneNumber",
            PhoneBindingEvent::EnterOtp { .. } => "enterOtp",
            PhoneBindingEvent::ResendOtp => "resendOtp",
            PhoneBindingEvent::Back => "back",
            PhoneBindingEvent::Retry => "retry",
        }
    }
}

/// The phone-binding leaf flow.
#[derive(Debug, Clone, Default)]
pub struct PhoneBindingFlow {
    policy: PolicyConfig,
}

impl PhoneBindingFlow {
    /// Flow with the given backoff/lockout policy.
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Entry state.
    pub fn initial_state(&self) -> PhoneBindingState {
        PhoneBindingState::EnterPhoneNumber { phone: None }
    }

    fn block(&self, now: UnixMillis, reason: BlockReason, phone: PhoneNumber) -> PhoneBindingState {
        let window = BlockWindow::starting(now, reason, &self.policy);
        tracing::warn!(reason = reason.as_str(), until = %window.until, "phone binding blocked");
        PhoneBindingState::Block { window, phone }
    }

    /// Dispatch an OTP; absorbs the rate-limit code, propagates the rest.
    async fn dispatch(
        &self,
        phone: PhoneNumber,
        channel: OtpChannel,
        reason: BlockReason,
        counter: Option<&ResendCounter>,
        effects: &PhoneBindingEffects,
    ) -> FlowResult<PhoneBindingState> {
        let now = effects.clock.now().await?;
        let request = effects.signer.sign(RegisterPhonePayload {
            phone_number: phone.clone(),
            channel,
            eth_address: effects.signer.eth_address().clone(),
        })?;
        match effects.gateway.register_or_restore(&request).await {
            Ok(()) => {
                let counter = match counter {
                    Some(counter) => counter.bumped(now, &self.policy),
                    None => ResendCounter::first(now, &self.policy),
                };
                Ok(PhoneBindingState::EnterOtp {
                    phone,
                    channel,
                    counter,
                })
            }
            Err(error) if error.code == codes::gateway::RATE_LIMITED => {
                Ok(self.block(now, reason, phone))
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait]
impl Flow for PhoneBindingFlow {
    type State = PhoneBindingState;
    type Event = PhoneBindingEvent;
    type Effects = PhoneBindingEffects;
    type Finish = PhoneBindingFinish;

    async fn transition(
        &self,
        state: &PhoneBindingState,
        event: PhoneBindingEvent,
        effects: &PhoneBindingEffects,
    ) -> FlowResult<PhoneBindingState> {
        match (state, &event) {
            (
                PhoneBindingState::EnterPhoneNumber { .. },
                PhoneBindingEvent::EnterPhoneNumber { phone, channel },
            ) => {
                self.dispatch(
                    phone.clone(),
                    *channel,
                    BlockReason::BlockEnterPhoneNumber,
                    None,
                    effects,
                )
                .await
            }
            (
                PhoneBindingState::EnterOtp { phone, .. },
                PhoneBindingEvent::EnterOtp { code },
            ) => {
                let now = effects.clock.now().await?;
                let request = effects.signer.sign(ConfirmOtpPayload {
                    phone_number: phone.clone(),
                    otp_code: code.clone(),
                    eth_address: effects.signer.eth_address().clone(),
                })?;
                match effects.gateway.confirm(&request).await {
                    // The released share duplicates what signup already
                    // produced; binding only needs the confirmation.
                    Ok(_confirmed) => Ok(PhoneBindingState::Finish(PhoneBindingFinish::Bound {
                        phone: phone.clone(),
                    })),
                    Err(error) if error.code == codes::gateway::RATE_LIMITED => {
                        Ok(self.block(now, BlockReason::BlockEnterOtp, phone.clone()))
                    }
                    Err(error) => Err(error.into()),
                }
            }
            (
                PhoneBindingState::EnterOtp {
                    phone,
                    channel,
                    counter,
                },
                PhoneBindingEvent::ResendOtp,
            ) => {
                if counter.next_resend_blocks(&self.policy) {
                    // The cap fires before the gateway is consulted.
                    let now = effects.clock.now().await?;
                    return Ok(self.block(now, BlockReason::BlockEnterOtp, phone.clone()));
                }
                self.dispatch(
                    phone.clone(),
                    *channel,
                    BlockReason::BlockEnterOtp,
                    Some(counter),
                    effects,
                )
                .await
            }
            (PhoneBindingState::EnterOtp { phone, .. }, PhoneBindingEvent::Back) => {
                Ok(PhoneBindingState::EnterPhoneNumber {
                    phone: Some(phone.clone()),
                })
            }
            (PhoneBindingState::Block { window, phone }, PhoneBindingEvent::Retry) => {
                let now = effects.clock.now().await?;
                if !window.expired(now) {
                    return Err(FlowError::invalid_event(state, &event));
                }
                Ok(PhoneBindingState::EnterPhoneNumber {
                    phone: Some(phone.clone()),
                })
            }
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: PhoneBindingState) -> Result<PhoneBindingFinish, PhoneBindingState> {
        match state {
            PhoneBindingState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use std::sync::Arc;
    use ward_testkit::{fixtures, ManualClock, MockPhoneGateway, TEST_EPOCH};

    fn effects(gateway: Arc<MockPhoneGateway>, clock: Arc<ManualClock>) -> PhoneBindingEffects {
        PhoneBindingEffects {
            gateway,
            clock,
            signer: fixtures::ephemeral_signer(),
        }
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::new("+15550001111")
    }

    fn otp_state() -> PhoneBindingState {
        PhoneBindingState::EnterOtp {
            phone: phone(),
            channel: OtpChannel::Sms,
            counter: ResendCounter {
                attempt: 0,
                until: TEST_EPOCH.saturating_add_secs(30),
            },
        }
    }

    #[tokio::test]
    async fn test_back_preserves_the_entered_number() {
        let flow = PhoneBindingFlow::default();
        let fx = effects(Arc::new(MockPhoneGateway::new()), Arc::new(ManualClock::new()));
        let next = flow
            .transition(&otp_state(), PhoneBindingEvent::Back, &fx)
            .await
            .unwrap();
        assert_eq!(
            next,
            PhoneBindingState::EnterPhoneNumber {
                phone: Some(phone())
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_signs_with_the_wallet_identity() {
        let flow = PhoneBindingFlow::default();
        let gateway = Arc::new(MockPhoneGateway::new());
        let fx = effects(Arc::clone(&gateway), Arc::new(ManualClock::new()));
        flow.transition(
            &PhoneBindingState::EnterPhoneNumber { phone: None },
            PhoneBindingEvent::EnterPhoneNumber {
                phone: phone(),
                channel: OtpChannel::Sms,
            },
            &fx,
        )
        .await
        .unwrap();
        let calls = gateway.register_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            &calls[0].payload.eth_address,
            fixtures::ephemeral_signer().eth_address()
        );
        assert!(!calls[0].signature.is_empty());
    }

    #[tokio::test]
    async fn test_resend_cap_blocks_without_calling_the_gateway() {
        let flow = PhoneBindingFlow::default();
        let gateway = Arc::new(MockPhoneGateway::new());
        let fx = effects(Arc::clone(&gateway), Arc::new(ManualClock::new()));
        let state = PhoneBindingState::EnterOtp {
            phone: phone(),
            channel: OtpChannel::Sms,
            counter: ResendCounter {
                attempt: 4,
                until: TEST_EPOCH.saturating_add_secs(120),
            },
        };
        let next = flow
            .transition(&state, PhoneBindingEvent::ResendOtp, &fx)
            .await
            .unwrap();
        assert_matches!(
            next,
            PhoneBindingState::Block {
                window: BlockWindow {
                    reason: BlockReason::BlockEnterOtp,
                    ..
                },
                ..
            }
        );
        assert_eq!(gateway.register_call_count(), 0);
    }

    fn arb_state() -> impl Strategy<Value = PhoneBindingState> {
        prop_oneof![
            Just(PhoneBindingState::EnterPhoneNumber { phone: None }),
            Just(PhoneBindingState::EnterPhoneNumber {
                phone: Some(phone())
            }),
            Just(otp_state()),
            // Lockouts both still open and already passed relative to the
            // test clock.
            (0u64..=1_200).prop_map(|secs| PhoneBindingState::Block {
                window: BlockWindow {
                    until: TEST_EPOCH.saturating_add_secs(secs),
                    reason: BlockReason::BlockEnterOtp,
                },
                phone: phone(),
            }),
            Just(PhoneBindingState::Finish(PhoneBindingFinish::Bound {
                phone: phone()
            })),
        ]
    }

    fn arb_event() -> impl Strategy<Value = PhoneBindingEvent> {
        prop_oneof![
            Just(PhoneBindingEvent::EnterPhoneNumber {
                phone: phone(),
                channel: OtpChannel::Sms,
            }),
            Just(PhoneBindingEvent::EnterOtp {
                code: "000000".to_owned()
            }),
            Just(PhoneBindingEvent::ResendOtp),
            Just(PhoneBindingEvent::Back),
            Just(PhoneBindingEvent::Retry),
        ]
    }

    fn legal(state: &PhoneBindingState, event: &PhoneBindingEvent, now: ward_core::UnixMillis) -> bool {
        match (state, event) {
            (
                PhoneBindingState::EnterPhoneNumber { .. },
                PhoneBindingEvent::EnterPhoneNumber { .. },
            ) => true,
            (
                PhoneBindingState::EnterOtp { .. },
                PhoneBindingEvent::EnterOtp { .. }
                | PhoneBindingEvent::ResendOtp
                | PhoneBindingEvent::Back,
            ) => true,
            (PhoneBindingState::Block { window, .. }, PhoneBindingEvent::Retry) => {
                window.expired(now)
            }
            _ => false,
        }
    }

    proptest! {
        // Every (state, event) pair outside the defined table refuses with
        // the protocol error; every defined pair succeeds against default
        // provider behavior.
        #[test]
        fn undefined_pairs_always_raise_invalid_event(
            state in arb_state(),
            event in arb_event(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let flow = PhoneBindingFlow::default();
            let clock = Arc::new(ManualClock::new());
            let fx = effects(Arc::new(MockPhoneGateway::new()), Arc::clone(&clock));
            let now = clock.reading();
            let expect_legal = legal(&state, &event, now);
            let outcome = rt.block_on(flow.transition(&state, event, &fx));
            if expect_legal {
                prop_assert!(outcome.is_ok());
            } else {
                prop_assert!(
                    matches!(outcome, Err(FlowError::InvalidEvent { .. })),
                    "expected InvalidEvent error"
                );
            }
        }
    }
}
