//! Phone-verification restoration leaf flow.
//!
//! Retrieves the custom share held by the phone backend and combines it with
//! whatever other material is at hand: a still-valid social credential, a
//! device share, or — when neither exists — a social step the caller is sent
//! off to complete. Its gateway code table is wider than the create-wallet
//! one: wrong-number, unreachable-phone, no-match, and server-internal codes
//! are all absorbed into states the UI can act on.

use crate::policy::{BlockReason, BlockWindow, PolicyConfig, ResendCounter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::codes;
use ward_core::effects::{
    ConfirmOtpPayload, KeyServiceEffects, PhoneGatewayEffects, PhysicalTimeEffects,
    RegisterPhonePayload, SocialAuthEffects,
};
use ward_core::{
    CustomShare, DeviceShare, OtpChannel, PhoneNumber, RequestSigner, RestoredWallet,
    SocialCredential, UnixMillis,
};
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the phone restoration flow needs.
///
/// `signer` is an ephemeral identity: no account key exists until
/// reconstruction succeeds.
#[derive(Clone)]
pub struct RestoreCustomEffects {
    /// Phone-verification gateway client.
    pub gateway: Arc<dyn PhoneGatewayEffects>,
    /// Distributed-key service client.
    pub keys: Arc<dyn KeyServiceEffects>,
    /// Social identity provider client, for credential expiry checks.
    pub auth: Arc<dyn SocialAuthEffects>,
    /// Wall clock for counters and lockouts.
    pub clock: Arc<dyn PhysicalTimeEffects>,
    /// Ephemeral identity signing every gateway request.
    pub signer: RequestSigner,
}

/// Key material carried into the phone path from earlier steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RestoreCustomContext {
    /// Locally held device share, when one exists.
    pub device_share: Option<DeviceShare>,
    /// Social credential from an earlier sign-in, when one exists.
    pub social: Option<SocialCredential>,
}

/// Phone restoration states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum RestoreCustomState {
    /// Waiting for a phone number.
    EnterPhone {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// Number preserved from an earlier visit, if any.
        phone: Option<PhoneNumber>,
    },
    /// OTP dispatched; waiting for the code.
    EnterOtp {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// Number the OTP went to.
        phone: PhoneNumber,
        /// Channel it was dispatched on.
        channel: OtpChannel,
        /// Resend cadence within this sojourn.
        counter: ResendCounter,
    },
    /// No channel could reach the number and no fallback exists.
    OtpNotDelivered {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// The unreachable number.
        phone: PhoneNumber,
    },
    /// No channel could reach the number, but a device share exists, so a
    /// social sign-in can replace phone verification.
    OtpNotDeliveredTrySocial {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// The unreachable number.
        phone: PhoneNumber,
        /// Device share backing the social fallback.
        device_share: DeviceShare,
    },
    /// OTP confirmed, but nothing reconstructable matched.
    NoMatch {
        /// Carried key material.
        ctx: RestoreCustomContext,
    },
    /// The number belongs to a different wallet; propose another number.
    TryAnother {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// The rejected number.
        phone: PhoneNumber,
    },
    /// Phase locked out.
    Block {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// The lockout.
        window: BlockWindow,
        /// Number to prefill on re-entry.
        phone: PhoneNumber,
    },
    /// The gateway failed on its side; the attempt cannot proceed.
    Broken {
        /// Carried key material.
        ctx: RestoreCustomContext,
        /// The gateway code that broke the attempt.
        code: i64,
    },
    /// Terminal.
    Finish(RestoreCustomFinish),
}

/// Phone restoration outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum RestoreCustomFinish {
    /// The wallet was reconstructed.
    Restored {
        /// The reconstructed account.
        wallet: RestoredWallet,
    },
    /// Phone verification is unreachable; continue over the social path
    /// with the device share.
    RequireSocialDevice {
        /// Device share backing the social path.
        device_share: DeviceShare,
    },
    /// The custom share is retrieved but needs a social step to pair with.
    RequireSocialCustom {
        /// The retrieved custom share.
        custom_share: CustomShare,
        /// The expired credential that forced the extra step, when that is
        /// why the step is needed.
        expired_credential: Option<SocialCredential>,
    },
    /// The user abandoned back to the restoration menu.
    Start,
}

/// Phone restoration events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum RestoreCustomEvent {
    /// Dispatch an OTP to the given number.
    EnterPhoneNumber {
        /// Number to verify.
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
    /// Return to number entry.
    Back,
    /// Re-enter the phase after a lockout has passed.
    Retry,
    /// Abandon back to the restoration menu.
    Start,
    /// Take the social fallback offered for an unreachable number.
    RequireSocial,
}

impl FlowState for RestoreCustomState {
    fn name(&self) -> &'static str {
        match self {
            RestoreCustomState::EnterPhone { .. } => "enterPhone",
            RestoreCustomState::EnterOtp { .. } => "enterOtp",
            RestoreCustomState::OtpNotDelivered { .. } => "otpNotDelivered",
            RestoreCustomState::OtpNotDeliveredTrySocial { .. } => "otpNotDeliveredTrySocial",
            RestoreCustomState::NoMatch { .. } => "noMatch",
            RestoreCustomState::TryAnother { .. } => "tryAnother",
            RestoreCustomState::Block { .. } => "block",
            RestoreCustomState::Broken { .. } => "broken",
            RestoreCustomState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            RestoreCustomState::EnterPhone { .. } => 0,
            RestoreCustomState::EnterOtp { .. } => 1,
            RestoreCustomState::OtpNotDelivered { .. } => 2,
            RestoreCustomState::OtpNotDeliveredTrySocial { .. } => 3,
            RestoreCustomState::NoMatch { .. } => 4,
            RestoreCustomState::TryAnother { .. } => 5,
            RestoreCustomState::Block { .. } => 6,
            RestoreCustomState::Broken { .. } => 7,
            RestoreCustomState::Finish(_) => 8,
        }
    }

    fn continuable(&self) -> bool {
        // A dispatched OTP does not survive a restart.
        !matches!(self, RestoreCustomState::EnterOtp { .. })
    }

    fn is_terminal(&self) -> bool {
        matches!(self, RestoreCustomState::Finish(_))
    }
}

impl FlowEvent for RestoreCustomEvent {
    fn name(&self) -> &'static str {
        match self {
            RestoreCustomEvent::EnterPhoneNumber { .. } => "enterPhoneNumber",
            RestoreCustomEvent::EnterOtp { .. } => "enterOtp",
            RestoreCustomEvent::ResendOtp => "resendOtp",
            RestoreCustomEvent::Back => "back",
            RestoreCustomEvent::Retry => "retry",
            RestoreCustomEvent::Start => "start",
            RestoreCustomEvent::RequireSocial => "requireSocial",
        }
    }
}

/// The phone restoration leaf flow.
#[derive(Debug, Clone, Default)]
pub struct RestoreCustomFlow {
    policy: PolicyConfig,
}

impl RestoreCustomFlow {
    /// Flow with the given backoff/lockout policy.
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Entry state with the given carried key material.
    pub fn initial_state(&self, ctx: RestoreCustomContext) -> RestoreCustomState {
        RestoreCustomState::EnterPhone { ctx, phone: None }
    }

    fn block(
        &self,
        ctx: RestoreCustomContext,
        now: UnixMillis,
        reason: BlockReason,
        phone: PhoneNumber,
    ) -> RestoreCustomState {
        let window = BlockWindow::starting(now, reason, &self.policy);
        tracing::warn!(reason = reason.as_str(), until = %window.until, "phone restoration blocked");
        RestoreCustomState::Block { ctx, window, phone }
    }

    /// Dispatch an OTP, absorbing every code in this flow's table.
    async fn dispatch(
        &self,
        ctx: &RestoreCustomContext,
        phone: PhoneNumber,
        channel: OtpChannel,
        reason: BlockReason,
        counter: Option<&ResendCounter>,
        effects: &RestoreCustomEffects,
    ) -> FlowResult<RestoreCustomState> {
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
                Ok(RestoreCustomState::EnterOtp {
                    ctx: ctx.clone(),
                    phone,
                    channel,
                    counter,
                })
            }
            Err(error) if error.code == codes::gateway::RATE_LIMITED => {
                Ok(self.block(ctx.clone(), now, reason, phone))
            }
            Err(error) if error.code == codes::gateway::UNDELIVERABLE => {
                Ok(match &ctx.device_share {
                    Some(device_share) => RestoreCustomState::OtpNotDeliveredTrySocial {
                        ctx: ctx.clone(),
                        phone,
                        device_share: device_share.clone(),
                    },
                    None => RestoreCustomState::OtpNotDelivered {
                        ctx: ctx.clone(),
                        phone,
                    },
                })
            }
            Err(error) if error.code == codes::gateway::NUMBER_IN_USE => {
                Ok(RestoreCustomState::TryAnother {
                    ctx: ctx.clone(),
                    phone,
                })
            }
            Err(error) if error.code == codes::gateway::INTERNAL => Ok(RestoreCustomState::Broken {
                ctx: ctx.clone(),
                code: error.code,
            }),
            Err(error) => Err(error.into()),
        }
    }

    /// Pair the retrieved custom share with the best second factor at hand.
    async fn reconstruct(
        &self,
        ctx: &RestoreCustomContext,
        custom_share: CustomShare,
        effects: &RestoreCustomEffects,
    ) -> FlowResult<RestoreCustomState> {
        if let Some(credential) = &ctx.social {
            if !effects.auth.is_expired(&credential.token).await? {
                return match effects
                    .keys
                    .sign_in_with_custom_share(&credential.token, &custom_share)
                    .await
                {
                    Ok(wallet) => Ok(RestoreCustomState::Finish(RestoreCustomFinish::Restored {
                        wallet,
                    })),
                    Err(error) if codes::key_service::is_not_found(error.code) => {
                        Ok(RestoreCustomState::NoMatch { ctx: ctx.clone() })
                    }
                    Err(error) => Err(error.into()),
                };
            }
            // Expired credential: a fresh social sign-in is needed; the
            // try-again branch keeps the device-share fallback available.
            return Ok(RestoreCustomState::Finish(
                RestoreCustomFinish::RequireSocialCustom {
                    custom_share,
                    expired_credential: Some(credential.clone()),
                },
            ));
        }
        if let Some(device_share) = &ctx.device_share {
            return match effects
                .keys
                .sign_in_with_shares(device_share, &custom_share)
                .await
            {
                Ok(wallet) => Ok(RestoreCustomState::Finish(RestoreCustomFinish::Restored {
                    wallet,
                })),
                Err(error) if codes::key_service::is_not_found(error.code) => {
                    Ok(RestoreCustomState::NoMatch { ctx: ctx.clone() })
                }
                Err(error) => Err(error.into()),
            };
        }
        Ok(RestoreCustomState::Finish(
            RestoreCustomFinish::RequireSocialCustom {
                custom_share,
                expired_credential: None,
            },
        ))
    }
}

#[async_trait]
impl Flow for RestoreCustomFlow {
    type State = RestoreCustomState;
    type Event = RestoreCustomEvent;
    type Effects = RestoreCustomEffects;
    type Finish = RestoreCustomFinish;

    async fn transition(
        &self,
        state: &RestoreCustomState,
        event: RestoreCustomEvent,
        effects: &RestoreCustomEffects,
    ) -> FlowResult<RestoreCustomState> {
        match (state, &event) {
            (
                RestoreCustomState::EnterPhone { ctx, .. }
                | RestoreCustomState::TryAnother { ctx, .. },
                RestoreCustomEvent::EnterPhoneNumber { phone, channel },
            ) => {
                self.dispatch(
                    ctx,
                    phone.clone(),
                    *channel,
                    BlockReason::BlockEnterPhoneNumber,
                    None,
                    effects,
                )
                .await
            }
            (
                RestoreCustomState::EnterOtp { ctx, phone, .. },
                RestoreCustomEvent::EnterOtp { code },
            ) => {
                let now = effects.clock.now().await?;
                let request = effects.signer.sign(ConfirmOtpPayload {
                    phone_number: phone.clone(),
                    otp_code: code.clone(),
                    eth_address: effects.signer.eth_address().clone(),
                })?;
                match effects.gateway.confirm(&request).await {
                    Ok(confirmed) => {
                        self.reconstruct(ctx, confirmed.custom_share, effects).await
                    }
                    Err(error) if error.code == codes::gateway::RATE_LIMITED => {
                        Ok(self.block(ctx.clone(), now, BlockReason::BlockEnterOtp, phone.clone()))
                    }
                    Err(error) if error.code == codes::gateway::NO_MATCH => {
                        Ok(RestoreCustomState::NoMatch { ctx: ctx.clone() })
                    }
                    Err(error) if error.code == codes::gateway::INTERNAL => {
                        Ok(RestoreCustomState::Broken {
                            ctx: ctx.clone(),
                            code: error.code,
                        })
                    }
                    Err(error) => Err(error.into()),
                }
            }
            (
                RestoreCustomState::EnterOtp {
                    ctx,
                    phone,
                    channel,
                    counter,
                },
                RestoreCustomEvent::ResendOtp,
            ) => {
                if counter.next_resend_blocks(&self.policy) {
                    // The cap fires before the gateway is consulted.
                    let now = effects.clock.now().await?;
                    return Ok(self.block(
                        ctx.clone(),
                        now,
                        BlockReason::BlockEnterOtp,
                        phone.clone(),
                    ));
                }
                self.dispatch(
                    ctx,
                    phone.clone(),
                    *channel,
                    BlockReason::BlockEnterOtp,
                    Some(counter),
                    effects,
                )
                .await
            }
            (
                RestoreCustomState::EnterOtp { ctx, phone, .. }
                | RestoreCustomState::OtpNotDelivered { ctx, phone }
                | RestoreCustomState::OtpNotDeliveredTrySocial { ctx, phone, .. },
                RestoreCustomEvent::Back,
            ) => Ok(RestoreCustomState::EnterPhone {
                ctx: ctx.clone(),
                phone: Some(phone.clone()),
            }),
            (RestoreCustomState::NoMatch { ctx }, RestoreCustomEvent::Back) => {
                Ok(RestoreCustomState::EnterPhone {
                    ctx: ctx.clone(),
                    phone: None,
                })
            }
            (
                RestoreCustomState::OtpNotDeliveredTrySocial { device_share, .. },
                RestoreCustomEvent::RequireSocial,
            ) => Ok(RestoreCustomState::Finish(
                RestoreCustomFinish::RequireSocialDevice {
                    device_share: device_share.clone(),
                },
            )),
            (RestoreCustomState::Block { ctx, window, phone }, RestoreCustomEvent::Retry) => {
                let now = effects.clock.now().await?;
                if !window.expired(now) {
                    return Err(FlowError::invalid_event(state, &event));
                }
                Ok(RestoreCustomState::EnterPhone {
                    ctx: ctx.clone(),
                    phone: Some(phone.clone()),
                })
            }
            (
                RestoreCustomState::OtpNotDelivered { .. }
                | RestoreCustomState::OtpNotDeliveredTrySocial { .. }
                | RestoreCustomState::NoMatch { .. }
                | RestoreCustomState::TryAnother { .. }
                | RestoreCustomState::Broken { .. },
                RestoreCustomEvent::Start,
            ) => Ok(RestoreCustomState::Finish(RestoreCustomFinish::Start)),
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: RestoreCustomState) -> Result<RestoreCustomFinish, RestoreCustomState> {
        match state {
            RestoreCustomState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}
