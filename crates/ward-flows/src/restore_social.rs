//! Social restoration leaf flow.
//!
//! Reconstructs a wallet from a social-derived share plus a second share.
//! The entry option decides which second share is in play: the device share
//! (menu entry) or a custom share obtained earlier through phone
//! verification. Key-service not-found codes (1009, 1019) are absorbed into
//! `NotFound…` states the caller can leave by retrying another provider,
//! abandoning, or rerouting into the phone path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::codes;
use ward_core::effects::{KeyServiceEffects, SocialAuthEffects};
use ward_core::{CustomShare, DeviceShare, RestoredWallet, SocialCredential, SocialProvider};
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the social restoration flow needs.
#[derive(Clone)]
pub struct RestoreSocialEffects {
    /// Social identity provider client.
    pub auth: Arc<dyn SocialAuthEffects>,
    /// Distributed-key service client.
    pub keys: Arc<dyn KeyServiceEffects>,
}

/// Which second share social restoration combines with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "option")]
pub enum RestoreSocialOption {
    /// Combine with the locally held device share.
    Device {
        /// The device share.
        device_share: DeviceShare,
    },
    /// Combine with a custom share retrieved through phone verification.
    Custom {
        /// The retrieved custom share.
        custom_share: CustomShare,
    },
}

/// Social restoration states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum RestoreSocialState {
    /// Waiting for the user to pick a provider.
    SignIn {
        /// Which second share is in play.
        option: RestoreSocialOption,
    },
    /// Device-share reconstruction found no wallet for the credential.
    NotFoundDevice {
        /// The device share to retry with.
        device_share: DeviceShare,
        /// The credential that found nothing.
        credential: SocialCredential,
    },
    /// A fresh social sign-in is needed: the credential carried over from
    /// the phone path had expired.
    ExpiredSocialTryAgain {
        /// Custom share retrieved through phone verification.
        custom_share: CustomShare,
        /// Device share to fall back to, when one exists.
        device_share: Option<DeviceShare>,
    },
    /// Custom-share reconstruction found no wallet for the credential.
    NotFoundCustom {
        /// The custom share that matched nothing.
        custom_share: CustomShare,
        /// Email of the credential that found nothing, when known.
        email: Option<String>,
    },
    /// Terminal.
    Finish(RestoreSocialFinish),
}

/// Social restoration outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum RestoreSocialFinish {
    /// The wallet was reconstructed.
    Restored {
        /// The reconstructed account.
        wallet: RestoredWallet,
    },
    /// The user abandoned back to the restoration menu.
    Start,
    /// Continue through the phone-verification path.
    RequireCustom {
        /// Device share to carry into the phone path, when one exists.
        device_share: Option<DeviceShare>,
        /// Credential to reuse if still valid, when one exists.
        credential: Option<SocialCredential>,
    },
}

/// Social restoration events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum RestoreSocialEvent {
    /// Authenticate with the given provider and attempt reconstruction.
    SignIn {
        /// Chosen provider.
        provider: SocialProvider,
    },
    /// Abandon back to the restoration menu.
    Start,
    /// Reroute into the phone-verification path.
    RequireCustom,
}

impl FlowState for RestoreSocialState {
    fn name(&self) -> &'static str {
        match self {
            RestoreSocialState::SignIn { .. } => "signIn",
            RestoreSocialState::NotFoundDevice { .. } => "notFoundDevice",
            RestoreSocialState::ExpiredSocialTryAgain { .. } => "expiredSocialTryAgain",
            RestoreSocialState::NotFoundCustom { .. } => "notFoundCustom",
            RestoreSocialState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            RestoreSocialState::SignIn { .. } => 0,
            RestoreSocialState::NotFoundDevice { .. } => 1,
            RestoreSocialState::ExpiredSocialTryAgain { .. } => 2,
            RestoreSocialState::NotFoundCustom { .. } => 3,
            RestoreSocialState::Finish(_) => 4,
        }
    }

    fn continuable(&self) -> bool {
        true
    }

    fn is_terminal(&self) -> bool {
        matches!(self, RestoreSocialState::Finish(_))
    }
}

impl FlowEvent for RestoreSocialEvent {
    fn name(&self) -> &'static str {
        match self {
            RestoreSocialEvent::SignIn { .. } => "signIn",
            RestoreSocialEvent::Start => "start",
            RestoreSocialEvent::RequireCustom => "requireCustom",
        }
    }
}

/// The social restoration leaf flow.
#[derive(Debug, Clone, Default)]
pub struct RestoreSocialFlow;

impl RestoreSocialFlow {
    /// Entry state for the given option.
    pub fn initial_state(&self, option: RestoreSocialOption) -> RestoreSocialState {
        RestoreSocialState::SignIn { option }
    }

    async fn sign_in_with_device(
        &self,
        provider: SocialProvider,
        device_share: &DeviceShare,
        effects: &RestoreSocialEffects,
    ) -> FlowResult<RestoreSocialState> {
        let credential = effects.auth.authenticate(provider).await?;
        match effects
            .keys
            .sign_in_with_device_share(&credential.token, device_share)
            .await
        {
            Ok(wallet) => Ok(RestoreSocialState::Finish(RestoreSocialFinish::Restored {
                wallet,
            })),
            Err(error) if codes::key_service::is_not_found(error.code) => {
                Ok(RestoreSocialState::NotFoundDevice {
                    device_share: device_share.clone(),
                    credential,
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn sign_in_with_custom(
        &self,
        provider: SocialProvider,
        custom_share: &CustomShare,
        fallback_device: Option<&DeviceShare>,
        effects: &RestoreSocialEffects,
    ) -> FlowResult<RestoreSocialState> {
        let credential = effects.auth.authenticate(provider).await?;
        match effects
            .keys
            .sign_in_with_custom_share(&credential.token, custom_share)
            .await
        {
            Ok(wallet) => {
                return Ok(RestoreSocialState::Finish(RestoreSocialFinish::Restored {
                    wallet,
                }))
            }
            Err(error) if codes::key_service::is_not_found(error.code) => {}
            Err(error) => return Err(error.into()),
        }
        // The custom pairing matched nothing; fall back to the device share
        // before giving up.
        if let Some(device_share) = fallback_device {
            match effects
                .keys
                .sign_in_with_device_share(&credential.token, device_share)
                .await
            {
                Ok(wallet) => {
                    return Ok(RestoreSocialState::Finish(RestoreSocialFinish::Restored {
                        wallet,
                    }))
                }
                Err(error) if codes::key_service::is_not_found(error.code) => {}
                Err(error) => return Err(error.into()),
            }
        }
        Ok(RestoreSocialState::NotFoundCustom {
            custom_share: custom_share.clone(),
            email: Some(credential.email),
        })
    }
}

#[async_trait]
impl Flow for RestoreSocialFlow {
    type State = RestoreSocialState;
    type Event = RestoreSocialEvent;
    type Effects = RestoreSocialEffects;
    type Finish = RestoreSocialFinish;

    async fn transition(
        &self,
        state: &RestoreSocialState,
        event: RestoreSocialEvent,
        effects: &RestoreSocialEffects,
    ) -> FlowResult<RestoreSocialState> {
        match (state, &event) {
            (
                RestoreSocialState::SignIn {
                    option: RestoreSocialOption::Device { device_share },
                },
                RestoreSocialEvent::SignIn { provider },
            ) => {
                self.sign_in_with_device(*provider, device_share, effects)
                    .await
            }
            (
                RestoreSocialState::SignIn {
                    option: RestoreSocialOption::Custom { custom_share },
                },
                RestoreSocialEvent::SignIn { provider },
            ) => {
                self.sign_in_with_custom(*provider, custom_share, None, effects)
                    .await
            }
            (
                RestoreSocialState::NotFoundDevice { device_share, .. },
                RestoreSocialEvent::SignIn { provider },
            ) => {
                self.sign_in_with_device(*provider, device_share, effects)
                    .await
            }
            (RestoreSocialState::NotFoundDevice { .. }, RestoreSocialEvent::Start) => {
                Ok(RestoreSocialState::Finish(RestoreSocialFinish::Start))
            }
            (
                RestoreSocialState::NotFoundDevice {
                    device_share,
                    credential,
                },
                RestoreSocialEvent::RequireCustom,
            ) => Ok(RestoreSocialState::Finish(
                RestoreSocialFinish::RequireCustom {
                    device_share: Some(device_share.clone()),
                    credential: Some(credential.clone()),
                },
            )),
            (
                RestoreSocialState::ExpiredSocialTryAgain {
                    custom_share,
                    device_share,
                },
                RestoreSocialEvent::SignIn { provider },
            ) => {
                self.sign_in_with_custom(*provider, custom_share, device_share.as_ref(), effects)
                    .await
            }
            (RestoreSocialState::ExpiredSocialTryAgain { .. }, RestoreSocialEvent::Start) => {
                Ok(RestoreSocialState::Finish(RestoreSocialFinish::Start))
            }
            (
                RestoreSocialState::NotFoundCustom { custom_share, .. },
                RestoreSocialEvent::SignIn { provider },
            ) => {
                self.sign_in_with_custom(*provider, custom_share, None, effects)
                    .await
            }
            (RestoreSocialState::NotFoundCustom { .. }, RestoreSocialEvent::Start) => {
                Ok(RestoreSocialState::Finish(RestoreSocialFinish::Start))
            }
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: RestoreSocialState) -> Result<RestoreSocialFinish, RestoreSocialState> {
        match state {
            RestoreSocialState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}
