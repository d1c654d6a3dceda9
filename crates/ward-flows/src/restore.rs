//! Restore-wallet composite orchestrator.
//!
//! From the entry menu a run takes one of four paths — keychain picker,
//! direct seed entry, social reconstruction, or phone verification — and
//! every successful path converges on the restored-data checkpoint, then
//! security setup. The social and phone leaves can also hand off to each
//! other: phone verification falls back to social when the number is
//! unreachable or the custom share needs a social pairing, and social
//! reconstruction reroutes into the phone path when the device share matches
//! nothing.

use crate::policy::PolicyConfig;
use crate::restore_custom::{
    RestoreCustomContext, RestoreCustomEffects, RestoreCustomEvent, RestoreCustomFinish,
    RestoreCustomFlow, RestoreCustomState,
};
use crate::restore_local::{
    RestoreLocalEffects, RestoreLocalEvent, RestoreLocalFinish, RestoreLocalFlow,
    RestoreLocalState,
};
use crate::restore_social::{
    RestoreSocialEffects, RestoreSocialEvent, RestoreSocialFinish, RestoreSocialFlow,
    RestoreSocialOption, RestoreSocialState,
};
use crate::security_setup::{
    SecuritySetupEffects, SecuritySetupEvent, SecuritySetupFinish, SecuritySetupFlow,
    SecuritySetupState,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::effects::{
    BiometricEffects, KeyServiceEffects, LocalAccountsEffects, PhoneGatewayEffects,
    PhysicalTimeEffects, SocialAuthEffects, WalletDerivationEffects,
};
use ward_core::{DeviceShare, Pincode, RecoveryPhrase, RequestSigner, RestoredWallet};
use ward_engine::{step_sub_flow, Flow, FlowError, FlowEvent, FlowResult, FlowState, SubStep};

/// Full provider bundle for wallet restoration.
///
/// `signer` is an ephemeral identity for gateway requests; the account key
/// does not exist until reconstruction succeeds.
#[derive(Clone)]
pub struct RestoreWalletEffects {
    /// Social identity provider client.
    pub auth: Arc<dyn SocialAuthEffects>,
    /// Distributed-key service client.
    pub keys: Arc<dyn KeyServiceEffects>,
    /// Phone-verification gateway client.
    pub gateway: Arc<dyn PhoneGatewayEffects>,
    /// Platform biometric probe.
    pub biometric: Arc<dyn BiometricEffects>,
    /// Wall clock.
    pub clock: Arc<dyn PhysicalTimeEffects>,
    /// Local credential store.
    pub accounts: Arc<dyn LocalAccountsEffects>,
    /// Local account derivation.
    pub derivation: Arc<dyn WalletDerivationEffects>,
    /// Ephemeral identity signing gateway requests.
    pub signer: RequestSigner,
}

impl RestoreWalletEffects {
    fn social(&self) -> RestoreSocialEffects {
        RestoreSocialEffects {
            auth: Arc::clone(&self.auth),
            keys: Arc::clone(&self.keys),
        }
    }

    fn custom(&self) -> RestoreCustomEffects {
        RestoreCustomEffects {
            gateway: Arc::clone(&self.gateway),
            keys: Arc::clone(&self.keys),
            auth: Arc::clone(&self.auth),
            clock: Arc::clone(&self.clock),
            signer: self.signer.clone(),
        }
    }

    fn local(&self) -> RestoreLocalEffects {
        RestoreLocalEffects {
            accounts: Arc::clone(&self.accounts),
            derivation: Arc::clone(&self.derivation),
        }
    }

    fn security(&self) -> SecuritySetupEffects {
        SecuritySetupEffects {
            biometric: Arc::clone(&self.biometric),
        }
    }
}

/// Restore-wallet states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum RestoreWalletState {
    /// Entry menu.
    Restore {
        /// Device share found on this device, if any.
        device_share: Option<DeviceShare>,
    },
    /// Keychain picker path.
    SignInKeychain {
        /// Device share carried for a later return to the menu.
        device_share: Option<DeviceShare>,
        /// Embedded leaf state.
        inner: RestoreLocalState,
    },
    /// Direct seed entry path.
    SignInSeed {
        /// Device share carried for a later return to the menu.
        device_share: Option<DeviceShare>,
    },
    /// Social reconstruction path.
    RestoreSocial {
        /// Device share carried for a later return to the menu.
        device_share: Option<DeviceShare>,
        /// Embedded leaf state.
        inner: RestoreSocialState,
    },
    /// Phone verification path.
    RestoreCustom {
        /// Device share carried for a later return to the menu.
        device_share: Option<DeviceShare>,
        /// Embedded leaf state.
        inner: RestoreCustomState,
    },
    /// A path succeeded; the account is reconstructed.
    RestoredData {
        /// The reconstructed account.
        wallet: RestoredWallet,
    },
    /// Security-setup phase.
    SecuritySetup {
        /// The reconstructed account.
        wallet: RestoredWallet,
        /// Embedded leaf state.
        inner: SecuritySetupState,
    },
    /// Terminal.
    Finish(RestoreWalletResult),
}

/// Restore-wallet outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum RestoreWalletResult {
    /// Restoration completed.
    Restored {
        /// The reconstructed account.
        wallet: RestoredWallet,
        /// Pincode chosen during security setup.
        pincode: Pincode,
        /// Whether the user enabled biometric unlock.
        biometric_enabled: bool,
    },
}

/// Restore-wallet events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum RestoreWalletEvent {
    /// From the menu: enter the social path (requires a device share).
    RequireSocial,
    /// From the menu: enter the phone-verification path.
    RequireCustom,
    /// From the menu: enter the keychain picker.
    SignInKeychain,
    /// From the menu: enter direct seed entry.
    SignInSeed,
    /// Derive the account from an entered phrase.
    EnterSeed {
        /// The entered recovery phrase.
        phrase: RecoveryPhrase,
        /// Derivation path to use.
        derivation_path: String,
    },
    /// Return to the menu.
    Back,
    /// Proceed from the restored-data checkpoint into security setup.
    Continue,
    /// Event for the social path.
    RestoreSocial(RestoreSocialEvent),
    /// Event for the phone path.
    RestoreCustom(RestoreCustomEvent),
    /// Event for the keychain picker.
    Keychain(RestoreLocalEvent),
    /// Event for the security-setup phase.
    SecuritySetup(SecuritySetupEvent),
}

impl FlowState for RestoreWalletState {
    fn name(&self) -> &'static str {
        match self {
            RestoreWalletState::Restore { .. } => "restore",
            RestoreWalletState::SignInKeychain { .. } => "signInKeychain",
            RestoreWalletState::SignInSeed { .. } => "signInSeed",
            RestoreWalletState::RestoreSocial { .. } => "restoreSocial",
            RestoreWalletState::RestoreCustom { .. } => "restoreCustom",
            RestoreWalletState::RestoredData { .. } => "restoredData",
            RestoreWalletState::SecuritySetup { .. } => "securitySetup",
            RestoreWalletState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            RestoreWalletState::Restore { .. } => 100,
            RestoreWalletState::SignInKeychain { inner, .. } => 200 + inner.step(),
            RestoreWalletState::SignInSeed { .. } => 300,
            RestoreWalletState::RestoreSocial { inner, .. } => 400 + inner.step(),
            RestoreWalletState::RestoreCustom { inner, .. } => 500 + inner.step(),
            RestoreWalletState::RestoredData { .. } => 600,
            RestoreWalletState::SecuritySetup { inner, .. } => 700 + inner.step(),
            RestoreWalletState::Finish(_) => 800,
        }
    }

    fn continuable(&self) -> bool {
        match self {
            RestoreWalletState::SignInKeychain { inner, .. } => inner.continuable(),
            RestoreWalletState::RestoreSocial { inner, .. } => inner.continuable(),
            RestoreWalletState::RestoreCustom { inner, .. } => inner.continuable(),
            RestoreWalletState::SecuritySetup { inner, .. } => inner.continuable(),
            _ => true,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, RestoreWalletState::Finish(_))
    }
}

impl FlowEvent for RestoreWalletEvent {
    fn name(&self) -> &'static str {
        match self {
            RestoreWalletEvent::RequireSocial => "requireSocial",
            RestoreWalletEvent::RequireCustom => "requireCustom",
            RestoreWalletEvent::SignInKeychain => "signInKeychain",
            RestoreWalletEvent::SignInSeed => "signInSeed",
            RestoreWalletEvent::EnterSeed { .. } => "enterSeed",
            RestoreWalletEvent::Back => "back",
            RestoreWalletEvent::Continue => "continue",
            RestoreWalletEvent::RestoreSocial(event) => event.name(),
            RestoreWalletEvent::RestoreCustom(event) => event.name(),
            RestoreWalletEvent::Keychain(event) => event.name(),
            RestoreWalletEvent::SecuritySetup(event) => event.name(),
        }
    }
}

/// The restore-wallet composite flow.
#[derive(Debug, Clone, Default)]
pub struct RestoreWalletFlow {
    social: RestoreSocialFlow,
    custom: RestoreCustomFlow,
    local: RestoreLocalFlow,
    security: SecuritySetupFlow,
}

impl RestoreWalletFlow {
    /// Flow with the given backoff/lockout policy.
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            social: RestoreSocialFlow,
            custom: RestoreCustomFlow::new(policy),
            local: RestoreLocalFlow,
            security: SecuritySetupFlow,
        }
    }

    /// Entry state: the menu, seeded with whatever device share the caller
    /// found locally.
    pub fn initial_state(&self, device_share: Option<DeviceShare>) -> RestoreWalletState {
        RestoreWalletState::Restore { device_share }
    }
}

#[async_trait]
impl Flow for RestoreWalletFlow {
    type State = RestoreWalletState;
    type Event = RestoreWalletEvent;
    type Effects = RestoreWalletEffects;
    type Finish = RestoreWalletResult;

    async fn transition(
        &self,
        state: &RestoreWalletState,
        event: RestoreWalletEvent,
        effects: &RestoreWalletEffects,
    ) -> FlowResult<RestoreWalletState> {
        match (state, event) {
            // ---- entry menu -------------------------------------------------
            (RestoreWalletState::Restore { device_share }, RestoreWalletEvent::RequireSocial) => {
                // The social path needs a device share as the second factor.
                let Some(share) = device_share else {
                    return Err(FlowError::InvalidEvent {
                        state: state.name(),
                        event: "requireSocial",
                    });
                };
                Ok(RestoreWalletState::RestoreSocial {
                    device_share: device_share.clone(),
                    inner: self.social.initial_state(RestoreSocialOption::Device {
                        device_share: share.clone(),
                    }),
                })
            }
            (RestoreWalletState::Restore { device_share }, RestoreWalletEvent::RequireCustom) => {
                Ok(RestoreWalletState::RestoreCustom {
                    device_share: device_share.clone(),
                    inner: self.custom.initial_state(RestoreCustomContext {
                        device_share: device_share.clone(),
                        social: None,
                    }),
                })
            }
            (RestoreWalletState::Restore { device_share }, RestoreWalletEvent::SignInKeychain) => {
                Ok(RestoreWalletState::SignInKeychain {
                    device_share: device_share.clone(),
                    inner: self.local.initial_state(&effects.local()).await?,
                })
            }
            (RestoreWalletState::Restore { device_share }, RestoreWalletEvent::SignInSeed) => {
                Ok(RestoreWalletState::SignInSeed {
                    device_share: device_share.clone(),
                })
            }

            // ---- direct seed entry ------------------------------------------
            (
                RestoreWalletState::SignInSeed { .. },
                RestoreWalletEvent::EnterSeed {
                    phrase,
                    derivation_path,
                },
            ) => {
                let wallet = effects.derivation.derive(&phrase, &derivation_path).await?;
                Ok(RestoreWalletState::RestoredData { wallet })
            }
            (RestoreWalletState::SignInSeed { device_share }, RestoreWalletEvent::Back) => {
                Ok(RestoreWalletState::Restore {
                    device_share: device_share.clone(),
                })
            }

            // ---- keychain picker --------------------------------------------
            (
                RestoreWalletState::SignInKeychain {
                    device_share,
                    inner,
                },
                RestoreWalletEvent::Keychain(event),
            ) => match step_sub_flow(&self.local, inner, event, &effects.local()).await? {
                SubStep::Continue(inner) => Ok(RestoreWalletState::SignInKeychain {
                    device_share: device_share.clone(),
                    inner,
                }),
                SubStep::Finished(RestoreLocalFinish::Restored { wallet }) => {
                    Ok(RestoreWalletState::RestoredData { wallet })
                }
                SubStep::Finished(RestoreLocalFinish::Start) => Ok(RestoreWalletState::Restore {
                    device_share: device_share.clone(),
                }),
            },

            // ---- social path ------------------------------------------------
            (
                RestoreWalletState::RestoreSocial {
                    device_share,
                    inner,
                },
                RestoreWalletEvent::RestoreSocial(event),
            ) => match step_sub_flow(&self.social, inner, event, &effects.social()).await? {
                SubStep::Continue(inner) => Ok(RestoreWalletState::RestoreSocial {
                    device_share: device_share.clone(),
                    inner,
                }),
                SubStep::Finished(RestoreSocialFinish::Restored { wallet }) => {
                    Ok(RestoreWalletState::RestoredData { wallet })
                }
                SubStep::Finished(RestoreSocialFinish::Start) => Ok(RestoreWalletState::Restore {
                    device_share: device_share.clone(),
                }),
                SubStep::Finished(RestoreSocialFinish::RequireCustom {
                    device_share: carried,
                    credential,
                }) => Ok(RestoreWalletState::RestoreCustom {
                    device_share: device_share.clone(),
                    inner: self.custom.initial_state(RestoreCustomContext {
                        device_share: carried,
                        social: credential,
                    }),
                }),
            },

            // ---- phone path -------------------------------------------------
            (
                RestoreWalletState::RestoreCustom {
                    device_share,
                    inner,
                },
                RestoreWalletEvent::RestoreCustom(event),
            ) => match step_sub_flow(&self.custom, inner, event, &effects.custom()).await? {
                SubStep::Continue(inner) => Ok(RestoreWalletState::RestoreCustom {
                    device_share: device_share.clone(),
                    inner,
                }),
                SubStep::Finished(RestoreCustomFinish::Restored { wallet }) => {
                    Ok(RestoreWalletState::RestoredData { wallet })
                }
                SubStep::Finished(RestoreCustomFinish::Start) => Ok(RestoreWalletState::Restore {
                    device_share: device_share.clone(),
                }),
                SubStep::Finished(RestoreCustomFinish::RequireSocialDevice {
                    device_share: share,
                }) => Ok(RestoreWalletState::RestoreSocial {
                    device_share: device_share.clone(),
                    inner: self.social.initial_state(RestoreSocialOption::Device {
                        device_share: share,
                    }),
                }),
                SubStep::Finished(RestoreCustomFinish::RequireSocialCustom {
                    custom_share,
                    expired_credential,
                }) => {
                    let inner = match expired_credential {
                        // The carried credential expired mid-path: re-enter
                        // social sign-in through the expired branch, which
                        // keeps the device-share fallback available.
                        Some(_) => RestoreSocialState::ExpiredSocialTryAgain {
                            custom_share,
                            device_share: device_share.clone(),
                        },
                        None => self.social.initial_state(RestoreSocialOption::Custom {
                            custom_share,
                        }),
                    };
                    Ok(RestoreWalletState::RestoreSocial {
                        device_share: device_share.clone(),
                        inner,
                    })
                }
            },

            // ---- convergence ------------------------------------------------
            (RestoreWalletState::RestoredData { wallet }, RestoreWalletEvent::Continue) => {
                Ok(RestoreWalletState::SecuritySetup {
                    wallet: wallet.clone(),
                    inner: self.security.initial_state(&effects.security()).await?,
                })
            }
            (
                RestoreWalletState::SecuritySetup { wallet, inner },
                RestoreWalletEvent::SecuritySetup(event),
            ) => match step_sub_flow(&self.security, inner, event, &effects.security()).await? {
                SubStep::Continue(inner) => Ok(RestoreWalletState::SecuritySetup {
                    wallet: wallet.clone(),
                    inner,
                }),
                SubStep::Finished(SecuritySetupFinish::Success {
                    pincode,
                    biometric_enabled,
                }) => Ok(RestoreWalletState::Finish(RestoreWalletResult::Restored {
                    wallet: wallet.clone(),
                    pincode,
                    biometric_enabled,
                })),
            },

            // Fail fast: the event is tagged for a phase that is not live.
            (state, event) => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: RestoreWalletState) -> Result<RestoreWalletResult, RestoreWalletState> {
        match state {
            RestoreWalletState::Finish(result) => Ok(result),
            other => Err(other),
        }
    }
}
