//! Create-wallet composite orchestrator.
//!
//! Social sign-in, phone binding, then security setup — each phase an
//! embedded leaf flow. The composite forwards phase-tagged events to the
//! active leaf, re-wraps non-terminal results, and interprets finishes:
//! signup artifacts seed the binding phase, the bound phone hands over to
//! security setup, and the confirmed pincode completes the wallet.

use crate::phone_binding::{
    PhoneBindingEffects, PhoneBindingEvent, PhoneBindingFlow, PhoneBindingState,
};
use crate::policy::PolicyConfig;
use crate::security_setup::{
    SecuritySetupEffects, SecuritySetupEvent, SecuritySetupFinish, SecuritySetupFlow,
    SecuritySetupState,
};
use crate::social_sign_in::{
    SocialSignInEffects, SocialSignInEvent, SocialSignInFinish, SocialSignInFlow,
    SocialSignInState,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::effects::{
    BiometricEffects, KeyServiceEffects, PhoneGatewayEffects, PhysicalTimeEffects,
    SocialAuthEffects,
};
use ward_core::{
    OnboardingWallet, PhoneNumber, RequestSigner, SignupArtifacts, SocialProvider,
};
use ward_engine::{step_sub_flow, Flow, FlowError, FlowEvent, FlowResult, FlowState, SubStep};

/// Full provider bundle for wallet creation. Leaf flows receive slices of
/// it, built per delegation.
#[derive(Clone)]
pub struct CreateWalletEffects {
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
}

impl CreateWalletEffects {
    fn social(&self) -> SocialSignInEffects {
        SocialSignInEffects {
            auth: Arc::clone(&self.auth),
            keys: Arc::clone(&self.keys),
        }
    }

    fn binding(&self, artifacts: &SignupArtifacts) -> PhoneBindingEffects {
        PhoneBindingEffects {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
            signer: RequestSigner::new(
                artifacts.private_key.clone(),
                artifacts.eth_address.clone(),
            ),
        }
    }

    fn security(&self) -> SecuritySetupEffects {
        SecuritySetupEffects {
            biometric: Arc::clone(&self.biometric),
        }
    }
}

/// Create-wallet states; each phase embeds its leaf's state plus the
/// context the leaf does not itself carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum CreateWalletState {
    /// Social sign-in phase.
    SocialSignIn {
        /// Embedded leaf state.
        inner: SocialSignInState,
    },
    /// Phone-binding phase.
    BindingPhoneNumber {
        /// Email from the social phase.
        email: String,
        /// Key material from signup.
        artifacts: SignupArtifacts,
        /// Embedded leaf state.
        inner: PhoneBindingState,
    },
    /// Security-setup phase.
    SecuritySetup {
        /// Email from the social phase.
        email: String,
        /// Key material from signup.
        artifacts: SignupArtifacts,
        /// Phone bound in the previous phase.
        phone: PhoneNumber,
        /// Embedded leaf state.
        inner: SecuritySetupState,
    },
    /// Terminal.
    Finish(CreateWalletResult),
}

/// Create-wallet outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum CreateWalletResult {
    /// Onboarding completed.
    NewWallet {
        /// The finished wallet.
        wallet: OnboardingWallet,
    },
    /// The user abandoned onboarding.
    BreakProcess,
    /// The chosen social account already backs a wallet; continue in the
    /// restoration funnel.
    SwitchToRestoreFlow {
        /// Provider of the already-used account.
        provider: SocialProvider,
        /// Email of the already-used account.
        email: String,
    },
}

/// Create-wallet events, tagged by phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum CreateWalletEvent {
    /// Event for the social sign-in phase.
    SocialSignIn(SocialSignInEvent),
    /// Event for the phone-binding phase.
    BindingPhoneNumber(PhoneBindingEvent),
    /// Event for the security-setup phase.
    SecuritySetup(SecuritySetupEvent),
}

impl FlowState for CreateWalletState {
    fn name(&self) -> &'static str {
        match self {
            CreateWalletState::SocialSignIn { .. } => "socialSignIn",
            CreateWalletState::BindingPhoneNumber { .. } => "bindingPhoneNumber",
            CreateWalletState::SecuritySetup { .. } => "securitySetup",
            CreateWalletState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            CreateWalletState::SocialSignIn { inner } => 100 + inner.step(),
            CreateWalletState::BindingPhoneNumber { inner, .. } => 200 + inner.step(),
            CreateWalletState::SecuritySetup { inner, .. } => 300 + inner.step(),
            CreateWalletState::Finish(_) => 400,
        }
    }

    fn continuable(&self) -> bool {
        match self {
            CreateWalletState::SocialSignIn { inner } => inner.continuable(),
            CreateWalletState::BindingPhoneNumber { inner, .. } => inner.continuable(),
            CreateWalletState::SecuritySetup { inner, .. } => inner.continuable(),
            CreateWalletState::Finish(_) => true,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, CreateWalletState::Finish(_))
    }
}

impl FlowEvent for CreateWalletEvent {
    fn name(&self) -> &'static str {
        match self {
            CreateWalletEvent::SocialSignIn(event) => event.name(),
            CreateWalletEvent::BindingPhoneNumber(event) => event.name(),
            CreateWalletEvent::SecuritySetup(event) => event.name(),
        }
    }
}

/// The create-wallet composite flow.
#[derive(Debug, Clone, Default)]
pub struct CreateWalletFlow {
    social: SocialSignInFlow,
    binding: PhoneBindingFlow,
    security: SecuritySetupFlow,
}

impl CreateWalletFlow {
    /// Flow with the given backoff/lockout policy.
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            social: SocialSignInFlow,
            binding: PhoneBindingFlow::new(policy),
            security: SecuritySetupFlow,
        }
    }

    /// Entry state: the social sign-in phase.
    pub fn initial_state(&self) -> CreateWalletState {
        CreateWalletState::SocialSignIn {
            inner: self.social.initial_state(),
        }
    }
}

#[async_trait]
impl Flow for CreateWalletFlow {
    type State = CreateWalletState;
    type Event = CreateWalletEvent;
    type Effects = CreateWalletEffects;
    type Finish = CreateWalletResult;

    async fn transition(
        &self,
        state: &CreateWalletState,
        event: CreateWalletEvent,
        effects: &CreateWalletEffects,
    ) -> FlowResult<CreateWalletState> {
        match (state, event) {
            (
                CreateWalletState::SocialSignIn { inner },
                CreateWalletEvent::SocialSignIn(event),
            ) => {
                match step_sub_flow(&self.social, inner, event, &effects.social()).await? {
                    SubStep::Continue(inner) => Ok(CreateWalletState::SocialSignIn { inner }),
                    SubStep::Finished(SocialSignInFinish::Successful { email, artifacts }) => {
                        Ok(CreateWalletState::BindingPhoneNumber {
                            email,
                            artifacts,
                            inner: self.binding.initial_state(),
                        })
                    }
                    SubStep::Finished(SocialSignInFinish::SwitchToRestore { provider, email }) => {
                        Ok(CreateWalletState::Finish(
                            CreateWalletResult::SwitchToRestoreFlow { provider, email },
                        ))
                    }
                    SubStep::Finished(SocialSignInFinish::BreakProcess) => {
                        Ok(CreateWalletState::Finish(CreateWalletResult::BreakProcess))
                    }
                }
            }
            (
                CreateWalletState::BindingPhoneNumber {
                    email,
                    artifacts,
                    inner,
                },
                CreateWalletEvent::BindingPhoneNumber(event),
            ) => {
                let slice = effects.binding(artifacts);
                match step_sub_flow(&self.binding, inner, event, &slice).await? {
                    SubStep::Continue(inner) => Ok(CreateWalletState::BindingPhoneNumber {
                        email: email.clone(),
                        artifacts: artifacts.clone(),
                        inner,
                    }),
                    SubStep::Finished(crate::phone_binding::PhoneBindingFinish::Bound {
                        phone,
                    }) => Ok(CreateWalletState::SecuritySetup {
                        email: email.clone(),
                        artifacts: artifacts.clone(),
                        phone,
                        inner: self.security.initial_state(&effects.security()).await?,
                    }),
                }
            }
            (
                CreateWalletState::SecuritySetup {
                    email,
                    artifacts,
                    phone,
                    inner,
                },
                CreateWalletEvent::SecuritySetup(event),
            ) => {
                match step_sub_flow(&self.security, inner, event, &effects.security()).await? {
                    SubStep::Continue(inner) => Ok(CreateWalletState::SecuritySetup {
                        email: email.clone(),
                        artifacts: artifacts.clone(),
                        phone: phone.clone(),
                        inner,
                    }),
                    SubStep::Finished(SecuritySetupFinish::Success {
                        pincode,
                        biometric_enabled,
                    }) => Ok(CreateWalletState::Finish(CreateWalletResult::NewWallet {
                        wallet: OnboardingWallet {
                            private_key: artifacts.private_key.clone(),
                            eth_address: artifacts.eth_address.clone(),
                            device_share: artifacts.device_share.clone(),
                            pincode,
                            biometric_enabled,
                        },
                    })),
                }
            }
            // Fail fast: the event is tagged for a phase that is not live.
            (state, event) => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: CreateWalletState) -> Result<CreateWalletResult, CreateWalletState> {
        match state {
            CreateWalletState::Finish(result) => Ok(result),
            other => Err(other),
        }
    }
}
