//! Social sign-in leaf flow for wallet creation.
//!
//! Offers the provider choice, authenticates, and attempts a silent signup
//! against the distributed-key service. A key-service `1009` means the
//! social account already backs a wallet: the flow absorbs it into
//! [`SocialSignInState::AccountWasUsed`], from which the user can retry with
//! another provider, reroute into restoration, or step back. All other
//! key-service codes propagate unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::codes;
use ward_core::effects::{KeyServiceEffects, SocialAuthEffects};
use ward_core::{SignupArtifacts, SocialProvider};
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the sign-in flow needs.
#[derive(Clone)]
pub struct SocialSignInEffects {
    /// Social identity provider client.
    pub auth: Arc<dyn SocialAuthEffects>,
    /// Distributed-key service client.
    pub keys: Arc<dyn KeyServiceEffects>,
}

/// Sign-in states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SocialSignInState {
    /// Waiting for the user to pick a provider.
    SignIn,
    /// The chosen social account already backs a wallet.
    AccountWasUsed {
        /// Provider the rejected credential came from.
        provider: SocialProvider,
        /// Email of the already-used account.
        email: String,
    },
    /// Terminal.
    Finish(SocialSignInFinish),
}

/// Sign-in outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum SocialSignInFinish {
    /// Silent signup succeeded.
    Successful {
        /// Email reported by the provider.
        email: String,
        /// Key material produced by signup.
        artifacts: SignupArtifacts,
    },
    /// The user chose to restore the existing wallet instead.
    SwitchToRestore {
        /// Provider of the already-used account.
        provider: SocialProvider,
        /// Email of the already-used account.
        email: String,
    },
    /// The user abandoned onboarding.
    BreakProcess,
}

/// Sign-in events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum SocialSignInEvent {
    /// Authenticate with the given provider and attempt silent signup.
    SignIn {
        /// Chosen provider.
        provider: SocialProvider,
    },
    /// From [`SocialSignInState::AccountWasUsed`]: reroute to restoration.
    SwitchToRestore,
    /// Step back: to provider choice, or out of the flow entirely.
    Back,
}

impl FlowState for SocialSignInState {
    fn name(&self) -> &'static str {
        match self {
            SocialSignInState::SignIn => "signIn",
            SocialSignInState::AccountWasUsed { .. } => "accountWasUsed",
            SocialSignInState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            SocialSignInState::SignIn => 0,
            SocialSignInState::AccountWasUsed { .. } => 1,
            SocialSignInState::Finish(_) => 2,
        }
    }

    fn continuable(&self) -> bool {
        true
    }

    fn is_terminal(&self) -> bool {
        matches!(self, SocialSignInState::Finish(_))
    }
}

impl FlowEvent for SocialSignInEvent {
    fn name(&self) -> &'static str {
        match self {
            SocialSignInEvent::SignIn { .. } => "signIn",
            SocialSignInEvent::SwitchToRestore => "switchToRestore",
            SocialSignInEvent::Back => "back",
        }
    }
}

/// The sign-in leaf flow.
#[derive(Debug, Clone, Default)]
pub struct SocialSignInFlow;

impl SocialSignInFlow {
    /// Entry state.
    pub fn initial_state(&self) -> SocialSignInState {
        SocialSignInState::SignIn
    }

    async fn sign_in(
        &self,
        provider: SocialProvider,
        effects: &SocialSignInEffects,
    ) -> FlowResult<SocialSignInState> {
        let credential = effects.auth.authenticate(provider).await?;
        match effects.keys.sign_up(&credential.token).await {
            Ok(artifacts) => Ok(SocialSignInState::Finish(SocialSignInFinish::Successful {
                email: credential.email,
                artifacts,
            })),
            Err(error) if error.code == codes::key_service::ACCOUNT_ALREADY_USED => {
                tracing::debug!(provider = provider.display_name(), "social account already used");
                Ok(SocialSignInState::AccountWasUsed {
                    provider,
                    email: credential.email,
                })
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait]
impl Flow for SocialSignInFlow {
    type State = SocialSignInState;
    type Event = SocialSignInEvent;
    type Effects = SocialSignInEffects;
    type Finish = SocialSignInFinish;

    async fn transition(
        &self,
        state: &SocialSignInState,
        event: SocialSignInEvent,
        effects: &SocialSignInEffects,
    ) -> FlowResult<SocialSignInState> {
        match (state, &event) {
            (SocialSignInState::SignIn, SocialSignInEvent::SignIn { provider }) => {
                self.sign_in(*provider, effects).await
            }
            (SocialSignInState::SignIn, SocialSignInEvent::Back) => {
                Ok(SocialSignInState::Finish(SocialSignInFinish::BreakProcess))
            }
            (
                SocialSignInState::AccountWasUsed { .. },
                SocialSignInEvent::SignIn { provider },
            ) => self.sign_in(*provider, effects).await,
            (
                SocialSignInState::AccountWasUsed { provider, email },
                SocialSignInEvent::SwitchToRestore,
            ) => Ok(SocialSignInState::Finish(
                SocialSignInFinish::SwitchToRestore {
                    provider: *provider,
                    email: email.clone(),
                },
            )),
            (SocialSignInState::AccountWasUsed { .. }, SocialSignInEvent::Back) => {
                Ok(SocialSignInState::SignIn)
            }
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: SocialSignInState) -> Result<SocialSignInFinish, SocialSignInState> {
        match state {
            SocialSignInState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}
