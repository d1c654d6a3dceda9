//! Local-credential restoration leaf flow.
//!
//! Enumerates the seed phrases already stored on the device and derives the
//! picked account directly. No remote calls — only local derivation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ward_core::effects::{LocalAccountsEffects, WalletDerivationEffects};
use ward_core::{LocalAccount, RestoredWallet};
use ward_engine::{Flow, FlowError, FlowEvent, FlowResult, FlowState};

/// Capabilities the local restoration flow needs.
#[derive(Clone)]
pub struct RestoreLocalEffects {
    /// Local credential store.
    pub accounts: Arc<dyn LocalAccountsEffects>,
    /// Local account derivation.
    pub derivation: Arc<dyn WalletDerivationEffects>,
}

/// Local restoration states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum RestoreLocalState {
    /// Waiting for the user to pick a stored account.
    SelectAccount {
        /// Accounts found on the device.
        accounts: Vec<LocalAccount>,
    },
    /// Terminal.
    Finish(RestoreLocalFinish),
}

/// Local restoration outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum RestoreLocalFinish {
    /// The picked account was derived.
    Restored {
        /// The derived account.
        wallet: RestoredWallet,
    },
    /// The user abandoned back to the restoration menu.
    Start,
}

/// Local restoration events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum RestoreLocalEvent {
    /// Derive the account at the given position in the stored list.
    PickAccount {
        /// Index into the enumerated accounts.
        index: usize,
    },
    /// Abandon back to the restoration menu.
    Start,
}

impl FlowState for RestoreLocalState {
    fn name(&self) -> &'static str {
        match self {
            RestoreLocalState::SelectAccount { .. } => "selectAccount",
            RestoreLocalState::Finish(_) => "finish",
        }
    }

    fn step(&self) -> u32 {
        match self {
            RestoreLocalState::SelectAccount { .. } => 0,
            RestoreLocalState::Finish(_) => 1,
        }
    }

    fn continuable(&self) -> bool {
        true
    }

    fn is_terminal(&self) -> bool {
        matches!(self, RestoreLocalState::Finish(_))
    }
}

impl FlowEvent for RestoreLocalEvent {
    fn name(&self) -> &'static str {
        match self {
            RestoreLocalEvent::PickAccount { .. } => "pickAccount",
            RestoreLocalEvent::Start => "start",
        }
    }
}

/// The local restoration leaf flow.
#[derive(Debug, Clone, Default)]
pub struct RestoreLocalFlow;

impl RestoreLocalFlow {
    /// Entry state: whatever the credential store holds right now.
    pub async fn initial_state(
        &self,
        effects: &RestoreLocalEffects,
    ) -> FlowResult<RestoreLocalState> {
        let accounts = effects.accounts.list_local_accounts().await?;
        Ok(RestoreLocalState::SelectAccount { accounts })
    }
}

#[async_trait]
impl Flow for RestoreLocalFlow {
    type State = RestoreLocalState;
    type Event = RestoreLocalEvent;
    type Effects = RestoreLocalEffects;
    type Finish = RestoreLocalFinish;

    async fn transition(
        &self,
        state: &RestoreLocalState,
        event: RestoreLocalEvent,
        effects: &RestoreLocalEffects,
    ) -> FlowResult<RestoreLocalState> {
        match (state, &event) {
            (RestoreLocalState::SelectAccount { accounts }, RestoreLocalEvent::PickAccount { index }) => {
                // An out-of-range pick is an integration defect, same as an
                // unknown event.
                let Some(account) = accounts.get(*index) else {
                    return Err(FlowError::invalid_event(state, &event));
                };
                let wallet = effects
                    .derivation
                    .derive(&account.recovery_phrase, &account.derivation_path)
                    .await?;
                Ok(RestoreLocalState::Finish(RestoreLocalFinish::Restored {
                    wallet,
                }))
            }
            (RestoreLocalState::SelectAccount { .. }, RestoreLocalEvent::Start) => {
                Ok(RestoreLocalState::Finish(RestoreLocalFinish::Start))
            }
            _ => Err(FlowError::invalid_event(state, &event)),
        }
    }

    fn into_finish(state: RestoreLocalState) -> Result<RestoreLocalFinish, RestoreLocalState> {
        match state {
            RestoreLocalState::Finish(finish) => Ok(finish),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ward_testkit::{fixtures, MockDerivation, MockLocalAccounts};

    fn fx(accounts: Vec<LocalAccount>) -> RestoreLocalEffects {
        RestoreLocalEffects {
            accounts: Arc::new(MockLocalAccounts::with_accounts(accounts)),
            derivation: Arc::new(MockDerivation::new()),
        }
    }

    #[tokio::test]
    async fn test_initial_state_lists_stored_accounts() {
        let flow = RestoreLocalFlow;
        let accounts = vec![fixtures::local_account("main"), fixtures::local_account("cold")];
        let state = flow.initial_state(&fx(accounts.clone())).await.unwrap();
        assert_eq!(state, RestoreLocalState::SelectAccount { accounts });
    }

    #[tokio::test]
    async fn test_picking_an_account_derives_it() {
        let flow = RestoreLocalFlow;
        let fx = fx(vec![fixtures::local_account("main")]);
        let state = flow.initial_state(&fx).await.unwrap();
        let next = flow
            .transition(&state, RestoreLocalEvent::PickAccount { index: 0 }, &fx)
            .await
            .unwrap();
        assert_matches!(
            next,
            RestoreLocalState::Finish(RestoreLocalFinish::Restored { .. })
        );
    }

    #[tokio::test]
    async fn test_out_of_range_pick_is_invalid() {
        let flow = RestoreLocalFlow;
        let fx = fx(vec![fixtures::local_account("main")]);
        let state = flow.initial_state(&fx).await.unwrap();
        let error = flow
            .transition(&state, RestoreLocalEvent::PickAccount { index: 3 }, &fx)
            .await
            .unwrap_err();
        assert_matches!(error, ward_engine::FlowError::InvalidEvent { .. });
    }
}
