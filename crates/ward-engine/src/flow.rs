//! The flow contract.
//!
//! A flow is a closed set of state variants, a closed set of event variants,
//! a provider bundle, and one transition function. States are immutable
//! value snapshots: a transition returns a new state, never mutates one, and
//! a state serializes to exactly the data needed to resume from it.

use crate::error::FlowResult;
use async_trait::async_trait;

/// A state variant in a flow.
///
/// `step` and `continuable` are derived, read-only projections of the state
/// value — they are computed, never stored, so a snapshot can never drift
/// from its own metadata.
pub trait FlowState: Clone + std::fmt::Debug + Send + Sync {
    /// Stable variant name, used for progress display and error rendering.
    fn name(&self) -> &'static str;

    /// Ordering number placing this state within the overall funnel.
    ///
    /// Composite flows use `phase * 100 + inner step`.
    fn step(&self) -> u32;

    /// Whether resuming from a snapshot of this exact state — rather than
    /// restarting its phase — is semantically safe.
    fn continuable(&self) -> bool;

    /// Whether this is a finish variant. No event is legal against a
    /// terminal state.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// An event variant in a flow.
pub trait FlowEvent: std::fmt::Debug + Send {
    /// Stable variant name, used for error rendering.
    fn name(&self) -> &'static str;
}

/// A state machine over a closed (state, event) space.
///
/// `transition` is pure apart from provider I/O: given the same state, event,
/// and provider results it always produces the same next state. Pairs the
/// flow does not define raise [`FlowError::InvalidEvent`](crate::FlowError::InvalidEvent);
/// provider errors propagate unchanged.
#[async_trait]
pub trait Flow: Send + Sync {
    /// State variant set.
    type State: FlowState;
    /// Event variant set.
    type Event: FlowEvent;
    /// Provider capability bundle.
    type Effects: Send + Sync;
    /// Payload of the flow's finish variants.
    type Finish;

    /// Apply `event` to `state`, producing the next state.
    async fn transition(
        &self,
        state: &Self::State,
        event: Self::Event,
        effects: &Self::Effects,
    ) -> FlowResult<Self::State>;

    /// Classify a state: `Ok(finish)` for finish variants, `Err(state)`
    /// returning the input untouched otherwise.
    fn into_finish(state: Self::State) -> Result<Self::Finish, Self::State>;
}
