//! Sub-flow composition.
//!
//! A composite flow embeds a sub-flow's state inside one of its own
//! variants, together with whatever context the sub-flow does not itself
//! carry. Event handling then follows one shape everywhere:
//!
//! 1. The composite's own `match` rejects the event (fail fast, before the
//!    sub-flow is invoked) unless its current variant embeds the sub-flow
//!    the event is tagged for.
//! 2. [`step_sub_flow`] delegates to the sub-flow's transition with a
//!    provider slice built from the composite's own bundle.
//! 3. A finish result is handed back for the composite to interpret — the
//!    one place business meaning crosses a sub-flow boundary.
//! 4. A non-terminal result is re-wrapped into the composite's current
//!    variant unchanged.

use crate::error::FlowResult;
use crate::flow::Flow;

/// Outcome of delegating one event to an embedded sub-flow.
#[derive(Debug)]
pub enum SubStep<S, F> {
    /// The sub-flow advanced to a non-terminal state; re-wrap it.
    Continue(S),
    /// The sub-flow finished; interpret the payload.
    Finished(F),
}

/// Delegate `event` to `flow` and classify the result.
///
/// Errors — protocol or provider — pass through unchanged, so the
/// composite's snapshot is only replaced when the sub-flow actually moved.
pub async fn step_sub_flow<Sub: Flow>(
    flow: &Sub,
    state: &Sub::State,
    event: Sub::Event,
    effects: &Sub::Effects,
) -> FlowResult<SubStep<Sub::State, Sub::Finish>> {
    let next = flow.transition(state, event, effects).await?;
    Ok(match Sub::into_finish(next) {
        Ok(finish) => SubStep::Finished(finish),
        Err(state) => SubStep::Continue(state),
    })
}
