//! The serialized transition engine.

use crate::error::FlowResult;
use crate::flow::{Flow, FlowEvent, FlowState};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Single-writer executor for one flow instance.
///
/// The engine owns the instance's only state snapshot. `submit` calls are
/// processed strictly one at a time: a second event never begins until the
/// first has committed or failed, so the sequence of states is exactly the
/// sequence of submissions. Engines for different instances share nothing
/// and run fully independently.
pub struct FlowEngine<F: Flow> {
    id: Uuid,
    flow: F,
    effects: F::Effects,
    state: Mutex<F::State>,
}

impl<F: Flow> FlowEngine<F> {
    /// Create an engine holding `initial` as its snapshot.
    ///
    /// Resuming a persisted run is the same call fed a deserialized
    /// snapshot.
    pub fn new(flow: F, effects: F::Effects, initial: F::State) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow,
            effects,
            state: Mutex::new(initial),
        }
    }

    /// Instance id, carried in tracing output.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Apply one event against the held snapshot.
    ///
    /// Atomic commit: the snapshot is replaced only if the transition
    /// returns a new state. On any error — protocol or provider — the
    /// snapshot is untouched and the error is returned unchanged, so
    /// resubmitting the same event is safe. Dropping the returned future
    /// before completion likewise commits nothing.
    pub async fn submit(&self, event: F::Event) -> FlowResult<F::State> {
        let mut held = self.state.lock().await;
        let from = held.name();
        let event_name = event.name();
        match self.flow.transition(&held, event, &self.effects).await {
            Ok(next) => {
                tracing::debug!(
                    engine = %self.id,
                    from,
                    event = event_name,
                    to = next.name(),
                    "transition committed"
                );
                if next.is_terminal() {
                    tracing::info!(engine = %self.id, state = next.name(), "flow finished");
                }
                *held = next.clone();
                Ok(next)
            }
            Err(error) => {
                tracing::debug!(
                    engine = %self.id,
                    state = from,
                    event = event_name,
                    %error,
                    "transition refused"
                );
                Err(error)
            }
        }
    }

    /// Clone of the held snapshot — the resumable persistence unit.
    pub async fn state(&self) -> F::State {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use ward_core::effects::TimeError;

    #[derive(Debug, Clone, PartialEq)]
    enum GateState {
        Closed { entries: u32 },
        Open { entries: u32 },
        Latched,
    }

    impl FlowState for GateState {
        fn name(&self) -> &'static str {
            match self {
                GateState::Closed { .. } => "closed",
                GateState::Open { .. } => "open",
                GateState::Latched => "latched",
            }
        }

        fn step(&self) -> u32 {
            match self {
                GateState::Closed { .. } => 0,
                GateState::Open { .. } => 1,
                GateState::Latched => 2,
            }
        }

        fn continuable(&self) -> bool {
            true
        }

        fn is_terminal(&self) -> bool {
            matches!(self, GateState::Latched)
        }
    }

    #[derive(Debug)]
    enum GateEvent {
        Coin,
        Push,
        Latch,
    }

    impl FlowEvent for GateEvent {
        fn name(&self) -> &'static str {
            match self {
                GateEvent::Coin => "coin",
                GateEvent::Push => "push",
                GateEvent::Latch => "latch",
            }
        }
    }

    #[derive(Default)]
    struct GateEffects {
        fail_unlock: AtomicBool,
        unlock_delay_ms: u64,
        in_flight: AtomicUsize,
    }

    impl GateEffects {
        async fn unlock(&self) -> Result<(), TimeError> {
            let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst);
            assert_eq!(concurrent, 0, "unlock invoked while another was in flight");
            if self.unlock_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.unlock_delay_ms)).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_unlock.load(Ordering::SeqCst) {
                return Err(TimeError::Unavailable {
                    message: "scripted failure".into(),
                });
            }
            Ok(())
        }
    }

    struct GateFlow;

    #[async_trait]
    impl Flow for GateFlow {
        type State = GateState;
        type Event = GateEvent;
        type Effects = GateEffects;
        type Finish = ();

        async fn transition(
            &self,
            state: &GateState,
            event: GateEvent,
            effects: &GateEffects,
        ) -> FlowResult<GateState> {
            match (state, &event) {
                (GateState::Closed { entries }, GateEvent::Coin) => {
                    effects.unlock().await?;
                    Ok(GateState::Open { entries: *entries })
                }
                (GateState::Open { entries }, GateEvent::Push) => Ok(GateState::Closed {
                    entries: entries + 1,
                }),
                (GateState::Closed { .. }, GateEvent::Latch) => Ok(GateState::Latched),
                _ => Err(FlowError::invalid_event(state, &event)),
            }
        }

        fn into_finish(state: GateState) -> Result<(), GateState> {
            match state {
                GateState::Latched => Ok(()),
                other => Err(other),
            }
        }
    }

    fn engine_with(effects: GateEffects) -> FlowEngine<GateFlow> {
        FlowEngine::new(GateFlow, effects, GateState::Closed { entries: 0 })
    }

    #[tokio::test]
    async fn test_submit_commits_new_state() {
        let engine = engine_with(GateEffects::default());
        let next = engine.submit(GateEvent::Coin).await.unwrap();
        assert_eq!(next, GateState::Open { entries: 0 });
        assert_eq!(engine.state().await, GateState::Open { entries: 0 });
    }

    #[tokio::test]
    async fn test_invalid_event_leaves_snapshot_unchanged() {
        let engine = engine_with(GateEffects::default());
        let before = engine.state().await;
        let error = engine.submit(GateEvent::Push).await.unwrap_err();
        assert_matches!(
            error,
            FlowError::InvalidEvent {
                state: "closed",
                event: "push"
            }
        );
        assert_eq!(engine.state().await, before);
    }

    #[tokio::test]
    async fn test_provider_error_leaves_snapshot_unchanged() {
        let effects = GateEffects::default();
        effects.fail_unlock.store(true, Ordering::SeqCst);
        let engine = engine_with(effects);
        let before = engine.state().await;
        let error = engine.submit(GateEvent::Coin).await.unwrap_err();
        assert_matches!(error, FlowError::Time(TimeError::Unavailable { .. }));
        assert_eq!(engine.state().await, before);
    }

    #[tokio::test]
    async fn test_terminal_state_refuses_all_events() {
        let engine = engine_with(GateEffects::default());
        engine.submit(GateEvent::Latch).await.unwrap();
        for event in [GateEvent::Coin, GateEvent::Push, GateEvent::Latch] {
            let error = engine.submit(event).await.unwrap_err();
            assert_matches!(error, FlowError::InvalidEvent { state: "latched", .. });
        }
    }

    #[tokio::test]
    async fn test_concurrent_submits_are_serialized() {
        let engine = engine_with(GateEffects {
            unlock_delay_ms: 2,
            ..GateEffects::default()
        });
        // The unlock effect asserts it is never entered twice at once.
        let (a, b) = tokio::join!(engine.submit(GateEvent::Coin), engine.submit(GateEvent::Push));
        a.unwrap();
        b.unwrap();
        assert_eq!(engine.state().await, GateState::Closed { entries: 1 });
    }

    #[tokio::test]
    async fn test_cancelled_submit_commits_nothing() {
        let engine = engine_with(GateEffects {
            unlock_delay_ms: 50,
            ..GateEffects::default()
        });
        {
            let submit = engine.submit(GateEvent::Coin);
            tokio::pin!(submit);
            tokio::select! {
                _ = &mut submit => panic!("unlock delay should outlast the race"),
                () = tokio::time::sleep(Duration::from_millis(5)) => {}
            }
        }
        assert_eq!(engine.state().await, GateState::Closed { entries: 0 });
    }
}
