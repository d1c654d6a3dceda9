//! Flow error taxonomy.
//!
//! Two kinds of failure leave a transition: the protocol error
//! ([`FlowError::InvalidEvent`]) for a (state, event) pair the flow does not
//! define, and provider errors carried through **unchanged** so the caller
//! can branch on the original value. Domain-meaningful backend codes never
//! appear here — the flows absorb them into states before returning.

use ward_core::effects::{
    AccountsError, AuthError, BiometricError, DerivationError, GatewayError, KeyServiceError,
    TimeError,
};
use ward_core::SigningError;

use crate::flow::{FlowEvent, FlowState};

/// Error returned by a transition or by [`FlowEngine::submit`](crate::FlowEngine::submit).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    /// The event is not legal for the current state. Always a caller or
    /// integration defect; never retried automatically.
    #[error("event `{event}` is not legal in state `{state}`")]
    InvalidEvent {
        /// Name of the state that refused the event.
        state: &'static str,
        /// Name of the refused event.
        event: &'static str,
    },

    /// Unmapped social-authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unmapped distributed-key service failure.
    #[error(transparent)]
    KeyService(#[from] KeyServiceError),

    /// Unmapped phone-gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Biometric probe failure.
    #[error(transparent)]
    Biometric(#[from] BiometricError),

    /// Local credential store failure.
    #[error(transparent)]
    Accounts(#[from] AccountsError),

    /// Local derivation failure.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Clock failure.
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Request signing failure.
    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl FlowError {
    /// Build the protocol error for a refused (state, event) pair.
    pub fn invalid_event<S: FlowState, E: FlowEvent>(state: &S, event: &E) -> Self {
        FlowError::InvalidEvent {
            state: state.name(),
            event: event.name(),
        }
    }
}

/// Standard result type for flow transitions.
pub type FlowResult<T> = std::result::Result<T, FlowError>;
