//! Mock phone-verification gateway.

use crate::fixtures;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use ward_core::effects::{
    ConfirmOtpPayload, ConfirmedPhone, GatewayError, PhoneGatewayEffects, RegisterPhonePayload,
};
use ward_core::SignedRequest;

/// Scriptable gateway handler that records every request it receives.
///
/// Defaults: `register_or_restore` succeeds, `confirm` releases the fixture
/// custom share.
#[derive(Debug, Default)]
pub struct MockPhoneGateway {
    register: Mutex<VecDeque<Result<(), GatewayError>>>,
    confirm: Mutex<VecDeque<Result<ConfirmedPhone, GatewayError>>>,
    register_calls: Mutex<Vec<SignedRequest<RegisterPhonePayload>>>,
    confirm_calls: Mutex<Vec<SignedRequest<ConfirmOtpPayload>>>,
}

impl MockPhoneGateway {
    /// Handler with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience coded error.
    pub fn coded_error(code: i64) -> GatewayError {
        GatewayError::new(code, format!("scripted code {code}"))
    }

    /// Enqueue the outcome of the next dispatch call.
    pub fn push_register(&self, response: Result<(), GatewayError>) {
        self.register.lock().unwrap().push_back(response);
    }

    /// Enqueue the outcome of the next confirm call.
    pub fn push_confirm(&self, response: Result<ConfirmedPhone, GatewayError>) {
        self.confirm.lock().unwrap().push_back(response);
    }

    /// Number of dispatch calls received so far.
    pub fn register_call_count(&self) -> usize {
        self.register_calls.lock().unwrap().len()
    }

    /// Dispatch requests received so far, in order.
    pub fn register_calls(&self) -> Vec<SignedRequest<RegisterPhonePayload>> {
        self.register_calls.lock().unwrap().clone()
    }

    /// Confirm requests received so far, in order.
    pub fn confirm_calls(&self) -> Vec<SignedRequest<ConfirmOtpPayload>> {
        self.confirm_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhoneGatewayEffects for MockPhoneGateway {
    async fn register_or_restore(
        &self,
        request: &SignedRequest<RegisterPhonePayload>,
    ) -> Result<(), GatewayError> {
        self.register_calls.lock().unwrap().push(request.clone());
        match self.register.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(()),
        }
    }

    async fn confirm(
        &self,
        request: &SignedRequest<ConfirmOtpPayload>,
    ) -> Result<ConfirmedPhone, GatewayError> {
        self.confirm_calls.lock().unwrap().push(request.clone());
        match self.confirm.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(ConfirmedPhone {
                custom_share: fixtures::custom_share(),
            }),
        }
    }
}
