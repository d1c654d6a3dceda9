//! Mock distributed-key service.

use crate::fixtures;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use ward_core::effects::{KeyServiceEffects, KeyServiceError};
use ward_core::{CustomShare, DeviceShare, RestoredWallet, SignupArtifacts, TokenId};

/// Scriptable key-service handler.
///
/// Each method has its own outcome queue; with an empty queue the method
/// succeeds with the deterministic fixture value.
#[derive(Debug, Default)]
pub struct MockKeyService {
    sign_up: Mutex<VecDeque<Result<SignupArtifacts, KeyServiceError>>>,
    sign_in_device: Mutex<VecDeque<Result<RestoredWallet, KeyServiceError>>>,
    sign_in_custom: Mutex<VecDeque<Result<RestoredWallet, KeyServiceError>>>,
    sign_in_shares: Mutex<VecDeque<Result<RestoredWallet, KeyServiceError>>>,
}

impl MockKeyService {
    /// Handler with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience coded error.
    pub fn coded_error(code: i64) -> KeyServiceError {
        KeyServiceError::new(code, "ServiceError", format!("scripted code {code}"))
    }

    /// Enqueue the outcome of the next `sign_up` call.
    pub fn push_sign_up(&self, response: Result<SignupArtifacts, KeyServiceError>) {
        self.sign_up.lock().unwrap().push_back(response);
    }

    /// Enqueue the outcome of the next device-share sign-in.
    pub fn push_sign_in_device(&self, response: Result<RestoredWallet, KeyServiceError>) {
        self.sign_in_device.lock().unwrap().push_back(response);
    }

    /// Enqueue the outcome of the next custom-share sign-in.
    pub fn push_sign_in_custom(&self, response: Result<RestoredWallet, KeyServiceError>) {
        self.sign_in_custom.lock().unwrap().push_back(response);
    }

    /// Enqueue the outcome of the next two-share sign-in.
    pub fn push_sign_in_shares(&self, response: Result<RestoredWallet, KeyServiceError>) {
        self.sign_in_shares.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl KeyServiceEffects for MockKeyService {
    async fn sign_up(&self, _token: &TokenId) -> Result<SignupArtifacts, KeyServiceError> {
        match self.sign_up.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(fixtures::signup_artifacts()),
        }
    }

    async fn sign_in_with_device_share(
        &self,
        _token: &TokenId,
        _device_share: &DeviceShare,
    ) -> Result<RestoredWallet, KeyServiceError> {
        match self.sign_in_device.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(fixtures::restored_wallet()),
        }
    }

    async fn sign_in_with_custom_share(
        &self,
        _token: &TokenId,
        _custom_share: &CustomShare,
    ) -> Result<RestoredWallet, KeyServiceError> {
        match self.sign_in_custom.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(fixtures::restored_wallet()),
        }
    }

    async fn sign_in_with_shares(
        &self,
        _device_share: &DeviceShare,
        _custom_share: &CustomShare,
    ) -> Result<RestoredWallet, KeyServiceError> {
        match self.sign_in_shares.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(fixtures::restored_wallet()),
        }
    }
}
