//! Shared harness: one set of mocks wired into either composite's provider
//! bundle, plus engine constructors.
#![allow(dead_code)]

use std::sync::Arc;
use ward_core::DeviceShare;
use ward_engine::FlowEngine;
use ward_flows::create::{CreateWalletEffects, CreateWalletFlow, CreateWalletState};
use ward_flows::restore::{RestoreWalletEffects, RestoreWalletFlow, RestoreWalletState};
use ward_testkit::{
    fixtures, ManualClock, MockBiometric, MockDerivation, MockLocalAccounts, MockPhoneGateway,
    MockKeyService, MockSocialAuth,
};

pub struct Harness {
    pub auth: Arc<MockSocialAuth>,
    pub keys: Arc<MockKeyService>,
    pub gateway: Arc<MockPhoneGateway>,
    pub biometric: Arc<MockBiometric>,
    pub clock: Arc<ManualClock>,
    pub accounts: Arc<MockLocalAccounts>,
    pub derivation: Arc<MockDerivation>,
}

/// Route flow tracing into the test writer; `RUST_LOG` filters as usual.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Harness {
    pub fn new() -> Self {
        Self::with_biometric(false)
    }

    pub fn with_biometric(available: bool) -> Self {
        init_tracing();
        Self {
            auth: Arc::new(MockSocialAuth::new()),
            keys: Arc::new(MockKeyService::new()),
            gateway: Arc::new(MockPhoneGateway::new()),
            biometric: Arc::new(MockBiometric::available(available)),
            clock: Arc::new(ManualClock::new()),
            accounts: Arc::new(MockLocalAccounts::new()),
            derivation: Arc::new(MockDerivation::new()),
        }
    }

    pub fn with_accounts(accounts: Vec<ward_core::LocalAccount>) -> Self {
        let mut harness = Self::new();
        harness.accounts = Arc::new(MockLocalAccounts::with_accounts(accounts));
        harness
    }

    pub fn create_effects(&self) -> CreateWalletEffects {
        CreateWalletEffects {
            auth: self.auth.clone(),
            keys: self.keys.clone(),
            gateway: self.gateway.clone(),
            biometric: self.biometric.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn restore_effects(&self) -> RestoreWalletEffects {
        RestoreWalletEffects {
            auth: self.auth.clone(),
            keys: self.keys.clone(),
            gateway: self.gateway.clone(),
            biometric: self.biometric.clone(),
            clock: self.clock.clone(),
            accounts: self.accounts.clone(),
            derivation: self.derivation.clone(),
            signer: fixtures::ephemeral_signer(),
        }
    }

    pub fn create_engine(&self) -> FlowEngine<CreateWalletFlow> {
        let flow = CreateWalletFlow::default();
        let initial = flow.initial_state();
        FlowEngine::new(flow, self.create_effects(), initial)
    }

    pub fn create_engine_at(&self, initial: CreateWalletState) -> FlowEngine<CreateWalletFlow> {
        FlowEngine::new(CreateWalletFlow::default(), self.create_effects(), initial)
    }

    pub fn restore_engine(
        &self,
        device_share: Option<DeviceShare>,
    ) -> FlowEngine<RestoreWalletFlow> {
        let flow = RestoreWalletFlow::default();
        let initial = flow.initial_state(device_share);
        FlowEngine::new(flow, self.restore_effects(), initial)
    }

    pub fn restore_engine_at(&self, initial: RestoreWalletState) -> FlowEngine<RestoreWalletFlow> {
        FlowEngine::new(RestoreWalletFlow::default(), self.restore_effects(), initial)
    }
}
