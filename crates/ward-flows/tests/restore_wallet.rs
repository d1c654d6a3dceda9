//! End-to-end scenarios for the restore-wallet funnel.

mod common;

use assert_matches::assert_matches;
use common::Harness;
use ward_core::codes;
use ward_core::{OtpChannel, PhoneNumber, Pincode, RecoveryPhrase, SocialProvider};
use ward_engine::{FlowError, FlowState};
use ward_flows::restore::{RestoreWalletEvent, RestoreWalletResult, RestoreWalletState};
use ward_flows::restore_custom::{RestoreCustomEvent, RestoreCustomState};
use ward_flows::restore_local::RestoreLocalEvent;
use ward_flows::restore_social::{RestoreSocialEvent, RestoreSocialState};
use ward_flows::security_setup::SecuritySetupEvent;
use ward_testkit::{fixtures, MockKeyService, MockPhoneGateway};

fn social(event: RestoreSocialEvent) -> RestoreWalletEvent {
    RestoreWalletEvent::RestoreSocial(event)
}

fn custom(event: RestoreCustomEvent) -> RestoreWalletEvent {
    RestoreWalletEvent::RestoreCustom(event)
}

fn sign_in(provider: SocialProvider) -> RestoreSocialEvent {
    RestoreSocialEvent::SignIn { provider }
}

fn enter_phone() -> RestoreWalletEvent {
    custom(RestoreCustomEvent::EnterPhoneNumber {
        phone: PhoneNumber::new("+15550002222"),
        channel: OtpChannel::Sms,
    })
}

fn enter_otp() -> RestoreWalletEvent {
    custom(RestoreCustomEvent::EnterOtp {
        code: "000000".to_owned(),
    })
}

fn not_found() -> ward_core::effects::KeyServiceError {
    MockKeyService::coded_error(codes::key_service::ACCOUNT_ALREADY_USED)
}

#[tokio::test]
async fn test_social_path_restores_and_reaches_security_setup() {
    let harness = Harness::new();
    let engine = harness.restore_engine(Some(fixtures::device_share()));

    engine.submit(RestoreWalletEvent::RequireSocial).await.unwrap();
    let state = engine
        .submit(social(sign_in(SocialProvider::Apple)))
        .await
        .unwrap();
    assert_eq!(
        state,
        RestoreWalletState::RestoredData {
            wallet: fixtures::restored_wallet()
        }
    );

    engine.submit(RestoreWalletEvent::Continue).await.unwrap();
    engine
        .submit(RestoreWalletEvent::SecuritySetup(
            SecuritySetupEvent::ConfirmPincode {
                pincode: Pincode::new("1717"),
            },
        ))
        .await
        .unwrap();
    let state = engine
        .submit(RestoreWalletEvent::SecuritySetup(
            SecuritySetupEvent::SetPincode {
                pincode: Pincode::new("1717"),
                biometric_enabled: false,
            },
        ))
        .await
        .unwrap();
    assert_eq!(
        state,
        RestoreWalletState::Finish(RestoreWalletResult::Restored {
            wallet: fixtures::restored_wallet(),
            pincode: Pincode::new("1717"),
            biometric_enabled: false,
        })
    );
}

#[tokio::test]
async fn test_social_without_a_device_share_is_not_offered() {
    let harness = Harness::new();
    let engine = harness.restore_engine(None);
    let error = engine
        .submit(RestoreWalletEvent::RequireSocial)
        .await
        .unwrap_err();
    assert_matches!(
        error,
        FlowError::InvalidEvent {
            state: "restore",
            event: "requireSocial"
        }
    );
}

#[tokio::test]
async fn test_not_found_device_reroutes_into_the_phone_path() {
    let harness = Harness::new();
    harness.keys.push_sign_in_device(Err(not_found()));
    let engine = harness.restore_engine(Some(fixtures::device_share()));

    engine.submit(RestoreWalletEvent::RequireSocial).await.unwrap();
    let state = engine
        .submit(social(sign_in(SocialProvider::Apple)))
        .await
        .unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreSocial {
            inner: RestoreSocialState::NotFoundDevice { .. },
            ..
        }
    );

    // Carry the credential and device share into phone verification.
    let state = engine
        .submit(social(RestoreSocialEvent::RequireCustom))
        .await
        .unwrap();
    assert_matches!(
        &state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::EnterPhone { ctx, .. },
            ..
        } if ctx.device_share.is_some() && ctx.social.is_some()
    );

    engine.submit(enter_phone()).await.unwrap();
    // Confirm pairs the fresh custom share with the still-valid credential.
    let state = engine.submit(enter_otp()).await.unwrap();
    assert_eq!(
        state,
        RestoreWalletState::RestoredData {
            wallet: fixtures::restored_wallet()
        }
    );
}

#[tokio::test]
async fn test_expired_credential_takes_the_try_again_branch() {
    let harness = Harness::new();
    harness.keys.push_sign_in_device(Err(not_found()));
    // The credential carried out of the social phase expires before the OTP
    // is confirmed.
    harness.auth.mark_expired("token-apple");
    let engine = harness.restore_engine(Some(fixtures::device_share()));

    engine.submit(RestoreWalletEvent::RequireSocial).await.unwrap();
    engine
        .submit(social(sign_in(SocialProvider::Apple)))
        .await
        .unwrap();
    engine
        .submit(social(RestoreSocialEvent::RequireCustom))
        .await
        .unwrap();
    engine.submit(enter_phone()).await.unwrap();

    let state = engine.submit(enter_otp()).await.unwrap();
    assert_matches!(
        &state,
        RestoreWalletState::RestoreSocial {
            inner: RestoreSocialState::ExpiredSocialTryAgain {
                device_share: Some(_),
                ..
            },
            ..
        }
    );

    // The fresh sign-in's custom pairing misses, the device fallback hits.
    harness.keys.push_sign_in_custom(Err(
        MockKeyService::coded_error(codes::key_service::SHARE_MISMATCH),
    ));
    let state = engine
        .submit(social(sign_in(SocialProvider::Google)))
        .await
        .unwrap();
    assert_eq!(
        state,
        RestoreWalletState::RestoredData {
            wallet: fixtures::restored_wallet()
        }
    );
}

#[tokio::test]
async fn test_keychain_path_needs_no_remote_calls() {
    let accounts = vec![
        fixtures::local_account("main"),
        fixtures::local_account("cold"),
    ];
    let harness = Harness::with_accounts(accounts);
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::SignInKeychain).await.unwrap();
    let state = engine
        .submit(RestoreWalletEvent::Keychain(
            RestoreLocalEvent::PickAccount { index: 1 },
        ))
        .await
        .unwrap();
    assert_matches!(state, RestoreWalletState::RestoredData { .. });
    assert_eq!(harness.gateway.register_call_count(), 0);
}

#[tokio::test]
async fn test_seed_entry_derives_directly() {
    let harness = Harness::new();
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::SignInSeed).await.unwrap();
    let state = engine
        .submit(RestoreWalletEvent::EnterSeed {
            phrase: RecoveryPhrase::new("abandon ability able about"),
            derivation_path: "m/44'/60'/0'/0/0".to_owned(),
        })
        .await
        .unwrap();
    assert_matches!(state, RestoreWalletState::RestoredData { .. });
}

#[tokio::test]
async fn test_number_bound_elsewhere_proposes_another() {
    let harness = Harness::new();
    harness.gateway.push_register(Err(MockPhoneGateway::coded_error(
        codes::gateway::NUMBER_IN_USE,
    )));
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    let state = engine.submit(enter_phone()).await.unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::TryAnother { .. },
            ..
        }
    );

    // A different number goes straight back through dispatch.
    let state = engine
        .submit(custom(RestoreCustomEvent::EnterPhoneNumber {
            phone: PhoneNumber::new("+15550003333"),
            channel: OtpChannel::Sms,
        }))
        .await
        .unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::EnterOtp { .. },
            ..
        }
    );
}

#[tokio::test]
async fn test_unreachable_phone_offers_social_fallback_only_with_a_device_share() {
    // With a device share: the fallback is offered and hands over to the
    // social path.
    let harness = Harness::new();
    harness.gateway.push_register(Err(MockPhoneGateway::coded_error(
        codes::gateway::UNDELIVERABLE,
    )));
    let engine = harness.restore_engine(Some(fixtures::device_share()));
    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    let state = engine.submit(enter_phone()).await.unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::OtpNotDeliveredTrySocial { .. },
            ..
        }
    );
    let state = engine
        .submit(custom(RestoreCustomEvent::RequireSocial))
        .await
        .unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreSocial {
            inner: RestoreSocialState::SignIn { .. },
            ..
        }
    );

    // Without one: no fallback to offer.
    let harness = Harness::new();
    harness.gateway.push_register(Err(MockPhoneGateway::coded_error(
        codes::gateway::UNDELIVERABLE,
    )));
    let engine = harness.restore_engine(None);
    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    let state = engine.submit(enter_phone()).await.unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::OtpNotDelivered { .. },
            ..
        }
    );
}

#[tokio::test]
async fn test_confirmed_otp_with_no_wallet_is_no_match() {
    let harness = Harness::new();
    harness.gateway.push_confirm(Err(MockPhoneGateway::coded_error(
        codes::gateway::NO_MATCH,
    )));
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    engine.submit(enter_phone()).await.unwrap();
    let state = engine.submit(enter_otp()).await.unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::NoMatch { .. },
            ..
        }
    );

    // Distinguished from a finish: the user starts over at the menu.
    let state = engine
        .submit(custom(RestoreCustomEvent::Start))
        .await
        .unwrap();
    assert_eq!(state, RestoreWalletState::Restore { device_share: None });
}

#[tokio::test]
async fn test_gateway_internal_error_breaks_the_attempt() {
    let harness = Harness::new();
    harness.gateway.push_register(Err(MockPhoneGateway::coded_error(
        codes::gateway::INTERNAL,
    )));
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    let state = engine.submit(enter_phone()).await.unwrap();
    assert_matches!(
        state,
        RestoreWalletState::RestoreCustom {
            inner: RestoreCustomState::Broken {
                code: codes::gateway::INTERNAL,
                ..
            },
            ..
        }
    );
}

#[tokio::test]
async fn test_retrieved_custom_share_without_other_material_requires_social() {
    let harness = Harness::new();
    let engine = harness.restore_engine(None);

    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    engine.submit(enter_phone()).await.unwrap();
    let state = engine.submit(enter_otp()).await.unwrap();
    // No device share and no credential: the retrieved share waits for a
    // social pairing.
    assert_eq!(
        state,
        RestoreWalletState::RestoreSocial {
            device_share: None,
            inner: RestoreSocialState::SignIn {
                option: ward_flows::restore_social::RestoreSocialOption::Custom {
                    custom_share: fixtures::custom_share(),
                },
            },
        }
    );
}

#[tokio::test]
async fn test_restore_snapshot_round_trips_mid_path() {
    let harness = Harness::new();
    let engine = harness.restore_engine(Some(fixtures::device_share()));
    engine.submit(RestoreWalletEvent::RequireCustom).await.unwrap();
    engine.submit(enter_phone()).await.unwrap();

    let state = engine.state().await;
    let json = serde_json::to_string(&state).unwrap();
    let back: RestoreWalletState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);

    // Resuming from the checkpoint before the OTP phase is safe; the OTP
    // sojourn itself is not.
    assert!(!state.continuable());
    let menu = RestoreWalletState::Restore {
        device_share: Some(fixtures::device_share()),
    };
    assert!(menu.continuable());
    let resumed = harness.restore_engine_at(menu);
    assert_eq!(resumed.state().await.step(), 100);
}
