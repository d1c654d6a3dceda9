//! Phone-verification gateway effect.
//!
//! The gateway dispatches OTPs and, on confirmation, releases the custom
//! share bound to the phone number. Responses are JSON-RPC shaped; the
//! numeric codes the flows consume live in `crate::codes::gateway`.

use crate::signing::{CanonicalPayload, SignedRequest};
use crate::types::{CustomShare, EthAddress, OtpChannel, PhoneNumber};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// JSON-RPC shaped error raised by the phone gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("gateway error {code}: {message}")]
pub struct GatewayError {
    /// Numeric code; see `crate::codes::gateway` for the consumed values.
    pub code: i64,
    /// Human-readable detail.
    pub message: String,
}

impl GatewayError {
    /// Build an error with the given code.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Payload of an OTP dispatch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPhonePayload {
    /// Number to bind or restore.
    pub phone_number: PhoneNumber,
    /// Requested delivery channel.
    pub channel: OtpChannel,
    /// Wallet identity the binding is for.
    pub eth_address: EthAddress,
}

impl CanonicalPayload for RegisterPhonePayload {
    fn canonical_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("phone_number", self.phone_number.as_str().to_owned()),
            ("channel", self.channel.as_str().to_owned()),
            ("eth_address", self.eth_address.as_str().to_owned()),
        ]
    }
}

/// Payload of an OTP confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOtpPayload {
    /// Number the OTP was dispatched to.
    pub phone_number: PhoneNumber,
    /// The code the user entered.
    pub otp_code: String,
    /// Wallet identity the binding is for.
    pub eth_address: EthAddress,
}

impl CanonicalPayload for ConfirmOtpPayload {
    fn canonical_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("phone_number", self.phone_number.as_str().to_owned()),
            ("otp_code", self.otp_code.clone()),
            ("eth_address", self.eth_address.as_str().to_owned()),
        ]
    }
}

/// Result of a successful OTP confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedPhone {
    /// Custom share released by the backend for this number.
    pub custom_share: CustomShare,
}

/// OTP dispatch and confirmation.
#[async_trait]
pub trait PhoneGatewayEffects: Send + Sync {
    /// Dispatch an OTP to the payload's number, binding or restoring it for
    /// the signing wallet.
    async fn register_or_restore(
        &self,
        request: &SignedRequest<RegisterPhonePayload>,
    ) -> Result<(), GatewayError>;

    /// Confirm a dispatched OTP and obtain the released custom share.
    async fn confirm(
        &self,
        request: &SignedRequest<ConfirmOtpPayload>,
    ) -> Result<ConfirmedPhone, GatewayError>;
}
