//! Numeric error-code tables owned by the remote backends.
//!
//! The flows branch on these codes; anything not named here is unclassified
//! and surfaces to the caller unchanged. The values are the backend contract
//! and are reproduced here as the single authority for the whole workspace.

/// Codes raised by the distributed-key service.
pub mod key_service {
    /// The social account already backs an existing wallet.
    ///
    /// During create this reroutes to an "account was used" prompt; during
    /// restore it means no reconstructable key was found for the credential.
    pub const ACCOUNT_ALREADY_USED: i64 = 1009;

    /// The supplied share does not match the account's key metadata.
    pub const SHARE_MISMATCH: i64 = 1019;

    /// True for the codes the restore paths treat as "nothing to reconstruct".
    pub fn is_not_found(code: i64) -> bool {
        matches!(code, ACCOUNT_ALREADY_USED | SHARE_MISMATCH)
    }
}

/// Codes raised by the phone-verification gateway.
///
/// Responses are JSON-RPC shaped; the two negative codes are standard
/// protocol errors, the positive codes are application-level.
pub mod gateway {
    /// Request signature missing, malformed, or signed by the wrong key.
    pub const INVALID_SIGNATURE: i64 = -32602;

    /// Server-internal failure.
    pub const INTERNAL: i64 = -32603;

    /// Phone number failed server-side format validation.
    pub const INVALID_PHONE: i64 = 1001;

    /// Submitted OTP does not match the dispatched one.
    pub const INVALID_OTP: i64 = 1002;

    /// Too many requests for this number; the caller must wait out a lockout.
    pub const RATE_LIMITED: i64 = 1003;

    /// No delivery channel could reach the number.
    pub const UNDELIVERABLE: i64 = 1004;

    /// The number is already bound to a different wallet.
    pub const NUMBER_IN_USE: i64 = 1005;

    /// OTP confirmed, but no wallet is bound to this number.
    pub const NO_MATCH: i64 = 1007;
}
