//! Canonical request signing for the phone-verification gateway.
//!
//! Every gateway call is signed over a canonical byte encoding of its
//! payload, never over a serde-derived encoding: each payload declares its
//! fields in a fixed order, the fields are rendered as `name=value` lines,
//! and the signature is recoverable secp256k1 ECDSA over the Keccak-256
//! digest of those bytes. The signature binds the phone number, the wallet's
//! public identifiers, and the delivery channel, so the backend can reject
//! replays against other accounts.

use crate::types::{EthAddress, PrivateKey};
use secp256k1::{Message, Secp256k1, SecretKey};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Signing failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The private key bytes are not a valid secp256k1 scalar.
    #[error("invalid signing key: {message}")]
    InvalidKey {
        /// Reason reported by the curve library.
        message: String,
    },
}

/// A payload with a canonical, order-stable byte encoding.
///
/// Implementors list their fields in the contractually fixed order; the
/// rendered form is one `name=value` line per field, newline-joined.
pub trait CanonicalPayload: Serialize + DeserializeOwned {
    /// Fields in canonical order, rendered as strings.
    fn canonical_fields(&self) -> Vec<(&'static str, String)>;

    /// The canonical bytes signatures are computed over.
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (name, value) in self.canonical_fields() {
            out.push_str(name);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        out.into_bytes()
    }
}

/// A payload plus the hex-encoded recoverable signature over its canonical
/// bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedRequest<T> {
    /// The request payload.
    pub payload: T,
    /// 65-byte `r || s || v` signature, hex encoded.
    pub signature: String,
}

/// Signs gateway payloads with one wallet identity.
///
/// Create-wallet flows sign with the key produced at signup; restore flows
/// sign with a caller-supplied ephemeral identity, since no account key
/// exists until reconstruction succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSigner {
    private_key: PrivateKey,
    eth_address: EthAddress,
}

impl RequestSigner {
    /// Build a signer from a key and its address.
    pub fn new(private_key: PrivateKey, eth_address: EthAddress) -> Self {
        Self {
            private_key,
            eth_address,
        }
    }

    /// Address of the signing identity, embedded in every payload.
    pub fn eth_address(&self) -> &EthAddress {
        &self.eth_address
    }

    /// Sign `payload` over its canonical bytes.
    pub fn sign<T: CanonicalPayload>(&self, payload: T) -> Result<SignedRequest<T>, SigningError> {
        let digest: [u8; 32] = Keccak256::digest(payload.canonical_bytes()).into();
        let secp = Secp256k1::signing_only();
        let key = SecretKey::from_slice(self.private_key.as_bytes()).map_err(|e| {
            SigningError::InvalidKey {
                message: e.to_string(),
            }
        })?;
        let signature = secp.sign_ecdsa_recoverable(&Message::from_digest(digest), &key);
        let (recovery_id, compact) = signature.serialize_compact();
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = recovery_id.to_i32() as u8;
        Ok(SignedRequest {
            payload,
            signature: hex::encode(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Probe {
        phone: String,
        channel: String,
    }

    impl CanonicalPayload for Probe {
        fn canonical_fields(&self) -> Vec<(&'static str, String)> {
            vec![
                ("phone", self.phone.clone()),
                ("channel", self.channel.clone()),
            ]
        }
    }

    fn signer() -> RequestSigner {
        RequestSigner::new(
            PrivateKey::from_bytes([11u8; 32]),
            EthAddress::new("0x00000000000000000000000000000000000000aa"),
        )
    }

    #[test]
    fn canonical_bytes_are_order_stable() {
        let probe = Probe {
            phone: "+15550001111".into(),
            channel: "sms".into(),
        };
        assert_eq!(
            probe.canonical_bytes(),
            b"phone=+15550001111\nchannel=sms\n".to_vec()
        );
    }

    #[test]
    fn signature_is_deterministic_for_same_payload() {
        let probe = Probe {
            phone: "+15550001111".into(),
            channel: "sms".into(),
        };
        let a = signer().sign(probe.clone()).unwrap();
        let b = signer().sign(probe).unwrap();
        assert_eq!(a.signature, b.signature);
        assert_eq!(a.signature.len(), 130);
    }

    #[test]
    fn different_payloads_sign_differently() {
        let sms = Probe {
            phone: "+15550001111".into(),
            channel: "sms".into(),
        };
        let call = Probe {
            channel: "call".into(),
            ..sms.clone()
        };
        let a = signer().sign(sms).unwrap();
        let b = signer().sign(call).unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn zeroed_key_is_rejected() {
        let bad = RequestSigner::new(PrivateKey::from_bytes([0u8; 32]), EthAddress::new("0x00"));
        let probe = Probe {
            phone: "+1".into(),
            channel: "sms".into(),
        };
        assert!(matches!(
            bad.sign(probe),
            Err(SigningError::InvalidKey { .. })
        ));
    }
}
