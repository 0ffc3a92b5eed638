//! # Ed25519 Signing and Verification
//!
//! Signing keys for claimers, attesters and verifiers. A claimer signs the
//! root hash of its request for attestation; every party signs the ledger
//! transactions it submits and the messages it sends.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize` and its `Debug` output is redacted.
//! - A signature is checked against an [`Address`], which encodes the signer's
//!   public key, so no key registry lookup is needed.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as `0x`-prefixed hex strings.

use ed25519_dalek::{Signer, Verifier};
use kredo_core::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// The raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The address this public key is known by.
    pub fn to_address(&self) -> Address {
        Address::from_public_key_bytes(self.0)
    }

    /// Recover the public key encoded in an address.
    pub fn from_address(address: &Address) -> Self {
        Self(*address.public_key_bytes())
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// The raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from `0x`-prefixed hex (128 hex characters after the prefix).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| CryptoError::InvalidSignature("missing 0x prefix".to_string()))?;
        if body.len() != 128 {
            return Err(CryptoError::InvalidSignature(format!(
                "signature hex must be 128 chars, got {}",
                body.len()
            )));
        }
        let mut arr = [0u8; 64];
        hex::decode_to_slice(body, &mut arr)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex::encode(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Derive a key pair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify a signature over `message` by the identity known as `address`.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::VerificationFailed)` if the
/// signature does not match, `Err(CryptoError::InvalidPublicKey)` if the
/// address does not encode a curve point.
pub fn verify_with_address(
    message: &[u8],
    signature: &Ed25519Signature,
    address: &Address,
) -> Result<(), CryptoError> {
    let vk = Ed25519PublicKey::from_address(address).to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(message, &sig)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_against_address() {
        let kp = Ed25519KeyPair::generate();
        let addr = kp.public_key().to_address();
        let sig = kp.sign(b"root hash bytes");
        verify_with_address(b"root hash bytes", &sig, &addr).expect("valid signature");
    }

    #[test]
    fn wrong_signer_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let sig = kp1.sign(b"message");
        let result = verify_with_address(b"message", &sig, &kp2.public_key().to_address());
        assert!(matches!(result, Err(CryptoError::VerificationFailed(_))));
    }

    #[test]
    fn tampered_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"original");
        let addr = kp.public_key().to_address();
        assert!(verify_with_address(b"tampered", &sig, &addr).is_err());
    }

    #[test]
    fn deterministic_from_seed() {
        let a = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let b = Ed25519KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.sign(b"x"), b.sign(b"x"));
    }

    #[test]
    fn signature_serde_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"payload");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 2 + 2 + 128);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn malformed_signature_hex_rejected() {
        assert!(Ed25519Signature::from_hex("0xabcd").is_err());
        assert!(Ed25519Signature::from_hex(&"ab".repeat(64)).is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
