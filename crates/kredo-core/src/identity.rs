//! # Protocol Identifier Newtypes
//!
//! `Address` identifies a signing identity (claimer, attester, verifier).
//! `DelegationId` identifies a node in an on-ledger delegation hierarchy.
//! Both reject malformed text at construction, so a bad identifier can
//! never reach the hashing or signing code.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::digest::ContentDigest;
use crate::error::ValidationError;

/// Public address of a signing identity.
///
/// The address is the `0x`-prefixed hex of the identity's 32-byte Ed25519
/// public key, so a signature can be checked against an address alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    /// Build an address from a raw Ed25519 public key.
    pub fn from_public_key_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw public key bytes this address encodes.
    pub fn public_key_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse an address from its `0x`-prefixed hex form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::InvalidAddress(s.to_string()))?;
        if body.len() != 64 {
            return Err(ValidationError::InvalidAddress(s.to_string()));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(body, &mut out)
            .map_err(|_| ValidationError::InvalidAddress(s.to_string()))?;
        Ok(Self(out))
    }

    /// Render the address as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a delegation node on the ledger.
///
/// Serialized like a [`ContentDigest`]; its 32 bytes become a root-hash leaf
/// when a request for attestation is bound to a delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelegationId(pub ContentDigest);

impl DelegationId {
    /// Generate a fresh random delegation identifier.
    pub fn generate() -> Self {
        let hash = Sha256::digest(Uuid::new_v4().as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(ContentDigest::from_bytes(bytes))
    }

    /// The underlying digest.
    pub fn as_digest(&self) -> &ContentDigest {
        &self.0
    }
}

impl std::fmt::Display for DelegationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
