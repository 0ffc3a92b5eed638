//! # Asymmetric Boxes — X25519 + AES-256-GCM
//!
//! `encryptAsymmetric` / `decryptAsymmetric` for message transport between
//! identities. Both parties derive the same symmetric key from X25519 key
//! agreement; the shared secret is hashed with a domain tag before use.
//!
//! Ciphertext layout: `nonce (12 bytes) ‖ AES-256-GCM(plaintext) ‖ tag (16 bytes)`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::CryptoError;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const BOX_KDF_TAG: &[u8] = b"kredo/box/v1";

/// Public half of an encryption key pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxPublicKey(pub [u8; 32]);

/// X25519 encryption key pair.
pub struct BoxKeyPair {
    secret: x25519_dalek::StaticSecret,
    public: BoxPublicKey,
}

impl BoxPublicKey {
    /// Render as `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from `0x`-prefixed hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| CryptoError::InvalidPublicKey("missing 0x prefix".to_string()))?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(body, &mut out)
            .map_err(|e| CryptoError::InvalidPublicKey(format!("box key: {e}")))?;
        Ok(Self(out))
    }
}

impl std::fmt::Debug for BoxPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoxPublicKey({})", self.to_hex())
    }
}

impl Serialize for BoxPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BoxPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl BoxKeyPair {
    /// Derive an encryption key pair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let secret = x25519_dalek::StaticSecret::from(seed);
        let public = BoxPublicKey(x25519_dalek::PublicKey::from(&secret).to_bytes());
        Self { secret, public }
    }

    /// The public key peers encrypt to.
    pub fn public_key(&self) -> BoxPublicKey {
        self.public
    }

    /// Encrypt `plaintext` so that only the holder of `peer`'s secret can open it.
    pub fn encrypt(&self, plaintext: &[u8], peer: &BoxPublicKey) -> Result<Vec<u8>, CryptoError> {
        let key = self.shared_key(peer);
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Open a ciphertext produced by `peer` for this key pair.
    pub fn decrypt(&self, ciphertext: &[u8], peer: &BoxPublicKey) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("ciphertext too short".to_string()));
        }
        let key = self.shared_key(peer);
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;
        let (nonce, sealed) = ciphertext.split_at(NONCE_SIZE);
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| CryptoError::Decryption(e.to_string()))
    }

    fn shared_key(&self, peer: &BoxPublicKey) -> Zeroizing<[u8; 32]> {
        let shared = self
            .secret
            .diffie_hellman(&x25519_dalek::PublicKey::from(peer.0));
        let mut hasher = Sha256::new();
        hasher.update(BOX_KDF_TAG);
        hasher.update(shared.as_bytes());
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&hasher.finalize());
        key
    }
}

impl std::fmt::Debug for BoxKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoxKeyPair(public: {}, <private>)", self.public.to_hex())
    }
}
