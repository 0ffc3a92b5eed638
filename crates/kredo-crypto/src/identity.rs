//! # Identity Key Material
//!
//! One 32-byte [`Seed`] yields two independent key pairs:
//!
//! - an Ed25519 signing pair, seeded directly;
//! - an X25519 encryption pair, seeded with `SHA-256(seed ‖ BOX_DOMAIN)`.
//!
//! With [`IdentityOptions::privacy_enhanced`] a third secret,
//! `SHA-256(seed ‖ PRIVACY_DOMAIN)`, is derived for the privacy-enhancement
//! backend.
//!
//! ## Security Invariant
//!
//! The encryption seed is never the signing seed. Each derived secret uses
//! its own domain constant so compromise of one key does not expose another
//! or the seed itself.

use kredo_core::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::boxing::{BoxKeyPair, BoxPublicKey};
use crate::ed25519::{verify_with_address, Ed25519KeyPair, Ed25519Signature};
use crate::error::CryptoError;
use crate::mnemonic::{generate_mnemonic, mnemonic_to_seed};

/// The secret all identity key material is derived from.
pub type Seed = [u8; 32];

const BOX_DOMAIN: &[u8] = b"kredo/identity/box-keypair/v1";
const PRIVACY_DOMAIN: &[u8] = b"kredo/identity/privacy-secret/v1";

/// Construction options for [`Identity`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityOptions {
    /// Derive a claimer secret for privacy-enhanced credentials.
    pub privacy_enhanced: bool,
}

/// A signing and encryption identity. Immutable once constructed.
pub struct Identity {
    signing: Ed25519KeyPair,
    boxing: BoxKeyPair,
    address: Address,
    privacy_secret: Option<Zeroizing<[u8; 32]>>,
}

/// The shareable half of an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub address: Address,
    pub box_public_key: BoxPublicKey,
}

impl Identity {
    /// Build an identity without privacy enhancement.
    pub fn from_seed(seed: Seed) -> Self {
        Self::from_seed_with_options(seed, IdentityOptions::default())
    }

    pub fn from_seed_with_options(seed: Seed, options: IdentityOptions) -> Self {
        let seed = Zeroizing::new(seed);
        let signing = Ed25519KeyPair::from_seed(&seed);
        let boxing = BoxKeyPair::from_seed(*derive(&seed, BOX_DOMAIN));
        let address = signing.public_key().to_address();
        let privacy_secret = options
            .privacy_enhanced
            .then(|| derive(&seed, PRIVACY_DOMAIN));
        tracing::debug!(%address, privacy = options.privacy_enhanced, "identity derived");
        Self {
            signing,
            boxing,
            address,
            privacy_secret,
        }
    }

    /// Build an identity from a BIP39 phrase.
    ///
    /// Fails with [`CryptoError::InvalidSeedPhrase`] for phrases shorter
    /// than 12 words or with a bad checksum.
    pub fn from_mnemonic(phrase: &str) -> Result<Self, CryptoError> {
        Self::from_mnemonic_with_options(phrase, IdentityOptions::default())
    }

    pub fn from_mnemonic_with_options(
        phrase: &str,
        options: IdentityOptions,
    ) -> Result<Self, CryptoError> {
        let seed = mnemonic_to_seed(phrase)?;
        Ok(Self::from_seed_with_options(*seed, options))
    }

    /// A fresh identity together with the 12-word phrase that restores it.
    pub fn generate(options: IdentityOptions) -> Result<(Self, Zeroizing<String>), CryptoError> {
        let phrase = Zeroizing::new(generate_mnemonic()?);
        let identity = Self::from_mnemonic_with_options(&phrase, options)?;
        Ok((identity, phrase))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn box_public_key(&self) -> BoxPublicKey {
        self.boxing.public_key()
    }

    pub fn public_identity(&self) -> PublicIdentity {
        PublicIdentity {
            address: self.address,
            box_public_key: self.boxing.public_key(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.signing.sign(message)
    }

    pub fn encrypt_asymmetric(
        &self,
        plaintext: &[u8],
        peer: &BoxPublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        self.boxing.encrypt(plaintext, peer)
    }

    pub fn decrypt_asymmetric(
        &self,
        ciphertext: &[u8],
        peer: &BoxPublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        self.boxing.decrypt(ciphertext, peer)
    }

    /// The claimer secret for the privacy-enhancement backend, if enabled.
    pub fn privacy_secret(&self) -> Option<&[u8; 32]> {
        self.privacy_secret.as_deref()
    }

    pub fn is_privacy_enabled(&self) -> bool {
        self.privacy_secret.is_some()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("privacy_enabled", &self.is_privacy_enabled())
            .finish_non_exhaustive()
    }
}

/// Whether `signature` over `message` was produced by `address`.
pub fn verify(message: &[u8], signature: &Ed25519Signature, address: &Address) -> bool {
    verify_with_address(message, signature, address).is_ok()
}

fn derive(seed: &[u8; 32], domain: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(domain);
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&hasher.finalize());
    out
}
