//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Bytes do not form a valid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Signature encoding is malformed.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Mnemonic has too few words or fails its checksum.
    #[error("invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),

    /// Authenticated encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Ciphertext could not be opened (wrong key, truncated, or tampered).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A value could not be canonicalized for hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] kredo_core::CanonicalizationError),
}
