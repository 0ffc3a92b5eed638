//! # kredo-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks of the credential protocol:
//!
//! - **Identity key material** ([`Identity`]): one 32-byte seed yields an
//!   Ed25519 signing pair and an independent X25519 encryption pair, the
//!   latter derived from a domain-separated hash of the seed.
//! - **Ed25519** signing and verification against an [`Address`](kredo_core::Address).
//! - **Asymmetric boxes**: X25519 key agreement plus AES-256-GCM.
//! - **BIP39** mnemonic generation and validation.
//! - **Salted hashing** of claim values and root-hash combination of
//!   hash-tree leaves.
//!
//! ## Crate Policy
//!
//! - Depends only on `kredo-core` internally.
//! - Private key material never implements `Serialize` and never appears in
//!   `Debug` output.
//! - No mocking of cryptographic operations in tests.

pub mod boxing;
pub mod ed25519;
pub mod error;
pub mod hashing;
pub mod identity;
pub mod mnemonic;

pub use boxing::{BoxKeyPair, BoxPublicKey};
pub use ed25519::{verify_with_address, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use hashing::{combine_leaves, generate_nonce, salted_digest};
pub use identity::{verify, Identity, IdentityOptions, PublicIdentity, Seed};
pub use mnemonic::{generate_mnemonic, validate_mnemonic, MIN_MNEMONIC_WORDS};
