//! # kredo-core — Foundational Types
//!
//! The leaf of the kredo crate graph. Every other crate depends on
//! `kredo-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every digest that ends up in a claim hash
//!    tree, a root hash, or a signed ledger transaction is computed over
//!    `CanonicalBytes`. Claimer, attester and verifier therefore agree on the
//!    bytes of a value regardless of map ordering or whitespace.
//!
//! 2. **Newtypes for protocol identifiers.** `Address`, `DelegationId` and
//!    `ContentDigest` have validating constructors. Malformed input is
//!    rejected before any hashing or signing happens.
//!
//! 3. **Explicit configuration.** [`ProtocolConfig`] is passed into every
//!    verification entry point. There is no process-wide state.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] is second-precision UTC so that
//!    timestamps inside signed payloads canonicalize deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kredo-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod compress;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use config::{LedgerConfig, ProtocolConfig};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CompressionError, KredoError, ValidationError};
pub use identity::{Address, DelegationId};
pub use temporal::Timestamp;
