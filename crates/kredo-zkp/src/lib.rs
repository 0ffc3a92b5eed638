//! # kredo-zkp — Privacy-Enhanced Credentials
//!
//! The protocol treats the zero-knowledge credential library as an external
//! capability. This crate defines that capability and nothing of the proof
//! mathematics.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`PrivacyBackend`] covers attester key
//!   material, revocation accumulators, the attestation exchange, credential
//!   construction, combined presentation requests, presentations and their
//!   verification. [`CombinedRequestBuilder`] accumulates schema-scoped
//!   sub-requests on the verifier side.
//!
//! - **Types** (`types.rs`): opaque JSON-backed wire values. The protocol
//!   moves them around without looking inside.
//!
//! - **Mock** (`mock.rs`): [`MockPrivacyBackend`] is deterministic and
//!   **transparent**. It enforces the contract a real backend must honour
//!   (session-nonce binding, attester key checks, accumulator revocation,
//!   freshness) but hides nothing.
//!
//! ## Crate Policy
//!
//! - Depends only on `kredo-core` internally.
//! - Backends are `Send + Sync` and object-safe.
//! - No `unsafe` in the mock implementation.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::ZkError;
pub use mock::MockPrivacyBackend;
pub use traits::{CombinedRequestBuilder, PartialPresentationRequest, PrivacyBackend};
pub use types::{
    Accumulator, AttesterPrivateKey, AttesterPublicKey, PeAttestation, PeAttestationRequest,
    PeAttesterSession, PeClaimerSession, PeCredential, PeInitiateAttestation, PePresentation,
    PeRequest, PeSession, PeVerification, Witness,
};
