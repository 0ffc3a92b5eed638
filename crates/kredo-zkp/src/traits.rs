//! # Privacy Backend Trait
//!
//! The capability interface the credential protocol calls for privacy-enhanced
//! attestation and disclosure. Implementations must be `Send + Sync` and
//! object-safe so that a verifier or claimer can hold a
//! `&dyn PrivacyBackend` chosen at runtime.
//!
//! ## Flow
//!
//! ```text
//! attester: initiate_attestation ──▶ claimer: request_attestation
//!                                            │
//! attester: issue_attestation ◀──────────────┘
//!        │
//!        └──▶ claimer: build_credential ──▶ (long-lived PeCredential)
//!
//! verifier: request_builder ─▶ request_presentation* ─▶ finalize ─▶ (PeSession, PeRequest)
//! claimer:  build_presentation(PeRequest) ─▶ PePresentation
//! verifier: verify_combined_presentation(PePresentation, PeSession, accumulators, keys)
//! ```

use kredo_core::Timestamp;
use serde_json::Value;

use crate::error::ZkError;
use crate::types::{
    Accumulator, AttesterPrivateKey, AttesterPublicKey, PeAttestation, PeAttestationRequest,
    PeAttesterSession, PeClaimerSession, PeCredential, PeInitiateAttestation, PePresentation,
    PeRequest, PeSession, PeVerification, Witness,
};

/// One schema-scoped part of a combined presentation request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialPresentationRequest {
    /// Absolute property paths, e.g. `contents.name` or `ctypeHash`.
    pub requested_attributes: Vec<String>,
    /// Reject credentials whose revocation state predates this instant.
    pub updated_after: Option<Timestamp>,
}

/// Verifier-side builder of a combined presentation request. Single use.
pub trait CombinedRequestBuilder: Send {
    fn request_presentation(&mut self, request: PartialPresentationRequest);

    /// Number of sub-requests added so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Conclude the request: private session state plus the message for
    /// the claimer.
    fn finalize(self: Box<Self>) -> Result<(PeSession, PeRequest), ZkError>;
}

/// Zero-knowledge credential capability.
pub trait PrivacyBackend: Send + Sync {
    /// Human-readable name of this backend.
    fn backend_name(&self) -> &str;

    /// Derive an attester's issuing key pair from a secret seed.
    fn generate_attester_keys(
        &self,
        seed: &[u8; 32],
    ) -> Result<(AttesterPublicKey, AttesterPrivateKey), ZkError>;

    /// A fresh, empty revocation accumulator for an attester.
    fn create_accumulator(&self, attester: &AttesterPrivateKey) -> Result<Accumulator, ZkError>;

    fn initiate_attestation(
        &self,
        attester: &AttesterPrivateKey,
    ) -> Result<(PeAttesterSession, PeInitiateAttestation), ZkError>;

    /// Claimer answers the attester's initiation for `claim`.
    fn request_attestation(
        &self,
        claimer_secret: &[u8; 32],
        claim: &Value,
        initiation: &PeInitiateAttestation,
        attester: &AttesterPublicKey,
    ) -> Result<(PeClaimerSession, PeAttestationRequest), ZkError>;

    /// Attester signs the requested claim and registers it in `accumulator`.
    fn issue_attestation(
        &self,
        attester: &AttesterPrivateKey,
        session: &PeAttesterSession,
        request: &PeAttestationRequest,
        accumulator: &Accumulator,
    ) -> Result<(PeAttestation, Witness), ZkError>;

    /// Claimer turns an issued attestation into a credential.
    fn build_credential(
        &self,
        claimer_secret: &[u8; 32],
        session: &PeClaimerSession,
        attestation: &PeAttestation,
    ) -> Result<PeCredential, ZkError>;

    /// Revoke the credential identified by `witness`; returns the new
    /// accumulator state.
    fn revoke_attestation(
        &self,
        attester: &AttesterPrivateKey,
        accumulator: &Accumulator,
        witness: &Witness,
    ) -> Result<Accumulator, ZkError>;

    /// Refresh a credential against the latest accumulator. Fails
    /// with [`ZkError::CredentialRevoked`] once revoked.
    fn update_credential(
        &self,
        credential: &PeCredential,
        accumulator: &Accumulator,
    ) -> Result<PeCredential, ZkError>;

    fn request_builder(&self) -> Box<dyn CombinedRequestBuilder>;

    /// Build a presentation answering `request`, one credential per
    /// sub-request in order.
    fn build_presentation(
        &self,
        claimer_secret: &[u8; 32],
        credentials: &[PeCredential],
        request: &PeRequest,
        attester_keys: &[AttesterPublicKey],
    ) -> Result<PePresentation, ZkError>;

    /// Check that every accumulator is one this backend can decode.
    fn validate_accumulators(&self, accumulators: &[Accumulator]) -> Result<(), ZkError>;

    /// Check that every attester key is one this backend can decode.
    fn validate_attester_keys(&self, attester_keys: &[AttesterPublicKey]) -> Result<(), ZkError>;

    /// Verify a presentation against the verifier's retained session.
    ///
    /// A proof that does not hold yields `verified == false`; errors are
    /// reserved for values this backend cannot decode.
    fn verify_combined_presentation(
        &self,
        presentation: &PePresentation,
        session: &PeSession,
        accumulators: &[Accumulator],
        attester_keys: &[AttesterPublicKey],
    ) -> Result<PeVerification, ZkError>;
}
