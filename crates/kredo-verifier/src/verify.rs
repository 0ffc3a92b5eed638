//! # Presentation Verification
//!
//! Checks a claimer's answer against the verifier's retained
//! [`VerifierSession`].
//!
//! - **Classic**: one attested claim per slot, in order. Each must disclose
//!   at least the slot's requested paths, match the slot's CType if one was
//!   named, and pass [`AttestedClaim::verify`] including its legitimations.
//! - **Privacy-enhanced**: the proof is checked by the privacy backend with
//!   the session state, the attesters' latest accumulators and public keys.
//!
//! An answer must come from the session's claimer, be addressed to the
//! session's verifier and reply to the session's request message.
//!
//! A presentation that does not hold is `verified == false` with no
//! claims. All-or-nothing: one failing slot rejects the whole answer.
//! Errors are reserved for protocol misuse and ledger transport failures.

use kredo_attestation::Ledger;
use kredo_core::ProtocolConfig;
use kredo_vc::{AttestedClaim, VcError};
use kredo_zkp::{Accumulator, AttesterPublicKey, PePresentation, PrivacyBackend};
use serde_json::Value;

use crate::error::VerifierError;
use crate::message::{ClaimRequest, Message, MessageBody};
use crate::session::VerifierSession;

/// A claim the verifier learned from a verified presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum DisclosedClaim {
    Classic(AttestedClaim),
    /// The partial claim revealed by a privacy-enhanced proof.
    PrivacyEnhanced(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub claims: Vec<DisclosedClaim>,
}

impl VerificationOutcome {
    pub fn rejected() -> Self {
        Self {
            verified: false,
            claims: Vec::new(),
        }
    }
}

/// The collaborators a verifier checks presentations against.
#[derive(Clone, Copy)]
pub struct PresentationVerifier<'a> {
    pub ledger: &'a dyn Ledger,
    pub backend: &'a dyn PrivacyBackend,
    pub config: &'a ProtocolConfig,
}

impl<'a> PresentationVerifier<'a> {
    pub fn new(
        ledger: &'a dyn Ledger,
        backend: &'a dyn PrivacyBackend,
        config: &'a ProtocolConfig,
    ) -> Self {
        Self {
            ledger,
            backend,
            config,
        }
    }

    /// Verify the claimer's answer to `session`.
    ///
    /// `accumulators` and `attester_keys` are only consulted for
    /// privacy-enhanced answers, where both must be present, non-empty and
    /// decodable by the backend.
    pub fn verify_presentation(
        &self,
        message: &Message,
        session: &VerifierSession,
        accumulators: Option<&[Accumulator]>,
        attester_keys: Option<&[AttesterPublicKey]>,
    ) -> Result<VerificationOutcome, VerifierError> {
        if !matches!(
            message.body,
            MessageBody::SubmitClaimsForCTypesClassic(_) | MessageBody::SubmitClaimsForCTypesPe(_)
        ) {
            return Err(VerifierError::UnsupportedMessageType {
                actual: message.kind(),
            });
        }
        if !Self::answers_session(message, session) {
            return Ok(VerificationOutcome::rejected());
        }
        match &message.body {
            MessageBody::SubmitClaimsForCTypesClassic(claims) => self.verify_classic(claims, session),
            MessageBody::SubmitClaimsForCTypesPe(presentation) => {
                self.verify_privacy_enhanced(presentation, session, accumulators, attester_keys)
            }
            other => Err(VerifierError::UnsupportedMessageType {
                actual: other.kind(),
            }),
        }
    }

    fn answers_session(message: &Message, session: &VerifierSession) -> bool {
        if &message.sender != session.claimer() {
            tracing::warn!(
                sender = %message.sender,
                expected = %session.claimer(),
                "presentation from unexpected sender"
            );
            return false;
        }
        if &message.receiver != session.verifier() {
            tracing::warn!(
                receiver = %message.receiver,
                expected = %session.verifier(),
                "presentation addressed to another verifier"
            );
            return false;
        }
        if message.in_reply_to.as_deref() != Some(session.request_id()) {
            tracing::warn!(
                in_reply_to = ?message.in_reply_to,
                request_id = session.request_id(),
                "presentation answers another request"
            );
            return false;
        }
        true
    }

    fn verify_classic(
        &self,
        claims: &[AttestedClaim],
        session: &VerifierSession,
    ) -> Result<VerificationOutcome, VerifierError> {
        let requests = session.requests();
        if claims.len() != requests.len() {
            tracing::warn!(
                expected = requests.len(),
                got = claims.len(),
                "presentation slot count mismatch"
            );
            return Ok(VerificationOutcome::rejected());
        }
        for (slot, (claim, request)) in claims.iter().zip(requests).enumerate() {
            if !self.verify_slot(slot, claim, request, session)? {
                return Ok(VerificationOutcome::rejected());
            }
        }
        tracing::info!(slots = claims.len(), "classic presentation verified");
        Ok(VerificationOutcome {
            verified: true,
            claims: claims.iter().cloned().map(DisclosedClaim::Classic).collect(),
        })
    }

    fn verify_slot(
        &self,
        slot: usize,
        claim: &AttestedClaim,
        request: &ClaimRequest,
        session: &VerifierSession,
    ) -> Result<bool, VerifierError> {
        let disclosed = claim.disclosed_paths();
        if let Some(missing) = request.properties.iter().find(|p| !disclosed.contains(*p)) {
            tracing::warn!(slot, path = %missing, "requested property not disclosed");
            return Ok(false);
        }
        if let Some(expected) = &request.ctype_hash {
            if &claim.request.claim.ctype_hash != expected {
                tracing::warn!(slot, %expected, "presented claim has another CType");
                return Ok(false);
            }
        }
        match &claim.request.claim.owner {
            Some(owner) if owner == session.claimer() => {}
            Some(owner) => {
                tracing::warn!(slot, %owner, "presented claim belongs to someone else");
                return Ok(false);
            }
            None => {
                tracing::warn!(slot, "presented claim withholds its owner");
                return Ok(false);
            }
        }
        match claim.verify(self.ledger, self.config) {
            Ok(verified) => Ok(verified),
            Err(VcError::Ledger(e)) => Err(VerifierError::Ledger(e)),
            Err(e) => {
                tracing::warn!(slot, error = %e, "presented claim rejected");
                Ok(false)
            }
        }
    }

    fn verify_privacy_enhanced(
        &self,
        presentation: &PePresentation,
        session: &VerifierSession,
        accumulators: Option<&[Accumulator]>,
        attester_keys: Option<&[AttesterPublicKey]>,
    ) -> Result<VerificationOutcome, VerifierError> {
        if !session.allows_privacy_enhancement() {
            return Err(VerifierError::MessageTypeError);
        }
        let (accumulators, attester_keys) = match (
            accumulators.filter(|a| !a.is_empty()),
            attester_keys.filter(|k| !k.is_empty()),
        ) {
            (Some(a), Some(k)) => (a, k),
            (a, k) => {
                return Err(VerifierError::PrivacyEnhancementVerificationError {
                    missing_accumulators: a.is_none(),
                    missing_keys: k.is_none(),
                })
            }
        };
        // Inputs the backend cannot decode count as missing.
        let malformed_accumulators = self.backend.validate_accumulators(accumulators).is_err();
        let malformed_keys = self.backend.validate_attester_keys(attester_keys).is_err();
        if malformed_accumulators || malformed_keys {
            tracing::warn!(
                backend = self.backend.backend_name(),
                malformed_accumulators,
                malformed_keys,
                "privacy-enhanced verification inputs have the wrong shape"
            );
            return Err(VerifierError::PrivacyEnhancementVerificationError {
                missing_accumulators: malformed_accumulators,
                missing_keys: malformed_keys,
            });
        }

        match self.backend.verify_combined_presentation(
            presentation,
            session.pe_session(),
            accumulators,
            attester_keys,
        ) {
            Ok(result) if result.verified => {
                tracing::info!(
                    backend = self.backend.backend_name(),
                    slots = result.claims.len(),
                    "privacy-enhanced presentation verified"
                );
                Ok(VerificationOutcome {
                    verified: true,
                    claims: result
                        .claims
                        .into_iter()
                        .map(DisclosedClaim::PrivacyEnhanced)
                        .collect(),
                })
            }
            Ok(_) => Ok(VerificationOutcome::rejected()),
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.backend_name(),
                    error = %e,
                    "privacy-enhanced presentation rejected"
                );
                Ok(VerificationOutcome::rejected())
            }
        }
    }
}
