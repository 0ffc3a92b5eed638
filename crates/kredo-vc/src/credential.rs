//! # Credentials
//!
//! The claimer's long-lived record of an attested request. A credential
//! owns an unredacted [`RequestForAttestation`], its [`Attestation`] and
//! optionally a privacy-enhanced credential from the zero-knowledge backend.
//! Presentations are derived, disposable copies.

use std::collections::BTreeSet;

use kredo_attestation::Attestation;
use kredo_crypto::Identity;
use kredo_zkp::{Accumulator, PeAttestation, PeClaimerSession, PeCredential, PrivacyBackend};
use serde::{Deserialize, Serialize};

use crate::attested::AttestedClaim;
use crate::error::VcError;
use crate::request::RequestForAttestation;

/// Inputs for building the privacy-enhanced half of a credential.
#[derive(Clone, Copy)]
pub struct PrivacyEnhancedIssuance<'a> {
    pub backend: &'a dyn PrivacyBackend,
    pub session: &'a PeClaimerSession,
    pub attestation: &'a PeAttestation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    request: RequestForAttestation,
    attestation: Attestation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    privacy_enhanced: Option<PeCredential>,
}

impl Credential {
    /// Assemble a credential for `claimer`.
    ///
    /// The stored request is a copy with its privacy-enhancement slot
    /// cleared. With `privacy`, the backend builds the privacy-enhanced
    /// credential from the claimer's privacy secret; an identity without one
    /// fails with [`VcError::IdentityNotPrivacyEnabled`].
    pub fn from_request_and_attestation(
        claimer: &Identity,
        request: &RequestForAttestation,
        attestation: Attestation,
        privacy: Option<PrivacyEnhancedIssuance<'_>>,
    ) -> Result<Self, VcError> {
        if let Some(owner) = &request.claim.owner {
            if owner != claimer.address() {
                return Err(VcError::OwnerMismatch {
                    claim_owner: *owner,
                    identity: *claimer.address(),
                });
            }
        }
        if attestation.claim_hash != request.root_hash {
            return Err(VcError::AttestationMismatch {
                attested: attestation.claim_hash,
                request: request.root_hash,
            });
        }

        let privacy_enhanced = match privacy {
            None => None,
            Some(issuance) => {
                let secret = claimer
                    .privacy_secret()
                    .ok_or(VcError::IdentityNotPrivacyEnabled)?;
                Some(
                    issuance
                        .backend
                        .build_credential(secret, issuance.session, issuance.attestation)?,
                )
            }
        };

        let mut request = request.clone();
        request.privacy_enhancement = None;
        Ok(Self {
            request,
            attestation,
            privacy_enhanced,
        })
    }

    pub fn request(&self) -> &RequestForAttestation {
        &self.request
    }

    pub fn attestation(&self) -> &Attestation {
        &self.attestation
    }

    pub fn privacy_enhanced(&self) -> Option<&PeCredential> {
        self.privacy_enhanced.as_ref()
    }

    /// The unredacted attested claim.
    pub fn attested_claim(&self) -> AttestedClaim {
        AttestedClaim::new(self.request.clone(), self.attestation.clone())
    }

    /// Field names a presentation disclosing `public_attributes` withholds.
    pub fn hidden_attributes<S: AsRef<str>>(&self, public_attributes: &[S]) -> BTreeSet<String> {
        self.request
            .claim
            .contents
            .keys()
            .filter(|k| !public_attributes.iter().any(|p| p.as_ref() == k.as_str()))
            .cloned()
            .collect()
    }

    /// A redacted presentation disclosing only `public_attributes`, and the
    /// owner unless `exclude_identity`. The credential is untouched.
    pub fn create_presentation<S: AsRef<str>>(
        &self,
        public_attributes: &[S],
        exclude_identity: bool,
    ) -> AttestedClaim {
        let hidden = self.hidden_attributes(public_attributes);
        tracing::debug!(
            root_hash = %self.request.root_hash,
            hidden = hidden.len(),
            exclude_identity,
            "presentation created"
        );
        AttestedClaim::new(
            self.request.redact(public_attributes, exclude_identity),
            self.attestation.clone(),
        )
    }

    /// A copy whose privacy-enhanced credential is refreshed against the
    /// attester's latest accumulator.
    pub fn refresh_privacy_enhanced(
        &self,
        backend: &dyn PrivacyBackend,
        accumulator: &Accumulator,
    ) -> Result<Self, VcError> {
        let pe = self
            .privacy_enhanced
            .as_ref()
            .ok_or(VcError::IdentityNotPrivacyEnabled)?;
        Ok(Self {
            privacy_enhanced: Some(backend.update_credential(pe, accumulator)?),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use kredo_core::ContentDigest;
    use kredo_crypto::IdentityOptions;
    use kredo_zkp::MockPrivacyBackend;
    use serde_json::json;

    fn claim_for(identity: &Identity) -> Claim {
        Claim {
            ctype_hash: ContentDigest::from_bytes([7u8; 32]),
            contents: [
                ("name".to_string(), json!("Ralph")),
                ("age".to_string(), json!(12)),
            ]
            .into_iter()
            .collect(),
            owner: *identity.address(),
        }
    }

    fn attester() -> Identity {
        Identity::from_seed([9u8; 32])
    }

    #[test]
    fn presentation_is_a_disposable_view() {
        let claimer = Identity::from_seed([1u8; 32]);
        let request = RequestForAttestation::build(&claim_for(&claimer), &claimer, vec![], None).unwrap();
        let attestation = Attestation::create(&request, &attester().public_identity(), None);
        let credential =
            Credential::from_request_and_attestation(&claimer, &request, attestation, None).unwrap();

        let presentation = credential.create_presentation::<&str>(&[], false);
        assert!(presentation.request.claim.contents.is_empty());
        assert!(presentation.request.claim.owner.is_some());
        presentation.request.verify_data().unwrap();

        assert_eq!(credential.request().claim.contents.len(), 2);
        assert_eq!(
            credential.hidden_attributes(&["name"]),
            ["age".to_string()].into_iter().collect()
        );
    }

    #[test]
    fn attestation_must_match_request() {
        let claimer = Identity::from_seed([1u8; 32]);
        let request = RequestForAttestation::build(&claim_for(&claimer), &claimer, vec![], None).unwrap();
        let other = RequestForAttestation::build(&claim_for(&claimer), &claimer, vec![], None).unwrap();
        let attestation = Attestation::create(&other, &attester().public_identity(), None);
        assert!(matches!(
            Credential::from_request_and_attestation(&claimer, &request, attestation, None),
            Err(VcError::AttestationMismatch { .. })
        ));
    }

    fn pe_issuance(
        backend: &MockPrivacyBackend,
        claimer: &Identity,
        claim: &Claim,
    ) -> (PeClaimerSession, PeAttestation, kredo_zkp::PeAttestationRequest) {
        let (public, private) = backend.generate_attester_keys(&[9u8; 32]).unwrap();
        let accumulator = backend.create_accumulator(&private).unwrap();
        let (attester_session, init) = backend.initiate_attestation(&private).unwrap();
        let secret = claimer.privacy_secret().copied().unwrap_or([0u8; 32]);
        let (session, pe_request) = backend
            .request_attestation(&secret, &serde_json::to_value(claim).unwrap(), &init, &public)
            .unwrap();
        let (pe_attestation, _) = backend
            .issue_attestation(&private, &attester_session, &pe_request, &accumulator)
            .unwrap();
        (session, pe_attestation, pe_request)
    }

    #[test]
    fn privacy_enhanced_credential_needs_capable_identity() {
        let backend = MockPrivacyBackend::new();
        let plain = Identity::from_seed([1u8; 32]);
        let claim = claim_for(&plain);
        let (session, pe_attestation, _) = pe_issuance(&backend, &plain, &claim);
        let request = RequestForAttestation::build(&claim, &plain, vec![], None).unwrap();
        let attestation = Attestation::create(&request, &attester().public_identity(), None);

        let result = Credential::from_request_and_attestation(
            &plain,
            &request,
            attestation,
            Some(PrivacyEnhancedIssuance {
                backend: &backend,
                session: &session,
                attestation: &pe_attestation,
            }),
        );
        assert!(matches!(result, Err(VcError::IdentityNotPrivacyEnabled)));
    }

    #[test]
    fn privacy_enhanced_credential_clears_request_slot() {
        let backend = MockPrivacyBackend::new();
        let claimer = Identity::from_seed_with_options(
            [1u8; 32],
            IdentityOptions {
                privacy_enhanced: true,
            },
        );
        let claim = claim_for(&claimer);
        let (session, pe_attestation, pe_request) = pe_issuance(&backend, &claimer, &claim);
        let request = RequestForAttestation::build(&claim, &claimer, vec![], None)
            .unwrap()
            .with_privacy_enhancement(pe_request);
        let attestation = Attestation::create(&request, &attester().public_identity(), None);

        let credential = Credential::from_request_and_attestation(
            &claimer,
            &request,
            attestation,
            Some(PrivacyEnhancedIssuance {
                backend: &backend,
                session: &session,
                attestation: &pe_attestation,
            }),
        )
        .unwrap();
        assert!(credential.privacy_enhanced().is_some());
        assert!(credential.request().privacy_enhancement.is_none());
        assert!(request.privacy_enhancement.is_some());
    }
}
