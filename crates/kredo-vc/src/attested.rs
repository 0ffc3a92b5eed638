//! # Attested Claims
//!
//! An [`AttestedClaim`] pairs a (possibly redacted) request for attestation
//! with the attestation vouching for it. It is both what a claimer presents
//! and what a request embeds as a legitimation.
//!
//! ## Verification
//!
//! [`AttestedClaim::verify`] is a predicate:
//!
//! 1. the request and every nested legitimation pass integrity checks,
//! 2. each attestation vouches for its request's root hash and CType,
//! 3. each attestation is present, matching and unrevoked on the ledger.
//!
//! Integrity or ledger-state failures yield `Ok(false)`. Chain-shape
//! violations (`LegitimationChainTooDeep`, `LegitimationCycle`) and ledger
//! transport failures are errors.

use std::collections::BTreeSet;

use kredo_attestation::{Attestation, Ledger};
use kredo_core::compress::expect_fields;
use kredo_core::{CompressionError, ContentDigest, ProtocolConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VcError;
use crate::request::RequestForAttestation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestedClaim {
    pub request: RequestForAttestation,
    pub attestation: Attestation,
}

impl AttestedClaim {
    pub fn new(request: RequestForAttestation, attestation: Attestation) -> Self {
        Self {
            request,
            attestation,
        }
    }

    /// Integrity of the request tree and its attestation bindings, without
    /// consulting the ledger.
    pub fn verify_data(&self, config: &ProtocolConfig) -> Result<(), VcError> {
        self.verify_data_at(config, 0, &mut Vec::new())
    }

    pub(crate) fn verify_data_at(
        &self,
        config: &ProtocolConfig,
        depth: usize,
        ancestors: &mut Vec<ContentDigest>,
    ) -> Result<(), VcError> {
        self.request.verify_data_at(config, depth, ancestors)?;
        if self.attestation.claim_hash != self.request.root_hash
            || self.attestation.ctype_hash != self.request.claim.ctype_hash
        {
            return Err(VcError::AttestationMismatch {
                attested: self.attestation.claim_hash,
                request: self.request.root_hash,
            });
        }
        Ok(())
    }

    /// Whether this claim and every legitimation beneath it is intact and
    /// currently attested on `ledger`.
    pub fn verify(&self, ledger: &dyn Ledger, config: &ProtocolConfig) -> Result<bool, VcError> {
        match self.verify_data(config) {
            Ok(()) => {}
            Err(e) if e.is_chain_error() => return Err(e),
            Err(e) => {
                tracing::warn!(root_hash = %self.request.root_hash, error = %e, "attested claim failed integrity check");
                return Ok(false);
            }
        }
        self.verify_attestations(ledger)
    }

    fn verify_attestations(&self, ledger: &dyn Ledger) -> Result<bool, VcError> {
        if !self.attestation.verify(ledger)? {
            return Ok(false);
        }
        for legitimation in &self.request.legitimations {
            if !legitimation.verify_attestations(ledger)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Names of the disclosed claim fields.
    pub fn get_attributes(&self) -> BTreeSet<String> {
        self.request.claim.contents.keys().cloned().collect()
    }

    /// Absolute property paths this presentation discloses.
    pub fn disclosed_paths(&self) -> BTreeSet<String> {
        let mut paths: BTreeSet<String> = self
            .request
            .claim
            .contents
            .keys()
            .map(|k| format!("contents.{k}"))
            .collect();
        paths.insert("ctypeHash".to_string());
        if self.request.claim.owner.is_some() {
            paths.insert("owner".to_string());
        }
        if !self.request.legitimations.is_empty() {
            paths.insert("legitimations".to_string());
        }
        if self.request.delegation_id.is_some() {
            paths.insert("delegationId".to_string());
        }
        paths
    }

    /// `[request, attestation]`
    pub fn compress(&self) -> Result<Value, CompressionError> {
        Ok(Value::Array(vec![
            self.request.compress()?,
            self.attestation.compress()?,
        ]))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        let [request, attestation] = expect_fields::<2>("attested claim", value)?;
        Ok(Self {
            request: RequestForAttestation::decompress(request)?,
            attestation: Attestation::decompress(attestation)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use kredo_attestation::{InMemoryLedger, SignedTransaction, Transaction};
    use kredo_crypto::Identity;
    use serde_json::json;

    struct World {
        ledger: InMemoryLedger,
        attester: Identity,
        claimer: Identity,
        ctype_hash: ContentDigest,
    }

    fn world() -> World {
        let ledger = InMemoryLedger::new();
        let attester = Identity::from_seed([1u8; 32]);
        let ctype_hash = ContentDigest::from_bytes([7u8; 32]);
        ledger
            .submit(&SignedTransaction::sign(Transaction::AddCType { ctype_hash }, &attester).unwrap())
            .unwrap();
        World {
            ledger,
            attester,
            claimer: Identity::from_seed([2u8; 32]),
            ctype_hash,
        }
    }

    fn attested(w: &World, legitimations: Vec<AttestedClaim>, value: i64) -> AttestedClaim {
        let claim = Claim {
            ctype_hash: w.ctype_hash,
            contents: [("level".to_string(), json!(value))].into_iter().collect(),
            owner: *w.claimer.address(),
        };
        let request = RequestForAttestation::build(&claim, &w.claimer, legitimations, None).unwrap();
        let attestation = Attestation::create(&request, &w.attester.public_identity(), None);
        w.ledger.submit(&attestation.store(&w.attester).unwrap()).unwrap();
        AttestedClaim::new(request, attestation)
    }

    fn chain(w: &World, depth: usize) -> AttestedClaim {
        let mut current = attested(w, vec![], 0);
        for level in 1..=depth {
            current = attested(w, vec![current], level as i64);
        }
        current
    }

    #[test]
    fn attested_claim_verifies_until_revoked() {
        let w = world();
        let ac = attested(&w, vec![], 1);
        let config = ProtocolConfig::default();
        assert!(ac.verify(&w.ledger, &config).unwrap());

        w.ledger
            .submit(&Attestation::revoke(ac.attestation.claim_hash, &w.attester).unwrap())
            .unwrap();
        assert!(!ac.verify(&w.ledger, &config).unwrap());
        assert!(!ac.verify(&w.ledger, &config).unwrap());
    }

    #[test]
    fn unstored_attestation_is_false_not_error() {
        let w = world();
        let claim = Claim {
            ctype_hash: w.ctype_hash,
            contents: Default::default(),
            owner: *w.claimer.address(),
        };
        let request = RequestForAttestation::build(&claim, &w.claimer, vec![], None).unwrap();
        let attestation = Attestation::create(&request, &w.attester.public_identity(), None);
        let ac = AttestedClaim::new(request, attestation);
        assert!(!ac.verify(&w.ledger, &ProtocolConfig::default()).unwrap());
    }

    #[test]
    fn revoked_legitimation_invalidates_parent() {
        let w = world();
        let legit = attested(&w, vec![], 0);
        let legit_hash = legit.attestation.claim_hash;
        let parent = attested(&w, vec![legit], 1);
        let config = ProtocolConfig::default();
        assert!(parent.verify(&w.ledger, &config).unwrap());

        w.ledger
            .submit(&Attestation::revoke(legit_hash, &w.attester).unwrap())
            .unwrap();
        assert!(!parent.verify(&w.ledger, &config).unwrap());
    }

    #[test]
    fn chain_at_bound_passes_beyond_bound_fails() {
        let w = world();
        let config = ProtocolConfig::with_max_legitimation_depth(3);

        let at_bound = chain(&w, 3);
        assert!(at_bound.verify(&w.ledger, &config).unwrap());

        let beyond = chain(&w, 4);
        assert!(matches!(
            beyond.verify(&w.ledger, &config),
            Err(VcError::LegitimationChainTooDeep { depth: 4, max: 3 })
        ));
    }

    #[test]
    fn tampered_legitimation_reported() {
        let w = world();
        let mut parent = attested(&w, vec![attested(&w, vec![], 0)], 1);
        parent.request.legitimations[0]
            .request
            .claim
            .contents
            .insert("level".into(), json!(99));
        assert!(matches!(
            parent.request.verify_data(),
            Err(VcError::LegitimationUnverifiable { index: 0, .. })
        ));
        assert!(!parent.verify(&w.ledger, &ProtocolConfig::default()).unwrap());
    }

    #[test]
    fn ancestor_root_hash_in_chain_is_a_cycle() {
        let w = world();
        let mut parent = attested(&w, vec![attested(&w, vec![], 0)], 1);
        let own = parent.request.root_hash;
        parent.request.legitimations[0].request.root_hash = own;
        assert!(matches!(
            parent.verify(&w.ledger, &ProtocolConfig::default()),
            Err(VcError::LegitimationCycle { root_hash }) if root_hash == own
        ));
    }

    #[test]
    fn attestation_must_reference_request() {
        let w = world();
        let a = attested(&w, vec![], 1);
        let b = attested(&w, vec![], 2);
        let mixed = AttestedClaim::new(a.request, b.attestation);
        assert!(matches!(
            mixed.verify_data(&ProtocolConfig::default()),
            Err(VcError::AttestationMismatch { .. })
        ));
    }

    #[test]
    fn disclosed_paths_follow_redaction() {
        let w = world();
        let ac = attested(&w, vec![], 1);
        let paths = ac.disclosed_paths();
        assert!(paths.contains("contents.level"));
        assert!(paths.contains("owner"));
        assert!(paths.contains("ctypeHash"));

        let hidden = AttestedClaim::new(ac.request.redact::<&str>(&[], true), ac.attestation.clone());
        assert!(hidden.get_attributes().is_empty());
        let paths = hidden.disclosed_paths();
        assert!(!paths.contains("owner"));
        assert!(!paths.contains("contents.level"));
    }

    #[test]
    fn compressed_attested_claim_round_trip() {
        let w = world();
        let ac = attested(&w, vec![attested(&w, vec![], 0)], 1);
        let back = AttestedClaim::decompress(ac.compress().unwrap()).unwrap();
        assert_eq!(back, ac);
        assert!(AttestedClaim::decompress(json!([1])).is_err());
    }
}
