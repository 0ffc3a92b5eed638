//! # Request for Attestation
//!
//! Built by the claimer from a [`Claim`]: every hashed unit is committed to
//! under its own nonce, the leaves are combined into a root hash, and the
//! root hash is signed by the claim owner.
//!
//! ## Root Hash
//!
//! ```text
//! leaves = [ ownerHash, ctypeHash,
//!            claimHashTree[k].hash  for k in lexicographic order,
//!            legitimation.attestation.claimHash  for each legitimation,
//!            delegationId  if present ]
//! rootHash = leaves[0]                  if len(leaves) == 1
//!          = SHA-256(leaves[0] ‖ …)     otherwise
//! ```
//!
//! ## Security Invariant
//!
//! [`RequestForAttestation::verify_data`] recomputes every disclosed leaf,
//! the root hash and the claimer signature. It never trusts a stored value
//! and fails with a typed error naming the first mismatch.

use kredo_attestation::AttestableRequest;
use kredo_core::compress::{encode, expect_fields_with_trailing, field};
use kredo_core::{CompressionError, ContentDigest, DelegationId, ProtocolConfig};
use kredo_crypto::{combine_leaves, verify, Ed25519Signature, Identity};
use kredo_zkp::PeAttestationRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attested::AttestedClaim;
use crate::claim::{Claim, PartialClaim};
use crate::error::VcError;
use crate::hash_tree::{compress_tree, decompress_tree, hash_contents, ClaimHashTree, NonceHash};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestForAttestation {
    pub claim: PartialClaim,
    pub claim_owner: NonceHash,
    pub ctype_hash: NonceHash,
    pub claim_hash_tree: ClaimHashTree,
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_id: Option<DelegationId>,
    pub root_hash: ContentDigest,
    pub claimer_signature: Ed25519Signature,
    /// Claimer's request for a privacy-enhanced attestation, if any. Not
    /// covered by the root hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_enhancement: Option<PeAttestationRequest>,
}

fn compute_root_hash(
    claim_owner: &NonceHash,
    ctype_hash: &NonceHash,
    tree: &ClaimHashTree,
    legitimations: &[AttestedClaim],
    delegation_id: Option<&DelegationId>,
) -> ContentDigest {
    let mut leaves = Vec::with_capacity(2 + tree.len() + legitimations.len() + 1);
    leaves.push(claim_owner.hash);
    leaves.push(ctype_hash.hash);
    leaves.extend(tree.values().map(|leaf| leaf.hash));
    leaves.extend(legitimations.iter().map(|l| l.attestation.claim_hash));
    if let Some(id) = delegation_id {
        leaves.push(*id.as_digest());
    }
    combine_leaves(&leaves)
}

impl RequestForAttestation {
    /// Hash, combine and sign `claim` as `identity`.
    pub fn build(
        claim: &Claim,
        identity: &Identity,
        legitimations: Vec<AttestedClaim>,
        delegation_id: Option<DelegationId>,
    ) -> Result<Self, VcError> {
        if &claim.owner != identity.address() {
            return Err(VcError::OwnerMismatch {
                claim_owner: claim.owner,
                identity: *identity.address(),
            });
        }

        let claim_owner = NonceHash::new(&claim.owner)?;
        let ctype_hash = NonceHash::new(&claim.ctype_hash)?;
        let claim_hash_tree = hash_contents(&claim.contents)?;
        let root_hash = compute_root_hash(
            &claim_owner,
            &ctype_hash,
            &claim_hash_tree,
            &legitimations,
            delegation_id.as_ref(),
        );
        let claimer_signature = identity.sign(root_hash.as_bytes());

        tracing::debug!(
            %root_hash,
            fields = claim_hash_tree.len(),
            legitimations = legitimations.len(),
            "request for attestation built"
        );
        Ok(Self {
            claim: claim.clone().into(),
            claim_owner,
            ctype_hash,
            claim_hash_tree,
            legitimations,
            delegation_id,
            root_hash,
            claimer_signature,
            privacy_enhancement: None,
        })
    }

    /// Attach the claimer's privacy-enhanced attestation request.
    pub fn with_privacy_enhancement(mut self, request: PeAttestationRequest) -> Self {
        self.privacy_enhancement = Some(request);
        self
    }

    /// Recompute the root hash from the stored leaves.
    pub fn calculate_root_hash(&self) -> ContentDigest {
        compute_root_hash(
            &self.claim_owner,
            &self.ctype_hash,
            &self.claim_hash_tree,
            &self.legitimations,
            self.delegation_id.as_ref(),
        )
    }

    /// Check every disclosed value, legitimation, the root hash and the
    /// signature, with the default legitimation depth bound.
    pub fn verify_data(&self) -> Result<(), VcError> {
        self.verify_data_with(&ProtocolConfig::default())
    }

    pub fn verify_data_with(&self, config: &ProtocolConfig) -> Result<(), VcError> {
        self.verify_data_at(config, 0, &mut Vec::new())
    }

    pub(crate) fn verify_data_at(
        &self,
        config: &ProtocolConfig,
        depth: usize,
        ancestors: &mut Vec<ContentDigest>,
    ) -> Result<(), VcError> {
        if ancestors.contains(&self.root_hash) {
            return Err(VcError::LegitimationCycle {
                root_hash: self.root_hash,
            });
        }

        if let Some(owner) = &self.claim.owner {
            if !self.claim_owner.opens(owner)? {
                return Err(VcError::OwnerHashMismatch);
            }
        }
        if !self.ctype_hash.opens(&self.claim.ctype_hash)? {
            return Err(VcError::SchemaHashMismatch);
        }
        for (key, value) in &self.claim.contents {
            let opens = match self.claim_hash_tree.get(key) {
                Some(leaf) => leaf.opens(value)?,
                None => false,
            };
            if !opens {
                return Err(VcError::FieldHashMismatch { field: key.clone() });
            }
        }

        ancestors.push(self.root_hash);
        let child_depth = depth + 1;
        for (index, legitimation) in self.legitimations.iter().enumerate() {
            if child_depth > config.max_legitimation_depth {
                return Err(VcError::LegitimationChainTooDeep {
                    depth: child_depth,
                    max: config.max_legitimation_depth,
                });
            }
            legitimation
                .verify_data_at(config, child_depth, ancestors)
                .map_err(|e| {
                    if e.is_chain_error() {
                        e
                    } else {
                        VcError::LegitimationUnverifiable {
                            index,
                            source: Box::new(e),
                        }
                    }
                })?;
        }
        ancestors.pop();

        let computed = self.calculate_root_hash();
        if computed != self.root_hash {
            return Err(VcError::RootHashMismatch {
                stored: self.root_hash,
                computed,
            });
        }

        // A redacted owner leaves the signature unverifiable.
        if !self.verify_signature() {
            return Err(VcError::SignatureInvalid);
        }
        Ok(())
    }

    /// Whether the claimer signature verifies against `claim.owner`.
    /// `false` when the owner has been redacted.
    pub fn verify_signature(&self) -> bool {
        match &self.claim.owner {
            Some(owner) => verify(self.root_hash.as_bytes(), &self.claimer_signature, owner),
            None => false,
        }
    }

    /// A disclosed copy keeping only `keep_properties` and, unless
    /// `exclude_owner`, the owner. Removed values lose their nonce; all
    /// hashes are retained so the root hash still verifies.
    pub fn redact<S: AsRef<str>>(&self, keep_properties: &[S], exclude_owner: bool) -> Self {
        let keeps = |key: &str| keep_properties.iter().any(|k| k.as_ref() == key);
        let mut disclosed = self.clone();
        disclosed.claim.contents.retain(|key, _| keeps(key.as_str()));
        for (key, leaf) in disclosed.claim_hash_tree.iter_mut() {
            if !keeps(key.as_str()) {
                *leaf = leaf.redacted();
            }
        }
        if exclude_owner {
            disclosed.claim.owner = None;
            disclosed.claim_owner = disclosed.claim_owner.redacted();
        }
        disclosed
    }

    /// `[claim, claimOwner, ctypeHash, claimHashTree, legitimations,
    /// delegationId, rootHash, claimerSignature]`, followed by
    /// `privacyEnhancement` only when one is attached.
    pub fn compress(&self) -> Result<Value, CompressionError> {
        const KIND: &str = "request for attestation";
        let legitimations = self
            .legitimations
            .iter()
            .map(AttestedClaim::compress)
            .collect::<Result<Vec<_>, _>>()?;
        let mut fields = vec![
            self.claim.compress()?,
            self.claim_owner.compress()?,
            self.ctype_hash.compress()?,
            compress_tree(&self.claim_hash_tree)?,
            Value::Array(legitimations),
            encode(KIND, &self.delegation_id)?,
            encode(KIND, &self.root_hash)?,
            encode(KIND, &self.claimer_signature)?,
        ];
        if let Some(pe) = &self.privacy_enhancement {
            fields.push(encode(KIND, pe)?);
        }
        Ok(Value::Array(fields))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        const KIND: &str = "request for attestation";
        let ([claim, claim_owner, ctype_hash, tree, legitimations, delegation_id, root_hash, signature], pe) =
            expect_fields_with_trailing::<8>(KIND, value)?;
        let Value::Array(legitimations) = legitimations else {
            return Err(CompressionError::NotAnArray {
                kind: "legitimations",
            });
        };
        Ok(Self {
            claim: PartialClaim::decompress(claim)?,
            claim_owner: NonceHash::decompress(claim_owner)?,
            ctype_hash: NonceHash::decompress(ctype_hash)?,
            claim_hash_tree: decompress_tree(tree)?,
            legitimations: legitimations
                .into_iter()
                .map(AttestedClaim::decompress)
                .collect::<Result<_, _>>()?,
            delegation_id: field(KIND, "delegationId", delegation_id)?,
            root_hash: field(KIND, "rootHash", root_hash)?,
            claimer_signature: field(KIND, "claimerSignature", signature)?,
            privacy_enhancement: pe
                .map(|pe| field(KIND, "privacyEnhancement", pe))
                .transpose()?,
        })
    }
}

impl AttestableRequest for RequestForAttestation {
    fn root_hash(&self) -> ContentDigest {
        self.root_hash
    }

    fn ctype_hash(&self) -> ContentDigest {
        self.claim.ctype_hash
    }
}
