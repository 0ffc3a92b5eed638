//! # Attestation
//!
//! Construction, ledger lookup, validity check and revocation of an
//! attester's vouching for a request's root hash.
//!
//! ## Security Invariant
//!
//! [`Attestation::verify`] never trusts the local copy. It re-reads the
//! ledger record by claim hash and compares the CType hash, the owner and
//! the delegation id before checking the revocation flag.

use kredo_core::compress::{encode, expect_fields, field};
use kredo_core::{Address, CompressionError, ContentDigest, DelegationId};
use kredo_crypto::{Identity, PublicIdentity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AttestationError, LedgerError};
use crate::ledger::{Ledger, SignedTransaction, Transaction};

// ─── Attestation Status ──────────────────────────────────────────────

/// Lifecycle state of a claim hash as observed on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttestationStatus {
    /// No attestation recorded.
    Unattested,
    /// Attested and not revoked.
    Attested,
    /// Revoked (terminal).
    Revoked,
}

impl AttestationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Attested)
    }
}

impl std::fmt::Display for AttestationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unattested => "UNATTESTED",
            Self::Attested => "ATTESTED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

// ─── Attestable Request ──────────────────────────────────────────────

/// Anything an attester can vouch for: a root hash under a CType.
pub trait AttestableRequest {
    fn root_hash(&self) -> ContentDigest;
    fn ctype_hash(&self) -> ContentDigest;
}

// ─── Attestation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// Root hash of the attested request.
    pub claim_hash: ContentDigest,
    pub ctype_hash: ContentDigest,
    /// The attester.
    pub owner: Address,
    pub revoked: bool,
    pub delegation_id: Option<DelegationId>,
}

impl Attestation {
    /// Pure construction; nothing is written to the ledger.
    pub fn create(
        request: &impl AttestableRequest,
        attester: &PublicIdentity,
        delegation_id: Option<DelegationId>,
    ) -> Self {
        Self {
            claim_hash: request.root_hash(),
            ctype_hash: request.ctype_hash(),
            owner: attester.address,
            revoked: false,
            delegation_id,
        }
    }

    /// Build the signed transaction that records this attestation.
    ///
    /// The ledger rejects it with `CTypeNotFound` or `AlreadyAttested`.
    pub fn store(&self, attester: &Identity) -> Result<SignedTransaction, AttestationError> {
        if attester.address() != &self.owner {
            return Err(AttestationError::SignerMismatch {
                owner: self.owner,
                signer: *attester.address(),
            });
        }
        let tx = SignedTransaction::sign(
            Transaction::AddAttestation {
                claim_hash: self.claim_hash,
                ctype_hash: self.ctype_hash,
                delegation_id: self.delegation_id,
            },
            attester,
        )?;
        Ok(tx)
    }

    /// Read the ledger record for `claim_hash`. Absence is `Ok(None)`.
    pub fn query(
        ledger: &dyn Ledger,
        claim_hash: &ContentDigest,
    ) -> Result<Option<Attestation>, LedgerError> {
        ledger.query_attestation(claim_hash)
    }

    /// Whether the ledger holds a matching, unrevoked record.
    ///
    /// Returns `Ok(false)` when the record is absent, differs from this
    /// copy, or is revoked. Only transport failures are errors.
    pub fn verify(&self, ledger: &dyn Ledger) -> Result<bool, LedgerError> {
        let Some(stored) = ledger.query_attestation(&self.claim_hash)? else {
            tracing::warn!(claim_hash = %self.claim_hash, "attestation not found on ledger");
            return Ok(false);
        };
        if stored.ctype_hash != self.ctype_hash
            || stored.owner != self.owner
            || stored.delegation_id != self.delegation_id
        {
            tracing::warn!(claim_hash = %self.claim_hash, "attestation differs from ledger record");
            return Ok(false);
        }
        if stored.revoked {
            tracing::warn!(claim_hash = %self.claim_hash, "attestation revoked");
            return Ok(false);
        }
        Ok(true)
    }

    /// Build the signed transaction revoking the attestation of `claim_hash`.
    ///
    /// Permission is checked by the ledger: the revoker must be the
    /// attester or own a delegation node on the attestation's path.
    pub fn revoke(
        claim_hash: ContentDigest,
        revoker: &Identity,
    ) -> Result<SignedTransaction, AttestationError> {
        Ok(SignedTransaction::sign(
            Transaction::RevokeAttestation { claim_hash },
            revoker,
        )?)
    }

    /// The observed lifecycle state of this attestation's claim hash.
    pub fn status(&self, ledger: &dyn Ledger) -> Result<AttestationStatus, LedgerError> {
        Ok(match ledger.query_attestation(&self.claim_hash)? {
            None => AttestationStatus::Unattested,
            Some(stored) if stored.revoked => AttestationStatus::Revoked,
            Some(_) => AttestationStatus::Attested,
        })
    }

    /// `[claimHash, ctypeHash, owner, revoked, delegationId]`
    pub fn compress(&self) -> Result<Value, CompressionError> {
        const KIND: &str = "attestation";
        Ok(Value::Array(vec![
            encode(KIND, &self.claim_hash)?,
            encode(KIND, &self.ctype_hash)?,
            encode(KIND, &self.owner)?,
            encode(KIND, &self.revoked)?,
            encode(KIND, &self.delegation_id)?,
        ]))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        const KIND: &str = "attestation";
        let [claim_hash, ctype_hash, owner, revoked, delegation_id] =
            expect_fields::<5>(KIND, value)?;
        Ok(Self {
            claim_hash: field(KIND, "claimHash", claim_hash)?,
            ctype_hash: field(KIND, "ctypeHash", ctype_hash)?,
            owner: field(KIND, "owner", owner)?,
            revoked: field(KIND, "revoked", revoked)?,
            delegation_id: field(KIND, "delegationId", delegation_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Root(ContentDigest, ContentDigest);

    impl AttestableRequest for Root {
        fn root_hash(&self) -> ContentDigest {
            self.0
        }
        fn ctype_hash(&self) -> ContentDigest {
            self.1
        }
    }

    fn sample() -> Attestation {
        let attester = Identity::from_seed([8u8; 32]);
        Attestation::create(
            &Root(
                ContentDigest::from_bytes([1u8; 32]),
                ContentDigest::from_bytes([2u8; 32]),
            ),
            &attester.public_identity(),
            None,
        )
    }

    #[test]
    fn create_copies_request_hashes() {
        let att = sample();
        assert_eq!(att.claim_hash, ContentDigest::from_bytes([1u8; 32]));
        assert_eq!(att.ctype_hash, ContentDigest::from_bytes([2u8; 32]));
        assert!(!att.revoked);
    }

    #[test]
    fn store_requires_owner_signature() {
        let att = sample();
        let stranger = Identity::from_seed([9u8; 32]);
        assert!(matches!(
            att.store(&stranger),
            Err(AttestationError::SignerMismatch { .. })
        ));
        let owner = Identity::from_seed([8u8; 32]);
        let tx = att.store(&owner).unwrap();
        assert_eq!(tx.signer, att.owner);
        tx.verify_signature().unwrap();
    }

    #[test]
    fn compressed_round_trip() {
        let att = sample();
        let compressed = att.compress().unwrap();
        assert_eq!(compressed.as_array().map(Vec::len), Some(5));
        assert_eq!(Attestation::decompress(compressed).unwrap(), att);
    }

    #[test]
    fn decompress_wrong_arity_fails() {
        let mut compressed = sample().compress().unwrap();
        if let Value::Array(items) = &mut compressed {
            items.pop();
        }
        assert!(matches!(
            Attestation::decompress(compressed),
            Err(CompressionError::Arity { expected: 5, got: 4, .. })
        ));
        assert!(Attestation::decompress(json!({})).is_err());
    }

    #[test]
    fn status_display() {
        assert_eq!(AttestationStatus::Revoked.to_string(), "REVOKED");
        assert!(AttestationStatus::Revoked.is_terminal());
        assert!(AttestationStatus::Attested.is_valid());
    }
}
