//! # Ledger Collaborator Contract
//!
//! The protocol reads attestations, CTypes and delegation nodes from a
//! ledger and submits signed transactions to it. Nothing else about the
//! ledger (consensus, fees, nonces, connection management) is visible here.
//!
//! Implementations must be `Send + Sync` so a single client can be shared
//! behind an `Arc`, and the trait is object-safe so callers can hold a
//! `&dyn Ledger`.

use kredo_core::{Address, CanonicalBytes, ContentDigest, DelegationId};
use kredo_crypto::{verify_with_address, Ed25519Signature, Identity};
use serde::{Deserialize, Serialize};

use crate::attestation::Attestation;
use crate::error::LedgerError;

/// A registered CType as the ledger records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CTypeRecord {
    pub ctype_hash: ContentDigest,
    pub owner: Address,
}

/// A node in a delegation hierarchy.
///
/// Root nodes have no parent. The owner of a node may attest on its
/// behalf, add child nodes, and revoke attestations made under it or any
/// descendant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationNode {
    pub id: DelegationId,
    pub owner: Address,
    pub parent: Option<DelegationId>,
}

/// A ledger state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transaction {
    #[serde(rename_all = "camelCase")]
    AddCType { ctype_hash: ContentDigest },
    #[serde(rename_all = "camelCase")]
    AddAttestation {
        claim_hash: ContentDigest,
        ctype_hash: ContentDigest,
        delegation_id: Option<DelegationId>,
    },
    #[serde(rename_all = "camelCase")]
    RevokeAttestation { claim_hash: ContentDigest },
    AddDelegation { node: DelegationNode },
}

impl Transaction {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddCType { .. } => "addCType",
            Self::AddAttestation { .. } => "addAttestation",
            Self::RevokeAttestation { .. } => "revokeAttestation",
            Self::AddDelegation { .. } => "addDelegation",
        }
    }
}

/// A transaction together with its submitter and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signer: Address,
    pub signature: Ed25519Signature,
}

impl SignedTransaction {
    /// Sign `transaction` over its canonical bytes.
    pub fn sign(transaction: Transaction, signer: &Identity) -> Result<Self, LedgerError> {
        let bytes = CanonicalBytes::new(&transaction)?;
        Ok(Self {
            signature: signer.sign(bytes.as_bytes()),
            signer: *signer.address(),
            transaction,
        })
    }

    /// Check the signature against the claimed signer.
    pub fn verify_signature(&self) -> Result<(), LedgerError> {
        let bytes = CanonicalBytes::new(&self.transaction)?;
        verify_with_address(bytes.as_bytes(), &self.signature, &self.signer).map_err(|_| {
            LedgerError::BadSignature {
                signer: self.signer,
            }
        })
    }
}

/// Ledger client contract.
pub trait Ledger: Send + Sync {
    /// The attestation recorded for `claim_hash`, if any.
    fn query_attestation(&self, claim_hash: &ContentDigest)
        -> Result<Option<Attestation>, LedgerError>;

    /// The CType registration for `ctype_hash`, if any.
    fn query_ctype(&self, ctype_hash: &ContentDigest) -> Result<Option<CTypeRecord>, LedgerError>;

    fn query_delegation(&self, id: &DelegationId) -> Result<Option<DelegationNode>, LedgerError>;

    /// Apply a signed transaction, or reject it without any state change.
    fn submit(&self, transaction: &SignedTransaction) -> Result<(), LedgerError>;

    /// Human-readable name of this ledger client.
    fn ledger_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_transaction_verifies() {
        let id = Identity::from_seed([1u8; 32]);
        let tx = SignedTransaction::sign(
            Transaction::AddCType {
                ctype_hash: ContentDigest::from_bytes([3u8; 32]),
            },
            &id,
        )
        .unwrap();
        tx.verify_signature().unwrap();
    }

    #[test]
    fn swapped_signer_is_bad_signature() {
        let id = Identity::from_seed([1u8; 32]);
        let other = Identity::from_seed([2u8; 32]);
        let mut tx = SignedTransaction::sign(
            Transaction::RevokeAttestation {
                claim_hash: ContentDigest::from_bytes([3u8; 32]),
            },
            &id,
        )
        .unwrap();
        tx.signer = *other.address();
        assert!(matches!(
            tx.verify_signature(),
            Err(LedgerError::BadSignature { .. })
        ));
    }

    #[test]
    fn altered_payload_is_bad_signature() {
        let id = Identity::from_seed([1u8; 32]);
        let mut tx = SignedTransaction::sign(
            Transaction::RevokeAttestation {
                claim_hash: ContentDigest::from_bytes([3u8; 32]),
            },
            &id,
        )
        .unwrap();
        tx.transaction = Transaction::RevokeAttestation {
            claim_hash: ContentDigest::from_bytes([4u8; 32]),
        };
        assert!(tx.verify_signature().is_err());
    }

    #[test]
    fn transaction_wire_form_is_tagged() {
        let tx = Transaction::RevokeAttestation {
            claim_hash: ContentDigest::from_bytes([0u8; 32]),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "revokeAttestation");
        assert!(json.get("claimHash").is_some());
    }
}
