//! # In-Memory Ledger
//!
//! A reference [`Ledger`] holding all state in process memory behind a
//! `parking_lot::RwLock`. It enforces the same rules a live ledger would:
//!
//! - every transaction signature is checked (`BadSignature`);
//! - a CType can be registered once (`CTypeAlreadyExists`);
//! - an attestation requires a registered CType (`CTypeNotFound`) and a
//!   fresh claim hash (`AlreadyAttested`);
//! - attesting under a delegation requires owning that delegation node;
//! - revocation is permitted for the attester or the owner of any node on
//!   the attestation's delegation path, and happens at most once
//!   (`AlreadyRevoked`).
//!
//! A rejected transaction leaves the state unchanged.

use std::collections::BTreeMap;

use kredo_core::{Address, ContentDigest, DelegationId, LedgerConfig};
use parking_lot::RwLock;

use crate::attestation::Attestation;
use crate::error::LedgerError;
use crate::ledger::{CTypeRecord, DelegationNode, Ledger, SignedTransaction, Transaction};

#[derive(Debug, Default)]
struct LedgerState {
    ctypes: BTreeMap<ContentDigest, CTypeRecord>,
    attestations: BTreeMap<ContentDigest, Attestation>,
    delegations: BTreeMap<DelegationId, DelegationNode>,
}

/// Thread-safe in-process ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            state: RwLock::default(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of recorded attestations, revoked ones included.
    pub fn attestation_count(&self) -> usize {
        self.state.read().attestations.len()
    }

    fn apply(
        state: &mut LedgerState,
        signer: Address,
        transaction: &Transaction,
    ) -> Result<(), LedgerError> {
        match transaction {
            Transaction::AddCType { ctype_hash } => {
                if state.ctypes.contains_key(ctype_hash) {
                    return Err(LedgerError::CTypeAlreadyExists {
                        ctype_hash: *ctype_hash,
                    });
                }
                state.ctypes.insert(
                    *ctype_hash,
                    CTypeRecord {
                        ctype_hash: *ctype_hash,
                        owner: signer,
                    },
                );
            }
            Transaction::AddAttestation {
                claim_hash,
                ctype_hash,
                delegation_id,
            } => {
                if !state.ctypes.contains_key(ctype_hash) {
                    return Err(LedgerError::CTypeNotFound {
                        ctype_hash: *ctype_hash,
                    });
                }
                if state.attestations.contains_key(claim_hash) {
                    return Err(LedgerError::AlreadyAttested {
                        claim_hash: *claim_hash,
                    });
                }
                if let Some(id) = delegation_id {
                    let node = state
                        .delegations
                        .get(id)
                        .ok_or(LedgerError::DelegationNotFound { id: *id })?;
                    if node.owner != signer {
                        return Err(LedgerError::NotPermitted {
                            signer,
                            action: "attest under this delegation",
                        });
                    }
                }
                state.attestations.insert(
                    *claim_hash,
                    Attestation {
                        claim_hash: *claim_hash,
                        ctype_hash: *ctype_hash,
                        owner: signer,
                        revoked: false,
                        delegation_id: *delegation_id,
                    },
                );
            }
            Transaction::RevokeAttestation { claim_hash } => {
                let attestation = state.attestations.get(claim_hash).ok_or(
                    LedgerError::AttestationNotFound {
                        claim_hash: *claim_hash,
                    },
                )?;
                if !Self::may_revoke(&state.delegations, attestation, &signer) {
                    return Err(LedgerError::NotPermitted {
                        signer,
                        action: "revoke this attestation",
                    });
                }
                if attestation.revoked {
                    return Err(LedgerError::AlreadyRevoked {
                        claim_hash: *claim_hash,
                    });
                }
                if let Some(attestation) = state.attestations.get_mut(claim_hash) {
                    attestation.revoked = true;
                }
            }
            Transaction::AddDelegation { node } => {
                if state.delegations.contains_key(&node.id) {
                    return Err(LedgerError::DelegationAlreadyExists { id: node.id });
                }
                let permitted = match &node.parent {
                    None => node.owner == signer,
                    Some(parent) => {
                        state
                            .delegations
                            .get(parent)
                            .ok_or(LedgerError::DelegationNotFound { id: *parent })?
                            .owner
                            == signer
                    }
                };
                if !permitted {
                    return Err(LedgerError::NotPermitted {
                        signer,
                        action: "add this delegation node",
                    });
                }
                state.delegations.insert(node.id, node.clone());
            }
        }
        Ok(())
    }

    fn may_revoke(
        delegations: &BTreeMap<DelegationId, DelegationNode>,
        attestation: &Attestation,
        signer: &Address,
    ) -> bool {
        if &attestation.owner == signer {
            return true;
        }
        // Parents are inserted before children, so the walk terminates.
        let mut cursor = attestation.delegation_id;
        while let Some(id) = cursor {
            match delegations.get(&id) {
                Some(node) if &node.owner == signer => return true,
                Some(node) => cursor = node.parent,
                None => return false,
            }
        }
        false
    }
}

impl Ledger for InMemoryLedger {
    fn query_attestation(
        &self,
        claim_hash: &ContentDigest,
    ) -> Result<Option<Attestation>, LedgerError> {
        Ok(self.state.read().attestations.get(claim_hash).cloned())
    }

    fn query_ctype(&self, ctype_hash: &ContentDigest) -> Result<Option<CTypeRecord>, LedgerError> {
        Ok(self.state.read().ctypes.get(ctype_hash).cloned())
    }

    fn query_delegation(&self, id: &DelegationId) -> Result<Option<DelegationNode>, LedgerError> {
        Ok(self.state.read().delegations.get(id).cloned())
    }

    fn submit(&self, transaction: &SignedTransaction) -> Result<(), LedgerError> {
        transaction.verify_signature()?;
        let mut state = self.state.write();
        let result = Self::apply(&mut state, transaction.signer, &transaction.transaction);
        match &result {
            Ok(()) => tracing::debug!(
                kind = transaction.transaction.kind(),
                signer = %transaction.signer,
                "transaction applied"
            ),
            Err(e) => tracing::warn!(
                kind = transaction.transaction.kind(),
                signer = %transaction.signer,
                error = %e,
                "transaction rejected"
            ),
        }
        result
    }

    fn ledger_name(&self) -> &str {
        "InMemoryLedger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kredo_crypto::Identity;
    use proptest::prelude::*;

    fn ctype_hash() -> ContentDigest {
        ContentDigest::from_bytes([5u8; 32])
    }

    fn register_ctype(ledger: &InMemoryLedger, owner: &Identity) {
        let tx = SignedTransaction::sign(
            Transaction::AddCType {
                ctype_hash: ctype_hash(),
            },
            owner,
        )
        .unwrap();
        ledger.submit(&tx).unwrap();
    }

    fn attest(ledger: &InMemoryLedger, attester: &Identity, claim: u8, delegation: Option<DelegationId>) {
        let tx = SignedTransaction::sign(
            Transaction::AddAttestation {
                claim_hash: ContentDigest::from_bytes([claim; 32]),
                ctype_hash: ctype_hash(),
                delegation_id: delegation,
            },
            attester,
        )
        .unwrap();
        ledger.submit(&tx).unwrap();
    }

    fn revoke(ledger: &InMemoryLedger, revoker: &Identity, claim: u8) -> Result<(), LedgerError> {
        let tx = SignedTransaction::sign(
            Transaction::RevokeAttestation {
                claim_hash: ContentDigest::from_bytes([claim; 32]),
            },
            revoker,
        )
        .unwrap();
        ledger.submit(&tx)
    }

    fn add_node(
        ledger: &InMemoryLedger,
        signer: &Identity,
        owner: &Identity,
        parent: Option<DelegationId>,
    ) -> Result<DelegationId, LedgerError> {
        let id = DelegationId::generate();
        let tx = SignedTransaction::sign(
            Transaction::AddDelegation {
                node: DelegationNode {
                    id,
                    owner: *owner.address(),
                    parent,
                },
            },
            signer,
        )
        .unwrap();
        ledger.submit(&tx).map(|()| id)
    }

    #[test]
    fn duplicate_ctype_rejected() {
        let ledger = InMemoryLedger::new();
        let owner = Identity::from_seed([1u8; 32]);
        register_ctype(&ledger, &owner);
        let tx = SignedTransaction::sign(
            Transaction::AddCType {
                ctype_hash: ctype_hash(),
            },
            &owner,
        )
        .unwrap();
        assert!(matches!(
            ledger.submit(&tx),
            Err(LedgerError::CTypeAlreadyExists { .. })
        ));
    }

    #[test]
    fn attestation_needs_ctype() {
        let ledger = InMemoryLedger::new();
        let attester = Identity::from_seed([1u8; 32]);
        let tx = SignedTransaction::sign(
            Transaction::AddAttestation {
                claim_hash: ContentDigest::from_bytes([9u8; 32]),
                ctype_hash: ctype_hash(),
                delegation_id: None,
            },
            &attester,
        )
        .unwrap();
        assert!(matches!(
            ledger.submit(&tx),
            Err(LedgerError::CTypeNotFound { .. })
        ));
        assert_eq!(ledger.attestation_count(), 0);
    }

    #[test]
    fn double_attestation_rejected() {
        let ledger = InMemoryLedger::new();
        let attester = Identity::from_seed([1u8; 32]);
        register_ctype(&ledger, &attester);
        attest(&ledger, &attester, 9, None);
        let tx = SignedTransaction::sign(
            Transaction::AddAttestation {
                claim_hash: ContentDigest::from_bytes([9u8; 32]),
                ctype_hash: ctype_hash(),
                delegation_id: None,
            },
            &attester,
        )
        .unwrap();
        assert!(matches!(
            ledger.submit(&tx),
            Err(LedgerError::AlreadyAttested { .. })
        ));
    }

    #[test]
    fn revocation_is_monotonic() {
        let ledger = InMemoryLedger::new();
        let attester = Identity::from_seed([1u8; 32]);
        register_ctype(&ledger, &attester);
        attest(&ledger, &attester, 9, None);

        revoke(&ledger, &attester, 9).unwrap();
        assert!(matches!(
            revoke(&ledger, &attester, 9),
            Err(LedgerError::AlreadyRevoked { .. })
        ));
        let stored = ledger
            .query_attestation(&ContentDigest::from_bytes([9u8; 32]))
            .unwrap()
            .unwrap();
        assert!(stored.revoked);
    }

    #[test]
    fn stranger_cannot_revoke() {
        let ledger = InMemoryLedger::new();
        let attester = Identity::from_seed([1u8; 32]);
        let stranger = Identity::from_seed([2u8; 32]);
        register_ctype(&ledger, &attester);
        attest(&ledger, &attester, 9, None);
        assert!(matches!(
            revoke(&ledger, &stranger, 9),
            Err(LedgerError::NotPermitted { .. })
        ));
    }

    #[test]
    fn delegation_ancestor_may_revoke() {
        let ledger = InMemoryLedger::new();
        let root_owner = Identity::from_seed([1u8; 32]);
        let attester = Identity::from_seed([2u8; 32]);
        let outsider = Identity::from_seed([3u8; 32]);
        register_ctype(&ledger, &root_owner);

        let root = add_node(&ledger, &root_owner, &root_owner, None).unwrap();
        let child = add_node(&ledger, &root_owner, &attester, Some(root)).unwrap();
        attest(&ledger, &attester, 9, Some(child));

        assert!(revoke(&ledger, &outsider, 9).is_err());
        revoke(&ledger, &root_owner, 9).unwrap();
    }

    #[test]
    fn delegation_rules_enforced() {
        let ledger = InMemoryLedger::new();
        let alice = Identity::from_seed([1u8; 32]);
        let bob = Identity::from_seed([2u8; 32]);
        register_ctype(&ledger, &alice);

        // A root node must be self-owned.
        assert!(matches!(
            add_node(&ledger, &alice, &bob, None),
            Err(LedgerError::NotPermitted { .. })
        ));
        let root = add_node(&ledger, &alice, &alice, None).unwrap();
        // Only the parent's owner may extend it.
        assert!(add_node(&ledger, &bob, &bob, Some(root)).is_err());
        // Only the node owner may attest under it.
        let tx = SignedTransaction::sign(
            Transaction::AddAttestation {
                claim_hash: ContentDigest::from_bytes([9u8; 32]),
                ctype_hash: ctype_hash(),
                delegation_id: Some(root),
            },
            &bob,
        )
        .unwrap();
        assert!(matches!(
            ledger.submit(&tx),
            Err(LedgerError::NotPermitted { .. })
        ));
    }

    #[test]
    fn forged_signature_rejected_before_state_change() {
        let ledger = InMemoryLedger::new();
        let alice = Identity::from_seed([1u8; 32]);
        let mut tx = SignedTransaction::sign(
            Transaction::AddCType {
                ctype_hash: ctype_hash(),
            },
            &alice,
        )
        .unwrap();
        tx.signer = *Identity::from_seed([2u8; 32]).address();
        assert!(matches!(
            ledger.submit(&tx),
            Err(LedgerError::BadSignature { .. })
        ));
        assert!(ledger.query_ctype(&ctype_hash()).unwrap().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Once revoked, any further sequence of revocation attempts fails
        /// and the record stays revoked.
        #[test]
        fn revoked_record_rejects_every_retry(attempts in prop::collection::vec(any::<bool>(), 1..6)) {
            let attester = Identity::from_seed([1u8; 32]);
            let stranger = Identity::from_seed([2u8; 32]);
            let ledger = InMemoryLedger::new();
            register_ctype(&ledger, &attester);
            attest(&ledger, &attester, 7, None);
            revoke(&ledger, &attester, 7).unwrap();

            for by_attester in attempts {
                let who = if by_attester { &attester } else { &stranger };
                prop_assert!(revoke(&ledger, who, 7).is_err());
                let stored = ledger
                    .query_attestation(&ContentDigest::from_bytes([7u8; 32]))
                    .unwrap()
                    .unwrap();
                prop_assert!(stored.revoked);
            }
        }
    }
}
