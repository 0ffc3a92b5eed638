//! Ledger registration of CTypes.

use kredo_crypto::Identity;
use kredo_schema::CType;

use crate::error::{AttestationError, LedgerError};
use crate::ledger::{Ledger, SignedTransaction, Transaction};

/// Ledger operations on a [`CType`].
pub trait CTypeLedgerExt {
    /// Build the signed `AddCType` transaction registering this CType.
    ///
    /// The ledger rejects a duplicate registration with `CTypeAlreadyExists`.
    fn store(&self, owner: &Identity) -> Result<SignedTransaction, AttestationError>;

    fn is_stored(&self, ledger: &dyn Ledger) -> Result<bool, LedgerError>;
}

impl CTypeLedgerExt for CType {
    fn store(&self, owner: &Identity) -> Result<SignedTransaction, AttestationError> {
        if let Some(declared) = self.owner() {
            if declared != owner.address() {
                return Err(AttestationError::SignerMismatch {
                    owner: *declared,
                    signer: *owner.address(),
                });
            }
        }
        Ok(SignedTransaction::sign(
            Transaction::AddCType {
                ctype_hash: self.hash(),
            },
            owner,
        )?)
    }

    fn is_stored(&self, ledger: &dyn Ledger) -> Result<bool, LedgerError> {
        Ok(ledger.query_ctype(&self.hash())?.is_some())
    }
}
