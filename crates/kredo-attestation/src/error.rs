use kredo_core::{Address, CanonicalizationError, CompressionError, ContentDigest, DelegationId};
use thiserror::Error;

/// Errors surfaced by a ledger collaborator.
///
/// These are ledger-state errors. The protocol propagates them unchanged.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ctype {ctype_hash} is not registered on the ledger")]
    CTypeNotFound { ctype_hash: ContentDigest },

    #[error("ctype {ctype_hash} is already registered")]
    CTypeAlreadyExists { ctype_hash: ContentDigest },

    #[error("claim hash {claim_hash} is already attested")]
    AlreadyAttested { claim_hash: ContentDigest },

    #[error("no attestation for claim hash {claim_hash}")]
    AttestationNotFound { claim_hash: ContentDigest },

    #[error("attestation for claim hash {claim_hash} is already revoked")]
    AlreadyRevoked { claim_hash: ContentDigest },

    #[error("{signer} is not permitted to {action}")]
    NotPermitted {
        signer: Address,
        action: &'static str,
    },

    #[error("delegation node {id} not found")]
    DelegationNotFound { id: DelegationId },

    #[error("delegation node {id} already exists")]
    DelegationAlreadyExists { id: DelegationId },

    #[error("transaction signature by {signer} is invalid")]
    BadSignature { signer: Address },

    #[error("transaction encoding failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Transport or node failure reported by a live ledger client.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Errors from attestation construction and lifecycle helpers.
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The identity used to sign is not the attestation's owner.
    #[error("attestation owned by {owner} cannot be stored by {signer}")]
    SignerMismatch { owner: Address, signer: Address },

    #[error(transparent)]
    Compression(#[from] CompressionError),
}
