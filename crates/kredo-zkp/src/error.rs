use kredo_core::{CanonicalizationError, Timestamp};
use thiserror::Error;

/// Errors raised by a privacy-enhancement backend.
#[derive(Error, Debug)]
pub enum ZkError {
    /// An opaque value does not have the shape this backend expects.
    #[error("malformed {kind}: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The claimer secret does not match the one the credential is bound to.
    #[error("claimer secret does not match the credential")]
    ClaimerMismatch,

    /// A message belongs to a different attestation session.
    #[error("session nonce mismatch")]
    SessionMismatch,

    #[error("no public key supplied for attester {attester}")]
    UnknownAttester { attester: String },

    /// An accumulator or key belongs to a different attester.
    #[error("attester mismatch: expected {expected}, got {actual}")]
    AttesterMismatch { expected: String, actual: String },

    /// The attester signature over a credential does not check out.
    #[error("attester signature is invalid")]
    InvalidSignature,

    #[error("credential has been revoked")]
    CredentialRevoked,

    /// The credential's accumulator state is older than the request allows.
    #[error("credential accumulator updated at {actual}, request requires after {required}")]
    StaleAccumulator {
        required: Timestamp,
        actual: Timestamp,
    },

    #[error("credential does not contain attribute {path}")]
    AttributeMissing { path: String },

    #[error("expected {expected} credentials for the request, got {got}")]
    CredentialCount { expected: usize, got: usize },

    #[error("claim must be a JSON object")]
    ClaimNotAnObject,

    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}
