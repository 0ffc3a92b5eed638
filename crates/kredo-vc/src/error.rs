use kredo_attestation::LedgerError;
use kredo_core::{Address, CompressionError, ContentDigest};
use kredo_crypto::CryptoError;
use kredo_schema::SchemaError;
use kredo_zkp::ZkError;
use thiserror::Error;

/// Errors from claim construction, request integrity checks and
/// credential assembly.
#[derive(Error, Debug)]
pub enum VcError {
    /// The claim is owned by someone other than the signing identity.
    #[error("claim owner {claim_owner} does not match identity {identity}")]
    OwnerMismatch {
        claim_owner: Address,
        identity: Address,
    },

    #[error("claim owner hash does not match the disclosed owner")]
    OwnerHashMismatch,

    #[error("ctype hash leaf does not match the claim's ctype hash")]
    SchemaHashMismatch,

    #[error("hash of field {field:?} does not match its disclosed value")]
    FieldHashMismatch { field: String },

    #[error("legitimation #{index} cannot be verified: {source}")]
    LegitimationUnverifiable {
        index: usize,
        #[source]
        source: Box<VcError>,
    },

    #[error("root hash mismatch: stored {stored}, computed {computed}")]
    RootHashMismatch {
        stored: ContentDigest,
        computed: ContentDigest,
    },

    #[error("claimer signature does not verify against the claim owner")]
    SignatureInvalid,

    #[error("legitimation chain depth {depth} exceeds the maximum of {max}")]
    LegitimationChainTooDeep { depth: usize, max: usize },

    /// A legitimation repeats the root hash of one of its ancestors.
    #[error("legitimation cycle through root hash {root_hash}")]
    LegitimationCycle { root_hash: ContentDigest },

    /// The attestation does not vouch for this request.
    #[error("attestation for {attested} does not match request {request}")]
    AttestationMismatch {
        attested: ContentDigest,
        request: ContentDigest,
    },

    #[error("identity has no privacy-enhancement capability")]
    IdentityNotPrivacyEnabled,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Zk(#[from] ZkError),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

impl VcError {
    /// Errors about the shape of a legitimation chain rather than the
    /// integrity of one request.
    pub fn is_chain_error(&self) -> bool {
        matches!(
            self,
            Self::LegitimationChainTooDeep { .. } | Self::LegitimationCycle { .. }
        )
    }
}
