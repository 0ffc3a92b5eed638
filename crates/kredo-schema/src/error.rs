use kredo_core::{CanonicalizationError, ContentDigest};
use thiserror::Error;

use crate::validate::ValidationViolations;

/// Errors from CType construction and claim validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is not a JSON object with a `properties` object.
    #[error("malformed ctype schema: {0}")]
    Malformed(String),

    /// The schema could not be compiled into a validator.
    #[error("ctype {ctype_hash} cannot be compiled: {reason}")]
    Compile {
        ctype_hash: ContentDigest,
        reason: String,
    },

    /// Claim contents do not conform to the schema.
    #[error("claim contents violate ctype {ctype_hash}:\n{violations}")]
    ValidationFailed {
        ctype_hash: ContentDigest,
        violations: ValidationViolations,
    },

    /// The stored hash does not match the schema it accompanies.
    #[error("ctype hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        stored: ContentDigest,
        computed: ContentDigest,
    },

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
