//! # Error Types — Structured Error Hierarchy
//!
//! Error types shared by every kredo crate. All errors use `thiserror`.
//!
//! - Input validation errors ([`ValidationError`]) are raised before any
//!   hashing or signing proceeds.
//! - Compressed-form errors ([`CompressionError`]) name the object kind and
//!   the arity that was expected, so a truncated array never produces a
//!   partially populated value.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum KredoError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Malformed identifier, digest or timestamp.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Compressed array form could not be decoded.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Claim values must be strings, integers, booleans, null, arrays or objects.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Malformed protocol input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An address is not `0x` followed by 64 hex characters.
    #[error("invalid address {0:?}: expected 0x-prefixed 32-byte hex")]
    InvalidAddress(String),

    /// A digest is not `0x` followed by 64 hex characters.
    #[error("invalid hash {0:?}: expected 0x-prefixed 32-byte hex")]
    InvalidHash(String),

    /// A timestamp is not RFC 3339 UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error while decoding a compressed positional array.
#[derive(Error, Debug)]
pub enum CompressionError {
    /// The compressed value was not a JSON array.
    #[error("compressed {kind} must be an array")]
    NotAnArray {
        /// The kind of object being decompressed.
        kind: &'static str,
    },

    /// A compressed map (such as a claim hash tree) was not a JSON object.
    #[error("compressed {kind} must be an object")]
    NotAnObject { kind: &'static str },

    /// The array had the wrong number of elements.
    #[error("compressed {kind} must have {expected} elements, got {got}")]
    Arity {
        /// The kind of object being decompressed.
        kind: &'static str,
        /// Required number of positional fields.
        expected: usize,
        /// Number of elements found.
        got: usize,
    },

    /// A positional element could not be decoded into its field type.
    #[error("compressed {kind} has invalid field {field}: {source}")]
    Field {
        /// The kind of object being decompressed.
        kind: &'static str,
        /// The field name at the failing position.
        field: &'static str,
        /// The underlying decode error.
        source: serde_json::Error,
    },

    /// Encoding a field into its compressed form failed.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        /// The kind of object being compressed.
        kind: &'static str,
        /// The underlying encode error.
        source: serde_json::Error,
    },
}
