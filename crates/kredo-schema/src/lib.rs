//! # kredo-schema — Claim Types
//!
//! A CType is a JSON Schema describing the fields a claim may carry. It is
//! content-addressed: its hash is the SHA-256 digest of the canonical schema
//! (without `$id`), and that hash is what claims, requests and attestations
//! refer to.
//!
//! ## Validation (`validate`)
//!
//! Claim contents are checked against the schema with the `jsonschema`
//! crate before a claim can be constructed. Only the pass/fail contract and
//! the list of violations are exposed.
//!
//! ## Crate Policy
//!
//! - Depends only on `kredo-core` internally.
//! - Schema validation is a trust boundary: invalid contents are rejected
//!   with structured violations, never silently coerced.
//! - Validation never performs network requests for `$ref` targets.

pub mod ctype;
pub mod error;
pub mod validate;

pub use ctype::{CType, CTYPE_ID_PREFIX};
pub use error::SchemaError;
pub use validate::{ValidationViolations, Violation};
