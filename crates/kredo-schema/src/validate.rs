//! # Claim Contents Validation
//!
//! Compiles a CType schema with `jsonschema` (Draft 2020-12) and checks claim
//! contents against it.
//!
//! CType schemas carry a non-resolvable `kredo:ctype:` `$id` and may declare
//! a foreign `$schema`. Both are stripped before compilation, and any `$ref`
//! to an external document resolves to the permissive empty schema, so
//! validation is hermetic.

use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use kredo_core::ContentDigest;
use serde_json::Value;

use crate::error::SchemaError;

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the claim contents.
    pub instance_path: String,
    /// JSON Pointer within the schema that triggered the error.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty collection of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Resolves every external `$ref` to the empty schema.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        _uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::json!({}))
    }
}

pub(crate) fn compile(schema: &Value, ctype_hash: ContentDigest) -> Result<Validator, SchemaError> {
    let mut stripped = schema.clone();
    if let Some(obj) = stripped.as_object_mut() {
        obj.remove("$id");
        obj.remove("$schema");
    }
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(OfflineRetriever);
    opts.build(&stripped).map_err(|e| SchemaError::Compile {
        ctype_hash,
        reason: e.to_string(),
    })
}

pub(crate) fn validate(
    schema: &Value,
    ctype_hash: ContentDigest,
    instance: &Value,
) -> Result<(), SchemaError> {
    let validator = compile(schema, ctype_hash)?;
    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::warn!(%ctype_hash, count = violations.len(), "claim contents rejected by ctype");
        Err(SchemaError::ValidationFailed {
            ctype_hash,
            violations: ValidationViolations { violations },
        })
    }
}
