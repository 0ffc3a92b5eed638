//! # CType
//!
//! A claim type: a JSON Schema for claim contents, optionally owned by the
//! address that registered it, identified by its content hash.
//!
//! ## Hashing
//!
//! `hash = SHA-256(JCS(schema without "$id"))`. After hashing, the schema's
//! `$id` is set to `kredo:ctype:<hash>`, so a CType document is
//! self-describing and the hash can always be recomputed from it.
//!
//! ## Security Invariant
//!
//! A deserialized CType is rejected unless its stored hash equals the hash
//! recomputed from its schema.

use kredo_core::{sha256_digest, Address, CanonicalBytes, ContentDigest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::validate;

/// Prefix of the `$id` assigned to every CType schema.
pub const CTYPE_ID_PREFIX: &str = "kredo:ctype:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCType")]
pub struct CType {
    schema: Value,
    owner: Option<Address>,
    hash: ContentDigest,
}

#[derive(Deserialize)]
struct RawCType {
    schema: Value,
    owner: Option<Address>,
    hash: ContentDigest,
}

impl TryFrom<RawCType> for CType {
    type Error = SchemaError;

    fn try_from(raw: RawCType) -> Result<Self, Self::Error> {
        let computed = schema_hash(&raw.schema)?;
        if computed != raw.hash {
            return Err(SchemaError::HashMismatch {
                stored: raw.hash,
                computed,
            });
        }
        Ok(Self {
            schema: with_id(raw.schema, &computed),
            owner: raw.owner,
            hash: computed,
        })
    }
}

impl CType {
    /// Build a CType from a schema document.
    ///
    /// The schema must be a JSON object whose `properties` member is an
    /// object, and it must compile as a JSON Schema.
    pub fn from_schema(schema: Value, owner: Option<Address>) -> Result<Self, SchemaError> {
        let properties = schema
            .as_object()
            .ok_or_else(|| SchemaError::Malformed("schema must be a JSON object".into()))?
            .get("properties");
        if !matches!(properties, Some(Value::Object(_))) {
            return Err(SchemaError::Malformed(
                "schema must declare a `properties` object".into(),
            ));
        }

        let hash = schema_hash(&schema)?;
        validate::compile(&schema, hash)?;
        tracing::debug!(ctype_hash = %hash, "ctype constructed");
        Ok(Self {
            schema: with_id(schema, &hash),
            owner,
            hash,
        })
    }

    pub fn hash(&self) -> ContentDigest {
        self.hash
    }

    pub fn owner(&self) -> Option<&Address> {
        self.owner.as_ref()
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The field names declared under `properties`, in sorted order.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Validate claim contents against this CType.
    pub fn verify_claim_structure(&self, contents: &Map<String, Value>) -> Result<(), SchemaError> {
        validate::validate(&self.schema, self.hash, &Value::Object(contents.clone()))
    }
}

fn schema_hash(schema: &Value) -> Result<ContentDigest, SchemaError> {
    let mut without_id = schema.clone();
    if let Some(obj) = without_id.as_object_mut() {
        obj.remove("$id");
    }
    Ok(sha256_digest(&CanonicalBytes::from_value(without_id)?))
}

fn with_id(mut schema: Value, hash: &ContentDigest) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            Value::String(format!("{CTYPE_ID_PREFIX}{}", hash.to_hex())),
        );
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "Person",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            },
            "additionalProperties": false
        })
    }

    fn contents(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn hash_ignores_id_and_sets_it() {
        let ctype = CType::from_schema(person_schema(), None).unwrap();
        let id = ctype.schema()["$id"].as_str().unwrap();
        assert_eq!(id, format!("kredo:ctype:{}", ctype.hash().to_hex()));

        let mut with_other_id = person_schema();
        with_other_id["$id"] = json!("something-else");
        let again = CType::from_schema(with_other_id, None).unwrap();
        assert_eq!(again.hash(), ctype.hash());
    }

    #[test]
    fn hash_is_key_order_independent() {
        let reordered = json!({
            "properties": {
                "age": { "type": "integer" },
                "name": { "type": "string" }
            },
            "additionalProperties": false,
            "type": "object",
            "title": "Person",
            "$schema": "http://json-schema.org/draft-07/schema#"
        });
        assert_eq!(
            CType::from_schema(reordered, None).unwrap().hash(),
            CType::from_schema(person_schema(), None).unwrap().hash()
        );
    }

    #[test]
    fn property_names_sorted() {
        let ctype = CType::from_schema(person_schema(), None).unwrap();
        assert_eq!(ctype.property_names(), vec!["age", "name"]);
    }

    #[test]
    fn conforming_contents_pass() {
        let ctype = CType::from_schema(person_schema(), None).unwrap();
        ctype
            .verify_claim_structure(&contents(json!({"name": "Ralph", "age": 12})))
            .unwrap();
    }

    #[test]
    fn wrong_type_fails_with_violation() {
        let ctype = CType::from_schema(person_schema(), None).unwrap();
        let err = ctype
            .verify_claim_structure(&contents(json!({"name": "Ralph", "age": "twelve"})))
            .unwrap_err();
        match err {
            SchemaError::ValidationFailed { violations, ctype_hash } => {
                assert_eq!(ctype_hash, ctype.hash());
                assert!(!violations.is_empty());
                assert!(violations.violations()[0].instance_path.contains("age"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_field_fails() {
        let ctype = CType::from_schema(person_schema(), None).unwrap();
        assert!(ctype
            .verify_claim_structure(&contents(json!({"nickname": "R"})))
            .is_err());
    }

    #[test]
    fn schema_without_properties_is_malformed() {
        let err = CType::from_schema(json!({"type": "object"}), None).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
        let err = CType::from_schema(json!("string"), None).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn float_in_schema_rejected() {
        let schema = json!({
            "type": "object",
            "properties": { "score": { "type": "number", "maximum": 1.5 } }
        });
        assert!(matches!(
            CType::from_schema(schema, None),
            Err(SchemaError::Canonicalization(_))
        ));
    }

    #[test]
    fn serde_round_trip_checks_hash() {
        let owner = Address::from_public_key_bytes([4u8; 32]);
        let ctype = CType::from_schema(person_schema(), Some(owner)).unwrap();
        let json = serde_json::to_value(&ctype).unwrap();
        let back: CType = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, ctype);

        let mut tampered = json;
        tampered["schema"]["properties"]["extra"] = json!({"type": "string"});
        assert!(serde_json::from_value::<CType>(tampered).is_err());
    }
}
