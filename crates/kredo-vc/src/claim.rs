//! # Claims
//!
//! A [`Claim`] is the full set of field values a claimer asserts under a
//! CType. A [`PartialClaim`] is what survives redaction: any subset of the
//! contents, and the owner only if it was not excluded.
//!
//! Contents are kept in a `BTreeMap` so iteration, and therefore hash-tree
//! leaf order, is lexicographic.

use std::collections::BTreeMap;

use kredo_core::compress::{encode, expect_fields, field};
use kredo_core::{Address, CompressionError, ContentDigest};
use kredo_schema::CType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::VcError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub ctype_hash: ContentDigest,
    pub contents: BTreeMap<String, Value>,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialClaim {
    pub ctype_hash: ContentDigest,
    #[serde(default)]
    pub contents: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
}

impl Claim {
    /// Build a claim after validating `contents` against `ctype`.
    pub fn from_ctype_and_contents(
        ctype: &CType,
        contents: Map<String, Value>,
        owner: Address,
    ) -> Result<Self, VcError> {
        ctype.verify_claim_structure(&contents)?;
        Ok(Self {
            ctype_hash: ctype.hash(),
            contents: contents.into_iter().collect(),
            owner,
        })
    }

    /// `[contents, ctypeHash, owner]`
    pub fn compress(&self) -> Result<Value, CompressionError> {
        const KIND: &str = "claim";
        Ok(Value::Array(vec![
            encode(KIND, &self.contents)?,
            encode(KIND, &self.ctype_hash)?,
            encode(KIND, &self.owner)?,
        ]))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        const KIND: &str = "claim";
        let [contents, ctype_hash, owner] = expect_fields::<3>(KIND, value)?;
        Ok(Self {
            contents: field(KIND, "contents", contents)?,
            ctype_hash: field(KIND, "ctypeHash", ctype_hash)?,
            owner: field(KIND, "owner", owner)?,
        })
    }
}

impl From<Claim> for PartialClaim {
    fn from(claim: Claim) -> Self {
        Self {
            ctype_hash: claim.ctype_hash,
            contents: claim.contents,
            owner: Some(claim.owner),
        }
    }
}

impl PartialClaim {
    /// `[contents, ctypeHash, owner]`, owner `null` when redacted.
    pub fn compress(&self) -> Result<Value, CompressionError> {
        const KIND: &str = "partial claim";
        Ok(Value::Array(vec![
            encode(KIND, &self.contents)?,
            encode(KIND, &self.ctype_hash)?,
            encode(KIND, &self.owner)?,
        ]))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        const KIND: &str = "partial claim";
        let [contents, ctype_hash, owner] = expect_fields::<3>(KIND, value)?;
        Ok(Self {
            contents: field(KIND, "contents", contents)?,
            ctype_hash: field(KIND, "ctypeHash", ctype_hash)?,
            owner: field(KIND, "owner", owner)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctype() -> CType {
        CType::from_schema(
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer" }
                },
                "additionalProperties": false
            }),
            None,
        )
        .unwrap()
    }

    fn owner() -> Address {
        Address::from_public_key_bytes([1u8; 32])
    }

    #[test]
    fn valid_contents_build_a_claim() {
        let contents = json!({"name": "Ralph", "age": 12}).as_object().cloned().unwrap();
        let claim = Claim::from_ctype_and_contents(&ctype(), contents, owner()).unwrap();
        assert_eq!(claim.ctype_hash, ctype().hash());
        assert_eq!(
            claim.contents.keys().collect::<Vec<_>>(),
            vec!["age", "name"]
        );
    }

    #[test]
    fn invalid_contents_rejected() {
        let contents = json!({"name": 7}).as_object().cloned().unwrap();
        assert!(matches!(
            Claim::from_ctype_and_contents(&ctype(), contents, owner()),
            Err(VcError::Schema(_))
        ));
    }

    #[test]
    fn compressed_claim_round_trip() {
        let contents = json!({"name": "Ralph"}).as_object().cloned().unwrap();
        let claim = Claim::from_ctype_and_contents(&ctype(), contents, owner()).unwrap();
        let compressed = claim.compress().unwrap();
        assert_eq!(compressed[2], json!(owner().to_hex()));
        assert_eq!(Claim::decompress(compressed).unwrap(), claim);
        assert!(Claim::decompress(json!([{}, "0x00"])).is_err());
    }

    #[test]
    fn partial_claim_owner_may_be_absent() {
        let partial = PartialClaim {
            ctype_hash: ctype().hash(),
            contents: BTreeMap::new(),
            owner: None,
        };
        let json = serde_json::to_value(&partial).unwrap();
        assert!(json.get("owner").is_none());
        let back = PartialClaim::decompress(partial.compress().unwrap()).unwrap();
        assert_eq!(back, partial);
    }
}
