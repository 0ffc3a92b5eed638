//! # Salted Hash Tree
//!
//! One [`NonceHash`] per hashed unit: the claim owner, the CType hash and
//! every claim field. A leaf is `SHA-256(nonce ‖ JCS(value))`.
//!
//! Redacting a leaf drops its nonce. The hash stays, which still proves the
//! value was part of the signed tree without allowing it to be recovered.

use std::collections::BTreeMap;

use kredo_core::compress::{encode, expect_fields, field};
use kredo_core::{CompressionError, ContentDigest};
use kredo_crypto::{generate_nonce, salted_digest, CryptoError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name → leaf, in lexicographic key order.
pub type ClaimHashTree = BTreeMap<String, NonceHash>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceHash {
    pub hash: ContentDigest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl NonceHash {
    /// Commit to `value` under a fresh nonce.
    pub fn new(value: &impl Serialize) -> Result<Self, CryptoError> {
        let nonce = generate_nonce();
        let hash = salted_digest(&nonce, value)?;
        Ok(Self {
            hash,
            nonce: Some(nonce),
        })
    }

    /// Whether `value` opens this leaf. A redacted leaf opens nothing.
    pub fn opens(&self, value: &impl Serialize) -> Result<bool, CryptoError> {
        match &self.nonce {
            Some(nonce) => Ok(salted_digest(nonce, value)? == self.hash),
            None => Ok(false),
        }
    }

    /// The same leaf without its nonce.
    pub fn redacted(&self) -> Self {
        Self {
            hash: self.hash,
            nonce: None,
        }
    }

    pub fn is_redacted(&self) -> bool {
        self.nonce.is_none()
    }

    /// `[hash, nonce]`
    pub fn compress(&self) -> Result<Value, CompressionError> {
        const KIND: &str = "nonce hash";
        Ok(Value::Array(vec![
            encode(KIND, &self.hash)?,
            encode(KIND, &self.nonce)?,
        ]))
    }

    pub fn decompress(value: Value) -> Result<Self, CompressionError> {
        const KIND: &str = "nonce hash";
        let [hash, nonce] = expect_fields::<2>(KIND, value)?;
        Ok(Self {
            hash: field(KIND, "hash", hash)?,
            nonce: field(KIND, "nonce", nonce)?,
        })
    }
}

/// Commit to every field of `contents`, each under its own nonce.
pub fn hash_contents(contents: &BTreeMap<String, Value>) -> Result<ClaimHashTree, CryptoError> {
    contents
        .iter()
        .map(|(key, value)| Ok((key.clone(), NonceHash::new(value)?)))
        .collect()
}

pub(crate) fn compress_tree(tree: &ClaimHashTree) -> Result<Value, CompressionError> {
    let mut out = serde_json::Map::new();
    for (key, leaf) in tree {
        out.insert(key.clone(), leaf.compress()?);
    }
    Ok(Value::Object(out))
}

pub(crate) fn decompress_tree(value: Value) -> Result<ClaimHashTree, CompressionError> {
    let Value::Object(entries) = value else {
        return Err(CompressionError::NotAnObject {
            kind: "claim hash tree",
        });
    };
    entries
        .into_iter()
        .map(|(key, leaf)| Ok((key, NonceHash::decompress(leaf)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_opens_with_its_value_only() {
        let leaf = NonceHash::new(&json!("Ralph")).unwrap();
        assert!(leaf.opens(&json!("Ralph")).unwrap());
        assert!(!leaf.opens(&json!("Ralf")).unwrap());
    }

    #[test]
    fn redacted_leaf_keeps_hash_drops_nonce() {
        let leaf = NonceHash::new(&json!(12)).unwrap();
        let redacted = leaf.redacted();
        assert_eq!(redacted.hash, leaf.hash);
        assert!(redacted.is_redacted());
        assert!(!redacted.opens(&json!(12)).unwrap());
        assert!(serde_json::to_value(&redacted).unwrap().get("nonce").is_none());
    }

    #[test]
    fn every_field_gets_its_own_nonce() {
        let contents: BTreeMap<String, Value> =
            [("a".to_string(), json!(1)), ("b".to_string(), json!(1))]
                .into_iter()
                .collect();
        let tree = hash_contents(&contents).unwrap();
        assert_ne!(tree["a"].nonce, tree["b"].nonce);
        assert_ne!(tree["a"].hash, tree["b"].hash);
    }

    #[test]
    fn compressed_leaf_round_trip() {
        let leaf = NonceHash::new(&json!(true)).unwrap();
        assert_eq!(NonceHash::decompress(leaf.compress().unwrap()).unwrap(), leaf);
        assert!(matches!(
            NonceHash::decompress(json!(["0x00"])),
            Err(CompressionError::Arity { expected: 2, got: 1, .. })
        ));
    }
}
