//! # Salted Claim Hashing
//!
//! Every hashed unit of a request for attestation (owner, CType hash, each
//! claim field) is committed to as `SHA-256(nonce ‖ canonical(value))` with
//! its own fresh nonce. The leaves are then combined into the root hash.
//!
//! ## Security Invariant
//!
//! A nonce must never be reused across fields. Equal values under a shared
//! nonce would produce equal leaf hashes, letting anyone correlate redacted
//! fields across presentations.

use kredo_core::{CanonicalBytes, ContentDigest};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CryptoError;

/// A fresh random nonce (UUID v4 string).
pub fn generate_nonce() -> String {
    Uuid::new_v4().to_string()
}

/// `SHA-256(nonce ‖ canonical(value))`.
pub fn salted_digest(nonce: &str, value: &impl Serialize) -> Result<ContentDigest, CryptoError> {
    let canonical = CanonicalBytes::new(value)?;
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(canonical.as_bytes());
    Ok(finish(hasher))
}

/// Combine ordered leaves into a single root hash.
///
/// A single leaf is returned verbatim, without another hashing round.
/// Otherwise the result is `SHA-256(leaf_0 ‖ leaf_1 ‖ … ‖ leaf_n)` over the
/// raw 32-byte leaves. An empty leaf list hashes the empty string.
pub fn combine_leaves(leaves: &[ContentDigest]) -> ContentDigest {
    if let [only] = leaves {
        return *only;
    }
    let mut hasher = Sha256::new();
    for leaf in leaves {
        hasher.update(leaf.as_bytes());
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> ContentDigest {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ContentDigest::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_nonce_same_value_same_digest() {
        let a = salted_digest("n-1", &"Ralph").unwrap();
        let b = salted_digest("n-1", &"Ralph").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_nonce_hides_equal_values() {
        let a = salted_digest(&generate_nonce(), &12).unwrap();
        let b = salted_digest(&generate_nonce(), &12).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn value_is_hashed_canonically() {
        let a = salted_digest("n", &serde_json::json!({"b": 1, "a": 2})).unwrap();
        let b = salted_digest("n", &serde_json::json!({"a": 2, "b": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn float_values_are_rejected() {
        assert!(matches!(
            salted_digest("n", &1.5f64),
            Err(CryptoError::Canonicalization(_))
        ));
    }

    #[test]
    fn single_leaf_is_returned_verbatim() {
        let leaf = ContentDigest::from_bytes([9u8; 32]);
        assert_eq!(combine_leaves(&[leaf]), leaf);
    }

    #[test]
    fn multiple_leaves_are_hashed_in_order() {
        let a = ContentDigest::from_bytes([1u8; 32]);
        let b = ContentDigest::from_bytes([2u8; 32]);
        let ab = combine_leaves(&[a, b]);
        let ba = combine_leaves(&[b, a]);
        assert_ne!(ab, a);
        assert_ne!(ab, ba);

        let mut concat = Vec::new();
        concat.extend_from_slice(a.as_bytes());
        concat.extend_from_slice(b.as_bytes());
        let expected = Sha256::digest(&concat);
        assert_eq!(ab.as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn empty_leaf_set_hashes_empty_input() {
        let expected = Sha256::digest(b"");
        assert_eq!(combine_leaves(&[]).as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn nonces_are_unique() {
        assert_ne!(generate_nonce(), generate_nonce());
    }

    proptest! {
        #[test]
        fn any_leaf_change_changes_root(
            seeds in prop::collection::vec(any::<[u8; 32]>(), 2..8),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let leaves: Vec<ContentDigest> = seeds.iter().copied().map(ContentDigest::from_bytes).collect();
            let mut tampered = leaves.clone();
            let i = index.index(tampered.len());
            let mut bytes = *tampered[i].as_bytes();
            bytes[0] ^= flip;
            tampered[i] = ContentDigest::from_bytes(bytes);
            prop_assert_ne!(combine_leaves(&leaves), combine_leaves(&tampered));
        }
    }
}
