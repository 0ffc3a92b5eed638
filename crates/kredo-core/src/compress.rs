//! # Compressed Positional Encoding
//!
//! Protocol objects have a compact wire form: a JSON array whose positions
//! follow the object's attribute order. These helpers enforce exact arity
//! so that decompression either yields a complete object or a typed error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::CompressionError;

/// Split a compressed value into exactly `expected` positional elements.
pub fn expect_array(
    kind: &'static str,
    value: Value,
    expected: usize,
) -> Result<Vec<Value>, CompressionError> {
    match value {
        Value::Array(items) if items.len() == expected => Ok(items),
        Value::Array(items) => Err(CompressionError::Arity {
            kind,
            expected,
            got: items.len(),
        }),
        _ => Err(CompressionError::NotAnArray { kind }),
    }
}

/// Split a compressed value into exactly `N` positional elements.
pub fn expect_fields<const N: usize>(
    kind: &'static str,
    value: Value,
) -> Result<[Value; N], CompressionError> {
    expect_array(kind, value, N)?
        .try_into()
        .map_err(|items: Vec<Value>| CompressionError::Arity {
            kind,
            expected: N,
            got: items.len(),
        })
}

/// Split a compressed value into `N` positional elements plus one optional
/// trailing element. Any other length is an arity error naming `N`.
pub fn expect_fields_with_trailing<const N: usize>(
    kind: &'static str,
    value: Value,
) -> Result<([Value; N], Option<Value>), CompressionError> {
    let Value::Array(mut items) = value else {
        return Err(CompressionError::NotAnArray { kind });
    };
    let trailing = if items.len() == N + 1 { items.pop() } else { None };
    let fields = items.try_into().map_err(|items: Vec<Value>| CompressionError::Arity {
        kind,
        expected: N,
        got: items.len() + usize::from(trailing.is_some()),
    })?;
    Ok((fields, trailing))
}

/// Decode one positional element into its field type.
pub fn field<T: DeserializeOwned>(
    kind: &'static str,
    field: &'static str,
    value: Value,
) -> Result<T, CompressionError> {
    serde_json::from_value(value).map_err(|source| CompressionError::Field { kind, field, source })
}

/// Encode one field for a compressed array.
pub fn encode<T: Serialize>(kind: &'static str, value: &T) -> Result<Value, CompressionError> {
    serde_json::to_value(value).map_err(|source| CompressionError::Encode { kind, source })
}
