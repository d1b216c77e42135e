//! Canonical JSON encoding and SHA-256 hashing.
//!
//! Block hashes and transaction signatures both depend on a byte-stable
//! rendering of a `serde_json::Value`: object keys sorted lexicographically,
//! no whitespace between tokens, numbers in `serde_json`'s default decimal
//! form. Any implementation that wants wire/hash compatibility with this one
//! must reproduce exactly this encoding, floating-point timestamps
//! included.
//!
//! `serde_json::Value`'s `Map` is backed by a `BTreeMap` unless the
//! `preserve_order` feature is enabled (it is not, here), so iterating a
//! `Value::Object`'s entries already yields keys in lexicographic order.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serializes `value` with sorted object keys and no inter-token whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(k).expect("string key"));
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Canonically encodes `value` and returns the hex SHA-256 digest of the
/// resulting UTF-8 bytes. The single entry point every hash/signature
/// payload in this crate goes through.
pub fn canonical_hash(value: &Value) -> String {
    sha256_hex(canonical_json(value).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_and_strips_whitespace() {
        let v = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonical_json(&v), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn hash_is_deterministic() {
        let v = json!({"x": 1, "y": 2});
        assert_eq!(canonical_hash(&v), canonical_hash(&v));
    }

    #[test]
    fn key_order_in_source_does_not_matter() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }
}
