//! Content Fingerprints - SHA-256 over canonical JSON
//!
//! Two aggregates with the same logical content hash identically,
//! regardless of map ordering or asset-set identity.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Fingerprint of any serializable content, typically a merged aggregate.
pub fn fingerprint<T: Serialize>(content: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(content)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetDescriptor, AssetSet};
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": {"b": 1, "a": 2}});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":{"a":2,"b":1},"z":1}"#);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_ignores_set_identity() {
        let descriptor = AssetDescriptor {
            high_quality_path: "a.png".into(),
            low_quality_path: "a.lq.png".into(),
            source_pack_id: "p".into(),
        };
        let a = AssetSet::new(vec![descriptor.clone()]);
        let b = AssetSet::new(vec![descriptor]);
        assert!(!a.same_as(&b));
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }
}
