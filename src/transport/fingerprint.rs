//! Transport fingerprints.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identity of an effective transport configuration.
///
/// SHA-256 over the canonical JSON of `{"npm": <tag>, "options": <bag>}`, where
/// every object has its keys sorted. Two bags with the same content produce
/// the same fingerprint whatever order their keys were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(npm: &str, options: &Map<String, Value>) -> Self {
        let mut root = Map::new();
        root.insert("npm".into(), Value::String(npm.to_string()));
        root.insert("options".into(), Value::Object(options.clone()));
        let canonical = canonicalize(&Value::Object(root)).to_string();

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Fingerprint(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rebuild `value` with object keys in sorted order. Array order is semantic and kept.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
