//! Deep merge of JSON option bags

use serde_json::{Map, Value};

/// Merge `overrides` into `base`, recursing into objects. On any other
/// conflict the override wins; arrays are replaced, not concatenated.
pub fn merge_deep(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match (merged.get(key), value) {
            (Some(Value::Object(b)), Value::Object(o)) => Value::Object(merge_deep(b, o)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
