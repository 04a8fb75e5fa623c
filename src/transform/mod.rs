//! # Payload transforms
//!
//! Outgoing request normalization for OpenAI-compatible endpoints.
//!
//! | Function | Input |
//! |----------|-------|
//! | [`sanitize_messages`] | Typed message list, per model capabilities |
//! | [`sanitize_request_body`] | Serialized chat body |
//! | [`provider_options`] | Option bag to namespace under the provider id |
//! | [`clean_schema`] | Tool parameter JSON schema |

mod body;
mod messages;

pub use body::sanitize_request_body;
pub use messages::{sanitize_messages, unsupported_notice, EMPTY_IMAGE_NOTICE};

use crate::model::ModelDescriptor;
use serde_json::{Map, Value};

/// Namespace `options` under the model's provider id: `{ <provider_id>: options }`.
pub fn provider_options(model: &ModelDescriptor, options: Map<String, Value>) -> Map<String, Value> {
    let mut wrapped = Map::new();
    wrapped.insert(model.provider_id.clone(), Value::Object(options));
    wrapped
}

/// Drop top-level `$schema` and `additionalProperties` from a tool schema.
pub fn clean_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut cleaned = map.clone();
            cleaned.remove("$schema");
            cleaned.remove("additionalProperties");
            Value::Object(cleaned)
        }
        other => other.clone(),
    }
}
