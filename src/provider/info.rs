use crate::model::ModelDescriptor;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Where a provider's credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSource {
    /// Environment variable
    Env,
    /// Credential store
    Api,
    /// `provider.<id>.options.apiKey` in the configuration
    Config,
}

/// A resolved provider: catalog entry + credential + configuration overrides.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub source: ProviderSource,
    pub env: Vec<String>,
    #[serde(skip_serializing, default)]
    pub key: Option<String>,
    /// Effective option bag
    #[serde(serialize_with = "serialize_redacted")]
    pub options: Map<String, Value>,
    pub models: BTreeMap<String, ModelDescriptor>,
}

impl fmt::Debug for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("env", &self.env)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("options", &redact_options(&self.options))
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn redact_options(options: &Map<String, Value>) -> Map<String, Value> {
    let mut shown = options.clone();
    if shown.contains_key("apiKey") {
        shown.insert("apiKey".into(), Value::String("[REDACTED]".into()));
    }
    shown
}

fn serialize_redacted<S: Serializer>(
    options: &Map<String, Value>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    redact_options(options).serialize(serializer)
}
