//! Built-in provider catalog
//!
//! The catalog is plain data. Callers with their own metadata source build
//! [`CatalogProvider`] records themselves and hand them to
//! [`ProviderState`](crate::provider::ProviderState).

use super::descriptor::{
    ApiInfo, CacheCost, Capabilities, Cost, Interleaved, Limit, Modalities, ModelDescriptor,
    ModelStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CORETHINK_PROVIDER_ID: &str = "corethink";
pub const CORETHINK_API_URL: &str = "https://api.corethink.ai/v1/code";
pub const CORETHINK_ENV_KEY: &str = "CORETHINK_API_KEY";
pub const OPENAI_COMPATIBLE_NPM: &str = "@ai-sdk/openai-compatible";

/// Static description of a provider before credentials and overrides apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProvider {
    pub id: String,
    pub name: String,
    /// Environment variables that may carry the credential, first match wins
    pub env: Vec<String>,
    /// Default option bag (e.g. `baseURL`)
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    pub models: BTreeMap<String, ModelDescriptor>,
}

pub fn builtin_providers() -> Vec<CatalogProvider> {
    vec![corethink_provider()]
}

fn corethink_provider() -> CatalogProvider {
    let model = corethink_model();
    let mut options = serde_json::Map::new();
    options.insert("baseURL".into(), CORETHINK_API_URL.into());

    CatalogProvider {
        id: CORETHINK_PROVIDER_ID.to_string(),
        name: "CoreThink".to_string(),
        env: vec![CORETHINK_ENV_KEY.to_string()],
        options,
        models: BTreeMap::from([(model.id.clone(), model)]),
    }
}

fn corethink_model() -> ModelDescriptor {
    ModelDescriptor {
        id: "corethink".to_string(),
        provider_id: CORETHINK_PROVIDER_ID.to_string(),
        api: ApiInfo {
            id: "corethink".to_string(),
            url: CORETHINK_API_URL.to_string(),
            npm: OPENAI_COMPATIBLE_NPM.to_string(),
        },
        name: "CoreThink".to_string(),
        family: None,
        capabilities: Capabilities {
            temperature: true,
            reasoning: false,
            attachment: true,
            toolcall: true,
            input: Modalities {
                text: true,
                audio: false,
                image: true,
                video: false,
                pdf: true,
            },
            output: Modalities::text_only(),
            interleaved: Interleaved::Enabled(false),
        },
        // $ per 1M tokens
        cost: Cost {
            input: 1.5,
            output: 2.0,
            cache: CacheCost::default(),
            experimental_over_200k: None,
        },
        limit: Limit {
            context: 200_000,
            output: 8_000,
        },
        status: ModelStatus::Active,
        options: serde_json::Map::new(),
        headers: BTreeMap::new(),
        release_date: "2025-01-01".to_string(),
        variants: Some(BTreeMap::new()),
    }
}
