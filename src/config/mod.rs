//! # Configuration
//!
//! Static configuration overrides for providers. The configuration is the
//! lowest-trust layer of provider resolution: it can change options (base URL,
//! headers, timeout) and supply a credential, but an environment or stored
//! credential always wins over it.
//!
//! ```yaml
//! model: corethink/corethink
//! provider:
//!   corethink:
//!     options:
//!       baseURL: https://gateway.internal/v1
//!       timeout: 120000
//!       headers:
//!         x-team: infra
//! ```

pub mod env;
pub mod merge;

pub use env::EnvSnapshot;
pub use merge::merge_deep;

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Path of a configuration file (YAML or JSON).
pub const CONFIG_PATH_ENV: &str = "AI_CONFIG";
/// Inline configuration content; takes precedence over [`CONFIG_PATH_ENV`].
pub const CONFIG_CONTENT_ENV: &str = "AI_CONFIG_CONTENT";
/// Credential store backend: `file` (default) or `keyring`.
pub const CREDENTIAL_STORE_ENV: &str = "AI_CREDENTIAL_STORE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default model in `provider/model` form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model used for cheap auxiliary calls, `provider/model` form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_model: Option<String>,
    #[serde(default)]
    pub provider: BTreeMap<String, ProviderOverride>,
}

/// Per-provider override block (`provider.<id>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ProviderOverride {
    /// Credential supplied through `options.apiKey`, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.options
            .get("apiKey")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::parse(&content)
        }
    }

    /// Parse inline content. JSON is valid YAML, so one parser handles both.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the configuration named by the environment, or an empty one.
    pub fn from_env(env: &EnvSnapshot) -> Result<Self> {
        if let Some(content) = env.get(CONFIG_CONTENT_ENV) {
            return Self::parse(content);
        }
        if let Some(path) = env.get(CONFIG_PATH_ENV) {
            return Self::load(path);
        }
        Ok(Self::default())
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderOverride> {
        self.provider.get(id)
    }
}
