//! Provider state: lazily resolved providers plus the transport cache.

use super::info::{ProviderInfo, ProviderSource};
use crate::auth::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
};
use crate::config::{merge_deep, Config, EnvSnapshot, CREDENTIAL_STORE_ENV};
use crate::model::{builtin_providers, CatalogProvider, ModelDescriptor};
use crate::transport::{Fingerprint, HttpSettings, HttpTransport, TransportCache};
use crate::{Error, Result};
use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub type Providers = BTreeMap<String, ProviderInfo>;

/// One lifetime of resolved state. Replaced wholesale on [`ProviderState::reset`].
struct Generation {
    providers: OnceCell<Arc<Providers>>,
    transports: TransportCache<HttpTransport>,
}

impl Generation {
    fn new() -> Self {
        Self {
            providers: OnceCell::new(),
            transports: TransportCache::new(),
        }
    }
}

/// Context object owning provider resolution and cached transports.
///
/// Nothing is resolved until first use. Credentials are read once per
/// generation; [`reset`](Self::reset) starts a new generation.
pub struct ProviderState {
    config: Config,
    store: Arc<dyn CredentialStore>,
    env: EnvSnapshot,
    catalog: Vec<CatalogProvider>,
    http: HttpSettings,
    generation: ArcSwap<Generation>,
}

impl ProviderState {
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        env: EnvSnapshot,
        catalog: Vec<CatalogProvider>,
    ) -> Self {
        let http = HttpSettings::from_env(&env);
        Self {
            config,
            store,
            env,
            catalog,
            http,
            generation: ArcSwap::from_pointee(Generation::new()),
        }
    }

    /// Process environment, configuration named by `AI_CONFIG[_CONTENT]`, the
    /// credential store picked by `AI_CREDENTIAL_STORE` (`file` or `keyring`,
    /// default `file`) and the built-in catalog.
    pub fn from_env() -> Result<Self> {
        let env = EnvSnapshot::capture();
        let config = Config::from_env(&env)?;
        let catalog = builtin_providers();
        let store: Arc<dyn CredentialStore> = match env.get(CREDENTIAL_STORE_ENV) {
            Some("keyring") => Arc::new(
                KeyringCredentialStore::new()
                    .with_known_providers(catalog.iter().map(|c| c.id.clone()).collect()),
            ),
            other => {
                if let Some(unknown) = other.filter(|s| *s != "file") {
                    warn!(store = unknown, "unknown credential store; using file store");
                }
                match FileCredentialStore::default_location() {
                    Ok(store) => Arc::new(store),
                    Err(e) => {
                        warn!(error = %e, "no credential file location; using in-memory store");
                        Arc::new(MemoryCredentialStore::new())
                    }
                }
            }
        };
        Ok(Self::new(config, store, env, catalog))
    }

    pub fn with_http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop resolved providers and cached transports. The next access
    /// resolves again from the environment snapshot, store and configuration.
    pub fn reset(&self) {
        let old = self.generation.swap(Arc::new(Generation::new()));
        info!(
            dropped_transports = old.transports.len(),
            "provider state reset"
        );
    }

    /// Resolved providers, keyed by id. Only providers with a credential appear.
    pub async fn providers(&self) -> Result<Arc<Providers>> {
        let generation = self.generation.load_full();
        let providers = generation
            .providers
            .get_or_try_init(|| self.resolve_all())
            .await?;
        Ok(providers.clone())
    }

    pub async fn provider(&self, provider_id: &str) -> Result<Option<ProviderInfo>> {
        Ok(self.providers().await?.get(provider_id).cloned())
    }

    async fn resolve_all(&self) -> Result<Arc<Providers>> {
        let started = Instant::now();
        info!(catalog = self.catalog.len(), "initializing provider state");

        let mut providers = Providers::new();
        for entry in &self.catalog {
            if let Some(info) = self.resolve_one(entry).await {
                info!(provider_id = info.id.as_str(), source = ?info.source, "found provider");
                providers.insert(info.id.clone(), info);
            }
        }

        info!(
            providers = providers.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "provider state ready"
        );
        Ok(Arc::new(providers))
    }

    /// Credential order: environment, then credential store, then configuration.
    async fn resolve_one(&self, entry: &CatalogProvider) -> Option<ProviderInfo> {
        let mut credential = entry
            .env
            .iter()
            .find_map(|var| self.env.get(var))
            .map(|key| (key.to_string(), ProviderSource::Env));

        if credential.is_none() {
            match self.store.get(&entry.id).await {
                Ok(Some(stored)) => {
                    if let Some(key) = stored.api_key() {
                        info!(
                            provider_id = entry.id.as_str(),
                            store = self.store.name(),
                            "found API key in credential store"
                        );
                        credential = Some((key.to_string(), ProviderSource::Api));
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(
                    provider_id = entry.id.as_str(),
                    error = %e,
                    "credential store lookup failed"
                ),
            }
        }

        let mut options = entry.options.clone();
        let mut name = entry.name.clone();
        if let Some(overrides) = self.config.provider(&entry.id) {
            options = merge_deep(&options, &overrides.options);
            if let Some(n) = &overrides.name {
                name = n.clone();
            }
            if let Some(config_key) = overrides.api_key() {
                match &credential {
                    None => credential = Some((config_key.to_string(), ProviderSource::Config)),
                    Some(_) => debug!(
                        provider_id = entry.id.as_str(),
                        "configured apiKey shadowed by a higher-priority credential"
                    ),
                }
            }
        }

        let Some((key, source)) = credential else {
            warn!(
                provider_id = entry.id.as_str(),
                env = ?entry.env,
                "no credential found; provider will not be available"
            );
            return None;
        };
        // The resolved key is authoritative for the transport.
        if options.contains_key("apiKey") {
            options.insert("apiKey".into(), Value::String(key.clone()));
        }

        Some(ProviderInfo {
            id: entry.id.clone(),
            name,
            source,
            env: entry.env.clone(),
            key: Some(key),
            options,
            models: entry.models.clone(),
        })
    }

    /// Cached transport for `model`, built on first use of its effective options.
    ///
    /// A provider or model missing from the resolved providers is
    /// [`Error::ModelNotFound`]; [`Error::Init`] is reserved for build failures.
    pub async fn transport(&self, model: &ModelDescriptor) -> Result<Arc<HttpTransport>> {
        let generation = self.generation.load_full();
        let providers = generation
            .providers
            .get_or_try_init(|| self.resolve_all())
            .await?;
        let Some(provider) = providers.get(&model.provider_id) else {
            warn!(
                provider_id = model.provider_id.as_str(),
                "transport requested for unavailable provider"
            );
            let known = providers.keys().cloned().collect();
            return Err(Error::model_not_found(&model.provider_id, &model.id, known));
        };
        if !provider.models.contains_key(&model.id) {
            warn!(
                provider_id = model.provider_id.as_str(),
                model_id = model.id.as_str(),
                "transport requested for unknown model"
            );
            let known = provider.models.keys().cloned().collect();
            return Err(Error::model_not_found(&model.provider_id, &model.id, known));
        }

        let options = effective_options(provider, model);
        let fingerprint = Fingerprint::compute(&model.api.npm, &options);
        let provider_id = model.provider_id.clone();
        let http = &self.http;
        generation
            .transports
            .resolve(&fingerprint, &model.provider_id, || async move {
                HttpTransport::from_options(&provider_id, &options, http)
            })
            .await
    }

    /// Number of transports built in the current generation.
    pub fn cached_transports(&self) -> usize {
        self.generation.load().transports.len()
    }

    pub async fn get_model(&self, provider_id: &str, model_id: &str) -> Result<ModelDescriptor> {
        let providers = self.providers().await?;
        let Some(provider) = providers.get(provider_id) else {
            let known = providers.keys().cloned().collect();
            return Err(Error::model_not_found(provider_id, model_id, known));
        };
        match provider.models.get(model_id) {
            Some(model) => Ok(model.clone()),
            None => {
                let known = provider.models.keys().cloned().collect();
                Err(Error::model_not_found(provider_id, model_id, known))
            }
        }
    }

    /// First model of `provider_id` whose id contains a query term, trying
    /// terms in order.
    pub async fn closest(
        &self,
        provider_id: &str,
        query: &[&str],
    ) -> Result<Option<(String, String)>> {
        let providers = self.providers().await?;
        let Some(provider) = providers.get(provider_id) else {
            return Ok(None);
        };
        Ok(query.iter().find_map(|term| {
            provider
                .models
                .keys()
                .find(|id| id.contains(term))
                .map(|id| (provider_id.to_string(), id.clone()))
        }))
    }

    /// Known `provider/model` ids matching `query`. An empty query, or one
    /// that matches nothing, yields every known id.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        let providers = self.providers().await?;
        let all: Vec<String> = providers
            .values()
            .flat_map(|p| p.models.values().map(|m| m.full_id()))
            .collect();
        let query = query.trim();
        if query.is_empty() {
            return Ok(all);
        }
        let terms: Vec<&str> = query.split_whitespace().collect();
        let matching: Vec<String> = all
            .iter()
            .filter(|id| terms.iter().any(|t| id.contains(t)))
            .cloned()
            .collect();
        Ok(if matching.is_empty() { all } else { matching })
    }

    /// Configured `model`, else the first model of the first available provider.
    pub async fn default_model(&self) -> Result<(String, String)> {
        if let Some(model) = &self.config.model {
            return Ok(parse_model(model));
        }
        let providers = self.providers().await?;
        providers
            .values()
            .find_map(|p| {
                p.models
                    .keys()
                    .next()
                    .map(|m| (p.id.clone(), m.clone()))
            })
            .ok_or_else(|| {
                let vars: Vec<&str> = self
                    .catalog
                    .iter()
                    .flat_map(|c| c.env.iter().map(|s| s.as_str()))
                    .collect();
                Error::configuration(format!(
                    "no provider available; set one of: {}",
                    vars.join(", ")
                ))
            })
    }

    /// Configured `small_model`, else the provider's model sharing its id,
    /// else its first model.
    pub async fn small_model(&self, provider_id: &str) -> Result<Option<ModelDescriptor>> {
        if let Some(small) = &self.config.small_model {
            let (p, m) = parse_model(small);
            return self.get_model(&p, &m).await.map(Some);
        }
        let providers = self.providers().await?;
        Ok(providers.get(provider_id).and_then(|p| {
            p.models
                .get(provider_id)
                .or_else(|| p.models.values().next())
                .cloned()
        }))
    }
}

/// Options a transport for `model` is built from: the provider's options,
/// `includeUsage`, `baseURL` falling back to the model endpoint, the provider
/// key when no `apiKey` is set, and model headers over provider headers.
pub fn effective_options(provider: &ProviderInfo, model: &ModelDescriptor) -> Map<String, Value> {
    let mut options = provider.options.clone();
    options.insert("includeUsage".into(), Value::Bool(true));

    let has_base_url = options
        .get("baseURL")
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    if !has_base_url {
        options.insert("baseURL".into(), Value::String(model.api.url.clone()));
    }
    if !options.contains_key("apiKey") {
        if let Some(key) = &provider.key {
            options.insert("apiKey".into(), Value::String(key.clone()));
        }
    }

    let mut headers = match options.get("headers") {
        Some(Value::Object(h)) => h.clone(),
        _ => Map::new(),
    };
    for (name, value) in &model.headers {
        headers.insert(name.clone(), Value::String(value.clone()));
    }
    options.insert("headers".into(), Value::Object(headers));
    options
}

/// Split `provider/model`; everything after the first `/` is the model id.
pub fn parse_model(model: &str) -> (String, String) {
    match model.split_once('/') {
        Some((provider, rest)) => (provider.to_string(), rest.to_string()),
        None => (model.to_string(), String::new()),
    }
}
