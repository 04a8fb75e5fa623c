//! OS keyring credential store

use super::{Credential, CredentialStore};
use crate::{Error, Result};
use async_trait::async_trait;
use keyring::Entry;
use std::collections::BTreeMap;

pub const KEYRING_SERVICE: &str = "ai-provider-runtime";

/// Keeps each credential as a JSON secret under `(service, provider_id)`.
///
/// Keyrings cannot be enumerated, so [`CredentialStore::all`] only reports the
/// provider ids this store was told about.
pub struct KeyringCredentialStore {
    service: String,
    known_providers: Vec<String>,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            known_providers: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_known_providers(mut self, ids: Vec<String>) -> Self {
        self.known_providers = ids;
        self
    }

    fn entry(service: &str, provider_id: &str) -> Result<Entry> {
        Entry::new(service, provider_id).map_err(|e| Error::Credential(e.to_string()))
    }

    async fn blocking<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Credential(format!("keyring task failed: {}", e)))?
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn get(&self, provider_id: &str) -> Result<Option<Credential>> {
        let service = self.service.clone();
        let id = provider_id.to_string();
        Self::blocking(move || {
            let entry = Self::entry(&service, &id)?;
            match entry.get_password() {
                Ok(secret) => {
                    // Plain keys stored by other tools are accepted as API credentials.
                    let credential = serde_json::from_str::<Credential>(&secret)
                        .unwrap_or_else(|_| Credential::api(secret));
                    Ok(Some(credential))
                }
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(Error::Credential(e.to_string())),
            }
        })
        .await
    }

    async fn set(&self, provider_id: &str, credential: Credential) -> Result<()> {
        let service = self.service.clone();
        let id = provider_id.to_string();
        let secret = serde_json::to_string(&credential)?;
        Self::blocking(move || {
            Self::entry(&service, &id)?
                .set_password(&secret)
                .map_err(|e| Error::Credential(e.to_string()))
        })
        .await
    }

    async fn remove(&self, provider_id: &str) -> Result<()> {
        let service = self.service.clone();
        let id = provider_id.to_string();
        Self::blocking(move || match Self::entry(&service, &id)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Credential(e.to_string())),
        })
        .await
    }

    async fn all(&self) -> Result<BTreeMap<String, Credential>> {
        let mut out = BTreeMap::new();
        for id in &self.known_providers {
            if let Some(c) = self.get(id).await? {
                out.insert(id.clone(), c);
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}
