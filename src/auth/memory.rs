use super::{Credential, CredentialStore};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<BTreeMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, provider_id: impl Into<String>, credential: Credential) -> Self {
        self.write().insert(provider_id.into(), credential);
        self
    }

    // A poisoned lock only means another thread panicked mid-insert; the map is still usable.
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Credential>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Credential>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, provider_id: &str) -> Result<Option<Credential>> {
        Ok(self.read().get(provider_id).cloned())
    }
    async fn set(&self, provider_id: &str, credential: Credential) -> Result<()> {
        self.write().insert(provider_id.to_string(), credential);
        Ok(())
    }
    async fn remove(&self, provider_id: &str) -> Result<()> {
        self.write().remove(provider_id);
        Ok(())
    }
    async fn all(&self) -> Result<BTreeMap<String, Credential>> {
        Ok(self.read().clone())
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}
