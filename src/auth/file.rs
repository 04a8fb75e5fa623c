//! JSON file credential store

use super::{Credential, CredentialStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Stores all credentials in one JSON object keyed by provider id.
///
/// Writes are serialized through a mutex and the file is created with
/// owner-only permissions on unix.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<data dir>/ai-provider-runtime/auth.json`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| Error::Credential("no user data directory on this platform".into()))?;
        Ok(Self::new(dir.join("ai-provider-runtime").join("auth.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Credential>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        // Entries with an unknown shape are skipped rather than failing the whole file.
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, v)| match serde_json::from_value::<Credential>(v) {
                Ok(c) => Some((id, c)),
                Err(e) => {
                    tracing::warn!(provider_id = id.as_str(), error = %e, "skipping malformed credential entry");
                    None
                }
            })
            .collect())
    }

    async fn write_all(&self, all: &BTreeMap<String, Credential>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(all)?;

        let mut open = tokio::fs::OpenOptions::new();
        open.write(true).create(true).truncate(true);
        #[cfg(unix)]
        open.mode(0o600);
        let mut file = open.open(&self.path).await?;
        #[cfg(unix)]
        {
            // `mode` only applies on creation; tighten files that already existed.
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }
        file.write_all(&body).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, provider_id: &str) -> Result<Option<Credential>> {
        Ok(self.read_all().await?.remove(provider_id))
    }

    async fn set(&self, provider_id: &str, credential: Credential) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(provider_id.to_string(), credential);
        self.write_all(&all).await
    }

    async fn remove(&self, provider_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        if all.remove(provider_id).is_some() {
            self.write_all(&all).await?;
        }
        Ok(())
    }

    async fn all(&self) -> Result<BTreeMap<String, Credential>> {
        self.read_all().await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
