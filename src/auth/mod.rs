//! # Credential storage
//!
//! The credential collaborator of provider resolution. Only
//! [`CredentialStore::get`] is used when providers are resolved; the other
//! operations exist for login/logout front-ends.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`FileCredentialStore`] | JSON file (`auth.json`) in the user data directory |
//! | [`KeyringCredentialStore`] | OS keyring |
//! | [`MemoryCredentialStore`] | Process memory (tests, embedding) |

mod file;
mod os_keyring;
mod memory;

pub use os_keyring::KeyringCredentialStore;
pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A stored credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Credential {
    Api {
        key: String,
    },
    Oauth {
        refresh: String,
        access: String,
        expires: u64,
    },
    /// Token obtained from a `.well-known` auth command; `key` names the env var it stands for.
    Wellknown {
        key: String,
        token: String,
    },
}

impl Credential {
    pub fn api(key: impl Into<String>) -> Self {
        Credential::Api { key: key.into() }
    }

    /// The bearer key this credential contributes to a provider, if any.
    /// Only API-key credentials do.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Credential::Api { key } => Some(key),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Api { .. } => "api",
            Credential::Oauth { .. } => "oauth",
            Credential::Wellknown { .. } => "wellknown",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential::{}([REDACTED])", self.kind())
    }
}

/// Credential lookup by provider id.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, provider_id: &str) -> Result<Option<Credential>>;
    async fn set(&self, provider_id: &str, credential: Credential) -> Result<()>;
    async fn remove(&self, provider_id: &str) -> Result<()>;
    async fn all(&self) -> Result<BTreeMap<String, Credential>>;
    fn name(&self) -> &'static str;
}
