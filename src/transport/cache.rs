//! Per-fingerprint transport cache.

use super::fingerprint::Fingerprint;
use crate::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Memoizes transport clients by [`Fingerprint`].
///
/// Each fingerprint owns a slot; concurrent first use of the same fingerprint
/// waits on that slot, so the build function runs once. A failed build leaves
/// nothing behind and the next caller builds again.
pub struct TransportCache<T> {
    slots: Mutex<HashMap<Fingerprint, Slot<T>>>,
}

impl<T> TransportCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    // The map only ever holds fully-formed entries, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, Slot<T>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, fingerprint: &Fingerprint) -> Slot<T> {
        self.lock()
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Return the cached transport for `fingerprint`, building it with `build`
    /// on first use. Build failures surface as [`Error::Init`] naming `provider_id`.
    pub async fn resolve<F, Fut, E>(
        &self,
        fingerprint: &Fingerprint,
        provider_id: &str,
        build: F,
    ) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        let slot = self.slot(fingerprint);
        if let Some(existing) = slot.get() {
            debug!(provider_id, fingerprint = fingerprint.short(), "transport cache hit");
            return Ok(existing.clone());
        }

        let built = slot
            .get_or_try_init(|| async {
                info!(provider_id, fingerprint = fingerprint.short(), "creating transport");
                build().await.map(Arc::new)
            })
            .await;

        match built {
            Ok(transport) => Ok(transport.clone()),
            Err(e) => {
                error!(provider_id, error = %e, "transport initialization failed");
                self.discard_empty(fingerprint, &slot);
                Err(Error::init(provider_id))
            }
        }
    }

    fn discard_empty(&self, fingerprint: &Fingerprint, slot: &Slot<T>) {
        let mut slots = self.lock();
        let is_same_empty_slot = slots
            .get(fingerprint)
            .map(|s| Arc::ptr_eq(s, slot) && !s.initialized())
            .unwrap_or(false);
        if is_same_empty_slot {
            slots.remove(fingerprint);
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<T>> {
        self.lock().get(fingerprint).and_then(|s| s.get().cloned())
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.get(fingerprint).is_some()
    }

    /// Number of built transports.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|s| s.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached transport.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> Default for TransportCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
