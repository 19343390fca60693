use crate::domain::{ClearScope, KeyScope, Lookup};
use crate::namespace::Namespaces;
use crate::ports::KvBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, TtlSecs};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};

/// Namespaced view over a shared key-value backend.
///
/// Every logical key is prefixed with either the session namespace or the
/// deployment-wide global namespace before it reaches the backend. Failures
/// never escape: writes report `false`, reads report a miss.
pub struct NamespacedCache {
    backend: Option<Arc<dyn KvBackend>>,
    namespaces: Namespaces,
    enabled: AtomicBool,
}

impl NamespacedCache {
    /// Open a handle. The handle starts enabled only when a backend is
    /// present, the backend reports itself available and `app_enabled` is set.
    pub fn new(backend: Option<Arc<dyn KvBackend>>, app_enabled: bool, namespaces: Namespaces) -> Self {
        let enabled = match &backend {
            Some(backend) => {
                let availability = backend.availability();
                if !availability.is_available() {
                    debug!(
                        "Cache backend unavailable (present = {}, enabled = {})",
                        availability.present, availability.enabled
                    );
                }
                availability.is_available() && app_enabled
            }
            None => {
                debug!("No cache backend configured");
                false
            }
        };

        if enabled {
            debug!("Cache is enabled. keyBase = '{}'", namespaces.session());
        }

        Self {
            backend,
            namespaces,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// A handle with no backend at all; every call is a no-op
    pub fn disabled(namespaces: Namespaces) -> Self {
        Self::new(None, false, namespaces)
    }

    /// `false` whenever there is no backend to talk to
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) && self.backend.is_some()
    }

    /// Toggle this handle only; other handles on the same backend keep their flag
    pub fn set_enabled(&self, enabled: bool) {
        debug!("set_enabled({})", enabled);
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    fn active_backend(&self) -> Option<&dyn KvBackend> {
        if self.enabled.load(Ordering::Relaxed) {
            self.backend.as_deref()
        } else {
            None
        }
    }

    /// Store `value` under `key`. `TtlSecs(0)` keeps the entry until it is
    /// evicted or deleted. Returns `true` when the cache is disabled.
    pub fn set<T>(&self, key: &str, value: &T, ttl: TtlSecs, scope: KeyScope) -> bool
    where
        T: Serialize + ?Sized,
    {
        let Some(backend) = self.active_backend() else {
            return true;
        };
        if key.is_empty() {
            warn!("set called with an empty key");
            return false;
        }

        let real_key = self.namespaces.real_key(key, scope);
        debug!("set key = '{}' ttl = {} sec.", real_key, ttl.0);

        let payload = match serde_json::to_vec(value).map_err(|e| Error::Encoding(e.to_string())) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error saving key {}: {}", real_key, e);
                return false;
            }
        };

        match backend.store(&real_key, payload, ttl) {
            Ok(response) if response.stored => true,
            Ok(response) => {
                error!("Error saving key {}: {}", real_key, response.message);
                false
            }
            Err(e) => {
                error!("Error saving key {}: {}", real_key, e);
                false
            }
        }
    }

    /// Read `key`. Absence, disabled cache and backend failure all come back as `None`.
    pub fn get<T>(&self, key: &str, scope: KeyScope) -> Option<T>
    where
        T: DeserializeOwned,
    {
        self.lookup(key, scope).into_option()
    }

    /// Same as [`get`](Self::get), without collapsing backend failures into a miss
    pub fn lookup<T>(&self, key: &str, scope: KeyScope) -> Lookup<T>
    where
        T: DeserializeOwned,
    {
        let Some(backend) = self.active_backend() else {
            debug!("get key = '{}' : cache NOT enabled", key);
            return Lookup::Miss;
        };
        if key.is_empty() {
            warn!("get called with an empty key");
            return Lookup::Miss;
        }

        let real_key = self.namespaces.real_key(key, scope);
        debug!("get key = '{}'", real_key);

        match backend.exists_key(&real_key) {
            Ok(response) if response.exists => {}
            Ok(_) => {
                debug!("get key = '{}' : not found in cache", key);
                return Lookup::Miss;
            }
            Err(e) => {
                error!("Error probing key {}: {}", real_key, e);
                return Lookup::BackendError(e.to_string());
            }
        }

        // The entry may expire between the probe and the fetch
        let payload = match backend.fetch(&real_key) {
            Ok(response) if response.found => response.value,
            Ok(_) => {
                error!("Error fetching key {}: empty response", real_key);
                return Lookup::BackendError("empty response".to_string());
            }
            Err(e) => {
                error!("Error fetching key {}: {}", real_key, e);
                return Lookup::BackendError(e.to_string());
            }
        };

        match serde_json::from_slice(&payload).map_err(|e| Error::Encoding(e.to_string())) {
            Ok(value) => Lookup::Hit(value),
            Err(e) => {
                error!("Error decoding key {}: {}", real_key, e);
                Lookup::BackendError(e.to_string())
            }
        }
    }

    /// Remove `key` if present. Deleting an absent key succeeds.
    pub fn delete(&self, key: &str, scope: KeyScope) -> bool {
        let Some(backend) = self.active_backend() else {
            return true;
        };
        if key.is_empty() {
            warn!("delete called with an empty key");
            return false;
        }

        let real_key = self.namespaces.real_key(key, scope);
        debug!("delete key = '{}'", real_key);

        match backend.exists_key(&real_key) {
            Ok(response) if !response.exists => return true,
            Ok(_) => {}
            Err(e) => {
                error!("Error probing key {}: {}", real_key, e);
                return false;
            }
        }

        match backend.delete_key(&real_key) {
            Ok(_) => true,
            Err(e) => {
                error!("Error deleting key {}: {}", real_key, e);
                false
            }
        }
    }

    /// Existence probe only; nothing is fetched
    pub fn exists(&self, key: &str, scope: KeyScope) -> bool {
        let Some(backend) = self.active_backend() else {
            return false;
        };
        if key.is_empty() {
            return false;
        }

        let real_key = self.namespaces.real_key(key, scope);
        match backend.exists_key(&real_key) {
            Ok(response) => response.exists,
            Err(e) => {
                error!("Error probing key {}: {}", real_key, e);
                false
            }
        }
    }

    /// Administrative: wipes `scope` across the whole backend, including
    /// other sessions' entries and the global namespace.
    pub fn clear(&self, scope: ClearScope) -> bool {
        let Some(backend) = self.active_backend() else {
            return true;
        };

        match backend.clear_scope(scope) {
            Ok(response) => {
                warn!("Cache cleared ({:?}): {} entries removed", scope, response.cleared);
                true
            }
            Err(e) => {
                error!("Error clearing cache ({:?}): {}", scope, e);
                false
            }
        }
    }
}

impl Debug for NamespacedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("enabled", &self.is_enabled())
            .field("namespaces", &self.namespaces)
            .finish()
    }
}
