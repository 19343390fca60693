use moka::Expiry;
use moka::sync::Cache;
use nscache::domain::response::{
    ClearResponse, DeleteResponse, ExistsResponse, GetResponse, PutResponse,
};
use nscache::{Availability, ClearScope, KvBackend, StoreConfig};
use shared::{Error, Result, TtlSecs};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone, Debug)]
struct StoredValue {
    payload: Arc<Vec<u8>>,
    ttl: Option<Duration>,
}

/// Expiry driven by the TTL stored alongside each value
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    // an overwrite restarts the clock with the new TTL
    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Moka-based backend with per-entry TTL.
/// Bounded stores evict instead of rejecting writes.
pub struct MokaStore {
    cache: Cache<String, StoredValue>,
    admin_enabled: bool,
}

impl MokaStore {
    /// Create a moka store from name and optional capacity
    pub fn new(name: String, max_entries: Option<u64>, admin_enabled: bool) -> Self {
        let mut builder = Cache::builder().name(&name).expire_after(PerEntryTtl);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            admin_enabled,
        }
    }

    /// Create an unbounded, enabled store
    pub fn new_unbounded(name: String) -> Self {
        Self::new(name, None, true)
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.name.clone(), config.max_entries, config.admin_enabled)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl KvBackend for MokaStore {
    fn availability(&self) -> Availability {
        Availability::new(true, self.admin_enabled)
    }

    fn store(&self, key: &str, value: Vec<u8>, ttl: TtlSecs) -> Result<PutResponse> {
        let stored = StoredValue {
            payload: Arc::new(value),
            ttl: ttl.as_duration(),
        };
        self.cache.insert(key.to_string(), stored);
        Ok(PutResponse::new(true, "Successfully stored"))
    }

    fn fetch(&self, key: &str) -> Result<GetResponse<Vec<u8>>> {
        match self.cache.get(key) {
            Some(stored) => Ok(GetResponse::new(true, stored.payload.as_ref().clone())),
            None => Err(Error::NotFound), // Either doesn't exist or TTL expired
        }
    }

    fn exists_key(&self, key: &str) -> Result<ExistsResponse> {
        Ok(ExistsResponse::new(self.cache.contains_key(key)))
    }

    fn delete_key(&self, key: &str) -> Result<DeleteResponse> {
        let existed = self.cache.remove(key).is_some();
        Ok(DeleteResponse::new(existed))
    }

    fn clear_scope(&self, scope: ClearScope) -> Result<ClearResponse> {
        match scope {
            ClearScope::User => {
                let cleared = self.entry_count();
                self.cache.invalidate_all();
                self.cache.run_pending_tasks();
                debug!("Moka store cleared, {} entries dropped", cleared);
                Ok(ClearResponse::new(cleared))
            }
            ClearScope::System => Ok(ClearResponse::new(0)),
        }
    }
}

impl Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.cache.name())
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_moka_store_put_and_fetch() {
        let store = MokaStore::new_unbounded("test".to_string());

        let put_response = store.store("hello", b"world".to_vec(), TtlSecs::NEVER).unwrap();
        assert!(put_response.stored);
        assert_eq!(put_response.message, "Successfully stored");

        let get_response = store.fetch("hello").unwrap();
        assert!(get_response.found);
        assert_eq!(get_response.value, b"world".to_vec());
    }

    #[test]
    fn test_moka_store_delete() {
        let store = MokaStore::new_unbounded("test".to_string());

        store.store("test_key", b"test_value".to_vec(), TtlSecs::NEVER).unwrap();

        let delete_response = store.delete_key("test_key").unwrap();
        assert!(delete_response.deleted);

        let result = store.fetch("test_key");
        assert!(matches!(result.unwrap_err(), Error::NotFound));
        assert!(!store.exists_key("test_key").unwrap().exists);
    }

    #[test]
    fn test_moka_store_fetch_nonexistent() {
        let store = MokaStore::new_unbounded("test".to_string());

        let result = store.fetch("nonexistent");
        assert!(matches!(result.unwrap_err(), Error::NotFound));
    }

    #[test]
    fn test_moka_store_overwrite() {
        let store = MokaStore::new_unbounded("test".to_string());

        store.store("key", b"value1".to_vec(), TtlSecs::NEVER).unwrap();
        store.store("key", b"value2".to_vec(), TtlSecs::NEVER).unwrap();

        assert_eq!(store.fetch("key").unwrap().value, b"value2".to_vec());
    }

    #[test]
    fn test_moka_store_per_entry_ttl() {
        let store = MokaStore::new_unbounded("test".to_string());

        store.store("short", b"v".to_vec(), TtlSecs(1)).unwrap();
        store.store("forever", b"v".to_vec(), TtlSecs::NEVER).unwrap();

        assert!(store.exists_key("short").unwrap().exists);

        // Wait for expiration
        sleep(Duration::from_millis(1_200));

        assert!(!store.exists_key("short").unwrap().exists);
        assert!(matches!(store.fetch("short").unwrap_err(), Error::NotFound));
        assert!(store.exists_key("forever").unwrap().exists);
    }

    #[test]
    fn test_moka_store_clear() {
        let store = MokaStore::new_unbounded("test".to_string());

        store.store("a", b"1".to_vec(), TtlSecs::NEVER).unwrap();
        store.store("b", b"2".to_vec(), TtlSecs::NEVER).unwrap();

        assert!(store.clear_scope(ClearScope::User).is_ok());
        assert!(!store.exists_key("a").unwrap().exists);
        assert!(!store.exists_key("b").unwrap().exists);
    }

    #[test]
    fn test_moka_store_bounded() {
        let store = MokaStore::new("test".to_string(), Some(2), true);

        store.store("key1", b"1".to_vec(), TtlSecs::NEVER).unwrap();
        store.store("key2", b"2".to_vec(), TtlSecs::NEVER).unwrap();
        store.store("key3", b"3".to_vec(), TtlSecs::NEVER).unwrap();

        assert!(store.entry_count() <= 2, "Store should have at most 2 entries");
    }
}
