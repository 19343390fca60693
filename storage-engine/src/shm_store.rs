use crate::clock::{Clock, SystemClock, saturating_millis};
use dashmap::DashMap;
use nscache::domain::response::{
    ClearResponse, DeleteResponse, ExistsResponse, GetResponse, PutResponse,
};
use nscache::{Availability, ClearScope, KvBackend, StoreConfig};
use shared::{Error, Result, TtlSecs};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
struct Entry {
    payload: Vec<u8>,
    expires_at_ms: Option<u64>,
}

impl Entry {
    fn is_live(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_none_or(|expires_at| now_ms < expires_at)
    }
}

/// Shared-memory style store: one flat key space, per-entry expiry checked
/// on access, and a hard entry limit that rejects new keys once reached.
pub struct SharedMemoryStore {
    name: String,
    entries: DashMap<String, Entry>,
    max_entries: Option<u64>,
    admin_enabled: bool,
    clock: Arc<dyn Clock>,
}

impl SharedMemoryStore {
    pub fn new(name: impl Into<String>, max_entries: Option<u64>, admin_enabled: bool) -> Self {
        Self::with_clock(name, max_entries, admin_enabled, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        max_entries: Option<u64>,
        admin_enabled: bool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            max_entries,
            admin_enabled,
            clock,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.name.clone(), config.max_entries, config.admin_enabled)
    }

    /// Number of live entries
    pub fn entry_count(&self) -> u64 {
        let now = self.clock.now_ms();
        self.entries.iter().filter(|entry| entry.is_live(now)).count() as u64
    }

    fn purge_expired(&self, now_ms: u64) {
        self.entries.retain(|_, entry| entry.is_live(now_ms));
    }

    fn is_full(&self, key: &str) -> bool {
        match self.max_entries {
            Some(max) => !self.entries.contains_key(key) && self.entries.len() as u64 >= max,
            None => false,
        }
    }
}

impl KvBackend for SharedMemoryStore {
    fn availability(&self) -> Availability {
        Availability::new(true, self.admin_enabled)
    }

    fn store(&self, key: &str, value: Vec<u8>, ttl: TtlSecs) -> Result<PutResponse> {
        let now = self.clock.now_ms();

        if self.is_full(key) {
            self.purge_expired(now);
            if self.is_full(key) {
                return Err(Error::StoreFull);
            }
        }

        let entry = Entry {
            payload: value,
            expires_at_ms: ttl
                .as_duration()
                .map(|ttl| now.saturating_add(saturating_millis(ttl))),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(PutResponse::new(true, "Successfully stored"))
    }

    fn fetch(&self, key: &str) -> Result<GetResponse<Vec<u8>>> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(GetResponse::new(true, entry.payload.clone()));
            }
        }

        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Err(Error::NotFound)
    }

    fn exists_key(&self, key: &str) -> Result<ExistsResponse> {
        let now = self.clock.now_ms();
        let exists = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now));
        Ok(ExistsResponse::new(exists))
    }

    fn delete_key(&self, key: &str) -> Result<DeleteResponse> {
        let now = self.clock.now_ms();
        let deleted = self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now));
        Ok(DeleteResponse::new(deleted))
    }

    fn clear_scope(&self, scope: ClearScope) -> Result<ClearResponse> {
        match scope {
            ClearScope::User => {
                // expired entries were already gone from the caller's view
                self.purge_expired(self.clock.now_ms());
                let cleared = self.entries.len() as u64;
                self.entries.clear();
                debug!("Store '{}' cleared, {} entries dropped", self.name, cleared);
                Ok(ClearResponse::new(cleared))
            }
            // nothing but user entries lives here
            ClearScope::System => Ok(ClearResponse::new(0)),
        }
    }
}

impl Debug for SharedMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemoryStore")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}
