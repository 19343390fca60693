#![deny(clippy::all)]

use crate::domain::response::{
    ClearResponse, DeleteResponse, ExistsResponse, GetResponse, PutResponse,
};
use crate::domain::{Availability, ClearScope, StoreConfig};
use shared::{Result, TtlSecs};
use std::sync::Arc;

// Ports are the pluggable extension points for the underlying key-value store

/// Port for creating a backend from configuration
pub trait StorageFactory: Send + Sync + 'static {
    fn create_from_config(&self, config: &StoreConfig) -> Arc<dyn KvBackend>;
}

/// Port for the shared key-value store every namespaced handle writes into.
/// Keys arrive fully prefixed; the backend knows nothing about namespaces.
pub trait KvBackend: Send + Sync + 'static {
    /// Queried once per handle, at construction
    fn availability(&self) -> Availability;

    /// Store `value` under `key`, replacing any existing entry
    fn store(&self, key: &str, value: Vec<u8>, ttl: TtlSecs) -> Result<PutResponse>;

    /// Fetch the payload under `key`; a miss is `Error::NotFound`
    fn fetch(&self, key: &str) -> Result<GetResponse<Vec<u8>>>;

    fn exists_key(&self, key: &str) -> Result<ExistsResponse>;

    fn delete_key(&self, key: &str) -> Result<DeleteResponse>;

    /// Wipe a whole scope of the store, regardless of namespace
    fn clear_scope(&self, scope: ClearScope) -> Result<ClearResponse>;
}
