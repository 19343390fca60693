use crate::moka_store::MokaStore;
use crate::shm_store::SharedMemoryStore;
use nscache::{KvBackend, StorageFactory, StoreConfig};
use shared::config::BackendKind;
use std::sync::Arc;
use tracing::info;

/// Builds the backend named by a [`StoreConfig`]
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineFactory;

impl StorageFactory for EngineFactory {
    fn create_from_config(&self, config: &StoreConfig) -> Arc<dyn KvBackend> {
        info!(
            "Creating '{}' backend '{}' (max_entries = {:?}, admin_enabled = {})",
            config.kind.as_str(),
            config.name,
            config.max_entries,
            config.admin_enabled
        );
        match config.kind {
            BackendKind::Moka => Arc::new(MokaStore::from_config(config)),
            BackendKind::SharedMem => Arc::new(SharedMemoryStore::from_config(config)),
        }
    }
}
