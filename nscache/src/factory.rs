use crate::cache::NamespacedCache;
use crate::namespace::{InstallIdentity, Namespaces, SessionIdentity};
use crate::ports::KvBackend;
use shared::config::Config;
use std::sync::Arc;
use tracing::debug;

/// Opens per-session cache handles over one shared backend.
///
/// Callers hold the factory for the lifetime of the process and open a
/// fresh [`NamespacedCache`] for each request/session context.
#[derive(Clone)]
pub struct CacheFactory {
    backend: Option<Arc<dyn KvBackend>>,
    app_enabled: bool,
    app_tag: String,
    install: InstallIdentity,
}

impl CacheFactory {
    pub fn new(
        backend: Option<Arc<dyn KvBackend>>,
        app_enabled: bool,
        app_tag: impl Into<String>,
        install: InstallIdentity,
    ) -> Self {
        Self {
            backend,
            app_enabled,
            app_tag: app_tag.into(),
            install,
        }
    }

    pub fn from_config(config: &Config, backend: Option<Arc<dyn KvBackend>>) -> Self {
        Self::new(
            backend,
            config.cache_enabled,
            config.app_tag.clone(),
            InstallIdentity::from_path(&config.install_dir),
        )
    }

    /// Open a handle bound to `session`
    pub fn open(&self, session: &SessionIdentity) -> NamespacedCache {
        debug!(
            "Opening cache handle for user '{}' session '{}'",
            session.user_id, session.session_id
        );
        let namespaces = Namespaces::new(&self.app_tag, session, &self.install);
        NamespacedCache::new(self.backend.clone(), self.app_enabled, namespaces)
    }

    pub fn install(&self) -> &InstallIdentity {
        &self.install
    }
}

impl std::fmt::Debug for CacheFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFactory")
            .field("backend", &self.backend.as_ref().map(|_| "<dyn KvBackend>"))
            .field("app_enabled", &self.app_enabled)
            .field("app_tag", &self.app_tag)
            .field("install", &self.install)
            .finish()
    }
}
