//! Namespaced key-value cache.
//!
//! A [`NamespacedCache`] prefixes every logical key with a per-session or a
//! deployment-wide namespace before handing it to a shared [`KvBackend`],
//! and can be switched off at runtime without callers noticing anything but
//! cache misses.

pub mod cache;
pub mod domain;
pub mod factory;
pub mod namespace;
pub mod ports;

pub use cache::NamespacedCache;
pub use domain::{Availability, ClearScope, KeyScope, Lookup, StoreConfig};
pub use factory::CacheFactory;
pub use namespace::{InstallIdentity, Namespaces, SessionIdentity};
pub use ports::{KvBackend, StorageFactory};
