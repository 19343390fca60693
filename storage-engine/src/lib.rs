// storage-engine/src/lib.rs

pub mod clock;
pub mod factory;
pub mod moka_store;
pub mod shm_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use factory::EngineFactory;
pub use moka_store::MokaStore;
pub use shm_store::SharedMemoryStore;
