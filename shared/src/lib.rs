// shared/src/lib.rs

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not found")]
    NotFound,
    #[error("store full")]
    StoreFull,
    #[error("encoding: {0}")]
    Encoding(String),
    #[error("backend: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Entry lifetime in whole seconds. `TtlSecs(0)` never expires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TtlSecs(pub u64);

impl TtlSecs {
    pub const NEVER: TtlSecs = TtlSecs(0);

    pub fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// Lifetime as a duration, `None` when the entry never expires
    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_never() {
            None
        } else {
            Some(Duration::from_secs(self.0))
        }
    }
}

impl From<u64> for TtlSecs {
    fn from(secs: u64) -> Self {
        TtlSecs(secs)
    }
}

pub mod config;
