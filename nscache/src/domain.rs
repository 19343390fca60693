use shared::config::{BackendKind, Config};

pub mod response {

    #[derive(Clone, Debug)]
    pub struct PutResponse {
        pub stored: bool,
        pub message: String,
    }

    impl PutResponse {
        pub fn new(stored: bool, message: impl Into<String>) -> Self {
            Self {
                stored,
                message: message.into(),
            }
        }
    }

    #[derive(Clone, Debug)]
    pub struct GetResponse<V> {
        pub found: bool,
        pub value: V,
    }

    impl<V> GetResponse<V> {
        pub fn new(found: bool, value: V) -> Self {
            Self { found, value }
        }
    }

    #[derive(Clone, Debug)]
    pub struct ExistsResponse {
        pub exists: bool,
    }

    impl ExistsResponse {
        pub fn new(exists: bool) -> Self {
            Self { exists }
        }
    }

    #[derive(Clone, Debug)]
    pub struct DeleteResponse {
        pub deleted: bool,
    }

    impl DeleteResponse {
        pub fn new(deleted: bool) -> Self {
            Self { deleted }
        }
    }

    #[derive(Clone, Debug)]
    pub struct ClearResponse {
        pub cleared: u64,
    }

    impl ClearResponse {
        pub fn new(cleared: u64) -> Self {
            Self { cleared }
        }
    }
}

/// Availability flags reported by a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Availability {
    pub present: bool, // backend compiled in / reachable
    pub enabled: bool, // administrative switch
}

impl Availability {
    pub fn new(present: bool, enabled: bool) -> Self {
        Self { present, enabled }
    }

    pub fn is_available(&self) -> bool {
        self.present && self.enabled
    }
}

/// Which namespace a logical key lives in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyScope {
    /// Private to one (user, session) pair
    #[default]
    Session,
    /// Shared by every session of the deployment
    Global,
}

impl From<bool> for KeyScope {
    fn from(is_global: bool) -> Self {
        if is_global {
            KeyScope::Global
        } else {
            KeyScope::Session
        }
    }
}

/// Area of the backend wiped by an administrative clear
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClearScope {
    /// Every user entry, across all namespaces
    #[default]
    User,
    /// Backend-internal (non-user) area
    System,
}

impl TryFrom<&str> for ClearScope {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(ClearScope::User),
            "system" | "opcode" => Ok(ClearScope::System),
            _ => Err("Invalid clear scope"),
        }
    }
}

/// Outcome of a read, before it is collapsed into `Option` for callers
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
    BackendError(String),
}

impl<T> Lookup<T> {
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Lookup::BackendError(_))
    }

    /// Caller-facing view: errors and misses are both `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::BackendError(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub name: String,             // backend name, shows up in logs
    pub kind: BackendKind,        // implementation to build
    pub max_entries: Option<u64>, // None = unbounded
    pub admin_enabled: bool,      // administrative switch
}

impl StoreConfig {
    pub fn new(
        name: impl Into<String>,
        kind: BackendKind,
        max_entries: Option<u64>,
        admin_enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            max_entries,
            admin_enabled,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.app_tag.clone(),
            config.backend,
            config.max_entries,
            config.admin_enabled,
        )
    }
}
