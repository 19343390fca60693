use std::path::PathBuf;
use tracing::warn;

/// Which backend implementation backs the cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Moka,       // bounded, per-entry expiry
    SharedMem,  // dashmap, capacity rejects writes when full
}

impl BackendKind {
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::Moka => "moka",
            BackendKind::SharedMem => "shm",
        }
    }
}

impl TryFrom<&str> for BackendKind {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "moka" => Ok(BackendKind::Moka),
            "shm" | "shared" | "shared-memory" => Ok(BackendKind::SharedMem),
            _ => Err("Invalid backend kind"),
        }
    }
}

pub struct Config {
    pub cache_enabled: bool,
    pub app_tag: String,
    pub install_dir: PathBuf,
    pub backend: BackendKind,
    pub max_entries: Option<u64>,
    pub admin_enabled: bool,
    pub session_user: String, // user id the CLI opens its session as
}

impl Config {
    const DEFAULT_APP_TAG: &str = "CodevTT";
    const DEFAULT_SESSION_USER: &str = "cli";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let install_dir = lookup("CODEV_INSTALL_DIR")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let backend = match lookup("CODEV_CACHE_BACKEND") {
            Some(raw) => BackendKind::try_from(raw.as_str()).unwrap_or_else(|_| {
                warn!("CODEV_CACHE_BACKEND '{}' not recognised, using 'moka'", raw);
                BackendKind::Moka
            }),
            None => BackendKind::Moka,
        };

        let max_entries = lookup("CODEV_CACHE_MAX_ENTRIES").and_then(|raw| {
            raw.parse::<u64>()
                .map_err(|_| warn!("CODEV_CACHE_MAX_ENTRIES '{}' is not a number, ignoring", raw))
                .ok()
        });

        Self {
            cache_enabled: parse_flag(&lookup, "CODEV_CACHE_ENABLED", true),
            app_tag: lookup("CODEV_CACHE_TAG")
                .filter(|tag| !tag.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_APP_TAG.to_string()),
            install_dir,
            backend,
            max_entries,
            admin_enabled: parse_flag(&lookup, "CODEV_CACHE_ADMIN_ENABLED", true),
            session_user: lookup("CODEV_CACHE_USER")
                .filter(|user| !user.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_SESSION_USER.to_string()),
        }
    }
}

fn parse_flag<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => true,
            "0" | "false" | "off" | "no" => false,
            _ => {
                warn!("{} '{}' is not a boolean, using {}", name, raw, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert!(config.cache_enabled);
        assert!(config.admin_enabled);
        assert_eq!(config.app_tag, "CodevTT");
        assert_eq!(config.backend, BackendKind::Moka);
        assert_eq!(config.max_entries, None);
        assert_eq!(config.session_user, "cli");
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("CODEV_CACHE_ENABLED", "off"),
            ("CODEV_CACHE_TAG", "Tally"),
            ("CODEV_INSTALL_DIR", "/srv/codevtt"),
            ("CODEV_CACHE_BACKEND", "shm"),
            ("CODEV_CACHE_MAX_ENTRIES", "512"),
            ("CODEV_CACHE_ADMIN_ENABLED", "0"),
            ("CODEV_CACHE_USER", "1042"),
        ]);

        assert!(!config.cache_enabled);
        assert!(!config.admin_enabled);
        assert_eq!(config.app_tag, "Tally");
        assert_eq!(config.install_dir, PathBuf::from("/srv/codevtt"));
        assert_eq!(config.backend, BackendKind::SharedMem);
        assert_eq!(config.max_entries, Some(512));
        assert_eq!(config.session_user, "1042");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CODEV_CACHE_ENABLED", "maybe"),
            ("CODEV_CACHE_BACKEND", "redis"),
            ("CODEV_CACHE_MAX_ENTRIES", "lots"),
            ("CODEV_CACHE_TAG", "  "),
            ("CODEV_CACHE_USER", ""),
        ]);

        assert!(config.cache_enabled);
        assert_eq!(config.backend, BackendKind::Moka);
        assert_eq!(config.max_entries, None);
        assert_eq!(config.app_tag, "CodevTT");
        assert_eq!(config.session_user, "cli");
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::try_from("MOKA"), Ok(BackendKind::Moka));
        assert_eq!(BackendKind::try_from("shared-memory"), Ok(BackendKind::SharedMem));
        assert!(BackendKind::try_from("apc").is_err());
        assert_eq!(BackendKind::SharedMem.as_str(), "shm");
    }
}
