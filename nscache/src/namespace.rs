use crate::domain::KeyScope;
use std::path::{Path, PathBuf};

/// The (user, session) pair a handle is opened for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub session_id: String,
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// Stable identity of one deployment, shared by all of its sessions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallIdentity(String);

impl InstallIdentity {
    /// Derive the identity from the deployment root directory.
    /// `.` components and trailing separators are dropped, spaces and
    /// backslashes become `-`.
    pub fn from_path(root: impl AsRef<Path>) -> Self {
        let normalized: PathBuf = root.as_ref().components().collect();
        Self::new(normalized.to_string_lossy())
    }

    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().replace([' ', '\\'], "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Key prefixes of a handle. Computed once, never mutated.
///
/// Every component is length-prefixed and each scope carries its own marker
/// (`s` / `g`), so a physical key decodes to exactly one
/// (scope, identity, logical key) triple whatever characters the parts hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespaces {
    session: String,
    global: String,
}

impl Namespaces {
    pub fn new(app_tag: &str, session: &SessionIdentity, install: &InstallIdentity) -> Self {
        Self {
            session: format!(
                "{}_s{}_{}_",
                app_tag,
                length_prefixed(&session.user_id),
                length_prefixed(&session.session_id)
            ),
            global: format!("{}_g{}_", app_tag, length_prefixed(install.as_str())),
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn global(&self) -> &str {
        &self.global
    }

    pub fn prefix(&self, scope: KeyScope) -> &str {
        match scope {
            KeyScope::Session => &self.session,
            KeyScope::Global => &self.global,
        }
    }

    /// Physical backend key for a logical key
    pub fn real_key(&self, key: &str, scope: KeyScope) -> String {
        let prefix = self.prefix(scope);
        let mut real_key = String::with_capacity(prefix.len() + key.len());
        real_key.push_str(prefix);
        real_key.push_str(key);
        real_key
    }
}

fn length_prefixed(component: &str) -> String {
    format!("{}:{}", component.len(), component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_namespace_layout() {
        let ns = Namespaces::new(
            "CodevTT",
            &SessionIdentity::new("42", "abc123"),
            &InstallIdentity::new("/var/www/codevtt"),
        );

        assert_eq!(ns.session(), "CodevTT_s2:42_6:abc123_");
        assert_eq!(ns.real_key("teams", KeyScope::Session), "CodevTT_s2:42_6:abc123_teams");
    }

    #[test]
    fn test_global_namespace_layout() {
        let ns = Namespaces::new(
            "CodevTT",
            &SessionIdentity::new("42", "abc123"),
            &InstallIdentity::new("/var/www/codevtt"),
        );

        assert_eq!(ns.global(), "CodevTT_g16:/var/www/codevtt_");
        assert_eq!(ns.real_key("teams", KeyScope::Global), "CodevTT_g16:/var/www/codevtt_teams");
    }

    #[test]
    fn test_same_user_different_sessions_do_not_collide() {
        let install = InstallIdentity::new("/srv/app");
        let a = Namespaces::new("CodevTT", &SessionIdentity::new("7", "s1"), &install);
        let b = Namespaces::new("CodevTT", &SessionIdentity::new("7", "s2"), &install);

        assert_ne!(a.session(), b.session());
        assert_eq!(a.global(), b.global());
    }

    #[test]
    fn test_underscores_in_identities_do_not_collide() {
        let install = InstallIdentity::new("/srv/app");
        let a = Namespaces::new("CodevTT", &SessionIdentity::new("1_2", "s"), &install);
        let b = Namespaces::new("CodevTT", &SessionIdentity::new("1", "2_s"), &install);

        assert_ne!(
            a.real_key("secret", KeyScope::Session),
            b.real_key("secret", KeyScope::Session)
        );
    }

    #[test]
    fn test_underscores_in_keys_do_not_cross_sessions() {
        let install = InstallIdentity::new("/srv/app");
        let a = Namespaces::new("CodevTT", &SessionIdentity::new("1", "s"), &install);
        let b = Namespaces::new("CodevTT", &SessionIdentity::new("1", "s_x"), &install);

        assert_ne!(
            a.real_key("x_y", KeyScope::Session),
            b.real_key("y", KeyScope::Session)
        );
    }

    #[test]
    fn test_global_keys_never_match_session_keys() {
        // install path shaped like a session composite
        let install = InstallIdentity::new("1:1_1:s");
        let ns = Namespaces::new("CodevTT", &SessionIdentity::new("1", "s"), &install);

        assert_ne!(ns.real_key("k", KeyScope::Global), ns.real_key("k", KeyScope::Session));
        assert!(!ns.real_key("k", KeyScope::Global).starts_with(ns.session()));
    }

    #[test]
    fn test_install_identity_normalization() {
        assert_eq!(
            InstallIdentity::new(r"C:\Program Files\codevtt").as_str(),
            "C:-Program-Files-codevtt"
        );
        assert_eq!(
            InstallIdentity::from_path("/srv/code vtt/").as_str(),
            "/srv/code-vtt"
        );
        assert_eq!(
            InstallIdentity::from_path("/srv/./codevtt"),
            InstallIdentity::from_path("/srv/codevtt")
        );
    }
}
