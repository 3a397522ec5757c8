//! Where the user is, and how to send them to the login page

use crate::client::config::{DEFAULT_EXEMPT_PATHS, DEFAULT_LOGIN_PATH};

/// Host surface that knows the current page and can navigate away from it
pub trait Navigator: Send + Sync {
    /// Path of the page the request was issued from
    fn current_path(&self) -> String;

    /// Move the user to `path`
    fn redirect(&self, path: &str);
}

/// Navigator for hosts without pages; redirects are only logged
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn redirect(&self, path: &str) {
        tracing::info!(login_path = path, "Login required");
    }
}

/// Login redirect policy applied when a session cannot be renewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub login_path: String,
    pub exempt_paths: Vec<String>,
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            exempt_paths: DEFAULT_EXEMPT_PATHS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl LoginRedirect {
    /// Whether `path` contains one of the exempt fragments
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths
            .iter()
            .any(|exempt| !exempt.is_empty() && path.contains(exempt.as_str()))
    }

    /// Redirect unless the navigator is on an exempt page; returns whether it did
    pub fn apply(&self, navigator: &dyn Navigator) -> bool {
        let current = navigator.current_path();
        if self.is_exempt(&current) {
            tracing::debug!(current = %current, "Skipping login redirect on exempt page");
            return false;
        }
        navigator.redirect(&self.login_path);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedNavigator {
        path: &'static str,
        redirects: Mutex<Vec<String>>,
    }

    impl Navigator for FixedNavigator {
        fn current_path(&self) -> String {
            self.path.to_string()
        }

        fn redirect(&self, path: &str) {
            self.redirects.lock().unwrap().push(path.to_string());
        }
    }

    fn navigator(path: &'static str) -> FixedNavigator {
        FixedNavigator {
            path,
            redirects: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_exempt_matches_fragment() {
        let policy = LoginRedirect::default();
        assert!(policy.is_exempt("/guest/profile/"));
        assert!(policy.is_exempt("/en/guest/profile/edit"));
        assert!(!policy.is_exempt("/birthday-campaign/4/"));
    }

    #[test]
    fn test_empty_fragment_never_matches() {
        let policy = LoginRedirect {
            login_path: "/login/".into(),
            exempt_paths: vec![String::new()],
        };
        assert!(!policy.is_exempt("/anything"));
    }

    #[test]
    fn test_apply_redirects_outside_exempt_pages() {
        let policy = LoginRedirect::default();

        let nav = navigator("/birthday-campaign/4/");
        assert!(policy.apply(&nav));
        assert_eq!(*nav.redirects.lock().unwrap(), vec!["/login/".to_string()]);

        let nav = navigator("/guest/profile/");
        assert!(!policy.apply(&nav));
        assert!(nav.redirects.lock().unwrap().is_empty());
    }
}
