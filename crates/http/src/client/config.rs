//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend path that renews an access token
pub const DEFAULT_REFRESH_PATH: &str = "/api/token/refresh/";

/// Page users are sent to when their session cannot be renewed
pub const DEFAULT_LOGIN_PATH: &str = "/login/";

/// Pages that stay put when the session expires
pub const DEFAULT_EXEMPT_PATHS: &[&str] = &["/guest/profile/"];

/// How concurrent `401` responses share token renewal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Every call that sees a `401` renews on its own; the last write wins
    #[default]
    PerRequest,
    /// Concurrent renewals are serialized and later callers reuse the token
    /// obtained by the first
    SingleFlight,
}

/// Client settings, deserializable from a config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://fundraiser.example.org`
    pub base_url: String,

    /// Request timeout in seconds (0 = transport default)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Token refresh endpoint
    pub refresh_path: String,

    /// Login redirect target
    pub login_path: String,

    /// Path fragments that suppress the login redirect
    pub exempt_paths: Vec<String>,

    /// Refresh coordination
    pub refresh_mode: RefreshMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            user_agent: format!("fundraiser-client/{}", env!("CARGO_PKG_VERSION")),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            exempt_paths: DEFAULT_EXEMPT_PATHS.iter().map(ToString::to_string).collect(),
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl ClientConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.refresh_path, "/api/token/refresh/");
        assert_eq!(config.login_path, "/login/");
        assert_eq!(config.exempt_paths, vec!["/guest/profile/".to_string()]);
        assert_eq!(config.refresh_mode, RefreshMode::PerRequest);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url": "https://example.org", "refresh_mode": "single_flight"}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://example.org");
        assert_eq!(config.refresh_mode, RefreshMode::SingleFlight);
        assert_eq!(config.login_path, "/login/");
    }
}
