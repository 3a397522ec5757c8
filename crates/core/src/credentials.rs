//! Credential and cached user types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Storage key for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key for the serialized user profile
pub const USER_KEY: &str = "user";

/// Access/refresh token pair issued by the backend
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Cached user profile.
///
/// The backend owns the schema; the client keeps whatever JSON object it was
/// handed and only reads a few well-known fields for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub JsonValue);

impl UserProfile {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(JsonValue::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.field("username")
    }

    pub fn email(&self) -> Option<&str> {
        self.field("email")
    }

    /// Best display label: full name, then username, then email
    pub fn display_name(&self) -> String {
        let first = self.field("first_name").unwrap_or_default();
        let last = self.field("last_name").unwrap_or_default();
        let full = format!("{first} {last}").trim().to_string();
        if !full.is_empty() {
            return full;
        }
        self.username()
            .or_else(|| self.email())
            .unwrap_or("unknown user")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials::new("secret-access", "secret-refresh");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = UserProfile::new(json!({
            "username": "asha1",
            "first_name": "Asha",
            "last_name": "Rai",
        }));
        assert_eq!(user.display_name(), "Asha Rai");
    }

    #[test]
    fn test_display_name_falls_back() {
        let user = UserProfile::new(json!({"email": "guest@example.com"}));
        assert_eq!(user.display_name(), "guest@example.com");

        let user = UserProfile::new(json!({"username": "donor", "first_name": ""}));
        assert_eq!(user.display_name(), "donor");
    }
}
