//! Session context: typed access to persisted credentials and the cached user

use crate::credentials::{ACCESS_TOKEN_KEY, Credentials, REFRESH_TOKEN_KEY, USER_KEY, UserProfile};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::CoreResult;
use std::sync::Arc;

/// Client session backed by an injectable key-value store.
///
/// Cloning is cheap and every clone shares the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn access_token(&self) -> CoreResult<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> CoreResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// The stored token pair, or `None` unless both halves are present
    pub async fn credentials(&self) -> CoreResult<Option<Credentials>> {
        let access = self.access_token().await?;
        let refresh = self.refresh_token().await?;
        Ok(match (access, refresh) {
            (Some(access), Some(refresh)) => Some(Credentials { access, refresh }),
            _ => None,
        })
    }

    pub async fn set_tokens(&self, credentials: &Credentials) -> CoreResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, &credentials.access).await?;
        self.store.set(REFRESH_TOKEN_KEY, &credentials.refresh).await
    }

    /// Replace the access token, leaving the refresh token untouched
    pub async fn set_access_token(&self, access: &str) -> CoreResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, access).await
    }

    /// Cached user; a missing or unparseable entry reads as `None`
    pub async fn user(&self) -> CoreResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring malformed cached user: {e}");
                Ok(None)
            }
        }
    }

    pub async fn set_user(&self, user: &UserProfile) -> CoreResult<()> {
        let serialized = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &serialized).await
    }

    /// Remove tokens and cached user
    pub async fn clear(&self) -> CoreResult<()> {
        self.store.remove(USER_KEY).await?;
        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await?;
        tracing::debug!("Session credentials cleared");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> CoreResult<bool> {
        Ok(self.access_token().await?.is_some())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::MockKeyValueStore;
    use crate::CoreError;
    use serde_json::json;

    #[tokio::test]
    async fn test_tokens_roundtrip() {
        let session = Session::in_memory();
        assert_eq!(session.credentials().await.unwrap(), None);
        assert!(!session.is_authenticated().await.unwrap());

        session
            .set_tokens(&Credentials::new("A1", "R1"))
            .await
            .unwrap();
        assert_eq!(
            session.credentials().await.unwrap(),
            Some(Credentials::new("A1", "R1"))
        );

        session.set_access_token("A2").await.unwrap();
        assert_eq!(session.access_token().await.unwrap().as_deref(), Some("A2"));
        assert_eq!(session.refresh_token().await.unwrap().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_partial_pair_is_not_credentials() {
        let store = Arc::new(MemoryStore::with_entries([(ACCESS_TOKEN_KEY, "A1")]));
        let session = Session::new(store);

        assert_eq!(session.credentials().await.unwrap(), None);
        assert_eq!(session.access_token().await.unwrap().as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        session
            .set_tokens(&Credentials::new("A1", "R1"))
            .await
            .unwrap();
        session
            .set_user(&UserProfile::new(json!({"id": 7, "username": "donor"})))
            .await
            .unwrap();
        store.set("theme", "dark").await.unwrap();

        session.clear().await.unwrap();

        assert_eq!(store.keys().await, vec!["theme".to_string()]);
        assert_eq!(session.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_stored_as_json() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        let user = UserProfile::new(json!({"id": 7, "username": "donor"}));
        session.set_user(&user).await.unwrap();

        let raw = store.get(USER_KEY).await.unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["username"], "donor");
        assert_eq!(session.user().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_malformed_user_reads_as_none() {
        let store = Arc::new(MemoryStore::with_entries([(USER_KEY, "{broken")]));
        let session = Session::new(store);
        assert_eq!(session.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(CoreError::storage("disk unavailable")));

        let session = Session::new(Arc::new(store));
        let err = session.access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }
}
