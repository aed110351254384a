use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::{
    db::{ClientKey, KeyValueStore},
    error::{AppError, AppResult},
};

/// One browser client's view of the key-value store
///
/// Everything that used to be ambient browser storage (interaction counts,
/// recent searches, the signed-in user) goes through this handle, scoped to
/// the client id.
#[derive(Clone)]
pub struct ClientContext {
    client_id: String,
    store: Arc<dyn KeyValueStore>,
}

impl ClientContext {
    pub fn new(client_id: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client_id: client_id.into(),
            store,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Reads and decodes a record
    ///
    /// Absent records, and the literal `null`/`undefined` strings browsers
    /// leave behind, read as `None`. Undecodable content is a storage error.
    pub async fn load<T: DeserializeOwned>(&self, key: ClientKey) -> AppResult<Option<T>> {
        let raw = self.store.get(&key.for_client(&self.client_id)).await?;

        match raw.as_deref().map(str::trim) {
            None | Some("") | Some("null") | Some("undefined") => Ok(None),
            Some(json) => serde_json::from_str(json).map(Some).map_err(|e| {
                AppError::Storage(format!("Corrupted {} record: {}", key, e))
            }),
        }
    }

    pub async fn save<T: Serialize>(&self, key: ClientKey, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.store
            .set(&key.for_client(&self.client_id), &json)
            .await
    }

    pub async fn remove(&self, key: ClientKey) -> AppResult<()> {
        self.store.delete(&key.for_client(&self.client_id)).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::db::MemoryStore;

    /// A store whose every call fails
    pub struct FailingStore;

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }

        async fn set_ex(&self, _key: &str, _value: &str, _ttl: u64) -> AppResult<()> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    pub fn memory_context() -> (ClientContext, MemoryStore) {
        let store = MemoryStore::new();
        (ClientContext::new("test-client", Arc::new(store.clone())), store)
    }

    pub fn failing_context() -> ClientContext {
        ClientContext::new("test-client", Arc::new(FailingStore))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::memory_context;
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let (ctx, _store) = memory_context();
        ctx.save(ClientKey::RecentSearches, &vec!["dune"]).await.unwrap();

        let loaded: Option<Vec<String>> = ctx.load(ClientKey::RecentSearches).await.unwrap();
        assert_eq!(loaded, Some(vec!["dune".to_string()]));
    }

    #[tokio::test]
    async fn test_browser_placeholders_read_as_absent() {
        let (ctx, store) = memory_context();
        for placeholder in ["null", "undefined", ""] {
            store
                .set(&ClientKey::User.for_client("test-client"), placeholder)
                .await
                .unwrap();
            let loaded: Option<Vec<String>> = ctx.load(ClientKey::User).await.unwrap();
            assert_eq!(loaded, None);
        }
    }

    #[tokio::test]
    async fn test_corrupted_record_is_storage_error() {
        let (ctx, store) = memory_context();
        store
            .set(&ClientKey::Preferences.for_client("test-client"), "{oops")
            .await
            .unwrap();

        let loaded: AppResult<Option<Vec<String>>> = ctx.load(ClientKey::Preferences).await;
        assert!(matches!(loaded, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_clients_are_isolated() {
        let store: Arc<dyn KeyValueStore> = Arc::new(crate::db::MemoryStore::new());
        let a = ClientContext::new("a", store.clone());
        let b = ClientContext::new("b", store);

        a.save(ClientKey::RecentSearches, &vec!["alien"]).await.unwrap();
        let seen_by_b: Option<Vec<String>> = b.load(ClientKey::RecentSearches).await.unwrap();
        assert_eq!(seen_by_b, None);
    }
}
