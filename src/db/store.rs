use std::fmt::Display;

use crate::error::AppResult;

/// Durable string key-value storage
///
/// Every call may fail; callers decide whether a failure is fatal. Values are
/// opaque strings, usually JSON.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Stores a value that expires after `ttl` seconds
    async fn set_ex(&self, key: &str, value: &str, ttl: u64) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Per-client records kept in the key-value store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Preferences,
    RecentSearches,
    User,
}

impl ClientKey {
    /// Full storage key for a client
    pub fn for_client(&self, client_id: &str) -> String {
        format!("client:{}:{}", client_id, self)
    }
}

impl Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKey::Preferences => f.write_str("user_preferences"),
            ClientKey::RecentSearches => f.write_str("recentSearches"),
            ClientKey::User => f.write_str("user"),
        }
    }
}
