use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::{db::KeyValueStore, error::AppResult};

/// Creates a Redis client
///
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis-backed key-value store shared by all service instances
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects through a managed connection that reconnects on failure
    pub async fn connect(client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: u64) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[test]
    fn test_create_redis_client_accepts_url() {
        // Opening a client does not connect
        assert!(create_redis_client("redis://localhost:6379").is_ok());
    }
}
