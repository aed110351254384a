pub mod cache;
pub mod memory;
pub mod redis;
pub mod store;

mod macros;

pub use cache::Cache;
pub use cache::CacheKey;
pub use cache::CacheWriterHandle;
pub use memory::MemoryStore;
pub use self::redis::{create_redis_client, RedisStore};
pub use store::{ClientKey, KeyValueStore};
