pub mod cache;
pub mod store;

pub use cache::{create_redis_client, CacheWriterHandle, RedisCacheBackend};
pub use store::RedisDocumentStore;
