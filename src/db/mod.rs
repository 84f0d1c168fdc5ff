pub mod cache;
mod macros;
pub mod memory;
pub mod redis;
pub mod store;

pub use cache::{Cache, CacheBackend, CacheKey, MemoryCacheBackend};
pub use memory::MemoryDocumentStore;
pub use self::redis::{create_redis_client, CacheWriterHandle, RedisCacheBackend, RedisDocumentStore};
pub use store::{
    list_documents, read_document, write_document, Collection, DocumentPath, DocumentStore,
};
