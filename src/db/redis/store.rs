use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::Value;

use crate::{
    db::{Collection, DocumentPath, DocumentStore},
    error::{AppError, AppResult},
};

/// Redis-backed document store
///
/// Each document is a JSON string stored under its path. Documents that belong
/// to a listable collection are also indexed in a Redis set so the collection
/// can be listed without scanning the keyspace.
#[derive(Clone)]
pub struct RedisDocumentStore {
    conn: ConnectionManager,
}

fn unavailable(e: redis::RedisError) -> AppError {
    tracing::error!(error = %e, "Redis document store request failed");
    AppError::StoreUnavailable(e.to_string())
}

fn index_key(collection: &Collection) -> String {
    format!("index:{}", collection)
}

fn decode(key: &str, json: &str) -> AppResult<Value> {
    serde_json::from_str(json).map_err(|e| {
        tracing::error!(key = %key, error = %e, "Stored document is not valid JSON");
        AppError::Internal(format!("Document decode error at {}: {}", key, e))
    })
}

impl RedisDocumentStore {
    /// Connects eagerly; the manager reconnects on its own afterwards
    pub async fn new(redis_client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(redis_client)
            .await
            .map_err(unavailable)?;
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>> {
        let key = path.to_string();
        let mut conn = self.conn.clone();
        let stored: Option<String> = conn.get(&key).await.map_err(unavailable)?;

        tracing::debug!(key = %key, hit = stored.is_some(), "Document read");

        stored.map(|json| decode(&key, &json)).transpose()
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> AppResult<()> {
        let key = path.to_string();
        let json = serde_json::to_string(&document)
            .map_err(|e| AppError::Internal(format!("Document serialization error: {}", e)))?;

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().set(&key, json).ignore();
        if let Some(collection) = path.collection() {
            pipe.sadd(index_key(&collection), &key).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(unavailable)?;

        tracing::debug!(key = %key, "Document written");

        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> AppResult<bool> {
        let key = path.to_string();
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().del(&key);
        if let Some(collection) = path.collection() {
            pipe.srem(index_key(&collection), &key).ignore();
        }
        let (removed,): (u64,) = pipe.query_async(&mut conn).await.map_err(unavailable)?;

        tracing::debug!(key = %key, removed = removed, "Document deleted");

        Ok(removed > 0)
    }

    async fn list(&self, collection: &Collection) -> AppResult<Vec<Value>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .smembers(index_key(collection))
            .await
            .map_err(unavailable)?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        tracing::debug!(
            collection = %collection,
            indexed = keys.len(),
            "Collection listed"
        );

        keys.iter()
            .zip(stored)
            .filter_map(|(key, json)| json.map(|json| decode(key, &json)))
            .collect()
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    async fn conn_members(client: &Client, collection: &Collection) -> Vec<String> {
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        conn.smembers(index_key(collection)).await.unwrap()
    }

    #[test]
    fn test_index_key_prefix() {
        let collection = Collection::watched("u1").unwrap();
        assert_eq!(index_key(&collection), "index:users/u1/watched/");
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_store_unavailable() {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let result = RedisDocumentStore::new(client).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_set_get_and_list_roundtrip() {
        let client = create_redis_client(&redis_url()).unwrap();
        let store = RedisDocumentStore::new(client.clone()).await.unwrap();

        let user = format!("test-{}", uuid::Uuid::new_v4());
        let first = DocumentPath::watched(&user, "1").unwrap();
        let second = DocumentPath::watched(&user, "2").unwrap();

        store.set(&first, serde_json::json!({ "n": 1 })).await.unwrap();
        store.set(&second, serde_json::json!({ "n": 2 })).await.unwrap();

        assert_eq!(
            store.get(&first).await.unwrap(),
            Some(serde_json::json!({ "n": 1 }))
        );

        let collection = Collection::watched(&user).unwrap();
        let mut listed = store.list(&collection).await.unwrap();
        listed.sort_by_key(|v| v["n"].as_i64());
        assert_eq!(listed.len(), 2);

        assert!(store.delete(&first).await.unwrap());
        assert!(!store.delete(&first).await.unwrap());
        assert_eq!(store.get(&first).await.unwrap(), None);
        assert_eq!(
            store.list(&collection).await.unwrap(),
            vec![serde_json::json!({ "n": 2 })]
        );
        let indexed: Vec<String> = conn_members(&client, &collection).await;
        assert_eq!(indexed, vec![second.to_string()]);

        // Clean up
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn
            .del(vec![first.to_string(), second.to_string(), index_key(&collection)])
            .await
            .unwrap();
    }
}
