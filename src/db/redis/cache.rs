use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::db::CacheBackend;
use crate::error::AppResult;

/// Opens a Redis client shared by the document store and the cache
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache backend storing entries in Redis with `SET EX`
///
/// Reads go straight to Redis. Writes are queued to a single writer task so a
/// response never waits on a cache write.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
    queue: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the writer task once every queued write has been attempted
///
/// Dropping the handle without calling `shutdown` stops the writer as well.
pub struct CacheWriterHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        // The task may already have exited if every backend was dropped
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl RedisCacheBackend {
    pub async fn new(redis_client: Client) -> AppResult<(Self, CacheWriterHandle)> {
        let conn = ConnectionManager::new(redis_client).await?;
        let (queue, pending) = mpsc::unbounded_channel();
        let (stop, stopped) = oneshot::channel();

        let task = tokio::spawn(run_writer(conn.clone(), pending, stopped));

        Ok((Self { conn, queue }, CacheWriterHandle { stop, task }))
    }
}

async fn run_writer(
    mut conn: ConnectionManager,
    mut pending: mpsc::UnboundedReceiver<PendingWrite>,
    mut stopped: oneshot::Receiver<()>,
) {
    tracing::debug!("Cache writer started");
    let mut failures = 0u64;

    loop {
        tokio::select! {
            write = pending.recv() => match write {
                Some(write) => {
                    if let Err(e) = store_entry(&mut conn, write).await {
                        failures += 1;
                        tracing::error!(error = %e, failures = failures, "Cache write failed");
                    }
                }
                None => break,
            },
            _ = &mut stopped => {
                pending.close();
                let mut flushed = 0usize;
                while let Some(write) = pending.recv().await {
                    if let Err(e) = store_entry(&mut conn, write).await {
                        tracing::error!(error = %e, "Cache write failed during shutdown");
                    }
                    flushed += 1;
                }
                tracing::info!(flushed = flushed, "Cache writer drained");
                break;
            }
        }
    }

    tracing::debug!("Cache writer stopped");
}

async fn store_entry(conn: &mut ConnectionManager, write: PendingWrite) -> AppResult<()> {
    // SET EX rejects a zero TTL
    if write.ttl == 0 {
        let _: () = conn.del(write.key).await?;
        return Ok(());
    }
    let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
    Ok(())
}

#[async_trait::async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }

    fn set_in_background(&self, key: String, value: String, ttl: u64) {
        if self.queue.send(PendingWrite { key, value, ttl }).is_err() {
            tracing::warn!("Cache writer has stopped, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Cache, CacheKey};
    use std::sync::Arc;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    async fn live_cache() -> (Cache, CacheWriterHandle, Client) {
        let client = create_redis_client(&redis_url()).unwrap();
        let (backend, handle) = RedisCacheBackend::new(client.clone()).await.unwrap();
        (Cache::new(Arc::new(backend)), handle, client)
    }

    async fn remove(client: &Client, key: &CacheKey) {
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_unknown_user_misses() {
        let (cache, _handle, _client) = live_cache().await;

        let key = CacheKey::Recommendations("no-such-user".to_string());
        let cached: Option<Vec<u64>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(cached, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_shutdown_flushes_queued_writes() {
        let (cache, handle, client) = live_cache().await;

        let key = CacheKey::Recommendations("flush-on-shutdown".to_string());
        cache.set_in_background(&key, &vec![603u64, 27205], 60);

        handle.shutdown().await;

        let cached: Option<Vec<u64>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(cached, Some(vec![603, 27205]));

        remove(&client, &key).await;
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_zero_ttl_removes_entry() {
        let (cache, handle, client) = live_cache().await;

        let key = CacheKey::Recommendations("zero-ttl".to_string());
        cache.set_in_background(&key, &vec![1u64], 60);
        cache.set_in_background(&key, &vec![1u64], 0);
        handle.shutdown().await;

        let cached: Option<Vec<u64>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(cached, None);

        remove(&client, &key).await;
    }
}
