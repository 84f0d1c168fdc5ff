use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelbook_api::{
    clock::SystemClock,
    config::Config,
    db::{create_redis_client, Cache, DocumentStore, RedisCacheBackend, RedisDocumentStore},
    routes::{create_router, AppState},
    services::{HttpRecommender, RecommendationService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        redis_url = %config.redis_url,
        recommender_url = %config.recommender_url,
        "Configuration loaded"
    );

    let redis_client = create_redis_client(&config.redis_url)?;
    let store = Arc::new(
        RedisDocumentStore::new(redis_client.clone())
            .await
            .context("Failed to connect the Redis document store")?,
    );
    tracing::info!(store = store.name(), "Document store ready");
    let (cache_backend, cache_writer) = RedisCacheBackend::new(redis_client)
        .await
        .context("Failed to connect the Redis cache")?;
    let cache = Cache::new(Arc::new(cache_backend));

    let recommendations = RecommendationService::new(
        store.clone(),
        Arc::new(HttpRecommender::new(config.recommender_url.clone())),
        cache,
        config.recommendation_cache_ttl,
        config.favorites_limit,
    );

    let state = AppState::new(
        store,
        Arc::new(SystemClock),
        recommendations,
        config.history_months,
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Flushing pending cache writes");
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
