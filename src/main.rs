use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yeonghwa_api::{
    api::{create_router, AppState, FeedSettings},
    config::Config,
    db::{create_redis_client, Cache, KeyValueStore, MemoryStore, RedisStore},
    services::{HttpAuthBackend, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yeonghwa_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let settings = FeedSettings::from_config(&config)?;

    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url)?;
            Arc::new(RedisStore::connect(client).await?)
        }
        None => {
            tracing::warn!("REDIS_URL not set, client state will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(store = store.name(), "Key-value store ready");

    let (cache, cache_handle) = Cache::new(store.clone());
    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let auth = Arc::new(HttpAuthBackend::new(config.auth_api_url.clone()));

    let state = AppState::new(provider, store, auth, settings);
    let sweeper = state.spawn_idle_sweeper();
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    cache_handle.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
