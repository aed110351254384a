use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::db::KeyValueStore;
use crate::error::AppResult;
use crate::models::{CategoryId, ContentKind, DiscoverFilters, TimeWindow};

/// Keys for cached metadata provider responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Trending(ContentKind, TimeWindow),
    Upcoming,
    TopRated,
    ByGenre(ContentKind, CategoryId, String),
    Details(ContentKind, u64),
    Search(String),
    Discover(ContentKind, DiscoverFilters),
    Person(u64),
    Collection(u64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Trending(kind, window) => write!(f, "tmdb:trending:{}:{}", kind, window),
            CacheKey::Upcoming => write!(f, "tmdb:upcoming"),
            CacheKey::TopRated => write!(f, "tmdb:top_rated"),
            CacheKey::ByGenre(kind, genre, sort) => {
                write!(f, "tmdb:genre:{}:{}:{}", kind, genre, sort)
            }
            CacheKey::Details(kind, id) => write!(f, "tmdb:details:{}:{}", kind, id),
            CacheKey::Search(query) => write!(f, "tmdb:search:{}", query.trim().to_lowercase()),
            CacheKey::Discover(kind, filters) => {
                write!(f, "tmdb:discover:{}:{}", kind, filters.cache_fragment())
            }
            CacheKey::Person(id) => write!(f, "tmdb:person:{}", id),
            CacheKey::Collection(id) => write!(f, "tmdb:collection:{}", id),
        }
    }
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache-aside layer for provider responses on top of a [`KeyValueStore`]
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task and waits for it to flush
    /// all pending writes.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Must be called inside a tokio runtime. Cache writes are handed to the
    /// background task so they never delay a response.
    pub fn new(store: Arc<dyn KeyValueStore>) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_store = store.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(writer_store, write_rx, shutdown_rx).await;
        });

        let cache = Self { store, write_tx };
        let handle = CacheWriterHandle { shutdown_tx, task };

        (cache, handle)
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown, drains whatever is already queued and exits. A dropped
    /// handle leaves the writer running until every `Cache` clone is gone.
    async fn cache_writer_task(
        store: Arc<dyn KeyValueStore>,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(store = store.name(), "Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = store.set_ex(&msg.key, &msg.value, msg.ttl).await {
                        tracing::error!(error = %e, key = %msg.key, "Failed to write cache entry");
                    }
                }
                Some(()) = shutdown_rx.recv() => {
                    let mut flushed = 0usize;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = store.set_ex(&msg.key, &msg.value, msg.ttl).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
                else => break,
            }
        }
    }

    /// Retrieves a value from the cache by key
    ///
    /// A stored value that no longer deserializes is treated as a miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = self.store.get(&key.to_string()).await?;

        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Discarding unreadable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized here and written by the background task, so
    /// this returns before the write happens.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
