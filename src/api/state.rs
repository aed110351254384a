use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    config::Config,
    db::KeyValueStore,
    error::{AppError, AppResult},
    middleware::ClientId,
    models::{default_catalog, Category, DecayPolicy},
    services::{
        AuthBackend, ClientContext, DebouncedSearch, FeedGrower, InteractionTracker,
        MetadataProvider, Session,
    },
};

/// Longest pause between two idle sweeps
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Tunables for feed growth and search
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub growth_batch: usize,
    /// 0 draws from the whole ranked catalog
    pub draw_window: usize,
    pub search_debounce: Duration,
    pub search_min_chars: usize,
    pub decay: DecayPolicy,
    /// Feeds and live searches unused for this long are dropped
    pub idle_timeout: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            growth_batch: 2,
            draw_window: 0,
            search_debounce: Duration::from_millis(300),
            search_min_chars: 3,
            decay: DecayPolicy::None,
            idle_timeout: Duration::from_secs(1800),
        }
    }
}

impl FeedSettings {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            growth_batch: config.growth_batch()?,
            draw_window: config.feed_draw_window,
            search_debounce: config.search_debounce(),
            search_min_chars: config.search_min_chars,
            decay: config.decay_policy()?,
            idle_timeout: config.session_idle_timeout(),
        })
    }
}

/// A value plus the last time a request touched it
struct Tracked<V> {
    value: Arc<V>,
    last_used: Instant,
}

impl<V> Tracked<V> {
    fn new(value: V) -> Self {
        Self {
            value: Arc::new(value),
            last_used: Instant::now(),
        }
    }

    fn touch(&mut self) -> Arc<V> {
        self.last_used = Instant::now();
        self.value.clone()
    }

    fn is_idle(&self, max_idle: Duration) -> bool {
        self.last_used.elapsed() >= max_idle
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub provider: Arc<dyn MetadataProvider>,
    pub store: Arc<dyn KeyValueStore>,
    pub session: Session,
    pub tracker: InteractionTracker,
    pub catalog: Arc<Vec<Category>>,
    pub settings: FeedSettings,
    feeds: RwLock<HashMap<Uuid, Tracked<Mutex<FeedGrower>>>>,
    searches: RwLock<HashMap<String, Tracked<DebouncedSearch>>>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn AuthBackend>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                provider,
                store,
                session: Session::new(auth),
                tracker: InteractionTracker::new(settings.decay),
                catalog: Arc::new(default_catalog()),
                settings,
                feeds: RwLock::new(HashMap::new()),
                searches: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Store handle scoped to one client
    pub fn context(&self, client: &ClientId) -> ClientContext {
        ClientContext::new(client.as_str(), self.inner.store.clone())
    }

    pub fn new_feed(&self, ctx: ClientContext) -> FeedGrower {
        FeedGrower::new(ctx, self.inner.catalog.clone(), self.inner.settings.draw_window)
    }

    pub async fn insert_feed(&self, id: Uuid, feed: FeedGrower) {
        self.inner
            .feeds
            .write()
            .await
            .insert(id, Tracked::new(Mutex::new(feed)));
    }

    /// Looks up a feed owned by `client`; other clients' feeds read as missing
    pub async fn feed(&self, id: Uuid, client: &ClientId) -> AppResult<Arc<Mutex<FeedGrower>>> {
        let feed = self
            .inner
            .feeds
            .write()
            .await
            .get_mut(&id)
            .map(Tracked::touch)
            .ok_or_else(|| AppError::NotFound(format!("feed {}", id)))?;

        if feed.lock().await.client_id() != client.as_str() {
            return Err(AppError::NotFound(format!("feed {}", id)));
        }
        Ok(feed)
    }

    pub async fn remove_feed(&self, id: Uuid) {
        self.inner.feeds.write().await.remove(&id);
    }

    /// The client's live search box, created on first use
    pub async fn live_search(&self, client: &ClientId) -> Arc<DebouncedSearch> {
        let mut searches = self.inner.searches.write().await;
        searches
            .entry(client.as_str().to_string())
            .or_insert_with(|| {
                Tracked::new(DebouncedSearch::new(
                    self.inner.provider.clone(),
                    self.inner.settings.search_debounce,
                    self.inner.settings.search_min_chars,
                ))
            })
            .touch()
    }

    pub async fn feed_count(&self) -> usize {
        self.inner.feeds.read().await.len()
    }

    pub async fn live_search_count(&self) -> usize {
        self.inner.searches.read().await.len()
    }

    /// Drops feeds and live searches untouched for `max_idle`.
    /// Returns how many of each were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> (usize, usize) {
        let feeds = {
            let mut feeds = self.inner.feeds.write().await;
            let before = feeds.len();
            feeds.retain(|_, entry| !entry.is_idle(max_idle));
            before - feeds.len()
        };
        let searches = {
            let mut searches = self.inner.searches.write().await;
            let before = searches.len();
            searches.retain(|_, entry| !entry.is_idle(max_idle));
            before - searches.len()
        };

        (feeds, searches)
    }

    /// Periodically evicts idle feeds and live searches
    ///
    /// Sweeps every `idle_timeout`, at most a minute apart.
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let max_idle = self.inner.settings.idle_timeout;
        let period = max_idle.min(MAX_SWEEP_PERIOD).max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;

            loop {
                interval.tick().await;
                let (feeds, searches) = state.evict_idle(max_idle).await;
                if feeds + searches > 0 {
                    tracing::info!(feeds, searches, "Evicted idle client sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::{auth::MockAuthBackend, providers::MockMetadataProvider};

    fn state(idle_timeout: Duration) -> AppState {
        AppState::new(
            Arc::new(MockMetadataProvider::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MockAuthBackend::new()),
            FeedSettings {
                idle_timeout,
                ..FeedSettings::default()
            },
        )
    }

    fn client(id: &str) -> ClientId {
        ClientId::parse(id).unwrap()
    }

    async fn open_feed(state: &AppState, owner: &ClientId) -> Uuid {
        let id = Uuid::new_v4();
        let feed = state.new_feed(state.context(owner));
        state.insert_feed(id, feed).await;
        id
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_recently_used() {
        let state = state(Duration::from_secs(1800));
        let (a, b) = (client("a"), client("b"));

        let kept = open_feed(&state, &a).await;
        let dropped = open_feed(&state, &b).await;
        state.live_search(&b).await;

        tokio::time::advance(Duration::from_secs(600)).await;
        state.feed(kept, &a).await.unwrap();
        tokio::time::advance(Duration::from_secs(1500)).await;

        assert_eq!(state.evict_idle(Duration::from_secs(1800)).await, (1, 1));
        assert!(state.feed(kept, &a).await.is_ok());
        assert!(matches!(
            state.feed(dropped, &b).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(state.live_search_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_drops_abandoned_sessions() {
        let state = state(Duration::from_secs(120));
        for i in 0..100 {
            let owner = client(&format!("browser-{}", i));
            open_feed(&state, &owner).await;
            state.live_search(&owner).await;
        }
        assert_eq!(state.feed_count().await, 100);

        let sweeper = state.spawn_idle_sweeper();
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(state.feed_count().await, 0);
        assert_eq!(state.live_search_count().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_remove_feed() {
        let state = state(Duration::from_secs(1800));
        let owner = client("a");
        let id = open_feed(&state, &owner).await;

        state.remove_feed(id).await;
        assert_eq!(state.feed_count().await, 0);
    }
}
