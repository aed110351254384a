//! Movie metadata provider abstraction
//!
//! The feed, search and detail routes only talk to [`MetadataProvider`]; the
//! TMDB client is the production implementation and tests swap in mocks.
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{CategoryId, ContentKind, DiscoverFilters, Expansion, MediaItem, Page, TimeWindow},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Read-only access to the movie metadata catalog
///
/// List endpoints are typed down to the fields the feed needs. Detail
/// endpoints return the provider document untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn trending(&self, kind: ContentKind, window: TimeWindow) -> AppResult<Page<MediaItem>>;

    async fn upcoming(&self) -> AppResult<Page<MediaItem>>;

    async fn top_rated(&self) -> AppResult<Page<MediaItem>>;

    /// Titles of one genre, ordered by `sort` (e.g. `popularity.desc`)
    async fn by_genre(
        &self,
        kind: ContentKind,
        genre: CategoryId,
        sort: &str,
    ) -> AppResult<Page<MediaItem>>;

    async fn details(&self, id: u64, kind: ContentKind, expansions: &[Expansion])
        -> AppResult<Value>;

    /// Movies, series and people matching free text
    async fn search_multi(&self, query: &str) -> AppResult<Page<MediaItem>>;

    async fn discover(&self, kind: ContentKind, filters: &DiscoverFilters)
        -> AppResult<Page<MediaItem>>;

    async fn person_details(&self, id: u64) -> AppResult<Value>;

    async fn collection_details(&self, id: u64) -> AppResult<Value>;

    /// Resolves an id without knowing its kind
    ///
    /// Tries the movie endpoint first and falls back to series. The returned
    /// document carries a `media_type` field naming the kind that matched.
    async fn lookup(&self, id: u64) -> AppResult<Value> {
        for kind in [ContentKind::Movie, ContentKind::Tv] {
            match self.details(id, kind, &[]).await {
                Ok(mut doc) => {
                    if let Value::Object(map) = &mut doc {
                        map.insert("media_type".to_string(), Value::from(kind.as_str()));
                    }
                    return Ok(doc);
                }
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::NotFound(format!("title {}", id)))
    }

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
