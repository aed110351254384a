//! TMDB v3 metadata provider
//!
//! Every call authenticates with the `api_key` query parameter. List
//! responses are cached briefly since trending and genre rows change slowly;
//! detail documents are cached longer.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CategoryId, ContentKind, DiscoverFilters, Expansion, MediaItem, Page, TimeWindow},
    services::providers::MetadataProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

const LIST_CACHE_TTL: u64 = 600; // 10 minutes
const DETAIL_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(path.trim_start_matches('/').to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn list(
        &self,
        key: CacheKey,
        path: String,
        query: Vec<(&str, String)>,
    ) -> AppResult<Page<MediaItem>> {
        cached!(self.cache, key, LIST_CACHE_TTL, async {
            let page: Page<MediaItem> = self.get_json(&path, &query).await?;

            tracing::debug!(
                path = %path,
                results = page.results.len(),
                provider = "tmdb",
                "List fetched"
            );

            Ok::<_, AppError>(page)
        })
    }

    async fn document(
        &self,
        key: CacheKey,
        path: String,
        query: Vec<(&str, String)>,
    ) -> AppResult<Value> {
        cached!(self.cache, key, DETAIL_CACHE_TTL, async {
            self.get_json::<Value>(&path, &query).await
        })
    }
}

fn append_to_response(expansions: &[Expansion]) -> Vec<(&'static str, String)> {
    if expansions.is_empty() {
        return Vec::new();
    }

    let joined = expansions
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(",");
    vec![("append_to_response", joined)]
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn trending(&self, kind: ContentKind, window: TimeWindow) -> AppResult<Page<MediaItem>> {
        self.list(
            CacheKey::Trending(kind, window),
            format!("/trending/{}/{}", kind, window),
            Vec::new(),
        )
        .await
    }

    async fn upcoming(&self) -> AppResult<Page<MediaItem>> {
        self.list(CacheKey::Upcoming, "/movie/upcoming".to_string(), Vec::new())
            .await
    }

    async fn top_rated(&self) -> AppResult<Page<MediaItem>> {
        self.list(CacheKey::TopRated, "/movie/top_rated".to_string(), Vec::new())
            .await
    }

    async fn by_genre(
        &self,
        kind: ContentKind,
        genre: CategoryId,
        sort: &str,
    ) -> AppResult<Page<MediaItem>> {
        self.list(
            CacheKey::ByGenre(kind, genre, sort.to_string()),
            format!("/discover/{}", kind),
            vec![
                ("with_genres", genre.to_string()),
                ("sort_by", sort.to_string()),
            ],
        )
        .await
    }

    async fn details(
        &self,
        id: u64,
        kind: ContentKind,
        expansions: &[Expansion],
    ) -> AppResult<Value> {
        let path = format!("/{}/{}", kind, id);
        let query = append_to_response(expansions);

        // Bare lookups and expanded detail pages are different documents
        if expansions.is_empty() {
            return self.get_json(&path, &query).await;
        }

        self.document(CacheKey::Details(kind, id), path, query).await
    }

    async fn search_multi(&self, query: &str) -> AppResult<Page<MediaItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page = self
            .list(
                CacheKey::Search(query.to_string()),
                "/search/multi".to_string(),
                vec![
                    ("query", query.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            provider = "tmdb",
            "Search completed"
        );

        Ok(page)
    }

    async fn discover(
        &self,
        kind: ContentKind,
        filters: &DiscoverFilters,
    ) -> AppResult<Page<MediaItem>> {
        self.list(
            CacheKey::Discover(kind, filters.clone()),
            format!("/discover/{}", kind),
            filters.query_pairs(kind),
        )
        .await
    }

    async fn person_details(&self, id: u64) -> AppResult<Value> {
        self.document(
            CacheKey::Person(id),
            format!("/person/{}", id),
            vec![("append_to_response", "combined_credits".to_string())],
        )
        .await
    }

    async fn collection_details(&self, id: u64) -> AppResult<Value> {
        self.document(
            CacheKey::Collection(id),
            format!("/collection/{}", id),
            Vec::new(),
        )
        .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
