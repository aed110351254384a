use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{
        CategoryId, ContentKind, DiscoverFilters, MediaItem, Page, TimeWindow, DETAIL_EXPANSIONS,
        POPULARITY_DESC,
    },
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub window: TimeWindow,
}

pub async fn trending(
    State(state): State<AppState>,
    Path(kind): Path<ContentKind>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Page<MediaItem>>> {
    Ok(Json(state.inner.provider.trending(kind, params.window).await?))
}

pub async fn upcoming(State(state): State<AppState>) -> AppResult<Json<Page<MediaItem>>> {
    Ok(Json(state.inner.provider.upcoming().await?))
}

pub async fn top_rated(State(state): State<AppState>) -> AppResult<Json<Page<MediaItem>>> {
    Ok(Json(state.inner.provider.top_rated().await?))
}

/// Titles for a personalized row, most popular first
pub async fn by_genre(
    State(state): State<AppState>,
    Path((kind, genre)): Path<(ContentKind, CategoryId)>,
) -> AppResult<Json<Page<MediaItem>>> {
    Ok(Json(
        state
            .inner
            .provider
            .by_genre(kind, genre, POPULARITY_DESC)
            .await?,
    ))
}

/// Detail page document with videos, credits and similar titles
pub async fn title_details(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, u64)>,
) -> AppResult<Json<Value>> {
    Ok(Json(
        state
            .inner
            .provider
            .details(id, kind, &DETAIL_EXPANSIONS)
            .await?,
    ))
}

/// Resolves an id of unknown kind, as stored in wishlists
pub async fn lookup(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.inner.provider.lookup(id).await?))
}

pub async fn discover(
    State(state): State<AppState>,
    Path(kind): Path<ContentKind>,
    Query(filters): Query<DiscoverFilters>,
) -> AppResult<Json<Page<MediaItem>>> {
    Ok(Json(state.inner.provider.discover(kind, &filters).await?))
}

pub async fn person(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.inner.provider.person_details(id).await?))
}

pub async fn collection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.inner.provider.collection_details(id).await?))
}
