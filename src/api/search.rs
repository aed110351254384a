use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::ClientId,
    models::{MediaItem, Page},
    services::{recent_searches, remember_search, SearchState},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SearchAccepted {
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecentSearchRequest {
    pub term: String,
}

/// Full search results page. Short queries return no results without
/// reaching the provider.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Page<MediaItem>>> {
    let query = params.q.trim();
    if query.chars().count() < state.inner.settings.search_min_chars {
        return Ok(Json(Page::empty()));
    }

    Ok(Json(state.inner.provider.search_multi(query).await?))
}

/// Feeds a keystroke to the client's search-as-you-type box
pub async fn live_input(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(input): Json<SearchInput>,
) -> (StatusCode, Json<SearchAccepted>) {
    let generation = state.live_search(&client).await.input(&input.text);
    (StatusCode::ACCEPTED, Json(SearchAccepted { generation }))
}

/// What the client's search box should show right now
pub async fn live_state(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Json<SearchState> {
    Json(state.live_search(&client).await.current())
}

pub async fn get_recent_searches(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Json<Vec<String>> {
    Json(recent_searches(&state.context(&client)).await)
}

pub async fn add_recent_search(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(request): Json<RecentSearchRequest>,
) -> Json<Vec<String>> {
    Json(remember_search(&state.context(&client), &request.term).await)
}
