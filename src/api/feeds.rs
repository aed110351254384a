use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::MAX_GROW_COUNT,
    error::{AppError, AppResult},
    middleware::ClientId,
    models::{CategoryId, FeedSection, PreferenceCounter},
    services::{fetch_feed_head, tracker::load_counter},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub id: Uuid,
    pub sections: Vec<FeedSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GrowRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GrowResponse {
    pub id: Uuid,
    pub added: Vec<FeedSection>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    #[serde(default)]
    pub genre_ids: Option<Vec<CategoryId>>,
}

/// Builds a feed: the editorial head plus a first batch of personalized rows
pub async fn create_feed(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> AppResult<(StatusCode, Json<FeedResponse>)> {
    let head = fetch_feed_head(state.inner.provider.clone()).await?;

    let mut feed = state.new_feed(state.context(&client));
    feed.initialize(head.banner, head.rows)?;
    feed.grow(state.inner.settings.growth_batch).await?;

    let id = Uuid::new_v4();
    let sections = feed.sections().to_vec();
    state.insert_feed(id, feed).await;

    tracing::info!(feed_id = %id, client_id = %client, sections = sections.len(), "Feed created");

    Ok((StatusCode::CREATED, Json(FeedResponse { id, sections })))
}

/// Appends personalized rows; the client calls this when it reaches the end
pub async fn grow_feed(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
    request: Option<Json<GrowRequest>>,
) -> AppResult<Json<GrowResponse>> {
    let count = request
        .and_then(|Json(r)| r.count)
        .unwrap_or(state.inner.settings.growth_batch);
    if count > MAX_GROW_COUNT {
        return Err(AppError::InvalidInput(format!(
            "count must be at most {}",
            MAX_GROW_COUNT
        )));
    }

    let feed = state.feed(id, &client).await?;
    let mut feed = feed.lock().await;
    let added = feed.grow(count).await?;

    Ok(Json(GrowResponse {
        id,
        added,
        total: feed.len(),
    }))
}

pub async fn get_feed(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FeedResponse>> {
    let feed = state.feed(id, &client).await?;
    let sections = feed.lock().await.sections().to_vec();
    Ok(Json(FeedResponse { id, sections }))
}

pub async fn delete_feed(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.feed(id, &client).await?;
    state.remove_feed(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Counts a card click towards the clicked title's genres
pub async fn record_interaction(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(request): Json<InteractionRequest>,
) -> StatusCode {
    let ctx = state.context(&client);
    state
        .inner
        .tracker
        .record(&ctx, request.genre_ids.as_deref())
        .await;
    StatusCode::NO_CONTENT
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Json<PreferenceCounter> {
    Json(load_counter(&state.context(&client)).await)
}
