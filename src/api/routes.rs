use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{client_id_middleware, make_span_with_client_id};

use super::{feeds, metadata, search, session, AppState};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_client_id))
        .layer(middleware::from_fn(client_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Feed
        .route("/feeds", post(feeds::create_feed))
        .route(
            "/feeds/:id",
            get(feeds::get_feed).delete(feeds::delete_feed),
        )
        .route("/feeds/:id/grow", post(feeds::grow_feed))
        .route("/interactions", post(feeds::record_interaction))
        .route("/preferences", get(feeds::get_preferences))
        // Metadata
        .route("/trending/:kind", get(metadata::trending))
        .route("/upcoming", get(metadata::upcoming))
        .route("/top-rated", get(metadata::top_rated))
        .route("/genres/:kind/:genre_id", get(metadata::by_genre))
        .route("/titles/:kind/:id", get(metadata::title_details))
        .route("/lookup/:id", get(metadata::lookup))
        .route("/discover/:kind", get(metadata::discover))
        .route("/people/:id", get(metadata::person))
        .route("/collections/:id", get(metadata::collection))
        // Search
        .route("/search", get(search::search))
        .route(
            "/search/live",
            get(search::live_state).post(search::live_input),
        )
        .route(
            "/recent-searches",
            get(search::get_recent_searches).post(search::add_recent_search),
        )
        // Session
        .route("/session", get(session::current))
        .route("/auth/signup", post(session::signup))
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
        .route("/auth/profile/:user_id", put(session::update_profile))
        .route("/auth/forgot-password", post(session::forgot_password))
        .route("/auth/reset-password/:token", post(session::reset_password))
        .route("/wishlist/:user_id", put(session::toggle_wishlist))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
