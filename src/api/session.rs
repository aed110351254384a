use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::ClientId,
    models::{LoginRequest, ProfileUpdate, SignupRequest, User},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub media_id: String,
}

pub async fn current(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Json<SessionResponse> {
    let user = state.inner.session.current(&state.context(&client)).await;
    Json(SessionResponse { user })
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state
        .inner
        .session
        .signup(&state.context(&client), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .inner
        .session
        .login(&state.context(&client), &request)
        .await?;
    Ok(Json(user))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> StatusCode {
    state.inner.session.logout(&state.context(&client)).await;
    StatusCode::NO_CONTENT
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    let user = state
        .inner
        .session
        .update_profile(&state.context(&client), &user_id, &update)
        .await?;
    Ok(Json(user))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.inner.session.forgot_password(&request.email).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = state
        .inner
        .session
        .reset_password(&token, &request.password)
        .await?;
    Ok(Json(MessageResponse { message }))
}

/// Adds or removes a title from the signed-in user's wishlist
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(user_id): Path<String>,
    Json(request): Json<WishlistRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .inner
        .session
        .toggle_wishlist(&state.context(&client), &user_id, &request.media_id)
        .await?;
    Ok(Json(user))
}
