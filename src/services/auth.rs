use reqwest::{Client as HttpClient, Method};
use serde::Serialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{AuthResponse, LoginRequest, ProfileUpdate, SignupRequest},
};

/// Account operations offered by the auth backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse>;

    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse>;

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate)
        -> AppResult<AuthResponse>;

    async fn forgot_password(&self, email: &str) -> AppResult<AuthResponse>;

    async fn reset_password(&self, token: &str, password: &str) -> AppResult<AuthResponse>;

    /// Adds the title to the user's wishlist, or removes it if present
    async fn toggle_wishlist(&self, user_id: &str, media_id: &str) -> AppResult<AuthResponse>;

    fn name(&self) -> &'static str;
}

/// JSON-over-HTTP auth backend
///
/// Error responses carry `{message}`; that message becomes the
/// [`AppError::Auth`] text, with a per-operation fallback when it is missing.
#[derive(Clone)]
pub struct HttpAuthBackend {
    http_client: HttpClient,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> AppResult<AuthResponse> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http_client.request(method, &url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<AuthResponse>()
                .await
                .ok()
                .and_then(|payload| payload.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());

            tracing::warn!(path, status = %status, message = %message, "Auth backend rejected request");
            return Err(AppError::Auth(message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse> {
        self.send(Method::POST, "/signup", request, "Signup failed")
            .await
    }

    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        self.send(Method::POST, "/login", request, "Login failed").await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> AppResult<AuthResponse> {
        self.send(
            Method::PUT,
            &format!("/update/{}", user_id),
            update,
            "Update failed",
        )
        .await
    }

    async fn forgot_password(&self, email: &str) -> AppResult<AuthResponse> {
        self.send(
            Method::POST,
            "/forgot-password",
            &json!({ "email": email }),
            "Failed to send reset email",
        )
        .await
    }

    async fn reset_password(&self, token: &str, password: &str) -> AppResult<AuthResponse> {
        self.send(
            Method::POST,
            &format!("/reset-password/{}", token),
            &json!({ "password": password }),
            "Password reset failed",
        )
        .await
    }

    async fn toggle_wishlist(&self, user_id: &str, media_id: &str) -> AppResult<AuthResponse> {
        self.send(
            Method::PUT,
            &format!("/wishlist/{}", user_id),
            &json!({ "movieId": media_id }),
            "Failed to update wishlist",
        )
        .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
