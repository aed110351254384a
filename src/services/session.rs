use std::sync::Arc;

use crate::{
    db::ClientKey,
    error::{AppError, AppResult},
    models::{AuthResponse, LoginRequest, ProfileUpdate, SignupRequest, User},
    services::{auth::AuthBackend, ClientContext},
};

/// The signed-in user of a client, backed by the auth backend
///
/// The user record returned by the backend is kept under the client's `user`
/// key and read back by [`current`](Session::current).
#[derive(Clone)]
pub struct Session {
    backend: Arc<dyn AuthBackend>,
}

impl Session {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    /// Stored user, if any. A corrupted record is cleared.
    pub async fn current(&self, ctx: &ClientContext) -> Option<User> {
        match ctx.load::<User>(ClientKey::User).await {
            Ok(user) => user,
            Err(AppError::Storage(e)) if e.starts_with("Corrupted") => {
                tracing::warn!(client_id = %ctx.client_id(), error = %e, "Corrupted user data found, clearing");
                if let Err(e) = ctx.remove(ClientKey::User).await {
                    tracing::warn!(client_id = %ctx.client_id(), error = %e, "Failed to clear user record");
                }
                None
            }
            Err(e) => {
                tracing::warn!(client_id = %ctx.client_id(), error = %e, "User record unavailable");
                None
            }
        }
    }

    pub async fn signup(&self, ctx: &ClientContext, request: &SignupRequest) -> AppResult<User> {
        let response = self.backend.signup(request).await?;
        self.sign_in(ctx, response).await
    }

    pub async fn login(&self, ctx: &ClientContext, request: &LoginRequest) -> AppResult<User> {
        let response = self.backend.login(request).await?;
        self.sign_in(ctx, response).await
    }

    pub async fn logout(&self, ctx: &ClientContext) {
        if let Err(e) = ctx.remove(ClientKey::User).await {
            tracing::warn!(client_id = %ctx.client_id(), error = %e, "Failed to clear user record");
        }
        tracing::info!(client_id = %ctx.client_id(), "Logged out");
    }

    /// Applies a profile change
    ///
    /// When the backend does not echo the user back, the stored user merged
    /// with `update` is kept instead.
    pub async fn update_profile(
        &self,
        ctx: &ClientContext,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> AppResult<User> {
        let response = self
            .backend
            .update_profile(user_id, update)
            .await
            .map_err(|e| match e {
                AppError::Auth(message) => AppError::Auth(message),
                other => {
                    tracing::error!(error = %other, "Profile update failed");
                    AppError::Auth("Update failed".to_string())
                }
            })?;

        let user = match response.user {
            Some(user) => user,
            None => self
                .current(ctx)
                .await
                .map(|stored| stored.merged_with(update))
                .ok_or_else(|| AppError::Auth("Update failed".to_string()))?,
        };

        self.store_user(ctx, &user).await;
        Ok(user)
    }

    /// Flips `media_id` in the signed-in user's wishlist
    pub async fn toggle_wishlist(
        &self,
        ctx: &ClientContext,
        user_id: &str,
        media_id: &str,
    ) -> AppResult<User> {
        let mut user = self
            .current(ctx)
            .await
            .ok_or_else(|| AppError::Auth("Login required".to_string()))?;

        self.backend.toggle_wishlist(user_id, media_id).await?;

        let added = user.toggle_wishlist(media_id);
        tracing::info!(client_id = %ctx.client_id(), media_id, added, "Wishlist updated");

        self.store_user(ctx, &user).await;
        Ok(user)
    }

    pub async fn forgot_password(&self, email: &str) -> AppResult<Option<String>> {
        Ok(self.backend.forgot_password(email).await?.message)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> AppResult<Option<String>> {
        Ok(self.backend.reset_password(token, password).await?.message)
    }

    async fn sign_in(&self, ctx: &ClientContext, response: AuthResponse) -> AppResult<User> {
        let user = response
            .user
            .ok_or_else(|| AppError::Auth("No user data received".to_string()))?;

        self.store_user(ctx, &user).await;
        tracing::info!(client_id = %ctx.client_id(), user_id = %user.id, "Signed in");
        Ok(user)
    }

    async fn store_user(&self, ctx: &ClientContext, user: &User) {
        if let Err(e) = ctx.save(ClientKey::User, user).await {
            tracing::warn!(client_id = %ctx.client_id(), error = %e, "Failed to store user record");
        }
    }
}
