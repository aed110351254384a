use serde::{Deserialize, Serialize};

/// User record as returned by the auth backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Provider title ids, kept as strings
    #[serde(default)]
    pub wishlist: Vec<String>,
}

impl User {
    pub fn has_in_wishlist(&self, media_id: &str) -> bool {
        self.wishlist.iter().any(|id| id == media_id)
    }

    /// Adds the id if absent, removes it otherwise. Returns whether it is now present.
    pub fn toggle_wishlist(&mut self, media_id: &str) -> bool {
        if self.has_in_wishlist(media_id) {
            self.wishlist.retain(|id| id != media_id);
            false
        } else {
            self.wishlist.push(media_id.to_string());
            true
        }
    }

    /// Overlays the fields set in `update`
    pub fn merged_with(&self, update: &ProfileUpdate) -> Self {
        let mut merged = self.clone();
        if let Some(username) = &update.username {
            merged.username = username.clone();
        }
        if let Some(email) = &update.email {
            merged.email = email.clone();
        }
        if let Some(avatar) = &update.avatar {
            merged.avatar = Some(avatar.clone());
        }
        merged
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields a user may change
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Response envelope shared by every auth backend endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}
