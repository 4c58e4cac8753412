//! Wire models for the authentication endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// Query parameters the provider appends to the callback redirect. All
/// optional so the handler can report precisely what is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            profile_picture: user.profile_picture,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderEntry {
    pub name: String,
    pub login_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderEntry>,
}

impl ProvidersResponse {
    /// `public_url` is the service's external base URL; the login URLs
    /// must be absolute because the frontend lives on another origin.
    pub fn from_names(names: Vec<String>, public_url: &str) -> Self {
        let providers = names
            .into_iter()
            .map(|name| ProviderEntry {
                login_url: format!("{public_url}/auth/login/{name}"),
                name,
            })
            .collect();
        Self { providers }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}
