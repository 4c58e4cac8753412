//! The persistence port for user accounts.

use thiserror::Error;

use crate::domain::user::{Provider, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("uniqueness violation: {0}")]
    Duplicate(String),

    #[error("user not found: {0}")]
    NotFound(i64),
}

/// Everything needed to create an account from a provider profile.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub provider: Provider,
    pub external_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Looks up the account linked to `external_id` under `provider`.
    async fn find_by_provider_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Creates an account, enforcing uniqueness of both the email and the
    /// (provider, external id) link.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Persists the given account state, replacing the stored row.
    async fn update(&self, user: User) -> Result<User, StoreError>;
}
