//! In-memory [`UserStore`] implementation.
//!
//! Backs the account store with a single `RwLock`-guarded vector. All
//! uniqueness checks happen under the write lock, so two concurrent
//! callbacks for the same identity cannot both create an account; the
//! loser observes a `Duplicate` error.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::{Provider, User};
use crate::outbound::store::{NewUser, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    next_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &[User], email: &str, excluding: Option<i64>) -> bool {
    users
        .iter()
        .any(|u| u.email == email && excluding != Some(u.id))
}

fn link_taken(users: &[User], provider: Provider, external_id: &str, excluding: Option<i64>) -> bool {
    users
        .iter()
        .any(|u| u.provider_id(provider) == Some(external_id) && excluding != Some(u.id))
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_provider_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.provider_id(provider) == Some(external_id))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if email_taken(&inner.users, &new_user.email, None) {
            return Err(StoreError::Duplicate(format!("email {}", new_user.email)));
        }
        if link_taken(&inner.users, new_user.provider, &new_user.external_id, None) {
            return Err(StoreError::Duplicate(format!(
                "{} id {}",
                new_user.provider.as_str(),
                new_user.external_id
            )));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let mut user = User {
            id: inner.next_id,
            email: new_user.email,
            name: new_user.name,
            profile_picture: new_user.profile_picture,
            is_verified: new_user.is_verified,
            is_active: true,
            google_id: None,
            facebook_id: None,
            linkedin_id: None,
            created_at: now,
            updated_at: now,
        };
        user.set_provider_id(new_user.provider, new_user.external_id);

        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, StoreError> {
        user.updated_at = Utc::now();
        let mut inner = self.inner.write().await;

        if email_taken(&inner.users, &user.email, Some(user.id)) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        for provider in Provider::ALL {
            if let Some(external_id) = user.provider_id(provider) {
                if link_taken(&inner.users, provider, external_id, Some(user.id)) {
                    return Err(StoreError::Duplicate(format!(
                        "{} id {external_id}",
                        provider.as_str()
                    )));
                }
            }
        }

        let slot = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound(user.id))?;
        *slot = user.clone();
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, provider: Provider, external_id: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: Some("Test User".to_string()),
            profile_picture: None,
            is_verified: true,
            provider,
            external_id: external_id.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("a@example.com", Provider::Google, "g1")).await.unwrap();
        let b = store.create(new_user("b@example.com", Provider::Google, "g2")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.google_id.as_deref(), Some("g1"));
    }

    #[tokio::test]
    async fn duplicate_email_and_link_are_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@example.com", Provider::Google, "g1")).await.unwrap();

        let err = store.create(new_user("a@example.com", Provider::Facebook, "f1")).await;
        assert!(matches!(err, Err(StoreError::Duplicate(_))));

        let err = store.create(new_user("b@example.com", Provider::Google, "g1")).await;
        assert!(matches!(err, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn lookup_by_provider_id_distinguishes_providers() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("a@example.com", Provider::Google, "x1")).await.unwrap();

        let found = store.find_by_provider_id(Provider::Google, "x1").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        // Same external id under a different provider is a different link.
        let found = store.find_by_provider_id(Provider::Facebook, "x1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_replaces_the_stored_row() {
        let store = MemoryUserStore::new();
        let mut user = store.create(new_user("a@example.com", Provider::Google, "g1")).await.unwrap();

        user.name = Some("Renamed".to_string());
        user.set_provider_id(Provider::Facebook, "f1".to_string());
        store.update(user.clone()).await.unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Renamed"));
        assert_eq!(stored.facebook_id.as_deref(), Some("f1"));

        let missing = User { id: 999, ..user };
        assert!(matches!(store.update(missing).await, Err(StoreError::NotFound(999))));
    }

    #[tokio::test]
    async fn update_cannot_steal_another_users_link() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@example.com", Provider::Google, "g1")).await.unwrap();
        let mut b = store.create(new_user("b@example.com", Provider::Facebook, "f1")).await.unwrap();

        b.set_provider_id(Provider::Google, "g1".to_string());
        assert!(matches!(store.update(b).await, Err(StoreError::Duplicate(_))));
    }
}
