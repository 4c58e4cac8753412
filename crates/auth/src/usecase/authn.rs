//! Authentication use case: authorization URL composition, code exchange
//! and account reconciliation.

use std::sync::Arc;

use app_core::error::AppError;
use app_core::oauth::{NormalizedProfile, OAuthManager};
use async_trait::async_trait;

use crate::domain::user::{Provider, User};
use crate::outbound::store::{NewUser, StoreError, UserStore};

const NO_EMAIL_MSG: &str = "provider returned no email for a new account";

#[derive(Debug, Clone)]
pub struct CompleteLoginInput {
    pub provider: Provider,
    pub code: String,
    pub redirect_uri: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthnUseCase: Send + Sync {
    /// Names of the providers configured with credentials, sorted.
    fn providers(&self) -> Vec<String>;

    fn supports(&self, name: &str) -> bool;

    /// Composes the provider's authorization URL carrying `state`.
    fn authorization_url(
        &self,
        provider: Provider,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, AppError>;

    /// Exchanges the authorization code, fetches the profile and
    /// reconciles it into a local account.
    async fn complete_login(&self, input: CompleteLoginInput) -> Result<User, AppError>;

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}

pub struct AuthnService {
    oauth: OAuthManager,
    store: Arc<dyn UserStore>,
}

impl AuthnService {
    pub fn new(oauth: OAuthManager, store: Arc<dyn UserStore>) -> Self {
        Self { oauth, store }
    }

    /// Maps a fetched profile onto a local account: by provider link
    /// first, then by email (linking the provider to the existing
    /// account), otherwise by creating a fresh account. Every path
    /// refreshes name, picture and verification from the profile.
    async fn reconcile(
        &self,
        provider: Provider,
        profile: NormalizedProfile,
    ) -> Result<User, AppError> {
        if let Some(mut user) = self
            .store
            .find_by_provider_id(provider, &profile.external_id)
            .await
            .map_err(store_error)?
        {
            apply_profile(&mut user, &profile);
            return self.store.update(user).await.map_err(store_error);
        }

        if let Some(email) = &profile.email {
            if let Some(mut user) = self.store.find_by_email(email).await.map_err(store_error)? {
                user.set_provider_id(provider, profile.external_id.clone());
                apply_profile(&mut user, &profile);
                return self.store.update(user).await.map_err(store_error);
            }
        }

        let email = profile
            .email
            .clone()
            .ok_or_else(|| AppError::Account(NO_EMAIL_MSG.to_string()))?;

        // A concurrent callback racing for the same identity loses here
        // with a uniqueness violation; the user retries the login flow.
        self.store
            .create(NewUser {
                email,
                name: profile.name.clone(),
                profile_picture: profile.picture.clone(),
                is_verified: profile.email_verified,
                provider,
                external_id: profile.external_id.clone(),
            })
            .await
            .map_err(store_error)
    }
}

fn store_error(err: StoreError) -> AppError {
    AppError::Account(err.to_string())
}

/// Refreshes mutable profile fields on every login. Verification only
/// ever upgrades; a provider that does not vouch for the email cannot
/// demote an already-verified account.
fn apply_profile(user: &mut User, profile: &NormalizedProfile) {
    if profile.name.is_some() {
        user.name = profile.name.clone();
    }
    if profile.picture.is_some() {
        user.profile_picture = profile.picture.clone();
    }
    user.is_verified |= profile.email_verified;
}

#[async_trait]
impl AuthnUseCase for AuthnService {
    fn providers(&self) -> Vec<String> {
        self.oauth.available()
    }

    fn supports(&self, name: &str) -> bool {
        self.oauth.supports(name)
    }

    fn authorization_url(
        &self,
        provider: Provider,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, AppError> {
        let adapter = self
            .oauth
            .get(provider.as_str())
            .ok_or(AppError::UnsupportedProvider)?;
        Ok(adapter.authorization_url(redirect_uri, Some(state)))
    }

    async fn complete_login(&self, input: CompleteLoginInput) -> Result<User, AppError> {
        let adapter = self
            .oauth
            .get(input.provider.as_str())
            .ok_or(AppError::UnsupportedProvider)?
            .clone();

        let token = adapter.exchange_code(&input.code, &input.redirect_uri).await?;
        let access_token = token.access_token.ok_or(AppError::TokenIncomplete)?;

        let profile = adapter.fetch_profile(&access_token).await?;
        tracing::debug!(
            provider = input.provider.as_str(),
            external_id = %profile.external_id,
            "provider profile fetched"
        );

        self.reconcile(input.provider, profile).await
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.store.find_by_id(id).await.map_err(store_error)
    }
}
