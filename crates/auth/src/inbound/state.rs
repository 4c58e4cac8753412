use std::sync::Arc;

use app_core::session::SessionManager;

use crate::usecase::authn::AuthnUseCase;

#[derive(Clone)]
pub struct AuthState {
    pub session: SessionManager,
    pub authn: Arc<dyn AuthnUseCase>,
    /// External base URL of this service, used to build callback URIs.
    pub public_url: String,
    /// Base URL of the frontend, the post-login redirect target.
    pub frontend_url: String,
}

impl AuthState {
    pub fn new(
        session: SessionManager,
        authn: Arc<dyn AuthnUseCase>,
        public_url: String,
        frontend_url: String,
    ) -> Self {
        Self { session, authn, public_url, frontend_url }
    }

    /// The redirect URI registered with each provider. Must be identical
    /// in the authorization request and the code exchange.
    pub fn callback_uri(&self, provider: &str) -> String {
        format!("{}/auth/callback/{provider}", self.public_url)
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/dashboard", self.frontend_url)
    }
}
