mod domain;
mod inbound;
pub mod outbound;
mod usecase;

use std::sync::Arc;

use app_core::oauth::OAuthManager;
use app_core::session::SessionManager;
pub use inbound::router::create_router;

use crate::inbound::state::AuthState;
use crate::outbound::store::UserStore;
use crate::usecase::authn::AuthnService;

pub struct Dependency {
    pub oauth: OAuthManager,
    pub store: Arc<dyn UserStore>,
    pub session: SessionManager,
    pub public_url: String,
    pub frontend_url: String,
}

pub fn new(dep: Dependency) -> AuthState {
    let authn_svc = Arc::new(AuthnService::new(dep.oauth, dep.store));
    AuthState::new(dep.session, authn_svc, dep.public_url, dep.frontend_url)
}
