use app_core::middleware::{require_session, AuthGuardState};
use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::inbound::http::authn::*;
use crate::inbound::state::AuthState;

pub fn create_router(state: AuthState, guard: AuthGuardState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/user", get(current_user))
        .route("/auth/logout", post(logout))
        .route("/api/profile", get(current_user))
        .route_layer(middleware::from_fn_with_state(guard, require_session));

    let public_routes = Router::new()
        .route("/auth/login", get(login_entry))
        .route("/auth/providers", get(list_providers))
        .route("/auth/login/{provider}", get(oauth_login))
        .route("/auth/callback/{provider}", get(oauth_callback));

    Router::new().merge(public_routes).merge(protected_routes).with_state(state)
}
