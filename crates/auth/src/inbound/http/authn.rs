//! HTTP handlers for the authentication endpoints.
//!
//! The callback handler enforces its guards in a fixed order so a request
//! failing several of them always gets the same answer: provider support,
//! then CSRF state, then a provider-reported error, then the presence of
//! the authorization code.

use app_core::error::AppError;
use app_core::extractors::{AppPath, AppQuery};
use app_core::middleware::{accepts_json, authentication_required_body, AuthUser};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tower_cookies::Cookies;

use crate::domain::user::Provider;
use crate::inbound::model::authn::{
    MessageResponse, OAuthCallbackQuery, ProvidersResponse, UserResponse,
};
use crate::inbound::state::AuthState;
use crate::usecase::authn::CompleteLoginInput;

/// 302, not axum's `Redirect` which answers GET with 303.
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

const LOGIN_PAGE: &str = "<h1>Authentication required</h1>\
<p>Please login with one of the supported OAuth providers.</p>";

/// Entry point unauthenticated browser traffic is redirected to. Answers
/// 401: JSON-accepting clients get the configured providers, everything
/// else a minimal HTML page.
pub async fn login_entry(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    if accepts_json(&headers, "/auth/login") {
        let providers = state.authn.providers();
        return (StatusCode::UNAUTHORIZED, Json(authentication_required_body(&providers)))
            .into_response();
    }
    (StatusCode::UNAUTHORIZED, Html(LOGIN_PAGE)).into_response()
}

pub async fn list_providers(State(state): State<AuthState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse::from_names(state.authn.providers(), &state.public_url))
}

/// Starts the authorization-code flow: mints a CSRF state token bound to
/// this browser session and redirects to the provider.
pub async fn oauth_login(
    State(state): State<AuthState>,
    cookies: Cookies,
    AppPath(provider): AppPath<String>,
) -> Result<Response, AppError> {
    let provider = Provider::parse(&provider)
        .filter(|p| state.authn.supports(p.as_str()))
        .ok_or(AppError::UnsupportedProvider)?;

    let token = state.session.issue_state(&cookies, provider.as_str())?;
    let url = state
        .authn
        .authorization_url(provider, &state.callback_uri(provider.as_str()), &token)?;

    Ok(found(url))
}

/// Completes the flow when the provider redirects back. On success the
/// session cookie is set, the single-use state is cleared and the browser
/// is sent to the frontend dashboard. On failure the state is left in
/// place; the next login attempt overwrites it.
pub async fn oauth_callback(
    State(state): State<AuthState>,
    cookies: Cookies,
    AppPath(provider): AppPath<String>,
    AppQuery(query): AppQuery<OAuthCallbackQuery>,
) -> Result<Response, AppError> {
    let provider = Provider::parse(&provider)
        .filter(|p| state.authn.supports(p.as_str()))
        .ok_or(AppError::UnsupportedProvider)?;

    let returned_state = query.state.as_deref().unwrap_or("");
    let attempt_provider_matches = state
        .session
        .stored_attempt(&cookies)
        .map(|attempt| attempt.provider == provider.as_str())
        .unwrap_or(false);
    if !attempt_provider_matches || !state.session.state_matches(&cookies, returned_state) {
        return Err(AppError::InvalidState);
    }

    if let Some(error) = query.error {
        return Err(AppError::ProviderError(error));
    }

    let code = query.code.ok_or(AppError::MissingCode)?;

    let user = state
        .authn
        .complete_login(CompleteLoginInput {
            provider,
            code,
            redirect_uri: state.callback_uri(provider.as_str()),
        })
        .await?;

    state.session.log_in(&cookies, user.id);
    state.session.clear_state(&cookies);
    tracing::info!(user_id = user.id, provider = provider.as_str(), "login completed");

    Ok(found(state.dashboard_url()))
}

pub async fn logout(
    State(state): State<AuthState>,
    cookies: Cookies,
    _user: AuthUser,
) -> Json<MessageResponse> {
    state.session.log_out(&cookies);
    Json(MessageResponse::new("Logged out successfully"))
}

pub async fn current_user(
    State(state): State<AuthState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .authn
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
