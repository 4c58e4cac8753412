//! Application middleware: request/response logging and the session guard
//! protecting authenticated routes.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::session::SessionManager;

/// The authenticated user's id, inserted by [`require_session`] and read by
/// handlers through the extractor impl below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Everything the session guard needs to answer an unauthenticated request.
#[derive(Clone)]
pub struct AuthGuardState {
    pub session: SessionManager,
    pub providers: Vec<String>,
    pub login_path: String,
}

/// Decides how to answer a request that required authentication but carried
/// no valid session: JSON-accepting (or `/api/`-prefixed) callers get a
/// structured 401 listing the configured providers, browser navigation gets
/// a redirect to the login entry point.
pub fn accepts_json(headers: &HeaderMap, path: &str) -> bool {
    if path.starts_with("/api/") {
        return true;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("application/json") || accept.contains("*/*"))
        .unwrap_or(false)
}

/// Builds the structured "authentication required" body shared by the guard
/// and the `/auth/login` entry point.
pub fn authentication_required_body(providers: &[String]) -> serde_json::Value {
    json!({ "error": "Authentication required", "providers": providers })
}

/// Route-layer middleware for authenticated endpoints.
pub async fn require_session(
    State(guard): State<AuthGuardState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(user_id) = guard.session.current_user_id(&cookies) else {
        let path = req.uri().path().to_string();
        if accepts_json(req.headers(), &path) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(authentication_required_body(&guard.providers)),
            )
                .into_response();
        }
        return (
            StatusCode::FOUND,
            [(header::LOCATION, guard.login_path.clone())],
        )
            .into_response();
    };

    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(AuthUser(user_id));
    let req = Request::from_parts(parts, body);

    next.run(req).await
}

/// Logs one line per handled request with method, path, status and latency.
pub async fn request_response_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request handled"
    );

    response
}
