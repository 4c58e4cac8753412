//! End-to-end tests of the login flow through the router, with the
//! provider mocked at the adapter seam.

use std::sync::Arc;

use app_core::middleware::AuthGuardState;
use app_core::oauth::{MockOAuthProvider, NormalizedProfile, OAuthManager, TokenPayload};
use app_core::session::SessionManager;
use auth::outbound::memory::MemoryUserStore;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_cookies::{CookieManagerLayer, Key};

const PUBLIC_URL: &str = "https://api.example.com";
const FRONTEND_URL: &str = "https://app.example.com";

fn token_payload(access_token: Option<&str>) -> TokenPayload {
    serde_json::from_value(serde_json::json!({ "access_token": access_token })).unwrap()
}

fn google_profile() -> NormalizedProfile {
    NormalizedProfile {
        external_id: "g-123".to_string(),
        email: Some("ada@example.com".to_string()),
        name: Some("Ada Lovelace".to_string()),
        picture: Some("https://cdn.example.com/ada.png".to_string()),
        email_verified: true,
    }
}

fn mock_google(configure: impl FnOnce(&mut MockOAuthProvider)) -> MockOAuthProvider {
    let mut provider = MockOAuthProvider::new();
    provider.expect_name().return_const("google");
    provider.expect_authorization_url().returning(|redirect_uri, state| {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?redirect_uri={redirect_uri}&state={}",
            state.unwrap_or("")
        )
    });
    configure(&mut provider);
    provider
}

fn app_with(provider: MockOAuthProvider) -> Router {
    let mut oauth = OAuthManager::new();
    oauth.register(Arc::new(provider));

    let session = SessionManager::new(Key::generate());
    let state = auth::new(auth::Dependency {
        oauth,
        store: Arc::new(MemoryUserStore::new()),
        session: session.clone(),
        public_url: PUBLIC_URL.to_string(),
        frontend_url: FRONTEND_URL.to_string(),
    });
    let guard = AuthGuardState {
        session,
        providers: vec!["google".to_string()],
        login_path: "/auth/login".to_string(),
    };

    auth::create_router(state, guard).layer(CookieManagerLayer::new())
}

fn app() -> Router {
    app_with(mock_google(|provider| {
        provider
            .expect_exchange_code()
            .returning(|_, _| Ok(token_payload(Some("at"))));
        provider.expect_fetch_profile().returning(|_| Ok(google_profile()));
    }))
}

/// Collects every Set-Cookie pair so it can be replayed on the next
/// request, the way a browser would.
fn cookies_of(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

fn location_of(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn state_param(location: &str) -> String {
    location
        .split_once("state=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or("").to_string())
        .unwrap_or_default()
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .unwrap()
}

/// Drives /auth/login/google and returns (browser cookies, state token).
async fn start_login(app: &Router) -> (String, String) {
    let response = app.clone().oneshot(get("/auth/login/google")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let state = state_param(location_of(&response));
    assert!(!state.is_empty());
    (cookies_of(&response), state)
}

#[tokio::test]
async fn login_redirects_to_the_provider() {
    let app = app();
    let response = app.oneshot(get("/auth/login/google")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location_of(&response);
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("redirect_uri=https://api.example.com/auth/callback/google"));
    assert!(!cookies_of(&response).is_empty());
}

#[tokio::test]
async fn successful_callback_logs_in_and_redirects_to_dashboard() {
    let app = app();
    let (cookies, state) = start_login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?code=abc&state={state}"),
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), "https://app.example.com/dashboard");

    // The session cookie from the callback authenticates /auth/user.
    let mut session_cookies = cookies_of(&response);
    if session_cookies.is_empty() {
        session_cookies = cookies;
    }
    let response = app
        .oneshot(get_with_cookies("/auth/user", &session_cookies))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["is_verified"], true);
}

#[tokio::test]
async fn unknown_provider_is_rejected() {
    let app = app();
    let response = app.oneshot(get("/auth/login/github")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unsupported OAuth provider");
}

#[tokio::test]
async fn callback_without_stored_state_is_rejected() {
    let app = app();
    let response = app
        .oneshot(get("/auth/callback/google?code=abc&state=forged"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid state parameter");
}

#[tokio::test]
async fn callback_with_tampered_state_is_rejected() {
    let app = app();
    let (cookies, _state) = start_login(&app).await;

    let response = app
        .oneshot(get_with_cookies(
            "/auth/callback/google?code=abc&state=tampered",
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid state parameter");
}

#[tokio::test]
async fn state_issued_for_one_provider_is_invalid_for_another() {
    let mut facebook = MockOAuthProvider::new();
    facebook.expect_name().return_const("facebook");
    facebook
        .expect_authorization_url()
        .returning(|_, state| format!("https://www.facebook.com/?state={}", state.unwrap_or("")));

    let mut oauth = OAuthManager::new();
    oauth.register(Arc::new(mock_google(|_| {})));
    oauth.register(Arc::new(facebook));

    let session = SessionManager::new(Key::generate());
    let state = auth::new(auth::Dependency {
        oauth,
        store: Arc::new(MemoryUserStore::new()),
        session: session.clone(),
        public_url: PUBLIC_URL.to_string(),
        frontend_url: FRONTEND_URL.to_string(),
    });
    let guard = AuthGuardState {
        session,
        providers: vec!["facebook".to_string(), "google".to_string()],
        login_path: "/auth/login".to_string(),
    };
    let app = auth::create_router(state, guard).layer(CookieManagerLayer::new());

    let (cookies, token) = start_login(&app).await;

    let response = app
        .oneshot(get_with_cookies(
            &format!("/auth/callback/facebook?code=abc&state={token}"),
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid state parameter");
}

#[tokio::test]
async fn provider_error_is_reported_before_the_code_check() {
    let app = app();
    let (cookies, state) = start_login(&app).await;

    let response = app
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?error=access_denied&state={state}"),
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "OAuth error: access_denied");
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
    let app = app();
    let (cookies, state) = start_login(&app).await;

    let response = app
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?state={state}"),
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Authorization code not provided");
}

#[tokio::test]
async fn exchange_without_access_token_is_a_client_error() {
    let app = app_with(mock_google(|provider| {
        provider
            .expect_exchange_code()
            .returning(|_, _| Ok(token_payload(None)));
    }));
    let (cookies, state) = start_login(&app).await;

    let response = app
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?code=abc&state={state}"),
            &cookies,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to obtain access token");
}

#[tokio::test]
async fn failed_callback_leaves_the_state_reusable() {
    let app = app();
    let (cookies, state) = start_login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?state={state}"),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same state, now with a code: still valid because failure does not
    // clear the attempt.
    let response = app
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?code=abc&state={state}"),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn protected_route_wants_json_or_redirects() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/user")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(body["providers"][0], "google");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/user")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), "/auth/login");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = app();
    let (cookies, state) = start_login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookies(
            &format!("/auth/callback/google?code=abc&state={state}"),
            &cookies,
        ))
        .await
        .unwrap();
    let mut session_cookies = cookies_of(&response);
    if session_cookies.is_empty() {
        session_cookies = cookies;
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, session_cookies.clone())
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn provider_listing_is_public() {
    let app = app();
    let response = app.oneshot(get("/auth/providers")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["providers"][0]["name"], "google");
    // Absolute, not relative: the frontend runs on a different origin.
    assert_eq!(
        body["providers"][0]["login_url"],
        "https://api.example.com/auth/login/google"
    );
}

#[tokio::test]
async fn login_entry_serves_html_to_browsers_and_json_to_api_clients() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("Authentication required"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(body["providers"][0], "google");
}
