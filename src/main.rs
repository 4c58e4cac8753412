//! The binary entry point for the application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::middleware::{request_response_logger, AuthGuardState};
use app_core::oauth::{register_configured, OAuthManager};
use app_core::session::SessionManager;
use axum::http::StatusCode;
use axum::{middleware, routing, Json, Router};
use base64::engine::general_purpose;
use base64::Engine as _;
use marketplace::outbound::checkout::LocalCheckoutGateway;
use marketplace::outbound::memory::MemoryMarketStore;
use tokio::signal;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const PROVIDERS: [&str; 3] = ["google", "facebook", "linkedin"];

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .init();

    if let Err(err) = run().await {
        panic!("❌ Application failed to start: {err}");
    }
}

/// Initializes all dependencies and starts the web server.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::load("config/config.yaml")?);

    // One shared HTTP client for every provider call, with a bounded
    // timeout so a stuck provider cannot hold a callback open forever.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.get_or("oauth.http_timeout_secs", 10)))
        .build()?;

    // Cookie encryption key; the session secret is stored base64-encoded.
    let cookie_key = Key::from(&general_purpose::STANDARD.decode(config.get::<String>("session.secret")?)?);
    let session = SessionManager::new(cookie_key);

    // Register every provider with complete credentials; the rest stay
    // out of the available set.
    let mut oauth_manager = OAuthManager::new();
    for name in PROVIDERS {
        let client_id: String = config.get_or(&format!("oauth.{name}.client_id"), String::new());
        let client_secret: String =
            config.get_or(&format!("oauth.{name}.client_secret"), String::new());
        if register_configured(&mut oauth_manager, name, &client_id, &client_secret, &http)? {
            tracing::info!(provider = name, "OAuth provider registered");
        }
    }

    let guard = AuthGuardState {
        session: session.clone(),
        providers: oauth_manager.available(),
        login_path: "/auth/login".to_string(),
    };

    // Initialize auth module
    let auth_state = auth::new(auth::Dependency {
        oauth: oauth_manager,
        store: Arc::new(auth::outbound::memory::MemoryUserStore::new()),
        session,
        public_url: config.get("server.public_url")?,
        frontend_url: config.get("frontend.url")?,
    });

    // Initialize marketplace module
    let market_state = marketplace::new(marketplace::Dependency {
        store: Arc::new(MemoryMarketStore::new()),
        checkout: Arc::new(LocalCheckoutGateway::new(config.get("payments.checkout_base_url")?)),
    });

    // Create the Router and Middlewares
    let timeout_secs = Duration::from_secs(config.get::<u64>("server.timeout_secs")?);
    let app = Router::new()
        .merge(auth::create_router(auth_state, guard.clone()))
        .merge(marketplace::create_router(market_state, guard))
        .route(
            "/api/health",
            routing::get(|| async {
                Json(serde_json::json!({"status": "healthy", "message": "ChargeBnB API is running"}))
            }),
        )
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Endpoint not found"})),
            )
        })
        .method_not_allowed_fallback(|| async {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(serde_json::json!({"error": "Method not allowed"})),
            )
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)) // Enables CORS for all origins
                .layer(RequestDecompressionLayer::new()) // Enables request compression
                .layer(CompressionLayer::new()) // Enables response compression
                .layer(TimeoutLayer::new(timeout_secs)), // Adds a request timeout
        );

    let server_address = config.get::<String>("server.address")?;
    let listener = tokio::net::TcpListener::bind(&server_address).await?;

    tracing::info!("🚀 listening on {}", listener.local_addr()?);

    // Create a broadcast channel to signal shutdown to all application components.
    // Spawn a task to listen for shutdown signals (Ctrl+C and SIGTERM).
    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_shutdown_listener(shutdown_tx.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_tx.subscribe().recv().await.ok();
            tracing::info!("🛑 Server is shutting down gracefully...");
        })
        .await?;

    Ok(())
}

/// Spawns a background task to listen for system shutdown signals.
fn spawn_shutdown_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("🔻 Received SIGINT (Ctrl+C)")},
            _ = terminate => { tracing::info!("🔻 Received SIGTERM")},
        }

        // Send the shutdown signal to all parts of the application.
        if shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown signal");
        }
    });
}
