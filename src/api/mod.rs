//! Dashboard Gateway
//!
//! HTTP layer in front of the remote home-security API, built with Axum.
//!
//! # Endpoints
//!
//! ## Pages
//! - `GET /` - Redirect to `/login`
//! - `GET /login`, `GET /register`, `GET /dashboard` - Page shells
//! - `GET /static/*` - Static assets
//!
//! ## Auth
//! - `POST /api/auth/login` - Sign in, sets the session cookie
//! - `POST /api/auth/register` - Create an account
//! - `POST /api/auth/logout` - Sign out, clears the session cookie
//! - `GET /api/auth/session` - Current session
//!
//! ## Account & devices (forwarded as-is)
//! - `GET /api/users/me`, `GET /api/users/check-email`
//! - `PUT /api/users/phone`, `PUT /api/users/email`, `PUT /api/users/password`
//! - `GET /api/devices/me`, `GET /api/devices/status`
//! - `POST /api/password-resets/request`, `POST /api/password-resets/reset`
//! - `GET /api/alerts`
//!
//! ## Dashboard
//! - `GET /api/dashboard/panel` - Last panel rendered by the status poller
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use homesec::api::{serve, AppState};
//! use homesec::config::Config;
//! use homesec::upstream::HomeSecClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = Arc::new(HomeSecClient::new(config.upstream.client_config())?);
//!
//!     let state = AppState::new(client, &config);
//!     serve(state, &config.gateway).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;

/// Build the gateway router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/register", post(routes::proxy::forward))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/session", get(routes::auth::session))
        // Account routes
        .route("/users/me", get(routes::proxy::forward))
        .route("/users/check-email", get(routes::proxy::forward))
        .route("/users/phone", put(routes::proxy::forward))
        .route("/users/email", put(routes::proxy::forward))
        .route("/users/password", put(routes::proxy::forward))
        // Device routes
        .route("/devices/me", get(routes::proxy::forward))
        .route("/devices/status", get(routes::proxy::forward))
        // Password reset routes
        .route("/password-resets/request", post(routes::proxy::forward))
        .route("/password-resets/reset", post(routes::proxy::forward))
        // Alerts
        .route("/alerts", get(routes::proxy::forward))
        // Dashboard
        .route("/dashboard/panel", get(routes::dashboard::panel));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.cors_origins);
    let static_files = ServeDir::new(&state.static_dir);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::pages::root))
        .route("/login", get(routes::pages::login_page))
        .route("/register", get(routes::pages::register_page))
        .route("/dashboard", get(routes::pages::dashboard_page))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the gateway
pub async fn serve(state: AppState, config: &GatewayConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HomeSec gateway listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("HomeSec gateway shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
