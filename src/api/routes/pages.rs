//! Page Routes
//!
//! Serves the HTML shells for the three screens. The dashboard is only
//! shown to a signed-in browser; the login page sends a signed-in browser
//! straight on to the dashboard.
//!
//! - GET / - Redirect to /login
//! - GET /login
//! - GET /register
//! - GET /dashboard

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth::current_session;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Redirect {
    Redirect::to("/login")
}

/// GET /login
pub async fn login_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Response> {
    if current_session(&state, &headers).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    page(&state, "login.html").await
}

/// GET /register
pub async fn register_page(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    page(&state, "register.html").await
}

/// GET /dashboard
pub async fn dashboard_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Response> {
    if current_session(&state, &headers).await.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }
    page(&state, "dashboard.html").await
}

async fn page(state: &AppState, name: &str) -> ApiResult<Response> {
    let path = state.static_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound(format!("Page {}", name)))
        }
        Err(e) => Err(ApiError::Io(e)),
    }
}
