//! Auth Routes
//!
//! - POST /api/auth/login - Forward login, start a session on success
//! - POST /api/auth/logout - Forward logout, drop the session
//! - GET /api/auth/session - Who is signed in on this browser

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::proxy::{into_response, parse_body, relay};
use crate::api::dto::SessionResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::session::SessionMarker;

pub const SESSION_COOKIE: &str = "homesec_session";

/// Session id carried in the request's cookies
pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Marker for the request's session, if any
pub(crate) async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<SessionMarker> {
    let id = session_id(headers)?;
    state.sessions.get(&id).await
}

fn field<'a>(payload: &'a Value, name: &str) -> &'a str {
    payload.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// POST /api/auth/login
///
/// A session this browser already holds is replaced, not kept alongside.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let payload = parse_body(&body)?.unwrap_or_else(|| json!({}));
    let previous = session_id(&headers);
    let email = field(&payload, "email").to_string();
    let device_id = field(&payload, "device_id").to_string();

    if let Some(dev) = &state.dev_user {
        if email == dev.email && field(&payload, "password") == dev.password {
            tracing::info!(email = %email, "Development test user signed in");
            let body = json!({
                "message": "Login successful",
                "user": { "email": email, "name": dev.name }
            });
            let response = (StatusCode::OK, Json(body)).into_response();
            return start_session(&state, previous, email, device_id, response).await;
        }
    }

    let forwarded = relay(&state, &Method::POST, "/api/auth/login", Some(&payload)).await?;
    let success = forwarded.is_success();
    let response = into_response(forwarded);

    if success {
        start_session(&state, previous, email, device_id, response).await
    } else {
        tracing::info!(email = %email, "Login rejected upstream");
        Ok(response)
    }
}

async fn start_session(
    state: &AppState,
    previous: Option<String>,
    email: String,
    device_id: String,
    mut response: Response,
) -> ApiResult<Response> {
    if let Some(previous) = previous {
        state.sessions.remove(&previous).await;
    }

    let id = state.sessions.create(SessionMarker::new(email, device_id)).await;
    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        id,
        state.sessions.ttl().as_secs()
    );
    let value = HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// POST /api/auth/logout
///
/// The local session is dropped even when the upstream call fails.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        if let Some(marker) = state.sessions.remove(&id).await {
            tracing::info!(email = %marker.email, "Signed out");
        }
    }

    let mut response = match relay(&state, &Method::POST, "/api/auth/logout", None).await {
        Ok(forwarded) => into_response(forwarded),
        Err(e) => e.into_response(),
    };

    let clear = format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE);
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// GET /api/auth/session
pub async fn session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<SessionResponse> {
    let marker = current_session(&state, &headers).await;

    Json(SessionResponse {
        authenticated: marker.is_some(),
        email: marker.as_ref().map(|m| m.email.clone()),
        device_id: marker.map(|m| m.device_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; homesec_session=abc-123; other=1"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_session_id_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("homesec_session="));
        assert_eq!(session_id(&headers), None);
    }
}
