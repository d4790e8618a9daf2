//! Proxy Routes
//!
//! Re-exposes the remote API under the same paths. Upstream status and JSON
//! body pass through unchanged; a transport failure becomes
//! `500 {"message": ...}`.

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::upstream::Forwarded;

/// Any proxied `/api/*` route
pub async fn forward(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> ApiResult<Response> {
    let payload = parse_body(&body)?;
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let forwarded = relay(&state, &method, path, payload.as_ref()).await?;
    Ok(into_response(forwarded))
}

/// Send a request upstream with the caller's method
pub(crate) async fn relay(
    state: &AppState,
    method: &Method,
    path: &str,
    payload: Option<&Value>,
) -> ApiResult<Forwarded> {
    // reqwest and axum sit on different `http` versions
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    state
        .client
        .forward(method, path, payload)
        .await
        .map_err(ApiError::from)
}

/// Decode a JSON request body; an empty body is `None`
pub(crate) fn parse_body(body: &Bytes) -> ApiResult<Option<Value>> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

pub(crate) fn into_response(forwarded: Forwarded) -> Response {
    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(forwarded.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(&Bytes::new()).unwrap(), None);
        assert_eq!(
            parse_body(&Bytes::from_static(br#"{"phone":"0756000000"}"#)).unwrap(),
            Some(serde_json::json!({ "phone": "0756000000" }))
        );
        assert!(matches!(
            parse_body(&Bytes::from_static(b"not json")),
            Err(ApiError::Validation(_))
        ));
    }
}
