//! Health Routes
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (status polling is keeping up)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, PollerHealth};
use crate::api::state::AppState;

/// Consecutive poll failures before the gateway reports itself not ready
const MAX_POLL_FAILURES: u32 = 3;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// A gateway without a poller is always ready.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if poller_health(&state).await.consecutive_failures >= MAX_POLL_FAILURES {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let poller = poller_health(&state).await;

    let status = match poller.consecutive_failures {
        0 => "healthy",
        n if n < MAX_POLL_FAILURES => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        poller,
        sessions: state.sessions.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn poller_health(state: &AppState) -> PollerHealth {
    match &state.poller {
        Some(poller) => {
            let poll = poller.state().await;
            PollerHealth {
                enabled: true,
                last_success: poll.last_success,
                consecutive_failures: poll.consecutive_failures,
            }
        }
        None => PollerHealth {
            enabled: false,
            last_success: None,
            consecutive_failures: 0,
        },
    }
}
