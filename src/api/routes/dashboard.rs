//! Dashboard Routes
//!
//! - GET /api/dashboard/panel - Last rendered device panel from the poller

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::poller::PollState;

/// GET /api/dashboard/panel
pub async fn panel(State(state): State<Arc<AppState>>) -> ApiResult<Json<PollState>> {
    let poller = state
        .poller
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Status polling is disabled".to_string()))?;

    Ok(Json(poller.state().await))
}
