//! Gateway response bodies

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Answer of `GET /api/auth/session`
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub poller: PollerHealth,
    pub sessions: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Poller part of the health status
#[derive(Debug, Serialize)]
pub struct PollerHealth {
    pub enabled: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}
