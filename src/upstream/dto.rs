//! Request payloads for the remote API
//!
//! Field names follow the backend's JSON (`device_id` in snake case, the
//! password fields in camel case).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub model: String,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneUpdate {
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailUpdate {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCompletion {
    pub token: String,
    pub new_password: String,
}

/// Answer of `GET /api/users/check-email`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailCheck {
    #[serde(default)]
    pub exists: bool,
}
