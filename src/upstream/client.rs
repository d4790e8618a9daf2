//! Remote API Client
//!
//! HTTP client for the home-security backend. Typed helpers cover the
//! endpoints the CLI and poller use; [`HomeSecClient::forward`] passes any
//! request through untouched for the gateway.

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::dto::{
    EmailCheck, EmailUpdate, LoginRequest, PasswordChange, PhoneUpdate, RegisterRequest,
    ResetCompletion, ResetRequest,
};
use crate::status::DeviceStatusSnapshot;

/// Client for the remote home-security API
#[derive(Clone)]
pub struct HomeSecClient {
    client: Client,
    config: UpstreamConfig,
}

/// Configuration for the remote API client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "https://homesecurity-cw0e.onrender.com"
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://homesecurity-cw0e.onrender.com".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Status and decoded body of an upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarded {
    pub status: u16,
    pub body: Value,
    /// False when the backend sent something other than JSON (an HTML
    /// error page from a proxy, say) and `body` is the wrapped text
    pub json: bool,
}

impl Forwarded {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`UpstreamError::Api`] and a non-JSON
    /// body into [`UpstreamError::Decode`]
    pub fn into_result(self) -> Result<Value, UpstreamError> {
        if !self.json {
            return Err(UpstreamError::Decode(format!(
                "non-JSON response with status {}",
                self.status
            )));
        }
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(UpstreamError::Api {
                status: self.status,
                body: self.body,
            })
        }
    }
}

impl HomeSecClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Send a request and return whatever the backend answered.
    ///
    /// Only transport failures are errors here; 4xx/5xx come back as a
    /// [`Forwarded`] with that status.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Forwarded, UpstreamError> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify)?;

        tracing::debug!(%method, path, status, "Upstream responded");

        let (body, json) = decode_body(&text);
        Ok(Forwarded { status, body, json })
    }

    async fn send<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Value, UpstreamError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        self.forward(method, path, body.as_ref()).await?.into_result()
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Value, UpstreamError> {
        self.send(Method::POST, "/api/auth/login", Some(request)).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, UpstreamError> {
        self.send(Method::POST, "/api/auth/register", Some(request)).await
    }

    pub async fn logout(&self) -> Result<Value, UpstreamError> {
        self.send::<()>(Method::POST, "/api/auth/logout", None).await
    }

    pub async fn current_user(&self) -> Result<Value, UpstreamError> {
        self.send::<()>(Method::GET, "/api/users/me", None).await
    }

    pub async fn current_device(&self) -> Result<Value, UpstreamError> {
        self.send::<()>(Method::GET, "/api/devices/me", None).await
    }

    /// Fetch the current device status snapshot
    pub async fn device_status(&self) -> Result<DeviceStatusSnapshot, UpstreamError> {
        let body = self
            .send::<()>(Method::GET, "/api/devices/status", None)
            .await?;
        serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Whether an account already exists for `email`
    pub async fn email_registered(&self, email: &str) -> Result<bool, UpstreamError> {
        let path = format!("/api/users/check-email?email={}", urlencoding::encode(email));
        let body = self.send::<()>(Method::GET, &path, None).await?;
        let check: EmailCheck =
            serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(check.exists)
    }

    pub async fn update_phone(&self, phone: &str) -> Result<Value, UpstreamError> {
        let body = PhoneUpdate {
            phone: phone.to_string(),
        };
        self.send(Method::PUT, "/api/users/phone", Some(&body)).await
    }

    pub async fn update_email(&self, email: &str) -> Result<Value, UpstreamError> {
        let body = EmailUpdate {
            email: email.to_string(),
        };
        self.send(Method::PUT, "/api/users/email", Some(&body)).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Value, UpstreamError> {
        self.send(Method::PUT, "/api/users/password", Some(change)).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Value, UpstreamError> {
        let body = ResetRequest {
            email: email.to_string(),
        };
        self.send(Method::POST, "/api/password-resets/request", Some(&body))
            .await
    }

    pub async fn reset_password(&self, completion: &ResetCompletion) -> Result<Value, UpstreamError> {
        self.send(Method::POST, "/api/password-resets/reset", Some(completion))
            .await
    }

    pub async fn alerts(&self) -> Result<Value, UpstreamError> {
        self.send::<()>(Method::GET, "/api/alerts", None).await
    }
}

/// Decode a response body as JSON, wrapping plain text as `{"message": ...}`.
/// The flag says whether the body was JSON (an empty body counts).
fn decode_body(text: &str) -> (Value, bool) {
    if text.trim().is_empty() {
        return (Value::Null, true);
    }
    match serde_json::from_str(text) {
        Ok(value) => (value, true),
        Err(_) => (serde_json::json!({ "message": text }), false),
    }
}

fn classify(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_connect() {
        UpstreamError::Unavailable
    } else {
        UpstreamError::Request(e)
    }
}

/// Errors that can occur when talking to the remote API
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Remote API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: Value },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// True when the backend was never reached or never answered
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UpstreamError::Unavailable | UpstreamError::Timeout | UpstreamError::Request(_)
        )
    }
}
