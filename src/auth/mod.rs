//! Authentication Flow
//!
//! Form submission for login and registration: validate every field, stop
//! before any request when a field is invalid, otherwise post the form and
//! turn the backend's answer into either a session marker or the message
//! the user should see.

mod form;
mod profile;

pub use form::{LoginForm, RegisterForm};
pub use profile::{
    change_password, request_password_reset, reset_password, save_profile, PasswordChangeForm,
    ProfileForm,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::session::SessionMarker;
use crate::upstream::dto::{LoginRequest, RegisterRequest};
use crate::upstream::{server_message, HomeSecClient, UpstreamError};
use crate::validation::{Field, FieldErrors};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const LOGIN_UNREACHABLE: &str = "Server error. Please try again later.";
pub const REGISTER_FAILED: &str = "Registration failed.";
pub const REGISTER_UNREACHABLE: &str = "Could not connect to server. Please try again later.";
pub const EMAIL_TAKEN: &str = "Email is already registered.";

/// The authentication endpoints a form submits to
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<Value, UpstreamError>;

    async fn register(&self, request: &RegisterRequest) -> Result<Value, UpstreamError>;

    async fn email_registered(&self, email: &str) -> Result<bool, UpstreamError>;
}

#[async_trait]
impl AuthBackend for HomeSecClient {
    async fn login(&self, request: &LoginRequest) -> Result<Value, UpstreamError> {
        HomeSecClient::login(self, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Value, UpstreamError> {
        HomeSecClient::register(self, request).await
    }

    async fn email_registered(&self, email: &str) -> Result<bool, UpstreamError> {
        HomeSecClient::email_registered(self, email).await
    }
}

/// Why a submission did not go through
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Blocked before submission
    #[error("{0}")]
    Invalid(FieldErrors),

    /// The backend answered with an error status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached or answered garbage
    #[error("{message}")]
    Unreachable { message: String },
}

impl SubmitError {
    fn from_upstream(err: UpstreamError, fallback: &str, unreachable: &str) -> Self {
        match err {
            UpstreamError::Api { status, body } => SubmitError::Rejected {
                status,
                message: server_message(&body).unwrap_or_else(|| fallback.to_string()),
            },
            other => {
                tracing::warn!(error = %other, "Submission did not reach the backend");
                SubmitError::Unreachable {
                    message: unreachable.to_string(),
                }
            }
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Marker the caller stores before moving on to the dashboard
    pub marker: SessionMarker,
    pub response: Value,
}

/// Validate and submit the login form
pub async fn submit_login<B>(backend: &B, form: LoginForm) -> Result<LoginOutcome, SubmitError>
where
    B: AuthBackend + ?Sized,
{
    let errors = form.validate();
    if !errors.is_empty() {
        tracing::debug!(fields = errors.len(), "Login blocked by validation");
        return Err(SubmitError::Invalid(errors));
    }

    let request = form.into_request();
    let response = backend
        .login(&request)
        .await
        .map_err(|e| SubmitError::from_upstream(e, LOGIN_FAILED, LOGIN_UNREACHABLE))?;

    tracing::info!(email = %request.email, "Login accepted");

    Ok(LoginOutcome {
        marker: SessionMarker::new(request.email, request.device_id),
        response,
    })
}

/// Validate and submit the registration form.
///
/// Nothing is sent while any field is invalid. Once every field passes, an
/// email the backend already knows is reported as a field error; if that
/// lookup itself fails, registration goes ahead.
pub async fn submit_register<B>(backend: &B, form: RegisterForm) -> Result<Value, SubmitError>
where
    B: AuthBackend + ?Sized,
{
    let errors = form.validate();
    if !errors.is_empty() {
        tracing::debug!(fields = errors.len(), "Registration blocked by validation");
        return Err(SubmitError::Invalid(errors));
    }

    match backend.email_registered(form.email()).await {
        Ok(true) => {
            let mut errors = FieldErrors::new();
            errors.check(Field::Email, EMAIL_TAKEN.to_string());
            return Err(SubmitError::Invalid(errors));
        }
        Ok(false) => {}
        Err(e) => tracing::debug!(error = %e, "Email check failed, continuing"),
    }

    let request = form.into_request();
    let response = backend
        .register(&request)
        .await
        .map_err(|e| SubmitError::from_upstream(e, REGISTER_FAILED, REGISTER_UNREACHABLE))?;

    tracing::info!(email = %request.email, "Registration accepted");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted backend that counts what reaches it
    #[derive(Default)]
    struct FakeBackend {
        login_calls: AtomicUsize,
        register_calls: AtomicUsize,
        check_calls: AtomicUsize,
        reply: Mutex<Option<Result<Value, UpstreamError>>>,
        email_taken: Option<bool>,
    }

    impl FakeBackend {
        fn replying(reply: Result<Value, UpstreamError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                email_taken: Some(false),
                ..Default::default()
            }
        }

        fn take_reply(&self) -> Result<Value, UpstreamError> {
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(json!({})))
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn login(&self, _request: &LoginRequest) -> Result<Value, UpstreamError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.take_reply()
        }

        async fn register(&self, _request: &RegisterRequest) -> Result<Value, UpstreamError> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            self.take_reply()
        }

        async fn email_registered(&self, _email: &str) -> Result<bool, UpstreamError> {
            self.check_calls.fetch_add(1, Ordering::SeqCst);
            self.email_taken.ok_or(UpstreamError::Unavailable)
        }
    }

    fn api_error(status: u16, body: Value) -> UpstreamError {
        UpstreamError::Api { status, body }
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            email: "new@gmail.com".to_string(),
            password: "12345678".to_string(),
            model: "HS-200".to_string(),
            device_id: "998877".to_string(),
            phone: "0756000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_login_sends_nothing() {
        let backend = FakeBackend::replying(Ok(json!({})));
        let err = submit_login(&backend, LoginForm::new("testa@gmail.com", "abc", "1"))
            .await
            .unwrap_err();

        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Password).is_some());
        assert_eq!(backend.login_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_success_yields_marker() {
        let backend = FakeBackend::replying(Ok(json!({ "message": "Login successful" })));
        let outcome = submit_login(&backend, LoginForm::new("testa@gmail.com", "12345678", "23456786"))
            .await
            .unwrap();

        assert_eq!(outcome.marker.email, "testa@gmail.com");
        assert_eq!(outcome.marker.device_id, "23456786");
        assert_eq!(outcome.response["message"], "Login successful");
        assert_eq!(backend.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_server_text() {
        let backend = FakeBackend::replying(Err(api_error(401, json!({ "error": "Invalid credentials" }))));
        let err = submit_login(&backend, LoginForm::new("testa@gmail.com", "12345678", "1"))
            .await
            .unwrap_err();

        match err {
            SubmitError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_rejection_generic_fallback() {
        let backend = FakeBackend::replying(Err(api_error(500, json!({ "status": "fail" }))));
        let err = submit_login(&backend, LoginForm::new("testa@gmail.com", "12345678", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn test_login_unreachable() {
        let backend = FakeBackend::replying(Err(UpstreamError::Timeout));
        let err = submit_login(&backend, LoginForm::new("testa@gmail.com", "12345678", "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Unreachable { .. }));
        assert_eq!(err.to_string(), LOGIN_UNREACHABLE);
    }

    #[tokio::test]
    async fn test_login_html_error_page_is_server_error() {
        use crate::upstream::UpstreamConfig;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_string("<html><body><h1>502 Bad Gateway</h1></body></html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HomeSecClient::new(UpstreamConfig {
            base_url: server.uri(),
            request_timeout_ms: 2_000,
        })
        .unwrap();

        let err = submit_login(&client, LoginForm::new("testa@gmail.com", "12345678", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Unreachable { .. }));
        assert_eq!(err.to_string(), LOGIN_UNREACHABLE);
    }

    #[tokio::test]
    async fn test_invalid_register_sends_nothing() {
        let backend = FakeBackend::replying(Ok(json!({})));
        let mut form = register_form();
        form.model = "  ".to_string();

        let err = submit_register(&backend, form).await.unwrap_err();
        assert_eq!(err.field_errors().unwrap().get(Field::Model), Some("Model is required."));
        assert_eq!(backend.check_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_skips_email_check_when_other_fields_invalid() {
        let backend = FakeBackend::replying(Ok(json!({})));
        let mut form = register_form();
        form.device_id = "12ab".to_string();
        form.phone = "0856000000".to_string();

        let err = submit_register(&backend, form).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors.get(Field::Email).is_none());
        assert_eq!(backend.check_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_taken_email() {
        let backend = FakeBackend {
            email_taken: Some(true),
            ..Default::default()
        };

        let err = submit_register(&backend, register_form()).await.unwrap_err();
        assert_eq!(err.field_errors().unwrap().get(Field::Email), Some(EMAIL_TAKEN));
        assert_eq!(backend.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_proceeds_when_email_check_fails() {
        let backend = FakeBackend {
            email_taken: None,
            reply: Mutex::new(Some(Ok(json!({ "message": "Registration successful" })))),
            ..Default::default()
        };

        let response = submit_register(&backend, register_form()).await.unwrap();
        assert_eq!(response["message"], "Registration successful");
        assert_eq!(backend.check_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.register_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_skips_email_check_for_bad_email() {
        let backend = FakeBackend::replying(Ok(json!({})));
        let mut form = register_form();
        form.email = "bad".to_string();

        submit_register(&backend, form).await.unwrap_err();
        assert_eq!(backend.check_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_rejection_messages() {
        let backend = FakeBackend::replying(Err(api_error(
            400,
            json!({ "errors": ["Device already linked", "Model unknown"] }),
        )));
        let err = submit_register(&backend, register_form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Device already linked, Model unknown");

        let backend = FakeBackend::replying(Err(api_error(400, json!({}))));
        let err = submit_register(&backend, register_form()).await.unwrap_err();
        assert_eq!(err.to_string(), REGISTER_FAILED);

        let backend = FakeBackend::replying(Err(UpstreamError::Unavailable));
        let err = submit_register(&backend, register_form()).await.unwrap_err();
        assert_eq!(err.to_string(), REGISTER_UNREACHABLE);
    }
}
