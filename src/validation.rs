//! Field Validation
//!
//! Pure validators for the login and registration forms. Each validator maps
//! a raw field value to an error message, or to an empty string when the
//! value is acceptable. They are deterministic and side-effect free, so the
//! CLI runs them while a field is being entered and again on submit.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

struct FieldPatterns {
    email: Regex,
    email_allowed_chars: Regex,
    password: Regex,
    digits: Regex,
    phone: Regex,
}

static PATTERNS: LazyLock<FieldPatterns> = LazyLock::new(|| FieldPatterns {
    email: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap(),
    email_allowed_chars: Regex::new(r"[^a-zA-Z0-9@._-]").unwrap(),
    password: Regex::new(r"^[0-9]{8,16}$").unwrap(),
    digits: Regex::new(r"^[0-9]+$").unwrap(),
    phone: Regex::new(r"^(01|07)[0-9]{8}$").unwrap(),
});

/// Email address (login and registration share the same rules).
pub fn validate_email(email: &str) -> String {
    if email.is_empty() {
        return "Email is required.".to_string();
    }
    if !PATTERNS.email.is_match(email) {
        return "Enter a valid email address (e.g., testa@gmail.com).".to_string();
    }
    // `%` and `+` pass the address pattern but are still rejected
    if PATTERNS.email_allowed_chars.is_match(email) {
        return "Email cannot contain special symbols except @, ., _, and -.".to_string();
    }
    String::new()
}

/// Password: 8 to 16 digits, nothing else.
pub fn validate_password(password: &str) -> String {
    if password.is_empty() {
        return "Password is required.".to_string();
    }
    if !PATTERNS.password.is_match(password) {
        return "Password must be 8-16 digits and contain only numbers.".to_string();
    }
    String::new()
}

/// Device ID on the login form.
pub fn validate_login_device_id(device_id: &str) -> String {
    if device_id.is_empty() {
        return "Device ID is required.".to_string();
    }
    if !PATTERNS.digits.is_match(device_id) {
        return "Device ID must be digits only (e.g., 23456786).".to_string();
    }
    String::new()
}

/// Device ID on the registration form.
pub fn validate_register_device_id(device_id: &str) -> String {
    if device_id.is_empty() {
        return "Device ID is required.".to_string();
    }
    if !PATTERNS.digits.is_match(device_id) {
        return "Device ID must be numeric (e.g., 23456786).".to_string();
    }
    String::new()
}

/// Phone number. Optional, so an empty value is accepted.
pub fn validate_phone(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }
    if !PATTERNS.phone.is_match(phone) {
        return "Phone number must start with 01 or 07 and be 10 digits (e.g., 0756000000)."
            .to_string();
    }
    String::new()
}

/// Device model.
pub fn validate_model(model: &str) -> String {
    if model.is_empty() {
        return "Model is required.".to_string();
    }
    String::new()
}

/// Form fields that can carry a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    CurrentPassword,
    ConfirmPassword,
    DeviceId,
    Model,
    Phone,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::CurrentPassword => "Current password",
            Field::ConfirmPassword => "Confirm password",
            Field::DeviceId => "Device ID",
            Field::Model => "Model",
            Field::Phone => "Phone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-field validation messages collected for one form submission.
///
/// Empty messages are never stored, so `is_empty()` means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<Field, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validator's result for a field.
    pub fn check(&mut self, field: Field, message: String) {
        if !message.is_empty() {
            self.errors.insert(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_required() {
        assert_eq!(validate_email(""), "Email is required.");
    }

    #[test]
    fn test_email_format() {
        assert_eq!(validate_email("testa@gmail.com"), "");
        assert_eq!(validate_email("first.last-1@mail.example.org"), "");
        assert_eq!(
            validate_email("not-an-email"),
            "Enter a valid email address (e.g., testa@gmail.com)."
        );
        assert_eq!(
            validate_email("user@host"),
            "Enter a valid email address (e.g., testa@gmail.com)."
        );
        assert_eq!(
            validate_email("user@host.c"),
            "Enter a valid email address (e.g., testa@gmail.com)."
        );
    }

    #[test]
    fn test_email_special_symbols() {
        let msg = "Email cannot contain special symbols except @, ., _, and -.";
        assert_eq!(validate_email("user+tag@gmail.com"), msg);
        assert_eq!(validate_email("us%er@gmail.com"), msg);
    }

    #[test]
    fn test_password() {
        assert_eq!(validate_password("12345678"), "");
        assert_eq!(validate_password("1234567890123456"), "");
        assert_eq!(validate_password(""), "Password is required.");

        let msg = "Password must be 8-16 digits and contain only numbers.";
        assert_eq!(validate_password("abc"), msg);
        assert_eq!(validate_password("1234567"), msg);
        assert_eq!(validate_password("12345678901234567"), msg);
        assert_eq!(validate_password("1234 5678"), msg);
        assert_eq!(validate_password("admin123"), msg);
    }

    #[test]
    fn test_device_ids() {
        assert_eq!(validate_login_device_id("23456786"), "");
        assert_eq!(validate_login_device_id(""), "Device ID is required.");
        assert_eq!(
            validate_login_device_id("dev-1"),
            "Device ID must be digits only (e.g., 23456786)."
        );

        assert_eq!(validate_register_device_id("1"), "");
        assert_eq!(validate_register_device_id(""), "Device ID is required.");
        assert_eq!(
            validate_register_device_id("12a"),
            "Device ID must be numeric (e.g., 23456786)."
        );
    }

    #[test]
    fn test_phone_optional() {
        assert_eq!(validate_phone(""), "");
        assert_eq!(validate_phone("0756000000"), "");
        assert_eq!(validate_phone("0112345678"), "");

        let msg = "Phone number must start with 01 or 07 and be 10 digits (e.g., 0756000000).";
        assert_eq!(validate_phone("0856000000"), msg);
        assert_eq!(validate_phone("075600000"), msg);
        assert_eq!(validate_phone("+254756000000"), msg);
    }

    #[test]
    fn test_model() {
        assert_eq!(validate_model("HS-200"), "");
        assert_eq!(validate_model(""), "Model is required.");
    }

    #[test]
    fn test_field_errors_skip_empty_messages() {
        let mut errors = FieldErrors::new();
        errors.check(Field::Email, validate_email("testa@gmail.com"));
        assert!(errors.is_empty());

        errors.check(Field::Password, validate_password("abc"));
        errors.check(Field::DeviceId, validate_login_device_id(""));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::DeviceId), Some("Device ID is required."));
        assert_eq!(errors.get(Field::Email), None);
    }

    #[test]
    fn test_field_errors_display_and_json() {
        let mut errors = FieldErrors::new();
        errors.check(Field::Model, validate_model(""));
        assert_eq!(errors.to_string(), "Model: Model is required.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["model"], "Model is required.");
    }
}
