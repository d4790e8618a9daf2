//! Login and registration forms

use crate::upstream::dto::{LoginRequest, RegisterRequest};
use crate::validation::{
    validate_email, validate_login_device_id, validate_model, validate_password, validate_phone,
    validate_register_device_id, Field, FieldErrors,
};

/// Raw login form values, exactly as entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub device_id: String,
}

impl LoginForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            device_id: device_id.into(),
        }
    }

    /// Run every login validator
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(Field::Email, validate_email(&self.email));
        errors.check(Field::Password, validate_password(&self.password));
        errors.check(Field::DeviceId, validate_login_device_id(&self.device_id));
        errors
    }

    pub fn into_request(self) -> LoginRequest {
        LoginRequest {
            email: self.email,
            password: self.password,
            device_id: self.device_id,
        }
    }
}

/// Raw registration form values.
///
/// Text fields are trimmed before validation and submission; the password
/// is taken as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub model: String,
    pub device_id: String,
    pub phone: String,
}

impl RegisterForm {
    /// Run every registration validator
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(Field::Email, validate_email(self.email.trim()));
        errors.check(Field::Password, validate_password(&self.password));
        errors.check(Field::Model, validate_model(self.model.trim()));
        errors.check(Field::DeviceId, validate_register_device_id(self.device_id.trim()));
        errors.check(Field::Phone, validate_phone(self.phone.trim()));
        errors
    }

    pub fn email(&self) -> &str {
        self.email.trim()
    }

    pub fn into_request(self) -> RegisterRequest {
        let phone = self.phone.trim();
        RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password,
            model: self.model.trim().to_string(),
            device_id: self.device_id.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_login_form() {
        let form = LoginForm::new("testa@gmail.com", "12345678", "23456786");
        assert!(form.validate().is_empty());

        let req = form.into_request();
        assert_eq!(req.device_id, "23456786");
    }

    #[test]
    fn test_login_form_collects_every_error() {
        let form = LoginForm::new("", "abc", "x1");
        let errors = form.validate();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Email), Some("Email is required."));
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be 8-16 digits and contain only numbers.")
        );
        assert_eq!(
            errors.get(Field::DeviceId),
            Some("Device ID must be digits only (e.g., 23456786).")
        );
    }

    #[test]
    fn test_login_form_is_not_trimmed() {
        let form = LoginForm::new(" testa@gmail.com", "12345678", "1");
        assert!(form.validate().get(Field::Email).is_some());
    }

    #[test]
    fn test_register_form_trims_text_fields() {
        let form = RegisterForm {
            email: "  new@gmail.com ".to_string(),
            password: "12345678".to_string(),
            model: " HS-200 ".to_string(),
            device_id: " 998877 ".to_string(),
            phone: "   ".to_string(),
        };
        assert!(form.validate().is_empty());
        assert_eq!(form.email(), "new@gmail.com");

        let req = form.into_request();
        assert_eq!(req.email, "new@gmail.com");
        assert_eq!(req.model, "HS-200");
        assert_eq!(req.device_id, "998877");
        assert_eq!(req.phone, None);
    }

    #[test]
    fn test_register_form_errors() {
        let form = RegisterForm {
            email: "new@gmail.com".to_string(),
            password: "12345678".to_string(),
            model: String::new(),
            device_id: "abc".to_string(),
            phone: "0856000000".to_string(),
        };
        let errors = form.validate();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Model), Some("Model is required."));
        assert!(errors.get(Field::Phone).is_some());
        assert_eq!(
            errors.get(Field::DeviceId),
            Some("Device ID must be numeric (e.g., 23456786).")
        );
    }
}
