//! Profile and password management

use crate::upstream::dto::{PasswordChange, ResetCompletion};
use crate::upstream::{server_message, HomeSecClient, UpstreamError};
use crate::validation::{validate_email, validate_password, validate_phone, Field, FieldErrors};

use super::{SubmitError, LOGIN_UNREACHABLE};

const PROFILE_FAILED: &str = "Profile update failed.";
const PASSWORD_FAILED: &str = "Password change failed.";
const RESET_FAILED: &str = "Password reset failed.";

/// Contact details to update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(phone) = &self.phone {
            errors.check(Field::Phone, validate_phone(phone.trim()));
        }
        if let Some(email) = &self.email {
            errors.check(Field::Email, validate_email(email.trim()));
        }
        errors
    }
}

/// Current password plus the new one typed twice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChangeForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChangeForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.current.is_empty() {
            errors.check(Field::CurrentPassword, "Current password is required.".to_string());
        }
        errors.check(Field::Password, validate_password(&self.new));
        if self.new != self.confirm {
            errors.check(Field::ConfirmPassword, "Passwords don't match.".to_string());
        }
        errors
    }
}

fn rejected(err: UpstreamError, fallback: &str) -> SubmitError {
    SubmitError::from_upstream(err, fallback, LOGIN_UNREACHABLE)
}

/// Save the phone number, then the email, stopping at the first failure
pub async fn save_profile(client: &HomeSecClient, form: ProfileForm) -> Result<(), SubmitError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    if let Some(phone) = form.phone {
        client
            .update_phone(phone.trim())
            .await
            .map_err(|e| rejected(e, PROFILE_FAILED))?;
    }
    if let Some(email) = form.email {
        client
            .update_email(email.trim())
            .await
            .map_err(|e| rejected(e, PROFILE_FAILED))?;
    }

    tracing::info!("Profile saved");
    Ok(())
}

/// Change the signed-in user's password
pub async fn change_password(
    client: &HomeSecClient,
    form: PasswordChangeForm,
) -> Result<(), SubmitError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let change = PasswordChange {
        current_password: form.current,
        new_password: form.new,
    };
    client
        .change_password(&change)
        .await
        .map_err(|e| rejected(e, PASSWORD_FAILED))?;

    tracing::info!("Password changed");
    Ok(())
}

/// Ask the backend to email a password-reset link.
///
/// Returns the backend's confirmation text when it sends one.
pub async fn request_password_reset(
    client: &HomeSecClient,
    email: &str,
) -> Result<Option<String>, SubmitError> {
    let mut errors = FieldErrors::new();
    errors.check(Field::Email, validate_email(email.trim()));
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let body = client
        .request_password_reset(email.trim())
        .await
        .map_err(|e| rejected(e, RESET_FAILED))?;
    Ok(server_message(&body))
}

/// Complete a reset with the emailed token
pub async fn reset_password(
    client: &HomeSecClient,
    token: &str,
    new_password: &str,
) -> Result<(), SubmitError> {
    let mut errors = FieldErrors::new();
    errors.check(Field::Password, validate_password(new_password));
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let completion = ResetCompletion {
        token: token.trim().to_string(),
        new_password: new_password.to_string(),
    };
    client
        .reset_password(&completion)
        .await
        .map_err(|e| rejected(e, RESET_FAILED))?;
    Ok(())
}
