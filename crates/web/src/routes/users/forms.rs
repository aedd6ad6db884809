//! Form bodies for the user routes and their validation.
//!
//! Validation accumulates every problem in a fixed order so the page can show
//! them all at once. Missing fields deserialize to empty strings.

use serde::Deserialize;

use crowdfund_core::Email;

use crate::services::auth::{MIN_PASSWORD_LENGTH, Registration};

pub const SIGNIN_MISSING_EMAIL: &str = "Please enter your email";
pub const SIGNIN_MISSING_PASSWORD: &str = "Please enter your password";
pub const INVALID_CREDENTIALS: &str = "Invalid email and/or password";

pub const MISSING_FIRST_NAME: &str = "No first name provided";
pub const MISSING_LAST_NAME: &str = "No last name provided";
pub const MISSING_EMAIL: &str = "No email provided";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const MISSING_PASSWORD: &str = "No password provided";
pub const PASSWORD_TOO_SHORT: &str = "Password should contain at least 8 characters";
pub const MISSING_PASSWORD_CONFIRM: &str = "No password confirmation provided";
pub const PASSWORD_MISMATCH: &str = "Passwords don't match";
pub const MISSING_CITY: &str = "No city provided";
pub const MISSING_STATE: &str = "No state provided";
pub const DUPLICATE_EMAIL: &str = "An account with this email already exists.";

// =============================================================================
// Sign-in
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

impl SigninForm {
    /// Every missing field, email first.
    #[must_use]
    pub fn validate(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.email.is_empty() {
            errors.push(SIGNIN_MISSING_EMAIL);
        }
        if self.password.is_empty() {
            errors.push(SIGNIN_MISSING_PASSWORD);
        }
        errors
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub city: String,
    pub state: String,
}

/// Outcome of checking a registration form before the duplicate lookup.
#[derive(Debug)]
pub struct RegisterCheck {
    /// Problems found so far, in display order.
    pub errors: Vec<&'static str>,
    /// The normalized email, when one was supplied and well-formed.
    pub email: Option<Email>,
}

impl RegisterForm {
    /// Check every field, accumulating errors.
    ///
    /// The duplicate-email check needs the store, so it is left to the caller
    /// and appended after these.
    #[must_use]
    pub fn validate(&self) -> RegisterCheck {
        let mut errors = Vec::new();
        let mut email = None;

        if self.first_name.is_empty() {
            errors.push(MISSING_FIRST_NAME);
        }
        if self.last_name.is_empty() {
            errors.push(MISSING_LAST_NAME);
        }

        if self.email.is_empty() {
            errors.push(MISSING_EMAIL);
        } else {
            match Email::parse(&self.email) {
                Ok(parsed) => email = Some(parsed),
                Err(_) => errors.push(INVALID_EMAIL),
            }
        }

        if self.password.is_empty() {
            errors.push(MISSING_PASSWORD);
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(PASSWORD_TOO_SHORT);
        }

        if self.password_confirm.is_empty() {
            errors.push(MISSING_PASSWORD_CONFIRM);
        }
        if self.password_confirm != self.password {
            errors.push(PASSWORD_MISMATCH);
        }

        if self.city.is_empty() {
            errors.push(MISSING_CITY);
        }
        if self.state.is_empty() {
            errors.push(MISSING_STATE);
        }

        RegisterCheck { errors, email }
    }

    /// Turn a fully validated form into a registration.
    #[must_use]
    pub fn into_registration(self, email: Email) -> Registration {
        Registration {
            first_name: self.first_name,
            last_name: self.last_name,
            email,
            password: self.password,
            city: self.city,
            state: self.state,
        }
    }
}
