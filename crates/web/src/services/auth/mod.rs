//! Authentication service.
//!
//! Provides password hashing, sign-in and account registration.

mod error;

pub use error::AuthError;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crowdfund_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};
use crate::services::sanitize::sanitize;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id password hashing.
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Create a hasher with explicit Argon2id cost parameters.
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password into a PHC string with a random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored PHC string.
    ///
    /// An unparseable hash never verifies.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// A registration that passed form validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: String,
    pub city: String,
    pub state: String,
}

/// Authentication service.
///
/// Handles sign-in and registration against a [`UserStore`].
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    passwords: &'a PasswordService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore, passwords: &'a PasswordService) -> Self {
        Self { users, passwords }
    }

    /// Sign in with email and password.
    ///
    /// An unknown email and a wrong password are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::Repository` if the user lookup fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Whether an account already uses this email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn email_taken(&self, email: &Email) -> Result<bool, AuthError> {
        Ok(self.users.get_by_email(email).await?.is_some())
    }

    /// Register a new user.
    ///
    /// Hashes the password and sanitizes every text field before storage.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if sanitizing the email leaves an invalid address.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::PasswordHash` or `AuthError::Repository` on system failures.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let password_hash = self.passwords.hash(&registration.password)?;
        let email = Email::parse(&sanitize(registration.email.as_str()))?;

        let new_user = NewUser {
            first_name: sanitize(&registration.first_name),
            last_name: sanitize(&registration.last_name),
            email,
            password_hash,
            city: sanitize(&registration.city),
            state: sanitize(&registration.state),
        };

        self.users.create(new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }
}
