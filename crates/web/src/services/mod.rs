//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Password hashing, sign-in and registration
//! - `sanitize` - Markup stripping for free-text fields

pub mod auth;
pub mod sanitize;

pub use auth::{AuthError, AuthService, PasswordService};
pub use sanitize::sanitize;
