//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crowdfund_core::{DonationId, Email, ProjectId, UserId};

/// A registered user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Lower-cased, unique email address.
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub city: String,
    pub state: String,
    /// Donations made by this user, oldest first.
    pub donated: Vec<Donation>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name shown next to projects the user created.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data required to create a user.
///
/// Text fields are expected to be sanitized already.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub city: String,
    pub state: String,
}

/// A donation from a user to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    pub id: DonationId,
    pub project_id: ProjectId,
    /// The donor.
    pub user_id: UserId,
    /// Amount pledged, if recorded.
    pub amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
