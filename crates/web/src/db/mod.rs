//! Data access for the site.
//!
//! # Database: `crowdfund`
//!
//! ## Tables
//!
//! - `users` - Registered accounts
//! - `projects` - Crowdfunding projects (read-only here)
//! - `donations` - Donor/project associations
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Stores
//!
//! Handlers depend on the [`UserStore`] and [`ProjectStore`] traits rather than
//! on `PostgreSQL` directly. "Not found" is always `Ok(None)` or an empty `Vec`;
//! `Err` is reserved for genuine failures.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p crowdfund-cli -- migrate
//! ```

pub mod projects;
pub mod users;

#[cfg(test)]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crowdfund_core::{Email, ProjectId, UserId};

use crate::models::{NewUser, Project, User};

pub use projects::PgProjectStore;
pub use users::PgUserStore;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record referenced by another record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Read/write access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by their (already normalized) email address.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Get a user by their ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Create a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Read access to project records.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Get a project by its ID.
    async fn get_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;

    /// All projects created by a user. Empty when the user created none.
    async fn list_by_creator(&self, creator: UserId) -> Result<Vec<Project>, RepositoryError>;

    /// All projects.
    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
