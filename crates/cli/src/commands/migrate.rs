//! Database migration command.
//!
//! # Environment Variables
//!
//! - `CROWDFUND_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Schema migrations live in `crates/web/migrations/` and are embedded at
//! compile time. The session table is owned by `tower-sessions-sqlx-store`
//! and created through its own migration.

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("CROWDFUND_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("CROWDFUND_DATABASE_URL"))
}

/// Apply schema migrations, then optionally the session table migration.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable or a
/// migration fails.
pub async fn run(with_sessions: bool) -> Result<(), MigrationError> {
    let _ = dotenvy::dotenv();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    if with_sessions {
        tracing::info!("Creating session table...");
        PostgresStore::new(pool.clone()).migrate().await?;
    }

    tracing::info!("Migrations complete!");
    Ok(())
}
