//! `PostgreSQL` user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crowdfund_core::{DonationId, Email, ProjectId, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{Donation, NewUser, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    first_name: String,
    last_name: String,
    email: Email,
    password_hash: String,
    city: String,
    state: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, donated: Vec<Donation>) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            city: self.city,
            state: self.state,
            donated,
            created_at: self.created_at,
        }
    }
}

/// Row type for the `donations` table, shared with the project store.
#[derive(sqlx::FromRow)]
pub(super) struct DonationRow {
    pub id: DonationId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<DonationRow> for Donation {
    fn from(row: DonationRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            user_id: row.user_id,
            amount: row.amount,
            created_at: row.created_at,
        }
    }
}

/// User store backed by the `users` and `donations` tables.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Donations made by a user, in the order they were made.
    async fn donated(&self, user_id: UserId) -> Result<Vec<Donation>, RepositoryError> {
        let rows = sqlx::query_as::<_, DonationRow>(
            r"
            SELECT id, project_id, user_id, amount, created_at
            FROM donations
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Donation::from).collect())
    }

    async fn with_donated(&self, row: Option<UserRow>) -> Result<Option<User>, RepositoryError> {
        match row {
            Some(r) => {
                let donated = self.donated(r.id).await?;
                Ok(Some(r.into_user(donated)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, password_hash, city, state, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        self.with_donated(row).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, password_hash, city, state, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_donated(row).await
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (first_name, last_name, email, password_hash, city, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, password_hash, city, state, created_at
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.city)
        .bind(&user.state)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into_user(Vec::new()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
