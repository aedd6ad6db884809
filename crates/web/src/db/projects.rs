//! `PostgreSQL` project store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crowdfund_core::{ProjectId, UserId};

use super::users::DonationRow;
use super::{ProjectStore, RepositoryError};
use crate::models::{Donation, Project};

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: ProjectId,
    title: String,
    creator_id: UserId,
    pledge_goal: Decimal,
    collected: Decimal,
    created_at: DateTime<Utc>,
}

/// Project store backed by the `projects` and `donations` tables.
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    /// Create a new project store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the donations for a batch of projects and assemble domain values.
    async fn with_donations(&self, rows: Vec<ProjectRow>) -> Result<Vec<Project>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let donation_rows = sqlx::query_as::<_, DonationRow>(
            r"
            SELECT id, project_id, user_id, amount, created_at
            FROM donations
            WHERE project_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_project: HashMap<ProjectId, Vec<Donation>> = HashMap::new();
        for row in donation_rows {
            by_project
                .entry(row.project_id)
                .or_default()
                .push(Donation::from(row));
        }

        Ok(rows
            .into_iter()
            .map(|r| Project {
                donations: by_project.remove(&r.id).unwrap_or_default(),
                id: r.id,
                title: r.title,
                creator: r.creator_id,
                date: r.created_at,
                pledge_goal: r.pledge_goal,
                collected: r.collected,
            })
            .collect())
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn get_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r"
            SELECT id, title, creator_id, pledge_goal, collected, created_at
            FROM projects
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(self.with_donations(vec![r]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_by_creator(&self, creator: UserId) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r"
            SELECT id, title, creator_id, pledge_goal, collected, created_at
            FROM projects
            WHERE creator_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await?;

        self.with_donations(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r"
            SELECT id, title, creator_id, pledge_goal, collected, created_at
            FROM projects
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.with_donations(rows).await
    }
}
