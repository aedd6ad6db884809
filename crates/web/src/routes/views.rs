//! Display-ready project and donation rows shared by the page templates.

use std::collections::HashMap;

use crowdfund_core::{ProjectId, UserId};

use crate::db::{ProjectStore, RepositoryError, UserStore};
use crate::format::{format_long_date, format_number};
use crate::models::{Donation, Project};

/// A project formatted for display.
#[derive(Debug, Clone)]
pub struct ProjectView {
    pub id: ProjectId,
    pub title: String,
    /// Long US date, e.g. `October 16, 2026`.
    pub date: String,
    pub pledge_goal: String,
    pub collected: String,
    pub donors: usize,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            date: format_long_date(project.date),
            pledge_goal: format_number(project.pledge_goal),
            collected: format_number(project.collected),
            donors: project.donor_count(),
        }
    }
}

/// A donation with the project it went to resolved.
#[derive(Debug, Clone)]
pub struct DonationView {
    pub project_id: ProjectId,
    pub project_title: String,
    /// Display name of the project's creator.
    pub project_creator: String,
    pub amount: Option<String>,
}

/// Resolve each donation's project title and creator name.
///
/// Lookups run one at a time so the output keeps the input order. A donation
/// pointing at a missing project or creator is an error.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for a dangling reference, or the
/// store's error if a lookup fails.
pub async fn enrich_donations(
    users: &dyn UserStore,
    projects: &dyn ProjectStore,
    donated: &[Donation],
) -> Result<Vec<DonationView>, RepositoryError> {
    let mut views = Vec::with_capacity(donated.len());

    for donation in donated {
        let project = projects
            .get_by_id(donation.project_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("project {}", donation.project_id)))?;
        let creator = creator_name(users, project.creator).await?;

        views.push(DonationView {
            project_id: project.id,
            project_title: project.title,
            project_creator: creator,
            amount: donation.amount.map(format_number),
        });
    }

    Ok(views)
}

/// Display name of a user, or `NotFound`.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user does not exist.
pub async fn creator_name(users: &dyn UserStore, id: UserId) -> Result<String, RepositoryError> {
    users
        .get_by_id(id)
        .await?
        .map(|user| user.display_name())
        .ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))
}

/// Creator names for a batch of projects, each creator fetched once.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if a creator does not exist.
pub async fn creator_names(
    users: &dyn UserStore,
    projects: &[Project],
) -> Result<HashMap<UserId, String>, RepositoryError> {
    let mut names = HashMap::new();
    for project in projects {
        if !names.contains_key(&project.creator) {
            let name = creator_name(users, project.creator).await?;
            names.insert(project.creator, name);
        }
    }
    Ok(names)
}
