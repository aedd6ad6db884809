//! Project listing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, sort_by_creation_date};
use crate::routes::views::{ProjectView, creator_names};
use crate::state::AppState;

/// A listed project with its creator's name.
pub struct ListingEntry {
    pub project: ProjectView,
    pub creator: String,
}

/// Project listing template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/index.html")]
pub struct ProjectsTemplate {
    pub title: &'static str,
    pub logged: bool,
    pub user: Option<CurrentUser>,
    pub projects: Vec<ListingEntry>,
}

/// Display every project, newest first.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let mut projects = state.projects().list_all().await?;
    sort_by_creation_date(&mut projects);

    let names = creator_names(state.users(), &projects).await?;
    let projects = projects
        .iter()
        .map(|project| ListingEntry {
            project: ProjectView::from(project),
            creator: names.get(&project.creator).cloned().unwrap_or_default(),
        })
        .collect();

    Ok(ProjectsTemplate {
        title: "Projects",
        logged: user.is_some(),
        user,
        projects,
    })
}
