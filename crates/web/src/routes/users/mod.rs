//! User account route handlers.
//!
//! Sign-in, registration, logout and the signed-in user's history page.
//! Form problems are rendered back into the form with HTTP 200; store and
//! hashing failures become [`AppError`](crate::error::AppError) responses.

pub mod forms;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crowdfund_core::UserId;

use crate::db::RepositoryError;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::FALLBACK_PATH;
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, sort_by_creation_date};
use crate::routes::views::{DonationView, ProjectView, enrich_donations};
use crate::services::AuthError;
use crate::state::AppState;

use forms::{
    DUPLICATE_EMAIL, INVALID_CREDENTIALS, INVALID_EMAIL, RegisterCheck, RegisterForm, SigninForm,
};

/// Where a successful registration lands.
pub const SIGNIN_PATH: &str = "/users/signin";

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/signin.html")]
pub struct SigninTemplate {
    pub title: &'static str,
    pub logged: bool,
    pub has_errors: bool,
    pub errors: Vec<&'static str>,
}

impl SigninTemplate {
    fn new(errors: Vec<&'static str>) -> Self {
        Self {
            title: "Sign In",
            logged: false,
            has_errors: !errors.is_empty(),
            errors,
        }
    }
}

/// Registration input echoed back into the form. Passwords are never echoed.
#[derive(Debug, Default)]
pub struct RegisterEcho {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub state: String,
}

impl From<&RegisterForm> for RegisterEcho {
    fn from(form: &RegisterForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.to_lowercase(),
            city: form.city.clone(),
            state: form.state.clone(),
        }
    }
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/register.html")]
pub struct RegisterTemplate {
    pub title: &'static str,
    pub logged: bool,
    pub has_errors: bool,
    pub errors: Vec<&'static str>,
    pub user: RegisterEcho,
}

impl RegisterTemplate {
    fn new(user: RegisterEcho, errors: Vec<&'static str>) -> Self {
        Self {
            title: "Register",
            logged: false,
            has_errors: !errors.is_empty(),
            errors,
            user,
        }
    }
}

/// History page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/history.html")]
pub struct HistoryTemplate {
    pub title: &'static str,
    pub logged: bool,
    pub user: CurrentUser,
    pub has_projects: bool,
    pub projects: Vec<ProjectView>,
    pub has_donated: bool,
    pub donated: Vec<DonationView>,
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the sign-in page, or send a signed-in user to the listing.
pub async fn signin_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to(FALLBACK_PATH).into_response();
    }
    SigninTemplate::new(Vec::new()).into_response()
}

/// Handle sign-in form submission.
///
/// An unknown email and a wrong password render the same message.
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(SigninTemplate::new(errors).into_response());
    }

    let user = match state.auth().login(&form.email, &form.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Sign-in rejected");
            return Ok(SigninTemplate::new(vec![INVALID_CREDENTIALS]).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id);
    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Redirect::to(FALLBACK_PATH).into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page, or send a signed-in user to the listing.
pub async fn register_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to(FALLBACK_PATH).into_response();
    }
    RegisterTemplate::new(RegisterEcho::default(), Vec::new()).into_response()
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let echo = RegisterEcho::from(&form);
    let RegisterCheck { mut errors, email } = form.validate();
    let auth = state.auth();

    if let Some(email) = &email
        && auth.email_taken(email).await?
    {
        errors.push(DUPLICATE_EMAIL);
    }

    let email = match email {
        Some(email) if errors.is_empty() => email,
        _ => return Ok(RegisterTemplate::new(echo, errors).into_response()),
    };

    match auth.register(form.into_registration(email)).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            Ok(Redirect::to(SIGNIN_PATH).into_response())
        }
        Err(AuthError::UserAlreadyExists) => {
            Ok(RegisterTemplate::new(echo, vec![DUPLICATE_EMAIL]).into_response())
        }
        Err(AuthError::InvalidEmail(_)) => {
            Ok(RegisterTemplate::new(echo, vec![INVALID_EMAIL]).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Destroy the session if there is one. Always lands on the listing.
pub async fn logout(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Redirect> {
    if let Some(user) = user {
        clear_current_user(&session).await?;
        clear_sentry_user();
        tracing::info!(user_id = %user.user_id, "User signed out");
    }
    Ok(Redirect::to(FALLBACK_PATH))
}

// =============================================================================
// History
// =============================================================================

/// Display the signed-in user's created projects and donations.
///
/// Any id other than the session's own redirects to the listing.
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Response> {
    match user_id.parse::<UserId>() {
        Ok(id) if id == current.user_id => {}
        _ => return Ok(Redirect::to(FALLBACK_PATH).into_response()),
    }
    let user_id = current.user_id;

    let mut projects = state.projects().list_by_creator(user_id).await?;
    let user = state
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("user {user_id}")))?;
    let donated = enrich_donations(state.users(), state.projects(), &user.donated).await?;

    sort_by_creation_date(&mut projects);
    let projects: Vec<ProjectView> = projects.iter().map(ProjectView::from).collect();

    Ok(HistoryTemplate {
        title: "My Projects",
        logged: true,
        user: current,
        has_projects: !projects.is_empty(),
        projects,
        has_donated: !donated.is_empty(),
        donated,
    }
    .into_response())
}

#[cfg(test)]
mod tests;
