//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /projects
//! GET  /projects                  - Project listing
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (pings the user store)
//!
//! # Users
//! GET  /users/signin              - Sign-in page
//! POST /users/signin              - Sign-in action
//! GET  /users/register            - Registration page
//! POST /users                     - Registration action
//! GET  /users/logout              - Logout
//! GET  /users/history/{user_id}   - Signed-in user's projects and donations
//! ```

pub mod projects;
pub mod users;
pub mod views;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the user routes router (nested under `/users`).
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register))
        .route("/signin", get(users::signin_page).post(users::signin))
        .route("/register", get(users::register_page))
        .route("/logout", get(users::logout))
        .route("/history/{user_id}", get(users::history))
}

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Build all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/projects") }))
        .route("/projects", get(projects::index))
        .nest("/users", users_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the user store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.users().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
